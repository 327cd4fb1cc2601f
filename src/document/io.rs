//! File I/O operations and validation
//!
//! This module handles file validation, reading the .docx bytes, saving and
//! loading the JSON model, and copying embedded pictures out of the package.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use super::models::DocumentModel;
use super::parsing::package::read_binary_part;
use crate::error::DocumentError;

/// Validates that the file is a legitimate .docx file
pub(crate) fn validate_docx_file(file_path: &Path) -> Result<()> {
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !extension.eq_ignore_ascii_case("docx") {
        return Err(DocumentError::InvalidExtension {
            extension: extension.to_string(),
        }
        .into());
    }

    // Check ZIP structure contains word/document.xml
    let file = open_file(file_path)?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("{} is not a ZIP container", file_path.display()))?;

    if archive.by_name("word/document.xml").is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            bail!(
                "This appears to be an Excel file (.xlsx).\n\
                Only Word documents (.docx) are supported."
            );
        }

        return Err(DocumentError::MissingDocumentPart.into());
    }

    Ok(())
}

fn open_file(file_path: &Path) -> Result<File> {
    File::open(file_path).map_err(|e| permission_error(file_path, e))
}

/// Read the whole document, reporting permission problems by name
pub(crate) fn read_docx_bytes(file_path: &Path) -> Result<Vec<u8>> {
    fs::read(file_path).map_err(|e| permission_error(file_path, e))
}

fn permission_error(file_path: &Path, e: std::io::Error) -> anyhow::Error {
    if e.kind() == ErrorKind::PermissionDenied {
        DocumentError::PermissionDenied {
            path: file_path.to_path_buf(),
        }
        .into()
    } else {
        anyhow::Error::new(e).context(format!("Failed to open {}", file_path.display()))
    }
}

/// Render the model as JSON indented by four spaces. Non-ASCII text is kept
/// as is.
pub fn to_pretty_json(model: &DocumentModel) -> Result<String> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    model.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

/// Save the model to a JSON file, creating parent directories as needed
pub fn save_to_json(model: &DocumentModel, output_file: &Path) -> Result<()> {
    let json = to_pretty_json(model)?;

    let write = || -> std::io::Result<()> {
        if let Some(parent) = output_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_file, json.as_bytes())
    };

    write().map_err(|source| DocumentError::Save {
        path: output_file.to_path_buf(),
        source,
    })?;

    crate::log!("save"; "Data successfully saved to {}.", output_file.display());
    Ok(())
}

/// Load a model previously written by [`save_to_json`]
pub fn load_from_json(path: &Path) -> Result<DocumentModel> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let model = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a saved document model", path.display()))?;
    Ok(model)
}

/// Copy every picture of the model out of the package into `dir/{id}/`
pub fn extract_images(docx_path: &Path, model: &DocumentModel, dir: &Path) -> Result<Vec<PathBuf>> {
    let images = model.images();
    if images.is_empty() {
        return Ok(Vec::new());
    }

    let target_dir = dir.join(&model.id);
    fs::create_dir_all(&target_dir)
        .with_context(|| format!("Failed to create {}", target_dir.display()))?;

    let mut archive = ZipArchive::new(open_file(docx_path)?)?;
    let mut written = Vec::with_capacity(images.len());

    for image in images {
        let Some(bytes) = read_binary_part(&mut archive, &image.source)? else {
            crate::log!("save"; "{} is missing from the package, skipping", image.source);
            continue;
        };

        let path = target_dir.join(&image.file_name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        crate::debug!("save"; "{} -> {}", image.source, path.display());
        written.push(path);
    }

    Ok(written)
}
