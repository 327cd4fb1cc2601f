//! Errors with a user-facing contract

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Cannot open the file {}. Check read-only permissions.", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error(
        "Invalid file format. Expected .docx file, got .{extension}\n\
        Note: only Word .docx files are supported (not .doc, .xlsx, .zip, etc.)"
    )]
    InvalidExtension { extension: String },

    #[error(
        "Invalid .docx file: missing word/document.xml\n\
        This file may be corrupted or is not a valid Word document."
    )]
    MissingDocumentPart,

    #[error("Failed to save data to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No .docx files found in {}", .dir.display())]
    NoDocxFiles { dir: PathBuf },
}
