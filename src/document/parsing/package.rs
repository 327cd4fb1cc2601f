//! Raw package parts
//!
//! docx-rs gives us paragraphs, runs and their formatting, but not the
//! relationship targets, core properties, numbering formats, direct paragraph
//! indents or embedded picture references. Those are read here straight from
//! the ZIP container with quick-xml.

use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;
use zip::result::ZipError;

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const CORE_PART: &str = "docProps/core.xml";
const NUMBERING_PART: &str = "word/numbering.xml";

/// A target from `document.xml.rels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub(crate) target: String,
    pub(crate) external: bool,
}

/// Dublin Core properties from `docProps/core.xml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CoreProperties {
    pub(crate) title: Option<String>,
    pub(crate) creator: Option<String>,
    pub(crate) subject: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) keywords: Vec<String>,
    pub(crate) created: Option<String>,
    pub(crate) modified: Option<String>,
}

/// Number format per (numId, level), e.g. `decimal` or `bullet`
#[derive(Debug, Clone, Default)]
pub(crate) struct NumberingFormats {
    formats: HashMap<(usize, usize), String>,
}

impl NumberingFormats {
    pub(crate) fn format(&self, num_id: usize, level: usize) -> Option<&str> {
        self.formats.get(&(num_id, level)).map(String::as_str)
    }

    /// Whether items of this numbering are counted rather than bulleted
    pub(crate) fn is_ordered(&self, num_id: usize, level: usize) -> Option<bool> {
        self.format(num_id, level)
            .map(|format| !matches!(format, "bullet" | "none"))
    }
}

/// Picture reference found inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackageImage {
    pub(crate) rel_id: String,
    pub(crate) alt: Option<String>,
}

/// What the raw scan learns about one top-level body paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParagraphLayout {
    /// Direct left indent in twentieths of a point
    pub(crate) left_indent: Option<i32>,
    pub(crate) images: Vec<PackageImage>,
}

impl ParagraphLayout {
    pub(crate) fn left_indent_points(&self) -> Option<f32> {
        self.left_indent.map(|twips| twips as f32 / 20.0)
    }
}

/// The parts of a .docx package that docx-rs does not expose
pub(crate) struct DocxPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    pub(crate) relationships: HashMap<String, Relationship>,
    pub(crate) core: CoreProperties,
    pub(crate) numbering: NumberingFormats,
    pub(crate) layouts: Vec<ParagraphLayout>,
}

impl<'a> DocxPackage<'a> {
    pub(crate) fn open(data: &'a [u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        let document_xml =
            read_part(&mut archive, DOCUMENT_PART)?.context("missing word/document.xml")?;
        let layouts = scan_paragraph_layouts(&document_xml)?;

        let relationships = match read_part(&mut archive, DOCUMENT_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };
        let core = match read_part(&mut archive, CORE_PART)? {
            Some(xml) => parse_core_properties(&xml)?,
            None => CoreProperties::default(),
        };
        let numbering = match read_part(&mut archive, NUMBERING_PART)? {
            Some(xml) => parse_numbering_formats(&xml)?,
            None => NumberingFormats::default(),
        };

        Ok(Self {
            archive,
            relationships,
            core,
            numbering,
            layouts,
        })
    }

    pub(crate) fn layout(&self, paragraph_index: usize) -> Option<&ParagraphLayout> {
        self.layouts.get(paragraph_index)
    }

    /// URL of an external hyperlink relationship
    pub(crate) fn hyperlink_url(&self, rel_id: &str) -> Option<String> {
        self.relationships.get(rel_id).map(|rel| rel.target.clone())
    }

    /// Package path of an internal relationship target, e.g. `word/media/image1.png`
    pub(crate) fn part_path(&self, rel_id: &str) -> Option<String> {
        let rel = self.relationships.get(rel_id)?;
        if rel.external {
            return None;
        }
        Some(resolve_part_path("word", &rel.target))
    }

    pub(crate) fn read_media(&mut self, part: &str) -> Result<Option<Vec<u8>>> {
        read_binary_part(&mut self.archive, part)
    }
}

/// Read a text part, `None` when the package does not contain it
pub(crate) fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read {name}"))?;
    Ok(Some(content))
}

pub(crate) fn read_binary_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .with_context(|| format!("Failed to read {name}"))?;
    Ok(Some(content))
}

/// Resolve a relationship target against the directory of its source part
pub(crate) fn resolve_part_path(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Value of an attribute matched by its qualified name, e.g. `r:embed`
fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Value of an attribute matched by its local name, ignoring the prefix
fn local_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

pub(crate) fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut relationships = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (local_attr(e, b"Id"), local_attr(e, b"Target")) {
                    let external = local_attr(e, b"TargetMode")
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
                    relationships.insert(id, Relationship { target, external });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("Error reading relationships: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

pub(crate) fn parse_core_properties(xml: &str) -> Result<CoreProperties> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut core = CoreProperties::default();
    let mut buf = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                current = Some(e.local_name().as_ref().to_vec());
            }
            Ok(Event::End(_)) => {
                current = None;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(name) = current.as_deref() {
                    let text = e.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        set_core_field(&mut core, name, text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("Error reading core properties: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(core)
}

fn set_core_field(core: &mut CoreProperties, name: &[u8], text: String) {
    match name {
        b"title" => core.title = Some(text),
        b"creator" => core.creator = Some(text),
        b"subject" => core.subject = Some(text),
        b"description" => core.description = Some(text),
        b"category" => core.category = Some(text),
        b"created" => core.created = Some(text),
        b"modified" => core.modified = Some(text),
        b"keywords" => {
            core.keywords = text
                .split([',', ';'])
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
        _ => {}
    }
}

pub(crate) fn parse_numbering_formats(xml: &str) -> Result<NumberingFormats> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // abstractNumId -> level -> format
    let mut abstract_formats: HashMap<usize, HashMap<usize, String>> = HashMap::new();
    // numId -> abstractNumId
    let mut instances: Vec<(usize, usize)> = Vec::new();

    let mut buf = Vec::new();
    let mut current_abstract: Option<usize> = None;
    let mut current_level: Option<usize> = None;
    let mut current_num: Option<usize> = None;

    let parse_id = |value: Option<String>| value.and_then(|v| v.trim().parse::<usize>().ok());

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:abstractNum" => current_abstract = parse_id(attr(e, b"w:abstractNumId")),
                b"w:lvl" => current_level = parse_id(attr(e, b"w:ilvl")),
                b"w:numFmt" => {
                    if let (Some(abstract_id), Some(level), Some(format)) =
                        (current_abstract, current_level, attr(e, b"w:val"))
                    {
                        abstract_formats
                            .entry(abstract_id)
                            .or_default()
                            .insert(level, format);
                    }
                }
                b"w:num" => current_num = parse_id(attr(e, b"w:numId")),
                b"w:abstractNumId" => {
                    if let (Some(num_id), Some(abstract_id)) =
                        (current_num, parse_id(attr(e, b"w:val")))
                    {
                        instances.push((num_id, abstract_id));
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:abstractNum" => current_abstract = None,
                b"w:lvl" => current_level = None,
                b"w:num" => current_num = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("Error reading numbering: {e}")),
            _ => {}
        }
        buf.clear();
    }

    let mut formats = HashMap::new();
    for (num_id, abstract_id) in instances {
        if let Some(levels) = abstract_formats.get(&abstract_id) {
            for (level, format) in levels {
                formats.insert((num_id, *level), format.clone());
            }
        }
    }

    Ok(NumberingFormats { formats })
}

/// Walk the body of `document.xml` and record, for every top-level paragraph
/// in order, its direct left indent and the pictures it embeds.
///
/// Paragraphs nested in tables, text boxes or content controls are skipped so
/// that indices line up with docx-rs' top-level `DocumentChild::Paragraph`s.
pub(crate) fn scan_paragraph_layouts(document_xml: &str) -> Result<Vec<ParagraphLayout>> {
    let mut reader = Reader::from_str(document_xml);
    reader.config_mut().trim_text(true);

    let mut layouts = Vec::new();
    let mut buf = Vec::new();

    // Depth below w:body, None outside the body
    let mut body_depth: Option<usize> = None;
    let mut current: Option<ParagraphLayout> = None;
    let mut in_paragraph_props = false;
    let mut pending_alt: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_ref = e.name();
                let name = name_ref.as_ref();
                if let Some(depth) = body_depth {
                    let depth = depth + 1;
                    body_depth = Some(depth);
                    if depth == 1 && name == b"w:p" {
                        current = Some(ParagraphLayout::default());
                        pending_alt = None;
                    } else if depth == 2 && name == b"w:pPr" {
                        in_paragraph_props = current.is_some();
                    } else if let Some(layout) = current.as_mut() {
                        record_element(layout, e, in_paragraph_props, &mut pending_alt);
                    }
                } else if name == b"w:body" {
                    body_depth = Some(0);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(depth) = body_depth {
                    if depth == 0 && e.name().as_ref() == b"w:p" {
                        layouts.push(ParagraphLayout::default());
                    } else if let Some(layout) = current.as_mut() {
                        record_element(layout, e, in_paragraph_props, &mut pending_alt);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if let Some(depth) = body_depth {
                    if depth == 0 {
                        body_depth = None;
                    } else {
                        let name_ref = e.name();
                        let name = name_ref.as_ref();
                        if depth == 1 && name == b"w:p" {
                            if let Some(layout) = current.take() {
                                layouts.push(layout);
                            }
                        } else if depth == 2 && name == b"w:pPr" {
                            in_paragraph_props = false;
                        }
                        body_depth = Some(depth - 1);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("Error reading document body: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(layouts)
}

fn record_element(
    layout: &mut ParagraphLayout,
    e: &BytesStart,
    in_paragraph_props: bool,
    pending_alt: &mut Option<String>,
) {
    match e.name().as_ref() {
        b"w:ind" if in_paragraph_props => {
            layout.left_indent = attr(e, b"w:left")
                .or_else(|| attr(e, b"w:start"))
                .and_then(|v| v.trim().parse::<i32>().ok());
        }
        b"wp:docPr" => {
            let keys: [&[u8]; 3] = [b"descr", b"title", b"name"];
            *pending_alt = keys
                .iter()
                .filter_map(|key| attr(e, key))
                .find(|value| !value.trim().is_empty());
        }
        b"a:blip" => {
            if let Some(rel_id) = attr(e, b"r:embed") {
                layout.images.push(PackageImage {
                    rel_id,
                    alt: pending_alt.take(),
                });
            }
        }
        b"v:imagedata" => {
            if let Some(rel_id) = attr(e, b"r:id") {
                layout.images.push(PackageImage {
                    rel_id,
                    alt: attr(e, b"o:title").or_else(|| pending_alt.take()),
                });
            }
        }
        _ => {}
    }
}
