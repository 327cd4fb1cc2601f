//! Document loading and orchestration
//!
//! This module contains the main `load_document()` function. It walks the
//! top-level paragraphs once, keeping a cursor on the most recent heading:
//! paragraphs and lists are attached to that heading's section until the
//! next heading opens a new one.

use anyhow::Result;
use std::io::Cursor;
use std::path::Path;
use std::time::UNIX_EPOCH;
use unicode_segmentation::UnicodeSegmentation;

use super::io::{read_docx_bytes, validate_docx_file};
use super::models::*;
use super::parsing::formatting::{ParagraphRuns, build_paragraph, collect_paragraph_runs};
use super::parsing::heading::{StyleRole, detect_style_role, heading_tag};
use super::parsing::list::{ListBuilder, ListMarker, detect_list_item, strip_list_prefix};
use super::parsing::package::{CoreProperties, DocxPackage, ParagraphLayout};
use crate::category::Category;
use crate::reading_time::ReadingTime;
use crate::utils::{parse_w3c_datetime, slugify, zero_pad};

/// Parse a .docx file into the post model
///
/// This function:
/// 1. Validates the DOCX file and reads it
/// 2. Parses paragraphs with docx-rs and the raw package parts with quick-xml
/// 3. Groups paragraphs and lists into sections under their heading
/// 4. Derives the post identity, date, category and reading time
pub fn load_document(file_path: &Path, options: &LoadOptions) -> Result<DocumentModel> {
    validate_docx_file(file_path)?;

    let file_data = read_docx_bytes(file_path)?;
    let docx = docx_rs::read_docx(&file_data)?;
    let mut package = DocxPackage::open(&file_data)?;

    let content = extract_content(&docx, &mut package)?;
    crate::debug!(
        "parse";
        "{} sections, {} words, {} images, {} links",
        content.sections.len(),
        content.word_count,
        content.image_count,
        content.link_count
    );

    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let core = &package.core;
    let mut id = slugify(&stem);
    if id.is_empty() {
        id = "post".to_string();
    }

    let first_heading = content
        .sections
        .iter()
        .find_map(|section| section.title.as_ref().map(|t| t.text.clone()));
    let title = core
        .title
        .clone()
        .or_else(|| content.title.clone())
        .or(first_heading)
        .unwrap_or_else(|| stem.clone());

    let description = core
        .description
        .clone()
        .or_else(|| core.subject.clone())
        .or_else(|| content.subtitle.clone())
        .unwrap_or_else(|| title.clone());

    let doc_type = options
        .doc_type
        .clone()
        .or_else(|| core.category.clone())
        .or_else(|| core.keywords.first().cloned())
        .unwrap_or_default();
    let category = Category::from_doc_type(&doc_type);

    let date = options
        .date
        .or_else(|| document_date(core))
        .or_else(|| file_modified_ms(file_path))
        .unwrap_or(0);

    let metadata = DocumentMetadata {
        file_name,
        author: core.creator.clone(),
        created: core.created.clone(),
        modified: core.modified.clone(),
        subject: core.subject.clone(),
        category: core.category.clone(),
        keywords: core.keywords.clone(),
        word_count: content.word_count,
        image_count: content.image_count,
        link_count: content.link_count,
    };

    Ok(DocumentModel {
        id,
        title,
        description,
        doc_type,
        tags: category.tags(),
        image: category.image(),
        date,
        time: ReadingTime::from_word_count(content.word_count, options.words_per_minute),
        metadata,
        content: content.sections,
    })
}

/// Everything the paragraph pass produces
#[derive(Debug, Default)]
struct ExtractedContent {
    sections: Vec<Section>,
    title: Option<String>,
    subtitle: Option<String>,
    word_count: usize,
    image_count: usize,
    link_count: usize,
}

fn extract_content(docx: &docx_rs::Docx, package: &mut DocxPackage<'_>) -> Result<ExtractedContent> {
    let mut content = ExtractedContent::default();
    let mut builder = SectionBuilder::default();
    let mut paragraph_index = 0;

    for child in &docx.document.children {
        let docx_rs::DocumentChild::Paragraph(para) = child else {
            continue;
        };

        let layout = package.layout(paragraph_index).cloned();
        paragraph_index += 1;

        let collected = collect_paragraph_runs(para, package);
        let text = collected.text();
        let trimmed = text.trim();
        let images = resolve_images(package, layout.as_ref(), &mut content.image_count)?;

        if trimmed.is_empty() && images.is_empty() {
            continue;
        }

        match detect_style_role(para) {
            Some(StyleRole::Title) => {
                if content.title.is_none() && !trimmed.is_empty() {
                    content.title = Some(trimmed.to_string());
                }
                continue;
            }
            Some(StyleRole::Subtitle) => {
                if content.subtitle.is_none() && !trimmed.is_empty() {
                    content.subtitle = Some(trimmed.to_string());
                }
                continue;
            }
            Some(StyleRole::Heading(level)) => {
                if !trimmed.is_empty() {
                    content.word_count += count_words(trimmed);
                    builder.open_section(SectionTitle {
                        text: trimmed.to_string(),
                        level,
                        tag: heading_tag(level),
                    });
                }
                if !images.is_empty() {
                    builder.push_paragraph(Paragraph {
                        images,
                        ..Default::default()
                    });
                }
                continue;
            }
            None => {}
        }

        content.link_count += collected.links.len();

        match detect_list_item(para, &text, layout.as_ref(), &package.numbering) {
            Some(marker) => {
                let runs = strip_list_prefix(collected.runs, marker.typed_prefix_chars);
                let paragraph = build_paragraph(
                    ParagraphRuns {
                        runs,
                        links: collected.links,
                    },
                    images,
                );
                content.word_count += count_words(&paragraph.text);
                builder.push_list_item(&marker, paragraph);
            }
            None => {
                let paragraph = build_paragraph(collected, images);
                content.word_count += count_words(&paragraph.text);
                builder.push_paragraph(paragraph);
            }
        }
    }

    content.sections = builder.finish();
    Ok(content)
}

/// Heading cursor: collects blocks into the section of the last heading seen
#[derive(Debug, Default)]
struct SectionBuilder {
    sections: Vec<Section>,
    open_list: Option<ListBuilder>,
}

impl SectionBuilder {
    fn open_section(&mut self, title: SectionTitle) {
        self.close_list();
        self.sections.push(Section {
            title: Some(title),
            blocks: Vec::new(),
        });
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.close_list();
        self.current().blocks.push(Block::Paragraph(paragraph));
    }

    fn push_list_item(&mut self, marker: &ListMarker, content: Paragraph) {
        if self
            .open_list
            .as_ref()
            .is_some_and(|list| list.breaks_on(marker))
        {
            self.close_list();
        }

        self.open_list
            .get_or_insert_with(|| ListBuilder::new(marker.ordered))
            .push(ListItem {
                content,
                indent_level: marker.indent_level,
                sublist: Vec::new(),
            });
    }

    fn close_list(&mut self) {
        if let Some(list) = self.open_list.take() {
            let list = list.finish();
            self.current().blocks.push(Block::List(list));
        }
    }

    /// Section receiving new blocks; content before the first heading gets an
    /// untitled section of its own
    fn current(&mut self) -> &mut Section {
        if self.sections.is_empty() {
            self.sections.push(Section::default());
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    fn finish(mut self) -> Vec<Section> {
        self.close_list();
        self.sections
    }
}

/// Turn the picture references of a paragraph into numbered image entries
fn resolve_images(
    package: &mut DocxPackage<'_>,
    layout: Option<&ParagraphLayout>,
    image_count: &mut usize,
) -> Result<Vec<ImageRef>> {
    let Some(layout) = layout else {
        return Ok(Vec::new());
    };

    let mut images = Vec::with_capacity(layout.images.len());
    for image in &layout.images {
        let Some(source) = package.part_path(&image.rel_id) else {
            crate::debug!("parse"; "image {} has no package target, skipping", image.rel_id);
            continue;
        };

        *image_count += 1;
        let number = zero_pad(*image_count, 3);
        let extension = Path::new(&source)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("png")
            .to_lowercase();

        let (width, height) = match package.read_media(&source)? {
            Some(bytes) => probe_dimensions(&bytes),
            None => (None, None),
        };

        images.push(ImageRef {
            rel_id: image.rel_id.clone(),
            file_name: format!("image-{number}.{extension}"),
            alt: image
                .alt
                .clone()
                .unwrap_or_else(|| format!("image-{number}")),
            source,
            width,
            height,
        });
    }

    Ok(images)
}

/// Pixel size of an embedded picture; vector formats report nothing
fn probe_dimensions(bytes: &[u8]) -> (Option<u32>, Option<u32>) {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
        .map_or((None, None), |(width, height)| (Some(width), Some(height)))
}

fn count_words(text: &str) -> usize {
    text.unicode_words().count()
}

fn document_date(core: &CoreProperties) -> Option<i64> {
    core.created
        .as_deref()
        .and_then(parse_w3c_datetime)
        .or_else(|| core.modified.as_deref().and_then(parse_w3c_datetime))
}

fn file_modified_ms(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(since_epoch.as_millis()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn marker(ordered: bool, indent: f32) -> ListMarker {
        ListMarker {
            ordered,
            indent_level: indent,
            typed_prefix_chars: 0,
        }
    }

    fn title(text: &str) -> SectionTitle {
        SectionTitle {
            text: text.to_string(),
            level: 1,
            tag: heading_tag(1),
        }
    }

    #[test]
    fn test_content_before_first_heading_gets_untitled_section() {
        let mut builder = SectionBuilder::default();
        builder.push_paragraph(paragraph("Intro"));
        builder.open_section(title("First"));
        builder.push_paragraph(paragraph("Body"));

        let sections = builder.finish();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].title.is_none());
        assert_eq!(sections[1].title.as_ref().unwrap().text, "First");
        assert_eq!(sections[1].blocks, vec![Block::Paragraph(paragraph("Body"))]);
    }

    #[test]
    fn test_heading_closes_open_list() {
        let mut builder = SectionBuilder::default();
        builder.open_section(title("Shopping"));
        builder.push_list_item(&marker(false, 36.0), paragraph("Bread"));
        builder.push_list_item(&marker(false, 72.0), paragraph("Rye"));
        builder.open_section(title("Next"));
        builder.push_list_item(&marker(true, 36.0), paragraph("Step"));

        let sections = builder.finish();
        assert_eq!(sections.len(), 2);

        let Block::List(list) = &sections[0].blocks[0] else {
            panic!("expected a list");
        };
        assert!(!list.ordered);
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].sublist[0].content.text, "Rye");

        let Block::List(list) = &sections[1].blocks[0] else {
            panic!("expected a list");
        };
        assert!(list.ordered);
    }

    #[test]
    fn test_paragraph_between_list_items_splits_the_list() {
        let mut builder = SectionBuilder::default();
        builder.push_list_item(&marker(false, 0.0), paragraph("a"));
        builder.push_paragraph(paragraph("between"));
        builder.push_list_item(&marker(false, 0.0), paragraph("b"));

        let sections = builder.finish();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].blocks.len(), 3);
        assert!(matches!(sections[0].blocks[2], Block::List(_)));
    }

    #[test]
    fn test_switching_list_kind_at_top_level_starts_new_list() {
        let mut builder = SectionBuilder::default();
        builder.push_list_item(&marker(false, 0.0), paragraph("bullet"));
        builder.push_list_item(&marker(true, 0.0), paragraph("number"));

        let sections = builder.finish();
        assert_eq!(sections[0].blocks.len(), 2);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Grace alone, faith alone."), 4);
        assert_eq!(count_words("  "), 0);
    }
}
