//! Core data structures for document representation
//!
//! This module defines the public types a parsed blog document is turned
//! into: sections opened by headings, paragraph and list blocks, run-level
//! formatting, links, images and the post metadata the page generator needs.

use serde::{Deserialize, Serialize};

use crate::reading_time::ReadingTime;

/// Options that steer how a document is turned into a post model
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Overrides the document type stored in the file's core properties
    pub doc_type: Option<String>,
    /// Publication date as milliseconds since the Unix epoch
    pub date: Option<i64>,
    pub words_per_minute: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            doc_type: None,
            date: None,
            words_per_minute: crate::reading_time::WORDS_PER_MINUTE,
        }
    }
}

/// A parsed blog document, the root of the saved JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: PostImage,
    /// Milliseconds since the Unix epoch, the way the site scripts expect it
    pub date: i64,
    pub time: ReadingTime,
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub content: Vec<Section>,
}

impl DocumentModel {
    /// Headings in document order, paired with their level
    pub fn outline(&self) -> Vec<(u8, &str)> {
        self.content
            .iter()
            .filter_map(|section| section.title.as_ref())
            .map(|title| (title.level, title.text.as_str()))
            .collect()
    }

    /// All images referenced anywhere in the document, in order
    pub fn images(&self) -> Vec<&ImageRef> {
        let mut images = Vec::new();
        for section in &self.content {
            for block in &section.blocks {
                match block {
                    Block::Paragraph(paragraph) => images.extend(paragraph.images.iter()),
                    Block::List(list) => collect_list_images(&list.items, &mut images),
                }
            }
        }
        images
    }
}

fn collect_list_images<'a>(items: &'a [ListItem], images: &mut Vec<&'a ImageRef>) {
    for item in items {
        images.extend(item.content.images.iter());
        collect_list_images(&item.sublist, images);
    }
}

/// Header image of a post, chosen from its document type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub name: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub word_count: usize,
    #[serde(default)]
    pub image_count: usize,
    #[serde(default)]
    pub link_count: usize,
}

/// Content grouped under one heading
///
/// The first section of a document has no title when text precedes the
/// first heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: Option<SectionTitle>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTitle {
    pub text: String,
    pub level: u8,
    /// HTML tag used for the heading on the page, e.g. `h2`
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    List(List),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default)]
    pub runs: Vec<FormattedRun>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bold_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub italic_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub underline_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Hyperlink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFormatting {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
}

impl TextFormatting {
    pub fn is_plain(&self) -> bool {
        *self == TextFormatting::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRun {
    pub text: String,
    #[serde(default)]
    pub formatting: TextFormatting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl FormattedRun {
    /// Consolidate adjacent runs with identical formatting into single runs
    pub fn consolidate_runs(runs: Vec<FormattedRun>) -> Vec<FormattedRun> {
        let mut consolidated: Vec<FormattedRun> = Vec::with_capacity(runs.len());

        for run in runs {
            match consolidated.last_mut() {
                Some(current) if current.formatting == run.formatting && current.link == run.link => {
                    current.text.push_str(&run.text);
                }
                _ => consolidated.push(run),
            }
        }

        consolidated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(flatten)]
    pub content: Paragraph,
    /// Left indent in points
    pub indent_level: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sublist: Vec<ListItem>,
}

/// An embedded picture, tied to the paragraph it appears in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub rel_id: String,
    /// Path of the media part inside the package, e.g. `word/media/image1.png`
    pub source: String,
    /// Name the image is published under, e.g. `image-001.png`
    pub file_name: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}
