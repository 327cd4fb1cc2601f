//! Post body: sections, paragraphs, lists and pictures
//!
//! Run formatting becomes Pug tag interpolation, e.g. a bold run inside a
//! link renders as `#[a(href="...") #[strong text]]`.

use super::writer::{PugDocument, escape_attr};
use crate::document::{Block, DocumentModel, FormattedRun, ImageRef, List, Paragraph, Section};
use crate::utils::section_anchor;

/// Nesting of `div.post-content` below `body`
const CONTENT_LEVEL: usize = 1;

/// Escape text so Pug does not read it as interpolation
pub fn escape_text(text: &str) -> String {
    text.replace("#[", "\\#[")
        .replace("#{", "\\#{")
        .replace("!{", "\\!{")
}

/// Escape text placed inside a `#[tag ...]` interpolation
fn escape_interpolated(text: &str) -> String {
    escape_text(text).replace(']', "&#93;")
}

pub fn add_post_content(doc: &mut PugDocument, model: &DocumentModel) {
    doc.push_body(CONTENT_LEVEL, "div.post-content");
    for section in &model.content {
        add_section(doc, model, section, CONTENT_LEVEL + 1);
    }
}

fn add_section(doc: &mut PugDocument, model: &DocumentModel, section: &Section, level: usize) {
    match &section.title {
        Some(title) => {
            doc.push_body(
                level,
                format!("div.post-section-container#{}", section_anchor(&title.text)),
            );
            doc.push_body(
                level + 1,
                format!("{}.section-title {}", title.tag, escape_text(&title.text)),
            );
        }
        None => doc.push_body(level, "div.post-section-container"),
    }

    for block in &section.blocks {
        match block {
            Block::Paragraph(paragraph) => add_paragraph(doc, model, paragraph, level + 1),
            Block::List(list) => add_list(doc, model, list, level + 1),
        }
    }
}

fn add_paragraph(doc: &mut PugDocument, model: &DocumentModel, paragraph: &Paragraph, level: usize) {
    let inline = inline_text(&paragraph.runs);
    if !inline.is_empty() {
        doc.push_body(level, format!("p.post-paragraph {inline}"));
    }
    add_images(doc, model, &paragraph.images, level);
}

fn add_list(doc: &mut PugDocument, model: &DocumentModel, list: &List, level: usize) {
    let tag = if list.ordered { "ol" } else { "ul" };
    doc.push_body(level, format!("{tag}.post-list"));

    for item in &list.items {
        let inline = inline_text(&item.content.runs);
        if inline.is_empty() {
            doc.push_body(level + 1, "li");
        } else {
            doc.push_body(level + 1, format!("li {inline}"));
        }
        add_images(doc, model, &item.content.images, level + 2);

        if !item.sublist.is_empty() {
            let sublist = List {
                ordered: list.ordered,
                items: item.sublist.clone(),
            };
            add_list(doc, model, &sublist, level + 2);
        }
    }
}

fn add_images(doc: &mut PugDocument, model: &DocumentModel, images: &[ImageRef], level: usize) {
    for image in images {
        doc.push_body(
            level,
            format!(
                "img.post-image(src=\"/images/posts/{}/{}\" alt=\"{}\")",
                model.id,
                image.file_name,
                escape_attr(&image.alt)
            ),
        );
    }
}

/// Render runs as one line of Pug text with inline tags
///
/// Consecutive runs pointing at the same link share one anchor.
pub fn inline_text(runs: &[FormattedRun]) -> String {
    let mut out = String::new();
    let mut index = 0;

    while index < runs.len() {
        let link = runs[index].link.as_deref();
        let end = runs[index..]
            .iter()
            .position(|run| run.link.as_deref() != link)
            .map_or(runs.len(), |offset| index + offset);

        match link {
            Some(url) => {
                let inner: String = runs[index..end]
                    .iter()
                    .map(|run| format_run(run, true))
                    .collect();
                let (leading, core, trailing) = split_edges(&inner);
                if core.is_empty() {
                    out.push_str(&inner);
                } else {
                    out.push_str(&format!(
                        "{leading}#[a(href=\"{}\") {core}]{trailing}",
                        escape_attr(url)
                    ));
                }
            }
            None => {
                for run in &runs[index..end] {
                    out.push_str(&format_run(run, false));
                }
            }
        }
        index = end;
    }

    out.trim().to_string()
}

fn format_run(run: &FormattedRun, in_interpolation: bool) -> String {
    let formatting = &run.formatting;
    let wrapped = !formatting.is_plain() && !run.text.trim().is_empty();

    let text = if wrapped || in_interpolation {
        escape_interpolated(&run.text)
    } else {
        escape_text(&run.text)
    };
    let text = line_breaks(&text.replace('\t', " "));

    if !wrapped {
        return text;
    }

    let (leading, core, trailing) = split_edges(&text);
    let mut inner = core.to_string();

    let tags = [
        (formatting.strikethrough, "s"),
        (formatting.underline, "u"),
        (formatting.italic, "em"),
        (formatting.bold, "strong"),
    ];
    for (enabled, tag) in tags {
        if enabled {
            inner = format!("#[{tag} {inner}]");
        }
    }

    format!("{leading}{inner}{trailing}")
}

/// Split off surrounding whitespace so it stays outside a tag and words
/// stay apart
fn split_edges(text: &str) -> (&str, &str, &str) {
    let leading = &text[..text.len() - text.trim_start().len()];
    let core = text.trim();
    let trailing = &text[leading.len() + core.len()..];
    (leading, core, trailing)
}

fn line_breaks(text: &str) -> String {
    text.replace('\n', "#[br]")
}
