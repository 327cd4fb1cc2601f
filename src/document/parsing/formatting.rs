//! Text extraction and formatting utilities
//!
//! This module handles extraction of text, run formatting and hyperlinks
//! from docx-rs paragraph and run elements, and the per-paragraph grouping
//! of formatted runs into bold, italic and underlined phrases.

use super::super::models::*;
use super::package::DocxPackage;

/// Runs and hyperlinks of one paragraph, in reading order
#[derive(Debug, Default)]
pub(crate) struct ParagraphRuns {
    pub(crate) runs: Vec<FormattedRun>,
    pub(crate) links: Vec<Hyperlink>,
}

impl ParagraphRuns {
    pub(crate) fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Collect the formatted runs of a paragraph, following tracked insertions
/// and hyperlinks. Deleted text is skipped.
pub(crate) fn collect_paragraph_runs(
    para: &docx_rs::Paragraph,
    package: &DocxPackage<'_>,
) -> ParagraphRuns {
    let mut collected = ParagraphRuns::default();
    collect_children(&para.children, None, package, &mut collected);
    collected.runs = FormattedRun::consolidate_runs(collected.runs);
    collected
}

fn collect_children(
    children: &[docx_rs::ParagraphChild],
    link: Option<&str>,
    package: &DocxPackage<'_>,
    collected: &mut ParagraphRuns,
) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run(run, link, collected),
            docx_rs::ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let docx_rs::InsertChild::Run(run) = child {
                        push_run(run, link, collected);
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(hyperlink) => {
                let url = resolve_hyperlink(&hyperlink.link, package);
                let start = collected.runs.len();
                collect_children(&hyperlink.children, url.as_deref(), package, collected);

                if let Some(url) = url {
                    let text: String = collected.runs[start..]
                        .iter()
                        .map(|run| run.text.as_str())
                        .collect();
                    let text = text.trim();
                    if !text.is_empty() {
                        collected.links.push(Hyperlink {
                            text: text.to_string(),
                            url,
                        });
                    }
                }
            }
            docx_rs::ParagraphChild::Delete(_) => {
                // Skip deletions (track changes)
            }
            _ => {}
        }
    }
}

fn push_run(run: &docx_rs::Run, link: Option<&str>, collected: &mut ParagraphRuns) {
    let text = extract_run_text(run);
    if text.is_empty() {
        return;
    }

    collected.runs.push(FormattedRun {
        text,
        formatting: extract_run_formatting(run),
        link: link.map(str::to_string),
    });
}

fn resolve_hyperlink(link: &docx_rs::HyperlinkData, package: &DocxPackage<'_>) -> Option<String> {
    match link {
        docx_rs::HyperlinkData::External { rid, path } => package
            .hyperlink_url(rid)
            .or_else(|| (!path.is_empty()).then(|| path.clone())),
        docx_rs::HyperlinkData::Anchor { anchor } => Some(format!("#{anchor}")),
    }
}

/// Extract text from a run using docx-rs features
pub(crate) fn extract_run_text(run: &docx_rs::Run) -> String {
    let mut text = String::new();

    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text_elem) => {
                text.push_str(&text_elem.text);
            }
            docx_rs::RunChild::Tab(_) => {
                text.push('\t');
            }
            docx_rs::RunChild::Break(_) => {
                text.push('\n');
            }
            _ => {
                // Pictures are picked up by the package scan
            }
        }
    }

    text
}

/// Extract formatting information from a run
///
/// Word switches an inherited attribute off with an explicit value
/// (`<w:b w:val="0"/>`, `<w:u w:val="none"/>`), so presence alone is not
/// enough.
pub(crate) fn extract_run_formatting(run: &docx_rs::Run) -> TextFormatting {
    let props = &run.run_property;
    TextFormatting {
        bold: toggle_enabled(props.bold.as_ref()),
        italic: toggle_enabled(props.italic.as_ref()),
        underline: underline_enabled(props.underline.as_ref()),
        strikethrough: toggle_enabled(props.strike.as_ref())
            || toggle_enabled(props.dstrike.as_ref()),
    }
}

/// docx-rs serializes on/off properties to their boolean value
fn toggle_enabled<T: serde::Serialize>(toggle: Option<&T>) -> bool {
    match toggle {
        Some(toggle) => !matches!(
            serde_json::to_value(toggle),
            Ok(serde_json::Value::Bool(false))
        ),
        None => false,
    }
}

fn underline_enabled(underline: Option<&docx_rs::Underline>) -> bool {
    match underline.map(serde_json::to_value) {
        Some(Ok(serde_json::Value::String(val))) => {
            !matches!(val.trim().to_ascii_lowercase().as_str(), "none" | "0" | "false")
        }
        Some(Ok(serde_json::Value::Bool(on))) => on,
        Some(_) => true,
        None => false,
    }
}

/// Group runs into phrases sharing one attribute
///
/// Consecutive runs with the attribute join into one phrase (trimmed pieces
/// separated by a single space); the first run without it closes the phrase.
/// A phrase still open at the end of the paragraph is kept.
pub(crate) fn formatted_phrases(
    runs: &[FormattedRun],
    has_attribute: impl Fn(&TextFormatting) -> bool,
) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut phrase: Vec<&str> = Vec::new();

    for run in runs {
        if has_attribute(&run.formatting) {
            let word = run.text.trim();
            if !word.is_empty() {
                phrase.push(word);
            }
        } else if !phrase.is_empty() {
            phrases.push(phrase.join(" "));
            phrase.clear();
        }
    }

    if !phrase.is_empty() {
        phrases.push(phrase.join(" "));
    }

    phrases
}

/// Assemble a paragraph from its runs, links and pictures
pub(crate) fn build_paragraph(
    collected: ParagraphRuns,
    images: Vec<ImageRef>,
) -> Paragraph {
    let text = collected.text().trim().to_string();
    let runs = collected.runs;

    Paragraph {
        text,
        bold_phrases: formatted_phrases(&runs, |f| f.bold),
        italic_phrases: formatted_phrases(&runs, |f| f.italic),
        underline_phrases: formatted_phrases(&runs, |f| f.underline),
        links: collected.links,
        images,
        runs,
    }
}
