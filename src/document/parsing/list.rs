//! List processing and detection
//!
//! This module handles detection of list items from paragraphs and
//! grouping them into nested list structures by their left indent.

use once_cell::sync::Lazy;
use regex::Regex;

use super::super::models::*;
use super::package::{NumberingFormats, ParagraphLayout};

/// Word's default indent step for each list level, in points
pub(crate) const LIST_LEVEL_INDENT: f32 = 36.0;

/// Bullets and numbers typed by hand at the start of a paragraph
static TYPED_LIST_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:([•\-\*–·▪◦])|(\d{1,3})[.)])\s+\S").unwrap());

/// How a paragraph takes part in a list
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListMarker {
    pub(crate) ordered: bool,
    /// Left indent in points
    pub(crate) indent_level: f32,
    /// Characters of hand-typed bullet/number to strip from the text
    pub(crate) typed_prefix_chars: usize,
}

/// Detect whether a paragraph is a list item
///
/// Word numbering properties win, then list paragraph styles, then a bullet
/// or number typed at the start of the text.
pub(crate) fn detect_list_item(
    para: &docx_rs::Paragraph,
    text: &str,
    layout: Option<&ParagraphLayout>,
    numbering: &NumberingFormats,
) -> Option<ListMarker> {
    let direct_indent = layout.and_then(ParagraphLayout::left_indent_points);
    let style = para
        .property
        .style
        .as_ref()
        .map(|style| style.val.to_lowercase())
        .unwrap_or_default();

    if let Some((num_id, level)) = numbering_info(para) {
        let ordered = numbering
            .is_ordered(num_id, level)
            .unwrap_or_else(|| style.contains("number"));
        return Some(ListMarker {
            ordered,
            indent_level: direct_indent.unwrap_or((level as f32 + 1.0) * LIST_LEVEL_INDENT),
            typed_prefix_chars: 0,
        });
    }

    if style.starts_with("list") {
        return Some(ListMarker {
            ordered: style.contains("number"),
            indent_level: direct_indent.unwrap_or(0.0),
            typed_prefix_chars: typed_prefix(text).map_or(0, |(chars, _)| chars),
        });
    }

    let (chars, ordered) = typed_prefix(text)?;
    Some(ListMarker {
        ordered,
        indent_level: direct_indent.unwrap_or(0.0),
        typed_prefix_chars: chars,
    })
}

/// Numbering id and level, ignoring numId 0 which switches numbering off
fn numbering_info(para: &docx_rs::Paragraph) -> Option<(usize, usize)> {
    let num_pr = para.property.numbering_property.as_ref()?;
    let num_id = num_pr.id.as_ref()?.id;
    if num_id == 0 {
        return None;
    }
    let level = num_pr.level.as_ref().map(|l| l.val).unwrap_or(0);
    Some((num_id, level))
}

/// Length in characters of a typed bullet or number prefix (including the
/// whitespace after it) and whether it is a number
pub(crate) fn typed_prefix(text: &str) -> Option<(usize, bool)> {
    let caps = TYPED_LIST_PREFIX.captures(text)?;
    let whole = caps.get(0)?;
    // The match ends on the first character of the item text
    let prefix = &text[..whole.end()];
    let prefix_chars = prefix.chars().count() - 1;
    Some((prefix_chars, caps.get(2).is_some()))
}

/// Remove a typed prefix from the runs while preserving formatting
pub(crate) fn strip_list_prefix(runs: Vec<FormattedRun>, prefix_chars: usize) -> Vec<FormattedRun> {
    if prefix_chars == 0 {
        return runs;
    }

    let mut result_runs = Vec::new();
    let mut chars_to_remove = prefix_chars;

    for run in runs {
        if chars_to_remove == 0 {
            result_runs.push(run);
            continue;
        }

        let run_char_count = run.text.chars().count();
        if run_char_count <= chars_to_remove {
            // This entire run is part of the prefix to remove
            chars_to_remove -= run_char_count;
        } else {
            let keep_text: String = run.text.chars().skip(chars_to_remove).collect();
            result_runs.push(FormattedRun {
                text: keep_text,
                formatting: run.formatting,
                link: run.link,
            });
            chars_to_remove = 0;
        }
    }

    result_runs
}

/// Accumulates consecutive list paragraphs into one nested list
#[derive(Debug)]
pub(crate) struct ListBuilder {
    ordered: bool,
    items: Vec<ListItem>,
}

impl ListBuilder {
    pub(crate) fn new(ordered: bool) -> Self {
        Self {
            ordered,
            items: Vec::new(),
        }
    }

    /// Whether an item with this marker belongs in a new list instead
    ///
    /// Switching between bullets and numbers at the outermost level starts a
    /// new list; nested items always stay.
    pub(crate) fn breaks_on(&self, marker: &ListMarker) -> bool {
        let outermost = self
            .items
            .first()
            .is_none_or(|first| marker.indent_level <= first.indent_level);
        outermost && marker.ordered != self.ordered
    }

    pub(crate) fn push(&mut self, item: ListItem) {
        insert_nested(&mut self.items, item);
    }

    pub(crate) fn finish(self) -> List {
        List {
            ordered: self.ordered,
            items: self.items,
        }
    }
}

/// Attach an item under the last item of the deepest level whose indent it
/// exceeds, otherwise as a sibling at that level
fn insert_nested(items: &mut Vec<ListItem>, item: ListItem) {
    let nests = items
        .last()
        .is_some_and(|last| item.indent_level > last.indent_level);

    if nests {
        if let Some(last) = items.last_mut() {
            insert_nested(&mut last.sublist, item);
            return;
        }
    }
    items.push(item);
}
