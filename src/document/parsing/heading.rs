//! Heading detection and classification
//!
//! Paragraph styles decide the structure: `Heading<N>` opens a section,
//! `Title` and `Subtitle` feed the post's title and description.

/// Role a paragraph's style gives it in the document outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StyleRole {
    Title,
    Subtitle,
    Heading(u8),
}

/// Deepest heading level Word offers
const MAX_HEADING_LEVEL: u8 = 9;

/// Detect the outline role of a paragraph from its style id
pub(crate) fn detect_style_role(para: &docx_rs::Paragraph) -> Option<StyleRole> {
    let style = para.property.style.as_ref()?;
    style_role(&style.val)
}

pub(crate) fn style_role(style_id: &str) -> Option<StyleRole> {
    let compact: String = style_id
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    match compact.as_str() {
        "title" => return Some(StyleRole::Title),
        "subtitle" => return Some(StyleRole::Subtitle),
        _ => {}
    }

    let rest = compact.strip_prefix("heading")?;
    if rest.is_empty() {
        // Default to level 1 for unnumbered heading styles
        return Some(StyleRole::Heading(1));
    }

    let level = rest.parse::<u8>().ok()?;
    Some(StyleRole::Heading(level.clamp(1, MAX_HEADING_LEVEL)))
}

/// HTML tag for a heading inside the post body; `h1` is the post title
pub(crate) fn heading_tag(level: u8) -> String {
    format!("h{}", (level.saturating_add(1)).clamp(2, 6))
}
