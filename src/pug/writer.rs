//! Pug file skeleton
//!
//! A page is built in memory: head lines, body lines and trailing script
//! tags are collected separately and rendered once.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const SKELETON: &str = "doctype html\n\
html(lang='en')\n\
\thead\n\
\t\tmeta(charset=\"UTF-8\")\n\
\t\tmeta(name=\"viewport\" content=\"width=device-width, initial-scale=1.0\")\n";

/// Meta tags are emitted once per social graph
const META_PROPERTIES: [&str; 2] = ["og", "twitter"];

/// Tabs for a line nested `level` deep below `head` or `body`
pub fn indent(level: usize) -> String {
    "\t".repeat(level + 2)
}

/// Escape text for a Pug attribute value in double quotes
pub fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PugDocument {
    head: Vec<String>,
    body: Vec<String>,
    scripts: Vec<String>,
}

impl PugDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_meta_pair(&mut self, tag: &str, content: &str) {
        let content = escape_attr(content);
        for property in META_PROPERTIES {
            self.head.push(format!(
                "meta(name=\"{tag}\" property=\"{property}:{tag}\" content=\"{content}\")"
            ));
        }
    }

    pub fn add_title(&mut self, title: &str) {
        self.add_meta_pair("title", title);
    }

    pub fn add_description(&mut self, description: &str) {
        self.add_meta_pair("description", description);
    }

    pub fn add_image(&mut self, image_url: &str) {
        self.add_meta_pair("image", image_url);
    }

    /// Custom meta tags in the given order. Twitter card tags are keyed by
    /// `name`, Open Graph tags by `property`.
    pub fn add_meta(&mut self, tags: &[(&str, &str)]) {
        for (key, value) in tags {
            let attribute = if key.starts_with("twitter:") {
                "name"
            } else {
                "property"
            };
            self.head.push(format!(
                "meta({attribute}=\"{key}\" content=\"{}\")",
                escape_attr(value)
            ));
        }
    }

    pub fn add_icon(&mut self, logo: &str) {
        self.head
            .push(format!("link(rel=\"icon\" href=\"{}\")", escape_attr(logo)));
    }

    pub fn add_css(&mut self, parent: bool, file_name: &str) {
        self.head.push(format!(
            "link(rel=\"stylesheet\" href=\"{}{file_name}\")",
            asset_prefix(parent)
        ));
    }

    pub fn add_javascript(&mut self, parent: bool, file_name: &str) {
        self.scripts.push(format!(
            "script(type=\"text/javascript\" src=\"{}{file_name}\")",
            asset_prefix(parent)
        ));
    }

    /// Append a body line nested `level` deep below `body`
    pub fn push_body(&mut self, level: usize, line: impl AsRef<str>) {
        self.body.push(format!("{}{}", indent(level), line.as_ref()));
    }

    pub fn head_lines(&self) -> &[String] {
        &self.head
    }

    pub fn body_lines(&self) -> &[String] {
        &self.body
    }

    pub fn render(&self) -> String {
        let mut out = String::from(SKELETON);
        let head_indent = indent(0);

        for line in &self.head {
            out.push_str(&head_indent);
            out.push_str(line);
            out.push('\n');
        }

        out.push_str("\tbody\n");
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
        for line in &self.scripts {
            out.push_str(&head_indent);
            out.push_str(line);
            out.push('\n');
        }

        out
    }

    /// Render to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn asset_prefix(parent: bool) -> &'static str {
    if parent { "/../" } else { "/" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_only() {
        let doc = PugDocument::new();
        assert_eq!(
            doc.render(),
            "doctype html\nhtml(lang='en')\n\thead\n\t\tmeta(charset=\"UTF-8\")\n\t\tmeta(name=\"viewport\" content=\"width=device-width, initial-scale=1.0\")\n\tbody\n"
        );
    }

    #[test]
    fn test_meta_pairs_and_custom_meta() {
        let mut doc = PugDocument::new();
        doc.add_title("Grace \"Alone\"");
        doc.add_meta(&[("twitter:card", "summary_large_image"), ("og:type", "website")]);

        assert_eq!(
            doc.head_lines(),
            &[
                "meta(name=\"title\" property=\"og:title\" content=\"Grace &quot;Alone&quot;\")",
                "meta(name=\"title\" property=\"twitter:title\" content=\"Grace &quot;Alone&quot;\")",
                "meta(name=\"twitter:card\" content=\"summary_large_image\")",
                "meta(property=\"og:type\" content=\"website\")",
            ]
        );
    }

    #[test]
    fn test_assets_and_body_order() {
        let mut doc = PugDocument::new();
        doc.add_css(true, "style.css");
        doc.add_javascript(false, "scripts/main.js");
        doc.push_body(0, "div.post-body");
        doc.push_body(1, "div.post-content");

        let rendered = doc.render();
        assert!(rendered.contains("\t\tlink(rel=\"stylesheet\" href=\"/../style.css\")\n\tbody\n"));
        assert!(rendered.ends_with(
            "\t\tdiv.post-body\n\t\t\tdiv.post-content\n\t\tscript(type=\"text/javascript\" src=\"/scripts/main.js\")\n"
        ));
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles").join("post").join("index.pug");
        PugDocument::new().write(&path).unwrap();
        assert!(fs::read_to_string(path).unwrap().starts_with("doctype html"));
    }
}
