//! Post page generator

use std::path::{Path, PathBuf};

use super::chrome::{add_footer, add_nav_bar};
use super::content::{add_post_content, escape_text};
use super::writer::{PugDocument, escape_attr};
use crate::config::SiteConfig;
use crate::document::DocumentModel;
use crate::utils::format_long_date;

/// Where a post is published on the site
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostType {
    #[default]
    Article,
    Note,
}

impl PostType {
    pub fn dir_name(&self) -> &'static str {
        match self {
            PostType::Article => "articles",
            PostType::Note => "notes",
        }
    }

    fn describe(&self, description: &str) -> String {
        match self {
            PostType::Article => format!("Blog post about {description}."),
            PostType::Note => format!("Note about {description}."),
        }
    }
}

pub struct PostGenerator<'a> {
    config: &'a SiteConfig,
    model: &'a DocumentModel,
    post_type: PostType,
}

impl<'a> PostGenerator<'a> {
    pub fn new(config: &'a SiteConfig, model: &'a DocumentModel, post_type: PostType) -> Self {
        Self {
            config,
            model,
            post_type,
        }
    }

    /// `{root}/{articles|notes}/{id}/index.pug`
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(self.post_type.dir_name())
            .join(&self.model.id)
            .join("index.pug")
    }

    pub fn generate(&self) -> PugDocument {
        let mut doc = PugDocument::new();
        self.add_head(&mut doc);

        let site = &self.config.site;
        add_nav_bar(&mut doc, site);
        doc.push_body(0, "div.post-body");
        doc.push_body(1, "article.button#post-container");
        self.add_header(&mut doc);
        add_post_content(&mut doc, self.model);
        add_footer(&mut doc, site);

        for script in &site.scripts {
            doc.add_javascript(false, script);
        }

        doc
    }

    fn add_head(&self, doc: &mut PugDocument) {
        let site = &self.config.site;
        let model = self.model;

        doc.add_title(&model.title);
        doc.add_description(&self.post_type.describe(&model.description));
        doc.add_icon(&site.logo);
        doc.add_image(&format!(
            "{}/{}",
            site.base_url.trim_end_matches('/'),
            model.image.name
        ));
        doc.add_meta(&[
            ("twitter:card", "summary_large_image"),
            ("twitter:site", site.twitter.as_str()),
            ("og:url", site.base_url.as_str()),
            ("og:type", "website"),
        ]);
        doc.add_css(false, &site.stylesheet);
    }

    fn add_header(&self, doc: &mut PugDocument) {
        let site = &self.config.site;
        let model = self.model;

        doc.push_body(1, "div.post-header-container");
        doc.push_body(2, "div.post-header-details");
        doc.push_body(3, format!("h1#post-header-title {}", escape_text(&model.title)));
        doc.push_body(3, "div.post-header-meta");
        doc.push_body(
            4,
            format!(
                "img.post-header-icon(src=\"{}\" alt=\"headshot\")",
                escape_attr(&site.headshot)
            ),
        );
        doc.push_body(
            4,
            format!("p.post-header-time {}", format_long_date(model.date)),
        );
        doc.push_body(4, "span.post-header-divider |");
        doc.push_body(4, format!("p#post-read-time {}", model.time.label()));
        doc.push_body(4, "button.post-header-shareButton#shareButton");
        doc.push_body(5, "span.post-header-shareButton-icon");
        doc.push_body(
            6,
            format!(
                "img(src=\"{}\" alt=\"share_icon\")",
                escape_attr(&site.share_icon)
            ),
        );
        doc.push_body(6, ".");
        doc.push_body(7, "Share");

        if !model.tags.is_empty() {
            doc.push_body(3, "div.post-header-tags");
            for tag in &model.tags {
                doc.push_body(4, format!("span.post-header-tag {}", escape_text(tag)));
            }
        }

        doc.push_body(
            2,
            format!(
                "img.post-header-image(src=\"/{}\" alt=\"{}\")",
                model.image.name,
                escape_attr(&model.image.alt)
            ),
        );
    }
}
