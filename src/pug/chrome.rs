//! Site chrome shared by every post page: navigation bar and footer

use super::content::escape_text;
use super::writer::{PugDocument, escape_attr};
use crate::config::SiteChrome;

pub fn add_nav_bar(doc: &mut PugDocument, site: &SiteChrome) {
    doc.push_body(0, "div#nav-bar.navbar.header-content--mini");
    doc.push_body(1, "nav");
    doc.push_body(2, "div.main-menu");
    doc.push_body(3, "a.menu-branding(href=\"/\")");
    doc.push_body(
        4,
        format!(
            "img.menu-branding(src=\"{}\" alt=\"branding-logo\")",
            escape_attr(&site.logo)
        ),
    );
    doc.push_body(4, format!("h3 {}", escape_text(&site.author)));

    doc.push_body(3, "ul.menu-list");
    for link in &site.nav {
        doc.push_body(4, "li");
        doc.push_body(
            5,
            format!(
                "a(href=\"{}\") {}",
                escape_attr(&link.href),
                escape_text(&link.label)
            ),
        );
    }
    doc.push_body(4, "li");
    doc.push_body(5, "button.display-switch ☀️");
}

pub fn add_footer(doc: &mut PugDocument, site: &SiteChrome) {
    doc.push_body(0, ".footer");
    doc.push_body(1, ".footer-container");
    doc.push_body(2, format!("p {}", escape_text(&site.motto)));

    doc.push_body(2, ".socials");
    doc.push_body(3, "ul");
    for social in &site.socials {
        doc.push_body(4, "li.social-links");
        doc.push_body(5, format!("a(href=\"{}\")", escape_attr(&social.href)));
        doc.push_body(6, format!("img(src=\"{}\")", escape_attr(&social.icon)));
    }

    doc.push_body(2, "p.footer-small Icons provided by ");
    doc.push_body(
        3,
        format!(
            "a(href=\"{}\" title=\"{}\") {}",
            escape_attr(&site.credit_href),
            escape_attr(&site.credit_title),
            escape_text(&site.credit_label)
        ),
    );
}
