//! Document type lookup tables
//!
//! A post's document type (e.g. `theology`, `docker`) picks the header image
//! and the tag list shown on the page.

use crate::document::PostImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Theology,
    Covenant,
    Thankful,
    Family,
    Health,
    Code,
    Technology,
    SystemDesign,
    Algorithm,
    Docker,
    Jenkins,
    Other,
}

impl Category {
    pub fn from_doc_type(doc_type: &str) -> Self {
        match doc_type.trim().to_lowercase().as_str() {
            "theology" => Category::Theology,
            "covenant" => Category::Covenant,
            "thankful" => Category::Thankful,
            "family" => Category::Family,
            "health" => Category::Health,
            "code" => Category::Code,
            "tech" | "technology" => Category::Technology,
            "system design" => Category::SystemDesign,
            "algo" | "algorithm" => Category::Algorithm,
            "docker" => Category::Docker,
            "jenkins" => Category::Jenkins,
            _ => Category::Other,
        }
    }

    pub fn image(&self) -> PostImage {
        let (name, alt) = match self {
            Category::Theology | Category::Covenant => ("images/bible-icon.png", "bible-icon"),
            Category::Thankful => ("images/thankful.png", "thankful-icon"),
            Category::Family => ("images/family.png", "family-image"),
            Category::Health => ("images/heart_strength.png", "health-img"),
            Category::Code | Category::Technology | Category::SystemDesign => {
                ("images/web-dev.png", "web-dev-img")
            }
            Category::Algorithm => ("images/algorithm.png", "algo-img"),
            Category::Docker => ("images/docker.png", "docker-image"),
            Category::Jenkins => ("images/jenkins.png", "jenkins-image"),
            Category::Other => ("images/image.png", "image-title"),
        };

        PostImage {
            name: name.to_string(),
            alt: alt.to_string(),
        }
    }

    /// Tags shown in the post header. Types without their own list get the
    /// template tags.
    pub fn tags(&self) -> Vec<String> {
        let tags: &[&str] = match self {
            Category::Theology => &["Theology", "God", "Gospel", "Reformed"],
            Category::Covenant => &["Christ", "Covenant", "Reformed", "Gospel"],
            Category::Thankful => &["Christ", "Salvation", "Love", "Thankful"],
            Category::Health => &["Health", "Fitness"],
            Category::Technology => &["Technology", "Engineer"],
            Category::Algorithm => &["Data Structures", "Algorithms", "Tech Interview"],
            Category::SystemDesign => &["System Design", "Technology", "Tech Interview"],
            Category::Family
            | Category::Code
            | Category::Docker
            | Category::Jenkins
            | Category::Other => &["Template", "Info", "Beginner"],
        };

        tags.iter().map(|tag| tag.to_string()).collect()
    }
}
