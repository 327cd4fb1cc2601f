//! blogdoc: turn Word .docx blog drafts into JSON models and Pug pages
//!
//! This library parses Microsoft Word documents into a section/paragraph
//! model (headings, formatted runs, lists, links and pictures), saves it as
//! JSON and renders the site's Pug page skeleton from it.

pub mod logger;

pub mod category;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod pug;
pub mod reading_time;
pub mod utils;

// Re-export commonly used types
pub use config::SiteConfig;
pub use document::{DocumentModel, LoadOptions, load_document, save_to_json};
pub use error::DocumentError;
pub use pug::{PostGenerator, PostType, PugDocument};
