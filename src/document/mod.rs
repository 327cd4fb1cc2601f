//! Document parsing and data structures module
//!
//! This module parses Microsoft Word (.docx) blog drafts into the structured
//! post model and saves it as JSON.

pub(crate) mod io;
pub(crate) mod loader;
pub mod models;
pub(crate) mod parsing;

pub use io::{extract_images, load_from_json, save_to_json, to_pretty_json};
pub use loader::load_document;
pub use models::*;
