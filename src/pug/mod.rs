//! Pug page generation from a parsed document

pub mod chrome;
pub mod content;
pub mod post;
pub mod writer;

pub use post::{PostGenerator, PostType};
pub use writer::PugDocument;
