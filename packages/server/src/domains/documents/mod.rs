pub mod models;

pub use models::{Document, ExtractedMetadata, UNASSIGNED_PROPERTY};
