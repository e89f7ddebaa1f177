//! EXIF extraction.
//!
//! - [`extract`]: Read every EXIF tag of an image into a [`MetadataDocument`](crate::metadata::MetadataDocument)
//! - [`document_from_fields`]: Normalize already-parsed EXIF fields
//!
//! Tag ids are resolved through the standard and GPS name tables in [`tags`];
//! ids missing from the tables are kept as their decimal string.

mod reader;
pub mod tags;

pub use reader::{document_from_fields, extract, normalize_value};
