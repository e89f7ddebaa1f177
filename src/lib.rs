//! # exif-export
//!
//! Extract EXIF metadata (camera tags, capture settings, GPS coordinates) from
//! images and export it as plain text, CSV, JSON, XML, or YAML.
//!
//! ## Quick Start
//!
//! Extraction and export are two separate steps. The extracted document is
//! returned to you and passed explicitly into the exporter:
//!
//! ```rust,no_run
//! use exif_export::exif::extract;
//! use exif_export::export::{save_as, FormatKind};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let doc = extract(Path::new("photo.jpg"))?;
//!
//!     if doc.is_no_exif() {
//!         println!("photo.jpg has no EXIF data");
//!     }
//!     for (tag, value) in &doc {
//!         println!("{tag}: {value}");
//!     }
//!
//!     save_as(&doc, FormatKind::Json, Path::new("photo.json"))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Batch Export
//!
//! The pipeline module collects images from files and directories and exports
//! each one, recording per-file errors instead of stopping:
//!
//! ```rust,no_run
//! use exif_export::config::Config;
//! use exif_export::pipeline::{collect_images, destination_for, export_image};
//! use std::path::PathBuf;
//!
//! let config = Config::load(Some("config.json".as_ref())).unwrap();
//! let format = config.export.default_format;
//!
//! for image in collect_images(&[PathBuf::from("./photos")]) {
//!     let dest = destination_for(&image, format, config.output_dir());
//!     let result = export_image(&image, format, &dest, &config.export);
//!     if let Some(ref err) = result.error {
//!         eprintln!("{}: {err}", image.display());
//!     }
//! }
//! ```
//!
//! ## Output Formats
//!
//! | Format | Layout |
//! |--------|--------|
//! | TXT (`.txt`) | `key: value` per line |
//! | CSV (`.csv`) | `Field,Value` header, one row per tag |
//! | JSON (`.json`) | Object with 4-space indentation, GPS nested |
//! | XML (`.xml`) | `<metadata>` root, GPS as nested elements |
//! | YAML (`.yaml`) | Block-style mapping, GPS nested |
//!
//! An image without EXIF data is not an error: [`exif::extract`] returns a
//! document holding the single entry `Error: No EXIF data found in the image.`
//!
//! ## Modules
//!
//! - [`metadata`]: The normalized document model
//! - [`exif`]: EXIF extraction and tag-name tables
//! - [`export`]: Format encoders and file writing
//! - [`config`]: Configuration types and loading/saving
//! - [`pipeline`]: Image collection and per-file extract + export
//! - [`error`]: Typed extraction and export errors

pub mod config;
pub mod error;
pub mod exif;
pub mod export;
pub mod metadata;
pub mod pipeline;
