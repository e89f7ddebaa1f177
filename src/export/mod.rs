//! Metadata export to TXT, CSV, JSON, XML, and YAML.
//!
//! - [`serialize`]: Encode a document in one [`FormatKind`]
//! - [`save_as`]: Encode and write to a destination with default options
//! - [`save_with`]: Encode and write, honoring an [`ExportConfig`]
//!
//! Format dispatch goes through [`FormatKind::encoder`], so every format has
//! exactly one encoder and an unsupported format is rejected before any file
//! is touched.

mod encoders;
mod format;

pub use format::{Encoder, FormatKind};

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::config::ExportConfig;
use crate::error::SerializeError;
use crate::metadata::MetadataDocument;

/// Encode a document in the given format.
///
/// # Example
///
/// ```rust
/// use exif_export::export::{serialize, FormatKind};
/// use exif_export::metadata::MetadataDocument;
///
/// let mut doc = MetadataDocument::new();
/// doc.insert("Make", "Canon");
///
/// let csv = serialize(&doc, FormatKind::Csv).unwrap();
/// assert_eq!(csv, b"Field,Value\r\nMake,Canon\r\n");
/// ```
pub fn serialize(doc: &MetadataDocument, format: FormatKind) -> Result<Vec<u8>, SerializeError> {
    (format.encoder())(doc)
}

/// Encode a document and write it to `dest` with default [`ExportConfig`]
/// options (atomic replace of any existing file).
pub fn save_as(doc: &MetadataDocument, format: FormatKind, dest: &Path) -> Result<(), SerializeError> {
    save_with(doc, format, dest, &ExportConfig::default())
}

/// Encode a document and write it to `dest`.
///
/// With `atomic_write` the bytes go to a temporary file next to `dest` that
/// is then renamed over it, so a failed write leaves any existing file
/// intact. With `overwrite_existing` unset an existing `dest` is an error,
/// checked by the final create or rename itself.
pub fn save_with(
    doc: &MetadataDocument,
    format: FormatKind,
    dest: &Path,
    options: &ExportConfig,
) -> Result<(), SerializeError> {
    let bytes = serialize(doc, format)?;

    let write_error = |source: io::Error| SerializeError::Write {
        path: dest.to_path_buf(),
        source,
    };

    if options.atomic_write {
        write_atomic(dest, &bytes, options.overwrite_existing).map_err(write_error)?;
    } else {
        write_in_place(dest, &bytes, options.overwrite_existing).map_err(write_error)?;
    }

    log::info!("Saved {format} metadata to {}", dest.display());
    Ok(())
}

fn write_in_place(dest: &Path, bytes: &[u8], overwrite: bool) -> io::Result<()> {
    let mut file = if overwrite {
        File::create(dest)?
    } else {
        OpenOptions::new().write(true).create_new(true).open(dest)?
    };
    file.write_all(bytes)
}

fn write_atomic(dest: &Path, bytes: &[u8], overwrite: bool) -> io::Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    // Temp files are created owner-only; exported files should be ordinary.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    if overwrite {
        tmp.persist(dest).map_err(|e| e.error)?;
    } else {
        tmp.persist_noclobber(dest).map_err(|e| e.error)?;
    }
    Ok(())
}
