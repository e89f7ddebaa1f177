//! Typed errors for extraction and export.
//!
//! Extraction failures fall into three ordered tiers: I/O (the file cannot be
//! opened or decoded as an image), malformed tag structure, and everything
//! else. Export failures are either an unsupported format or a failed write.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::export::FormatKind;

/// Coarse classification of an [`ExtractError`], in catch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    /// File missing, unreadable, or not a decodable image.
    IoFailure,
    /// The EXIF block exists but its structure is broken.
    Malformed,
    /// Anything else.
    Unexpected,
}

/// Error returned by [`extract`](crate::exif::extract).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error opening image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error opening image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Error extracting metadata: {0}")]
    Malformed(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ExtractError {
    pub fn kind(&self) -> ExtractErrorKind {
        match self {
            Self::Io { .. } | Self::Decode { .. } => ExtractErrorKind::IoFailure,
            Self::Malformed(_) => ExtractErrorKind::Malformed,
            Self::Unexpected(_) => ExtractErrorKind::Unexpected,
        }
    }
}

/// Coarse classification of a [`SerializeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeErrorKind {
    UnsupportedFormat,
    WriteFailure,
}

/// Error returned by the exporters in [`export`](crate::export).
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to encode metadata as {format}: {detail}")]
    Encode { format: FormatKind, detail: String },

    #[error("An error occurred while saving metadata to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SerializeError {
    pub fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::UnsupportedFormat(_) => SerializeErrorKind::UnsupportedFormat,
            Self::Encode { .. } | Self::Write { .. } => SerializeErrorKind::WriteFailure,
        }
    }

    pub(crate) fn encode(format: FormatKind, err: impl std::fmt::Display) -> Self {
        Self::Encode {
            format,
            detail: err.to_string(),
        }
    }
}
