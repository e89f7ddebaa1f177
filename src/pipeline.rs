use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ExportConfig;
use crate::exif;
use crate::export::{self, FormatKind};
use crate::metadata::MetadataDocument;

/// Supported image extensions. The decoder has the final say on readability.
const IMAGE_EXTENSIONS: &[&str] = &[
    // EXIF-capable containers
    "jpg", "jpeg", "png", "tif", "tiff", "webp",
    // Readable, but never carry EXIF
    "gif", "bmp",
];

/// The result of exporting a single image's metadata.
///
/// # Example
///
/// ```rust,no_run
/// # use exif_export::config::ExportConfig;
/// # use exif_export::export::FormatKind;
/// # use exif_export::pipeline::{destination_for, export_image};
/// # use std::path::Path;
/// let image = Path::new("photo.jpg");
/// let dest = destination_for(image, FormatKind::Json, None);
/// let result = export_image(image, FormatKind::Json, &dest, &ExportConfig::default());
///
/// match result.error {
///     None if result.no_exif => println!("{}: no EXIF data", image.display()),
///     None => println!("{} tag(s) written to {}", result.tag_count, dest.display()),
///     Some(ref err) => eprintln!("{err}"),
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub path: PathBuf,
    /// Where the metadata was written, if it was.
    pub destination: Option<PathBuf>,
    pub format: FormatKind,
    /// Number of top-level entries (the GPS block counts as one).
    pub tag_count: usize,
    /// The image had no EXIF data; the sentinel document was exported.
    pub no_exif: bool,
    pub error: Option<String>,
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only files with supported image
/// extensions are included.
///
/// # Example
///
/// ```rust,no_run
/// use exif_export::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),        // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Default export path for an image: the image file name with the format
/// extension appended (`photo.jpg` → `photo.jpg.json`), either next to the
/// image or inside `output_dir`.
pub fn destination_for(image: &Path, format: FormatKind, output_dir: Option<&Path>) -> PathBuf {
    let file_name = match image.file_name() {
        Some(name) => format!("{}.{}", name.to_string_lossy(), format.extension()),
        None => format!("metadata.{}", format.extension()),
    };

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => image.with_file_name(file_name),
    }
}

/// Extract an image's metadata and save it to `destination`.
///
/// Errors are recorded in the returned [`ExportResult`] rather than returned,
/// so a batch can carry on past unreadable files.
pub fn export_image(
    image: &Path,
    format: FormatKind,
    destination: &Path,
    options: &ExportConfig,
) -> ExportResult {
    let mut result = ExportResult {
        path: image.to_path_buf(),
        destination: None,
        format,
        tag_count: 0,
        no_exif: false,
        error: None,
    };

    let doc = match exif::extract(image) {
        Ok(doc) => doc,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };
    record(&mut result, &doc);

    match export::save_with(&doc, format, destination, options) {
        Ok(()) => result.destination = Some(destination.to_path_buf()),
        Err(e) => result.error = Some(e.to_string()),
    }

    result
}

fn record(result: &mut ExportResult, doc: &MetadataDocument) {
    result.no_exif = doc.is_no_exif();
    result.tag_count = if result.no_exif { 0 } else { doc.len() };
}
