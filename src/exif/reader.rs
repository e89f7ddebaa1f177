use exif::{Context, Field, In, Value};
use image::{ImageFormat, ImageReader};
use img_parts::{Bytes, DynImage, ImageEXIF};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use super::tags::{is_pointer, tag_name};
use crate::error::ExtractError;
use crate::metadata::{GPS_INFO_KEY, MetadataDocument, TagValue};

/// Extract all EXIF tags of the primary image into a [`MetadataDocument`].
///
/// The file is first probed as an image (format and header); anything that
/// cannot be opened or decoded is an [`ExtractErrorKind::IoFailure`](crate::error::ExtractErrorKind::IoFailure).
/// Images without EXIF data, including containers that cannot carry it
/// (GIF, BMP, ...), produce the [`MetadataDocument::no_exif`] sentinel.
///
/// GPS tags are nested under `"GPSInfo"`; tags missing from the name table
/// are keyed by their decimal id.
pub fn extract(path: &Path) -> Result<MetadataDocument, ExtractError> {
    let format = probe_image(path)?;

    if !carries_exif(format) {
        log::debug!("{:?} images carry no EXIF block: {}", format, path.display());
        return Ok(MetadataDocument::no_exif());
    }

    let file = File::open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) | Err(exif::Error::BlankValue(_)) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(MetadataDocument::no_exif());
        }
        Err(exif::Error::InvalidFormat(_)) if exif_segment_is_empty(path) => {
            log::debug!("Empty EXIF segment in {}", path.display());
            return Ok(MetadataDocument::no_exif());
        }
        Err(err) => return Err(classify(path, err)),
    };

    let doc = document_from_fields(exif.fields());
    if doc.is_empty() {
        log::debug!("EXIF block in {} has no primary-image tags", path.display());
        return Ok(MetadataDocument::no_exif());
    }

    log::debug!("Extracted {} tag(s) from {}", doc.len(), path.display());
    Ok(doc)
}

/// Build a document from raw EXIF fields.
///
/// Only primary-image fields are kept. Sub-IFD pointers are dropped, and the
/// GPS block is placed where its first field was seen. An empty result means
/// the block held no usable tags.
pub fn document_from_fields<'a, I>(fields: I) -> MetadataDocument
where
    I: IntoIterator<Item = &'a Field>,
{
    let mut doc = MetadataDocument::new();
    let mut gps = MetadataDocument::new();

    for field in fields {
        if field.ifd_num != In::PRIMARY {
            log::debug!("Skipping {} from IFD{}", field.tag, field.ifd_num.index());
            continue;
        }
        if is_pointer(field.tag) {
            continue;
        }
        let Some(value) = normalize_value(&field.value) else {
            log::debug!("Skipping {} with unknown value type", field.tag);
            continue;
        };

        if field.tag.context() == Context::Gps {
            if !doc.contains_key(GPS_INFO_KEY) {
                doc.insert(GPS_INFO_KEY, MetadataDocument::new());
            }
            gps.insert(tag_name(field.tag), value);
        } else {
            doc.insert(tag_name(field.tag), value);
        }
    }

    if !gps.is_empty() {
        doc.insert(GPS_INFO_KEY, gps);
    }

    doc
}

/// Convert a raw EXIF value to a [`TagValue`]. Returns `None` for unknown types.
pub fn normalize_value(value: &Value) -> Option<TagValue> {
    let normalized = match value {
        Value::Byte(v) => integers(v.iter().map(|&n| i64::from(n))),
        Value::Short(v) => integers(v.iter().map(|&n| i64::from(n))),
        Value::Long(v) => integers(v.iter().map(|&n| i64::from(n))),
        Value::SByte(v) => integers(v.iter().map(|&n| i64::from(n))),
        Value::SShort(v) => integers(v.iter().map(|&n| i64::from(n))),
        Value::SLong(v) => integers(v.iter().map(|&n| i64::from(n))),
        Value::Rational(v) => TagValue::from_components(
            v.iter()
                .map(|r| ratio(i64::from(r.num), i64::from(r.denom)))
                .collect(),
        ),
        Value::SRational(v) => TagValue::from_components(
            v.iter()
                .map(|r| ratio(i64::from(r.num), i64::from(r.denom)))
                .collect(),
        ),
        Value::Float(v) => TagValue::from_components(v.iter().map(|&x| float(f64::from(x))).collect()),
        Value::Double(v) => TagValue::from_components(v.iter().map(|&x| float(x)).collect()),
        Value::Ascii(v) if v.is_empty() => TagValue::Text(String::new()),
        Value::Ascii(v) => {
            TagValue::from_components(v.iter().map(|s| TagValue::Text(ascii_to_string(s))).collect())
        }
        Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
        // Value::Unknown: type id not defined by TIFF/EXIF
        _ => return None,
    };
    Some(normalized)
}

fn integers(values: impl Iterator<Item = i64>) -> TagValue {
    TagValue::from_components(values.map(TagValue::Integer).collect())
}

fn ratio(num: i64, denom: i64) -> TagValue {
    if denom == 0 {
        TagValue::Text(format!("{num}/{denom}"))
    } else {
        TagValue::Float(num as f64 / denom as f64)
    }
}

/// NaN and infinities have no JSON number form; keep them as text.
fn float(x: f64) -> TagValue {
    if x.is_finite() {
        TagValue::Float(x)
    } else {
        TagValue::Text(x.to_string())
    }
}

fn ascii_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

/// Open the file as an image and decode its header. Returns the detected format.
fn probe_image(path: &Path) -> Result<ImageFormat, ExtractError> {
    let io_error = |source: std::io::Error| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?;
    let format = reader.format();

    // Fails for unrecognised containers as well as corrupt headers.
    reader.into_dimensions().map_err(|source| ExtractError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    format.ok_or_else(|| ExtractError::Unexpected(format!("unknown image format: {}", path.display())))
}

/// Containers the EXIF reader understands.
fn carries_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP
    )
}

/// `true` when the container has an EXIF segment with no TIFF payload after it.
fn exif_segment_is_empty(path: &Path) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };
    match DynImage::from_bytes(Bytes::from(bytes)) {
        Ok(Some(image)) => image.exif().is_some_and(|raw| raw.is_empty()),
        _ => false,
    }
}

fn classify(path: &Path, err: exif::Error) -> ExtractError {
    match err {
        exif::Error::Io(source) => ExtractError::Io {
            path: path.to_path_buf(),
            source,
        },
        exif::Error::InvalidFormat(msg) | exif::Error::UnexpectedValue(msg) => {
            ExtractError::Malformed(msg.to_string())
        }
        other => ExtractError::Unexpected(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::{Rational, SRational, Tag};
    use pretty_assertions::assert_eq;

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    fn ascii(s: &str) -> Value {
        Value::Ascii(vec![s.as_bytes().to_vec()])
    }

    // ── document_from_fields ─────────────────────────────────────────

    #[test]
    fn make_and_gps_latitude() {
        let fields = vec![
            field(Tag::Make, ascii("Canon")),
            field(Tag::GPSLatitude, Value::Rational(vec![Rational { num: 40, denom: 1 }])),
        ];

        let doc = document_from_fields(&fields);

        let expected: MetadataDocument = [
            ("Make", TagValue::from("Canon")),
            (
                "GPSInfo",
                TagValue::Group([("GPSLatitude", 40.0)].into_iter().collect()),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(doc, expected);
        assert!(!doc.contains_key("Error"));
    }

    #[test]
    fn gps_block_sits_where_first_gps_field_appears() {
        let fields = vec![
            field(Tag::Make, ascii("Canon")),
            field(Tag::GPSLatitudeRef, ascii("N")),
            field(Tag::Model, ascii("EOS R5")),
            field(
                Tag::GPSLatitude,
                Value::Rational(vec![
                    Rational { num: 40, denom: 1 },
                    Rational { num: 26, denom: 1 },
                    Rational { num: 4630, denom: 100 },
                ]),
            ),
        ];

        let doc = document_from_fields(&fields);

        assert_eq!(doc.keys().collect::<Vec<_>>(), ["Make", "GPSInfo", "Model"]);
        let gps = doc.gps().unwrap();
        assert_eq!(gps.keys().collect::<Vec<_>>(), ["GPSLatitudeRef", "GPSLatitude"]);
        assert_eq!(
            gps.get("GPSLatitude"),
            Some(&TagValue::List(vec![40.0.into(), 26.0.into(), 46.3.into()]))
        );
    }

    #[test]
    fn gps_keys_come_from_gps_table() {
        let fields = vec![
            field(Tag::GPSVersionID, Value::Byte(vec![2, 2, 0, 0])),
            field(Tag::GPSAltitudeRef, Value::Byte(vec![0])),
            field(Tag(Context::Gps, 0x7FFF), ascii("x")),
        ];

        let doc = document_from_fields(&fields);

        let gps = doc.gps().unwrap();
        assert_eq!(
            gps.keys().collect::<Vec<_>>(),
            ["GPSVersionID", "GPSAltitudeRef", "32767"]
        );
        assert_eq!(gps.get("GPSAltitudeRef"), Some(&TagValue::Integer(0)));
    }

    #[test]
    fn unknown_tags_use_numeric_key() {
        let fields = vec![field(Tag(Context::Tiff, 0xBEEF), Value::Short(vec![7]))];
        let doc = document_from_fields(&fields);
        assert_eq!(doc.get("48879"), Some(&TagValue::Integer(7)));
    }

    #[test]
    fn colliding_keys_last_write_wins() {
        let fields = vec![
            field(Tag(Context::Tiff, 0xBEEF), Value::Short(vec![1])),
            field(Tag(Context::Exif, 0xBEEF), Value::Short(vec![2])),
        ];
        let doc = document_from_fields(&fields);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("48879"), Some(&TagValue::Integer(2)));
    }

    #[test]
    fn thumbnail_and_pointer_fields_are_skipped() {
        let fields = vec![
            Field {
                tag: Tag::Compression,
                ifd_num: In::THUMBNAIL,
                value: Value::Short(vec![6]),
            },
            field(Tag::ExifIFDPointer, Value::Long(vec![120])),
            field(Tag::Orientation, Value::Short(vec![1])),
        ];
        let doc = document_from_fields(&fields);
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["Orientation"]);
    }

    #[test]
    fn no_fields_gives_empty_document() {
        let doc = document_from_fields(std::iter::empty());
        assert!(doc.is_empty());
    }

    // ── normalize_value ──────────────────────────────────────────────

    #[test]
    fn undefined_passes_through_as_bytes() {
        let value = Value::Undefined(b"0231".to_vec(), 0);
        assert_eq!(normalize_value(&value), Some(TagValue::Bytes(b"0231".to_vec())));
    }

    #[test]
    fn rationals_become_floats() {
        let value = Value::Rational(vec![Rational { num: 28, denom: 10 }]);
        assert_eq!(normalize_value(&value), Some(TagValue::Float(2.8)));

        let value = Value::SRational(vec![SRational { num: -1, denom: 3 }]);
        assert_eq!(normalize_value(&value), Some(TagValue::Float(-1.0 / 3.0)));
    }

    #[test]
    fn zero_denominator_kept_as_text() {
        let value = Value::Rational(vec![Rational { num: 5, denom: 0 }]);
        assert_eq!(normalize_value(&value), Some(TagValue::Text("5/0".into())));
    }

    #[test]
    fn ascii_trailing_nuls_trimmed() {
        let value = Value::Ascii(vec![b"Canon\0\0".to_vec()]);
        assert_eq!(normalize_value(&value), Some(TagValue::Text("Canon".into())));
        assert_eq!(normalize_value(&Value::Ascii(vec![])), Some(TagValue::Text(String::new())));
    }

    #[test]
    fn non_finite_floats_kept_as_text() {
        assert_eq!(normalize_value(&Value::Double(vec![f64::NAN])), Some(TagValue::Text("NaN".into())));
        assert_eq!(
            normalize_value(&Value::Float(vec![1.5, f32::INFINITY])),
            Some(TagValue::List(vec![TagValue::Float(1.5), TagValue::Text("inf".into())]))
        );
        assert_eq!(normalize_value(&Value::Double(vec![f64::NEG_INFINITY])), Some(TagValue::Text("-inf".into())));
    }

    #[test]
    fn non_finite_float_survives_json_round_trip() {
        let mut doc = MetadataDocument::new();
        doc.insert("ExposureBiasValue", normalize_value(&Value::Double(vec![f64::NAN])).unwrap());

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: MetadataDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, doc);
    }

    #[test]
    fn unknown_value_type_is_dropped() {
        assert_eq!(normalize_value(&Value::Unknown(99, 1, 0)), None);
    }

    // ── extract ──────────────────────────────────────────────────────

    #[test]
    fn missing_file_is_io_failure() {
        let err = extract(Path::new("/nonexistent/photo.jpg")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ExtractErrorKind::IoFailure);
    }
}
