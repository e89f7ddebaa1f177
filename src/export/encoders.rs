use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;

use super::FormatKind;
use crate::error::SerializeError;
use crate::metadata::{MetadataDocument, TagValue};

/// `key: value` per line. Nested values use their `{...}` string form.
pub fn to_text(doc: &MetadataDocument) -> Result<Vec<u8>, SerializeError> {
    let mut out = String::new();
    for (key, value) in doc {
        out.push_str(&format!("{key}: {value}\n"));
    }
    Ok(out.into_bytes())
}

/// `Field,Value` header followed by one row per top-level entry.
pub fn to_csv(doc: &MetadataDocument) -> Result<Vec<u8>, SerializeError> {
    let err = |e: csv::Error| SerializeError::encode(FormatKind::Csv, e);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(["Field", "Value"]).map_err(err)?;
    for (key, value) in doc {
        writer
            .write_record([key.to_string(), value.to_string()])
            .map_err(err)?;
    }

    writer
        .into_inner()
        .map_err(|e| SerializeError::encode(FormatKind::Csv, e))
}

/// Single object, 4-space indentation, GPS block as a nested object.
pub fn to_json(doc: &MetadataDocument) -> Result<Vec<u8>, SerializeError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut serializer)
        .map_err(|e| SerializeError::encode(FormatKind::Json, e))?;
    out.push(b'\n');
    Ok(out)
}

/// Block-style mapping in document order.
pub fn to_yaml(doc: &MetadataDocument) -> Result<Vec<u8>, SerializeError> {
    serde_yaml::to_string(doc)
        .map(String::into_bytes)
        .map_err(|e| SerializeError::encode(FormatKind::Yaml, e))
}

/// Everything under a `<metadata>` root, tab-indented.
///
/// Groups become nested elements and lists become repeated siblings. Keys
/// that are not valid element names (numeric fallbacks) are written as
/// `<tag id="...">`.
pub fn to_xml(doc: &MetadataDocument) -> Result<Vec<u8>, SerializeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;
    write_group(&mut writer, "metadata", doc)?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn write_group(
    writer: &mut Writer<Vec<u8>>,
    key: &str,
    doc: &MetadataDocument,
) -> Result<(), SerializeError> {
    let (start, end) = element(key);
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for (child, value) in doc {
        write_value(writer, child, value)?;
    }
    writer.write_event(Event::End(end)).map_err(xml_error)
}

fn write_value(
    writer: &mut Writer<Vec<u8>>,
    key: &str,
    value: &TagValue,
) -> Result<(), SerializeError> {
    match value {
        TagValue::Group(doc) => write_group(writer, key, doc),
        TagValue::List(items) => {
            for item in items {
                write_value(writer, key, item)?;
            }
            Ok(())
        }
        scalar => {
            let (start, end) = element(key);
            let text = scalar.to_string();
            writer.write_event(Event::Start(start)).map_err(xml_error)?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(xml_error)?;
            writer.write_event(Event::End(end)).map_err(xml_error)
        }
    }
}

fn element(key: &str) -> (BytesStart<'_>, BytesEnd<'_>) {
    if is_xml_name(key) {
        (BytesStart::new(key), BytesEnd::new(key))
    } else {
        (
            BytesStart::new("tag").with_attributes([("id", key)]),
            BytesEnd::new("tag"),
        )
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn xml_error(err: impl std::fmt::Display) -> SerializeError {
    SerializeError::encode(FormatKind::Xml, err)
}
