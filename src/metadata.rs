//! The normalized metadata model shared by the extractor and the exporters.
//!
//! A [`MetadataDocument`] is an ordered map from tag names to [`TagValue`]s.
//! Every value is a scalar leaf except the GPS block, which is stored as a
//! nested document under [`GPS_INFO_KEY`].

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Key of the sentinel entry written when an image has no EXIF data.
pub const NO_EXIF_KEY: &str = "Error";

/// Message of the sentinel entry written when an image has no EXIF data.
pub const NO_EXIF_MESSAGE: &str = "No EXIF data found in the image.";

/// Key under which the nested GPS block is stored.
pub const GPS_INFO_KEY: &str = "GPSInfo";

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Raw bytes, passed through without decoding.
    Bytes(Vec<u8>),
    /// Multi-component value, e.g. the degrees/minutes/seconds of a GPS coordinate.
    List(Vec<TagValue>),
    /// Nested block (only used for `GPSInfo`).
    Group(MetadataDocument),
}

impl TagValue {
    /// Returns the nested document if this value is a group.
    pub fn as_group(&self) -> Option<&MetadataDocument> {
        match self {
            Self::Group(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the text if this value is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Collapse a single-component value to its scalar, keep lists otherwise.
    pub fn from_components(mut values: Vec<TagValue>) -> Self {
        if values.len() == 1 {
            values.remove(0)
        } else {
            Self::List(values)
        }
    }

    /// Form used for values nested inside a list or group: text is quoted.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => fmt_float(*x, f),
            Self::Text(s) => f.write_str(s),
            Self::Bytes(bytes) => write!(f, "b'{}'", bytes.escape_ascii()),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str(")")
            }
            Self::Group(doc) => fmt::Display::fmt(doc, f),
        }
    }
}

/// Floats always keep a fractional part so `40.0` does not print as `40`.
fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

impl From<i64> for TagValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for TagValue {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<f64> for TagValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<MetadataDocument> for TagValue {
    fn from(doc: MetadataDocument) -> Self {
        Self::Group(doc)
    }
}

/// All tags found for one image, in discovery order.
///
/// Keys are unique: inserting an existing key replaces its value but keeps
/// the original position.
///
/// # Example
///
/// ```rust
/// use exif_export::metadata::{MetadataDocument, TagValue};
///
/// let mut gps = MetadataDocument::new();
/// gps.insert("GPSLatitude", 40.0);
///
/// let mut doc = MetadataDocument::new();
/// doc.insert("Make", "Canon");
/// doc.insert("GPSInfo", gps);
///
/// assert_eq!(doc.get("Make"), Some(&TagValue::Text("Canon".into())));
/// assert_eq!(doc.to_string(), "{'Make': 'Canon', 'GPSInfo': {'GPSLatitude': 40.0}}");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDocument {
    entries: Vec<(String, TagValue)>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sentinel document returned for images without EXIF data.
    pub fn no_exif() -> Self {
        let mut doc = Self::new();
        doc.insert(NO_EXIF_KEY, NO_EXIF_MESSAGE);
        doc
    }

    /// `true` if this is exactly the "no EXIF data" sentinel.
    pub fn is_no_exif(&self) -> bool {
        self.entries.len() == 1
            && self.entries[0].0 == NO_EXIF_KEY
            && self.entries[0].1.as_text() == Some(NO_EXIF_MESSAGE)
    }

    /// Insert a value, replacing (in place) any existing value under the same key.
    /// Returns the replaced value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Option<TagValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The nested GPS block, if present.
    pub fn gps(&self) -> Option<&MetadataDocument> {
        self.get(GPS_INFO_KEY).and_then(TagValue::as_group)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a MetadataDocument {
    type Item = (&'a str, &'a TagValue);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, TagValue)>,
        fn(&'a (String, TagValue)) -> (&'a str, &'a TagValue),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let pair: fn(&'a (String, TagValue)) -> (&'a str, &'a TagValue) = |(k, v)| (k.as_str(), v);
        self.entries.iter().map(pair)
    }
}

impl<K: Into<String>, V: Into<TagValue>> FromIterator<(K, V)> for MetadataDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Self::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl fmt::Display for MetadataDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{key}': ")?;
            value.fmt_nested(f)?;
        }
        f.write_str("}")
    }
}

// ── serde ────────────────────────────────────────────────────────────

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            // Text formats have no byte type; keep the escaped form.
            Self::Bytes(bytes) => serializer.collect_str(&bytes.escape_ascii()),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Group(doc) => doc.serialize(serializer),
        }
    }
}

impl Serialize for MetadataDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TagValueVisitor;

impl<'de> Visitor<'de> for TagValueVisitor {
    type Value = TagValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, string, byte string, sequence, or map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<TagValue, E> {
        Ok(TagValue::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TagValue, E> {
        Ok(TagValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TagValue, E> {
        Ok(match i64::try_from(v) {
            Ok(n) => TagValue::Integer(n),
            Err(_) => TagValue::Float(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TagValue, E> {
        Ok(TagValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TagValue, E> {
        Ok(TagValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<TagValue, E> {
        Ok(TagValue::Text(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<TagValue, E> {
        Ok(TagValue::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<TagValue, E> {
        Ok(TagValue::Bytes(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<TagValue, E> {
        Ok(TagValue::Text(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<TagValue, E> {
        Ok(TagValue::Text(String::new()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TagValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(TagValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<TagValue, A::Error> {
        DocumentVisitor.visit_map(map).map(TagValue::Group)
    }
}

impl<'de> Deserialize<'de> for TagValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TagValueVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = MetadataDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of tag names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<MetadataDocument, A::Error> {
        let mut doc = MetadataDocument::new();
        while let Some((key, value)) = map.next_entry::<String, TagValue>()? {
            doc.insert(key, value);
        }
        Ok(doc)
    }
}

impl<'de> Deserialize<'de> for MetadataDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}
