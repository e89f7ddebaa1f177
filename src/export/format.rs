use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::encoders;
use crate::error::SerializeError;
use crate::metadata::MetadataDocument;

/// An encoder turns a document into the bytes of one output format.
pub type Encoder = fn(&MetadataDocument) -> Result<Vec<u8>, SerializeError>;

/// The output formats metadata can be exported to.
///
/// Parsing is case-insensitive and accepts the file extension or the
/// format name:
///
/// ```rust
/// use exif_export::export::FormatKind;
///
/// assert_eq!("TXT".parse::<FormatKind>().unwrap(), FormatKind::Text);
/// assert_eq!("yml".parse::<FormatKind>().unwrap(), FormatKind::Yaml);
/// assert!("pdf".parse::<FormatKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// `key: value` lines
    #[serde(rename = "txt", alias = "text")]
    Text,
    /// Two-column `Field,Value` table
    Csv,
    /// 4-space indented object
    Json,
    /// Elements under a `<metadata>` root
    Xml,
    /// Block-style mapping
    #[serde(alias = "yml")]
    Yaml,
}

impl FormatKind {
    /// Every supported format, in menu order.
    pub const ALL: [FormatKind; 5] = [Self::Text, Self::Csv, Self::Json, Self::Xml, Self::Yaml];

    /// The canonical file extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
        }
    }

    /// The encoder for this format.
    pub fn encoder(self) -> Encoder {
        match self {
            Self::Text => encoders::to_text,
            Self::Csv => encoders::to_csv,
            Self::Json => encoders::to_json,
            Self::Xml => encoders::to_xml,
            Self::Yaml => encoders::to_yaml,
        }
    }

    /// Infer the format from a destination path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl FromStr for FormatKind {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(SerializeError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerializeErrorKind;

    #[test]
    fn parse_names_and_extensions() {
        assert_eq!("txt".parse::<FormatKind>().unwrap(), FormatKind::Text);
        assert_eq!("Text".parse::<FormatKind>().unwrap(), FormatKind::Text);
        assert_eq!("CSV".parse::<FormatKind>().unwrap(), FormatKind::Csv);
        assert_eq!("json".parse::<FormatKind>().unwrap(), FormatKind::Json);
        assert_eq!(" xml ".parse::<FormatKind>().unwrap(), FormatKind::Xml);
        assert_eq!("YAML".parse::<FormatKind>().unwrap(), FormatKind::Yaml);
        assert_eq!("yml".parse::<FormatKind>().unwrap(), FormatKind::Yaml);
    }

    #[test]
    fn parse_unsupported() {
        let err = "pdf".parse::<FormatKind>().unwrap_err();
        assert_eq!(err.kind(), SerializeErrorKind::UnsupportedFormat);
        assert_eq!(err.to_string(), "Unsupported file format: pdf");
    }

    #[test]
    fn extension_round_trips_through_parse() {
        for format in FormatKind::ALL {
            assert_eq!(format.extension().parse::<FormatKind>().unwrap(), format);
        }
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(FormatKind::from_path(Path::new("out/meta.JSON")), Some(FormatKind::Json));
        assert_eq!(FormatKind::from_path(Path::new("meta.yml")), Some(FormatKind::Yaml));
        assert_eq!(FormatKind::from_path(Path::new("meta.pdf")), None);
        assert_eq!(FormatKind::from_path(Path::new("meta")), None);
    }

    #[test]
    fn display_is_uppercase_extension() {
        assert_eq!(FormatKind::Text.to_string(), "TXT");
        assert_eq!(FormatKind::Yaml.to_string(), "YAML");
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&FormatKind::Text).unwrap(), r#""txt""#);
        assert_eq!(serde_json::from_str::<FormatKind>(r#""text""#).unwrap(), FormatKind::Text);
        assert_eq!(serde_json::from_str::<FormatKind>(r#""yml""#).unwrap(), FormatKind::Yaml);
        assert_eq!(serde_json::from_str::<FormatKind>(r#""csv""#).unwrap(), FormatKind::Csv);
    }
}
