//! Core data structures for spreadsheet dictionaries.

use crate::config::Labels;
use crate::error::{DictionaryError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Sentinel used wherever the source carries no usable value.
pub const UNKNOWN: &str = "Unknown";

/// Display format for timestamps, matching the Excel number format the writer uses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// On-disk structure of a spreadsheet, selected by file extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// `.xls`: OLE compound file holding BIFF records.
    Legacy,
    /// `.xlsx`: zip package of XML parts.
    Modern,
}

impl ContainerFormat {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// Nothing is opened; an unrecognized extension is rejected before any parsing.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xls" => Ok(Self::Legacy),
            "xlsx" => Ok(Self::Modern),
            _ => Err(DictionaryError::UnsupportedFormat(ext)),
        }
    }

    /// Lowercase extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Legacy => "xls",
            Self::Modern => "xlsx",
        }
    }
}

/// A file-level attribute captured by the metadata reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Final path component of the source file.
    FileName,
    /// Size on disk in kilobytes of 1024 bytes, rounded to two decimals.
    FileSizeKb,
    /// File-system modification time.
    LastModified,
    /// Document creator, or the legacy workbook's user name.
    Author,
    /// Last editor recorded in the document properties.
    LastModifiedBy,
    /// Document creation time.
    Created,
    /// Modification time recorded in the document properties.
    Modified,
}

impl Attribute {
    /// Human-readable label for this attribute.
    pub fn label(self, labels: &Labels) -> &str {
        match self {
            Self::FileName => &labels.file_name,
            Self::FileSizeKb => &labels.file_size_kb,
            Self::LastModified => &labels.last_modified,
            Self::Author => &labels.author,
            Self::LastModifiedBy => &labels.last_modified_by,
            Self::Created => &labels.created,
            Self::Modified => &labels.modified,
        }
    }
}

/// Value of a metadata attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
    /// The source document does not record this attribute.
    Missing,
}

impl MetadataValue {
    /// Shorthand for [`MetadataValue::Text`].
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// `Text` for a present, non-blank string, `Missing` otherwise.
    pub fn from_optional(s: Option<String>) -> Self {
        match s {
            Some(s) if !s.trim().is_empty() => Self::Text(s),
            _ => Self::Missing,
        }
    }

    /// The `"Unknown"` sentinel text.
    pub fn unknown() -> Self {
        Self::Text(UNKNOWN.to_owned())
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n:.2}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Self::Missing => Ok(()),
        }
    }
}

/// One attribute and its value, in reader order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub attribute: Attribute,
    pub value: MetadataValue,
}

/// File-system attributes merged with format-specific document properties.
///
/// Entries keep insertion order: the three file-system attributes first, then
/// the branch for [`ContainerFormat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub format: ContainerFormat,
    entries: Vec<MetadataEntry>,
}

impl FileMetadata {
    pub(crate) fn new(format: ContainerFormat) -> Self {
        Self {
            format,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, attribute: Attribute, value: MetadataValue) {
        self.entries.push(MetadataEntry { attribute, value });
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn get(&self, attribute: Attribute) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|e| e.attribute == attribute)
            .map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Primitive kind of a sampled cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Duration,
    Unknown,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Duration => "Duration",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl FromStr for ValueKind {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Text" => Ok(Self::Text),
            "Integer" => Ok(Self::Integer),
            "Float" => Ok(Self::Float),
            "Boolean" => Ok(Self::Boolean),
            "DateTime" => Ok(Self::DateTime),
            "Duration" => Ok(Self::Duration),
            UNKNOWN => Ok(Self::Unknown),
            other => Err(DictionaryError::CorruptDocument(format!(
                "Unrecognized column type label: {other:?}"
            ))),
        }
    }
}

/// Per-column record: display name, inferred kind, user-entered definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ValueKind,
    /// Empty until the user fills it in.
    pub definition: String,
}

impl ColumnProfile {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            definition: String::new(),
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }
}

/// Name used for a column whose header cell is blank (1-based index).
pub fn synthesized_column_name(index: usize) -> String {
    format!("Column {index}")
}
