//! Reader for dictionaries produced by [`super::writer::write_dictionary`].

use super::metadata::{
    Attribute, ColumnProfile, ContainerFormat, MetadataValue, TIMESTAMP_FORMAT, ValueKind,
};
use crate::config::Labels;
use crate::error::{DictionaryError, Result, ResultExt as _};
use calamine::{Data, DataType as _, Range, Reader as _, Xlsx, open_workbook};
use chrono::{NaiveDateTime, TimeDelta, Timelike as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a written dictionary sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedDictionary {
    /// `(label, value)` pairs in sheet order, excluding the subject row.
    pub attributes: Vec<(String, MetadataValue)>,
    pub subject: String,
    pub columns: Vec<ColumnProfile>,
}

impl LoadedDictionary {
    /// Value recorded under the default label of `attribute`.
    pub fn attribute(&self, attribute: Attribute) -> Option<&MetadataValue> {
        let labels = Labels::default();
        let label = attribute.label(&labels);
        self.attributes
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }
}

/// Load the dictionary sheet of the `.xlsx` file at `path`.
///
/// # Errors
///
/// [`DictionaryError::CorruptDocument`] when the sheet is missing or its rows
/// do not follow the dictionary layout.
pub fn load_dictionary(path: &Path) -> Result<LoadedDictionary> {
    let format = ContainerFormat::from_path(path)?;
    if format != ContainerFormat::Modern {
        return Err(DictionaryError::UnsupportedFormat(
            format.extension().to_owned(),
        ));
    }

    let labels = Labels::default();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open dictionary {}", path.display()))?;

    if !workbook.sheet_names().contains(&labels.sheet_name) {
        return Err(DictionaryError::CorruptDocument(format!(
            "No {:?} sheet in {}",
            labels.sheet_name,
            path.display()
        )));
    }
    let range = workbook.worksheet_range(&labels.sheet_name)?;

    let dictionary = parse_sheet(&range, &labels)?;
    tracing::debug!(
        "Loaded {} attributes and {} columns from {}",
        dictionary.attributes.len(),
        dictionary.columns.len(),
        path.display()
    );
    Ok(dictionary)
}

fn cell(range: &Range<Data>, row: u32, col: u32) -> &Data {
    range.get_value((row, col)).unwrap_or(&Data::Empty)
}

fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match cell(range, row, col) {
        Data::Empty => String::new(),
        Data::String(s) => decode_escapes(s),
        other => other.as_string().unwrap_or_else(|| other.to_string()),
    }
}

/// Undo the OOXML `_xHHHH_` escaping of shared strings.
///
/// Each escape is one UTF-16 code unit, so surrogate pairs span two escapes.
/// `_x005F_` stands for a literal underscore, which is how `_xHHHH_` text
/// itself survives. Anything that is not exactly `_x`, four hex digits and
/// `_` is kept as is.
fn decode_escapes(text: &str) -> String {
    if !text.contains("_x") {
        return text.to_owned();
    }

    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("_x") {
        let (before, tail) = rest.split_at(pos);
        units.extend(before.encode_utf16());

        let unit = tail
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| tail.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u16::from_str_radix(hex, 16).ok());
        match unit {
            Some(unit) => {
                units.push(unit);
                rest = tail.get(7..).unwrap_or_default();
            }
            None => {
                units.extend("_x".encode_utf16());
                rest = tail.get(2..).unwrap_or_default();
            }
        }
    }
    units.extend(rest.encode_utf16());
    String::from_utf16_lossy(&units)
}

fn expect_header(range: &Range<Data>, row: u32, expected: &[&str]) -> Result<()> {
    for (col, label) in (0u32..).zip(expected) {
        let found = cell_text(range, row, col);
        if found != *label {
            return Err(DictionaryError::CorruptDocument(format!(
                "Expected {label:?} in row {}, found {found:?}",
                row + 1
            )));
        }
    }
    Ok(())
}

fn is_blank(range: &Range<Data>, row: u32, width: u32) -> bool {
    (0..width).all(|col| cell(range, row, col).is_empty())
}

fn parse_sheet(range: &Range<Data>, labels: &Labels) -> Result<LoadedDictionary> {
    let last_row = range.end().map_or(0, |(row, _)| row);

    expect_header(
        range,
        0,
        &[
            labels.attribute_header.as_str(),
            labels.value_header.as_str(),
        ],
    )?;

    let mut row = 1;
    let mut attributes = Vec::new();
    while row <= last_row && !cell(range, row, 0).is_empty() {
        attributes.push((cell_text(range, row, 0), metadata_value(cell(range, row, 1))?));
        row += 1;
    }

    let subject = match attributes.pop() {
        Some((label, value)) if label == labels.subject => value.to_string(),
        _ => {
            return Err(DictionaryError::corrupt(
                "Attribute block does not end with the subject row",
            ));
        }
    };

    // `row` is the separator; the column header follows it.
    row += 1;
    expect_header(
        range,
        row,
        &[
            labels.column_name_header.as_str(),
            labels.column_type_header.as_str(),
            labels.column_definition_header.as_str(),
        ],
    )?;

    let mut columns = Vec::new();
    for row in (row + 1)..=last_row {
        if is_blank(range, row, 3) {
            continue;
        }
        let name = cell_text(range, row, 0);
        if name.is_empty() {
            return Err(DictionaryError::CorruptDocument(format!(
                "Column row {} has no name",
                row + 1
            )));
        }
        let kind: ValueKind = cell_text(range, row, 1).parse()?;
        columns.push(ColumnProfile::new(name, kind).with_definition(cell_text(range, row, 2)));
    }

    Ok(LoadedDictionary {
        attributes,
        subject,
        columns,
    })
}

fn metadata_value(data: &Data) -> Result<MetadataValue> {
    let value = match data {
        Data::Empty => MetadataValue::Missing,
        Data::String(s) => MetadataValue::Text(decode_escapes(s)),
        Data::Float(f) => MetadataValue::Number(*f),
        Data::Int(i) => MetadataValue::Number(*i as f64),
        Data::DateTime(dt) => {
            let ts = dt.as_datetime().ok_or_else(|| {
                DictionaryError::corrupt(format!("Timestamp out of range: {}", dt.as_f64()))
            })?;
            MetadataValue::Timestamp(round_to_second(ts))
        }
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT))
            .map_or_else(
                |_| MetadataValue::Text(s.clone()),
                |ts| MetadataValue::Timestamp(round_to_second(ts)),
            ),
        other => MetadataValue::Text(other.to_string()),
    };
    Ok(value)
}

/// Serial date-times carry float error; snap to the nearest whole second.
fn round_to_second(ts: NaiveDateTime) -> NaiveDateTime {
    let base = ts.with_nanosecond(0).unwrap_or(ts);
    if ts.nanosecond() >= 500_000_000 {
        base + TimeDelta::seconds(1)
    } else {
        base
    }
}
