//! File-level metadata reader.
//!
//! Merges file-system attributes (always present) with the document properties
//! embedded in the container, picking the branch from the file extension alone.

use super::biff::{DateMode, read_legacy_globals};
use super::core_props::{CoreTimestamp, read_core_properties};
use super::metadata::{Attribute, ContainerFormat, FileMetadata, MetadataValue};
use crate::error::{DictionaryError, Result, ResultExt as _};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike as _};
use std::path::Path;

/// Read the metadata record for the spreadsheet at `path`.
///
/// # Errors
///
/// - [`DictionaryError::UnsupportedFormat`] when the extension is not `xls`/`xlsx`;
///   raised before the file is touched.
/// - [`DictionaryError::Io`] when the file is missing or unreadable.
/// - [`DictionaryError::CorruptDocument`] when the container cannot be parsed.
pub fn read_file_metadata(path: &Path) -> Result<FileMetadata> {
    let format = ContainerFormat::from_path(path)?;

    let fs_meta = std::fs::metadata(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !fs_meta.is_file() {
        return Err(DictionaryError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Not a regular file: {}", path.display()),
        )));
    }

    let mut metadata = FileMetadata::new(format);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    metadata.push(Attribute::FileName, MetadataValue::Text(file_name));
    metadata.push(
        Attribute::FileSizeKb,
        MetadataValue::Number(size_in_kb(fs_meta.len())),
    );
    let modified = fs_meta
        .modified()
        .with_context(|| format!("Failed to read modification time of {}", path.display()))?;
    metadata.push(
        Attribute::LastModified,
        MetadataValue::Timestamp(local_timestamp(modified)),
    );

    match format {
        ContainerFormat::Modern => append_core_properties(&mut metadata, path)?,
        ContainerFormat::Legacy => append_legacy_globals(&mut metadata, path)?,
    }

    tracing::debug!(
        "Read {} metadata attributes from {}",
        metadata.len(),
        path.display()
    );
    Ok(metadata)
}

/// Bytes to kilobytes, rounded to two decimals.
pub fn size_in_kb(bytes: u64) -> f64 {
    let kb = bytes as f64 / 1024.0;
    (kb * 100.0).round() / 100.0
}

fn local_timestamp(time: std::time::SystemTime) -> NaiveDateTime {
    let ts = DateTime::<Local>::from(time).naive_local();
    ts.with_nanosecond(0).unwrap_or(ts)
}

fn append_core_properties(metadata: &mut FileMetadata, path: &Path) -> Result<()> {
    let props = read_core_properties(path)?;

    metadata.push(Attribute::Author, MetadataValue::from_optional(props.creator));
    metadata.push(
        Attribute::LastModifiedBy,
        MetadataValue::from_optional(props.last_modified_by),
    );
    metadata.push(Attribute::Created, core_timestamp_value(props.created));
    metadata.push(Attribute::Modified, core_timestamp_value(props.modified));
    Ok(())
}

fn core_timestamp_value(ts: Option<CoreTimestamp>) -> MetadataValue {
    match ts {
        Some(CoreTimestamp::Parsed(ts)) => MetadataValue::Timestamp(ts),
        Some(CoreTimestamp::Raw(text)) => MetadataValue::Text(text),
        None => MetadataValue::Missing,
    }
}

fn append_legacy_globals(metadata: &mut FileMetadata, path: &Path) -> Result<()> {
    let globals = read_legacy_globals(path)?;

    metadata.push(
        Attribute::Author,
        MetadataValue::from_optional(globals.user_name),
    );
    metadata.push(Attribute::Created, legacy_created(globals.date_mode));
    Ok(())
}

/// Creation date derived from the workbook's date mode.
///
/// A 1904-mode workbook records serial 1 of the 1900 date system,
/// 1900-01-01 00:00:00. The default 1900 system and a missing `DATEMODE`
/// record give `"Unknown"`.
fn legacy_created(date_mode: Option<DateMode>) -> MetadataValue {
    match date_mode {
        Some(DateMode::Mac1904) => NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or_else(MetadataValue::unknown, MetadataValue::Timestamp),
        Some(DateMode::Windows1900) | None => MetadataValue::unknown(),
    }
}
