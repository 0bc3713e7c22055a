//! Output workbook serialization.
//!
//! The dictionary is written as a single `Metadata` sheet:
//!
//! ```text
//! Attribute        | Value
//! <one row per metadata entry>
//! File subject     | <subject>
//!
//! Column name      | Type    | Definition
//! <one row per column profile>
//! ```

use super::metadata::{ColumnProfile, FileMetadata, MetadataValue};
use crate::config::{DEFAULT_OUTPUT_EXTENSION, Labels};
use crate::error::{Result, ResultExt as _};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Excel number format matching [`super::metadata::TIMESTAMP_FORMAT`].
pub const EXCEL_TIMESTAMP_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

const TEMP_PREFIX: &str = ".sheetdict-";

/// Append the default extension when `path` has none.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_OUTPUT_EXTENSION)
    }
}

/// Write the annotated dictionary to `output`, replacing any existing file.
///
/// The workbook is built fully in memory, written to a temporary file next to
/// `output` and then renamed over it, so `output` is either the complete new
/// workbook or left as it was. A new file gets the usual mode for created
/// files; a replaced one keeps the mode it had.
///
/// # Arguments
///
/// * `metadata` - File-level attributes, written in entry order
/// * `columns` - Column triples, written in profile order
/// * `subject` - Free-text file subject, written verbatim
/// * `output` - Destination path, used exactly as given
pub fn write_dictionary(
    metadata: &FileMetadata,
    columns: &[ColumnProfile],
    subject: &str,
    output: &Path,
) -> Result<()> {
    let labels = Labels::default();
    let buffer = build_workbook(metadata, columns, subject, &labels)?.save_to_buffer()?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_PREFIX).suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        // Same mode as `File::create`; the umask still applies.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    // A replaced output keeps its permissions.
    if let Ok(existing) = fs::metadata(output) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", output.display()))?;
    }

    tmp.write_all(&buffer)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("Failed to write temporary file for {}", output.display()))?;
    tmp.persist(output)
        .with_context(|| format!("Failed to replace {}", output.display()))?;

    tracing::info!(
        "Wrote dictionary with {} attributes and {} columns to {}",
        metadata.len(),
        columns.len(),
        output.display()
    );
    Ok(())
}

fn build_workbook(
    metadata: &FileMetadata,
    columns: &[ColumnProfile],
    subject: &str,
    labels: &Labels,
) -> Result<Workbook> {
    let header = Format::new().set_bold();
    let timestamp = Format::new().set_num_format(EXCEL_TIMESTAMP_FORMAT);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&labels.sheet_name)?;
    sheet.set_column_width(0, 24)?;
    sheet.set_column_width(1, 24)?;
    sheet.set_column_width(2, 48)?;

    sheet.write_string_with_format(0, 0, &labels.attribute_header, &header)?;
    sheet.write_string_with_format(0, 1, &labels.value_header, &header)?;

    let mut row: u32 = 1;
    for entry in metadata.entries() {
        sheet.write_string(row, 0, entry.attribute.label(labels))?;
        write_value(sheet, row, &entry.value, &timestamp)?;
        row += 1;
    }

    sheet.write_string(row, 0, &labels.subject)?;
    sheet.write_string(row, 1, subject)?;

    // One blank separator row.
    row += 2;

    sheet.write_string_with_format(row, 0, &labels.column_name_header, &header)?;
    sheet.write_string_with_format(row, 1, &labels.column_type_header, &header)?;
    sheet.write_string_with_format(row, 2, &labels.column_definition_header, &header)?;

    for column in columns {
        row += 1;
        sheet.write_string(row, 0, &column.name)?;
        sheet.write_string(row, 1, column.kind.as_str())?;
        sheet.write_string(row, 2, &column.definition)?;
    }

    Ok(workbook)
}

fn write_value(
    sheet: &mut Worksheet,
    row: u32,
    value: &MetadataValue,
    timestamp: &Format,
) -> Result<()> {
    match value {
        MetadataValue::Text(text) => {
            sheet.write_string(row, 1, text)?;
        }
        MetadataValue::Number(n) => {
            sheet.write_number(row, 1, *n)?;
        }
        MetadataValue::Timestamp(ts) => {
            sheet.write_datetime_with_format(row, 1, ts, timestamp)?;
        }
        // Left as a blank cell.
        MetadataValue::Missing => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::metadata::{ContainerFormat, ValueKind};

    #[test]
    fn test_resolve_output_path_adds_extension() {
        assert_eq!(
            resolve_output_path(Path::new("out/dictionary")),
            PathBuf::from("out/dictionary.xlsx")
        );
    }

    #[test]
    fn test_resolve_output_path_keeps_extension() {
        assert_eq!(
            resolve_output_path(Path::new("out/dictionary.xls")),
            PathBuf::from("out/dictionary.xls")
        );
        assert_eq!(
            resolve_output_path(Path::new("dictionary.XLSX")),
            PathBuf::from("dictionary.XLSX")
        );
    }

    #[test]
    fn test_unwritable_destination_is_io() {
        let metadata = FileMetadata::new(ContainerFormat::Modern);
        let err = write_dictionary(
            &metadata,
            &[],
            "",
            Path::new("/nonexistent-dir/sub/out.xlsx"),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::DictionaryError::Io(_)));
    }

    #[test]
    fn test_no_temporary_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dictionary.xlsx");
        let metadata = FileMetadata::new(ContainerFormat::Modern);

        write_dictionary(&metadata, &[], "subject", &output).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["dictionary.xlsx"]);
    }

    #[test]
    fn test_oversized_text_is_invalid_input() {
        let metadata = FileMetadata::new(ContainerFormat::Modern);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dictionary.xlsx");
        let columns =
            [ColumnProfile::new("notes", ValueKind::Text).with_definition("x".repeat(40_000))];

        let err = write_dictionary(&metadata, &columns, "", &output).unwrap_err();
        assert!(
            matches!(err, crate::error::DictionaryError::InvalidInput(_)),
            "got {err:?}"
        );
        assert!(!output.exists());
    }

    #[cfg(unix)]
    mod permissions {
        use super::*;
        use std::os::unix::fs::PermissionsExt as _;

        fn mode(path: &Path) -> u32 {
            fs::metadata(path).unwrap().permissions().mode() & 0o777
        }

        #[test]
        fn test_new_output_gets_created_file_mode() {
            let dir = tempfile::tempdir().unwrap();
            let reference = dir.path().join("reference");
            fs::File::create(&reference).unwrap();
            let output = dir.path().join("dictionary.xlsx");

            write_dictionary(&FileMetadata::new(ContainerFormat::Modern), &[], "", &output)
                .unwrap();
            assert_eq!(mode(&output), mode(&reference));
        }

        #[test]
        fn test_replaced_output_keeps_its_mode() {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("dictionary.xlsx");
            fs::write(&output, b"old").unwrap();
            fs::set_permissions(&output, fs::Permissions::from_mode(0o640)).unwrap();

            write_dictionary(&FileMetadata::new(ContainerFormat::Modern), &[], "", &output)
                .unwrap();
            assert_eq!(mode(&output), 0o640);
            assert_ne!(fs::read(&output).unwrap(), b"old");
        }
    }
}
