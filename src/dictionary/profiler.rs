//! Column profiler for spreadsheet dictionaries.
//!
//! Names each column of the first worksheet and labels it with the kind of a
//! single sample value: the first non-empty cell below the header.

use super::metadata::{
    ColumnProfile, ContainerFormat, TIMESTAMP_FORMAT, ValueKind, synthesized_column_name,
};
use crate::error::{Result, ResultExt as _};
use calamine::{Data, Range, Reader as _, open_workbook_auto};
use std::path::Path;

/// Largest float magnitude that still maps to an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Profile every column of the first worksheet of `path`.
///
/// # Arguments
///
/// * `path` - A `.xls` or `.xlsx` file; any other extension is rejected before
///   the file is opened
///
/// # Returns
///
/// One [`ColumnProfile`] per column, from column A to the last used column, each
/// with an empty definition. A workbook without worksheets gives an empty list.
pub fn profile_columns(path: &Path) -> Result<Vec<ColumnProfile>> {
    ContainerFormat::from_path(path)?;

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let Some(range) = workbook.worksheet_range_at(0) else {
        tracing::warn!("Workbook {} has no worksheets", path.display());
        return Ok(Vec::new());
    };
    let range = range.with_context(|| format!("Failed to read first sheet of {}", path.display()))?;

    let columns = profile_range(&range);
    tracing::debug!("Profiled {} columns in {}", columns.len(), path.display());
    Ok(columns)
}

/// Profile a cell range using absolute sheet coordinates.
///
/// Row 0 is always the header row, even when the used range starts lower.
pub fn profile_range(range: &Range<Data>) -> Vec<ColumnProfile> {
    let Some((last_row, last_col)) = range.end() else {
        return Vec::new();
    };

    (0..=last_col)
        .map(|col| {
            let index = usize::try_from(col).unwrap_or(usize::MAX).saturating_add(1);
            let name = header_name(range.get_value((0, col)), index);
            let kind = (1..=last_row)
                .find_map(|row| range.get_value((row, col)).and_then(classify))
                .unwrap_or(ValueKind::Unknown);
            ColumnProfile::new(name, kind)
        })
        .collect()
}

/// Display name for a header cell, synthesized when the cell is blank.
fn header_name(cell: Option<&Data>, index: usize) -> String {
    let text = match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::DateTime(dt)) => dt
            .as_datetime()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Some(other) => other.to_string(),
    };

    if text.trim().is_empty() {
        synthesized_column_name(index)
    } else {
        text
    }
}

/// Kind of a sample cell; `None` for an empty cell.
pub fn classify(cell: &Data) -> Option<ValueKind> {
    let kind = match cell {
        Data::Empty => return None,
        Data::String(_) | Data::Error(_) => ValueKind::Text,
        Data::Int(_) => ValueKind::Integer,
        Data::Float(f) if is_integral(*f) => ValueKind::Integer,
        Data::Float(_) => ValueKind::Float,
        Data::Bool(_) => ValueKind::Boolean,
        Data::DateTime(_) | Data::DateTimeIso(_) => ValueKind::DateTime,
        Data::DurationIso(_) => ValueKind::Duration,
    };
    Some(kind)
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_from(cells: &[((u32, u32), Data)]) -> Range<Data> {
        let end_row = cells.iter().map(|((r, _), _)| *r).max().unwrap();
        let end_col = cells.iter().map(|((_, c), _)| *c).max().unwrap();
        let mut range = Range::new((0, 0), (end_row, end_col));
        for (pos, value) in cells {
            range.set_value(*pos, value.clone());
        }
        range
    }

    #[test]
    fn test_blank_header_and_integer_sample() {
        let range = range_from(&[
            ((0, 0), Data::String("id".to_owned())),
            ((1, 0), Data::Float(1.0)),
            ((1, 1), Data::Empty),
            ((2, 1), Data::Float(5.0)),
        ]);

        let columns = profile_range(&range);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].name, "Column 2");
        assert_eq!(columns[1].kind, ValueKind::Integer);
        assert!(columns[1].definition.is_empty());
    }

    #[test]
    fn test_all_empty_column_is_unknown() {
        let range = range_from(&[
            ((0, 0), Data::String("a".to_owned())),
            ((0, 1), Data::String("b".to_owned())),
            ((3, 0), Data::String("x".to_owned())),
        ]);

        let columns = profile_range(&range);
        assert_eq!(columns[0].kind, ValueKind::Text);
        assert_eq!(columns[1].name, "b");
        assert_eq!(columns[1].kind, ValueKind::Unknown);
    }

    #[test]
    fn test_only_first_sample_counts() {
        let range = range_from(&[
            ((0, 0), Data::String("mixed".to_owned())),
            ((1, 0), Data::String("n/a".to_owned())),
            ((2, 0), Data::Float(3.5)),
            ((3, 0), Data::Float(4.5)),
        ]);

        assert_eq!(profile_range(&range)[0].kind, ValueKind::Text);
    }

    #[test]
    fn test_header_row_is_absolute() {
        // Used range starts at row 2: the header cell of every column is blank.
        let mut range = Range::new((2, 0), (3, 1));
        range.set_value((2, 0), Data::Bool(true));
        range.set_value((3, 1), Data::Float(0.25));

        let columns = profile_range(&range);
        assert_eq!(columns[0].name, "Column 1");
        assert_eq!(columns[0].kind, ValueKind::Boolean);
        assert_eq!(columns[1].name, "Column 2");
        assert_eq!(columns[1].kind, ValueKind::Float);
    }

    #[test]
    fn test_leading_empty_columns_are_included() {
        let mut range = Range::new((0, 2), (1, 2));
        range.set_value((0, 2), Data::String("c".to_owned()));
        range.set_value((1, 2), Data::Int(7));

        let columns = profile_range(&range);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Column 1", "Column 2", "c"]);
        assert_eq!(columns[0].kind, ValueKind::Unknown);
        assert_eq!(columns[2].kind, ValueKind::Integer);
    }

    #[test]
    fn test_classify_kinds() {
        assert_eq!(classify(&Data::Empty), None);
        assert_eq!(classify(&Data::String(String::new())), Some(ValueKind::Text));
        assert_eq!(classify(&Data::Float(2.0)), Some(ValueKind::Integer));
        assert_eq!(classify(&Data::Float(2.5)), Some(ValueKind::Float));
        assert_eq!(classify(&Data::Float(1e300)), Some(ValueKind::Float));
        assert_eq!(classify(&Data::Bool(false)), Some(ValueKind::Boolean));
        assert_eq!(
            classify(&Data::DateTimeIso("2024-01-01T00:00:00".to_owned())),
            Some(ValueKind::DateTime)
        );
        assert_eq!(
            classify(&Data::DurationIso("PT1H".to_owned())),
            Some(ValueKind::Duration)
        );
    }

    #[test]
    fn test_numeric_header_is_rendered() {
        assert_eq!(header_name(Some(&Data::Float(2024.0)), 1), "2024");
        assert_eq!(header_name(Some(&Data::String("  ".to_owned())), 4), "Column 4");
        assert_eq!(header_name(None, 3), "Column 3");
    }
}
