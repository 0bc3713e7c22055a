//! Text renderings of a dictionary for terminal preview.

use super::flows::Inspection;
use super::loader::LoadedDictionary;
use super::metadata::{ColumnProfile, MetadataValue};
use crate::config::Labels;

/// Render an inspected file as a Markdown document.
///
/// Contains the file name as title, the attribute table, the subject when
/// given, and the column table.
pub fn render_markdown(inspection: &Inspection, subject: Option<&str>) -> String {
    let labels = Labels::default();
    let title = inspection
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| inspection.source.display().to_string());

    let attributes = inspection
        .metadata
        .entries()
        .iter()
        .map(|e| (e.attribute.label(&labels), &e.value));

    build_markdown(&title, attributes, subject, &inspection.columns, &labels)
}

/// Render a dictionary read back from disk as Markdown.
pub fn render_loaded_markdown(title: &str, dict: &LoadedDictionary) -> String {
    let labels = Labels::default();
    let attributes = dict
        .attributes
        .iter()
        .map(|(label, value)| (label.as_str(), value));

    build_markdown(
        title,
        attributes,
        Some(dict.subject.as_str()),
        &dict.columns,
        &labels,
    )
}

fn build_markdown<'a>(
    title: &str,
    attributes: impl Iterator<Item = (&'a str, &'a MetadataValue)>,
    subject: Option<&str>,
    columns: &[ColumnProfile],
    labels: &Labels,
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Data Dictionary: {}\n\n", escape_cell(title)));

    md.push_str(&format!(
        "| {} | {} |\n",
        labels.attribute_header, labels.value_header
    ));
    md.push_str("|---|---|\n");
    for (label, value) in attributes {
        md.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(label),
            escape_cell(&value.to_string())
        ));
    }
    md.push('\n');

    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        md.push_str(&format!("**{}:** {}\n\n", labels.subject, subject));
    }

    md.push_str(&format!("## Columns ({})\n\n", columns.len()));
    if columns.is_empty() {
        md.push_str("*No columns found.*\n");
        return md;
    }

    md.push_str(&format!(
        "| {} | {} | {} |\n",
        labels.column_name_header, labels.column_type_header, labels.column_definition_header
    ));
    md.push_str("|---|---|---|\n");
    for col in columns {
        md.push_str(&format!(
            "| {} | `{}` | {} |\n",
            escape_cell(&col.name),
            col.kind,
            escape_cell(&col.definition)
        ));
    }

    md
}

/// Plain-text listing used by `inspect --format text`.
pub fn render_text(inspection: &Inspection) -> String {
    let labels = Labels::default();
    let width = inspection
        .metadata
        .entries()
        .iter()
        .map(|e| e.attribute.label(&labels).len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", inspection.source.display()));
    for entry in inspection.metadata.entries() {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            entry.attribute.label(&labels),
            entry.value
        ));
    }
    out.push('\n');
    for (i, col) in inspection.columns.iter().enumerate() {
        out.push_str(&format!("  {:>3}. {} ({})\n", i + 1, col.name, col.kind));
    }
    out
}

/// Keep table cells on one line and escape column separators.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::metadata::{Attribute, ContainerFormat, FileMetadata, ValueKind};
    use std::path::PathBuf;

    fn inspection() -> Inspection {
        let mut metadata = FileMetadata::new(ContainerFormat::Modern);
        metadata.push(Attribute::FileName, MetadataValue::text("budget.xlsx"));
        metadata.push(Attribute::FileSizeKb, MetadataValue::Number(10.0));
        metadata.push(Attribute::Author, MetadataValue::Missing);
        Inspection {
            source: PathBuf::from("/data/budget.xlsx"),
            metadata,
            columns: vec![
                ColumnProfile::new("id", ValueKind::Integer).with_definition("Row key"),
                ColumnProfile::new("a|b", ValueKind::Text),
            ],
        }
    }

    #[test]
    fn test_render_markdown_tables() {
        let md = render_markdown(&inspection(), Some("Quarterly budget"));
        assert!(md.starts_with("# Data Dictionary: budget.xlsx\n"));
        assert!(md.contains("| File size (KB) | 10.00 |"));
        assert!(md.contains("| Author |  |"));
        assert!(md.contains("**File subject:** Quarterly budget"));
        assert!(md.contains("| id | `Integer` | Row key |"));
        assert!(md.contains("| a\\|b | `Text` |  |"));
    }

    #[test]
    fn test_render_markdown_without_subject() {
        let md = render_markdown(&inspection(), None);
        assert!(!md.contains("File subject"));
    }

    #[test]
    fn test_render_text_lists_columns() {
        let text = render_text(&inspection());
        assert!(text.contains("    1. id (Integer)"));
        assert!(text.contains("    2. a|b (Text)"));
    }
}
