//! Runtime options.
//!
//! Nothing here is persisted: every value is built in memory by the shell that
//! runs the program (CLI flags, or defaults for the desktop form).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output file extension used when the user supplies none.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "xlsx";

/// Texts written into the output workbook and shown by the shells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub sheet_name: String,
    pub attribute_header: String,
    pub value_header: String,
    pub subject: String,
    pub column_name_header: String,
    pub column_type_header: String,
    pub column_definition_header: String,
    pub file_name: String,
    pub file_size_kb: String,
    pub last_modified: String,
    pub author: String,
    pub last_modified_by: String,
    pub created: String,
    pub modified: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            sheet_name: "Metadata".to_owned(),
            attribute_header: "Attribute".to_owned(),
            value_header: "Value".to_owned(),
            subject: "File subject".to_owned(),
            column_name_header: "Column name".to_owned(),
            column_type_header: "Type".to_owned(),
            column_definition_header: "Definition".to_owned(),
            file_name: "File name".to_owned(),
            file_size_kb: "File size (KB)".to_owned(),
            last_modified: "Last modified".to_owned(),
            author: "Author".to_owned(),
            last_modified_by: "Last modified by".to_owned(),
            created: "Created".to_owned(),
            modified: "Modified".to_owned(),
        }
    }
}

/// Logging setup requested by the shell.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    /// Write rolling log files in addition to the console.
    pub file_logging: bool,
    /// Override for the log directory; `None` uses the platform data directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file_logging: true,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels_match_output_layout() {
        let labels = Labels::default();
        assert_eq!(labels.sheet_name, "Metadata");
        assert_eq!(labels.attribute_header, "Attribute");
        assert_eq!(labels.value_header, "Value");
        assert_eq!(labels.column_name_header, "Column name");
        assert_eq!(labels.column_type_header, "Type");
        assert_eq!(labels.column_definition_header, "Definition");
    }

    #[test]
    fn test_labels_serde_roundtrip() {
        let labels = Labels::default();
        let json = serde_json::to_string(&labels).unwrap();
        let back: Labels = serde_json::from_str(&json).unwrap();
        assert_eq!(back, labels);
    }
}
