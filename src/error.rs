//! Centralized error handling for sheetdict.
//!
//! Every fallible library operation returns [`Result`], whose error side is
//! [`DictionaryError`]. The variants are terminal: nothing in the crate retries,
//! and shells are expected to show `to_string()` to the user and go back to
//! their idle state.
//!
//! ```
//! use sheetdict::error::DictionaryError;
//!
//! fn describe(err: &DictionaryError) -> &'static str {
//!     match err {
//!         DictionaryError::UnsupportedFormat(_) => "pick an .xls or .xlsx file",
//!         DictionaryError::CorruptDocument(_) => "the file could not be parsed",
//!         DictionaryError::Io(_) => "the file could not be read or written",
//!         _ => "something else went wrong",
//!     }
//! }
//! # let err = DictionaryError::UnsupportedFormat("csv".to_owned());
//! # assert_eq!(describe(&err), "pick an .xls or .xlsx file");
//! ```
//!
//! The [`ResultExt`] trait adds a `.context()` method to any result whose error
//! converts into [`DictionaryError`], keeping the original variant so callers can
//! still match on it.

use thiserror::Error;

/// Main error type for sheetdict operations.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The file extension is not one of the supported container formats.
    #[error("Unsupported file format: {0:?} (expected .xls or .xlsx)")]
    UnsupportedFormat(String),

    /// The container exists but its internal structure cannot be parsed.
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    /// File missing, unreadable, or an output path that cannot be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shell-supplied data does not line up with the column profile, or
    /// cannot be stored in a workbook.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Logging or runtime option setup failed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DictionaryError {
    /// Wrap any displayable parser failure as a [`DictionaryError::CorruptDocument`].
    pub fn corrupt(err: impl std::fmt::Display) -> Self {
        Self::CorruptDocument(err.to_string())
    }
}

impl From<calamine::Error> for DictionaryError {
    fn from(err: calamine::Error) -> Self {
        match err {
            calamine::Error::Io(e) => Self::Io(e),
            other => Self::corrupt(other),
        }
    }
}

impl From<calamine::XlsxError> for DictionaryError {
    fn from(err: calamine::XlsxError) -> Self {
        match err {
            calamine::XlsxError::Io(e) => Self::Io(e),
            other => Self::corrupt(other),
        }
    }
}

impl From<zip::result::ZipError> for DictionaryError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::corrupt(other),
        }
    }
}

impl From<quick_xml::Error> for DictionaryError {
    fn from(err: quick_xml::Error) -> Self {
        Self::corrupt(format!("XML parsing error: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for DictionaryError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        match err {
            rust_xlsxwriter::XlsxError::IoError(e) => Self::Io(e),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

impl From<tempfile::PersistError> for DictionaryError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

impl From<serde_json::Error> for DictionaryError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON error: {err}"))
    }
}

// Shell adapters surface errors as plain messages.
impl From<DictionaryError> for String {
    fn from(err: DictionaryError) -> Self {
        err.to_string()
    }
}

/// Result type alias for sheetdict operations.
pub type Result<T> = std::result::Result<T, DictionaryError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error, keeping its variant.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DictionaryError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        let msg = msg.into();
        self.map_err(|e| prefix(e.into(), &msg))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(err: DictionaryError, msg: &str) -> DictionaryError {
    match err {
        DictionaryError::Io(e) => {
            DictionaryError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}")))
        }
        DictionaryError::CorruptDocument(m) => DictionaryError::CorruptDocument(format!("{msg}: {m}")),
        DictionaryError::InvalidInput(m) => DictionaryError::InvalidInput(format!("{msg}: {m}")),
        DictionaryError::Config(m) => DictionaryError::Config(format!("{msg}: {m}")),
        unsupported @ DictionaryError::UnsupportedFormat(_) => unsupported,
    }
}
