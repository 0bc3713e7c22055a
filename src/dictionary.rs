//! Spreadsheet dictionary: file metadata plus a per-column description table.
//!
//! ## Core Concepts
//!
//! - **File metadata**: file-system attributes merged with the document
//!   properties of the container (`.xlsx` core properties, `.xls` globals)
//! - **Column profile**: header name and the kind of one sample value per column
//! - **Annotation**: a subject for the file and a free-text definition per column,
//!   supplied by the user before writing
//!
//! ## Usage
//!
//! ```no_run
//! use sheetdict::dictionary::{AnnotationRequest, annotate, inspect};
//! use std::path::Path;
//!
//! # fn example() -> sheetdict::error::Result<()> {
//! let inspection = inspect(Path::new("budget.xlsx"))?;
//! let definitions = vec![String::new(); inspection.columns.len()];
//!
//! let written = annotate(&AnnotationRequest {
//!     inspection,
//!     subject: "Quarterly budget".to_owned(),
//!     definitions,
//!     output: "budget-dictionary".into(),
//! })?;
//! assert_eq!(written.extension().and_then(|e| e.to_str()), Some("xlsx"));
//! # Ok(())
//! # }
//! ```

mod biff;
mod core_props;
pub mod flows;
pub mod loader;
pub mod metadata;
pub mod profiler;
pub mod reader;
pub mod renderer;
pub mod writer;

pub use flows::{AnnotationRequest, Inspection, annotate, inspect};
pub use loader::{LoadedDictionary, load_dictionary};
pub use metadata::{
    Attribute, ColumnProfile, ContainerFormat, FileMetadata, MetadataEntry, MetadataValue,
    ValueKind,
};
pub use profiler::profile_columns;
pub use reader::read_file_metadata;
pub use renderer::render_markdown;
pub use writer::{resolve_output_path, write_dictionary};
