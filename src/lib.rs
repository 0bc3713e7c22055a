//! # Sheetdict - Spreadsheet Data Dictionary Builder
//!
//! Sheetdict extracts file-level and column-level metadata from a single `.xls`
//! or `.xlsx` file, lets a user attach a subject and per-column definitions, and
//! writes the annotated result as a new `.xlsx` workbook.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sheetdict::dictionary::{inspect, render_markdown};
//! use std::path::Path;
//!
//! # fn example() -> sheetdict::error::Result<()> {
//! let inspection = inspect(Path::new("budget.xlsx"))?;
//! for col in &inspection.columns {
//!     println!("{}: {}", col.name, col.kind);
//! }
//! println!("{}", render_markdown(&inspection, None));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`dictionary`]: Metadata reader, column profiler, writer and loader
//!   - [`dictionary::flows`]: `inspect`/`annotate` entry points used by the shells
//! - [`config`]: Runtime options and output labels
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: Console and rolling file logging

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod dictionary;
pub mod error;
pub mod logging;
