//! Request/response entry points used by the shells.
//!
//! Shells never call the reader, profiler or writer directly: they build an
//! [`AnnotationRequest`] from what the user typed and hand it to [`annotate`].

use super::metadata::{ColumnProfile, FileMetadata};
use super::profiler::profile_columns;
use super::reader::read_file_metadata;
use super::writer::{resolve_output_path, write_dictionary};
use crate::error::{DictionaryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the shells show before the user starts typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub source: PathBuf,
    pub metadata: FileMetadata,
    pub columns: Vec<ColumnProfile>,
}

/// User annotations for an inspected file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRequest {
    pub inspection: Inspection,
    pub subject: String,
    /// One definition per column, in profile order.
    pub definitions: Vec<String>,
    /// Destination as typed; the default extension is added when missing.
    pub output: PathBuf,
}

/// Read metadata and profile columns of `path`.
///
/// The reader and profiler open the file independently; the file is never
/// modified.
pub fn inspect(path: &Path) -> Result<Inspection> {
    tracing::debug!("Inspecting {}", path.display());
    let metadata = read_file_metadata(path)?;
    let columns = profile_columns(path)?;

    Ok(Inspection {
        source: path.to_path_buf(),
        metadata,
        columns,
    })
}

/// Attach the user's annotations and write the dictionary.
///
/// # Returns
///
/// The path actually written, after extension resolution.
///
/// # Errors
///
/// [`DictionaryError::InvalidInput`] when the number of definitions differs
/// from the number of columns; nothing is written in that case.
pub fn annotate(request: &AnnotationRequest) -> Result<PathBuf> {
    let columns = &request.inspection.columns;
    if request.definitions.len() != columns.len() {
        return Err(DictionaryError::InvalidInput(format!(
            "Expected {} column definitions, got {}",
            columns.len(),
            request.definitions.len()
        )));
    }

    let annotated: Vec<ColumnProfile> = columns
        .iter()
        .zip(&request.definitions)
        .map(|(column, definition)| column.clone().with_definition(definition.as_str()))
        .collect();

    let output = resolve_output_path(&request.output);
    write_dictionary(
        &request.inspection.metadata,
        &annotated,
        &request.subject,
        &output,
    )?;
    Ok(output)
}

/// Split a `NAME=TEXT` argument at its first `=`.
pub fn parse_definition_pair(arg: &str) -> Result<(String, String)> {
    arg.split_once('=')
        .map(|(name, text)| (name.to_owned(), text.to_owned()))
        .ok_or_else(|| {
            DictionaryError::InvalidInput(format!("Expected NAME=TEXT, got {arg:?}"))
        })
}

/// Parse a JSON object mapping column names to definitions.
pub fn parse_definitions_json(json: &str) -> Result<BTreeMap<String, String>> {
    Ok(serde_json::from_str(json)?)
}

/// Turn named definitions into the positional list [`annotate`] expects.
///
/// Columns without an entry get an empty definition. A name shared by several
/// columns applies to all of them.
///
/// # Errors
///
/// [`DictionaryError::InvalidInput`] for a name that matches no column.
pub fn definitions_by_name<I>(columns: &[ColumnProfile], named: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut definitions: Vec<String> = columns.iter().map(|c| c.definition.clone()).collect();

    for (name, text) in named {
        let mut matched = false;
        for (column, slot) in columns.iter().zip(definitions.iter_mut()) {
            if column.name == name {
                slot.clone_from(&text);
                matched = true;
            }
        }
        if !matched {
            return Err(DictionaryError::InvalidInput(format!(
                "No column named {name:?}"
            )));
        }
    }

    Ok(definitions)
}
