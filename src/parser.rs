//! Keyword input parser.
//!
//! Input is a header-less CSV where every row is one keyword group. Rows may
//! have different lengths.

use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::InputError;
use crate::trends::types::KeywordGroup;

/// Reads keyword groups from the CSV file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains no keywords.
pub fn parse_keyword_groups(path: impl AsRef<Path>) -> Result<Vec<KeywordGroup>, InputError> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    read_groups(reader)
}

/// Same as [`parse_keyword_groups`] for an in-memory reader.
pub fn parse_keyword_groups_from<R: Read>(input: R) -> Result<Vec<KeywordGroup>, InputError> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);
    read_groups(reader)
}

fn read_groups<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<KeywordGroup>, InputError> {
    let mut groups = Vec::new();

    for record in reader.records() {
        let record = record?;
        let keywords: Vec<String> = record
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect();

        if keywords.is_empty() {
            continue;
        }
        groups.push(KeywordGroup::new(keywords)?);
    }

    if groups.is_empty() {
        return Err(InputError::Empty);
    }
    debug!(groups = groups.len(), "Parsed keyword groups");
    Ok(groups)
}
