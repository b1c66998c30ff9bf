//! In-memory tabular input.
//!
//! Every cell is kept as a string: identifier columns (`concept_id`,
//! `concept_code`, caller codes like NDC) carry leading zeros and punctuation
//! that must survive untouched. An empty cell is a missing value.

use crate::error::{CrosswalkError, InputKind, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor for literal tables (tests, demos).
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub(crate) fn require(&self, input: InputKind, column: &str) -> Result<usize> {
        self.position(column).ok_or_else(|| CrosswalkError::Schema {
            input,
            column: column.to_string(),
        })
    }
}

/// Ragged rows read short cells as missing.
pub(crate) fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

pub(crate) fn optional_cell(row: &[String], idx: Option<usize>) -> Option<String> {
    let value = cell(row, idx?);
    (!value.is_empty()).then(|| value.to_string())
}
