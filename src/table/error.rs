//! Table edit errors

use thiserror::Error;

/// Errors raised by in-place table edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The column exists but is read-only (the identifier column)
    #[error("Column '{0}' is not editable")]
    NotEditable(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row {row} out of range (table has {row_count} rows)")]
    RowOutOfRange { row: usize, row_count: usize },

    /// There is no table to edit (no data, failed load, or not loaded yet)
    #[error("No table is loaded")]
    NoTable,
}
