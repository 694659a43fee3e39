//! Tabular Materializer
//!
//! Turns fetched records into a display-ready table:
//!
//! - columns are the union of every field seen, in first-seen order
//! - fields a record lacks are filled with null
//! - the identifier column is always rendered as a string and is the only
//!   column that is not editable
//!
//! An empty record sequence materializes to [`Materialized::NoData`], never to
//! a table with zero rows and no columns.

mod error;
mod export;

pub use error::TableError;
pub use export::ExportFormat;

use serde::Serialize;
use std::collections::HashSet;

use crate::source::{Record, Value};

/// Column descriptor, mirroring the shape a data-table widget expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub editable: bool,
}

/// One table row, keyed by column id, fields in column order
pub type Row = Record;

/// A materialized, display-ready table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
    id_column: String,
}

impl Table {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.column(id).is_some()
    }

    /// Value at `(row, column)`
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Column ids in display order
    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }

    /// Edit one cell in place.
    ///
    /// Edits live only in this table; they are never written back to the
    /// data source and are discarded by the next refresh.
    pub fn update_cell(
        &mut self,
        row: usize,
        column: &str,
        value: Value,
    ) -> Result<(), TableError> {
        let col = self
            .column(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        if !col.editable {
            return Err(TableError::NotEditable(column.to_string()));
        }

        let row_count = self.rows.len();
        let target = self
            .rows
            .get_mut(row)
            .ok_or(TableError::RowOutOfRange { row, row_count })?;
        target.insert(column.to_string(), value);
        Ok(())
    }
}

/// Result of materializing a record sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Materialized {
    /// The source collection had no documents
    NoData,
    /// At least one record was materialized
    Table { table: Table },
}

impl Materialized {
    pub fn table(&self) -> Option<&Table> {
        match self {
            Materialized::Table { table } => Some(table),
            Materialized::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Materialized::NoData)
    }
}

/// Converts records into tables
#[derive(Debug, Clone)]
pub struct Materializer {
    id_field: String,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new("_id")
    }
}

impl Materializer {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Materialize a record sequence. Pure: the same input always yields the
    /// same output.
    pub fn materialize(&self, records: &[Record]) -> Materialized {
        if records.is_empty() {
            return Materialized::NoData;
        }

        let mut seen = HashSet::new();
        let mut column_ids: Vec<String> = Vec::new();
        for record in records {
            for name in record.field_names() {
                if seen.insert(name) {
                    column_ids.push(name.to_string());
                }
            }
        }

        let columns = column_ids
            .iter()
            .map(|id| Column {
                id: id.clone(),
                name: id.clone(),
                editable: *id != self.id_field,
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                column_ids
                    .iter()
                    .map(|id| {
                        let value = record.get(id).cloned().unwrap_or(Value::Null);
                        let value = if *id == self.id_field {
                            Value::Text(value.to_display_string())
                        } else {
                            value
                        };
                        (id.clone(), value)
                    })
                    .collect()
            })
            .collect();

        Materialized::Table {
            table: Table {
                columns,
                rows,
                id_column: self.id_field.clone(),
            },
        }
    }
}
