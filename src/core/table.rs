//! Ordered, string-valued tables
//!
//! Both spreadsheet tabs (`Firewall Policy` and `Address Group`) are held as a
//! [`Table`]: column names in sheet order plus rows of cell text aligned with
//! those columns. Columns other than the ones the matcher reads are carried
//! through untouched so the exported result keeps every original field.

use crate::core::error::{Error, Result};

/// A named table of string cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Sheet or file the table came from, used in error messages
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this exact name.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Like [`Table::column_index`] but reports a missing column as an error.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| Error::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Iterates rows along with their positions.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| Record { index, cells })
    }

    /// An empty table with the same name and columns.
    pub fn empty_like(&self) -> Self {
        Self::new(self.name.clone(), self.columns.clone())
    }
}

/// A borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Row position in the source table (header excluded)
    pub index: usize,
    cells: &'a [String],
}

impl<'a> Record<'a> {
    /// Cell at a known column position; out-of-range positions read as empty.
    pub fn at(&self, position: usize) -> &'a str {
        self.cells.get(position).map_or("", String::as_str)
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}
