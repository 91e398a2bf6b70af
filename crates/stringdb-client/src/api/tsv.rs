//! Tab-separated responses
//!
//! Most STRING endpoints answer with a TSV document whose first line is the
//! header. `TsvTable` keeps the raw records and offers column lookup, row
//! filtering and typed deserialization.

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsvTable {
    columns: StringRecord,
    rows: Vec<StringRecord>,
}

impl TsvTable {
    /// Parse a TSV document with a header line
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let columns = reader.headers()?.clone();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row.get(idx).unwrap_or("")).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> {
        self.rows.iter().map(|row| row.iter().collect())
    }

    /// Keep only the rows whose `column` value satisfies `keep`.
    /// Unknown columns leave the table untouched.
    pub fn retain_by(&mut self, column: &str, mut keep: impl FnMut(&str) -> bool) {
        if let Some(idx) = self.column_index(column) {
            self.rows.retain(|row| keep(row.get(idx).unwrap_or("")));
        }
    }

    /// Deserialize every row into `T` using the header as field names
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            out.push(row.deserialize(Some(&self.columns))?);
        }
        Ok(out)
    }
}
