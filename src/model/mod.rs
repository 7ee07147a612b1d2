use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{EtlError, Result};

/// Represents a single scalar value in a tabular dataset.
///
/// Cells keep the plain typed representation for ease of interoperability
/// with CSV, Excel, and SQL Server result sets.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Absent value (empty CSV field, SQL NULL, blank worksheet cell).
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Calendar date without a time component.
    Date(NaiveDate),
    /// Date and time without a timezone.
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Returns true for absent values and empty text.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the cell as plain text. Absent values render as the empty
    /// string so they round-trip through CSV.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(value) => value.to_string(),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) => value.to_string(),
            Cell::Text(value) => value.clone(),
            Cell::Date(value) => value.format("%Y-%m-%d").to_string(),
            Cell::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Renders the cell as a T-SQL literal suitable for interpolation into a
    /// generated statement. Text is emitted as an N'...' literal with single
    /// quotes doubled.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Cell::Null => "NULL".to_string(),
            Cell::Bool(true) => "1".to_string(),
            Cell::Bool(false) => "0".to_string(),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) => value.to_string(),
            Cell::Text(value) => format!("N'{}'", value.replace('\'', "''")),
            Cell::Date(value) => format!("'{}'", value.format("%Y-%m-%d")),
            Cell::DateTime(value) => format!("'{}'", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// An in-memory table: ordered column names plus rows of cells.
///
/// Frames are transient; they live for the duration of a single job run and
/// carry no schema beyond the column names observed in the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Column names in source order.
    pub columns: Vec<String>,
    /// Row data; every row has exactly one cell per column.
    pub rows: Vec<Vec<Cell>>,
}

impl Frame {
    /// Creates an empty frame with the provided column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, enforcing that its arity matches the column count.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::InvalidTable(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Index of the named column, failing with the column name when absent.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    }

    /// Text values of the named column, one entry per row.
    pub fn column_text(&self, name: &str) -> Result<Vec<String>> {
        let index = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| row[index].as_text()).collect())
    }

    /// Per-column count of missing values, in column order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let missing = self
                    .rows
                    .iter()
                    .filter(|row| row[index].is_missing())
                    .count();
                (name.clone(), missing)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        let mut frame = Frame::new(vec!["id".to_string(), "name".to_string()]);
        frame
            .push_row(vec![Cell::Int(1), Cell::Text("Alice".to_string())])
            .expect("row pushed");
        frame
            .push_row(vec![Cell::Int(2), Cell::Null])
            .expect("row pushed");
        frame
    }

    #[test]
    fn push_row_rejects_arity_mismatch() {
        let mut frame = sample_frame();
        let result = frame.push_row(vec![Cell::Int(3)]);
        assert!(matches!(result, Err(EtlError::InvalidTable(_))));
    }

    #[test]
    fn require_column_names_the_missing_column() {
        let frame = sample_frame();
        assert_eq!(frame.require_column("name").expect("column found"), 1);
        match frame.require_column("absent") {
            Err(EtlError::MissingColumn(name)) => assert_eq!(name, "absent"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_counts_include_null_and_blank_text() {
        let mut frame = sample_frame();
        frame
            .push_row(vec![Cell::Int(3), Cell::Text("  ".to_string())])
            .expect("row pushed");
        let counts = frame.missing_counts();
        assert_eq!(counts, vec![("id".to_string(), 0), ("name".to_string(), 2)]);
    }

    #[test]
    fn sql_literal_escapes_quotes() {
        let cell = Cell::Text("O'Hara".to_string());
        assert_eq!(cell.to_sql_literal(), "N'O''Hara'");
        assert_eq!(Cell::Null.to_sql_literal(), "NULL");
        assert_eq!(Cell::Bool(true).to_sql_literal(), "1");
    }
}
