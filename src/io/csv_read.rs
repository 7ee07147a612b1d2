use std::io::Cursor;
use std::path::Path;

use tracing::info;

use crate::error::{EtlError, Result};
use crate::model::{Cell, Frame};

/// Reads a CSV file into a frame. Every value is ingested as text; empty
/// fields become null so missing-value reporting stays meaningful.
pub fn read_csv_file(path: &Path) -> Result<Frame> {
    if !path.exists() {
        return Err(EtlError::MissingInput(path.to_path_buf()));
    }
    let reader = csv::Reader::from_path(path)?;
    let frame = read_from(reader)?;
    info!(path = %path.display(), rows = frame.len(), "read CSV file");
    Ok(frame)
}

/// Reads CSV content from an in-memory buffer, e.g. a fetched remote file.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<Frame> {
    read_from(csv::Reader::from_reader(Cursor::new(bytes)))
}

fn read_from<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Frame> {
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut frame = Frame::new(columns);
    for record in reader.records() {
        let record = record?;
        let cells = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        frame.push_row(cells)?;
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_values_as_text_with_nulls_for_blanks() {
        let frame = read_csv_bytes(b"id,name\n1,\n2,Bob\n").expect("CSV parsed");
        assert_eq!(frame.columns, vec!["id", "name"]);
        assert_eq!(frame.rows[0], vec![Cell::Text("1".to_string()), Cell::Null]);
        assert_eq!(
            frame.rows[1],
            vec![
                Cell::Text("2".to_string()),
                Cell::Text("Bob".to_string())
            ]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let result = read_csv_file(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(EtlError::MissingInput(_))));
    }
}
