use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::info;

use crate::error::{EtlError, Result};
use crate::model::{Cell, Frame};

/// Reads a worksheet from an Excel file into a frame. The first row supplies
/// the column names; when no sheet name is given the first worksheet is used.
pub fn read_excel_file(path: &Path, sheet: Option<&str>) -> Result<Frame> {
    if !path.exists() {
        return Err(EtlError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let frame = read_frame(&mut workbook, sheet)?;
    info!(path = %path.display(), rows = frame.len(), "read Excel file");
    Ok(frame)
}

/// Reads a worksheet from in-memory workbook bytes, e.g. a fetched remote
/// file.
pub fn read_excel_bytes(bytes: &[u8], sheet: Option<&str>) -> Result<Frame> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    read_frame(&mut workbook, sheet)
}

fn read_frame<RS: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<RS>,
    sheet: Option<&str>,
) -> Result<Frame> {
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| EtlError::InvalidTable("workbook has no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| EtlError::InvalidTable(format!("missing sheet '{sheet_name}'")))?;
    let range = range?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };

    let width = columns.len();
    let mut frame = Frame::new(columns);
    for row in rows {
        let mut cells: Vec<Cell> = row.iter().take(width).map(cell_value).collect();
        cells.resize(width, Cell::Null);
        frame.push_row(cells)?;
    }
    Ok(frame)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Null,
        DataType::String(value) => {
            if value.trim().is_empty() {
                Cell::Null
            } else {
                Cell::Text(value.clone())
            }
        }
        DataType::Int(value) => Cell::Int(*value),
        DataType::Float(value) => Cell::Float(*value),
        DataType::Bool(value) => Cell::Bool(*value),
        other => Cell::Text(other.to_string()),
    }
}
