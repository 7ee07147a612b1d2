use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::model::{Cell, Frame};

/// Writes a frame to a CSV file. Null cells render as empty fields.
pub fn write_csv_file(path: &Path, frame: &Frame) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&frame.columns)?;
    for row in &frame.rows {
        writer.write_record(row.iter().map(Cell::as_text))?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = frame.len(), "wrote CSV file");
    Ok(())
}
