use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::Result;
use crate::model::Frame;

/// Sheet name used for generated report workbooks.
pub const REPORT_SHEET: &str = "Report";

/// Writes a frame to an Excel file as a single autofiltered table.
pub fn write_xlsx_file(path: &Path, frame: &Frame) -> Result<()> {
    let mut workbook = build_workbook(frame)?;
    workbook.save(path)?;
    info!(path = %path.display(), rows = frame.len(), "wrote Excel file");
    Ok(())
}

/// Renders a frame to workbook bytes for upload without touching disk.
pub fn frame_to_xlsx_buffer(frame: &Frame) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(frame)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(frame: &Frame) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET)?;

    for (col_idx, header) in frame.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in frame.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string((row_idx + 1) as u32, col_idx as u16, &cell.as_text())?;
        }
    }

    let mut table = rust_xlsxwriter::Table::new();
    table.set_autofilter(true);
    let col_end = (frame.columns.len() as u16).saturating_sub(1);
    let row_end = if frame.rows.is_empty() {
        0
    } else {
        frame.rows.len() as u32
    };
    worksheet.add_table(0, 0, row_end, col_end, &table)?;

    Ok(workbook)
}
