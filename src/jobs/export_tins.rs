use chrono::Local;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{self, connect_with_fallback};
use crate::error::Result;
use crate::io::frame_to_xlsx_buffer;
use crate::sharepoint::{FileFormat, SharePointClient};

/// Column carrying the provider TINs in the SharePoint list file.
const TIN_COLUMN: &str = "PROVIDERTIN";

/// Exports the provider report for the TINs listed on SharePoint.
///
/// Reads the TIN list, queries the report table for matching rows, and
/// uploads the result back to SharePoint as a date-stamped workbook.
pub fn run(config: &Config) -> Result<()> {
    let db_settings = config.database()?;
    let sp_settings = config.sharepoint()?;
    let settings = config.tin_export()?;

    let sharepoint = SharePointClient::connect(&sp_settings)?;
    let tin_frame = sharepoint.fetch_frame(&settings.tins_path, FileFormat::Csv, None)?;
    let tins: Vec<String> = tin_frame
        .column_text(TIN_COLUMN)?
        .into_iter()
        .filter(|tin| !tin.trim().is_empty())
        .collect();
    info!(tins = tins.len(), "provider TINs fetched");

    if tins.is_empty() {
        warn!("TIN list is empty, nothing to export");
        return Ok(());
    }

    let query = format!(
        "SELECT * FROM {} WHERE {} IN ({})",
        settings.report_table,
        db::quote_ident(TIN_COLUMN),
        db::in_list(&tins)
    );

    let mut client = connect_with_fallback(&db_settings)?;
    let report = client.query(&query)?;

    if report.is_empty() {
        info!("no data found for the provider TINs");
        return Ok(());
    }

    let stamp = Local::now().format("%Y%m%d");
    let file_name = format!("{stamp}_{}.xlsx", settings.report_name);
    let workbook = frame_to_xlsx_buffer(&report)?;
    sharepoint.upload_file(&settings.report_folder, &file_name, workbook)?;
    info!(rows = report.len(), file = %file_name, "report exported to SharePoint");
    Ok(())
}
