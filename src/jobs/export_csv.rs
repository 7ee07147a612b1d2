use std::fs;

use chrono::Local;
use tracing::info;

use crate::config::Config;
use crate::db::connect_with_fallback;
use crate::error::Result;
use crate::io::write_csv_file;

/// Runs the configured query and writes the result to a dated CSV file in
/// the export directory.
pub fn run(config: &Config) -> Result<()> {
    let db_settings = config.database()?;
    let settings = config.csv_export()?;

    let mut client = connect_with_fallback(&db_settings)?;
    let frame = client.query(&settings.query)?;

    fs::create_dir_all(&settings.output_dir)?;
    let stamp = Local::now().format("%Y%m%d");
    let path = settings
        .output_dir
        .join(format!("{stamp}_{}.csv", settings.file_prefix));
    write_csv_file(&path, &frame)?;
    info!(rows = frame.len(), path = %path.display(), "CSV export complete");
    Ok(())
}
