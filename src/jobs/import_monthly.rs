use tracing::info;

use crate::config::Config;
use crate::db::{self, connect_with_fallback};
use crate::error::Result;
use crate::io::{latest_file, read_csv_file};

/// Imports the newest monthly report drop into the configured table.
///
/// The drop folder is scanned for the most recent file matching the
/// configured pattern; its contents are read as all-text CSV, profiled for
/// missing values, and batch-inserted.
pub fn run(config: &Config) -> Result<()> {
    let db_settings = config.database()?;
    let settings = config.monthly_import()?;

    let mut client = connect_with_fallback(&db_settings)?;
    info!(database = %db_settings.database, "connected to database");

    let latest = latest_file(&settings.folder_path, &settings.file_pattern)?;
    let frame = read_csv_file(&latest)?;

    for (column, missing) in frame.missing_counts() {
        info!(column = %column, missing, "column profile");
    }

    let inserted = db::insert_frame(
        &mut client,
        &settings.table_name,
        &frame,
        settings.batch_size,
    )?;
    info!(
        file = %latest.display(),
        inserted,
        table = %settings.table_name,
        "monthly import complete"
    );
    Ok(())
}
