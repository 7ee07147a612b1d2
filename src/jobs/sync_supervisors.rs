use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::{self, ToSql, connect_with_fallback, quote_ident};
use crate::error::Result;
use crate::sharepoint::{FileFormat, SharePointClient};

const ID_COLUMN: &str = "US Domain ID";
const ASSOCIATE_COLUMN: &str = "Associate Name";
const SUPERVISOR_COLUMN: &str = "Supervisor Name";

/// Mirrors the supervisor roster from SharePoint into the live table.
///
/// Refreshes the backup table first, then updates or inserts each roster row
/// and finally removes records whose IDs no longer appear in the roster.
pub fn run(config: &Config) -> Result<()> {
    let db_settings = config.database()?;
    let sp_settings = config.sharepoint()?;
    let settings = config.supervisor_sync()?;

    let sharepoint = SharePointClient::connect(&sp_settings)?;
    let roster = sharepoint.fetch_frame(&settings.list_path, FileFormat::Csv, None)?;

    let id_idx = roster.require_column(ID_COLUMN)?;
    let associate_idx = roster.require_column(ASSOCIATE_COLUMN)?;
    let supervisor_idx = roster.require_column(SUPERVISOR_COLUMN)?;

    let mut client = connect_with_fallback(&db_settings)?;

    db::clear_table(&mut client, &settings.backup_table)?;
    db::backup_table(&mut client, &settings.table, &settings.backup_table)?;

    let update_sql = format!(
        "UPDATE {} SET {} = @P2, {} = @P3 WHERE {} = @P1",
        settings.table,
        quote_ident(ASSOCIATE_COLUMN),
        quote_ident(SUPERVISOR_COLUMN),
        quote_ident(ID_COLUMN)
    );
    let insert_sql = format!(
        "INSERT INTO {} ({}, {}, {}) VALUES (@P1, @P2, @P3)",
        settings.table,
        quote_ident(ID_COLUMN),
        quote_ident(ASSOCIATE_COLUMN),
        quote_ident(SUPERVISOR_COLUMN)
    );

    let mut seen = HashSet::new();
    let mut roster_ids = Vec::new();
    let mut updated = 0u64;
    let mut inserted = 0u64;

    for row in &roster.rows {
        let id = row[id_idx].as_text();
        if id.trim().is_empty() {
            warn!("skipping roster row without an ID");
            continue;
        }
        let associate = row[associate_idx].as_text();
        let supervisor = row[supervisor_idx].as_text();
        if seen.insert(id.clone()) {
            roster_ids.push(id.clone());
        }

        let params: [&dyn ToSql; 3] = [&id, &associate, &supervisor];
        let rows = client.execute(&update_sql, &params)?;
        if rows > 0 {
            updated += rows;
            info!(id = %id, associate = %associate, supervisor = %supervisor, "updated record");
        } else {
            client.execute(&insert_sql, &params)?;
            inserted += 1;
            info!(id = %id, associate = %associate, "inserted new record");
        }
    }

    if roster_ids.is_empty() {
        warn!("roster is empty, skipping stale-record delete");
    } else {
        let delete_sql = format!(
            "DELETE FROM {} WHERE {} NOT IN ({})",
            settings.table,
            quote_ident(ID_COLUMN),
            db::in_list(&roster_ids)
        );
        let deleted = client.execute(&delete_sql, &[])?;
        info!(deleted, "removed records absent from the roster");
    }

    info!(updated, inserted, "supervisor sync complete");
    Ok(())
}
