//! Bulk table operations and SQL text helpers.
//!
//! Statements are generated as text. Table names come from the configuration
//! file and are interpolated as written there; column names and values pass
//! through the quoting helpers.

use tracing::info;

use crate::db::client::SqlClient;
use crate::error::Result;
use crate::model::{Cell, Frame};

/// SQL Server rejects VALUES clauses above this many rows.
const MAX_ROWS_PER_INSERT: usize = 1000;

/// Quotes a column name with brackets, doubling any closing bracket.
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Renders text values as a quoted, comma-separated IN list.
pub fn in_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("'{}'", value.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Copies every row of `source` into `backup`, returning the row count.
pub fn backup_table(client: &mut SqlClient, source: &str, backup: &str) -> Result<u64> {
    let sql = format!("INSERT INTO {backup} SELECT * FROM {source}");
    let rows = client.execute(&sql, &[])?;
    info!(source, backup, rows, "table backup completed");
    Ok(rows)
}

/// Deletes every row of `table`, logging how many were removed.
pub fn clear_table(client: &mut SqlClient, table: &str) -> Result<u64> {
    let sql = format!("DELETE FROM {table}");
    let rows = client.execute(&sql, &[])?;
    info!(table, rows, "cleared table");
    Ok(rows)
}

/// Inserts a frame into `table` in batches, logging progress per batch.
///
/// The configured batch size is clamped to the driver-independent VALUES
/// limit. Returns the total number of rows inserted.
pub fn insert_frame(
    client: &mut SqlClient,
    table: &str,
    frame: &Frame,
    batch_size: usize,
) -> Result<u64> {
    if frame.is_empty() {
        info!(table, "no rows to insert");
        return Ok(0);
    }

    let batch_size = batch_size.clamp(1, MAX_ROWS_PER_INSERT);
    let mut inserted = 0u64;
    for batch in frame.rows.chunks(batch_size) {
        let sql = insert_statement(table, &frame.columns, batch);
        client.execute(&sql, &[])?;
        inserted += batch.len() as u64;
        info!(
            batch = batch.len(),
            inserted,
            total = frame.len(),
            table,
            "inserted batch"
        );
    }
    Ok(inserted)
}

fn insert_statement(table: &str, columns: &[String], rows: &[Vec<Cell>]) -> String {
    let column_list = columns
        .iter()
        .map(|name| quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ");
    let values = rows
        .iter()
        .map(|row| {
            let cells = row
                .iter()
                .map(Cell::to_sql_literal)
                .collect::<Vec<_>>()
                .join(", ");
            format!("({cells})")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table} ({column_list}) VALUES {values}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_escapes_brackets() {
        assert_eq!(quote_ident("US Domain ID"), "[US Domain ID]");
        assert_eq!(quote_ident("weird]name"), "[weird]]name]");
    }

    #[test]
    fn in_list_quotes_and_escapes() {
        let values = vec!["123".to_string(), "O'Hara".to_string()];
        assert_eq!(in_list(&values), "'123', 'O''Hara'");
    }

    #[test]
    fn insert_statement_renders_all_rows() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec![Cell::Int(1), Cell::Text("Alice".to_string())],
            vec![Cell::Int(2), Cell::Null],
        ];
        let sql = insert_statement("dbo.people", &columns, &rows);
        assert_eq!(
            sql,
            "INSERT INTO dbo.people ([id], [name]) VALUES (1, N'Alice'), (2, NULL)"
        );
    }
}
