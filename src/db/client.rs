//! Synchronous SQL Server client.
//!
//! The driver is async; the client owns a current-thread runtime and blocks on
//! each call so jobs stay single-threaded, top-to-bottom. One client maps to
//! one live connection.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tiberius::{Client, ColumnData, Config, FromSql, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::error::{EtlError, Result};
use crate::model::{Cell, Frame};

/// Blocking facade over one SQL Server connection.
pub struct SqlClient {
    runtime: tokio::runtime::Runtime,
    client: Client<Compat<TcpStream>>,
}

impl SqlClient {
    /// Opens a connection from an ADO-style connection string.
    pub fn connect(conn_str: &str) -> Result<Self> {
        let config = Config::from_ado_string(conn_str)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = runtime.block_on(async {
            let tcp = TcpStream::connect(config.get_addr()).await?;
            tcp.set_nodelay(true)?;
            let client = Client::connect(config, tcp.compat_write()).await?;
            Ok::<_, EtlError>(client)
        })?;
        debug!("database connection established");
        Ok(Self { runtime, client })
    }

    /// Runs a query and collects the first result set into a frame.
    pub fn query(&mut self, sql: &str) -> Result<Frame> {
        debug!(sql, "executing query");
        let runtime = &self.runtime;
        let client = &mut self.client;
        let (columns, rows) = runtime.block_on(async move {
            let mut stream = client.query(sql, &[]).await?;
            let columns: Vec<String> = stream
                .columns()
                .await?
                .map(|columns| columns.iter().map(|c| c.name().to_string()).collect())
                .unwrap_or_default();
            let rows = stream.into_first_result().await?;
            Ok::<_, EtlError>((columns, rows))
        })?;

        let mut frame = Frame::new(columns);
        for row in rows {
            let cells = row
                .into_iter()
                .map(cell_from_column)
                .collect::<Result<Vec<_>>>()?;
            frame.push_row(cells)?;
        }
        Ok(frame)
    }

    /// Runs a statement, returning the number of affected rows. Parameters
    /// bind to `@P1`, `@P2`, ... placeholders.
    pub fn execute(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<u64> {
        debug!(sql, "executing statement");
        let runtime = &self.runtime;
        let client = &mut self.client;
        let result = runtime.block_on(client.execute(sql, params))?;
        Ok(result.total())
    }
}

fn cell_from_column(data: ColumnData<'static>) -> Result<Cell> {
    let cell = match data {
        ColumnData::Bit(value) => value.map(Cell::Bool).unwrap_or(Cell::Null),
        ColumnData::U8(value) => value.map(|v| Cell::Int(i64::from(v))).unwrap_or(Cell::Null),
        ColumnData::I16(value) => value.map(|v| Cell::Int(i64::from(v))).unwrap_or(Cell::Null),
        ColumnData::I32(value) => value.map(|v| Cell::Int(i64::from(v))).unwrap_or(Cell::Null),
        ColumnData::I64(value) => value.map(Cell::Int).unwrap_or(Cell::Null),
        ColumnData::F32(value) => value
            .map(|v| Cell::Float(f64::from(v)))
            .unwrap_or(Cell::Null),
        ColumnData::F64(value) => value.map(Cell::Float).unwrap_or(Cell::Null),
        ColumnData::Numeric(value) => value
            .map(|v| Cell::Float(f64::from(v)))
            .unwrap_or(Cell::Null),
        ColumnData::String(value) => value
            .map(|v| Cell::Text(v.into_owned()))
            .unwrap_or(Cell::Null),
        ColumnData::Guid(value) => value
            .map(|v| Cell::Text(v.to_string()))
            .unwrap_or(Cell::Null),
        ColumnData::Binary(value) => value
            .map(|bytes| Cell::Text(to_hex(&bytes)))
            .unwrap_or(Cell::Null),
        value @ ColumnData::Date(_) => NaiveDate::from_sql(&value)?
            .map(Cell::Date)
            .unwrap_or(Cell::Null),
        value @ (ColumnData::SmallDateTime(_)
        | ColumnData::DateTime(_)
        | ColumnData::DateTime2(_)) => NaiveDateTime::from_sql(&value)?
            .map(Cell::DateTime)
            .unwrap_or(Cell::Null),
        value @ ColumnData::DateTimeOffset(_) => DateTime::<Utc>::from_sql(&value)?
            .map(|v| Cell::DateTime(v.naive_utc()))
            .unwrap_or(Cell::Null),
        // xml and time-only columns do not appear in these reports
        _ => Cell::Null,
    };
    Ok(cell)
}

fn to_hex(bytes: &[u8]) -> String {
    let mut rendered = String::with_capacity(2 + bytes.len() * 2);
    rendered.push_str("0x");
    for byte in bytes {
        let _ = write!(rendered, "{byte:02x}");
    }
    rendered
}
