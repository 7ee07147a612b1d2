pub mod client;
pub mod conn;
pub mod ops;

pub use client::SqlClient;
pub use conn::{
    AuthStrategy, ConnectionProbe, DbSettings, TiberiusProbe, connect_with_fallback,
    resolve_connection_string,
};
pub use ops::{backup_table, clear_table, in_list, insert_frame, quote_ident};
pub use tiberius::ToSql;
