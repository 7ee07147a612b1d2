use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error type covering the different failure cases that can occur when a job
/// loads configuration, talks to SharePoint or SQL Server, or moves files.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the configuration file cannot be read or parsed.
    #[error("config error: {0}")]
    Config(#[from] ini::Error),

    /// Raised when a required configuration key is absent.
    #[error("missing config key '{key}' in section [{section}]")]
    MissingConfigKey { section: String, key: String },

    /// Raised when a required configuration section is absent.
    #[error("missing config section [{0}]")]
    MissingConfigSection(String),

    /// Raised when a configuration value fails to parse.
    #[error("invalid value '{value}' for config key '{key}' in section [{section}]")]
    InvalidConfigValue {
        section: String,
        key: String,
        value: String,
    },

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook or data file does not have the expected shape.
    #[error("invalid table data: {0}")]
    InvalidTable(String),

    /// Raised when a fetched table lacks a column a job depends on.
    #[error("missing column '{0}' in fetched data")]
    MissingColumn(String),

    /// Errors bubbled up from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when SharePoint rejects the supplied credentials.
    #[error("SharePoint authentication failed: {0}")]
    SharePointAuth(String),

    /// Raised when a SharePoint REST call returns a non-success status.
    #[error("SharePoint API error (status {status}): {message}")]
    SharePointApi { status: u16, message: String },

    /// Errors bubbled up from the SQL Server driver.
    #[error("SQL error: {0}")]
    Sql(#[from] tiberius::error::Error),

    /// Raised when every configured connection strategy has been exhausted.
    #[error("all database connection strategies failed, last error: {last}")]
    AllConnectionsFailed { last: String },

    /// Raised when a glob pattern cannot be compiled.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Raised when no file in a directory matches the configured pattern.
    #[error("no files matching '{0}'")]
    NoFilesMatched(String),

    /// Raised when a job receives an unsupported remote file format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
