//! INI configuration loading.
//!
//! Jobs share one configuration file with a section per external system and a
//! section per job. Section accessors return typed settings structs and fail
//! with the section and key names when something required is absent.

use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use tracing::info;

use crate::db::DbSettings;
use crate::error::{EtlError, Result};
use crate::sharepoint::SharePointSettings;

/// Default number of rows per INSERT batch when the config does not set one.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Settings for the monthly CSV import job.
#[derive(Debug, Clone)]
pub struct MonthlyImportSettings {
    /// Directory scanned for report drops.
    pub folder_path: PathBuf,
    /// Glob pattern selecting candidate files, e.g. `*.csv`.
    pub file_pattern: String,
    /// Destination table.
    pub table_name: String,
    /// Rows per INSERT batch.
    pub batch_size: usize,
}

/// Settings for the TIN report export job.
#[derive(Debug, Clone)]
pub struct TinExportSettings {
    /// Server-relative URL of the TIN list file on SharePoint.
    pub tins_path: String,
    /// Table queried for the report rows.
    pub report_table: String,
    /// Server-relative URL of the SharePoint folder receiving the report.
    pub report_folder: String,
    /// Report name; the upload is prefixed with the run date.
    pub report_name: String,
}

/// Settings for the supervisor roster sync job.
#[derive(Debug, Clone)]
pub struct SupervisorSyncSettings {
    /// Server-relative URL of the roster file on SharePoint.
    pub list_path: String,
    /// Live table kept in sync with the roster.
    pub table: String,
    /// Backup table refreshed before the sync touches the live table.
    pub backup_table: String,
}

/// Settings for the CSV export job.
#[derive(Debug, Clone)]
pub struct CsvExportSettings {
    /// Query producing the export rows.
    pub query: String,
    /// Directory receiving the dated CSV file.
    pub output_dir: PathBuf,
    /// File name prefix; the output is `<date>_<prefix>.csv`.
    pub file_prefix: String,
}

/// Loaded configuration file.
pub struct Config {
    ini: Ini,
}

impl Config {
    /// Reads the configuration file from the provided path.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::MissingInput(path.to_path_buf()));
        }
        let ini = Ini::load_from_file(path)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(Self { ini })
    }

    /// Database credentials and connection strategy flags.
    pub fn database(&self) -> Result<DbSettings> {
        let section = self.section("DatabaseConfig")?;
        Ok(DbSettings {
            server: required(section, "DatabaseConfig", "server")?,
            database: required(section, "DatabaseConfig", "database")?,
            username: required(section, "DatabaseConfig", "username")?,
            password: required(section, "DatabaseConfig", "password")?,
            sso: optional(section, "sso").map(|value| parse_flag(&value)).unwrap_or(true),
            driver_conn: optional(section, "driver_conn").and_then(normalize_driver_conn),
        })
    }

    /// SharePoint site URL and credentials.
    pub fn sharepoint(&self) -> Result<SharePointSettings> {
        let section = self.section("SharePointConfig")?;
        Ok(SharePointSettings {
            site_url: required(section, "SharePointConfig", "site_url")?,
            username: required(section, "SharePointConfig", "username")?,
            password: required(section, "SharePointConfig", "password")?,
        })
    }

    /// Settings for the monthly CSV import job.
    pub fn monthly_import(&self) -> Result<MonthlyImportSettings> {
        let section = self.section("MonthlyImport")?;
        let batch_size = match optional(section, "batch_size") {
            Some(value) => {
                value
                    .parse()
                    .map_err(|_| EtlError::InvalidConfigValue {
                        section: "MonthlyImport".to_string(),
                        key: "batch_size".to_string(),
                        value,
                    })?
            }
            None => DEFAULT_BATCH_SIZE,
        };
        Ok(MonthlyImportSettings {
            folder_path: PathBuf::from(required(section, "MonthlyImport", "folder_path")?),
            file_pattern: required(section, "MonthlyImport", "file_pattern")?,
            table_name: required(section, "MonthlyImport", "table_name")?,
            batch_size,
        })
    }

    /// Settings for the TIN report export job.
    pub fn tin_export(&self) -> Result<TinExportSettings> {
        let section = self.section("TinExport")?;
        Ok(TinExportSettings {
            tins_path: required(section, "TinExport", "tins_path")?,
            report_table: required(section, "TinExport", "report_table")?,
            report_folder: required(section, "TinExport", "report_folder")?,
            report_name: required(section, "TinExport", "report_name")?,
        })
    }

    /// Settings for the supervisor roster sync job.
    pub fn supervisor_sync(&self) -> Result<SupervisorSyncSettings> {
        let section = self.section("SupervisorSync")?;
        Ok(SupervisorSyncSettings {
            list_path: required(section, "SupervisorSync", "list_path")?,
            table: required(section, "SupervisorSync", "table")?,
            backup_table: required(section, "SupervisorSync", "backup_table")?,
        })
    }

    /// Settings for the CSV export job.
    pub fn csv_export(&self) -> Result<CsvExportSettings> {
        let section = self.section("CsvExport")?;
        Ok(CsvExportSettings {
            query: required(section, "CsvExport", "query")?,
            output_dir: PathBuf::from(required(section, "CsvExport", "output_dir")?),
            file_prefix: required(section, "CsvExport", "file_prefix")?,
        })
    }

    fn section(&self, name: &str) -> Result<&Properties> {
        self.ini
            .section(Some(name))
            .ok_or_else(|| EtlError::MissingConfigSection(name.to_string()))
    }
}

fn required(section: &Properties, section_name: &str, key: &str) -> Result<String> {
    section
        .get(key)
        .map(str::to_string)
        .ok_or_else(|| EtlError::MissingConfigKey {
            section: section_name.to_string(),
            key: key.to_string(),
        })
}

fn optional(section: &Properties, key: &str) -> Option<String> {
    section.get(key).map(str::to_string)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1"
    )
}

// The legacy config shipped `driver_conn = no` to mean "not configured".
fn normalize_driver_conn(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("no") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
[DatabaseConfig]
server = sqlhost
database = analytics
username = svc_provider
password = secret
sso = yes
driver_conn = no

[SharePointConfig]
site_url = https://example.sharepoint.com/sites/ProviderAnalytics
username = svc@example.com
password = secret

[MonthlyImport]
folder_path = /data/monthly
file_pattern = *.csv
table_name = dbo.oon_monthly
batch_size = 250
";

    fn load_sample() -> Config {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("provetl.ini");
        fs::write(&path, SAMPLE).expect("config written");
        Config::load(&path).expect("config loaded")
    }

    #[test]
    fn loads_expected_keys() {
        let config = load_sample();
        let db = config.database().expect("database section");
        assert_eq!(db.server, "sqlhost");
        assert_eq!(db.database, "analytics");
        assert!(db.sso);
        assert_eq!(db.driver_conn, None);

        let sharepoint = config.sharepoint().expect("sharepoint section");
        assert_eq!(
            sharepoint.site_url,
            "https://example.sharepoint.com/sites/ProviderAnalytics"
        );

        let monthly = config.monthly_import().expect("monthly section");
        assert_eq!(monthly.file_pattern, "*.csv");
        assert_eq!(monthly.batch_size, 250);
    }

    #[test]
    fn missing_section_is_reported_by_name() {
        let config = load_sample();
        match config.tin_export() {
            Err(EtlError::MissingConfigSection(name)) => assert_eq!(name, "TinExport"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_key_is_reported_with_section() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("partial.ini");
        fs::write(&path, "[DatabaseConfig]\nserver = sqlhost\n").expect("config written");
        let config = Config::load(&path).expect("config loaded");
        match config.database() {
            Err(EtlError::MissingConfigKey { section, key }) => {
                assert_eq!(section, "DatabaseConfig");
                assert_eq!(key, "database");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn batch_size_defaults_when_absent() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("defaults.ini");
        fs::write(
            &path,
            "[MonthlyImport]\nfolder_path = /data\nfile_pattern = *.csv\ntable_name = t\n",
        )
        .expect("config written");
        let config = Config::load(&path).expect("config loaded");
        let monthly = config.monthly_import().expect("monthly section");
        assert_eq!(monthly.batch_size, DEFAULT_BATCH_SIZE);
    }
}
