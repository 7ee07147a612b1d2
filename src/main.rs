use std::path::PathBuf;

use clap::{Parser, Subcommand};
use provetl::config::Config;
use provetl::jobs;
use provetl::{EtlError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    let config = Config::load(&cli.config)?;
    match cli.command {
        Command::ImportMonthly => jobs::import_monthly::run(&config),
        Command::ExportTins => jobs::export_tins::run(&config),
        Command::SyncSupervisors => jobs::sync_supervisors::run(&config),
        Command::ExportCsv => jobs::export_csv::run(&config),
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| EtlError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Move provider analytics data between SharePoint, SQL Server, and CSV files."
)]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, default_value = "provetl.ini")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import the newest monthly CSV drop into SQL Server.
    ImportMonthly,
    /// Export the TIN report from SQL Server to SharePoint.
    ExportTins,
    /// Mirror the supervisor roster from SharePoint into SQL Server.
    SyncSupervisors,
    /// Export a configured query to a dated CSV file.
    ExportCsv,
}
