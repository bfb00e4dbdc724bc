//! # Folio CLI
//!
//! Usage:
//!   folio --data data.json --user 0x... --year 2025 --month 2 -o report.pdf
//!   folio --data data.json --config folio.json --user 0x... --year 2025 --month 2
//!   folio --example-config > folio.json

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use folio::report::data::JsonDataSource;
use folio::report::store::{ContentStore, DirStore, EmptyStore};
use folio::{build_monthly, FolioError, MonthlyRequest, ReportConfig};

/// Folio - monthly account reports as PDF
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON data fixture (users, history, clubs, posts)
    #[arg(long, value_name = "FILE", required_unless_present = "example_config")]
    data: Option<PathBuf>,

    /// Report configuration (see --example-config)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Account address the report is for
    #[arg(long, required_unless_present = "example_config")]
    user: Option<String>,

    #[arg(long, default_value_t = 2025)]
    year: i32,

    /// Month, 1-12
    #[arg(long, default_value_t = 1)]
    month: u32,

    /// Overrides the locale from the config
    #[arg(long)]
    locale: Option<String>,

    /// Output file
    #[arg(short, long, default_value = "report.pdf")]
    output: PathBuf,

    /// Print a sample configuration and exit
    #[arg(long)]
    example_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), FolioError> {
    let cli = Cli::parse();

    if cli.example_config {
        println!("{}", ReportConfig::example_json());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    let data_path = cli
        .data
        .ok_or_else(|| FolioError::Data("--data is required".to_string()))?;
    let address = cli
        .user
        .ok_or_else(|| FolioError::Data("--user is required".to_string()))?;
    let data = JsonDataSource::load(&data_path)?;

    let store: Box<dyn ContentStore> = match &config.content_root {
        Some(root) => Box::new(DirStore::new(root)),
        None => Box::new(EmptyStore),
    };

    let request = MonthlyRequest {
        address,
        year: cli.year,
        month: cli.month,
        generated_at: None,
    };
    let pdf = build_monthly(&request, &data, store.as_ref(), &config)?;
    fs::write(&cli.output, &pdf)?;
    eprintln!("✓ Written {} bytes to {}", pdf.len(), cli.output.display());
    Ok(())
}
