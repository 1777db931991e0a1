use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use sheetsift_core::{Sifter, SifterConfig};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetsift")]
#[command(about = "Filter Excel rows by a column value and re-export them with their images", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the Excel file to filter (first worksheet is used)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Header name of the column to filter on
    #[arg(long, value_name = "NAME")]
    column: String,

    /// Text the filter column must contain (empty keeps every row)
    #[arg(long, value_name = "VALUE", default_value = "")]
    filter: String,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write the filtered workbook to this path
    #[arg(short, long, value_name = "XLSX")]
    output: Option<PathBuf>,

    /// Write the JSON projection to this path
    #[arg(short, long, value_name = "JSON")]
    json: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary
    Human,
    /// The response payload as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        SifterConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetsift.toml");
        if default_config_path.exists() {
            SifterConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            SifterConfig::default()
        }
    };

    tracing::debug!(
        "Markers: all={:?}, except={:?}",
        config.markers.all,
        config.markers.except
    );
    let sifter = Sifter::try_with_config(config).context("Invalid configuration")?;

    let upload = fs::read(&cli.file)
        .with_context(|| format!("Failed to read file: {}", cli.file.display()))?;

    let output = sifter
        .run(&upload, &cli.column, &cli.filter)
        .with_context(|| format!("Failed to filter file: {}", cli.file.display()))?;

    if let Some(path) = &cli.output {
        let bytes = output
            .result
            .workbook_bytes()
            .context("Failed to decode workbook payload")?;
        fs::write(path, bytes)
            .with_context(|| format!("Failed to write workbook to {}", path.display()))?;
    }

    if let Some(path) = &cli.json {
        fs::write(path, &output.result.json)
            .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    }

    match cli.format {
        OutputFormat::Human => {
            formatter::print_human(&cli.file, &cli.column, &cli.filter, &output);
        }
        OutputFormat::Json => {
            formatter::print_json(&output.result)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
