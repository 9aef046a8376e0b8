//! Command-line interface components.

use crate::config::{CorrectionPolicy, SchemaKind, ValidatorConfig, YearRange};
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_FILE};
use crate::error::ValidatorError;
use crate::processor::BatchProcessor;
use crate::report::{ConsoleReporter, ReportSink};

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "precip-validate")]
#[command(about = "Validate and summarize daily precipitation station files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing station files (searched recursively)
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Validation log file to write
    #[arg(value_name = "LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Data line schema
    #[arg(long, value_enum)]
    pub schema: Option<SchemaKind>,

    /// Total fields per data line under the strict schema
    #[arg(long)]
    pub expected_columns: Option<usize>,

    /// First accepted year under the calendar schema
    #[arg(long)]
    pub year_min: Option<i32>,

    /// Last accepted year under the calendar schema
    #[arg(long)]
    pub year_max: Option<i32>,

    /// Propose padded corrections for short data lines
    #[arg(long, value_enum)]
    pub correction: Option<CorrectionPolicy>,

    /// Rewrite non-tab files in place with tab delimiters
    #[arg(long)]
    pub persist_normalized: bool,

    /// Number of files validated concurrently
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Configuration file to load: `--config`, else the user config file if present
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Merge the configuration file with command-line overrides
    pub fn build_config(&self) -> Result<ValidatorConfig> {
        let mut config = match self.config_path() {
            Some(path) => ValidatorConfig::from_toml_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => ValidatorConfig::default(),
        };

        if let Some(schema) = self.schema {
            config = config.with_schema(schema);
        }
        if let Some(expected_columns) = self.expected_columns {
            config = config.with_expected_columns(expected_columns);
        }
        if self.year_min.is_some() || self.year_max.is_some() {
            let range = YearRange::new(
                self.year_min.unwrap_or(config.year_range.min),
                self.year_max.unwrap_or(config.year_range.max),
            );
            config = config.with_year_range(range);
        }
        if let Some(correction) = self.correction {
            config = config.with_correction(correction);
        }
        if self.persist_normalized {
            config = config.with_persist_normalized(true);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }

        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("precip_validator={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Run one validation batch and print its summary
///
/// A log write failure still prints the summary of the completed batch
/// before the error is returned.
pub async fn run(args: &Args) -> Result<()> {
    let config = args.build_config()?;

    println!(
        "{}",
        "Starting station file validation".bright_green().bold()
    );

    let processor = BatchProcessor::new(&args.directory, &args.log_file)?
        .with_config(config)
        .with_progress(!args.no_progress && !args.quiet);

    let mut reporter = ConsoleReporter::stdout();
    match processor.process().await {
        Ok(outcome) => {
            reporter
                .emit_report(&outcome)
                .context("Failed to print summary")?;
            Ok(())
        }
        Err(ValidatorError::LogWrite {
            path,
            source,
            partial,
        }) => {
            reporter
                .emit_report(&partial)
                .context("Failed to print summary")?;
            Err(ValidatorError::LogWrite {
                path,
                source,
                partial,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}
