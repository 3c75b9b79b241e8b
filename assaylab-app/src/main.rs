use anyhow::{Context, Result};
use assaylab_core::{assay, grouping::ChartMode, hplc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

mod config;
mod plotting;
mod workflow;

/// Spectrophotometric and HPLC assay calculations for plant biochemistry.
#[derive(Parser, Debug)]
#[command(name = "assaylab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level, used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info", env = "ASSAYLAB_LOG_LEVEL")]
    log_level: LogLevel,

    /// YAML file with calibration, HPLC standards and export settings
    #[arg(long, global = true, env = "ASSAYLAB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a spectrophotometric assay from a CSV upload
    Spectro {
        /// Assay key, e.g. chlorophyll_a_b or total_phenol
        #[arg(long)]
        assay: String,
        /// CSV file with treatment_name, sample_name and wavelength columns
        #[arg(long)]
        input: PathBuf,
        /// Output directory (defaults to a timestamped run directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Chart one bar per sample instead of per treatment
        #[arg(long)]
        individual: bool,
    },

    /// Match and quantify HPLC chromatogram extractions
    Hplc {
        /// Directory of extraction outputs (*.json)
        #[arg(long)]
        input: PathBuf,
        /// Output directory (defaults to a timestamped run directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Overrides `hplc.analysis_type` from the config
        #[arg(long)]
        analysis: Option<String>,
    },

    /// Print the CSV upload template for an assay
    Template {
        #[arg(long)]
        assay: String,
    },

    /// List the supported assays
    Assays,
}

fn init_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Creates the output directory and keeps a copy of the config next to the
/// reports.
fn prepare_output_dir(
    out: Option<PathBuf>,
    prefix: &str,
    config: Option<&Path>,
) -> Result<PathBuf> {
    let output_dir = out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "./runs/{}_{}",
            prefix,
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        ))
    });
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    if let Some(config_path) = config {
        fs::copy(config_path, output_dir.join("config.yaml"))
            .with_context(|| format!("Failed to copy {:?} into the run directory", config_path))?;
    }
    Ok(output_dir)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Spectro {
            ref assay,
            ref input,
            ref out,
            individual,
        } => {
            let kind = assay::parse_kind(assay)?;
            let config = config::LabConfig::load_or_default(config_path)?;
            let output_dir = prepare_output_dir(out.clone(), kind.key(), config_path)?;
            let mode = if individual {
                ChartMode::Individual
            } else {
                ChartMode::Grouped
            };
            workflow::run_spectro(&config, kind, input, &output_dir, mode)?;
            info!(dir = %output_dir.display(), "spectrophotometric run complete");
            println!("\nResults are in '{}'", output_dir.display());
        }
        Command::Hplc {
            ref input,
            ref out,
            ref analysis,
        } => {
            let config = config::LabConfig::load_or_default(config_path)?;
            let analysis_type = match analysis {
                Some(key) => hplc::parse_hplc_kind(key)?,
                None => config.hplc.analysis_type,
            };
            let output_dir = prepare_output_dir(
                out.clone(),
                &format!("hplc_{}", analysis_type.key()),
                config_path,
            )?;
            workflow::run_hplc(&config, analysis_type, input, &output_dir)?;
            info!(dir = %output_dir.display(), "hplc run complete");
            println!("\nResults are in '{}'", output_dir.display());
        }
        Command::Template { ref assay } => {
            workflow::print_template(assay::parse_kind(assay)?);
        }
        Command::Assays => workflow::print_assays(),
    }

    Ok(())
}
