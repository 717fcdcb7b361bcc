//! Slice plotter CLI.
//!
//! Reads a JSON dataset document and a YAML plot document, then writes one
//! PNG per write using a pool of cooperating workers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use slice_plotter::{resolve_config, run_workers, Overrides};
use slices::{DatasetDocument, PlotSpec, PlotterConfig};

#[derive(Parser, Debug)]
#[command(name = "slice-plotter")]
#[command(about = "Colormesh plots of 2D simulation slices")]
struct Args {
    /// Plot document (YAML) describing the grid and panels
    #[arg(short, long, env = "SLICES_PLOT_CONFIG")]
    config: PathBuf,

    /// Dataset document (JSON)
    #[arg(short, long, env = "SLICES_DATASETS")]
    datasets: PathBuf,

    /// Number of cooperating workers
    #[arg(short, long, env = "SLICES_WORKERS", default_value_t = 1)]
    workers: usize,

    /// Output directory (overrides SLICES_OUT_DIR)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// File name prefix (overrides SLICES_FIG_NAME)
    #[arg(long)]
    fig_name: Option<String>,

    /// Number of the first figure (overrides SLICES_START_FIG)
    #[arg(long)]
    start_fig: Option<i64>,

    /// Resolution of saved figures (overrides SLICES_DPI)
    #[arg(long)]
    dpi: Option<u32>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!("Starting slice plotter");

    let overrides = Overrides {
        out_dir: args.out_dir,
        fig_name: args.fig_name,
        start_fig: args.start_fig,
        dpi: args.dpi,
    };
    let config = resolve_config(PlotterConfig::from_env(), overrides)?;
    info!(
        out_dir = %config.out_dir.display(),
        fig_name = %config.fig_name,
        dpi = config.dpi,
        workers = args.workers,
        "Loaded configuration"
    );

    let spec = PlotSpec::from_yaml_file(&args.config)
        .with_context(|| format!("loading plot document {}", args.config.display()))?;
    let document = DatasetDocument::from_json_file(&args.datasets)
        .with_context(|| format!("loading dataset document {}", args.datasets.display()))?;

    run_workers(&spec, &config, &document, args.workers)?;
    Ok(())
}
