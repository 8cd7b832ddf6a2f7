use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use snake_remake::game::GameConfig;
use snake_remake::modes::HumanMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_remake")]
#[command(version, about = "Grid snake with named save slots")]
struct Cli {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    cols: Option<usize>,

    /// Grid height
    #[arg(long)]
    rows: Option<usize>,

    /// Seed for reward and hazard placement
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding users.dat and datos.dat
    #[arg(long, default_value = ".")]
    save_dir: PathBuf,

    /// Write logs here; the terminal belongs to the game
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!("Failed to install tracing subscriber: {}", err))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_tracing(path)?;
    }

    // Create game configuration from file and CLI arguments
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config
        .validate()
        .map_err(|msg| anyhow!("Invalid configuration: {}", msg))?;

    tracing::info!(
        cols = config.cols,
        rows = config.rows,
        save_dir = %cli.save_dir.display(),
        "starting"
    );

    let mut human_mode = HumanMode::new(config, cli.save_dir);
    human_mode.run().await?;

    Ok(())
}
