//! hand_overlay — interactive entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use hand_overlay::app;
use hand_overlay::config::{OverlayConfig, SourceKind, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "hand_overlay", about = "Live hand-landmark overlay and gesture viewer")]
struct Cli {
    /// Config file (default: ./hand_overlay.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay detector results from a JSON-lines file
    #[arg(long, conflicts_with = "sim")]
    replay: Option<PathBuf>,

    /// Use the keyboard-driven simulator
    #[arg(long)]
    sim: bool,

    /// Ignore any config file and start with defaults
    #[arg(long)]
    quick: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("hand_overlay {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hand_overlay=info".into()),
        )
        .init();

    let mut cfg = if cli.quick {
        info!("quick start: default configuration");
        OverlayConfig::default()
    } else if let Some(path) = &cli.config {
        OverlayConfig::load(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        OverlayConfig::load_or_default(DEFAULT_CONFIG_PATH)
    };

    if let Some(path) = cli.replay {
        cfg.source.kind = SourceKind::Replay;
        cfg.source.replay_path = Some(path);
    } else if cli.sim {
        cfg.source.kind = SourceKind::Sim;
    }

    info!(
        window = %format!("{}x{}", cfg.window.width, cfg.window.height),
        source = ?cfg.source.kind,
        "hand_overlay {} starting",
        env!("CARGO_PKG_VERSION"),
    );

    app::run(cfg).context("overlay window failed")
}
