//! playground - terminal sample player
//!
//! Run with: cargo run -- path/to/sample.wav

mod app;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use sonic_playground::{sample, EngineConfig, ParamSurface, Player};
use tracing::info;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "playground", version, about = "Play a sample through pitch, filter, drive and echo")]
struct Args {
    /// Audio file to load (wav, mp3, flac, aiff, ogg)
    path: PathBuf,

    /// Requested device buffer size in frames
    #[arg(long, default_value_t = 1024)]
    block_size: usize,

    /// Initial volume
    #[arg(long)]
    volume: Option<f32>,

    /// First echo tap in seconds
    #[arg(long)]
    tap1: Option<f32>,

    /// Second echo tap in seconds
    #[arg(long)]
    tap2: Option<f32>,

    /// Echo feedback gain
    #[arg(long)]
    feedback: Option<f32>,

    /// Write logs here (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            block_size: self.block_size,
            ..EngineConfig::default()
        };
        if let Some(tap1) = self.tap1 {
            config.echo.tap1_secs = tap1;
        }
        if let Some(tap2) = self.tap2 {
            config.echo.tap2_secs = tap2;
        }
        if let Some(feedback) = self.feedback {
            config.echo.feedback = feedback;
        }
        config.validated()
    }
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = args.engine_config();
    let store = sample::load_file(&args.path, config.sample_rate)
        .wrap_err_with(|| format!("failed to load {}", args.path.display()))?;
    info!(
        label = store.label(),
        frames = store.len(),
        seconds = store.duration_secs(),
        "sample ready"
    );

    let params = Arc::new(ParamSurface::new());
    if let Some(volume) = args.volume {
        params.set_volume(volume);
    }

    let mut player = Player::with_params(Arc::new(store), config, params);
    player.start().wrap_err("failed to start audio output")?;

    let mut terminal = ratatui::init();
    let res = App::new(player).run(&mut terminal);
    ratatui::restore();
    res
}
