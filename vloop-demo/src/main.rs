//! vloop-demo - Looping video player demo
//!
//! Wires the looping player to a simulated media engine: clips are named on
//! the command line (optionally with a duration), the "video" is a pair of
//! logging surfaces, and playback events stream to stdout until Ctrl+C.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tokio::signal;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vloop_player::{ClipSource, FillMode, LoopPlayer, PlayerConfig};

mod sim;

use sim::{ClipCatalog, SimSurface};

/// Command-line arguments for vloop-demo
#[derive(Parser, Debug)]
#[command(name = "vloop-demo")]
#[command(about = "Looping video playback demo with a simulated media engine")]
#[command(version)]
struct Args {
    /// Clips to loop, as NAME or NAME@SECONDS (e.g. flames.mov@12.5)
    clips: Vec<String>,

    /// Cross-fade duration in seconds
    #[arg(short, long, env = "VLOOP_FADE_SECONDS")]
    fade: Option<f64>,

    /// Scaling mode: fill, fit, or stretch
    #[arg(long, env = "VLOOP_FILL_MODE")]
    fill_mode: Option<FillMode>,

    /// Simulated buffering latency in milliseconds
    #[arg(long, default_value = "300")]
    load_latency_ms: u64,

    /// Duration assumed for clips given without @SECONDS
    #[arg(long, default_value = "10.0")]
    default_clip_seconds: f64,

    /// Print playback events as JSON lines
    #[arg(long)]
    json: bool,

    /// Optional TOML config file
    #[arg(short, long, env = "VLOOP_CONFIG")]
    config: Option<PathBuf>,
}

/// On-disk demo configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemoFile {
    player: PlayerConfig,
    clips: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vloop_player=debug,vloop_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<DemoFile>(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => DemoFile::default(),
    };

    let mut config = file.player;
    if let Some(fade) = args.fade {
        config.fade_seconds = fade;
    }
    if let Some(mode) = args.fill_mode {
        config.fill_mode = mode;
    }

    let clip_specs = if args.clips.is_empty() {
        file.clips
    } else {
        args.clips.clone()
    };
    if clip_specs.is_empty() {
        bail!("no clips given on the command line or in the config file");
    }

    let mut sources = Vec::new();
    let mut durations = HashMap::new();
    for spec in &clip_specs {
        let (source, duration) = parse_clip_spec(spec, args.default_clip_seconds)?;
        durations.insert(source.as_str().to_string(), duration);
        sources.push(source);
    }

    info!(
        clips = sources.len(),
        fade_secs = config.fade_seconds,
        "starting looping playback demo"
    );

    let catalog = ClipCatalog::new(durations, Duration::from_millis(args.load_latency_ms));
    let surface_a = SimSurface::new("A");
    let surface_b = SimSurface::new("B");
    let player = LoopPlayer::new(
        catalog.player("A"),
        surface_a,
        catalog.player("B"),
        surface_b,
        config,
    )
    .context("Failed to start loop scheduler")?;

    // Stream playback events until the bus closes
    let mut events = BroadcastStream::new(player.subscribe());
    let json = args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(event) if json => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!("failed to serialize event: {err}"),
                },
                Ok(event) => info!(?event, "playback event"),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    warn!(missed, "event stream lagged");
                }
            }
        }
    });

    player.configure(sources)?;
    player.begin_playback()?;

    shutdown_signal().await;
    info!("shutting down");
    player.shutdown().await?;
    let _ = printer.await;

    Ok(())
}

/// Parse a NAME or NAME@SECONDS clip spec
fn parse_clip_spec(spec: &str, default_seconds: f64) -> Result<(ClipSource, Duration)> {
    match spec.rsplit_once('@') {
        Some((name, seconds)) if !name.is_empty() => {
            let seconds: f64 = seconds
                .parse()
                .with_context(|| format!("invalid duration in clip spec '{spec}'"))?;
            if !seconds.is_finite() || seconds <= 0.0 {
                bail!("clip duration must be positive in '{spec}'");
            }
            Ok((ClipSource::new(name), Duration::from_secs_f64(seconds)))
        }
        _ => Ok((
            ClipSource::new(spec),
            Duration::from_secs_f64(default_seconds),
        )),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
