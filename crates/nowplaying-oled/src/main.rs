use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use nowplaying_proto::config::Config;
use nowplaying_proto::platform;
use nowplaying_proto::script::Script;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nowplaying_oled::clock::{Clock, TokioClock};
use nowplaying_oled::core::Device;
use nowplaying_oled::preview::{self, TerminalSink};
use nowplaying_oled::sink::MemorySink;
use nowplaying_oled::source::ScriptedSource;

const DEMO_SCRIPT: &str = include_str!("../../../demos/scenario.toml");
const DEFAULT_FILTER: &str = "info,nowplaying_oled=debug";

#[derive(Debug, Parser)]
#[command(name = "nowplaying-oled", version, about = "Now-playing display for a 128x64 OLED")]
struct Args {
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Now-playing script to replay (TOML, or JSON by extension)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Render into memory and print the last frame instead of the terminal preview
    #[arg(long)]
    headless: bool,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    run_for: Option<u64>,
}

fn init_logging(headless: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if headless {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
        return Ok(());
    }

    // The preview owns the terminal, so logs go to a file.
    let log_path = platform::log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
    eprintln!("nowplaying-oled log: {}", log_path.display());
    Ok(())
}

fn load_script(args: &Args, config: &Config) -> anyhow::Result<Script> {
    match args.script.as_ref().or(config.source.script.as_ref()) {
        Some(path) => Script::load(path).with_context(|| format!("loading script {:?}", path)),
        None => Ok(Script::from_toml_str(DEMO_SCRIPT)?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.headless)?;
    tracing::info!("nowplaying-oled starting…");

    let config = match &args.config {
        Some(path) => Config::load_from(path).with_context(|| format!("loading config {:?}", path))?,
        None => Config::load()?,
    };
    let script = load_script(&args, &config)?;

    let clock: Arc<dyn Clock> = Arc::new(TokioClock::new());
    let source = ScriptedSource::new(script, clock.clone());
    let cancel = CancellationToken::new();

    // ── Shutdown triggers ───────────────────────────────────────────────────
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            ctrl_c.cancel();
        }
    });
    if let Some(secs) = args.run_for {
        let deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            deadline.cancel();
        });
    }

    // ── Run ─────────────────────────────────────────────────────────────────
    if args.headless {
        let sink = MemorySink::new();
        Device::new(config, source, sink.clone(), clock)
            .run(cancel)
            .await?;
        if let Some(frame) = sink.last_frame() {
            print!("{}", frame.to_ascii());
        }
        tracing::info!("{} frames presented", sink.presented());
    } else {
        preview::spawn_quit_listener(cancel.clone());
        Device::new(config, source, TerminalSink::new(), clock)
            .run(cancel)
            .await?;
    }

    Ok(())
}
