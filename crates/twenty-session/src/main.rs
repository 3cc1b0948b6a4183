use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twenty_session::config::Config;
use twenty_session::input::InputEvent;
use twenty_session::registry::SessionRegistry;
use twenty_session::{pipeline, terminal};

// The terminal has one player and one board message.
const LOCAL_PLAYER: u64 = 1;
const LOCAL_BOARD: u64 = 1;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Play the tile-merge game in the terminal (type u/d/l/r or q, then Enter; the same direction twice in a row is ignored)"
)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,
    /// Seed for tile spawns (overrides the configuration file)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
    /// Tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.session.seed = Some(seed);
    }
    info!(config = ?config.session, "starting terminal game");

    let registry = SessionRegistry::new();
    let (input_tx, input_rx) = mpsc::channel(32);
    let (host_tx, mut host_rx) = mpsc::channel(32);
    let mut handle = pipeline::start_session(
        &registry,
        LOCAL_PLAYER,
        LOCAL_BOARD,
        &config.session,
        input_rx,
        host_tx,
    )
    .await?;

    let printer = tokio::spawn(async move {
        while let Some(cmd) = host_rx.recv().await {
            if let Some(text) = terminal::display_command(&cmd) {
                println!("{text}");
            }
        }
    });

    // Blocking stdin reader on its own thread; it is left behind when the game ends.
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match terminal::symbol_for_line(&line) {
                Some(symbol) => {
                    let event = InputEvent::new(LOCAL_PLAYER, LOCAL_BOARD, symbol);
                    if input_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                None => warn!(input = %line.trim(), "unrecognized input"),
            }
        }
    });

    let summary = tokio::select! {
        res = &mut handle => res.context("session task failed")?,
        _ = signal::ctrl_c() => {
            registry.shutdown().await;
            handle.await.context("session task failed")?
        }
    };
    printer.await.context("printer task failed")?;

    println!(
        "Game over ({:?}): {} moves, score {}, highest tile {}",
        summary.reason, summary.moves, summary.score, summary.highest_tile
    );
    Ok(())
}
