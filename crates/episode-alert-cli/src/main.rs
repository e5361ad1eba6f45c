//! Episode Alert - a command-line front end for the TV-show tracker.
//!
//! Manages the offline watchlist, runs live air-date countdowns, replays
//! changes queued while offline, and looks shows up in the metadata API.

mod commands;
mod host;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use episode_alert_core::Config;

const USAGE: &str = "\
Usage: episode-alert <command> [args]

Commands:
  init                      Write the current config to the config file
  watchlist [list]          Show the watchlist
  watchlist add <id>        Add a show to the watchlist
  watchlist remove <id>     Remove a show from the watchlist
  countdown <air-date>      Live countdown to an air date (Ctrl-C to stop)
  install                   Precache the app shell for offline use
  fetch <path> [--navigate] Route a request through the offline worker
  sync                      Replay watchlist changes queued while offline
  push <json>               Deliver a push payload and open its target
  install-help [user-agent] Manual install steps for a browser
  show <id>                 Show details and the next episode
  search <query>            Search shows by name
  popular                   List popular shows

Logging is controlled with RUST_LOG (default: warn).";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    let config = Config::load()?;
    info!(command = %command, origin = %config.origin, "Episode Alert starting");

    match command.as_str() {
        "init" => commands::init(&config),
        "watchlist" => commands::watchlist(&config, rest),
        "countdown" => commands::countdown(rest.first()).await,
        "install" => commands::install(&config).await,
        "fetch" => commands::fetch(&config, rest).await,
        "sync" => commands::sync(&config).await,
        "push" => commands::push(&config, rest.first()).await,
        "install-help" => {
            commands::install_help(rest.first());
            Ok(())
        }
        "show" => commands::show(&config, rest.first()).await,
        "search" => commands::search(&config, rest).await,
        "popular" => commands::popular(&config).await,
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}
