use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use episode_alert_core::countdown::{calculate_time_left, ticker::TICK_PERIOD, Countdown};
use episode_alert_core::db::{OfflineDb, DB_FILE};
use episode_alert_core::install::InstallInstructions;
use episode_alert_core::utils::{format_air_date, truncate_string};
use episode_alert_core::worker::{
    DiskCacheStorage, FetchOutcome, HttpNetwork, OfflineWorker, Request, WorkerConfig, WorkerHost,
    SYNC_TAG,
};
use episode_alert_core::{Config, ShowId, TmdbClient, TvShow, WatchlistAction, WatchlistStore};

use crate::host::TerminalHost;

/// Width of the show-name column in listings.
const NAME_WIDTH: usize = 40;

fn open_db(config: &Config) -> Result<OfflineDb> {
    let path = config.data_dir()?.join(DB_FILE);
    OfflineDb::open(&path)
        .with_context(|| format!("Failed to open offline database {}", path.display()))
}

fn parse_show_id(arg: Option<&String>) -> Result<ShowId> {
    let Some(arg) = arg else {
        bail!("Missing show id");
    };
    arg.parse()
        .with_context(|| format!("Invalid show id: {}", arg))
}

pub fn init(config: &Config) -> Result<()> {
    config.save()?;
    println!("Wrote {}", Config::config_path()?.display());
    Ok(())
}

// ============================================================================
// Watchlist
// ============================================================================

pub fn watchlist(config: &Config, args: &[String]) -> Result<()> {
    let data_dir = config.data_dir()?;
    let mut store = WatchlistStore::load(&data_dir).context("Failed to load watchlist")?;

    let action = match args.first().map(String::as_str) {
        None | Some("list") => {
            if store.watchlist().is_empty() {
                println!("Your watchlist is empty.");
            }
            for id in store.watchlist() {
                println!("{}", id);
            }
            return Ok(());
        }
        Some("add") => WatchlistAction::Add { show_id: parse_show_id(args.get(1))? },
        Some("remove") => WatchlistAction::Remove { show_id: parse_show_id(args.get(1))? },
        Some(other) => bail!("Unknown watchlist command: {}", other),
    };

    // Open the queue before touching the slot; the change and its pending
    // action are recorded together or not at all
    let db = open_db(config)?;
    let changed = db
        .record_watchlist_change(&mut store, action)
        .context("Failed to record watchlist change")?;

    match (action, changed) {
        (WatchlistAction::Add { show_id }, true) => println!("Added show {} to your watchlist.", show_id),
        (WatchlistAction::Add { show_id }, false) => println!("Show {} is already in your watchlist.", show_id),
        (WatchlistAction::Remove { show_id }, true) => println!("Removed show {} from your watchlist.", show_id),
        (WatchlistAction::Remove { show_id }, false) => println!("Show {} is not in your watchlist.", show_id),
    }
    Ok(())
}

// ============================================================================
// Countdown
// ============================================================================

pub async fn countdown(air_date: Option<&String>) -> Result<()> {
    let Some(air_date) = air_date else {
        bail!("Missing air date (e.g. 2025-06-01 or 2025-06-01T21:00:00Z)");
    };
    if calculate_time_left(air_date, Utc::now()).is_none() {
        bail!("Unrecognised air date: {}", air_date);
    }

    let countdown = Countdown::start(air_date.as_str(), TICK_PERIOD);
    let mut updates = countdown.subscribe();
    let mut stdout = std::io::stdout();

    loop {
        let current = *updates.borrow_and_update();
        if let Some(left) = current {
            print!("\r{:<24}", left.long_display());
            stdout.flush()?;
            if left.is_aired {
                break;
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    println!();
    countdown.cancel();
    Ok(())
}

// ============================================================================
// Worker events
// ============================================================================

fn build_worker(config: &Config) -> Result<OfflineWorker> {
    let worker_config = WorkerConfig::from_config(config)?;
    let network = HttpNetwork::new(worker_config.origin.origin())?;
    let host = Arc::new(TerminalHost);

    Ok(OfflineWorker::new(
        worker_config,
        WorkerHost {
            caches: Arc::new(DiskCacheStorage::new(config.cache_dir()?)),
            network: Arc::new(network),
            pending: Arc::new(open_db(config)?),
            notifier: host.clone(),
            clients: host,
        },
    ))
}

/// Reuse the store an earlier run installed, or install a fresh one.
async fn ready_worker(config: &Config) -> Result<OfflineWorker> {
    let mut worker = build_worker(config)?;
    if !worker.resume().await? {
        worker.start().await.context("Failed to install offline cache")?;
    }
    Ok(worker)
}

/// Precache the app shell into the cache directory and purge older stores.
pub async fn install(config: &Config) -> Result<()> {
    let mut worker = build_worker(config)?;
    let purged = worker.start().await.context("Failed to install offline cache")?;
    debug!(purged = ?purged, "Worker activated");

    println!(
        "Installed {} to {}.",
        worker.config().cache_name,
        config.cache_dir()?.display()
    );
    if !purged.is_empty() {
        println!("Removed old cache(s): {}", purged.join(", "));
    }
    Ok(())
}

/// Route a request through the worker and write the body to stdout.
pub async fn fetch(config: &Config, args: &[String]) -> Result<()> {
    let Some(target) = args.first() else {
        bail!("Missing path or URL to fetch");
    };
    let navigate = args.iter().skip(1).any(|a| a == "--navigate");

    let worker = ready_worker(config).await?;
    let url = worker.config().resolve(target)?;
    let request = if navigate { Request::navigate(url) } else { Request::get(url) };

    match worker.handle_fetch(&request).await? {
        FetchOutcome::Respond(response) => {
            eprintln!("{} ({} bytes)", response.status, response.body.len());
            std::io::stdout().write_all(&response.body)?;
        }
        FetchOutcome::Bypass => println!("Not handled offline: {}", request.url),
    }
    Ok(())
}

pub async fn sync(config: &Config) -> Result<()> {
    let worker = build_worker(config)?;
    let Some(report) = worker.handle_sync(SYNC_TAG).await? else {
        return Ok(());
    };

    if report.synced.is_empty() && report.failed.is_empty() {
        println!("Nothing to sync.");
    } else {
        println!(
            "Synced {} pending action(s), {} left for the next sync.",
            report.synced.len(),
            report.failed.len()
        );
    }
    Ok(())
}

/// Deliver a push payload as the worker would, then act on a click.
pub async fn push(config: &Config, payload: Option<&String>) -> Result<()> {
    let Some(payload) = payload else {
        bail!("Missing push payload (JSON with title, body and optional url)");
    };
    let worker = build_worker(config)?;
    match worker.handle_push(Some(payload.as_bytes())).await? {
        Some(notification) => {
            worker.handle_notification_click(&notification).await?;
        }
        None => println!("Payload ignored."),
    }
    Ok(())
}

pub fn install_help(user_agent: Option<&String>) {
    let instructions = InstallInstructions::for_user_agent(user_agent.map_or("", String::as_str));
    println!("{}", instructions.title);
    for (i, step) in instructions.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("\n{}", instructions.note);
}

// ============================================================================
// Metadata
// ============================================================================

fn print_show_line(show: &TvShow) {
    let next = match show.time_until_next_episode(Utc::now()) {
        Some(left) => left.compact(),
        None => "-".to_string(),
    };
    println!(
        "{:>8}  {:<width$}  {:>4}  {}",
        show.id,
        truncate_string(&show.name, NAME_WIDTH),
        show.first_air_year().unwrap_or(""),
        next,
        width = NAME_WIDTH
    );
}

fn print_show_list(shows: &[TvShow]) {
    if shows.is_empty() {
        println!("No shows found.");
    }
    for show in shows {
        print_show_line(show);
    }
}

pub async fn show(config: &Config, id: Option<&String>) -> Result<()> {
    let id = parse_show_id(id)?;
    let client = TmdbClient::from_config(config)?;
    let show = client.get_tv_show_details(id).await?;
    info!(show_id = id, "Fetched show details");

    println!("{} ({})", show.name, show.first_air_year().unwrap_or("TBA"));
    if !show.status.is_empty() {
        println!("Status:   {}", show.status);
    }
    if !show.genres.is_empty() {
        println!("Genres:   {}", show.genre_names());
    }
    println!("Seasons:  {}", show.number_of_seasons);
    println!("Rating:   {:.1}", show.vote_average);
    println!("Poster:   {}", client.image_url(show.poster_path.as_deref(), Some("w500")));

    if let Some(ref episode) = show.last_episode_to_air {
        println!(
            "Last:     {} {} ({})",
            episode.code(),
            episode.name,
            format_air_date(&episode.air_date)
        );
    }
    match show.next_episode_to_air {
        Some(ref episode) => {
            let left = show
                .time_until_next_episode(Utc::now())
                .map(|left| left.long_display())
                .unwrap_or_else(|| "TBA".to_string());
            println!(
                "Next:     {} {} ({}) in {}",
                episode.code(),
                episode.name,
                format_air_date(&episode.air_date),
                left
            );
        }
        None => println!("Next:     no upcoming episode announced"),
    }

    if !show.overview.is_empty() {
        println!("\n{}", show.overview);
    }
    Ok(())
}

pub async fn search(config: &Config, query: &[String]) -> Result<()> {
    let query = query.join(" ");
    let client = TmdbClient::from_config(config)?;
    print_show_list(&client.search_tv_shows(&query).await?);
    Ok(())
}

pub async fn popular(config: &Config) -> Result<()> {
    let client = TmdbClient::from_config(config)?;
    print_show_list(&client.get_popular_tv_shows().await?);
    Ok(())
}
