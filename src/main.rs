mod app;
mod draw;
mod state;

use crate::app::{App, View};
use crate::state::app_settings::{AppSettings, DEFAULT_REFRESH_SECS};
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::network::NetworkWorker;
use crate::state::refresher::PeriodicRefresher;
use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crossterm::{cursor, execute, terminal};
use log::{debug, warn};
use pool_api::{ApiError, DEFAULT_BASE_URL, NewEntry, PoolApi};
use pool_engine::{PoolAnalytics, Standings, TeamKey, Tournament, score_bracket, set_pick};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "madpool", version)]
#[command(about = "March Madness bracket pool standings and pick analytics", long_about = None)]
struct Cli {
    /// Base URL of the pool service
    #[arg(long, global = true, env = "MADPOOL_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api: String,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Leaderboard for every entry in the pool
    Standings {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Champion picks, most split games and most contrarian brackets
    Analytics {
        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// One entry's bracket, round by round, marked against results
    Show {
        /// Entry id
        id: String,
    },

    /// Register a new entry
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Public display handle
        #[arg(long)]
        username: Option<String>,
    },

    /// Pick a winner for one game and save the bracket
    Pick {
        /// Entry id
        id: String,

        /// Game id, e.g. East_64_g1, South_32_0, FF_SEMI_1, FF_CHAMP
        game_id: String,

        /// Team key, e.g. "1|Duke"
        team: String,
    },

    /// Time left until entries close
    Countdown {
        /// Ask the pool service instead of using the local deadline
        #[arg(long)]
        remote: bool,
    },

    /// Live view that refreshes on an interval until Ctrl-C
    Watch {
        #[arg(long, value_enum, default_value_t = View::Standings)]
        view: View,

        /// Seconds between refreshes
        #[arg(long, env = "MADPOOL_REFRESH_SECS", default_value_t = DEFAULT_REFRESH_SECS)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    let refresh_secs = match &cli.command {
        Command::Watch { interval, .. } => *interval,
        _ => DEFAULT_REFRESH_SECS,
    };
    let settings = AppSettings::new(&cli.api, refresh_secs, cli.verbose);
    settings.init_logging();
    debug!("settings: {settings:?}");

    let tournament = Tournament::load().context("loading tournament tables")?;
    let api = PoolApi::new(settings.api_base_url.clone());

    match cli.command {
        Command::Standings { json } => {
            let entries = api.fetch_entries().await.context("fetching entries")?;
            let standings = Standings::compute(&entries, &tournament.answer_key, &tournament.points);
            if json {
                println!("{}", serde_json::to_string_pretty(&standings)?);
            } else {
                print!("{}", draw::standings_table(&standings));
            }
        }

        Command::Analytics { json } => {
            let entries = api.fetch_entries().await.context("fetching entries")?;
            let analytics =
                PoolAnalytics::compute(&entries, &tournament.answer_key, &tournament.points);
            if json {
                println!("{}", serde_json::to_string_pretty(&analytics)?);
            } else {
                print!("{}", draw::analytics_report(&analytics));
            }
        }

        Command::Show { id } => {
            let entry = api
                .fetch_entry(&id)
                .await
                .with_context(|| format!("fetching entry {id}"))?;
            let progression = tournament.bracket.progress(&entry.picks);
            let score = score_bracket(&entry.picks, &tournament.answer_key, &tournament.points);
            print!(
                "{}",
                draw::bracket_view(&entry, &progression, &tournament.answer_key, &score)
            );
        }

        Command::Create { name, email, username } => {
            let new = NewEntry::new(name, email, username.as_deref());
            if new.name.is_empty() || new.email.is_empty() {
                bail!("name and email are required");
            }
            let id = api.create_entry(&new).await.context("creating entry")?;
            println!("Created entry {id}");
        }

        Command::Pick { id, game_id, team } => {
            pick(&api, &tournament, &id, &game_id, &team).await?;
        }

        Command::Countdown { remote } => {
            let now = Utc::now();
            if remote {
                let meta = api.fetch_meta().await.context("fetching tournament metadata")?;
                if meta.is_closed(now) {
                    println!("Entries are closed");
                } else {
                    let deadline = meta
                        .deadline
                        .map(pool_engine::Deadline::new)
                        .unwrap_or(tournament.deadline);
                    println!("{}", deadline.countdown_text(now));
                }
            } else {
                println!("{}", tournament.deadline.countdown_text(now));
            }
        }

        Command::Watch { view, .. } => {
            watch(App::new(tournament, view), api, settings.refresh_interval).await?;
        }
    }

    Ok(())
}

async fn pick(
    api: &PoolApi,
    tournament: &Tournament,
    id: &str,
    game_id: &str,
    team: &str,
) -> anyhow::Result<()> {
    match api.fetch_meta().await {
        Ok(meta) if meta.is_closed(Utc::now()) => bail!("entries are closed"),
        Ok(_) => {}
        // Older services don't expose /meta; fall back to the local deadline.
        Err(ApiError::NotFound(_)) => {
            if tournament.deadline.is_closed(Utc::now()) {
                bail!("entries are closed");
            }
        }
        Err(e) => warn!("could not check the deadline: {e}"),
    }

    let mut entry = api
        .fetch_entry(id)
        .await
        .with_context(|| format!("fetching entry {id}"))?;
    set_pick(
        &mut entry.picks,
        entry.locked,
        &tournament.bracket,
        game_id,
        &TeamKey::new(team.trim()),
    )
    .with_context(|| format!("picking {team} in {game_id}"))?;

    api.save_bracket(&entry)
        .await
        .with_context(|| format!("saving bracket for entry {id}"))?;
    println!("Saved: {game_id} -> {}", draw::team_label(team.trim()));
    Ok(())
}

async fn watch(mut app: App, api: PoolApi, period: Duration) -> anyhow::Result<()> {
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, mut network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Network thread
    let network_worker = NetworkWorker::new(api, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic pool refresh thread
    let periodic_updater = PeriodicRefresher::new(network_req_tx.clone(), period);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger entries load on startup
    request_initial_load(&network_req_tx).await?;
    redraw(&app)?;

    loop {
        tokio::select! {
            Some(response) = network_resp_rx.recv() => {
                if app.handle_response(response) {
                    redraw(&app)?;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
            else => break,
        }
    }

    network_task.abort();
    periodic_task.abort();

    Ok(())
}

async fn request_initial_load(tx: &mpsc::Sender<NetworkRequest>) -> anyhow::Result<()> {
    tx.send(NetworkRequest::LoadEntries)
        .await
        .context("network worker stopped before the initial load")
}

fn redraw(app: &App) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let tty = stdout.is_terminal();
    redraw_to(&mut stdout, tty, app, Utc::now())
}

fn redraw_to<W: Write>(out: &mut W, tty: bool, app: &App, now: DateTime<Utc>) -> io::Result<()> {
    if tty {
        execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
    } else {
        writeln!(out, "----")?;
    }
    write!(out, "{}", draw::watch_screen(app, now))?;
    out.flush()
}
