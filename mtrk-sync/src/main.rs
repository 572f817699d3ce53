//! Multitrack sync (mtrk-sync) - headless session player
//!
//! Loads a session file, probes the duration of every file-backed lane,
//! then plays the timeline for a fixed time while reporting engine events.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mtrk_common::config::{resolve_session_path, SESSION_ENV_VAR};
use mtrk_common::events::{EventBus, MultitrackEvent};
use mtrk_common::TrackId;
use mtrk_sync::resource::load_durations;
use mtrk_sync::{Collaborators, FrameDriver, MultitrackEngine, SessionConfig};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::{JoinHandle, LocalSet};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mtrk-sync
#[derive(Parser, Debug)]
#[command(name = "mtrk-sync")]
#[command(about = "Play a multitrack session headless on one shared playhead")]
#[command(version)]
struct Args {
    /// Session file (falls back to $MTRK_SESSION, then the config directory)
    session: Option<PathBuf>,

    /// Seconds of playback before stopping
    #[arg(short, long, default_value = "10")]
    seconds: f64,

    /// Start at this fraction of the timeline (0.0 - 1.0)
    #[arg(long)]
    seek: Option<f64>,

    /// Playback rate (0.25 - 5.0)
    #[arg(short, long)]
    rate: Option<f64>,

    /// Print engine events as JSON lines on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mtrk_sync=info,mtrk_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let session_path = resolve_session_path(args.session.as_deref(), SESSION_ENV_VAR)
        .context("No session file to play")?;
    info!("Session: {}", session_path.display());

    let session = SessionConfig::load(&session_path)
        .with_context(|| format!("Failed to load session {}", session_path.display()))?;

    let files: Vec<(TrackId, PathBuf)> = session
        .tracks
        .iter()
        .filter_map(|t| t.url.as_ref().map(|url| (t.id.clone(), PathBuf::from(url))))
        .collect();
    let period = session.options.frame_period();
    let window = playback_window(args.seconds)?;

    let events = EventBus::new(session.options.event_capacity);
    let rx = events.subscribe();

    let collaborators = Collaborators::headless(&session.options);
    let engine = MultitrackEngine::new(session.tracks, session.options, collaborators, events)
        .context("Failed to initialize multitrack engine")?;
    let engine = Rc::new(RefCell::new(engine));

    let local = LocalSet::new();
    local
        .run_until(async move {
            let printer = tokio::task::spawn_local(print_events(rx, args.json));

            info!("Probing {} file(s)", files.len());
            for outcome in load_durations(files).await {
                let mut engine = engine.borrow_mut();
                match outcome.result {
                    Ok(duration) => engine.handle_resource_loaded(&outcome.id, duration),
                    Err(_) => engine.handle_resource_failed(&outcome.id),
                }
            }

            {
                let mut engine = engine.borrow_mut();
                if let Some(rate) = args.rate {
                    engine.set_audio_rate(rate).context("Invalid --rate")?;
                }
                if let Some(fraction) = args.seek {
                    engine.seek_to(fraction);
                }
                info!(
                    "Playing {:.3}s timeline from {:.3}s",
                    engine.max_duration(),
                    engine.get_current_time()
                );
                engine.play();
            }

            let driver = FrameDriver::spawn(engine.clone(), period);

            tokio::select! {
                _ = tokio::time::sleep(window) => {
                    info!("Playback window elapsed");
                },
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C, stopping");
                },
            }

            let position = engine.borrow().get_current_time();
            engine.borrow_mut().destroy();
            driver.join().await;
            info!("Stopped at {:.3}s", position);

            // Dropping the engine closes the event bus and ends the printer
            drop(engine);
            finish_printer(printer).await;
            Ok::<_, anyhow::Error>(())
        })
        .await?;

    Ok(())
}

/// Length of the playback window from `--seconds` (negative means none)
fn playback_window(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds.max(0.0))
        .with_context(|| format!("Invalid --seconds {}", seconds))
}

async fn finish_printer(printer: JoinHandle<()>) {
    if let Err(e) = printer.await {
        debug!("Event printer ended abnormally: {}", e);
    }
}

/// Report engine events until the bus closes
async fn print_events(mut rx: Receiver<MultitrackEvent>, json: bool) {
    loop {
        match rx.recv().await {
            Ok(event) if json => match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize {} event: {}", event.name(), e),
            },
            Ok(event) => match event.track_id() {
                Some(id) => info!("Event {} for {}", event.name(), id),
                None => info!("Event {}", event.name()),
            },
            Err(RecvError::Lagged(n)) => warn!("Event printer lagged, {} events dropped", n),
            Err(RecvError::Closed) => break,
        }
    }
}
