// src/main.rs
//! GPS Tracker - finds a serial GPS receiver and follows its position

use anyhow::{Context, Result};
use clap::Parser;
use gps_tracker::{
    config::TrackerConfig,
    display::{terminal::TerminalDisplay, LabelState},
    geocode::{CoordinatesOnly, NominatimClient, ReverseGeocoder},
    gps::device::{self, SystemPorts},
    logging,
    map::MapState,
    TrackerSession,
};
use std::path::PathBuf;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

type Session = TrackerSession<MapState, LabelState>;

#[derive(Debug, Parser)]
#[command(name = "gps-tracker", version, about = "Follow a serial GPS receiver on a map")]
struct Cli {
    /// Path to a JSON config file (default: ~/.config/gps-tracker/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Label fixes with coordinates instead of looking up addresses
    #[arg(long)]
    no_geocode: bool,

    /// Log only, without the terminal display
    #[arg(long)]
    no_display: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.list_ports {
        return list_ports();
    }

    let mut config = match &cli.config {
        Some(path) => TrackerConfig::load_from(path),
        None => TrackerConfig::load(),
    }
    .context("Failed to load configuration")?;
    if cli.no_geocode {
        config.geocoder.enabled = false;
    }

    let interval = config.update_interval();

    // Discovery blocks for up to one read timeout per port, and the blocking
    // HTTP client must not be built or dropped on the async workers.
    let mut session = tokio::task::spawn_blocking(move || start_session(&config))
        .await
        .context("Discovery task failed")??;

    // The session must be dropped on a blocking thread, so display errors
    // are logged rather than propagated from here on.
    let display = (!cli.no_display).then(TerminalDisplay::new);
    if let Some(display) = &display {
        if let Err(e) = display.enter().and_then(|()| display.draw(&session.frame(None))) {
            warn!("Terminal display unavailable: {}", e);
        }
    }

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                // The next tick is not polled until this cycle has finished.
                let (returned, outcome) = tokio::task::spawn_blocking(move || {
                    let outcome = session.run_cycle();
                    (session, outcome)
                })
                .await
                .context("Update cycle panicked")?;
                session = returned;

                if let Some(display) = &display {
                    if let Err(e) = display.draw(&session.frame(Some(&outcome))) {
                        warn!("Failed to draw: {}", e);
                    }
                }
            }
        }
    }

    tokio::task::spawn_blocking(move || drop(session)).await?;
    if let Some(display) = &display {
        display.leave()?;
    }
    info!("Stopped");
    Ok(())
}

fn start_session(config: &TrackerConfig) -> Result<Session> {
    let geocoder: Box<dyn ReverseGeocoder + Send> = if config.geocoder.enabled {
        Box::new(
            NominatimClient::new(
                &config.geocoder.base_url,
                &config.geocoder.user_agent,
                config.geocoder.zoom,
                config.geocoder_timeout(),
            )
            .context("Failed to create geocoding client")?,
        )
    } else {
        Box::new(CoordinatesOnly)
    };

    info!("Searching for GPS device...");
    Ok(TrackerSession::start(
        &SystemPorts,
        &config.link_settings(),
        MapState::new(config.map_zoom),
        LabelState::new(),
        geocoder,
    ))
}

fn list_ports() -> Result<()> {
    let ports = device::list_ports(&SystemPorts)?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {}", port.name, port.kind);
        }
    }

    Ok(())
}
