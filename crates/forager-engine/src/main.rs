//! Console host for the Forager gathering assistant.
//!
//! This is the main entry point that wires together configuration, the
//! world graph, timed groups, alarms and the gather orchestrator, then
//! reads slash commands from standard input until told to stop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `forager-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load world data (JSON export or the bundled sample world)
//! 4. Build timed groups and register configured alarms
//! 5. Create the teleport-language mirror
//! 6. Assemble the gatherer with terminal host capabilities
//! 7. Start the alarm poll loop and the language watcher
//! 8. Run the command loop until `/quit`, end of input, or Ctrl-C
//! 9. Cancel in-flight work and wait for background tasks

mod console;
mod error;
mod terminal;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use forager_core::alarm::AlarmManager;
use forager_core::clock::EorzeaTime;
use forager_core::config::GatherConfig;
use forager_core::gatherer::{GatherSession, Gatherer};
use forager_core::host::{CommandExecutor, GameState, NotificationSink, SharedGameState};
use forager_core::language::LanguageMirror;
use forager_core::timed_group::TimedGroups;
use forager_world::{GroupDefinition, WorldDefinition, WorldMap};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleCommand, HELP};
use crate::error::EngineError;
use crate::terminal::{EchoExecutor, TerminalSink};

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "forager-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, world data or alarms fail to load,
/// or console input cannot be read.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("forager-engine starting");
    if !config_found {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        language = ?config.session.language,
        use_teleport = config.features.use_teleport,
        use_gear_change = config.features.use_gear_change,
        use_coordinates = config.features.use_coordinates,
        alarms = config.alarms.len(),
        "Configuration loaded"
    );

    // 3. Load world data.
    let (world, group_definitions) = load_world(config.session.world_data.as_deref())?;
    info!(
        items = world.item_count(),
        nodes = world.node_count(),
        "World data ready"
    );

    // 4. Timed groups and alarms.
    let groups = TimedGroups::from_definitions(group_definitions);
    let alarms = AlarmManager::from_config(&config.alarms, &world)?;
    info!(groups = groups.len(), alarms = alarms.len(), "Groups and alarms registered");

    // 5. Teleport-language mirror.
    let language = Arc::new(LanguageMirror::new(config.session.language));
    if let Some(path) = &config.session.teleporter_config {
        language.refresh_from_file(path).await;
    }

    // 6. Assemble the gatherer.
    let game = Arc::new(SharedGameState::new());
    let gatherer = Arc::new(Gatherer::new(GatherSession {
        world: Arc::new(world),
        groups: Arc::new(groups),
        alarms: Arc::new(alarms),
        features: Arc::new(config.features.clone()),
        language: Arc::clone(&language),
        executor: Arc::new(EchoExecutor) as Arc<dyn CommandExecutor>,
        sink: Arc::new(TerminalSink) as Arc<dyn NotificationSink>,
        game: Arc::clone(&game) as Arc<dyn GameState>,
    }));
    info!(
        eorzea_time = %EorzeaTime::format_hour(EorzeaTime::current_hours(0)),
        "Gatherer ready"
    );

    // 7. Background loops.
    let alarm_loop = gatherer.spawn_alarm_loop(interval(config.session.alarm_poll_interval_ms));
    let language_watcher = config.session.teleporter_config.clone().and_then(|path| {
        let cancel = gatherer.cancellation_token().child_token();
        Arc::clone(&language)
            .spawn_watcher(path, cancel)
            .inspect_err(|e| warn!(error = %e, "teleport language watcher not started"))
            .ok()
    });

    // 8. Command loop.
    println!("Type /help for commands.");
    run_console(&gatherer, &game).await?;

    // 9. Shutdown.
    gatherer.shutdown();
    if let Err(e) = alarm_loop.await {
        warn!(error = %e, "alarm loop ended abnormally");
    }
    if let Some(watcher) = language_watcher {
        if let Err(e) = watcher.await {
            warn!(error = %e, "language watcher ended abnormally");
        }
    }

    info!("forager-engine shutdown complete");
    Ok(())
}

/// Load `forager-config.yaml` from the working directory, falling back to
/// defaults when it does not exist.
fn load_config() -> Result<(GatherConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((GatherConfig::from_file(config_path)?, true))
    } else {
        Ok((GatherConfig::parse("")?, false))
    }
}

/// Load the world graph from a JSON export, or the sample world when no
/// path is configured.
fn load_world(path: Option<&Path>) -> Result<(WorldMap, Vec<GroupDefinition>), EngineError> {
    if let Some(path) = path {
        info!(path = %path.display(), "Loading world data");
        Ok(WorldDefinition::from_file(path)?.build()?)
    } else {
        info!("No world data configured, using the sample world");
        Ok(forager_world::create_sample_world()?)
    }
}

/// Poll interval from milliseconds; zero is bumped to one millisecond.
fn interval(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

/// Read and execute console commands until `/quit`, end of input, or an
/// interrupt.
async fn run_console(gatherer: &Gatherer, game: &SharedGameState) -> Result<(), EngineError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            info!("Console input closed");
            return Ok(());
        };
        match console::parse(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Quit)) => return Ok(()),
            Ok(Some(command)) => execute(gatherer, game, command),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn execute(gatherer: &Gatherer, game: &SharedGameState, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Gather(request) => {
            if let Some(handle) = gatherer.gather(request) {
                tokio::spawn(async move {
                    match handle.await {
                        Ok(report) => debug!(node = %report.node, status = ?report.status, "gather finished"),
                        Err(e) => warn!(error = %e, "gather task failed"),
                    }
                });
            }
        }
        ConsoleCommand::Dump(kind) => {
            for line in gatherer.dump(kind) {
                println!("{line}");
            }
        }
        ConsoleCommand::Position(location) => {
            game.set_location(location);
            match location {
                Some(here) => println!(
                    "Location set to territory {} at ({:.1}, {:.1}).",
                    here.territory, here.position.x, here.position.y
                ),
                None => println!("Location cleared."),
            }
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
}
