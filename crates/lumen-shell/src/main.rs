//! Lumen kiosk shell entry point

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyCode, KeyModifiers};
use futures::StreamExt;
use tracing::{debug, info};

use lumen_core::{notification_channel, PersistentStore};
use lumen_hardware::{HardwareEngine, SystemToolRunner};
use lumen_runtime::{spawn_due_event_worker, Orchestrator};
use lumen_shell::modules::build_registry;
use lumen_shell::term::{map_key, TermSurface};
use lumen_shell::{Cli, ShellConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config =
        ShellConfig::load(cli.config.as_deref()).context("configuration failed")?;
    if let Some(interface) = &cli.interface {
        config.hardware.wifi_interface = interface.clone();
    }

    let state_path = config.state_file(cli.data_dir.as_deref());
    info!(state = %state_path.display(), "starting lumen");
    let store = PersistentStore::open(&state_path);

    // The settings screen persists a screensaver timeout; apply it over the
    // config-file value at startup.
    if let Some(timeout) = store
        .get("Settings")
        .and_then(|settings| settings.get("screensaver_timeout_secs"))
        .and_then(|value| value.as_u64())
    {
        debug!(timeout, "using persisted screensaver timeout");
        config.kiosk.screensaver_timeout_secs = timeout;
    }

    let (notifier, notification_receiver) = notification_channel();

    let runner = Arc::new(SystemToolRunner::new(config.hardware.tool_timeout()));
    let engine = HardwareEngine::new(config.hardware.clone(), runner.clone());

    let registry = build_registry(&notifier, &engine, runner);
    let mut orchestrator = Orchestrator::new(
        registry,
        store,
        &config.kiosk,
        notifier.clone(),
        notification_receiver,
        Instant::now(),
    );

    let due_worker = spawn_due_event_worker(
        state_path.clone(),
        notifier.clone(),
        config.kiosk.background_refresh(),
    );

    let mut surface = TermSurface::new().context("terminal setup failed")?;
    let mut frames = tokio::time::interval(config.kiosk.frame_interval());
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut events = EventStream::new();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let now = Instant::now();
                orchestrator.tick(now);
                orchestrator.render(&mut surface);
                surface.flush().context("render flush failed")?;
            }
            Some(event) = events.next() => {
                let Ok(event) = event else { continue };
                if let Event::Key(key) = &event {
                    // Raw mode swallows SIGINT; Ctrl-C arrives as a key.
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        info!("shutdown requested");
                        break;
                    }
                    if let Some(input) = map_key(key) {
                        orchestrator.dispatch_input(&input, Instant::now());
                    }
                }
            }
        }
    }

    due_worker.abort();
    orchestrator.shutdown();
    drop(surface);
    info!("lumen stopped");
    Ok(())
}

/// Logs go to stderr: stdout belongs to the alternate-screen UI.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
