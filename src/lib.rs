pub mod audio;
pub mod cli;
pub mod feedback;
pub mod gesture;
pub mod models;
pub mod selection;
pub mod settings;
pub mod source;
mod utils;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use tokio::{
    fs::File,
    io::{AsyncBufRead, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use audio::AudioEngineHandle;
use cli::Cli;
use feedback::TargetBoard;
use gesture::ClassifierAdapter;
use selection::{SelectionController, SelectionEvent};
use settings::{SelectionSettings, SettingsStore};
use source::ReplayController;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still overrides this
    utils::logging::init(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let run_id = Uuid::new_v4();
    info!("gesture-select starting up (run {run_id})");

    let store = SettingsStore::new(cli.settings.clone())?;
    let settings = store.update(|settings| cli.apply_overrides(settings))?;
    if cli.save_settings {
        store.persist()?;
        info!("settings saved");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(replay(cli, settings, run_id));
    // A blocking stdin read may still be parked on the blocking pool.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn replay(cli: Cli, settings: SelectionSettings, run_id: Uuid) -> Result<()> {
    let config = settings.selection_config();
    let linger = config.dwell + config.cooldown;

    let audio = AudioEngineHandle::new();
    let mut board = TargetBoard::new(&config);
    if settings.sound.enabled {
        board = board.with_audio(audio.clone(), settings.sound.volume);
    }
    let board = Arc::new(board);

    let controller = SelectionController::new(config, board.clone());
    controller.set_mode(cli.mode.into()).await;

    let printer_token = CancellationToken::new();
    let printer = tokio::spawn(print_events(controller.subscribe(), printer_token.clone()));

    let reader = open_input(cli.input.as_deref()).await?;
    let adapter = ClassifierAdapter::new(settings.min_confidence);

    let mut replay = ReplayController::new();
    replay.start(reader, controller.clone(), adapter, linger)?;

    if let Some(token) = replay.cancel_token() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted; stopping replay");
                token.cancel();
            }
        });
    }

    let report = replay.wait().await?;
    controller.disable().await;
    if let Err(err) = audio.stop() {
        warn!("audio shutdown failed: {err}");
    }

    printer_token.cancel();
    printer.await.context("event printer failed to join")?;

    info!(
        "run {run_id} finished: replay {}, selection {}",
        serde_json::to_string(&report)?,
        serde_json::to_string(&controller.stats().await)?
    );
    log::debug!("final board: {}", serde_json::to_string(&board.snapshot())?);
    Ok(())
}

async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open replay input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Writes every selection event to stdout as one JSON line.
async fn print_events(mut rx: broadcast::Receiver<SelectionEvent>, token: CancellationToken) {
    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            _ = token.cancelled() => {
                // Flush whatever was published before shutdown.
                while let Ok(event) = rx.try_recv() {
                    print_event(&event);
                }
                break;
            }
        };
        match event {
            Ok(event) => print_event(&event),
            Err(RecvError::Lagged(skipped)) => warn!("event printer lagged; {skipped} events dropped"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_event(event: &SelectionEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(err) => warn!("failed to encode event: {err}"),
    }
}
