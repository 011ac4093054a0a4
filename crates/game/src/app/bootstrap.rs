use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use monoray_engine::{
    frame_channel, resolve_data_paths, run_presenter, HighScoreStore, MetricsHandle,
    PresenterConfig, PresenterError, SharedSampleCell, SharedWorld, ShutdownFlag, StartupError,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{Tuning, WorldState};
use super::runtime::spawn_game_tasks;

const CONFIG_ENV_VAR: &str = "MONORAY_CONFIG";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to read tuning config at {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning config at {path}: {message}")]
    ParseConfig { path: PathBuf, message: String },
    #[error("failed to spawn task threads: {0}")]
    SpawnTasks(#[source] io::Error),
    #[error(transparent)]
    Presenter(#[from] PresenterError),
}

/// Wires the whole game together: tuning, persistence, the shared world,
/// the three periodic tasks, and the window presenter on this thread.
pub(crate) fn run() -> Result<(), AppError> {
    init_tracing();
    info!("=== Monoray Startup ===");

    let tuning = load_tuning()?;
    let data_paths = resolve_data_paths()?;
    info!(data_root = %data_paths.root.display(), "startup");

    let store = HighScoreStore::new(data_paths.high_score_file.clone());
    let high_score = store.load();
    info!(high_score, "high_score_loaded");

    let world = SharedWorld::new(WorldState::new(high_score, &tuning));
    let shutdown = ShutdownFlag::new();
    let metrics = MetricsHandle::default();
    let samples = SharedSampleCell::default();
    let (transport, frames) = frame_channel();

    let handles = spawn_game_tasks(
        world,
        tuning,
        store,
        samples.clone(),
        transport,
        metrics,
        shutdown.clone(),
    )
    .map_err(AppError::SpawnTasks)?;

    let result = run_presenter(PresenterConfig::default(), frames, samples, shutdown.clone());

    shutdown.request();
    for handle in handles {
        if handle.join().is_err() {
            warn!("task_thread_panicked");
        }
    }
    info!("shutdown");

    result.map_err(AppError::from)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_tuning() -> Result<Tuning, AppError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(raw_path) => {
            let path = PathBuf::from(raw_path);
            let text = fs::read_to_string(&path).map_err(|source| AppError::ReadConfig {
                path: path.clone(),
                source,
            })?;
            let tuning = parse_tuning(&text).map_err(|message| AppError::ParseConfig {
                path: path.clone(),
                message,
            })?;
            info!(path = %path.display(), "tuning_loaded");
            Ok(tuning)
        }
        Err(env::VarError::NotPresent) => Ok(Tuning::default()),
        Err(error) => {
            warn!(error = %error, "config env var unreadable; using defaults");
            Ok(Tuning::default())
        }
    }
}

/// Parses a tuning override file. Unset fields keep their defaults;
/// unknown fields are rejected with the offending path in the message.
fn parse_tuning(text: &str) -> Result<Tuning, String> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| error.to_string())
}
