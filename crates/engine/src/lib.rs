use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;

pub use app::{
    bounded_sample_queue, cast_ray, drain_latest, frame_channel, normalize_angle, render_sprites,
    render_walls, run_presenter, spawn_periodic, text_width, ColumnHit, DepthBuffer, DisplayError,
    DisplayTransport, FrameBuffer, HighScoreStore, InputSample, InputSource, LoopMetricsSnapshot,
    MetricsHandle, MetricsReporter, NullTransport, Pattern, PersistenceError, PlayerInput, Pose,
    PresenterConfig, PresenterError, RayHit, SharedSampleCell, SharedWorld, ShutdownFlag, Side,
    SpriteView, TaskControl, TaskKind, Ticker, Vec2, WindowTransport, WorldMap, AXIS_CENTER,
    AXIS_MAX, DISPLAY_HEIGHT, DISPLAY_PAGES, DISPLAY_WIDTH, GLYPH_ADVANCE, GLYPH_HEIGHT,
    GLYPH_WIDTH, MAX_RENDER_DISTANCE, SPRITE_SIZE,
};

pub const DATA_DIR_ENV_VAR: &str = "MONORAY_DATA_DIR";

const HIGH_SCORE_FILE_NAME: &str = "high_score.json";

/// Where persisted state lives. Resolved once at startup.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
    pub high_score_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create data directory at {path}: {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the data directory: the env override when set, otherwise a
/// `save/` directory next to the executable. The directory is created if
/// missing; failure here is fatal to startup.
pub fn resolve_data_paths() -> Result<DataPaths, StartupError> {
    let root = resolve_data_root()?;

    fs::create_dir_all(&root).map_err(|source| StartupError::CreateDataDir {
        path: root.clone(),
        source,
    })?;

    let high_score_file = root.join(HIGH_SCORE_FILE_NAME);
    Ok(DataPaths {
        root,
        high_score_file,
    })
}

fn resolve_data_root() -> Result<PathBuf, StartupError> {
    match env::var(DATA_DIR_ENV_VAR) {
        Ok(value) => Ok(normalize_path(Path::new(&value))),
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            Ok(exe_dir.join("save"))
        }
        Err(source) => Err(StartupError::EnvVar {
            var: DATA_DIR_ENV_VAR,
            source,
        }),
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_keeps_nonexistent_paths_verbatim() {
        let path = Path::new("definitely/not/a/real/path");
        assert_eq!(normalize_path(path), PathBuf::from(path));
    }

    #[test]
    fn high_score_file_lives_under_root() {
        let paths = DataPaths {
            root: PathBuf::from("root"),
            high_score_file: PathBuf::from("root").join(HIGH_SCORE_FILE_NAME),
        };
        assert!(paths.high_score_file.starts_with(&paths.root));
    }
}
