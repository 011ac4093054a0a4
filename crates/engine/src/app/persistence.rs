use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize high score: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write high score file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreDocument {
    high_score: u32,
}

/// Stores the single persisted value: the best score across runs. Loads
/// treat missing or unreadable storage as zero; saves are atomic and safe
/// to repeat. A failed save leaves the previous file intact, so the
/// session keeps playing against its in-memory value.
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> u32 {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return 0,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "high_score_unreadable");
                return 0;
            }
        };

        let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
        match serde_path_to_error::deserialize::<_, HighScoreDocument>(&mut deserializer) {
            Ok(document) => document.high_score,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "high_score_corrupt");
                0
            }
        }
    }

    pub fn save(&self, high_score: u32) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(&HighScoreDocument { high_score })
            .map_err(PersistenceError::Serialize)?;
        write_text_atomic(&self.path, &text).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    replace_file(&tmp_path, path)
}

fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    match fs::remove_file(final_path) {
        Ok(_) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(tmp_path);
            return Err(error);
        }
    }

    if let Err(error) = fs::rename(tmp_path, final_path) {
        let _ = fs::remove_file(tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("high_score.tmp");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> HighScoreStore {
        HighScoreStore::new(dir.path().join("high_score.json"))
    }

    #[test]
    fn missing_file_loads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(store_in(&dir).load(), 0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(4200).expect("save");
        assert_eq!(store.load(), 4200);
    }

    #[test]
    fn repeated_saves_keep_the_latest_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(100).expect("first save");
        store.save(250).expect("second save");
        store.save(175).expect("third save");
        assert_eq!(store.load(), 175);
    }

    #[test]
    fn corrupt_file_loads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(dir.path().join("high_score.json"), b"{not json").expect("write garbage");
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn wrong_shape_loads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(dir.path().join("high_score.json"), br#"{"score": true}"#)
            .expect("write wrong shape");
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HighScoreStore::new(dir.path().join("nested").join("high_score.json"));
        store.save(9).expect("save into missing dir");
        assert_eq!(store.load(), 9);
    }

    #[test]
    fn no_temp_file_is_left_behind_after_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(1).expect("save");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
