// src/session/store.rs — Session log files on disk
//
// One pretty-printed JSON file per saved session, named
// `session_<YYYYmmdd_HHMMSS>.json`. Files are only ever created, never
// rewritten; a same-second save gets a zero-padded `_<nnn>` suffix instead of
// clobbering, so byte order over names stays save order.

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{SessionLog, SessionMetadata};
use crate::infra::errors::ScribeError;
use crate::provider::Message;

const FILE_PREFIX: &str = "session_";
const FILE_SUFFIX: &str = ".json";
/// Suffixes run `_001` to `_999`; the width keeps them sortable as text.
const MAX_COLLISIONS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a file name returned by [`list_resumable_sessions`].
    ///
    /// [`list_resumable_sessions`]: SessionStore::list_resumable_sessions
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Valid session logs, newest first. Files that cannot be read or do not
    /// have the `{metadata, history}` shape are skipped with a warning.
    pub fn list_resumable_sessions(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("cannot read log dir {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_session_file_name(name))
            .collect();
        names.sort_unstable_by(|a, b| b.cmp(a));

        names
            .into_iter()
            .filter(|name| {
                let path = self.resolve(name);
                match read_log_value(&path).and_then(|v| check_shape(&path, &v)) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("skipping {}: {}", name, e);
                        false
                    }
                }
            })
            .collect()
    }

    /// Write `{metadata, history}` to a new file and return its path.
    /// SYSTEM messages are dropped from `history`.
    pub fn save(
        &self,
        history: &[Message],
        metadata: &SessionMetadata,
    ) -> Result<PathBuf, ScribeError> {
        self.save_at(history, metadata, Local::now())
    }

    /// [`save`](SessionStore::save) with an explicit timestamp for the file name.
    pub fn save_at(
        &self,
        history: &[Message],
        metadata: &SessionMetadata,
        now: DateTime<Local>,
    ) -> Result<PathBuf, ScribeError> {
        std::fs::create_dir_all(&self.dir)?;

        let log = SessionLog {
            metadata: metadata.clone(),
            history: history.iter().filter(|m| !m.is_system()).cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&log)?;

        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        for n in 0..MAX_COLLISIONS {
            let name = if n == 0 {
                format!("{FILE_PREFIX}{stamp}{FILE_SUFFIX}")
            } else {
                format!("{FILE_PREFIX}{stamp}_{n:03}{FILE_SUFFIX}")
            };
            let path = self.dir.join(&name);

            let mut file = match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(f) => f,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!("{} exists, trying next suffix", name);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            file.write_all(json.as_bytes())?;
            file.flush()?;
            file.sync_all()?;

            tracing::info!(
                path = %path.display(),
                messages = log.history.len(),
                "session saved"
            );
            return Ok(path);
        }

        Err(ScribeError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free session file name for {}", stamp),
        )))
    }

    /// Read a session log. The shape is checked again here since the file may
    /// have changed since it was listed.
    pub fn load(path: &Path) -> Result<SessionLog, ScribeError> {
        let value = read_log_value(path)?;
        check_shape(path, &value)?;

        if !value["metadata"]["model_name"].is_string() {
            return Err(ScribeError::invalid_log(
                path,
                "'metadata.model_name' is not a string",
            ));
        }

        let mut log: SessionLog = serde_json::from_value(value)
            .map_err(|e| ScribeError::invalid_log(path, e.to_string()))?;

        let before = log.history.len();
        log.history.retain(|m| !m.is_system());
        if log.history.len() != before {
            tracing::warn!(
                "{}: dropped {} SYSTEM message(s) from history",
                path.display(),
                before - log.history.len()
            );
        }

        Ok(log)
    }
}

fn is_session_file_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

fn read_log_value(path: &Path) -> Result<serde_json::Value, ScribeError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ScribeError::invalid_log(path, e.to_string()))
}

/// A log is valid iff its root is an object holding `metadata` and `history`.
fn check_shape(path: &Path, value: &serde_json::Value) -> Result<(), ScribeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ScribeError::invalid_log(path, "root is not a JSON object"))?;
    for key in ["metadata", "history"] {
        if !obj.contains_key(key) {
            return Err(ScribeError::invalid_log(
                path,
                format!("missing '{}' key", key),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_file_name_pattern() {
        assert!(is_session_file_name("session_20260101_120000.json"));
        assert!(is_session_file_name("session_20260101_120000_002.json"));
        assert!(!is_session_file_name("notes.json"));
        assert!(!is_session_file_name("session_20260101_120000.json.bak"));
    }

    #[test]
    fn test_check_shape() {
        let p = Path::new("x.json");
        assert!(check_shape(p, &json!({"metadata": {}, "history": []})).is_ok());
        assert!(check_shape(p, &json!({"metadata": {}})).is_err());
        assert!(check_shape(p, &json!({"history": []})).is_err());
        assert!(check_shape(p, &json!([{"role": "USER", "content": "hi"}])).is_err());
        assert!(check_shape(p, &json!("session")).is_err());
    }

    #[test]
    fn test_suffixed_name_sorts_before_base_when_descending() {
        let mut names = vec![
            "session_20260101_120000.json".to_string(),
            "session_20260101_120000_001.json".to_string(),
            "session_20251231_235959.json".to_string(),
        ];
        names.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(names[0], "session_20260101_120000_001.json");
        assert_eq!(names[1], "session_20260101_120000.json");
        assert_eq!(names[2], "session_20251231_235959.json");
    }

    #[test]
    fn test_two_digit_suffix_sorts_above_one_digit() {
        let mut names = vec![
            "session_20260101_120000_009.json".to_string(),
            "session_20260101_120000_010.json".to_string(),
            "session_20260101_120000_100.json".to_string(),
        ];
        names.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(
            names,
            vec![
                "session_20260101_120000_100.json",
                "session_20260101_120000_010.json",
                "session_20260101_120000_009.json",
            ]
        );
    }
}
