use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::models::{ConversationHistory, ConversationTurn};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read chat history {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("chat history {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode chat history for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write chat history {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// File-backed conversation history stored as a pretty-printed JSON array of
/// `{prompt, reply}` objects.
///
/// There is no locking: concurrent appends race on read-modify-write and the
/// last writer wins.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored history, treating a missing, unreadable or corrupt
    /// file as empty.
    pub async fn load(&self) -> ConversationHistory {
        match self.try_load().await {
            Ok(history) => history,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "chat history unreadable; treating as empty"
                );
                ConversationHistory::default()
            }
        }
    }

    pub async fn try_load(&self) -> Result<ConversationHistory, HistoryError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(ConversationHistory::default());
            }
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        let turns = serde_json::from_str::<Vec<ConversationTurn>>(&raw).map_err(|source| {
            HistoryError::Parse {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        Ok(ConversationHistory::from(turns))
    }

    /// Writes the full history to a sibling staging file and renames it over
    /// the target. Each save stages into its own file so concurrent writers
    /// never rename each other's partial output.
    pub async fn save(&self, history: &ConversationHistory) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| HistoryError::Write {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        let mut encoded =
            serde_json::to_string_pretty(history.turns()).map_err(|source| {
                HistoryError::Encode {
                    path: self.path.display().to_string(),
                    source,
                }
            })?;
        encoded.push('\n');

        let staging_path = self.staging_path();
        fs::write(&staging_path, encoded)
            .await
            .map_err(|source| HistoryError::Write {
                path: staging_path.display().to_string(),
                source,
            })?;
        if let Err(source) = fs::rename(&staging_path, &self.path).await {
            if let Err(cleanup_err) = fs::remove_file(&staging_path).await {
                warn!(
                    path = %staging_path.display(),
                    error = %cleanup_err,
                    "failed to remove chat history staging file"
                );
            }
            return Err(HistoryError::Write {
                path: self.path.display().to_string(),
                source,
            });
        }

        Ok(())
    }

    /// Reloads the stored history, appends `turn` and persists the result.
    pub async fn append(&self, turn: ConversationTurn) -> Result<ConversationHistory, HistoryError> {
        let mut history = self.load().await;
        history.push(turn);
        self.save(&history).await?;
        Ok(history)
    }

    fn staging_path(&self) -> PathBuf {
        let mut file_name = OsString::from(".");
        file_name.push(
            self.path
                .file_name()
                .unwrap_or_else(|| OsStr::new("chat_history.json")),
        );
        file_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(file_name)
    }
}
