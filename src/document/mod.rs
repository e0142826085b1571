//! Persisted session document.
//!
//! The engine owns two keys of the saved file, `history` and `fullHistory`.
//! Everything else belongs to other parts of the editor and is carried
//! through untouched.

use std::path::{Path, PathBuf};

use bevy::log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::action_log::ActionLog;
use crate::history::{History, HistoryError};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inconsistent action log: {0}")]
    InconsistentLog(String),

    #[error("Invalid undo history: {0}")]
    InvalidHistory(#[from] HistoryError),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_history: Option<ActionLog>,

    /// Fields owned by the rest of the editor
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SessionDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(json)?;
        document.check()?;
        Ok(document)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject documents whose action log disagrees with itself or whose
    /// history cannot be rebuilt
    pub fn check(&self) -> Result<(), DocumentError> {
        if let Some(log) = &self.full_history {
            log.check_consistency()
                .map_err(DocumentError::InconsistentLog)?;
        }
        if let Some(history) = &self.history {
            history.validate()?;
        }
        Ok(())
    }
}

pub fn load_document(path: &Path) -> Result<SessionDocument, DocumentError> {
    let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = SessionDocument::from_json(&json)?;
    info!("Loaded session document from {:?}", path);
    Ok(document)
}

pub fn save_document(path: &Path, document: &SessionDocument) -> Result<(), DocumentError> {
    let json = document.to_json()?;
    std::fs::write(path, json).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved session document to {:?}", path);
    Ok(())
}
