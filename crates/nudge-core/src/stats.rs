//! Statistics query contract.
//!
//! The surrounding host answers `{ "type": "getStats" }` with the running
//! totals. A missing answer is normal (the receiver may not be injected yet)
//! and reads as "no data"; the caller simply asks again on the next refresh.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MessagingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StatsRequest {
    #[serde(rename = "getStats")]
    GetStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_messages: u64,
    pub rendered_messages: u64,
    pub memory_saved_percent: f64,
    pub enabled: bool,
}

/// Anything that can answer a stats request.
pub trait StatsSource {
    /// `Ok(None)` means the receiver answered with nothing.
    fn query(&self, request: &StatsRequest) -> Result<Option<StatsResponse>, MessagingError>;
}

/// Ask `source` for stats, folding every failure into "no data".
pub fn fetch_stats(source: &dyn StatsSource) -> Option<StatsResponse> {
    match source.query(&StatsRequest::GetStats) {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(error = %e, "no stats available");
            None
        }
    }
}

/// Reads a stats response previously written as JSON to a file.
///
/// A missing file is a receiver that is not ready; an empty file is an empty
/// answer.
#[derive(Debug, Clone)]
pub struct JsonFileStatsSource {
    path: PathBuf,
}

impl JsonFileStatsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsSource for JsonFileStatsSource {
    fn query(&self, _request: &StatsRequest) -> Result<Option<StatsResponse>, MessagingError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MessagingError::ReceiverNotReady(self.path.display().to_string()))
            }
            Err(e) => return Err(MessagingError::Transport(e.to_string())),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| MessagingError::Malformed(e.to_string()))
    }
}

/// The figures a stats panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub total_messages: String,
    pub rendered_messages: String,
    pub memory_saved: String,
    pub status: String,
    pub active: bool,
}

impl StatsView {
    pub fn from_response(response: &StatsResponse) -> Self {
        Self {
            total_messages: response.total_messages.to_string(),
            rendered_messages: response.rendered_messages.to_string(),
            memory_saved: format!("{}%", response.memory_saved_percent),
            status: status_text(response.enabled).to_string(),
            active: response.enabled,
        }
    }

    /// Shown when the active page is one the host does not run on.
    pub fn not_applicable() -> Self {
        Self {
            total_messages: "0".into(),
            rendered_messages: "0".into(),
            memory_saved: "0%".into(),
            status: status_text(false).to_string(),
            active: false,
        }
    }
}

fn status_text(enabled: bool) -> &'static str {
    if enabled {
        "Active"
    } else {
        "Disabled"
    }
}
