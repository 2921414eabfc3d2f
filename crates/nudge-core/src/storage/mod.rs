//! On-disk layout.
//!
//! Everything the nudge keeps between sessions lives in one directory:
//!
//! ```text
//! ~/.config/nudge/          (~/.config/nudge-dev/ with NUDGE_ENV=dev)
//!   config.toml             settings, throttle window, timings, copy
//!   throttle.json           last presentation, see FileThrottleStore
//! ```

mod config;

pub use config::{
    Config, CopyConfig, MilestoneConfig, PresentationConfig, SettingsConfig, ThrottleConfig,
};

use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub const CONFIG_FILE: &str = "config.toml";
pub const THROTTLE_FILE: &str = "throttle.json";

/// Resolve and create the data directory.
///
/// # Errors
/// Returns [`StorageError::Io`] if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let env = std::env::var("NUDGE_ENV").ok();
    let dir = data_dir_in(&home, env.as_deref());

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Data directory under `home` for the given `NUDGE_ENV` value.
fn data_dir_in(home: &Path, env: Option<&str>) -> PathBuf {
    let name = match env {
        Some("dev") => "nudge-dev",
        _ => "nudge",
    };
    home.join(".config").join(name)
}
