//! TOML-based nudge configuration.
//!
//! Stores:
//! - User settings (`enabled`, `debug`)
//! - The throttle window
//! - Milestone policy (activity floor, milestone step)
//! - Presentation timings
//! - Notification copy and target link
//! - Particle settings
//!
//! Configuration is stored at `~/.config/nudge/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{data_dir, CONFIG_FILE};
use crate::error::ConfigError;
use crate::particles::ParticleConfig;

/// User-facing toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub debug: bool,
}

/// Rate limit shared by every trigger kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,
}

/// Milestone policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneConfig {
    /// Activity floor for the threshold and late-trigger nudges.
    #[serde(default = "default_min_activity")]
    pub min_activity: u64,
    /// Milestones are the positive multiples of this.
    #[serde(default = "default_milestone_step")]
    pub step: u64,
}

/// Presentation timings in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_auto_close_ms")]
    pub auto_close_ms: u64,
    /// Auto-close delay re-armed when the pointer leaves. Shorter than `auto_close_ms`.
    #[serde(default = "default_hover_resume_ms")]
    pub hover_resume_ms: u64,
    #[serde(default = "default_ambient_period_ms")]
    pub ambient_period_ms: u64,
    #[serde(default = "default_entrance_ms")]
    pub entrance_ms: u64,
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,
    /// Delay between a primary action and the target action.
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,
}

/// Notification copy. `{count}` in the header template is replaced by the
/// activity figure being celebrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    #[serde(default = "default_header_template")]
    pub header_template: String,
    #[serde(default = "default_body")]
    pub body: String,
    #[serde(default = "default_target_url")]
    pub target_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/nudge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub milestones: MilestoneConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub copy: CopyConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_window_minutes() -> u64 {
    10
}
fn default_min_activity() -> u64 {
    50
}
fn default_milestone_step() -> u64 {
    100
}
fn default_auto_close_ms() -> u64 {
    8_000
}
fn default_hover_resume_ms() -> u64 {
    5_000
}
fn default_ambient_period_ms() -> u64 {
    800
}
fn default_entrance_ms() -> u64 {
    400
}
fn default_fade_out_ms() -> u64 {
    250
}
fn default_action_delay_ms() -> u64 {
    400
}
fn default_header_template() -> String {
    "High Five! ✋ {count}+ messages lag-free in this chat!".into()
}
fn default_body() -> String {
    "Loving my free extension? Keep it free & fast. Buy me a beer! 🍻".into()
}
fn default_target_url() -> String {
    "https://ko-fi.com/bramgiessen".into()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
        }
    }
}

impl ThrottleConfig {
    pub fn window_ms(&self) -> u64 {
        self.window_minutes.saturating_mul(60 * 1000)
    }
}

impl Default for MilestoneConfig {
    fn default() -> Self {
        Self {
            min_activity: default_min_activity(),
            step: default_milestone_step(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            auto_close_ms: default_auto_close_ms(),
            hover_resume_ms: default_hover_resume_ms(),
            ambient_period_ms: default_ambient_period_ms(),
            entrance_ms: default_entrance_ms(),
            fade_out_ms: default_fade_out_ms(),
            action_delay_ms: default_action_delay_ms(),
        }
    }
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            header_template: default_header_template(),
            body: default_body(),
            target_url: default_target_url(),
        }
    }
}

impl CopyConfig {
    /// Render the header template for `count`.
    pub fn header_for(&self, count: u64) -> String {
        self.header_template.replace("{count}", &count.to_string())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Unset optionals take whatever JSON the value parses as.
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<data_dir>/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(CONFIG_FILE),
            message: e.to_string(),
        })?;
        Ok(dir.join(CONFIG_FILE))
    }

    /// Load from the default location, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults there if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.milestones.step == 0 {
            return Err(invalid("milestones.step", "must be greater than zero"));
        }
        if self.presentation.ambient_period_ms == 0 {
            return Err(invalid(
                "presentation.ambient_period_ms",
                "must be greater than zero",
            ));
        }
        if self.presentation.hover_resume_ms >= self.presentation.auto_close_ms {
            return Err(invalid(
                "presentation.hover_resume_ms",
                "must be shorter than presentation.auto_close_ms",
            ));
        }
        url::Url::parse(&self.copy.target_url)
            .map_err(|e| invalid("copy.target_url", &e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key, keeping the config valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or leaves the config invalid. On error `self` is unchanged.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.settings.enabled);
        assert!(!parsed.settings.debug);
        assert_eq!(parsed.throttle.window_minutes, 10);
        assert_eq!(parsed.particles.seed, None);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.milestones.min_activity, 50);
        assert_eq!(parsed.milestones.step, 100);
        assert_eq!(parsed.presentation.auto_close_ms, 8_000);
        assert_eq!(parsed.presentation.hover_resume_ms, 5_000);
        assert_eq!(parsed.particles.burst_count, 50);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let parsed: Config = toml::from_str("[settings]\ndebug = true\n").unwrap();
        assert!(parsed.settings.enabled);
        assert!(parsed.settings.debug);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("settings.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("throttle.window_minutes").as_deref(), Some("10"));
        assert!(cfg.get("settings.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_bool() {
        let mut cfg = Config::default();
        cfg.apply("settings.debug", "true").unwrap();
        assert!(cfg.settings.debug);
    }

    #[test]
    fn apply_sets_unset_optional() {
        let mut cfg = Config::default();
        cfg.apply("particles.seed", "42").unwrap();
        assert_eq!(cfg.particles.seed, Some(42));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("settings.nonexistent", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("settings.enabled", "not_a_bool").is_err());
        assert!(cfg.apply("throttle.window_minutes", "-3").is_err());
        assert!(cfg.settings.enabled);
    }

    #[test]
    fn apply_rejects_hover_longer_than_auto_close() {
        let mut cfg = Config::default();
        let result = cfg.apply("presentation.hover_resume_ms", "9000");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.presentation.hover_resume_ms, 5_000);
    }

    #[test]
    fn apply_rejects_bad_target_url() {
        let mut cfg = Config::default();
        assert!(cfg.apply("copy.target_url", "not a url").is_err());
        cfg.apply("copy.target_url", "https://example.com/support").unwrap();
        assert_eq!(cfg.copy.target_url, "https://example.com/support");
    }

    #[test]
    fn header_template_substitutes_count() {
        let copy = CopyConfig::default();
        assert_eq!(copy.header_for(200), "High Five! ✋ 200+ messages lag-free in this chat!");
    }

    #[test]
    fn window_minutes_to_ms() {
        assert_eq!(ThrottleConfig::default().window_ms(), 600_000);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert!(cfg.settings.enabled);
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.apply("settings.enabled", "false").unwrap();
        cfg.apply("milestones.step", "250").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.settings.enabled);
        assert_eq!(loaded.milestones.step, 250);
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[milestones]\nstep = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
