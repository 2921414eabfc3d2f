use clap::{Subcommand, ValueEnum};
use nudge_core::error::{ConfigError, Result};
use nudge_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the popup toggles: nudging and debug logging
    Status,
    /// Turn nudging on
    Enable,
    /// Turn nudging off; activity is still tracked
    Disable,
    /// Turn debug logging on or off
    Debug {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Get a value by dotted key (e.g. "throttle.window_minutes")
    Get { key: String },
    /// Set a value by dotted key; rejected if it leaves the config invalid
    Set { key: String, value: String },
    /// Print the whole config as TOML
    List,
    /// Print the config file location
    Path,
    /// Reset config to defaults
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        matches!(toggle, Toggle::On)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Status => {
            let settings = Config::load()?.settings;
            println!("nudges: {}", on_off(settings.enabled));
            println!("debug:  {}", on_off(settings.debug));
        }
        ConfigAction::Enable | ConfigAction::Disable => {
            let enabled = matches!(action, ConfigAction::Enable);
            let mut config = Config::load()?;
            config.settings.enabled = enabled;
            config.save()?;
            println!("nudges: {}", on_off(enabled));
        }
        ConfigAction::Debug { state } => {
            let mut config = Config::load()?;
            config.settings.debug = state.into();
            config.save()?;
            println!("debug:  {}", on_off(config.settings.debug));
        }
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let toml = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
            print!("{toml}");
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
