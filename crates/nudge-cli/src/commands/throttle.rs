use clap::Subcommand;
use nudge_core::clock::to_datetime;
use nudge_core::error::Result;
use nudge_core::{Clock, Config, FileThrottleStore, SystemClock, Throttle, ThrottleDecision};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ThrottleAction {
    /// Show when a nudge was last presented and whether one may show now
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the last presentation so the next nudge may show at once
    Clear,
}

#[derive(Serialize)]
struct ThrottleStatus {
    last_shown: Option<chrono::DateTime<chrono::Utc>>,
    window_minutes: u64,
    allowed: bool,
    remaining_ms: u64,
}

fn open_throttle(config: &Config) -> Result<Throttle> {
    let store = FileThrottleStore::open_default()?;
    Ok(Throttle::new(Box::new(store), config.throttle.window_ms()))
}

pub fn run(action: ThrottleAction) -> Result<()> {
    let config = Config::load()?;
    let mut throttle = open_throttle(&config)?;

    match action {
        ThrottleAction::Status { json } => {
            let remaining_ms = match throttle.check(SystemClock.now_ms()) {
                ThrottleDecision::Allowed => 0,
                ThrottleDecision::Limited { remaining_ms } => remaining_ms,
            };
            let status = ThrottleStatus {
                last_shown: throttle.last_shown_ms().map(to_datetime),
                window_minutes: config.throttle.window_minutes,
                allowed: remaining_ms == 0,
                remaining_ms,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                match status.last_shown {
                    Some(at) => println!("last shown: {}", at.to_rfc3339()),
                    None => println!("last shown: never"),
                }
                println!("window:     {} min", status.window_minutes);
                if status.allowed {
                    println!("status:     allowed");
                } else {
                    println!("status:     limited ({}s remaining)", remaining_ms.div_ceil(1000));
                }
            }
        }
        ThrottleAction::Clear => {
            throttle.clear()?;
            println!("throttle cleared");
        }
    }
    Ok(())
}
