pub mod config;
pub mod simulate;
pub mod stats;
pub mod throttle;
