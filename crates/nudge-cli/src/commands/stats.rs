use std::path::PathBuf;

use clap::Args;
use nudge_core::error::Result;
use nudge_core::stats::JsonFileStatsSource;
use nudge_core::{fetch_stats, StatsView};

#[derive(Args)]
pub struct StatsArgs {
    /// File holding the host's last `getStats` answer as JSON
    #[arg(long)]
    file: PathBuf,
    /// Print the panel figures as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> Result<()> {
    let source = JsonFileStatsSource::new(&args.file);
    let Some(response) = fetch_stats(&source) else {
        println!("no stats available");
        return Ok(());
    };

    let view = StatsView::from_response(&response);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Total messages:    {}", view.total_messages);
        println!("Rendered messages: {}", view.rendered_messages);
        println!("Memory saved:      {}", view.memory_saved);
        println!("Status:            {}", view.status);
    }
    Ok(())
}
