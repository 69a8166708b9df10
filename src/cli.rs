use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Parser, Serialize)]
#[command(name = "kstreet", about = "Leaderboard for the Kstreet challenge spreadsheet")]
pub struct Cli {
    #[command(subcommand)]
    #[serde(skip)]
    pub command: Option<Command>,

    /// Identifier of the published spreadsheet
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,

    /// Minutes a fetched feed is served from the local snapshot
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_minutes: Option<u64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show podium, rankings, challenges, latest completions and stats (default)
    Board {
        /// Number of rankings shown below the podium
        #[arg(long)]
        top: Option<usize>,
        /// Print the podium and rankings as an HTML fragment
        #[arg(long)]
        html: bool,
    },
    /// Install and activate the offline asset cache for the site
    Precache,
}

impl Default for Command {
    fn default() -> Self {
        Command::Board {
            top: None,
            html: false,
        }
    }
}
