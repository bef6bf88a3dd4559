//! Command-line interface definitions

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "oddsmith")]
#[command(about = "Multi-model sports betting prediction and verification engine")]
#[command(version)]
pub struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered analysis models and evaluators
    Models,

    /// Generate predictions for a sport's upcoming games
    Generate {
        /// Sport key (nba, nfl, mlb, nhl)
        #[arg(long)]
        sport: String,
        /// How many days ahead to scan
        #[arg(long, default_value_t = 3)]
        days: i64,
    },

    /// Grade stored predictions against a final score
    Verify {
        #[arg(long)]
        sport: String,
        #[arg(long)]
        game_id: String,
        #[arg(long)]
        home_team: String,
        #[arg(long)]
        away_team: String,
        #[arg(long)]
        home_score: i32,
        #[arg(long)]
        away_score: i32,
    },

    /// Show dynamic model weights for a sport and bet type
    Weights {
        #[arg(long)]
        sport: String,
        /// Bet type (spread, total, moneyline, player_prop)
        #[arg(long, default_value = "moneyline")]
        bet_type: String,
    },

    /// Replay a user model over historical games
    Backtest {
        #[arg(long)]
        user: String,
        #[arg(long)]
        model: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },

    /// Run a user model against upcoming games
    Execute {
        #[arg(long)]
        user: String,
        #[arg(long)]
        model: String,
        #[arg(long, default_value_t = 3)]
        days: i64,
    },
}
