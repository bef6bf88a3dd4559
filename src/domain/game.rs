//! Game records and the evaluator/model input context
//!
//! `GameContext` bundles everything the heuristics may consult for one game.
//! Every block beyond the game info is optional: absence of data degrades a
//! signal to neutral, it never raises.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::odds::{OddsSnapshot, Sport};

/// Scheduled game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
}

/// Final result of a completed game — the verification trigger input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFinal {
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i32,
    pub away_score: i32,
    pub completed_at: DateTime<Utc>,
}

impl GameFinal {
    pub fn combined_score(&self) -> i32 {
        self.home_score + self.away_score
    }

    pub fn winner(&self) -> &str {
        if self.home_score >= self.away_score {
            &self.home_team
        } else {
            &self.away_team
        }
    }
}

/// Season per-game statistics for one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team: String,
    pub games_played: u32,
    pub avg_points_scored: f64,
    pub avg_points_allowed: f64,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
    pub home_win_pct: f64,
    pub away_win_pct: f64,
}

/// Trailing results for one team, most recent first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamForm {
    pub team: String,
    /// true = win, most recent first; at most the trailing 10 games
    pub results: Vec<bool>,
}

impl TeamForm {
    pub fn win_rate(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let wins = self.results.iter().filter(|w| **w).count();
        Some(wins as f64 / self.results.len() as f64)
    }
}

/// Rest and schedule situation for one team going into a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestProfile {
    pub team: String,
    pub rest_days: u32,
    pub back_to_back: bool,
}

/// Head-to-head history between the two teams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadToHead {
    pub home_team: String,
    pub away_team: String,
    /// Meetings counted from the home team's perspective
    pub home_wins: u32,
    pub away_wins: u32,
    pub avg_total_points: f64,
}

impl HeadToHead {
    pub fn meetings(&self) -> u32 {
        self.home_wins + self.away_wins
    }

    pub fn home_win_rate(&self) -> Option<f64> {
        let total = self.meetings();
        if total == 0 {
            return None;
        }
        Some(self.home_wins as f64 / total as f64)
    }
}

/// Player availability designations, worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InjuryStatus {
    Out,
    Doubtful,
    Questionable,
    Probable,
    Available,
}

impl InjuryStatus {
    /// Whether the player should be assumed absent
    pub fn is_sidelined(self) -> bool {
        matches!(self, Self::Out | Self::Doubtful)
    }
}

/// One player's availability going into a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryReport {
    pub player_name: String,
    pub team: String,
    pub status: InjuryStatus,
    pub avg_minutes: Option<f64>,
}

/// Recent production for the player a prop market prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerContext {
    pub player_name: String,
    pub team: String,
    /// Trailing per-game averages keyed by stat code (PTS, REB, AST, ...)
    pub recent_averages: std::collections::HashMap<String, f64>,
    pub status: Option<InjuryStatus>,
    /// Prop market under evaluation, when this context wraps a prop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_line: Option<f64>,
}

/// Actual single-game stat line, consulted when grading props
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerGameStat {
    pub game_id: String,
    pub player_name: String,
    /// Stat values keyed by stat code (PTS, REB, AST, ...)
    pub stats: std::collections::HashMap<String, f64>,
}

/// Everything the evaluators and stat-driven models may consult for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContext {
    pub game: GameInfo,
    pub home_stats: Option<TeamSeasonStats>,
    pub away_stats: Option<TeamSeasonStats>,
    pub home_form: Option<TeamForm>,
    pub away_form: Option<TeamForm>,
    pub home_rest: Option<RestProfile>,
    pub away_rest: Option<RestProfile>,
    pub head_to_head: Option<HeadToHead>,
    pub injuries: Vec<InjuryReport>,
    /// Snapshots for this game ordered by observation time, oldest first
    pub odds_history: Vec<OddsSnapshot>,
    pub player: Option<PlayerContext>,
}

impl GameContext {
    /// A context carrying nothing but the schedule entry
    pub fn bare(game: GameInfo) -> Self {
        Self {
            game,
            home_stats: None,
            away_stats: None,
            home_form: None,
            away_form: None,
            home_rest: None,
            away_rest: None,
            head_to_head: None,
            injuries: Vec::new(),
            odds_history: Vec::new(),
            player: None,
        }
    }

    /// Injury reports for one of the two teams
    pub fn injuries_for<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a InjuryReport> + 'a {
        self.injuries.iter().filter(move |r| r.team == team)
    }

    /// Calendar date of the game, used for historical range keys
    pub fn game_date(&self) -> NaiveDate {
        self.game.commence_time.date_naive()
    }
}
