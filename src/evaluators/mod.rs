//! Signal evaluators
//!
//! Pure functions `GameContext -> score ∈ [0, 1]`. Above 0.5 favors the home
//! (or over) side, below favors away (or under), 0.5 means no signal. The
//! load-bearing contract: **missing data degrades to exactly 0.5** — weighted
//! composition over evaluators can then never divide by zero or see NaN.
//!
//! Both `UserModelExecutor` and `BacktestEngine` consume evaluators through
//! the string-keyed registry, so a new signal plugs into live scoring and
//! backtesting at once.

use crate::domain::GameContext;
use crate::error::{EngineError, Result};

pub mod head_to_head;
pub mod odds_movement;
pub mod player_injury;
pub mod player_stats;
pub mod recent_form;
pub mod rest_schedule;
pub mod team_stats;

pub use head_to_head::HeadToHeadEvaluator;
pub use odds_movement::OddsMovementEvaluator;
pub use player_injury::PlayerInjuryEvaluator;
pub use player_stats::PlayerStatsEvaluator;
pub use recent_form::RecentFormEvaluator;
pub use rest_schedule::RestScheduleEvaluator;
pub use team_stats::TeamStatsEvaluator;

/// Neutral score: no signal, or no data
pub const NEUTRAL: f64 = 0.5;

/// One queryable signal
pub trait Evaluator: std::fmt::Debug + Send + Sync {
    /// Registry key, also the user-model data-source name
    fn key(&self) -> &'static str;

    /// Score the home/over side of this game. Must return exactly
    /// [`NEUTRAL`] when the data it needs is absent.
    fn evaluate(&self, ctx: &GameContext) -> f64;
}

/// Registry keys of all built-in evaluators
pub const EVALUATOR_KEYS: [&str; 7] = [
    "team_stats",
    "odds_movement",
    "recent_form",
    "rest_schedule",
    "head_to_head",
    "player_stats",
    "player_injury",
];

/// All built-in evaluators
pub fn all_evaluators() -> Vec<Box<dyn Evaluator>> {
    vec![
        Box::new(TeamStatsEvaluator),
        Box::new(OddsMovementEvaluator),
        Box::new(RecentFormEvaluator),
        Box::new(RestScheduleEvaluator),
        Box::new(HeadToHeadEvaluator),
        Box::new(PlayerStatsEvaluator),
        Box::new(PlayerInjuryEvaluator),
    ]
}

/// Look up one evaluator by registry key
pub fn evaluator_for(key: &str) -> Result<Box<dyn Evaluator>> {
    match key {
        "team_stats" => Ok(Box::new(TeamStatsEvaluator)),
        "odds_movement" => Ok(Box::new(OddsMovementEvaluator)),
        "recent_form" => Ok(Box::new(RecentFormEvaluator)),
        "rest_schedule" => Ok(Box::new(RestScheduleEvaluator)),
        "head_to_head" => Ok(Box::new(HeadToHeadEvaluator)),
        "player_stats" => Ok(Box::new(PlayerStatsEvaluator)),
        "player_injury" => Ok(Box::new(PlayerInjuryEvaluator)),
        _ => Err(EngineError::UnknownEvaluator {
            name: key.to_string(),
        }),
    }
}
