//! Trailing-record signal

use crate::domain::GameContext;

use super::{Evaluator, NEUTRAL};

/// Scores the win-rate gap over each team's trailing games.
#[derive(Debug)]
pub struct RecentFormEvaluator;

impl Evaluator for RecentFormEvaluator {
    fn key(&self) -> &'static str {
        "recent_form"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        let home_rate = ctx.home_form.as_ref().and_then(|f| f.win_rate());
        let away_rate = ctx.away_form.as_ref().and_then(|f| f.win_rate());

        match (home_rate, away_rate) {
            (Some(home), Some(away)) => (NEUTRAL + (home - away) / 2.0).clamp(0.0, 1.0),
            _ => NEUTRAL,
        }
    }
}
