//! Head-to-head history signal

use crate::domain::GameContext;

use super::{Evaluator, NEUTRAL};

/// Scores the home team's historical record against this opponent,
/// dampened toward neutral for the small samples h2h data always is.
#[derive(Debug)]
pub struct HeadToHeadEvaluator;

impl Evaluator for HeadToHeadEvaluator {
    fn key(&self) -> &'static str {
        "head_to_head"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        let Some(rate) = ctx
            .head_to_head
            .as_ref()
            .and_then(|h2h| h2h.home_win_rate())
        else {
            return NEUTRAL;
        };

        NEUTRAL + (rate - NEUTRAL) * 0.6
    }
}
