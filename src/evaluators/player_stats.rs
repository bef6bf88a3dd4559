//! Player production vs. prop line signal
//!
//! Only meaningful when the context wraps a prop market; game contexts carry
//! no player block and score neutral.

use crate::domain::{stat_code_for_market, GameContext};

use super::{Evaluator, NEUTRAL};

#[derive(Debug)]
pub struct PlayerStatsEvaluator;

impl Evaluator for PlayerStatsEvaluator {
    fn key(&self) -> &'static str {
        "player_stats"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        let Some(player) = &ctx.player else {
            return NEUTRAL;
        };
        let (Some(market), Some(line)) = (player.prop_market.as_deref(), player.prop_line) else {
            return NEUTRAL;
        };
        let Some(stat) = stat_code_for_market(market) else {
            return NEUTRAL;
        };
        let Some(average) = player.recent_averages.get(stat).copied() else {
            return NEUTRAL;
        };
        if line <= 0.0 {
            return NEUTRAL;
        }

        // Average 20% above the line saturates toward the over
        let edge = (average - line) / line;
        (NEUTRAL + edge * 2.0).clamp(0.1, 0.9)
    }
}
