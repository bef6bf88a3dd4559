//! Line-drift signal
//!
//! Reads the game's spread history (one bookmaker is enough) and scores the
//! side the market has been moving toward.

use crate::domain::{market, GameContext, OddsSnapshot};

use super::{Evaluator, NEUTRAL};

#[derive(Debug)]
pub struct OddsMovementEvaluator;

impl Evaluator for OddsMovementEvaluator {
    fn key(&self) -> &'static str {
        "odds_movement"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        let Some(movement) = spread_movement(ctx) else {
            return NEUTRAL;
        };

        // Home line dropping (toward a bigger home handicap) means money on
        // the home side. Two points of drift saturates the signal.
        (NEUTRAL - movement * 0.15).clamp(0.2, 0.8)
    }
}

/// Newest minus oldest home spread point across the observed history.
/// Requires at least two observations of the same (bookmaker, market).
fn spread_movement(ctx: &GameContext) -> Option<f64> {
    let home = &ctx.game.home_team;
    let spreads: Vec<&OddsSnapshot> = ctx
        .odds_history
        .iter()
        .filter(|s| s.market_key == market::SPREADS)
        .collect();

    let oldest = spreads.first()?;
    let newest = spreads.last()?;
    if oldest.observed_at == newest.observed_at {
        return None;
    }

    let oldest_point = oldest.outcome(home)?.point?;
    let newest_point = newest.outcome(home)?.point?;
    Some(newest_point - oldest_point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameInfo, OddsOutcome, Sport};
    use chrono::{Duration, Utc};

    fn spread_snapshot(home_point: f64, minutes_ago: i64) -> OddsSnapshot {
        OddsSnapshot {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            market_key: market::SPREADS.to_string(),
            outcomes: vec![
                OddsOutcome {
                    name: "Lakers".to_string(),
                    price: -110.0,
                    point: Some(home_point),
                },
                OddsOutcome {
                    name: "Warriors".to_string(),
                    price: -110.0,
                    point: Some(-home_point),
                },
            ],
            commence_time: Utc::now() + Duration::hours(4),
            observed_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn ctx_with_history(history: Vec<OddsSnapshot>) -> GameContext {
        let mut ctx = GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now() + Duration::hours(4),
        });
        ctx.odds_history = history;
        ctx
    }

    #[test]
    fn test_line_moving_toward_home_scores_home() {
        // -4.5 opening, -6.0 now: market backing the home side
        let ctx = ctx_with_history(vec![spread_snapshot(-4.5, 120), spread_snapshot(-6.0, 5)]);
        assert!(OddsMovementEvaluator.evaluate(&ctx) > NEUTRAL);
    }

    #[test]
    fn test_line_moving_away_scores_away() {
        let ctx = ctx_with_history(vec![spread_snapshot(-6.0, 120), spread_snapshot(-4.0, 5)]);
        assert!(OddsMovementEvaluator.evaluate(&ctx) < NEUTRAL);
    }

    #[test]
    fn test_single_observation_is_neutral() {
        let ctx = ctx_with_history(vec![spread_snapshot(-4.5, 5)]);
        assert_eq!(OddsMovementEvaluator.evaluate(&ctx), NEUTRAL);
    }

    #[test]
    fn test_no_history_is_neutral() {
        let ctx = ctx_with_history(vec![]);
        assert_eq!(OddsMovementEvaluator.evaluate(&ctx), NEUTRAL);
    }
}
