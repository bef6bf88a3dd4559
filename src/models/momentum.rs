//! Momentum model — line movement
//!
//! Compares the oldest and newest observed spread for the same market and
//! backs the side the line has moved toward. Confidence scales with the
//! magnitude of the move. Props carry no time series here, so sharp money is
//! inferred from price asymmetry instead.

use crate::domain::{
    AnalysisResult, GameContext, ModelKind, OddsSnapshot, PickSide, PredictedPick, PropOdds,
};

use super::common::{home_spread_point, spread_series};
use super::{game_result, prop_result, AnalysisModel};

#[derive(Debug)]
pub struct MomentumModel;

/// Price at or below which one side of a prop is considered sharp
const SHARP_PRICE: f64 = -120.0;

/// Confidence ladder by points of line movement
fn movement_confidence(magnitude: f64) -> f64 {
    if magnitude > 1.0 {
        0.8
    } else if magnitude > 0.5 {
        0.7
    } else {
        0.6
    }
}

impl AnalysisModel for MomentumModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Momentum
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        _odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        let series = spread_series(ctx);
        let oldest = series.first()?;
        let newest = series.last()?;

        let opening = home_spread_point(oldest, ctx)?;
        let current = home_spread_point(newest, ctx)?;
        let movement = current - opening;
        if movement.abs() < 0.25 {
            // Less than a quarter point is quoting noise, not momentum
            return None;
        }

        // Home line dropping means money arriving on the home side
        let side = if movement < 0.0 { PickSide::Home } else { PickSide::Away };
        let confidence = movement_confidence(movement.abs());
        let reasoning = format!(
            "line moved {:+.1} ({:+.1} to {:+.1}) at {}",
            movement, opening, current, newest.bookmaker
        );
        Some(game_result(
            ctx,
            self.kind(),
            &newest.bookmaker,
            PredictedPick::spread(side, current),
            confidence,
            reasoning,
        ))
    }

    fn analyze_prop_odds(&self, ctx: &GameContext, prop: &PropOdds) -> Option<AnalysisResult> {
        let over_sharp = prop.over_price <= SHARP_PRICE;
        let under_sharp = prop.under_price <= SHARP_PRICE;

        let (side, price) = match (over_sharp, under_sharp) {
            (true, false) => (PickSide::Over, prop.over_price),
            (false, true) => (PickSide::Under, prop.under_price),
            // Both shaded (pure vig) or neither: no directional read
            _ => return None,
        };

        // -120 reads as 0.6; deeper juice nudges the confidence up
        let confidence = (0.6 + (price.abs() - 120.0) / 400.0).min(0.75);
        let reasoning = format!(
            "sharp side priced {:+.0} on {} {:.1}",
            price, prop.market_key, prop.line
        );
        Some(prop_result(
            ctx,
            self.kind(),
            prop,
            PredictedPick::prop(side, prop.line),
            confidence,
            reasoning,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{market, GameInfo, OddsOutcome, Sport};
    use chrono::{Duration, Utc};

    fn spread(book: &str, home_point: f64, minutes_ago: i64) -> OddsSnapshot {
        OddsSnapshot {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: book.to_string(),
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

    fn prop(over_price: f64, under_price: f64) -> PropOdds {
        PropOdds {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            player_name: "LeBron James".to_string(),
            market_key: "player_points".to_string(),
            line: 25.5,
            over_price,
            under_price,
            commence_time: Utc::now(),
        }
    }

    #[test]
    fn test_big_move_toward_home() {
        let ctx = ctx_with_history(vec![spread("pin", -4.0, 240), spread("pin", -5.5, 5)]);
        let result = MomentumModel.analyze_game_odds(&ctx, &[]).unwrap();
        assert_eq!(result.pick.side, PickSide::Home);
        assert!((result.confidence - 0.8).abs() < 1e-9, "move of 1.5 points");
        assert_eq!(result.pick.line, Some(-5.5));
    }

    #[test]
    fn test_moderate_move_toward_away() {
        let ctx = ctx_with_history(vec![spread("pin", -5.5, 240), spread("pin", -4.75, 5)]);
        let result = MomentumModel.analyze_game_odds(&ctx, &[]).unwrap();
        assert_eq!(result.pick.side, PickSide::Away);
        assert!((result.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_flat_line_is_none() {
        let ctx = ctx_with_history(vec![spread("pin", -5.5, 240), spread("pin", -5.5, 5)]);
        assert!(MomentumModel.analyze_game_odds(&ctx, &[]).is_none());
    }

    #[test]
    fn test_no_history_is_none() {
        let ctx = ctx_with_history(vec![]);
        assert!(MomentumModel.analyze_game_odds(&ctx, &[]).is_none());
    }

    #[test]
    fn test_prop_sharp_over() {
        let ctx = ctx_with_history(vec![]);
        let result = MomentumModel.analyze_prop_odds(&ctx, &prop(-130.0, 100.0)).unwrap();
        assert_eq!(result.pick.side, PickSide::Over);
        assert!(result.confidence >= 0.6);
    }

    #[test]
    fn test_prop_both_sides_juiced_is_none() {
        let ctx = ctx_with_history(vec![]);
        assert!(MomentumModel.analyze_prop_odds(&ctx, &prop(-125.0, -125.0)).is_none());
    }
}
