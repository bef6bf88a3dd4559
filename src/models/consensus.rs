//! Consensus model — cross-bookmaker agreement
//!
//! Averages the line across every observed bookmaker for a market and backs
//! the consensus favorite. Confidence grows with the number of agreeing
//! books, capped at 0.95.

use crate::domain::{
    fair_probability, implied_probability, market, AnalysisResult, GameContext, ModelKind,
    OddsSnapshot, PickSide, PredictedPick, PropOdds,
};

use super::common::{home_spread_point, market_snapshots, moneyline_prices};
use super::{game_result, AnalysisModel};

#[derive(Debug)]
pub struct ConsensusModel;

const MAX_CONFIDENCE: f64 = 0.95;

fn count_confidence(books: usize) -> f64 {
    (0.55 + 0.05 * (books.saturating_sub(1)) as f64).min(MAX_CONFIDENCE)
}

impl AnalysisModel for ConsensusModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Consensus
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        // Prefer the spread consensus; fall back to the moneyline consensus
        let spreads = market_snapshots(odds, market::SPREADS);
        let points: Vec<f64> = spreads
            .iter()
            .filter_map(|s| home_spread_point(s, ctx))
            .collect();

        if points.len() >= 2 {
            let avg = points.iter().sum::<f64>() / points.len() as f64;
            // Round to the nearest half point, the granularity books quote in
            let line = (avg * 2.0).round() / 2.0;
            let side = if line < 0.0 { PickSide::Home } else { PickSide::Away };
            let confidence = count_confidence(points.len());
            let reasoning = format!(
                "{} bookmakers average a {:+.1} home spread",
                points.len(),
                avg
            );
            return Some(game_result(
                ctx,
                self.kind(),
                "consensus",
                PredictedPick::spread(side, line),
                confidence,
                reasoning,
            ));
        }

        let moneylines = market_snapshots(odds, market::H2H);
        let probs: Vec<f64> = moneylines
            .iter()
            .filter_map(|s| moneyline_prices(s, ctx))
            .map(|(home, away)| fair_probability(home, away))
            .collect();
        if probs.len() < 2 {
            return None;
        }

        let avg_prob = probs.iter().sum::<f64>() / probs.len() as f64;
        if (avg_prob - 0.5).abs() < 0.03 {
            // Books collectively see a coin flip
            return None;
        }

        let side = if avg_prob > 0.5 { PickSide::Home } else { PickSide::Away };
        let confidence = count_confidence(probs.len());
        let reasoning = format!(
            "{} bookmakers price the home side at {:.1}% fair probability",
            probs.len(),
            avg_prob * 100.0
        );
        Some(game_result(
            ctx,
            self.kind(),
            "consensus",
            PredictedPick::moneyline(side),
            confidence,
            reasoning,
        ))
    }

    fn analyze_prop_odds(&self, ctx: &GameContext, prop: &PropOdds) -> Option<AnalysisResult> {
        // A single prop market still carries a consensus in its pricing:
        // the shaded side is the one the book expects action to confirm.
        let over_prob = implied_probability(prop.over_price);
        let under_prob = implied_probability(prop.under_price);
        let total = over_prob + under_prob;
        if total <= 0.0 {
            return None;
        }
        let fair_over = over_prob / total;
        if (fair_over - 0.5).abs() < 0.05 {
            return None;
        }

        let side = if fair_over > 0.5 { PickSide::Over } else { PickSide::Under };
        let confidence = (0.55 + (fair_over - 0.5).abs()).min(0.7);
        let reasoning = format!(
            "{} line {:.1} shaded to {:.1}% over",
            prop.market_key,
            prop.line,
            fair_over * 100.0
        );
        Some(super::prop_result(
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
    use crate::domain::{GameInfo, OddsOutcome, Sport};
    use chrono::{Duration, Utc};

    fn ctx() -> GameContext {
        GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now() + Duration::hours(4),
        })
    }

    fn spread(book: &str, home_point: f64) -> OddsSnapshot {
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
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_spread_consensus_backs_home_favorite() {
        let odds = vec![spread("a", -5.5), spread("b", -6.0), spread("c", -5.5)];
        let result = ConsensusModel.analyze_game_odds(&ctx(), &odds).unwrap();
        assert_eq!(result.pick.side, PickSide::Home);
        assert!(result.prediction.starts_with("Lakers"));
        // Three books: 0.55 + 0.10
        assert!((result.confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_caps_at_095() {
        let odds: Vec<OddsSnapshot> = (0..12)
            .map(|i| spread(&format!("book{i:02}"), -4.5))
            .collect();
        let result = ConsensusModel.analyze_game_odds(&ctx(), &odds).unwrap();
        assert!(result.confidence <= 0.95);
    }

    #[test]
    fn test_single_book_is_insufficient() {
        let odds = vec![spread("a", -5.5)];
        assert!(ConsensusModel.analyze_game_odds(&ctx(), &odds).is_none());
    }

    #[test]
    fn test_prop_shading_picks_over() {
        let prop = PropOdds {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            player_name: "LeBron James".to_string(),
            market_key: "player_points".to_string(),
            line: 25.5,
            over_price: -150.0,
            under_price: 120.0,
            commence_time: Utc::now(),
        };
        let result = ConsensusModel.analyze_prop_odds(&ctx(), &prop).unwrap();
        assert_eq!(result.pick.side, PickSide::Over);
        assert!(result.confidence <= 1.0 && result.confidence >= 0.0);
    }
}
