//! Value model — low-vig and mispriced markets
//!
//! Flags markets where the two-sided implied probability sum is unusually
//! low. Under 6% vig is a strong value signal, 6–8% moderate; anything else
//! publishes only when one side's fair probability clears 0.55.

use crate::domain::{
    fair_probability, market, vig, AnalysisResult, GameContext, ModelKind, OddsSnapshot, PickSide,
    PredictedPick, PropOdds,
};

use super::common::{market_snapshots, moneyline_prices};
use super::{game_result, prop_result, AnalysisModel};

#[derive(Debug)]
pub struct ValueModel;

const LOW_VIG: f64 = 0.06;
const MODERATE_VIG: f64 = 0.08;
const FAIR_PROB_FLOOR: f64 = 0.55;

/// Confidence ladder for a two-sided market. None = no value to publish.
fn value_confidence(market_vig: f64, fair_prob_best: f64) -> Option<f64> {
    if market_vig < LOW_VIG {
        Some(0.8)
    } else if market_vig < MODERATE_VIG {
        Some(0.65)
    } else if fair_prob_best > FAIR_PROB_FLOOR {
        Some(0.6)
    } else {
        None
    }
}

impl AnalysisModel for ValueModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Value
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        // Scan books in deterministic order and take the lowest-vig market
        let mut best: Option<(&OddsSnapshot, f64, f64)> = None;
        for snapshot in market_snapshots(odds, market::H2H) {
            let (home_price, away_price) = match moneyline_prices(snapshot, ctx) {
                Some(prices) => prices,
                None => continue,
            };
            let market_vig = vig(home_price, away_price);
            let fair_home = fair_probability(home_price, away_price);
            let better = match &best {
                Some((_, best_vig, _)) => market_vig < *best_vig,
                None => true,
            };
            if better {
                best = Some((snapshot, market_vig, fair_home));
            }
        }

        let (snapshot, market_vig, fair_home) = best?;
        let fair_best = fair_home.max(1.0 - fair_home);
        let confidence = value_confidence(market_vig, fair_best)?;

        let side = if fair_home >= 0.5 { PickSide::Home } else { PickSide::Away };
        let reasoning = format!(
            "{} holds {:.1}% vig; fair probability {:.1}%",
            snapshot.bookmaker,
            market_vig * 100.0,
            fair_best * 100.0
        );
        Some(game_result(
            ctx,
            self.kind(),
            &snapshot.bookmaker,
            PredictedPick::moneyline(side),
            confidence,
            reasoning,
        ))
    }

    fn analyze_prop_odds(&self, ctx: &GameContext, prop: &PropOdds) -> Option<AnalysisResult> {
        let market_vig = vig(prop.over_price, prop.under_price);
        let fair_over = fair_probability(prop.over_price, prop.under_price);
        let fair_best = fair_over.max(1.0 - fair_over);
        let confidence = value_confidence(market_vig, fair_best)?;

        let side = if fair_over >= 0.5 { PickSide::Over } else { PickSide::Under };
        let reasoning = format!(
            "{} {} at {:.1}% vig; fair over probability {:.1}%",
            prop.bookmaker,
            prop.market_key,
            market_vig * 100.0,
            fair_over * 100.0
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
