//! HotCold model — streaking and slumping teams
//!
//! Boosts a team's trailing win rate by ×1.2 when it has won at least 70% of
//! its recent games and dampens by ×0.8 when it has lost at least 70%, then
//! buckets confidence by the size of the adjusted gap.

use crate::domain::{
    stat_code_for_market, AnalysisResult, GameContext, ModelKind, OddsSnapshot, PickSide,
    PredictedPick, PropOdds,
};

use super::{game_result, prop_result, AnalysisModel, INTERNAL_BOOK};

#[derive(Debug)]
pub struct HotColdModel;

const HOT_THRESHOLD: f64 = 0.7;
const HOT_BOOST: f64 = 1.2;
const COLD_DAMPEN: f64 = 0.8;

/// Win rate adjusted for streaks, clamped back into [0, 1]
fn form_score(win_rate: f64) -> f64 {
    let adjusted = if win_rate >= HOT_THRESHOLD {
        win_rate * HOT_BOOST
    } else if win_rate <= 1.0 - HOT_THRESHOLD {
        win_rate * COLD_DAMPEN
    } else {
        win_rate
    };
    adjusted.clamp(0.0, 1.0)
}

/// Confidence buckets by differential magnitude
fn bucket_confidence(differential: f64) -> Option<f64> {
    let magnitude = differential.abs();
    if magnitude >= 0.3 {
        Some(0.75)
    } else if magnitude >= 0.15 {
        Some(0.65)
    } else if magnitude >= 0.05 {
        Some(0.55)
    } else {
        None
    }
}

impl AnalysisModel for HotColdModel {
    fn kind(&self) -> ModelKind {
        ModelKind::HotCold
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        _odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        let home_rate = ctx.home_form.as_ref().and_then(|f| f.win_rate())?;
        let away_rate = ctx.away_form.as_ref().and_then(|f| f.win_rate())?;

        let home_score = form_score(home_rate);
        let away_score = form_score(away_rate);
        let differential = home_score - away_score;
        let confidence = bucket_confidence(differential)?;

        let side = if differential > 0.0 { PickSide::Home } else { PickSide::Away };
        let reasoning = format!(
            "form {:.0}% vs {:.0}% (adjusted {:.2} vs {:.2})",
            home_rate * 100.0,
            away_rate * 100.0,
            home_score,
            away_score
        );
        Some(game_result(
            ctx,
            self.kind(),
            INTERNAL_BOOK,
            PredictedPick::moneyline(side),
            confidence,
            reasoning,
        ))
    }

    fn analyze_prop_odds(&self, ctx: &GameContext, prop: &PropOdds) -> Option<AnalysisResult> {
        // A player's hot streak is their recent average running past the line
        let player = ctx.player.as_ref()?;
        let stat = stat_code_for_market(&prop.market_key)?;
        let average = player.recent_averages.get(stat).copied()?;
        if prop.line <= 0.0 {
            return None;
        }

        let differential = (average - prop.line) / prop.line;
        let confidence = bucket_confidence(differential * 2.0)?;

        let side = if differential > 0.0 { PickSide::Over } else { PickSide::Under };
        let reasoning = format!(
            "recent {stat} average {:.1} against a {:.1} line",
            average, prop.line
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
