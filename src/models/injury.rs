//! InjuryAware model — roster availability
//!
//! Weights each sidelined player by average minutes into a team impact score
//! and backs the healthier side. A prop on a player who is Out or Doubtful
//! gets a hard AVOID at 0.9 instead of a directional pick.

use crate::domain::{
    AnalysisResult, BetKind, GameContext, ModelKind, OddsSnapshot, PickSide, PredictedPick,
    PropOdds,
};
use crate::evaluators::player_injury::team_injury_impact;

use super::{game_result, prop_result, AnalysisModel, INTERNAL_BOOK};

#[derive(Debug)]
pub struct InjuryAwareModel;

/// Minimum impact gap between the rosters worth publishing
const MIN_IMPACT_GAP: f64 = 0.2;

impl AnalysisModel for InjuryAwareModel {
    fn kind(&self) -> ModelKind {
        ModelKind::InjuryAware
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        _odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        if ctx.injuries.is_empty() {
            return None;
        }

        let home_impact = team_injury_impact(ctx.injuries_for(&ctx.game.home_team));
        let away_impact = team_injury_impact(ctx.injuries_for(&ctx.game.away_team));
        let gap = away_impact - home_impact;
        if gap.abs() < MIN_IMPACT_GAP {
            return None;
        }

        let side = if gap > 0.0 { PickSide::Home } else { PickSide::Away };
        let confidence = (0.55 + gap.abs() * 0.3).min(0.85);
        let reasoning = format!(
            "injury impact {home_impact:.2} home vs {away_impact:.2} away"
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
        let status = ctx
            .player
            .as_ref()
            .filter(|p| p.player_name == prop.player_name)
            .and_then(|p| p.status)
            .or_else(|| {
                ctx.injuries
                    .iter()
                    .find(|r| r.player_name == prop.player_name)
                    .map(|r| r.status)
            })?;

        if !status.is_sidelined() {
            return None;
        }

        let pick = PredictedPick {
            kind: BetKind::PlayerProp,
            side: PickSide::Avoid,
            line: Some(prop.line),
        };
        let reasoning = format!(
            "{} is listed {:?} — stand aside on {} {:.1}",
            prop.player_name, status, prop.market_key, prop.line
        );
        Some(prop_result(ctx, self.kind(), prop, pick, 0.9, reasoning))
    }
}
