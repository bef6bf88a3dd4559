//! Matchup model — history plus style
//!
//! Blends the head-to-head win rate (60%) with an offense-versus-opposing-
//! defense style differential (40%) computed from season per-game stats.

use crate::domain::{
    AnalysisResult, GameContext, ModelKind, OddsSnapshot, PickSide, PredictedPick, PropOdds,
    TeamSeasonStats,
};

use super::{game_result, AnalysisModel, INTERNAL_BOOK};

#[derive(Debug)]
pub struct MatchupModel;

const H2H_WEIGHT: f64 = 0.6;
const STYLE_WEIGHT: f64 = 0.4;

/// Style read: each offense against the defense it will face, as a
/// home-favoring score in [0, 1]
fn style_score(home: &TeamSeasonStats, away: &TeamSeasonStats) -> f64 {
    let home_attack = home.offensive_rating - away.defensive_rating;
    let away_attack = away.offensive_rating - home.defensive_rating;
    (0.5 + (home_attack - away_attack) / 30.0).clamp(0.0, 1.0)
}

impl AnalysisModel for MatchupModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Matchup
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        _odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        let h2h_rate = ctx
            .head_to_head
            .as_ref()
            .and_then(|h2h| h2h.home_win_rate())?;
        let home_stats = ctx.home_stats.as_ref()?;
        let away_stats = ctx.away_stats.as_ref()?;

        let style = style_score(home_stats, away_stats);
        let score = H2H_WEIGHT * h2h_rate + STYLE_WEIGHT * style;

        let side = if score > 0.55 {
            PickSide::Home
        } else if score < 0.45 {
            PickSide::Away
        } else {
            return None;
        };

        let confidence = (0.5 + (score - 0.5).abs()).min(0.85);
        let reasoning = format!(
            "h2h {:.0}% home, style read {:.2}, blended {:.2}",
            h2h_rate * 100.0,
            style,
            score
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

    fn analyze_prop_odds(&self, _ctx: &GameContext, _prop: &PropOdds) -> Option<AnalysisResult> {
        // Team matchup history says nothing about a single player line
        None
    }
}
