//! RestSchedule model — rest advantage
//!
//! Scores each team's rest situation on a points ladder (3+ days of rest is
//! worth +3, a back-to-back −3, plus a home/away adjustment) and backs the
//! rested side. Confidence is `0.5 + 0.05 × advantage`, clamped to [0.3, 0.9].

use crate::domain::{
    AnalysisResult, GameContext, ModelKind, OddsSnapshot, PickSide, PredictedPick, PropOdds,
};
use crate::evaluators::rest_schedule::rest_advantage;

use super::{game_result, AnalysisModel, INTERNAL_BOOK};

#[derive(Debug)]
pub struct RestScheduleModel;

/// Minimum points of advantage worth publishing. Equal rest nets +1.5 from
/// the venue adjustment alone; that is not a schedule edge.
const MIN_ADVANTAGE: f64 = 2.0;

impl AnalysisModel for RestScheduleModel {
    fn kind(&self) -> ModelKind {
        ModelKind::RestSchedule
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        _odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        let home = ctx.home_rest.as_ref()?;
        let away = ctx.away_rest.as_ref()?;

        let advantage = rest_advantage(home, away);
        if advantage.abs() < MIN_ADVANTAGE {
            return None;
        }

        let side = if advantage > 0.0 { PickSide::Home } else { PickSide::Away };
        let confidence = (0.5 + 0.05 * advantage.abs()).clamp(0.3, 0.9);
        let reasoning = format!(
            "rest edge {:+.1}: {} on {} days ({}), {} on {} days ({})",
            advantage,
            home.team,
            home.rest_days,
            if home.back_to_back { "b2b" } else { "rested" },
            away.team,
            away.rest_days,
            if away.back_to_back { "b2b" } else { "rested" },
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
        // Rest spots are a team-level read; no prop signal
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameInfo, RestProfile, Sport};
    use chrono::Utc;

    fn ctx_with_rest(home_days: u32, home_b2b: bool, away_days: u32, away_b2b: bool) -> GameContext {
        let mut ctx = GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now(),
        });
        ctx.home_rest = Some(RestProfile {
            team: "Lakers".to_string(),
            rest_days: home_days,
            back_to_back: home_b2b,
        });
        ctx.away_rest = Some(RestProfile {
            team: "Warriors".to_string(),
            rest_days: away_days,
            back_to_back: away_b2b,
        });
        ctx
    }

    #[test]
    fn test_rested_home_vs_b2b_away() {
        let ctx = ctx_with_rest(3, false, 0, true);
        let result = RestScheduleModel.analyze_game_odds(&ctx, &[]).unwrap();
        assert_eq!(result.pick.side, PickSide::Home);
        // advantage = (3+1) - (-3-0.5) = 7.5 → 0.875
        assert!((result.confidence - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped_to_09() {
        // Even an extreme edge cannot exceed 0.9
        let ctx = ctx_with_rest(5, false, 0, true);
        let result = RestScheduleModel.analyze_game_odds(&ctx, &[]).unwrap();
        assert!(result.confidence <= 0.9);
    }

    #[test]
    fn test_b2b_home_team_gets_faded() {
        let ctx = ctx_with_rest(0, true, 2, false);
        let result = RestScheduleModel.analyze_game_odds(&ctx, &[]).unwrap();
        assert_eq!(result.pick.side, PickSide::Away);
    }

    #[test]
    fn test_even_rest_is_none() {
        // Equal rest nets only the +1.5 venue gap, below the threshold
        let ctx = ctx_with_rest(2, false, 2, false);
        assert!(RestScheduleModel.analyze_game_odds(&ctx, &[]).is_none());
    }

    #[test]
    fn test_missing_rest_is_none() {
        let mut ctx = ctx_with_rest(3, false, 0, true);
        ctx.away_rest = None;
        assert!(RestScheduleModel.analyze_game_odds(&ctx, &[]).is_none());
    }

    #[test]
    fn test_props_are_out_of_scope() {
        let ctx = ctx_with_rest(3, false, 0, true);
        let prop = PropOdds {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            player_name: "LeBron James".to_string(),
            market_key: "player_points".to_string(),
            line: 25.5,
            over_price: -110.0,
            under_price: -110.0,
            commence_time: Utc::now(),
        };
        assert!(RestScheduleModel.analyze_prop_odds(&ctx, &prop).is_none());
    }
}
