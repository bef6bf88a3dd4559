//! Season-stat differential signal

use crate::domain::GameContext;

use super::{Evaluator, NEUTRAL};

/// Compares expected scoring margins from season per-game stats.
#[derive(Debug)]
pub struct TeamStatsEvaluator;

impl Evaluator for TeamStatsEvaluator {
    fn key(&self) -> &'static str {
        "team_stats"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        let (home, away) = match (&ctx.home_stats, &ctx.away_stats) {
            (Some(h), Some(a)) => (h, a),
            _ => return NEUTRAL,
        };

        // Expected margin: each offense against the opposing defense
        let home_expected = (home.avg_points_scored + away.avg_points_allowed) / 2.0;
        let away_expected = (away.avg_points_scored + home.avg_points_allowed) / 2.0;
        let margin = home_expected - away_expected;

        // A 12-point expected margin saturates the signal
        (NEUTRAL + margin / 30.0).clamp(0.1, 0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameInfo, Sport, TeamSeasonStats};
    use chrono::Utc;

    fn stats(team: &str, scored: f64, allowed: f64) -> TeamSeasonStats {
        TeamSeasonStats {
            team: team.to_string(),
            games_played: 40,
            avg_points_scored: scored,
            avg_points_allowed: allowed,
            offensive_rating: 110.0,
            defensive_rating: 110.0,
            home_win_pct: 0.5,
            away_win_pct: 0.5,
        }
    }

    fn ctx_with(home: Option<TeamSeasonStats>, away: Option<TeamSeasonStats>) -> GameContext {
        let mut ctx = GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now(),
        });
        ctx.home_stats = home;
        ctx.away_stats = away;
        ctx
    }

    #[test]
    fn test_stronger_home_offense_scores_above_neutral() {
        let ctx = ctx_with(
            Some(stats("Lakers", 118.0, 108.0)),
            Some(stats("Warriors", 110.0, 114.0)),
        );
        assert!(TeamStatsEvaluator.evaluate(&ctx) > NEUTRAL);
    }

    #[test]
    fn test_symmetric_stats_are_neutral() {
        let ctx = ctx_with(
            Some(stats("Lakers", 110.0, 110.0)),
            Some(stats("Warriors", 110.0, 110.0)),
        );
        assert!((TeamStatsEvaluator.evaluate(&ctx) - NEUTRAL).abs() < 1e-9);
    }

    #[test]
    fn test_one_side_missing_is_neutral() {
        let ctx = ctx_with(Some(stats("Lakers", 120.0, 100.0)), None);
        assert_eq!(TeamStatsEvaluator.evaluate(&ctx), NEUTRAL);
    }
}
