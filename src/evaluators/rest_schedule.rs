//! Rest and schedule-spot signal
//!
//! Shares its scoring ladder with the RestSchedule analysis model so the
//! user-model signal and the standalone model can never disagree on what a
//! rest day is worth.

use crate::domain::{GameContext, RestProfile};

use super::{Evaluator, NEUTRAL};

#[derive(Debug)]
pub struct RestScheduleEvaluator;

/// Points of advantage one team's rest situation is worth
pub fn rest_points(rest: &RestProfile) -> f64 {
    if rest.back_to_back {
        return -3.0;
    }
    match rest.rest_days {
        days if days >= 3 => 3.0,
        2 => 1.5,
        1 => 0.5,
        _ => -3.0,
    }
}

/// Home-minus-away rest advantage including the venue adjustment
pub fn rest_advantage(home: &RestProfile, away: &RestProfile) -> f64 {
    (rest_points(home) + 1.0) - (rest_points(away) - 0.5)
}

impl Evaluator for RestScheduleEvaluator {
    fn key(&self) -> &'static str {
        "rest_schedule"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        let (home, away) = match (&ctx.home_rest, &ctx.away_rest) {
            (Some(h), Some(a)) => (h, a),
            _ => return NEUTRAL,
        };

        (NEUTRAL + rest_advantage(home, away) * 0.04).clamp(0.2, 0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameInfo, Sport};
    use chrono::Utc;

    fn rest(team: &str, days: u32, b2b: bool) -> RestProfile {
        RestProfile {
            team: team.to_string(),
            rest_days: days,
            back_to_back: b2b,
        }
    }

    fn ctx_with_rest(home: Option<RestProfile>, away: Option<RestProfile>) -> GameContext {
        let mut ctx = GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now(),
        });
        ctx.home_rest = home;
        ctx.away_rest = away;
        ctx
    }

    #[test]
    fn test_rest_points_ladder() {
        assert_eq!(rest_points(&rest("A", 4, false)), 3.0);
        assert_eq!(rest_points(&rest("A", 2, false)), 1.5);
        assert_eq!(rest_points(&rest("A", 1, false)), 0.5);
        assert_eq!(rest_points(&rest("A", 0, false)), -3.0);
        assert_eq!(rest_points(&rest("A", 3, true)), -3.0);
    }

    #[test]
    fn test_rested_home_vs_back_to_back_away() {
        let ctx = ctx_with_rest(
            Some(rest("Lakers", 3, false)),
            Some(rest("Warriors", 0, true)),
        );
        let score = RestScheduleEvaluator.evaluate(&ctx);
        assert!(score > 0.7, "score={score}");
    }

    #[test]
    fn test_missing_rest_is_neutral() {
        let ctx = ctx_with_rest(Some(rest("Lakers", 3, false)), None);
        assert_eq!(RestScheduleEvaluator.evaluate(&ctx), NEUTRAL);
    }
}
