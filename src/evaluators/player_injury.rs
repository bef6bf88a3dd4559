//! Roster-availability signal
//!
//! Shares its impact ladder with the InjuryAware analysis model: a sidelined
//! player's weight comes from their average minutes, each sidelined player
//! contributes up to 0.3 to their team's impact, capped at 1.0.

use crate::domain::{GameContext, InjuryReport};

use super::{Evaluator, NEUTRAL};

#[derive(Debug)]
pub struct PlayerInjuryEvaluator;

/// How much one sidelined player matters, by average minutes played
pub fn player_impact_factor(avg_minutes: Option<f64>) -> f64 {
    match avg_minutes {
        Some(minutes) if minutes >= 35.0 => 1.0,
        Some(minutes) if minutes >= 25.0 => 0.7,
        Some(minutes) if minutes >= 15.0 => 0.4,
        _ => 0.2,
    }
}

/// Aggregate impact of a team's sidelined players, in [0, 1]
pub fn team_injury_impact<'a>(reports: impl Iterator<Item = &'a InjuryReport>) -> f64 {
    let mut impact = 0.0;
    for report in reports {
        if report.status.is_sidelined() {
            impact += player_impact_factor(report.avg_minutes) * 0.3;
        }
    }
    impact.min(1.0)
}

impl Evaluator for PlayerInjuryEvaluator {
    fn key(&self) -> &'static str {
        "player_injury"
    }

    fn evaluate(&self, ctx: &GameContext) -> f64 {
        if ctx.injuries.is_empty() {
            return NEUTRAL;
        }

        let home_impact = team_injury_impact(ctx.injuries_for(&ctx.game.home_team));
        let away_impact = team_injury_impact(ctx.injuries_for(&ctx.game.away_team));

        // More injured opponent pushes the score toward our side
        (NEUTRAL + (away_impact - home_impact) * 0.3).clamp(0.2, 0.8)
    }
}
