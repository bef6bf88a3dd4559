//! Grading arithmetic
//!
//! Structured picks grade through an exhaustive match. The keyword parser
//! below exists for legacy rows whose structured pick is damaged or absent:
//! it classifies free text as spread (signed number present), total
//! (over/under plus a number), or moneyline (team name alone). Anything it
//! cannot classify is unparseable — the caller skips verification and leaves
//! the row pending, it never guesses.

use crate::domain::{BetKind, GameFinal, PickSide, PredictedPick};
use crate::error::GradeError;

/// Grade a game-market pick against the final score
pub fn grade_game_pick(pick: &PredictedPick, outcome: &GameFinal) -> Result<bool, GradeError> {
    match pick.kind {
        BetKind::Spread => {
            let line = pick.line.ok_or(GradeError::MissingSpreadLine)?;
            // Stored line is home-relative; adjusted home score vs away.
            // A push grades as not covered.
            let adjusted_home = outcome.home_score as f64 + line;
            match pick.side {
                PickSide::Home => Ok(adjusted_home > outcome.away_score as f64),
                PickSide::Away => Ok(adjusted_home < outcome.away_score as f64),
                PickSide::Avoid => Err(GradeError::NotGradeable),
                PickSide::Over | PickSide::Under => Err(GradeError::MissingSpreadLine),
            }
        }
        BetKind::Total => {
            let line = pick.line.ok_or(GradeError::MissingTotalLine)?;
            let combined = outcome.combined_score() as f64;
            match pick.side {
                PickSide::Over => Ok(combined > line),
                PickSide::Under => Ok(combined < line),
                PickSide::Avoid => Err(GradeError::NotGradeable),
                PickSide::Home | PickSide::Away => Err(GradeError::MissingTotalLine),
            }
        }
        BetKind::Moneyline => match pick.side {
            PickSide::Home => Ok(outcome.home_score > outcome.away_score),
            PickSide::Away => Ok(outcome.away_score > outcome.home_score),
            PickSide::Avoid => Err(GradeError::NotGradeable),
            PickSide::Over | PickSide::Under => Err(GradeError::NotGradeable),
        },
        BetKind::PlayerProp => Err(GradeError::NotGradeable),
    }
}

/// Grade a prop pick against the player's actual stat
pub fn grade_prop_pick(pick: &PredictedPick, actual: f64) -> Result<bool, GradeError> {
    let line = pick.line.ok_or(GradeError::MissingTotalLine)?;
    match pick.side {
        PickSide::Over => Ok(actual > line),
        PickSide::Under => Ok(actual < line),
        _ => Err(GradeError::NotGradeable),
    }
}

/// Classify a legacy free-text game prediction into a structured pick.
/// Returns None for anything ambiguous.
pub fn parse_prediction(text: &str, home_team: &str, away_team: &str) -> Option<PredictedPick> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.contains("avoid") {
        return None;
    }

    // Total: "Over 220.5" / "Under 220.5"
    if let Some(rest) = lower.strip_prefix("over") {
        let line = first_number(rest)?;
        return Some(PredictedPick::total(PickSide::Over, line));
    }
    if let Some(rest) = lower.strip_prefix("under") {
        let line = first_number(rest)?;
        return Some(PredictedPick::total(PickSide::Under, line));
    }

    // Spread: "<team> -5.5" / "<team> +5.5"
    let side = side_for_team(trimmed, home_team, away_team)?;
    if let Some(signed) = first_signed_number(trimmed) {
        // Stored lines are home-relative
        let line = match side {
            PickSide::Home => signed,
            _ => -signed,
        };
        return Some(PredictedPick::spread(side, line));
    }

    // Moneyline: the team name alone
    Some(PredictedPick::moneyline(side))
}

fn side_for_team(text: &str, home_team: &str, away_team: &str) -> Option<PickSide> {
    let lower = text.to_lowercase();
    let home = lower.contains(&home_team.to_lowercase());
    let away = lower.contains(&away_team.to_lowercase());
    match (home, away) {
        (true, false) => Some(PickSide::Home),
        (false, true) => Some(PickSide::Away),
        _ => None,
    }
}

/// First token parseable as a positive number
fn first_number(text: &str) -> Option<f64> {
    text.split_whitespace()
        .find_map(|token| token.parse::<f64>().ok())
        .filter(|n| *n > 0.0)
}

/// First token carrying an explicit sign, e.g. "-5.5" or "+3"
fn first_signed_number(text: &str) -> Option<f64> {
    text.split_whitespace()
        .filter(|token| token.starts_with('+') || token.starts_with('-'))
        .find_map(|token| token.parse::<f64>().ok())
}
