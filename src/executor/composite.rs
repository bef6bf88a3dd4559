//! Weighted evaluator composite
//!
//! The one scoring function both live execution and backtesting run, so the
//! two can never drift: `score = Σ(evaluator_i × weight_i) / Σ(weight_i)`
//! over the model's enabled sources.

use crate::domain::{GameContext, PickSide, UserModel};
use crate::error::Result;
use crate::evaluators::evaluator_for;

/// Dead-zone bounds: inside (0.45, 0.55) no prediction is published
pub const HOME_THRESHOLD: f64 = 0.55;
pub const AWAY_THRESHOLD: f64 = 0.45;

/// Why a game produced no prediction, or the pick it produced
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Publish { side: PickSide, confidence: f64 },
    /// Score inside the dead zone — a coin flip is not a pick
    DeadZone { score: f64 },
    /// Cleared the dead zone but not the user's confidence floor
    BelowThreshold { score: f64, confidence: f64 },
    /// No enabled sources with positive weight
    NoSources,
}

/// Weighted composite score over the model's enabled evaluators.
/// Evaluators degrade to 0.5 on missing data, so the composite is always
/// finite; `None` only when the model enables no sources.
pub fn composite_score(model: &UserModel, ctx: &GameContext) -> Result<Option<f64>> {
    let sources = model.enabled_sources();
    if sources.is_empty() {
        return Ok(None);
    }

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (key, weight) in sources {
        let evaluator = evaluator_for(key)?;
        weighted_sum += evaluator.evaluate(ctx) * weight;
        weight_sum += weight;
    }
    Ok(Some(weighted_sum / weight_sum))
}

/// Apply the dual gate: dead zone first, then the user's min_confidence.
/// Both gates hold independently — neither can be configured away.
pub fn decide(score: f64, min_confidence: f64) -> Decision {
    let (side, confidence) = if score > HOME_THRESHOLD {
        (PickSide::Home, score)
    } else if score < AWAY_THRESHOLD {
        (PickSide::Away, 1.0 - score)
    } else {
        return Decision::DeadZone { score };
    };

    if confidence < min_confidence {
        return Decision::BelowThreshold { score, confidence };
    }
    Decision::Publish { side, confidence }
}

/// Score and gate in one step
pub fn evaluate_game(model: &UserModel, ctx: &GameContext) -> Result<Decision> {
    match composite_score(model, ctx)? {
        Some(score) => Ok(decide(score, model.min_confidence)),
        None => Ok(Decision::NoSources),
    }
}
