//! Analysis model strategies
//!
//! Eight heuristic prediction strategies behind one trait. Each consumes the
//! latest odds (or a prop market) plus the assembled `GameContext` and either
//! publishes one `AnalysisResult` or returns `None` — insufficient signal is
//! a normal outcome, never an error.
//!
//! Construction goes through `ModelRegistry` only; an unrecognized name is a
//! typed configuration error, not a silent default.

use chrono::Utc;

use crate::domain::{
    render_pick, AnalysisResult, AnalysisType, GameContext, ModelKind, OddsSnapshot, PredictedPick,
    PropOdds,
};
use crate::error::{EngineError, Result};

pub mod common;
mod consensus;
mod contrarian;
mod hot_cold;
mod injury;
mod matchup;
mod momentum;
mod rest_schedule;
mod value;

pub use consensus::ConsensusModel;
pub use contrarian::ContrarianModel;
pub use hot_cold::HotColdModel;
pub use injury::InjuryAwareModel;
pub use matchup::MatchupModel;
pub use momentum::MomentumModel;
pub use rest_schedule::RestScheduleModel;
pub use value::ValueModel;

/// Synthetic bookmaker tag for predictions not tied to one book's prices
pub const INTERNAL_BOOK: &str = "oddsmith";

/// One heuristic prediction strategy
pub trait AnalysisModel: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Analyze the game markets. `odds` is the latest snapshot per
    /// (bookmaker, market) for this game; `None` means do not publish.
    fn analyze_game_odds(&self, ctx: &GameContext, odds: &[OddsSnapshot])
        -> Option<AnalysisResult>;

    /// Analyze one prop market. `None` means do not publish.
    fn analyze_prop_odds(&self, ctx: &GameContext, prop: &PropOdds) -> Option<AnalysisResult>;
}

/// Factory over the closed set of strategies
pub struct ModelRegistry;

impl ModelRegistry {
    /// Instantiate a strategy by name. Unrecognized names are configuration
    /// errors raised to the caller.
    pub fn create(name: &str) -> Result<Box<dyn AnalysisModel>> {
        let kind = ModelKind::parse(name).ok_or_else(|| EngineError::UnknownModel {
            name: name.to_string(),
        })?;
        Ok(Self::create_kind(kind))
    }

    pub fn create_kind(kind: ModelKind) -> Box<dyn AnalysisModel> {
        match kind {
            ModelKind::Consensus => Box::new(ConsensusModel),
            ModelKind::Value => Box::new(ValueModel),
            ModelKind::Momentum => Box::new(MomentumModel),
            ModelKind::Contrarian => Box::new(ContrarianModel),
            ModelKind::HotCold => Box::new(HotColdModel),
            ModelKind::RestSchedule => Box::new(RestScheduleModel),
            ModelKind::Matchup => Box::new(MatchupModel),
            ModelKind::InjuryAware => Box::new(InjuryAwareModel),
        }
    }

    /// Names of every registered strategy
    pub fn list_available() -> Vec<&'static str> {
        ModelKind::ALL.iter().map(|k| k.as_str()).collect()
    }

    /// One instance of every strategy
    pub fn all() -> Vec<Box<dyn AnalysisModel>> {
        ModelKind::ALL.iter().map(|k| Self::create_kind(*k)).collect()
    }
}

/// Assemble a game-market result. Confidence is clamped into [0, 1];
/// the weighting layer adjusts it later and tracks the raw value.
pub fn game_result(
    ctx: &GameContext,
    model: ModelKind,
    bookmaker: &str,
    pick: PredictedPick,
    confidence: f64,
    reasoning: String,
) -> AnalysisResult {
    let confidence = confidence.clamp(0.0, 1.0);
    let prediction = render_pick(&pick, &ctx.game.home_team, &ctx.game.away_team, None);
    AnalysisResult {
        game_id: ctx.game.game_id.clone(),
        model,
        analysis_type: AnalysisType::Game,
        sport: ctx.game.sport,
        bookmaker: bookmaker.to_string(),
        home_team: ctx.game.home_team.clone(),
        away_team: ctx.game.away_team.clone(),
        player_name: None,
        market_key: None,
        pick,
        prediction,
        confidence,
        raw_confidence: confidence,
        reasoning,
        created_at: Utc::now(),
    }
}

/// Assemble a prop-market result
pub fn prop_result(
    ctx: &GameContext,
    model: ModelKind,
    prop: &PropOdds,
    pick: PredictedPick,
    confidence: f64,
    reasoning: String,
) -> AnalysisResult {
    let confidence = confidence.clamp(0.0, 1.0);
    let prediction = render_pick(
        &pick,
        &ctx.game.home_team,
        &ctx.game.away_team,
        Some(&prop.player_name),
    );
    AnalysisResult {
        game_id: prop.game_id.clone(),
        model,
        analysis_type: AnalysisType::Prop,
        sport: prop.sport,
        bookmaker: prop.bookmaker.clone(),
        home_team: ctx.game.home_team.clone(),
        away_team: ctx.game.away_team.clone(),
        player_name: Some(prop.player_name.clone()),
        market_key: Some(prop.market_key.clone()),
        pick,
        prediction,
        confidence,
        raw_confidence: confidence,
        reasoning,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creates_every_model() {
        for name in ModelRegistry::list_available() {
            let model = ModelRegistry::create(name).unwrap();
            assert_eq!(model.kind().as_str(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_typed_error() {
        let err = ModelRegistry::create("magic8ball").unwrap_err();
        assert!(matches!(err, EngineError::UnknownModel { .. }));
    }

    #[test]
    fn test_list_has_eight_models() {
        assert_eq!(ModelRegistry::list_available().len(), 8);
        assert_eq!(ModelRegistry::all().len(), 8);
    }
}
