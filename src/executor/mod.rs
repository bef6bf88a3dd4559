//! Live execution of user models
//!
//! Applies a user's weighted evaluator composite to upcoming games. The
//! decision rule is the dual gate in `composite`: dead zone first, then the
//! user's confidence floor. Games inside either gate publish nothing.

pub mod composite;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{GameContext, ModelStatus, PickSide, Sport, UserModel};
use crate::error::Result;
use crate::pipeline::ContextLoader;
use crate::store::Ledger;

pub use composite::{composite_score, decide, evaluate_game, Decision};

/// One published user-model pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPrediction {
    pub user_id: String,
    pub model_id: String,
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub side: PickSide,
    pub prediction: String,
    pub score: f64,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Counts reported by one execution run
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    pub published: usize,
    pub dead_zone: usize,
    pub below_threshold: usize,
}

fn build_prediction(
    model: &UserModel,
    ctx: &GameContext,
    side: PickSide,
    confidence: f64,
) -> UserPrediction {
    let picked_team = match side {
        PickSide::Home => &ctx.game.home_team,
        _ => &ctx.game.away_team,
    };
    UserPrediction {
        user_id: model.user_id.clone(),
        model_id: model.model_id.clone(),
        game_id: ctx.game.game_id.clone(),
        sport: ctx.game.sport,
        home_team: ctx.game.home_team.clone(),
        away_team: ctx.game.away_team.clone(),
        side,
        prediction: picked_team.clone(),
        score: match side {
            PickSide::Home => confidence,
            _ => 1.0 - confidence,
        },
        confidence,
        created_at: Utc::now(),
    }
}

pub struct UserModelExecutor {
    ledger: Ledger,
    loader: ContextLoader,
}

impl UserModelExecutor {
    pub fn new(ledger: Ledger) -> Self {
        let loader = ContextLoader::new(ledger.clone());
        Self { ledger, loader }
    }

    /// Score one already-assembled context through a user model
    pub fn execute_one(
        &self,
        model: &UserModel,
        ctx: &GameContext,
    ) -> Result<Option<UserPrediction>> {
        match evaluate_game(model, ctx)? {
            Decision::Publish { side, confidence } => {
                Ok(Some(build_prediction(model, ctx, side, confidence)))
            }
            Decision::DeadZone { score } => {
                debug!(game_id = %ctx.game.game_id, score, "dead zone, no pick");
                Ok(None)
            }
            Decision::BelowThreshold { score, confidence } => {
                debug!(
                    game_id = %ctx.game.game_id,
                    score,
                    confidence,
                    min_confidence = model.min_confidence,
                    "below confidence floor, no pick"
                );
                Ok(None)
            }
            Decision::NoSources => Ok(None),
        }
    }

    /// Run one user model over its sport's upcoming games (next `days` days)
    pub async fn run(
        &self,
        model: &UserModel,
        days: i64,
    ) -> Result<(Vec<UserPrediction>, ExecutionSummary)> {
        if model.status != ModelStatus::Active {
            return Ok((Vec::new(), ExecutionSummary::default()));
        }

        let today = Utc::now().date_naive();
        let until = today + Duration::days(days);
        let games = self.ledger.games_between(model.sport, today, until).await?;

        let mut predictions = Vec::new();
        let mut summary = ExecutionSummary::default();
        for game in games {
            let ctx = self.loader.load_game_context(&game).await?;
            match evaluate_game(model, &ctx)? {
                Decision::Publish { side, confidence } => {
                    predictions.push(build_prediction(model, &ctx, side, confidence));
                    summary.published += 1;
                }
                Decision::DeadZone { .. } => summary.dead_zone += 1,
                Decision::BelowThreshold { .. } => summary.below_threshold += 1,
                Decision::NoSources => {}
            }
        }

        info!(
            user_id = %model.user_id,
            model_id = %model.model_id,
            published = summary.published,
            dead_zone = summary.dead_zone,
            below_threshold = summary.below_threshold,
            "user model run complete"
        );
        Ok((predictions, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BetKind, DataSourceConfig, GameInfo, TeamForm};
    use crate::store::MemoryRepository;
    use std::sync::Arc;

    fn user_model(min_confidence: f64, sources: &[(&str, f64)]) -> UserModel {
        UserModel {
            user_id: "u1".to_string(),
            model_id: "m1".to_string(),
            name: "form chaser".to_string(),
            sport: Sport::Nba,
            bet_types: vec![BetKind::Moneyline],
            data_sources: sources
                .iter()
                .map(|(key, weight)| {
                    (
                        key.to_string(),
                        DataSourceConfig {
                            enabled: true,
                            weight: *weight,
                        },
                    )
                })
                .collect(),
            min_confidence,
            status: ModelStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ctx_with_form(home_wins: usize, away_wins: usize) -> GameContext {
        let mut ctx = GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now(),
        });
        let results = |wins: usize| (0..10).map(|i| i < wins).collect();
        ctx.home_form = Some(TeamForm {
            team: "Lakers".to_string(),
            results: results(home_wins),
        });
        ctx.away_form = Some(TeamForm {
            team: "Warriors".to_string(),
            results: results(away_wins),
        });
        ctx
    }

    fn executor() -> UserModelExecutor {
        UserModelExecutor::new(Ledger::new(Arc::new(MemoryRepository::new())))
    }

    #[test]
    fn test_single_source_publishes_its_score() {
        // recent_form: 8-2 vs 2-8 → 0.5 + 0.6/2 = 0.8
        let model = user_model(0.55, &[("recent_form", 1.0)]);
        let prediction = executor()
            .execute_one(&model, &ctx_with_form(8, 2))
            .unwrap()
            .unwrap();
        assert_eq!(prediction.side, PickSide::Home);
        assert_eq!(prediction.prediction, "Lakers");
        assert!((prediction.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_dead_zone_publishes_nothing_at_zero_floor() {
        // 6-4 vs 5-5 → 0.5 + 0.1/2 = 0.55: exactly on the boundary, dead zone
        let model = user_model(0.0, &[("recent_form", 1.0)]);
        assert!(executor()
            .execute_one(&model, &ctx_with_form(6, 5))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_confidence_floor_gates_clear_scores() {
        // 0.8 score but a 0.9 floor
        let model = user_model(0.9, &[("recent_form", 1.0)]);
        assert!(executor()
            .execute_one(&model, &ctx_with_form(8, 2))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_data_lands_in_dead_zone() {
        // All sources neutral: score exactly 0.5
        let model = user_model(0.0, &[("recent_form", 1.0), ("team_stats", 1.0)]);
        let mut ctx = ctx_with_form(8, 2);
        ctx.home_form = None;
        ctx.away_form = None;
        assert!(executor().execute_one(&model, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_disabled_model_has_no_sources() {
        let mut model = user_model(0.0, &[("recent_form", 1.0)]);
        model
            .data_sources
            .insert("recent_form".to_string(), DataSourceConfig {
                enabled: false,
                weight: 1.0,
            });
        let decision = evaluate_game(&model, &ctx_with_form(8, 2)).unwrap();
        assert_eq!(decision, Decision::NoSources);
    }

    #[test]
    fn test_unknown_source_is_a_config_error() {
        let model = user_model(0.0, &[("tea_leaves", 1.0)]);
        assert!(executor().execute_one(&model, &ctx_with_form(8, 2)).is_err());
    }

    #[tokio::test]
    async fn test_archived_model_runs_nothing() {
        let mut model = user_model(0.0, &[("recent_form", 1.0)]);
        model.status = ModelStatus::Archived;
        let (predictions, summary) = executor().run(&model, 7).await.unwrap();
        assert!(predictions.is_empty());
        assert_eq!(summary.published, 0);
    }
}
