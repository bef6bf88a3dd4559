//! Backtest engine
//!
//! Replays historical games through a user's weighted evaluator composite —
//! the same `composite::evaluate_game` the live executor runs — and
//! aggregates accuracy, ROI at fixed -110 pricing, and average confidence
//! into one immutable `BacktestResult`.
//!
//! Determinism: games come back in (date, game_id) order from the ledger and
//! the composite is a pure function of stored data, so an identical
//! (config, date range, dataset) reproduces identical metrics. A wall-clock
//! budget cuts the replay short with status `timed_out`; metrics then cover
//! the games processed so far rather than being lost.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BacktestConfig;
use crate::domain::user_model::{
    BacktestMetrics, BacktestResult, BacktestStatus, SamplePrediction,
};
use crate::domain::{PickSide, Sport, UserModel};
use crate::error::Result;
use crate::executor::composite::{evaluate_game, Decision};
use crate::pipeline::ContextLoader;
use crate::store::Ledger;

/// Winnings per unit staked at American -110
const WIN_RETURN_PER_UNIT: Decimal = dec!(0.9090909090909091);

pub struct BacktestEngine {
    ledger: Ledger,
    loader: ContextLoader,
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(ledger: Ledger, config: BacktestConfig) -> Self {
        let loader = ContextLoader::new(ledger.clone());
        Self {
            ledger,
            loader,
            config,
        }
    }

    /// Replay `[start_date, end_date]` through the user's composite and
    /// persist one immutable result.
    pub async fn run_backtest(
        &self,
        user_id: &str,
        model_id: &str,
        model: &UserModel,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BacktestResult> {
        let started = Instant::now();
        let budget = match self.config.budget_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let games = self
            .ledger
            .games_between(model.sport, start_date, end_date)
            .await?;

        let mut total: u64 = 0;
        let mut correct: u64 = 0;
        let mut confidence_sum = 0.0;
        let mut staked = Decimal::ZERO;
        let mut returned = Decimal::ZERO;
        let mut samples: Vec<SamplePrediction> = Vec::new();
        let mut status = BacktestStatus::Completed;

        for game in &games {
            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    warn!(
                        processed = total,
                        "backtest budget expired; reporting partial metrics"
                    );
                    status = BacktestStatus::TimedOut;
                    break;
                }
            }

            // A game without a stored final result cannot be graded
            let Some(outcome) = self.ledger.outcome(model.sport, &game.game_id).await? else {
                continue;
            };

            let ctx = self.loader.load_game_context(game).await?;
            let Decision::Publish { side, confidence } = evaluate_game(model, &ctx)? else {
                continue;
            };

            let won = match side {
                PickSide::Home => outcome.home_score > outcome.away_score,
                _ => outcome.away_score > outcome.home_score,
            };

            total += 1;
            if won {
                correct += 1;
                returned += self.config.stake_usd * WIN_RETURN_PER_UNIT;
            } else {
                returned -= self.config.stake_usd;
            }
            staked += self.config.stake_usd;
            confidence_sum += confidence;

            if samples.len() < self.config.sample_size {
                let picked_team = match side {
                    PickSide::Home => &game.home_team,
                    _ => &game.away_team,
                };
                samples.push(SamplePrediction {
                    game_id: game.game_id.clone(),
                    game_date: game.commence_time.date_naive(),
                    prediction: picked_team.clone(),
                    confidence,
                    correct: won,
                });
            }
        }

        // Zero-sample aggregates take explicit neutral defaults
        let metrics = BacktestMetrics {
            accuracy: if total == 0 {
                0.5
            } else {
                correct as f64 / total as f64
            },
            roi: if staked.is_zero() {
                Decimal::ZERO
            } else {
                returned / staked
            },
            avg_confidence: if total == 0 {
                0.0
            } else {
                confidence_sum / total as f64
            },
        };

        let result = BacktestResult {
            backtest_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            model_id: model_id.to_string(),
            sport: model.sport,
            start_date,
            end_date,
            total_predictions: total,
            correct_predictions: correct,
            metrics,
            sample_predictions: samples,
            status,
            created_at: Utc::now(),
        };

        self.ledger.put_backtest(&result).await?;

        info!(
            user_id,
            model_id,
            total,
            correct,
            accuracy = result.metrics.accuracy,
            roi = %result.metrics.roi,
            status = ?result.status,
            "backtest complete"
        );
        Ok(result)
    }
}
