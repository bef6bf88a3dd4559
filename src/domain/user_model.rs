//! User-configured evaluator composites and their backtest results

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::odds::Sport;
use super::prediction::BetKind;

/// Lifecycle of a user model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Active,
    Archived,
}

/// One signal source inside a user model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub enabled: bool,
    pub weight: f64,
}

/// A user's weighted evaluator composite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserModel {
    pub user_id: String,
    pub model_id: String,
    pub name: String,
    pub sport: Sport,
    pub bet_types: Vec<BetKind>,
    /// Evaluator key -> enablement and weight
    pub data_sources: HashMap<String, DataSourceConfig>,
    pub min_confidence: f64,
    pub status: ModelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Enabled (key, weight) pairs with positive weight, sorted by key so
    /// iteration order is stable across runs
    pub fn enabled_sources(&self) -> Vec<(&str, f64)> {
        let mut sources: Vec<(&str, f64)> = self
            .data_sources
            .iter()
            .filter(|(_, cfg)| cfg.enabled && cfg.weight > 0.0)
            .map(|(key, cfg)| (key.as_str(), cfg.weight))
            .collect();
        sources.sort_by(|a, b| a.0.cmp(b.0));
        sources
    }
}

/// Completion status of a backtest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacktestStatus {
    Completed,
    /// The wall-clock budget expired; metrics cover the games processed so far
    TimedOut,
}

/// Aggregate metrics of one backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub accuracy: f64,
    /// Return on investment at fixed -110 pricing, as a fraction of staked
    pub roi: Decimal,
    pub avg_confidence: f64,
}

/// One graded prediction kept as a sample on the stored result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplePrediction {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub prediction: String,
    pub confidence: f64,
    pub correct: bool,
}

/// Immutable result of one backtest invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub backtest_id: String,
    pub user_id: String,
    pub model_id: String,
    pub sport: Sport,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_predictions: u64,
    pub correct_predictions: u64,
    pub metrics: BacktestMetrics,
    pub sample_predictions: Vec<SamplePrediction>,
    pub status: BacktestStatus,
    pub created_at: DateTime<Utc>,
}
