//! Dynamic confidence weighting
//!
//! Converts a model's raw confidence into an adjusted confidence reflecting
//! its measured trailing reliability. For each (model, sport, bet_type) the
//! verified ledger over the lookback window yields an accuracy and a Brier
//! score; the two combine into a reliability score that is normalized across
//! the active model set and turned into a scaling multiplier.
//!
//! The computation is a pure function of the ledger at the chosen cutoff:
//! identical ledger, identical cutoff, identical weights. The cache only
//! memoizes that computation and must be invalidated after verification runs.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::WeightingConfig;
use crate::domain::{BetKind, ModelKind, Sport, VerifiedAnalysis};
use crate::error::Result;
use crate::store::Ledger;

/// Accuracy of an uninformed coin flip
const NEUTRAL_ACCURACY: f64 = 0.5;
/// Brier score of a perfectly uninformed 0.5 forecast
const NEUTRAL_BRIER: f64 = 0.25;

/// Trailing performance of one (model, sport, bet_type)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfStats {
    pub accuracy: f64,
    pub brier: f64,
    pub sample_count: usize,
}

impl PerfStats {
    pub fn neutral() -> Self {
        Self {
            accuracy: NEUTRAL_ACCURACY,
            brier: NEUTRAL_BRIER,
            sample_count: 0,
        }
    }

    /// Aggregate a slice of graded predictions. Zero samples is the neutral
    /// default, never an error.
    pub fn from_rows(rows: &[VerifiedAnalysis]) -> Self {
        if rows.is_empty() {
            return Self::neutral();
        }
        let total = rows.len() as f64;
        let correct = rows.iter().filter(|r| r.analysis_correct).count() as f64;
        let brier = rows
            .iter()
            .map(|r| {
                let outcome = if r.analysis_correct { 1.0 } else { 0.0 };
                (r.analysis.confidence - outcome).powi(2)
            })
            .sum::<f64>()
            / total;
        Self {
            accuracy: correct / total,
            brier,
            sample_count: rows.len(),
        }
    }
}

/// Reliability score: monotonic in accuracy, inversely monotonic in Brier
fn reliability(accuracy: f64, brier: f64) -> f64 {
    (0.7 * accuracy + 0.3 * (1.0 - brier)).max(0.0)
}

/// Reliability of a model with no track record
const BASELINE_RELIABILITY: f64 = 0.7 * NEUTRAL_ACCURACY + 0.3 * (1.0 - NEUTRAL_BRIER);

/// Derived weight snapshot for one (model, sport, bet_type)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelWeight {
    pub model: ModelKind,
    pub sport: Sport,
    pub bet_type: BetKind,
    pub recent_accuracy: f64,
    pub recent_brier_score: f64,
    pub normalized_weight: f64,
    pub sample_count: usize,
    pub lookback_days: i64,
    pub computed_at: DateTime<Utc>,
}

/// Dynamic weighting over the verification ledger
pub struct DynamicWeighting {
    ledger: Ledger,
    config: WeightingConfig,
    cache: DashMap<(Sport, BetKind), Arc<HashMap<ModelKind, ModelWeight>>>,
}

impl DynamicWeighting {
    pub fn new(ledger: Ledger, config: WeightingConfig) -> Self {
        Self {
            ledger,
            config,
            cache: DashMap::new(),
        }
    }

    /// Trailing stats for one model. Below `min_samples` the model is
    /// treated as having no track record yet.
    pub async fn recent_stats(
        &self,
        sport: Sport,
        model: ModelKind,
        bet_type: BetKind,
        as_of: DateTime<Utc>,
    ) -> Result<PerfStats> {
        let since = as_of - Duration::days(self.config.lookback_days);
        let rows = self
            .ledger
            .verified_since(sport, model, bet_type, since)
            .await?;
        let stats = PerfStats::from_rows(&rows);
        if stats.sample_count < self.config.min_samples {
            return Ok(PerfStats {
                sample_count: stats.sample_count,
                ..PerfStats::neutral()
            });
        }
        Ok(stats)
    }

    /// Trailing accuracy; 0.5 with an empty ledger, never an error
    pub async fn get_recent_accuracy(
        &self,
        sport: Sport,
        model: ModelKind,
        bet_type: BetKind,
    ) -> Result<f64> {
        Ok(self
            .recent_stats(sport, model, bet_type, Utc::now())
            .await?
            .accuracy)
    }

    /// Weight snapshot across the active model set at an explicit cutoff.
    /// Deterministic for a fixed ledger and cutoff.
    pub async fn compute_weights(
        &self,
        sport: Sport,
        bet_type: BetKind,
        as_of: DateTime<Utc>,
    ) -> Result<HashMap<ModelKind, ModelWeight>> {
        let mut stats = Vec::with_capacity(ModelKind::ALL.len());
        for model in ModelKind::ALL {
            let perf = self.recent_stats(sport, model, bet_type, as_of).await?;
            stats.push((model, perf));
        }

        let scores: Vec<f64> = stats
            .iter()
            .map(|(_, perf)| reliability(perf.accuracy, perf.brier))
            .collect();
        let score_sum: f64 = scores.iter().sum();

        let mut weights = HashMap::with_capacity(stats.len());
        for ((model, perf), score) in stats.into_iter().zip(scores) {
            let normalized_weight = if score_sum > 0.0 {
                score / score_sum
            } else {
                1.0 / ModelKind::ALL.len() as f64
            };
            weights.insert(
                model,
                ModelWeight {
                    model,
                    sport,
                    bet_type,
                    recent_accuracy: perf.accuracy,
                    recent_brier_score: perf.brier,
                    normalized_weight,
                    sample_count: perf.sample_count,
                    lookback_days: self.config.lookback_days,
                    computed_at: as_of,
                },
            );
        }

        debug!(%sport, %bet_type, "computed model weights");
        Ok(weights)
    }

    /// Cached weight snapshot for (sport, bet_type)
    pub async fn weights_for(
        &self,
        sport: Sport,
        bet_type: BetKind,
    ) -> Result<Arc<HashMap<ModelKind, ModelWeight>>> {
        if let Some(cached) = self.cache.get(&(sport, bet_type)) {
            return Ok(Arc::clone(&cached));
        }
        let weights = Arc::new(self.compute_weights(sport, bet_type, Utc::now()).await?);
        self.cache.insert((sport, bet_type), Arc::clone(&weights));
        Ok(weights)
    }

    /// Multiplier applied to a model's raw confidence
    pub fn scaling(&self, weight: &ModelWeight) -> f64 {
        let score = reliability(weight.recent_accuracy, weight.recent_brier_score);
        (score / BASELINE_RELIABILITY)
            .clamp(self.config.scaling_floor, self.config.scaling_ceiling)
    }

    /// `clamp(raw × scaling, 0, 1)` for one model
    pub async fn adjust_confidence(
        &self,
        sport: Sport,
        model: ModelKind,
        bet_type: BetKind,
        raw_confidence: f64,
    ) -> Result<f64> {
        let weights = self.weights_for(sport, bet_type).await?;
        let adjusted = match weights.get(&model) {
            Some(weight) => raw_confidence * self.scaling(weight),
            None => raw_confidence,
        };
        Ok(adjusted.clamp(0.0, 1.0))
    }

    /// Drop the memoized snapshot after the ledger gains new grades
    pub fn invalidate(&self, sport: Sport, bet_type: BetKind) {
        self.cache.remove(&(sport, bet_type));
    }

    pub fn invalidate_all(&self) {
        self.cache.clear();
    }
}
