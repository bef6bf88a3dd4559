//! Generation pipeline
//!
//! The batch run that produces predictions: page through a sport's upcoming
//! games, assemble each game's context, run every registered model against
//! the game's markets and props, pass raw confidences through the weighting
//! layer, and write results under the latest+history convention (the ledger
//! derives and stores the inverse for every invertible result).
//!
//! Batch semantics per the partial-failure contract: one bad game is caught,
//! logged, and counted — it never aborts the run. Games are processed by a
//! bounded worker pool with no shared mutable state; counts are summed from
//! per-game results. An expired wall-clock budget ends the run between pages
//! with `timed_out` set and everything processed so far intact.

mod context;

pub use context::ContextLoader;

use chrono::{Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::{GameContext, GameInfo, PropOdds, Sport};
use crate::error::Result;
use crate::models::ModelRegistry;
use crate::store::{Ledger, Page};
use crate::weighting::DynamicWeighting;

/// Counts reported by one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub games_processed: usize,
    /// Analyses written (new or changed)
    pub generated: usize,
    /// Models that declined to publish, plus unchanged re-runs
    pub skipped: usize,
    /// Games that failed entirely, logged and passed over
    pub failed: usize,
    /// The wall-clock budget expired before the scan finished
    pub timed_out: bool,
}

/// Per-game counts, merged into the run summary
#[derive(Debug, Default)]
struct GameCounts {
    generated: usize,
    skipped: usize,
}

pub struct GenerationRun {
    ledger: Ledger,
    loader: ContextLoader,
    weighting: Arc<DynamicWeighting>,
    config: EngineConfig,
}

impl GenerationRun {
    pub fn new(ledger: Ledger, weighting: Arc<DynamicWeighting>, config: EngineConfig) -> Self {
        let loader = ContextLoader::new(ledger.clone());
        Self {
            ledger,
            loader,
            weighting,
            config,
        }
    }

    /// Generate predictions for every game of `sport` commencing within the
    /// next `days_ahead` days.
    pub async fn generate(&self, sport: Sport, days_ahead: i64) -> Result<RunSummary> {
        let started = Instant::now();
        let budget = match self.config.run_budget_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let today = Utc::now().date_naive();
        let until = today + ChronoDuration::days(days_ahead);

        let mut summary = RunSummary::default();
        let mut page = Page::first(self.config.page_size);

        loop {
            let (games, next_token) = self
                .ledger
                .games_between_page(sport, today, until, page)
                .await?;
            if games.is_empty() && next_token.is_none() {
                break;
            }

            // Bounded worker pool over this page; each game is independent
            let results: Vec<(String, Result<GameCounts>)> = stream::iter(games)
                .map(|game| async move {
                    let game_id = game.game_id.clone();
                    (game_id, self.process_game(&game).await)
                })
                .buffer_unordered(self.config.concurrency)
                .collect()
                .await;

            for (game_id, result) in results {
                summary.games_processed += 1;
                match result {
                    Ok(counts) => {
                        summary.generated += counts.generated;
                        summary.skipped += counts.skipped;
                    }
                    Err(e) => {
                        warn!(%game_id, error = %e, "game failed; continuing the batch");
                        summary.failed += 1;
                    }
                }
            }

            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    summary.timed_out = next_token.is_some();
                    if summary.timed_out {
                        warn!(
                            elapsed_secs = started.elapsed().as_secs(),
                            "generation budget expired; returning partial results"
                        );
                    }
                    break;
                }
            }

            match next_token {
                Some(token) => page = Page::after(self.config.page_size, token),
                None => break,
            }
        }

        info!(
            %sport,
            games = summary.games_processed,
            generated = summary.generated,
            skipped = summary.skipped,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "generation run complete"
        );
        Ok(summary)
    }

    /// Run every model over one game's markets and props
    async fn process_game(&self, game: &GameInfo) -> Result<GameCounts> {
        let ctx = self.loader.load_game_context(game).await?;
        let odds = self
            .ledger
            .latest_odds_for_game(game.sport, &game.game_id)
            .await?;
        let props = self.ledger.props_for_game(game.sport, &game.game_id).await?;

        let mut counts = GameCounts::default();

        for model in ModelRegistry::all() {
            match model.analyze_game_odds(&ctx, &odds) {
                Some(analysis) => {
                    self.store_adjusted(analysis, &mut counts).await?;
                }
                None => counts.skipped += 1,
            }
        }

        for prop in &props {
            let prop_ctx = self.prop_context(&ctx, prop).await?;
            for model in ModelRegistry::all() {
                match model.analyze_prop_odds(&prop_ctx, prop) {
                    Some(analysis) => {
                        self.store_adjusted(analysis, &mut counts).await?;
                    }
                    None => counts.skipped += 1,
                }
            }
        }

        Ok(counts)
    }

    async fn prop_context(&self, base: &GameContext, prop: &PropOdds) -> Result<GameContext> {
        let mut ctx = base.clone();
        self.loader.attach_player(&mut ctx, prop).await?;
        Ok(ctx)
    }

    /// Apply dynamic weighting and write under the latest+history convention
    async fn store_adjusted(
        &self,
        mut analysis: crate::domain::AnalysisResult,
        counts: &mut GameCounts,
    ) -> Result<()> {
        analysis.confidence = self
            .weighting
            .adjust_confidence(
                analysis.sport,
                analysis.model,
                analysis.bet_type(),
                analysis.raw_confidence,
            )
            .await?;

        if self.ledger.put_analysis(&analysis).await? {
            counts.generated += 1;
        } else {
            counts.skipped += 1;
        }
        Ok(())
    }
}
