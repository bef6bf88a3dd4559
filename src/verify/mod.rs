//! Outcome verification
//!
//! Grades stored predictions once the underlying game completes. Each
//! prediction moves `PENDING → VERIFIED` exactly once (the ledger marker
//! enforces it); the complementary inverse pick is constructed *before*
//! grading and graded independently into the inverse ledger, producing the
//! data the fade-detection reporting consumes.
//!
//! Failure semantics: anything that cannot be graded — Avoid picks, missing
//! player stats, damaged picks whose prediction text is also unparseable —
//! is skipped with a warning and left pending. Nothing is ever silently
//! graded wrong. A single bad record cannot fail the batch.

pub mod grading;

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    stat_code_for_market, AnalysisResult, AnalysisType, GameFinal, PickSide, PredictedPick,
    VerifiedAnalysis,
};
use crate::error::{EngineError, GradeError, Result};
use crate::store::Ledger;
use crate::weighting::DynamicWeighting;

pub use grading::{grade_game_pick, grade_prop_pick, parse_prediction};

/// Counts reported by one verification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    /// Originals graded this run
    pub verified: usize,
    /// Inverse predictions graded this run
    pub inverse_verified: usize,
    /// Left pending: not gradeable or already verified
    pub skipped: usize,
    /// Per-unit failures (collaborator errors), logged and skipped
    pub failed: usize,
}

/// What happened to one prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified { correct: bool },
    AlreadyVerified,
    /// Not gradeable; stays pending
    Skipped { reason: String },
}

pub struct OutcomeVerifier {
    ledger: Ledger,
    weighting: Option<Arc<DynamicWeighting>>,
}

impl OutcomeVerifier {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            weighting: None,
        }
    }

    /// Attach the weighting layer so its snapshot cache is dropped when new
    /// grades land
    pub fn with_weighting(mut self, weighting: Arc<DynamicWeighting>) -> Self {
        self.weighting = Some(weighting);
        self
    }

    /// Verification trigger: grade every stored prediction for a completed
    /// game. Batch semantics — per-unit failures are logged and counted,
    /// never propagated.
    pub async fn verify_game(&self, outcome: &GameFinal) -> Result<VerificationSummary> {
        self.ledger.put_outcome(outcome).await?;

        let analyses = self
            .ledger
            .latest_analyses_for_game(outcome.sport, &outcome.game_id)
            .await?;

        let mut summary = VerificationSummary::default();
        for analysis in &analyses {
            match self.verify_one(analysis, outcome).await {
                Ok(VerifyOutcome::Verified { .. }) => {
                    summary.verified += 1;
                    // The inverse grades alongside every graded original
                    match self.verify_inverse(analysis, outcome).await {
                        Ok(true) => summary.inverse_verified += 1,
                        Ok(false) => {}
                        Err(e) => {
                            warn!(
                                game_id = %analysis.game_id,
                                model = %analysis.model,
                                error = %e,
                                "inverse grading failed"
                            );
                            summary.failed += 1;
                        }
                    }
                }
                Ok(VerifyOutcome::AlreadyVerified) => summary.skipped += 1,
                Ok(VerifyOutcome::Skipped { reason }) => {
                    warn!(
                        game_id = %analysis.game_id,
                        model = %analysis.model,
                        prediction = %analysis.prediction,
                        %reason,
                        "verification skipped; prediction stays pending"
                    );
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        game_id = %analysis.game_id,
                        model = %analysis.model,
                        error = %e,
                        "verification failed; prediction stays pending"
                    );
                    summary.failed += 1;
                }
            }
        }

        if let Some(weighting) = &self.weighting {
            weighting.invalidate_all();
        }

        info!(
            game_id = %outcome.game_id,
            verified = summary.verified,
            inverse = summary.inverse_verified,
            skipped = summary.skipped,
            failed = summary.failed,
            "verification run complete"
        );
        Ok(summary)
    }

    /// Grade one prediction. Single-item semantics — collaborator failures
    /// surface as errors; ungradeable picks report as Skipped.
    pub async fn verify_one(
        &self,
        analysis: &AnalysisResult,
        outcome: &GameFinal,
    ) -> Result<VerifyOutcome> {
        if self.ledger.is_verified(analysis).await? {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        let graded = self.grade(analysis, &analysis.pick, outcome).await?;
        let (correct, actual) = match graded {
            Some(result) => result,
            None => {
                return Ok(VerifyOutcome::Skipped {
                    reason: "prediction not gradeable".to_string(),
                })
            }
        };

        let verified = VerifiedAnalysis {
            analysis: analysis.clone(),
            actual_outcome: actual,
            analysis_correct: correct,
            outcome_verified_at: Utc::now(),
        };
        if !self.ledger.record_verified(&verified).await? {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        debug!(
            game_id = %analysis.game_id,
            model = %analysis.model,
            prediction = %analysis.prediction,
            correct,
            "graded prediction"
        );
        Ok(VerifyOutcome::Verified { correct })
    }

    /// Construct the complementary pick and grade it independently.
    /// Returns whether an inverse grade was written.
    async fn verify_inverse(&self, analysis: &AnalysisResult, outcome: &GameFinal) -> Result<bool> {
        // Derive from the original pick before grading, never from the grade
        let Some(inverse_pick) = analysis.pick.inverse() else {
            return Ok(false);
        };

        let Some((correct, actual)) = self.grade(analysis, &inverse_pick, outcome).await? else {
            return Ok(false);
        };

        let prediction = crate::domain::render_pick(
            &inverse_pick,
            &analysis.home_team,
            &analysis.away_team,
            analysis.player_name.as_deref(),
        );
        let mut inverse_analysis = analysis.clone();
        inverse_analysis.pick = inverse_pick;
        inverse_analysis.prediction = prediction;
        // The counter-prediction holds the complementary belief
        inverse_analysis.confidence = (1.0 - analysis.confidence).clamp(0.0, 1.0);
        inverse_analysis.raw_confidence = (1.0 - analysis.raw_confidence).clamp(0.0, 1.0);

        self.ledger
            .record_inverse_verified(&VerifiedAnalysis {
                analysis: inverse_analysis,
                actual_outcome: actual,
                analysis_correct: correct,
                outcome_verified_at: Utc::now(),
            })
            .await?;
        Ok(true)
    }

    /// Grade one pick. `Ok(None)` means not gradeable (skip, stay pending).
    async fn grade(
        &self,
        analysis: &AnalysisResult,
        pick: &PredictedPick,
        outcome: &GameFinal,
    ) -> Result<Option<(bool, String)>> {
        match analysis.analysis_type {
            AnalysisType::Game => {
                let graded = match grade_game_pick(pick, outcome) {
                    Ok(correct) => Some(correct),
                    Err(GradeError::NotGradeable) => None,
                    // Damaged structured pick: fall back to the text parser.
                    // Only the original pick has prediction text to parse —
                    // a derived inverse with a damaged line stays ungraded.
                    Err(_) if *pick == analysis.pick => self.grade_from_text(analysis, outcome),
                    Err(_) => None,
                };
                Ok(graded.map(|correct| {
                    let actual = format!(
                        "{} {}-{} {}",
                        outcome.home_team,
                        outcome.home_score,
                        outcome.away_score,
                        outcome.away_team
                    );
                    (correct, actual)
                }))
            }
            AnalysisType::Prop => {
                if pick.side == PickSide::Avoid {
                    return Ok(None);
                }
                let (player, market) = match (&analysis.player_name, &analysis.market_key) {
                    (Some(player), Some(market)) => (player, market),
                    _ => return Ok(None),
                };
                let Some(stat_code) = stat_code_for_market(market) else {
                    warn!(%market, "prop market maps to no stat field");
                    return Ok(None);
                };
                let stat = self
                    .ledger
                    .player_game_stat(&analysis.game_id, player)
                    .await?
                    .ok_or_else(|| EngineError::MissingData(format!(
                        "no stat line for {player} in {}",
                        analysis.game_id
                    )))?;
                let Some(actual) = stat.stats.get(stat_code).copied() else {
                    return Err(EngineError::MissingData(format!(
                        "{stat_code} missing from {player}'s stat line"
                    )));
                };

                match grade_prop_pick(pick, actual) {
                    Ok(correct) => Ok(Some((correct, format!("{stat_code} {actual:.1}")))),
                    Err(_) => Ok(None),
                }
            }
        }
    }

    /// Last-resort text parse for game predictions with a damaged pick
    fn grade_from_text(&self, analysis: &AnalysisResult, outcome: &GameFinal) -> Option<bool> {
        let pick = parse_prediction(
            &analysis.prediction,
            &analysis.home_team,
            &analysis.away_team,
        )?;
        grade_game_pick(&pick, outcome).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BetKind, ModelKind, PlayerGameStat, Sport};
    use crate::store::MemoryRepository;
    use std::collections::HashMap;

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(MemoryRepository::new()))
    }

    fn game_analysis(pick: PredictedPick, prediction: &str) -> AnalysisResult {
        AnalysisResult {
            game_id: "g1".to_string(),
            model: ModelKind::Momentum,
            analysis_type: AnalysisType::Game,
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            player_name: None,
            market_key: None,
            pick,
            prediction: prediction.to_string(),
            confidence: 0.7,
            raw_confidence: 0.7,
            reasoning: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    fn prop_analysis(pick: PredictedPick) -> AnalysisResult {
        AnalysisResult {
            game_id: "g1".to_string(),
            model: ModelKind::HotCold,
            analysis_type: AnalysisType::Prop,
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            player_name: Some("LeBron James".to_string()),
            market_key: Some("player_points".to_string()),
            pick,
            prediction: "LeBron James Over 25.5".to_string(),
            confidence: 0.65,
            raw_confidence: 0.65,
            reasoning: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    fn final_score(home: i32, away: i32) -> GameFinal {
        GameFinal {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            home_score: home,
            away_score: away,
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_spread_scenario_verifies_correct() {
        let ledger = ledger();
        let analysis = game_analysis(
            PredictedPick::spread(PickSide::Home, -5.5),
            "Lakers -5.5",
        );
        ledger.put_analysis(&analysis).await.unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let summary = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.inverse_verified, 1);
        assert_eq!(summary.failed, 0);

        let since = Utc::now() - chrono::Duration::days(1);
        let rows = ledger
            .verified_since(Sport::Nba, ModelKind::Momentum, BetKind::Spread, since)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].analysis_correct);

        // The inverse graded independently, and opposite
        let inverse_rows = ledger
            .inverse_verified_since(Sport::Nba, ModelKind::Momentum, BetKind::Spread, since)
            .await
            .unwrap();
        assert_eq!(inverse_rows.len(), 1);
        assert!(!inverse_rows[0].analysis_correct);
        assert_eq!(inverse_rows[0].analysis.prediction, "Warriors +5.5");
    }

    #[tokio::test]
    async fn test_verification_is_terminal() {
        let ledger = ledger();
        let analysis = game_analysis(PredictedPick::moneyline(PickSide::Home), "Lakers");
        ledger.put_analysis(&analysis).await.unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let first = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(first.verified, 1);

        // Re-running the trigger grades nothing twice
        let second = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(second.verified, 0);
        assert_eq!(second.skipped, 1);
    }

    #[tokio::test]
    async fn test_prop_grades_against_stat_line() {
        let ledger = ledger();
        let analysis = prop_analysis(PredictedPick::prop(PickSide::Over, 25.5));
        ledger.put_analysis(&analysis).await.unwrap();
        ledger
            .put_player_game_stat(&PlayerGameStat {
                game_id: "g1".to_string(),
                player_name: "LeBron James".to_string(),
                stats: HashMap::from([("PTS".to_string(), 31.0)]),
            })
            .await
            .unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let summary = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(summary.verified, 1);

        let since = Utc::now() - chrono::Duration::days(1);
        let rows = ledger
            .verified_since(Sport::Nba, ModelKind::HotCold, BetKind::PlayerProp, since)
            .await
            .unwrap();
        assert!(rows[0].analysis_correct);
        assert_eq!(rows[0].actual_outcome, "PTS 31.0");
    }

    #[tokio::test]
    async fn test_missing_stat_line_fails_the_unit_not_the_batch() {
        let ledger = ledger();
        ledger
            .put_analysis(&prop_analysis(PredictedPick::prop(PickSide::Over, 25.5)))
            .await
            .unwrap();
        ledger
            .put_analysis(&game_analysis(
                PredictedPick::moneyline(PickSide::Home),
                "Lakers",
            ))
            .await
            .unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let summary = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        // Game prediction graded; prop failed on the missing stat line
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_avoid_recommendation_stays_pending() {
        let ledger = ledger();
        let avoid = prop_analysis(PredictedPick {
            kind: BetKind::PlayerProp,
            side: PickSide::Avoid,
            line: Some(25.5),
        });
        ledger.put_analysis(&avoid).await.unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let summary = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(summary.verified, 0);
        assert_eq!(summary.skipped, 1);
        assert!(!ledger.is_verified(&avoid).await.unwrap());
    }

    #[tokio::test]
    async fn test_damaged_pick_falls_back_to_text() {
        let ledger = ledger();
        // Spread pick with its line lost; the prediction string survives
        let damaged = game_analysis(
            PredictedPick {
                kind: BetKind::Spread,
                side: PickSide::Home,
                line: None,
            },
            "Lakers -5.5",
        );
        ledger.put_analysis(&damaged).await.unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let summary = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(summary.verified, 1);
    }

    #[tokio::test]
    async fn test_unparseable_damaged_pick_stays_pending() {
        let ledger = ledger();
        let damaged = game_analysis(
            PredictedPick {
                kind: BetKind::Spread,
                side: PickSide::Home,
                line: None,
            },
            "hammer the hook",
        );
        ledger.put_analysis(&damaged).await.unwrap();

        let verifier = OutcomeVerifier::new(ledger.clone());
        let summary = verifier.verify_game(&final_score(110, 100)).await.unwrap();
        assert_eq!(summary.verified, 0);
        assert_eq!(summary.skipped, 1);
        assert!(!ledger.is_verified(&damaged).await.unwrap());
    }
}
