//! Typed ledger over the keyed repository
//!
//! Centralizes the two storage conventions every component relies on:
//!
//! - **Latest + history**: odds and analyses keep a mutable "latest"
//!   projection per logical slot plus an append-only history partition. The
//!   latest row is overwritten only when the payload actually changed, and
//!   every change appends one immutable history record — so retried runs are
//!   idempotent and add no duplicate signal.
//! - **Create-once verification**: grading a prediction writes the verified
//!   row and a marker keyed like the latest analysis; a second attempt sees
//!   the marker and is a no-op.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{
    AnalysisResult, BetKind, GameFinal, GameInfo, HeadToHead, InjuryReport, InversePrediction,
    ModelKind, OddsSnapshot, PlayerContext, PlayerGameStat, PropOdds, RestProfile, Sport,
    TeamForm, TeamSeasonStats, UserModel, VerifiedAnalysis,
};
use crate::domain::user_model::BacktestResult;
use crate::error::Result;

use super::{keys, query_all, Page, Record, Repository, SortRange};

/// Upper bound that sorts after any rfc3339 timestamp or id suffix
const SORT_MAX: &str = "\u{10FFFF}";

#[derive(Clone)]
pub struct Ledger {
    repo: Arc<dyn Repository>,
    page_size: usize,
}

impl Ledger {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            page_size: 100,
        }
    }

    pub fn with_page_size(repo: Arc<dyn Repository>, page_size: usize) -> Self {
        Self { repo, page_size }
    }

    pub fn repo(&self) -> &dyn Repository {
        self.repo.as_ref()
    }

    // -----------------------------------------------------------------------
    // Odds
    // -----------------------------------------------------------------------

    /// Record an observed snapshot. The latest pointer is overwritten only
    /// when the priced outcomes changed; every change also appends a history
    /// record. Returns whether anything was written.
    pub async fn record_odds(&self, snapshot: &OddsSnapshot) -> Result<bool> {
        let partition = keys::odds_latest_partition(snapshot.sport);
        let sort = keys::odds_latest_sort(snapshot);

        if let Some(existing) = self.repo.get(&partition, &sort).await? {
            let current: OddsSnapshot = existing.decode()?;
            if current.same_outcomes(snapshot) {
                return Ok(false);
            }
        }

        self.repo
            .put(Record::new(&partition, &sort, snapshot)?)
            .await?;
        self.repo
            .put(Record::new(
                keys::odds_history_partition(snapshot.sport, &snapshot.game_id),
                keys::odds_history_sort(snapshot),
                snapshot,
            )?)
            .await?;
        Ok(true)
    }

    /// Latest snapshot per (bookmaker, market) for one game
    pub async fn latest_odds_for_game(
        &self,
        sport: Sport,
        game_id: &str,
    ) -> Result<Vec<OddsSnapshot>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::odds_latest_partition(sport),
            SortRange::Prefix(format!("{game_id}{}", keys::SEP)),
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    /// Every observed snapshot for one game, oldest first per market
    pub async fn odds_history_for_game(
        &self,
        sport: Sport,
        game_id: &str,
    ) -> Result<Vec<OddsSnapshot>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::odds_history_partition(sport, game_id),
            SortRange::All,
            self.page_size,
        )
        .await?;
        let mut snapshots: Vec<OddsSnapshot> =
            records.iter().map(Record::decode).collect::<Result<_>>()?;
        snapshots.sort_by_key(|s| s.observed_at);
        Ok(snapshots)
    }

    // -----------------------------------------------------------------------
    // Games and outcomes
    // -----------------------------------------------------------------------

    pub async fn put_game(&self, game: &GameInfo) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::game_partition(game.sport),
                keys::game_sort(game.commence_time.date_naive(), &game.game_id),
                game,
            )?)
            .await
    }

    /// One page of games with commence date in [start, end]
    pub async fn games_between_page(
        &self,
        sport: Sport,
        start: NaiveDate,
        end: NaiveDate,
        page: Page,
    ) -> Result<(Vec<GameInfo>, Option<String>)> {
        let range = SortRange::Between(start.to_string(), format!("{end}{SORT_MAX}"));
        let result = self
            .repo
            .query(&keys::game_partition(sport), range, page)
            .await?;
        let games = result
            .items
            .iter()
            .map(Record::decode)
            .collect::<Result<Vec<GameInfo>>>()?;
        Ok((games, result.next_token))
    }

    pub async fn games_between(
        &self,
        sport: Sport,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<GameInfo>> {
        let mut games = Vec::new();
        let mut page = Page::first(self.page_size);
        loop {
            let (mut batch, next) = self.games_between_page(sport, start, end, page).await?;
            games.append(&mut batch);
            match next {
                Some(token) => page = Page::after(self.page_size, token),
                None => break,
            }
        }
        Ok(games)
    }

    pub async fn put_prop_odds(&self, prop: &PropOdds) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::prop_partition(prop.sport),
                keys::prop_sort(
                    &prop.game_id,
                    &prop.bookmaker,
                    &prop.market_key,
                    &prop.player_name,
                ),
                prop,
            )?)
            .await
    }

    /// Latest prop markets for one game
    pub async fn props_for_game(&self, sport: Sport, game_id: &str) -> Result<Vec<PropOdds>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::prop_partition(sport),
            SortRange::Prefix(format!("{game_id}{}", keys::SEP)),
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    pub async fn put_outcome(&self, outcome: &GameFinal) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::outcome_partition(outcome.sport),
                outcome.game_id.clone(),
                outcome,
            )?)
            .await
    }

    pub async fn outcome(&self, sport: Sport, game_id: &str) -> Result<Option<GameFinal>> {
        match self
            .repo
            .get(&keys::outcome_partition(sport), game_id)
            .await?
        {
            Some(record) => Ok(Some(record.decode()?)),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Context blocks
    // -----------------------------------------------------------------------

    pub async fn put_team_stats(&self, sport: Sport, stats: &TeamSeasonStats) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::team_stats_partition(sport),
                stats.team.clone(),
                stats,
            )?)
            .await
    }

    pub async fn team_stats(&self, sport: Sport, team: &str) -> Result<Option<TeamSeasonStats>> {
        self.get_decoded(&keys::team_stats_partition(sport), team).await
    }

    pub async fn put_team_form(&self, sport: Sport, form: &TeamForm) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::team_form_partition(sport),
                form.team.clone(),
                form,
            )?)
            .await
    }

    pub async fn team_form(&self, sport: Sport, team: &str) -> Result<Option<TeamForm>> {
        self.get_decoded(&keys::team_form_partition(sport), team).await
    }

    pub async fn put_rest_profile(&self, sport: Sport, rest: &RestProfile) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::rest_partition(sport),
                rest.team.clone(),
                rest,
            )?)
            .await
    }

    pub async fn rest_profile(&self, sport: Sport, team: &str) -> Result<Option<RestProfile>> {
        self.get_decoded(&keys::rest_partition(sport), team).await
    }

    pub async fn put_head_to_head(&self, sport: Sport, h2h: &HeadToHead) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::h2h_partition(sport),
                keys::h2h_sort(&h2h.home_team, &h2h.away_team),
                h2h,
            )?)
            .await
    }

    pub async fn head_to_head(
        &self,
        sport: Sport,
        home_team: &str,
        away_team: &str,
    ) -> Result<Option<HeadToHead>> {
        self.get_decoded(
            &keys::h2h_partition(sport),
            &keys::h2h_sort(home_team, away_team),
        )
        .await
    }

    pub async fn put_injury(&self, sport: Sport, report: &InjuryReport) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::injury_partition(sport),
                keys::injury_sort(&report.team, &report.player_name),
                report,
            )?)
            .await
    }

    pub async fn injuries_for_team(&self, sport: Sport, team: &str) -> Result<Vec<InjuryReport>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::injury_partition(sport),
            SortRange::Prefix(format!("{team}{}", keys::SEP)),
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    pub async fn put_player_context(&self, sport: Sport, player: &PlayerContext) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::player_partition(sport),
                player.player_name.clone(),
                player,
            )?)
            .await
    }

    pub async fn player_context(
        &self,
        sport: Sport,
        player_name: &str,
    ) -> Result<Option<PlayerContext>> {
        self.get_decoded(&keys::player_partition(sport), player_name).await
    }

    pub async fn put_player_game_stat(&self, stat: &PlayerGameStat) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::player_game_partition(&stat.game_id),
                stat.player_name.clone(),
                stat,
            )?)
            .await
    }

    pub async fn player_game_stat(
        &self,
        game_id: &str,
        player_name: &str,
    ) -> Result<Option<PlayerGameStat>> {
        self.get_decoded(&keys::player_game_partition(game_id), player_name)
            .await
    }

    // -----------------------------------------------------------------------
    // Predictions
    // -----------------------------------------------------------------------

    /// Store one analysis under the latest+history convention and keep its
    /// inverse in step. Unchanged analyses are skipped entirely. Returns
    /// whether anything was written.
    pub async fn put_analysis(&self, analysis: &AnalysisResult) -> Result<bool> {
        let partition = keys::analysis_latest_partition(analysis.sport);
        let sort = keys::analysis_latest_sort(analysis);

        if let Some(existing) = self.repo.get(&partition, &sort).await? {
            let current: AnalysisResult = existing.decode()?;
            if analysis_unchanged(&current, analysis) {
                return Ok(false);
            }
        }

        self.repo
            .put(Record::new(&partition, &sort, analysis)?)
            .await?;
        self.repo
            .put(Record::new(
                keys::analysis_history_partition(analysis.sport, &analysis.game_id),
                keys::analysis_history_sort(analysis),
                analysis,
            )?)
            .await?;

        // Exactly one inverse per invertible original, superseded in lockstep
        if let Some(inverse) = InversePrediction::derive(analysis) {
            self.repo
                .put(Record::new(
                    keys::inverse_partition(analysis.sport),
                    keys::inverse_sort(&inverse),
                    &inverse,
                )?)
                .await?;
        }

        debug!(
            game_id = %analysis.game_id,
            model = %analysis.model,
            prediction = %analysis.prediction,
            "stored analysis"
        );
        Ok(true)
    }

    /// Latest analyses for one game, all models and bookmakers
    pub async fn latest_analyses_for_game(
        &self,
        sport: Sport,
        game_id: &str,
    ) -> Result<Vec<AnalysisResult>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::analysis_latest_partition(sport),
            SortRange::Prefix(format!("{game_id}{}", keys::SEP)),
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    /// The stored inverse for one analysis, if that analysis was invertible
    pub async fn inverse_for(
        &self,
        analysis: &AnalysisResult,
    ) -> Result<Option<InversePrediction>> {
        let sort = keys::analysis_latest_sort(analysis);
        self.get_decoded(&keys::inverse_partition(analysis.sport), &sort)
            .await
    }

    // -----------------------------------------------------------------------
    // Verification ledger
    // -----------------------------------------------------------------------

    /// Whether this analysis has already been graded
    pub async fn is_verified(&self, analysis: &AnalysisResult) -> Result<bool> {
        let marker = self
            .repo
            .get(
                &keys::verified_marker_partition(analysis.sport),
                &keys::analysis_latest_sort(analysis),
            )
            .await?;
        Ok(marker.is_some())
    }

    /// Write a graded prediction exactly once. Returns false (and writes
    /// nothing) when the analysis was already verified.
    pub async fn record_verified(&self, verified: &VerifiedAnalysis) -> Result<bool> {
        let analysis = &verified.analysis;
        if self.is_verified(analysis).await? {
            return Ok(false);
        }

        let slot = keys::analysis_slot(
            analysis.market_key.as_deref(),
            analysis.player_name.as_deref(),
        );
        self.repo
            .put(Record::new(
                keys::verified_partition(analysis.sport, analysis.model, analysis.bet_type()),
                keys::verified_sort(
                    verified.outcome_verified_at,
                    &analysis.game_id,
                    &analysis.bookmaker,
                    &slot,
                ),
                verified,
            )?)
            .await?;
        self.repo
            .put(Record::new(
                keys::verified_marker_partition(analysis.sport),
                keys::analysis_latest_sort(analysis),
                &verified.outcome_verified_at,
            )?)
            .await?;
        Ok(true)
    }

    /// Write the graded inverse. Inverse grades live in their own partition
    /// and never touch the original's marker.
    pub async fn record_inverse_verified(&self, verified: &VerifiedAnalysis) -> Result<()> {
        let analysis = &verified.analysis;
        let slot = keys::analysis_slot(
            analysis.market_key.as_deref(),
            analysis.player_name.as_deref(),
        );
        self.repo
            .put(Record::new(
                keys::inverse_verified_partition(
                    analysis.sport,
                    analysis.model,
                    analysis.bet_type(),
                ),
                keys::verified_sort(
                    verified.outcome_verified_at,
                    &analysis.game_id,
                    &analysis.bookmaker,
                    &slot,
                ),
                verified,
            )?)
            .await
    }

    /// All verified predictions for (model, sport, bet_type) since a cutoff —
    /// one range query, the shape DynamicWeighting consumes.
    pub async fn verified_since(
        &self,
        sport: Sport,
        model: ModelKind,
        bet_type: BetKind,
        since: DateTime<Utc>,
    ) -> Result<Vec<VerifiedAnalysis>> {
        let range = SortRange::Between(since.to_rfc3339(), SORT_MAX.to_string());
        let records = query_all(
            self.repo.as_ref(),
            &keys::verified_partition(sport, model, bet_type),
            range,
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    /// The inverse-side ledger over the same window
    pub async fn inverse_verified_since(
        &self,
        sport: Sport,
        model: ModelKind,
        bet_type: BetKind,
        since: DateTime<Utc>,
    ) -> Result<Vec<VerifiedAnalysis>> {
        let range = SortRange::Between(since.to_rfc3339(), SORT_MAX.to_string());
        let records = query_all(
            self.repo.as_ref(),
            &keys::inverse_verified_partition(sport, model, bet_type),
            range,
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    // -----------------------------------------------------------------------
    // User models and backtests
    // -----------------------------------------------------------------------

    pub async fn put_user_model(&self, model: &UserModel) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::user_model_partition(&model.user_id),
                model.model_id.clone(),
                model,
            )?)
            .await
    }

    pub async fn user_model(&self, user_id: &str, model_id: &str) -> Result<Option<UserModel>> {
        self.get_decoded(&keys::user_model_partition(user_id), model_id)
            .await
    }

    pub async fn user_models(&self, user_id: &str) -> Result<Vec<UserModel>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::user_model_partition(user_id),
            SortRange::All,
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    pub async fn delete_user_model(&self, user_id: &str, model_id: &str) -> Result<()> {
        self.repo
            .delete(&keys::user_model_partition(user_id), model_id)
            .await
    }

    pub async fn put_backtest(&self, result: &BacktestResult) -> Result<()> {
        self.repo
            .put(Record::new(
                keys::backtest_partition(&result.user_id),
                keys::backtest_sort(result.created_at, &result.backtest_id),
                result,
            )?)
            .await
    }

    pub async fn backtests(&self, user_id: &str) -> Result<Vec<BacktestResult>> {
        let records = query_all(
            self.repo.as_ref(),
            &keys::backtest_partition(user_id),
            SortRange::All,
            self.page_size,
        )
        .await?;
        records.iter().map(Record::decode).collect()
    }

    async fn get_decoded<T: for<'de> serde::Deserialize<'de>>(
        &self,
        partition: &str,
        sort: &str,
    ) -> Result<Option<T>> {
        match self.repo.get(partition, sort).await? {
            Some(record) => Ok(Some(record.decode()?)),
            None => Ok(None),
        }
    }
}

/// Whether two analyses for the same slot carry the same content.
/// `created_at` is deliberately excluded so an identical re-run writes nothing.
fn analysis_unchanged(current: &AnalysisResult, incoming: &AnalysisResult) -> bool {
    current.pick == incoming.pick
        && current.prediction == incoming.prediction
        && (current.confidence - incoming.confidence).abs() < f64::EPSILON
        && (current.raw_confidence - incoming.raw_confidence).abs() < f64::EPSILON
        && current.reasoning == incoming.reasoning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisType, OddsOutcome, PickSide, PredictedPick};
    use crate::store::MemoryRepository;
    use chrono::TimeZone;

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(MemoryRepository::new()))
    }

    fn snapshot(price: f64) -> OddsSnapshot {
        OddsSnapshot {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            market_key: "h2h".to_string(),
            outcomes: vec![
                OddsOutcome {
                    name: "Lakers".to_string(),
                    price,
                    point: None,
                },
                OddsOutcome {
                    name: "Warriors".to_string(),
                    price: 100.0,
                    point: None,
                },
            ],
            commence_time: Utc.with_ymd_and_hms(2025, 1, 15, 2, 0, 0).unwrap(),
            observed_at: Utc::now(),
        }
    }

    fn analysis(confidence: f64) -> AnalysisResult {
        AnalysisResult {
            game_id: "g1".to_string(),
            model: ModelKind::Consensus,
            analysis_type: AnalysisType::Game,
            sport: Sport::Nba,
            bookmaker: "pinnacle".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            player_name: None,
            market_key: None,
            pick: PredictedPick::moneyline(PickSide::Home),
            prediction: "Lakers".to_string(),
            confidence,
            raw_confidence: confidence,
            reasoning: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_odds_skips_unchanged() {
        let ledger = ledger();
        assert!(ledger.record_odds(&snapshot(-150.0)).await.unwrap());
        // Same outcomes, later observation: latest unchanged, no history row
        assert!(!ledger.record_odds(&snapshot(-150.0)).await.unwrap());
        // Price moved: both latest and history written
        assert!(ledger.record_odds(&snapshot(-160.0)).await.unwrap());

        let history = ledger.odds_history_for_game(Sport::Nba, "g1").await.unwrap();
        assert_eq!(history.len(), 2);
        let latest = ledger.latest_odds_for_game(Sport::Nba, "g1").await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].outcomes[0].price, -160.0);
    }

    #[tokio::test]
    async fn test_put_analysis_keeps_inverse_in_step() {
        let ledger = ledger();
        let original = analysis(0.7);
        assert!(ledger.put_analysis(&original).await.unwrap());

        let inverse = ledger.inverse_for(&original).await.unwrap().unwrap();
        assert_eq!(inverse.pick.side, PickSide::Away);
        assert_eq!(inverse.prediction, "Warriors");

        // Identical re-run writes nothing
        assert!(!ledger.put_analysis(&analysis(0.7)).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_verified_is_create_once() {
        let ledger = ledger();
        let original = analysis(0.7);
        ledger.put_analysis(&original).await.unwrap();

        let verified = VerifiedAnalysis {
            analysis: original.clone(),
            actual_outcome: "Lakers 110-100 Warriors".to_string(),
            analysis_correct: true,
            outcome_verified_at: Utc::now(),
        };

        assert!(ledger.record_verified(&verified).await.unwrap());
        assert!(!ledger.record_verified(&verified).await.unwrap());

        let since = Utc::now() - chrono::Duration::days(1);
        let rows = ledger
            .verified_since(Sport::Nba, ModelKind::Consensus, BetKind::Moneyline, since)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].analysis_correct);
    }

    #[tokio::test]
    async fn test_games_between_is_date_bounded() {
        let ledger = ledger();
        for (id, day) in [("g1", 10), ("g2", 15), ("g3", 20)] {
            ledger
                .put_game(&GameInfo {
                    game_id: id.to_string(),
                    sport: Sport::Nba,
                    home_team: "A".to_string(),
                    away_team: "B".to_string(),
                    commence_time: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
                })
                .await
                .unwrap();
        }

        let games = ledger
            .games_between(
                Sport::Nba,
                NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, "g2");
    }
}
