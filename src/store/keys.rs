//! Composite key builders
//!
//! Key layout is the single place entity addressing is defined. Partitions
//! group the records each component range-scans; sort keys order them so a
//! scan comes back in a deterministic, useful order (time or id).
//!
//! ```text
//! odds#latest#{sport}                 {game_id}#{bookmaker}#{market}
//! odds#history#{sport}#{game_id}      {bookmaker}#{market}#{observed_at}
//! analysis#latest#{sport}             {game_id}#{model}#{bookmaker}#{slot}
//! analysis#history#{sport}#{game_id}  {model}#{bookmaker}#{slot}#{created_at}
//! inverse#{sport}                     {game_id}#{model}#{bookmaker}#{slot}
//! verified#{sport}#{model}#{bet_type} {verified_at}#{game_id}#{bookmaker}#{slot}
//! inverse_verified#{sport}#{model}#{bet_type}  (same sort shape)
//! verified_marker#{sport}             {game_id}#{model}#{bookmaker}#{slot}
//! game#{sport}                        {commence_date}#{game_id}
//! outcome#{sport}                     {game_id}
//! team_stats#{sport} / team_form#{sport} / rest#{sport}   {team}
//! h2h#{sport}                         {team_a}#{team_b}   (sorted pair)
//! injury#{sport}                      {team}#{player}
//! player#{sport}                      {player}
//! player_game#{game_id}               {player}
//! user_model#{user_id}                {model_id}
//! backtest#{user_id}                  {created_at}#{backtest_id}
//! ```
//!
//! `slot` distinguishes the game market ("game") from a prop market
//! ("{market_key}#{player}") so one model can hold both for one game.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{AnalysisResult, BetKind, InversePrediction, ModelKind, OddsSnapshot, Sport};

pub const SEP: char = '#';

/// Market slot within a prediction key: game market or one prop market
pub fn analysis_slot(market_key: Option<&str>, player_name: Option<&str>) -> String {
    match (market_key, player_name) {
        (Some(market), Some(player)) => format!("{market}{SEP}{player}"),
        _ => "game".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

pub fn odds_latest_partition(sport: Sport) -> String {
    format!("odds{SEP}latest{SEP}{sport}")
}

pub fn odds_latest_sort(snapshot: &OddsSnapshot) -> String {
    format!(
        "{}{SEP}{}{SEP}{}",
        snapshot.game_id, snapshot.bookmaker, snapshot.market_key
    )
}

pub fn odds_history_partition(sport: Sport, game_id: &str) -> String {
    format!("odds{SEP}history{SEP}{sport}{SEP}{game_id}")
}

pub fn odds_history_sort(snapshot: &OddsSnapshot) -> String {
    format!(
        "{}{SEP}{}{SEP}{}",
        snapshot.bookmaker,
        snapshot.market_key,
        snapshot.observed_at.to_rfc3339()
    )
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

pub fn analysis_latest_partition(sport: Sport) -> String {
    format!("analysis{SEP}latest{SEP}{sport}")
}

pub fn analysis_latest_sort(analysis: &AnalysisResult) -> String {
    let slot = analysis_slot(
        analysis.market_key.as_deref(),
        analysis.player_name.as_deref(),
    );
    format!(
        "{}{SEP}{}{SEP}{}{SEP}{}",
        analysis.game_id, analysis.model, analysis.bookmaker, slot
    )
}

pub fn analysis_history_partition(sport: Sport, game_id: &str) -> String {
    format!("analysis{SEP}history{SEP}{sport}{SEP}{game_id}")
}

pub fn analysis_history_sort(analysis: &AnalysisResult) -> String {
    let slot = analysis_slot(
        analysis.market_key.as_deref(),
        analysis.player_name.as_deref(),
    );
    format!(
        "{}{SEP}{}{SEP}{}{SEP}{}",
        analysis.model,
        analysis.bookmaker,
        slot,
        analysis.created_at.to_rfc3339()
    )
}

pub fn inverse_partition(sport: Sport) -> String {
    format!("inverse{SEP}{sport}")
}

pub fn inverse_sort(inverse: &InversePrediction) -> String {
    let slot = analysis_slot(inverse.market_key.as_deref(), inverse.player_name.as_deref());
    format!(
        "{}{SEP}{}{SEP}{}{SEP}{}",
        inverse.game_id, inverse.model, inverse.bookmaker, slot
    )
}

// ---------------------------------------------------------------------------
// Verification ledger
// ---------------------------------------------------------------------------

pub fn verified_partition(sport: Sport, model: ModelKind, bet_type: BetKind) -> String {
    format!("verified{SEP}{sport}{SEP}{model}{SEP}{bet_type}")
}

pub fn inverse_verified_partition(sport: Sport, model: ModelKind, bet_type: BetKind) -> String {
    format!("inverse_verified{SEP}{sport}{SEP}{model}{SEP}{bet_type}")
}

pub fn verified_sort(
    verified_at: DateTime<Utc>,
    game_id: &str,
    bookmaker: &str,
    slot: &str,
) -> String {
    format!("{}{SEP}{game_id}{SEP}{bookmaker}{SEP}{slot}", verified_at.to_rfc3339())
}

/// Marker keyed like the latest analysis, recording that the prediction was
/// already graded. This is what makes verification create-once.
pub fn verified_marker_partition(sport: Sport) -> String {
    format!("verified_marker{SEP}{sport}")
}

// ---------------------------------------------------------------------------
// Games, outcomes, context blocks
// ---------------------------------------------------------------------------

pub fn game_partition(sport: Sport) -> String {
    format!("game{SEP}{sport}")
}

pub fn game_sort(commence_date: NaiveDate, game_id: &str) -> String {
    format!("{commence_date}{SEP}{game_id}")
}

pub fn outcome_partition(sport: Sport) -> String {
    format!("outcome{SEP}{sport}")
}

pub fn prop_partition(sport: Sport) -> String {
    format!("prop{SEP}{sport}")
}

pub fn prop_sort(game_id: &str, bookmaker: &str, market_key: &str, player: &str) -> String {
    format!("{game_id}{SEP}{bookmaker}{SEP}{market_key}{SEP}{player}")
}

pub fn team_stats_partition(sport: Sport) -> String {
    format!("team_stats{SEP}{sport}")
}

pub fn team_form_partition(sport: Sport) -> String {
    format!("team_form{SEP}{sport}")
}

pub fn rest_partition(sport: Sport) -> String {
    format!("rest{SEP}{sport}")
}

pub fn h2h_partition(sport: Sport) -> String {
    format!("h2h{SEP}{sport}")
}

/// Head-to-head rows are stored once under the lexicographically sorted pair
pub fn h2h_sort(team_a: &str, team_b: &str) -> String {
    if team_a <= team_b {
        format!("{team_a}{SEP}{team_b}")
    } else {
        format!("{team_b}{SEP}{team_a}")
    }
}

pub fn injury_partition(sport: Sport) -> String {
    format!("injury{SEP}{sport}")
}

pub fn injury_sort(team: &str, player: &str) -> String {
    format!("{team}{SEP}{player}")
}

pub fn player_partition(sport: Sport) -> String {
    format!("player{SEP}{sport}")
}

pub fn player_game_partition(game_id: &str) -> String {
    format!("player_game{SEP}{game_id}")
}

// ---------------------------------------------------------------------------
// User models and backtests
// ---------------------------------------------------------------------------

pub fn user_model_partition(user_id: &str) -> String {
    format!("user_model{SEP}{user_id}")
}

pub fn backtest_partition(user_id: &str) -> String {
    format!("backtest{SEP}{user_id}")
}

pub fn backtest_sort(created_at: DateTime<Utc>, backtest_id: &str) -> String {
    format!("{}{SEP}{backtest_id}", created_at.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h2h_pair_is_order_independent() {
        assert_eq!(h2h_sort("Lakers", "Warriors"), h2h_sort("Warriors", "Lakers"));
    }

    #[test]
    fn test_analysis_slot() {
        assert_eq!(analysis_slot(None, None), "game");
        assert_eq!(
            analysis_slot(Some("player_points"), Some("LeBron James")),
            "player_points#LeBron James"
        );
    }

    #[test]
    fn test_verified_partition_is_one_range() {
        let partition = verified_partition(Sport::Nba, ModelKind::Momentum, BetKind::Spread);
        assert_eq!(partition, "verified#nba#momentum#spread");
    }
}
