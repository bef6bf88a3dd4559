//! Odds market records
//!
//! `OddsSnapshot` is the immutable unit of observed bookmaker data. A
//! "latest" projection per (game, bookmaker, market) is maintained by the
//! ledger; every change also lands as an append-only history record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported sports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Nba,
    Nfl,
    Mlb,
    Nhl,
}

impl Sport {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nba => "nba",
            Self::Nfl => "nfl",
            Self::Mlb => "mlb",
            Self::Nhl => "nhl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nba" => Some(Self::Nba),
            "nfl" => Some(Self::Nfl),
            "mlb" => Some(Self::Mlb),
            "nhl" => Some(Self::Nhl),
            _ => None,
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard game market keys
pub mod market {
    pub const H2H: &str = "h2h";
    pub const SPREADS: &str = "spreads";
    pub const TOTALS: &str = "totals";
}

/// One priced outcome within a market (e.g. "Lakers" at -150, point -5.5)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsOutcome {
    pub name: String,
    /// American price (e.g. -110, +145)
    pub price: f64,
    /// Handicap or total line where the market carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
}

/// A single observation of one bookmaker market for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsSnapshot {
    pub game_id: String,
    pub sport: Sport,
    pub bookmaker: String,
    pub market_key: String,
    pub outcomes: Vec<OddsOutcome>,
    pub commence_time: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}

impl OddsSnapshot {
    /// The outcome priced for `name`, if present
    pub fn outcome(&self, name: &str) -> Option<&OddsOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Whether two snapshots carry the same priced outcomes.
    /// Used by the ledger to decide if the latest pointer actually changed.
    pub fn same_outcomes(&self, other: &OddsSnapshot) -> bool {
        self.outcomes == other.outcomes
    }
}

/// The prop-market projection of a snapshot: one player, one line, two prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropOdds {
    pub game_id: String,
    pub sport: Sport,
    pub bookmaker: String,
    pub player_name: String,
    /// e.g. "player_points", "player_rebounds", "player_assists"
    pub market_key: String,
    pub line: f64,
    pub over_price: f64,
    pub under_price: f64,
    pub commence_time: DateTime<Utc>,
}

/// Stat code a prop market key settles against
pub fn stat_code_for_market(market_key: &str) -> Option<&'static str> {
    match market_key {
        "player_points" => Some("PTS"),
        "player_rebounds" => Some("REB"),
        "player_assists" => Some("AST"),
        "player_threes" => Some("3PM"),
        "player_steals" => Some("STL"),
        "player_blocks" => Some("BLK"),
        "player_points_rebounds_assists" => Some("PRA"),
        _ => None,
    }
}

/// Implied probability of an American price, vig included
pub fn implied_probability(price: f64) -> f64 {
    if price < 0.0 {
        let p = -price;
        p / (p + 100.0)
    } else {
        100.0 / (price + 100.0)
    }
}

/// Two-sided implied probability sum minus one: the bookmaker's margin
pub fn vig(price_a: f64, price_b: f64) -> f64 {
    implied_probability(price_a) + implied_probability(price_b) - 1.0
}

/// Fair (vig-removed) probability of side A given a two-sided market
pub fn fair_probability(price_a: f64, price_b: f64) -> f64 {
    let a = implied_probability(price_a);
    let b = implied_probability(price_b);
    if a + b <= 0.0 {
        return 0.5;
    }
    a / (a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_probability_favorite() {
        // -150: 150/250 = 0.6
        assert!((implied_probability(-150.0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_implied_probability_underdog() {
        // +150: 100/250 = 0.4
        assert!((implied_probability(150.0) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_standard_vig() {
        // -110 both sides: 2 * (110/210) - 1 ≈ 0.0476
        let v = vig(-110.0, -110.0);
        assert!((v - 0.047619).abs() < 1e-4, "vig={v}");
    }

    #[test]
    fn test_fair_probability_sums_to_one() {
        let a = fair_probability(-150.0, 130.0);
        let b = fair_probability(130.0, -150.0);
        assert!((a + b - 1.0).abs() < 1e-9);
        assert!(a > 0.5, "favorite should carry the larger fair probability");
    }

    #[test]
    fn test_sport_roundtrip() {
        for sport in [Sport::Nba, Sport::Nfl, Sport::Mlb, Sport::Nhl] {
            assert_eq!(Sport::parse(sport.as_str()), Some(sport));
        }
        assert_eq!(Sport::parse("cricket"), None);
    }
}
