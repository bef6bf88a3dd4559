//! Shared odds arithmetic for the model strategies

use crate::domain::{market, GameContext, OddsSnapshot};

/// Latest snapshots for one market, sorted by bookmaker for determinism
pub fn market_snapshots<'a>(odds: &'a [OddsSnapshot], market_key: &str) -> Vec<&'a OddsSnapshot> {
    let mut snapshots: Vec<&OddsSnapshot> = odds
        .iter()
        .filter(|s| s.market_key == market_key)
        .collect();
    snapshots.sort_by(|a, b| a.bookmaker.cmp(&b.bookmaker));
    snapshots
}

/// Two-sided moneyline prices (home, away)
pub fn moneyline_prices(snapshot: &OddsSnapshot, ctx: &GameContext) -> Option<(f64, f64)> {
    let home = snapshot.outcome(&ctx.game.home_team)?.price;
    let away = snapshot.outcome(&ctx.game.away_team)?.price;
    Some((home, away))
}

/// Home-relative spread handicap
pub fn home_spread_point(snapshot: &OddsSnapshot, ctx: &GameContext) -> Option<f64> {
    snapshot.outcome(&ctx.game.home_team)?.point
}

/// Spread history for this game at one bookmaker, oldest first.
/// Uses the alphabetically first bookmaker carrying at least two observations
/// so repeated runs always read the same series.
pub fn spread_series<'a>(ctx: &'a GameContext) -> Vec<&'a OddsSnapshot> {
    let mut books: Vec<&str> = ctx
        .odds_history
        .iter()
        .filter(|s| s.market_key == market::SPREADS)
        .map(|s| s.bookmaker.as_str())
        .collect();
    books.sort_unstable();
    books.dedup();

    for book in books {
        let series: Vec<&OddsSnapshot> = ctx
            .odds_history
            .iter()
            .filter(|s| s.market_key == market::SPREADS && s.bookmaker == book)
            .collect();
        if series.len() >= 2 {
            return series;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameInfo, OddsOutcome, Sport};
    use chrono::{Duration, Utc};

    fn ctx() -> GameContext {
        GameContext::bare(GameInfo {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            home_team: "Lakers".to_string(),
            away_team: "Warriors".to_string(),
            commence_time: Utc::now(),
        })
    }

    fn h2h_snapshot(book: &str, home_price: f64, away_price: f64) -> OddsSnapshot {
        OddsSnapshot {
            game_id: "g1".to_string(),
            sport: Sport::Nba,
            bookmaker: book.to_string(),
            market_key: market::H2H.to_string(),
            outcomes: vec![
                OddsOutcome {
                    name: "Lakers".to_string(),
                    price: home_price,
                    point: None,
                },
                OddsOutcome {
                    name: "Warriors".to_string(),
                    price: away_price,
                    point: None,
                },
            ],
            commence_time: Utc::now() + Duration::hours(4),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_market_snapshots_sorted_by_bookmaker() {
        let odds = vec![
            h2h_snapshot("fanduel", -150.0, 130.0),
            h2h_snapshot("betmgm", -145.0, 125.0),
        ];
        let snapshots = market_snapshots(&odds, market::H2H);
        assert_eq!(snapshots[0].bookmaker, "betmgm");
        assert_eq!(snapshots[1].bookmaker, "fanduel");
    }

    #[test]
    fn test_moneyline_prices() {
        let snapshot = h2h_snapshot("pinnacle", -150.0, 130.0);
        let (home, away) = moneyline_prices(&snapshot, &ctx()).unwrap();
        assert_eq!(home, -150.0);
        assert_eq!(away, 130.0);
    }

    #[test]
    fn test_missing_team_yields_none() {
        let mut snapshot = h2h_snapshot("pinnacle", -150.0, 130.0);
        snapshot.outcomes.remove(0);
        assert!(moneyline_prices(&snapshot, &ctx()).is_none());
    }
}
