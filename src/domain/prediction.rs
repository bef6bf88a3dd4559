//! Prediction records and their structured pick representation
//!
//! Every `AnalysisResult` carries a `PredictedPick` alongside the
//! human-readable prediction string, so grading and inversion are exhaustive
//! matches over a closed type rather than text parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::odds::Sport;

/// The eight built-in analysis models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Consensus,
    Value,
    Momentum,
    Contrarian,
    HotCold,
    RestSchedule,
    Matchup,
    InjuryAware,
}

impl ModelKind {
    pub const ALL: [ModelKind; 8] = [
        Self::Consensus,
        Self::Value,
        Self::Momentum,
        Self::Contrarian,
        Self::HotCold,
        Self::RestSchedule,
        Self::Matchup,
        Self::InjuryAware,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Consensus => "consensus",
            Self::Value => "value",
            Self::Momentum => "momentum",
            Self::Contrarian => "contrarian",
            Self::HotCold => "hot_cold",
            Self::RestSchedule => "rest_schedule",
            Self::Matchup => "matchup",
            Self::InjuryAware => "injury_aware",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consensus" => Some(Self::Consensus),
            "value" => Some(Self::Value),
            "momentum" => Some(Self::Momentum),
            "contrarian" => Some(Self::Contrarian),
            "hot_cold" => Some(Self::HotCold),
            "rest_schedule" => Some(Self::RestSchedule),
            "matchup" => Some(Self::Matchup),
            "injury_aware" => Some(Self::InjuryAware),
            _ => None,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the prediction is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Game,
    Prop,
}

impl AnalysisType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Prop => "prop",
        }
    }
}

/// Bet classification used for grading and ledger keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Spread,
    Total,
    Moneyline,
    PlayerProp,
}

impl BetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spread => "spread",
            Self::Total => "total",
            Self::Moneyline => "moneyline",
            Self::PlayerProp => "player_prop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spread" => Some(Self::Spread),
            "total" => Some(Self::Total),
            "moneyline" => Some(Self::Moneyline),
            "player_prop" => Some(Self::PlayerProp),
            _ => None,
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The side a pick takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickSide {
    Home,
    Away,
    Over,
    Under,
    /// Stand aside — published as a warning, never graded or inverted
    Avoid,
}

/// Structured pick: the machine-gradable form of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPick {
    pub kind: BetKind,
    pub side: PickSide,
    /// Spread handicap (home-relative), total line, or prop line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
}

impl PredictedPick {
    pub fn moneyline(side: PickSide) -> Self {
        Self {
            kind: BetKind::Moneyline,
            side,
            line: None,
        }
    }

    pub fn spread(side: PickSide, line: f64) -> Self {
        Self {
            kind: BetKind::Spread,
            side,
            line: Some(line),
        }
    }

    pub fn total(side: PickSide, line: f64) -> Self {
        Self {
            kind: BetKind::Total,
            side,
            line: Some(line),
        }
    }

    pub fn prop(side: PickSide, line: f64) -> Self {
        Self {
            kind: BetKind::PlayerProp,
            side,
            line: Some(line),
        }
    }

    /// The complementary pick, or None when the pick has no inverse
    pub fn inverse(&self) -> Option<PredictedPick> {
        let side = match self.side {
            PickSide::Home => PickSide::Away,
            PickSide::Away => PickSide::Home,
            PickSide::Over => PickSide::Under,
            PickSide::Under => PickSide::Over,
            PickSide::Avoid => return None,
        };
        Some(PredictedPick {
            kind: self.kind,
            side,
            line: self.line,
        })
    }
}

/// One model's published prediction for one event at one bookmaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub game_id: String,
    pub model: ModelKind,
    pub analysis_type: AnalysisType,
    pub sport: Sport,
    pub bookmaker: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_key: Option<String>,
    pub pick: PredictedPick,
    /// Human-readable form of the pick, e.g. "Lakers -5.5"
    pub prediction: String,
    /// Confidence after dynamic weighting, in [0, 1]
    pub confidence: f64,
    /// Confidence as the model emitted it, before weighting
    pub raw_confidence: f64,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// The ledger bet-type bucket this prediction is graded under
    pub fn bet_type(&self) -> BetKind {
        self.pick.kind
    }
}

/// A graded prediction. Created exactly once per AnalysisResult; terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedAnalysis {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub actual_outcome: String,
    pub analysis_correct: bool,
    pub outcome_verified_at: DateTime<Utc>,
}

/// The complementary counter-prediction derived from an invertible original.
/// Stored and graded under its own ledger key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InversePrediction {
    pub game_id: String,
    pub model: ModelKind,
    pub analysis_type: AnalysisType,
    pub sport: Sport,
    pub bookmaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_key: Option<String>,
    pub pick: PredictedPick,
    pub prediction: String,
    /// Confidence of the original it fades
    pub original_confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl InversePrediction {
    /// Derive the counter-prediction for an analysis, if it is invertible
    pub fn derive(analysis: &AnalysisResult) -> Option<Self> {
        let pick = analysis.pick.inverse()?;
        let prediction = render_pick(
            &pick,
            &analysis.home_team,
            &analysis.away_team,
            analysis.player_name.as_deref(),
        );
        Some(Self {
            game_id: analysis.game_id.clone(),
            model: analysis.model,
            analysis_type: analysis.analysis_type,
            sport: analysis.sport,
            bookmaker: analysis.bookmaker.clone(),
            player_name: analysis.player_name.clone(),
            market_key: analysis.market_key.clone(),
            pick,
            prediction,
            original_confidence: analysis.confidence,
            created_at: analysis.created_at,
        })
    }
}

/// Render a pick as the human-readable prediction string
pub fn render_pick(
    pick: &PredictedPick,
    home_team: &str,
    away_team: &str,
    player: Option<&str>,
) -> String {
    fn team<'a>(side: PickSide, home: &'a str, away: &'a str) -> &'a str {
        match side {
            PickSide::Home => home,
            _ => away,
        }
    }
    match (pick.kind, pick.side) {
        (BetKind::Moneyline, side @ (PickSide::Home | PickSide::Away)) => {
            team(side, home_team, away_team).to_string()
        }
        (BetKind::Spread, side @ (PickSide::Home | PickSide::Away)) => {
            let line = pick.line.unwrap_or(0.0);
            // Stored spread line is home-relative; flip the sign for the away side
            let signed = if side == PickSide::Home { line } else { -line };
            format!("{} {:+.1}", team(side, home_team, away_team), signed)
        }
        (BetKind::Total, PickSide::Over) => format!("Over {:.1}", pick.line.unwrap_or(0.0)),
        (BetKind::Total, PickSide::Under) => format!("Under {:.1}", pick.line.unwrap_or(0.0)),
        (BetKind::PlayerProp, PickSide::Over) => format!(
            "{} Over {:.1}",
            player.unwrap_or("?"),
            pick.line.unwrap_or(0.0)
        ),
        (BetKind::PlayerProp, PickSide::Under) => format!(
            "{} Under {:.1}",
            player.unwrap_or("?"),
            pick.line.unwrap_or(0.0)
        ),
        (_, PickSide::Avoid) => format!("AVOID {}", player.unwrap_or(home_team)),
        // Remaining combinations are never constructed by the models
        (kind, side) => format!("{kind:?} {side:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_roundtrip() {
        for kind in ModelKind::ALL {
            assert_eq!(ModelKind::parse(kind.as_str()), Some(kind));
        }
        assert!(ModelKind::parse("oracle").is_none());
    }

    #[test]
    fn test_pick_inverse_flips_side_keeps_line() {
        let pick = PredictedPick::spread(PickSide::Home, -5.5);
        let inv = pick.inverse().unwrap();
        assert_eq!(inv.side, PickSide::Away);
        assert_eq!(inv.kind, BetKind::Spread);
        assert_eq!(inv.line, Some(-5.5));

        let total = PredictedPick::total(PickSide::Over, 220.5);
        assert_eq!(total.inverse().unwrap().side, PickSide::Under);
    }

    #[test]
    fn test_avoid_is_not_invertible() {
        let pick = PredictedPick {
            kind: BetKind::PlayerProp,
            side: PickSide::Avoid,
            line: Some(25.5),
        };
        assert!(pick.inverse().is_none());
    }

    #[test]
    fn test_render_spread_sides() {
        let home = PredictedPick::spread(PickSide::Home, -5.5);
        assert_eq!(render_pick(&home, "Lakers", "Warriors", None), "Lakers -5.5");

        let away = PredictedPick::spread(PickSide::Away, -5.5);
        assert_eq!(
            render_pick(&away, "Lakers", "Warriors", None),
            "Warriors +5.5"
        );
    }

    #[test]
    fn test_render_totals_and_props() {
        let over = PredictedPick::total(PickSide::Over, 220.5);
        assert_eq!(render_pick(&over, "Lakers", "Warriors", None), "Over 220.5");

        let prop = PredictedPick::prop(PickSide::Under, 25.5);
        assert_eq!(
            render_pick(&prop, "Lakers", "Warriors", Some("LeBron James")),
            "LeBron James Under 25.5"
        );
    }
}
