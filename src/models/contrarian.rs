//! Contrarian model — fade the public
//!
//! Reads the same movement series as the Momentum model but trusts sharp
//! signals over raw drift: reverse line movement (line and price pointing in
//! opposite directions) and one-sided juice. With no sharp signal it falls
//! back to fading the favorite.

use crate::domain::{
    fair_probability, market, AnalysisResult, GameContext, ModelKind, OddsSnapshot, PickSide,
    PredictedPick, PropOdds,
};

use super::common::{home_spread_point, market_snapshots, moneyline_prices, spread_series};
use super::{game_result, prop_result, AnalysisModel};

#[derive(Debug)]
pub struct ContrarianModel;

const RLM_THRESHOLD: f64 = 0.5;
const HEAVY_JUICE: f64 = -130.0;

impl AnalysisModel for ContrarianModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Contrarian
    }

    fn analyze_game_odds(
        &self,
        ctx: &GameContext,
        odds: &[OddsSnapshot],
    ) -> Option<AnalysisResult> {
        let moneylines = market_snapshots(odds, market::H2H);
        let first_ml: Option<(String, f64)> = moneylines.first().and_then(|s| {
            moneyline_prices(s, ctx).map(|(h, a)| (s.bookmaker.clone(), fair_probability(h, a)))
        });
        let fair_home = first_ml.as_ref().map(|(_, fair)| *fair);

        // Reverse line movement: the spread chased one side while the
        // moneyline still prices the other side stronger.
        let series = spread_series(ctx);
        if let (Some(oldest), Some(newest), Some(fair_home)) =
            (series.first(), series.last(), fair_home)
        {
            if let (Some(opening), Some(current)) =
                (home_spread_point(oldest, ctx), home_spread_point(newest, ctx))
            {
                let movement = current - opening;
                if movement <= -RLM_THRESHOLD && fair_home < 0.5 {
                    // Line toward home, prices still on away: sharps on away
                    let reasoning = format!(
                        "reverse line movement: spread {:+.1} to {:+.1} against {:.1}% home fair probability",
                        opening, current, fair_home * 100.0
                    );
                    return Some(game_result(
                        ctx,
                        self.kind(),
                        &newest.bookmaker,
                        PredictedPick::spread(PickSide::Away, current),
                        0.7,
                        reasoning,
                    ));
                }
                if movement >= RLM_THRESHOLD && fair_home > 0.5 {
                    let reasoning = format!(
                        "reverse line movement: spread {:+.1} to {:+.1} against {:.1}% away fair probability",
                        opening, current, (1.0 - fair_home) * 100.0
                    );
                    return Some(game_result(
                        ctx,
                        self.kind(),
                        &newest.bookmaker,
                        PredictedPick::spread(PickSide::Home, current),
                        0.7,
                        reasoning,
                    ));
                }
            }
        }

        // Price imbalance on the spread: one side carrying all the juice
        for snapshot in market_snapshots(odds, market::SPREADS) {
            let (Some(home), Some(away)) = (
                snapshot.outcome(&ctx.game.home_team),
                snapshot.outcome(&ctx.game.away_team),
            ) else {
                continue;
            };
            let Some(line) = home.point else {
                continue;
            };
            if home.price <= HEAVY_JUICE && away.price > HEAVY_JUICE {
                let reasoning = format!(
                    "spread juice {:+.0}/{:+.0} concentrated on the home side",
                    home.price, away.price
                );
                return Some(game_result(
                    ctx,
                    self.kind(),
                    &snapshot.bookmaker,
                    PredictedPick::spread(PickSide::Home, line),
                    0.65,
                    reasoning,
                ));
            }
            if away.price <= HEAVY_JUICE && home.price > HEAVY_JUICE {
                let reasoning = format!(
                    "spread juice {:+.0}/{:+.0} concentrated on the away side",
                    home.price, away.price
                );
                return Some(game_result(
                    ctx,
                    self.kind(),
                    &snapshot.bookmaker,
                    PredictedPick::spread(PickSide::Away, line),
                    0.65,
                    reasoning,
                ));
            }
        }

        // No sharp signal: fade the moneyline favorite
        let (book, fair_home) = first_ml?;
        if (fair_home - 0.5).abs() < 0.08 {
            // No meaningful favorite to fade
            return None;
        }
        let side = if fair_home > 0.5 { PickSide::Away } else { PickSide::Home };
        let reasoning = format!(
            "fading the {:.1}% favorite at {book}",
            fair_home.max(1.0 - fair_home) * 100.0
        );
        Some(game_result(
            ctx,
            self.kind(),
            &book,
            PredictedPick::moneyline(side),
            0.55,
            reasoning,
        ))
    }

    fn analyze_prop_odds(&self, ctx: &GameContext, prop: &PropOdds) -> Option<AnalysisResult> {
        // Heavy one-sided juice on a prop is public money; take the other side
        let (side, faded) = if prop.over_price <= HEAVY_JUICE && prop.under_price > HEAVY_JUICE {
            (PickSide::Under, prop.over_price)
        } else if prop.under_price <= HEAVY_JUICE && prop.over_price > HEAVY_JUICE {
            (PickSide::Over, prop.under_price)
        } else {
            return None;
        };

        let reasoning = format!(
            "fading the {:+.0} side of {} {:.1}",
            faded, prop.market_key, prop.line
        );
        Some(prop_result(
            ctx,
            self.kind(),
            prop,
            PredictedPick::prop(side, prop.line),
            0.6,
            reasoning,
        ))
    }
}
