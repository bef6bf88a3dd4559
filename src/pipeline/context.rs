//! Game context assembly
//!
//! Pulls every block a game's evaluators and models may consult out of the
//! repository. Absent blocks stay `None` — the heuristics degrade, the load
//! never fails on missing data.

use crate::domain::{GameContext, GameInfo, InjuryStatus, PlayerContext, PropOdds};
use crate::error::Result;
use crate::store::Ledger;

#[derive(Clone)]
pub struct ContextLoader {
    ledger: Ledger,
}

impl ContextLoader {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Assemble the full context for one game
    pub async fn load_game_context(&self, game: &GameInfo) -> Result<GameContext> {
        let sport = game.sport;
        let mut ctx = GameContext::bare(game.clone());

        ctx.home_stats = self.ledger.team_stats(sport, &game.home_team).await?;
        ctx.away_stats = self.ledger.team_stats(sport, &game.away_team).await?;
        ctx.home_form = self.ledger.team_form(sport, &game.home_team).await?;
        ctx.away_form = self.ledger.team_form(sport, &game.away_team).await?;
        ctx.home_rest = self.ledger.rest_profile(sport, &game.home_team).await?;
        ctx.away_rest = self.ledger.rest_profile(sport, &game.away_team).await?;
        ctx.head_to_head = self
            .ledger
            .head_to_head(sport, &game.home_team, &game.away_team)
            .await?;

        let mut injuries = self.ledger.injuries_for_team(sport, &game.home_team).await?;
        injuries.extend(self.ledger.injuries_for_team(sport, &game.away_team).await?);
        ctx.injuries = injuries;

        ctx.odds_history = self.ledger.odds_history_for_game(sport, &game.game_id).await?;
        Ok(ctx)
    }

    /// Extend a game context with the player block for one prop market
    pub async fn attach_player(&self, ctx: &mut GameContext, prop: &PropOdds) -> Result<()> {
        let stored = self
            .ledger
            .player_context(prop.sport, &prop.player_name)
            .await?;

        let mut player = stored.unwrap_or_else(|| PlayerContext {
            player_name: prop.player_name.clone(),
            team: String::new(),
            recent_averages: Default::default(),
            status: None,
            prop_market: None,
            prop_line: None,
        });

        // The injury table is authoritative when the player block has no status
        if player.status.is_none() {
            player.status = injury_status_for(ctx, &prop.player_name);
        }
        player.prop_market = Some(prop.market_key.clone());
        player.prop_line = Some(prop.line);

        ctx.player = Some(player);
        Ok(())
    }
}

fn injury_status_for(ctx: &GameContext, player_name: &str) -> Option<InjuryStatus> {
    ctx.injuries
        .iter()
        .find(|r| r.player_name == player_name)
        .map(|r| r.status)
}
