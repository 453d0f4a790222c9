//! Shared player rotation.
//!
//! `TurnOrder` owns the active seat, which seats are eliminated, and how many
//! rounds have been played. Games call [`TurnOrder::advance`] to hand over to
//! the next seat; eliminated seats are skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::player::{PlayerCount, PlayerId, PlayerMap};

/// Active seat, eliminations and round bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    active: PlayerId,
    eliminated: PlayerMap<bool>,
    rounds_played: u32,
    round_limit: Option<u32>,
}

impl TurnOrder {
    /// Rotation starting at the first seat with no round limit.
    #[must_use]
    pub fn new(players: PlayerCount) -> Self {
        Self {
            active: PlayerId::new(0),
            eliminated: PlayerMap::with_value(players.get(), false),
            rounds_played: 0,
            round_limit: None,
        }
    }

    /// Stop after `limit` rounds in total.
    #[must_use]
    pub fn with_round_limit(mut self, limit: u32) -> Self {
        self.round_limit = Some(limit);
        self
    }

    /// Stop after every seat has played `per_player` rounds.
    #[must_use]
    pub fn with_rounds_per_player(self, per_player: u32) -> Self {
        let limit = per_player * self.player_count() as u32;
        self.with_round_limit(limit)
    }

    /// Number of seats, eliminated ones included.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.eliminated.player_count()
    }

    /// Seat whose turn it is.
    #[must_use]
    pub fn active(&self) -> PlayerId {
        self.active
    }

    /// Force the active seat.
    pub fn set_active(&mut self, player: PlayerId) {
        self.active = player;
    }

    /// True when `player` has been knocked out.
    #[must_use]
    pub fn is_eliminated(&self, player: PlayerId) -> bool {
        self.eliminated[player]
    }

    /// Knock `player` out. Returns false if they already were.
    pub fn eliminate(&mut self, player: PlayerId) -> bool {
        if self.eliminated[player] {
            return false;
        }
        self.eliminated[player] = true;
        debug!(player = %player, remaining = self.alive_count(), "player eliminated");
        true
    }

    /// Seats still in the game, in seat order.
    pub fn alive_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.eliminated
            .iter()
            .filter(|(_, out)| !**out)
            .map(|(player, _)| player)
    }

    /// Number of seats still in the game.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// The only seat left, if exactly one remains.
    #[must_use]
    pub fn sole_survivor(&self) -> Option<PlayerId> {
        let mut alive = self.alive_players();
        match (alive.next(), alive.next()) {
            (Some(player), None) => Some(player),
            _ => None,
        }
    }

    /// First non-eliminated seat after `from`, wrapping around, never `from` itself.
    #[must_use]
    pub fn next_alive_after(&self, from: PlayerId) -> Option<PlayerId> {
        let count = self.player_count();
        (1..count)
            .map(|offset| PlayerId::new(((from.index() + offset) % count) as u8))
            .find(|candidate| !self.eliminated[*candidate])
    }

    /// Hand the turn to the next non-eliminated seat.
    ///
    /// Returns the new active seat, or `None` (active seat unchanged) when no
    /// other seat can play.
    pub fn advance(&mut self) -> Option<PlayerId> {
        let next = self.next_alive_after(self.active)?;
        self.active = next;
        Some(next)
    }

    /// Rounds completed so far.
    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// 1-based number of the round in progress.
    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.rounds_played + 1
    }

    /// Configured total number of rounds.
    #[must_use]
    pub fn round_limit(&self) -> Option<u32> {
        self.round_limit
    }

    /// Record a finished round. Returns true when the round limit is reached.
    pub fn complete_round(&mut self) -> bool {
        self.rounds_played += 1;
        self.limit_reached()
    }

    /// True once `rounds_played` has reached the round limit.
    #[must_use]
    pub fn limit_reached(&self) -> bool {
        self.round_limit
            .is_some_and(|limit| self.rounds_played >= limit)
    }

    /// Back to the first seat, nobody eliminated, no rounds played.
    pub fn reset(&mut self) {
        self.active = PlayerId::new(0);
        for (_, out) in self.eliminated.iter_mut() {
            *out = false;
        }
        self.rounds_played = 0;
    }
}
