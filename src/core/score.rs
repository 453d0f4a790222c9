//! Per-player scores and final standings.

use serde::{Deserialize, Serialize};

use super::player::{PlayerCount, PlayerId, PlayerMap};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Nobody scored and nobody survived.
    Draw,
    /// Several players share the top.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }

    /// Build a result from a list of top players.
    #[must_use]
    pub fn from_leaders(mut leaders: Vec<PlayerId>) -> Self {
        match leaders.len() {
            0 => GameResult::Draw,
            1 => GameResult::Winner(leaders.remove(0)),
            _ => GameResult::Winners(leaders),
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::Winner(p) => write!(f, "{p} wins"),
            GameResult::Draw => f.write_str("draw"),
            GameResult::Winners(ps) => {
                let names: Vec<String> = ps.iter().map(ToString::to_string).collect();
                write!(f, "tie between {}", names.join(", "))
            }
        }
    }
}

/// Running scores for every seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    scores: PlayerMap<i64>,
}

impl Scoreboard {
    /// Everyone at zero.
    #[must_use]
    pub fn new(players: PlayerCount) -> Self {
        Self {
            scores: PlayerMap::with_value(players.get(), 0),
        }
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.scores.player_count()
    }

    /// Current score of `player`.
    #[must_use]
    pub fn score(&self, player: PlayerId) -> i64 {
        self.scores[player]
    }

    /// Add `delta` (may be negative). Returns the new score.
    pub fn add(&mut self, player: PlayerId, delta: i64) -> i64 {
        self.scores[player] += delta;
        self.scores[player]
    }

    /// Add `delta` but never drop below zero. Returns the new score.
    pub fn add_floored(&mut self, player: PlayerId, delta: i64) -> i64 {
        let score = &mut self.scores[player];
        *score = (*score + delta).max(0);
        *score
    }

    /// Overwrite a score.
    pub fn set(&mut self, player: PlayerId, value: i64) {
        self.scores[player] = value;
    }

    /// Zero everything.
    pub fn reset(&mut self) {
        for (_, score) in self.scores.iter_mut() {
            *score = 0;
        }
    }

    /// Highest score on the board.
    #[must_use]
    pub fn top_score(&self) -> i64 {
        self.scores.values().copied().max().unwrap_or(0)
    }

    /// Every seat holding the highest score, in seat order.
    #[must_use]
    pub fn leaders(&self) -> Vec<PlayerId> {
        let top = self.top_score();
        self.scores
            .iter()
            .filter(|(_, score)| **score == top)
            .map(|(player, _)| player)
            .collect()
    }

    /// Seats sorted by descending score; ties keep seat order.
    #[must_use]
    pub fn ranking(&self) -> Vec<(PlayerId, i64)> {
        let mut ranked: Vec<(PlayerId, i64)> =
            self.scores.iter().map(|(player, score)| (player, *score)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Outcome by score alone. A board where nobody has scored is a draw.
    #[must_use]
    pub fn result(&self) -> GameResult {
        if self.scores.values().all(|score| *score == 0) {
            return GameResult::Draw;
        }
        GameResult::from_leaders(self.leaders())
    }

    /// Iterate over (player, score) in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, i64)> + '_ {
        self.scores.iter().map(|(player, score)| (player, *score))
    }
}
