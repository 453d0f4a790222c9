//! Memory Match: flip two cards per turn looking for pairs.
//!
//! A match scores 10 and the same player goes again; a miss flips both
//! cards back and passes the turn. The game ends when every pair is found.
//! There is no per-round result screen: `Ready -> Playing -> End`.

use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::core::{
    Delay, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerCount, PlayerId,
    Scoreboard, SessionConfig, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

/// How long two face-up cards stay visible before they resolve.
pub const REVEAL_TIME: Duration = Duration::from_secs(1);
/// Points for a matched pair.
pub const MATCH_POINTS: i64 = 10;

/// Card faces.
pub const SYMBOLS: [&str; 12] = [
    "🍎", "🍌", "🍒", "🍓", "🍊", "🍉", "🍇", "🥝", "🍍", "🥥", "🍄", "🌶️",
];

/// Number of pairs on the table for a given player count.
#[must_use]
pub fn pair_count(players: PlayerCount) -> usize {
    match players.get() {
        2 => 8,
        3 => 9,
        _ => 12,
    }
}

/// One card on the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Index into [`SYMBOLS`].
    pub symbol: usize,
    pub face_up: bool,
    pub matched: bool,
}

/// Inputs of the memory game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryInput {
    /// Deal a new table (from the ready or final screen).
    Start,
    /// Turn over the card at this index.
    Flip(usize),
}

impl std::fmt::Display for MemoryInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryInput::Start => f.write_str("start"),
            MemoryInput::Flip(i) => write!(f, "flip {i}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolution {
    Match,
    Mismatch,
}

/// Memory match game state.
#[derive(Clone, Debug)]
pub struct MemoryMatch {
    players: PlayerCount,
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    cards: Vec<Card>,
    face_up: SmallVec<[usize; 2]>,
    matched_pairs: usize,
    pending: Delay<Resolution>,
}

impl MemoryMatch {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            players: session.players,
            rng: session.rng().for_context("memory_match"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players),
            scores: Scoreboard::new(session.players),
            cards: Vec::new(),
            face_up: SmallVec::new(),
            matched_pairs: 0,
            pending: Delay::new(),
        }
    }

    /// Cards on the table, in layout order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Pairs found so far.
    #[must_use]
    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    /// True while two cards are face up waiting to resolve.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.pending.is_pending()
    }

    fn deal(&mut self) {
        let pairs = pair_count(self.players);
        let mut deck: Vec<usize> = (0..pairs).chain(0..pairs).collect();
        self.rng.shuffle(&mut deck);
        self.cards = deck
            .into_iter()
            .map(|symbol| Card {
                symbol,
                face_up: false,
                matched: false,
            })
            .collect();
        self.face_up.clear();
        self.matched_pairs = 0;
        self.pending.cancel();
        self.scores.reset();
        self.turns.reset();
        debug!(pairs, "memory table dealt");
    }

    fn can_flip(&self, index: usize) -> bool {
        !self.pending.is_pending()
            && self.face_up.len() < 2
            && self
                .cards
                .get(index)
                .is_some_and(|card| !card.face_up && !card.matched)
    }

    fn flip(&mut self, index: usize) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        if !self.can_flip(index) {
            return Err(GameError::illegal(format!("card {index} cannot be flipped now")));
        }
        self.cards[index].face_up = true;
        self.face_up.push(index);

        if let [first, second] = self.face_up[..] {
            let resolution = if self.cards[first].symbol == self.cards[second].symbol {
                Resolution::Match
            } else {
                Resolution::Mismatch
            };
            self.pending.schedule(REVEAL_TIME, resolution);
        }
        Ok(())
    }

    fn resolve(&mut self, resolution: Resolution) {
        let player = self.turns.active();
        let flipped: SmallVec<[usize; 2]> = self.face_up.drain(..).collect();
        match resolution {
            Resolution::Match => {
                for &i in &flipped {
                    self.cards[i].matched = true;
                }
                self.scores.add(player, MATCH_POINTS);
                self.matched_pairs += 1;
                debug!(player = %player, pairs = self.matched_pairs, "pair matched");
                if self.matched_pairs >= self.cards.len() / 2 {
                    self.phase.advance(PhaseEvent::GameOver);
                    info!(result = %self.scores.result(), "memory match finished");
                }
            }
            Resolution::Mismatch => {
                for &i in &flipped {
                    self.cards[i].face_up = false;
                }
                self.turns.advance();
            }
        }
    }
}

impl MiniGame for MemoryMatch {
    type Input = MemoryInput;

    fn kind(&self) -> GameKind {
        GameKind::MemoryMatch
    }

    fn phase(&self) -> Phase {
        self.phase.phase()
    }

    fn active_player(&self) -> PlayerId {
        self.turns.active()
    }

    fn scoreboard(&self) -> &Scoreboard {
        &self.scores
    }

    fn legal_inputs(&self) -> Vec<MemoryInput> {
        match self.phase.phase() {
            Phase::Ready | Phase::End => vec![MemoryInput::Start],
            Phase::Playing => (0..self.cards.len())
                .filter(|&i| self.can_flip(i))
                .map(MemoryInput::Flip)
                .collect(),
            Phase::Result => Vec::new(),
        }
    }

    fn handle(&mut self, input: MemoryInput) -> Result<()> {
        match input {
            MemoryInput::Start => {
                if self.phase.is_over() {
                    self.phase.apply(PhaseEvent::Restart)?;
                }
                self.phase.apply(PhaseEvent::Start)?;
                self.deal();
                Ok(())
            }
            MemoryInput::Flip(index) => self.flip(index),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if let Some(resolution) = self.pending.tick(dt) {
            self.resolve(resolution);
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }

    fn status(&self) -> String {
        format!(
            "Memory Match | {} | {}'s turn | pairs {}/{}",
            self.phase.phase(),
            self.turns.active(),
            self.matched_pairs,
            self.cards.len() / 2
        )
    }
}
