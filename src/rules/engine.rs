//! The contract every mini-game implements.
//!
//! Games implement `MiniGame` to define:
//! - Which inputs are accepted right now
//! - How an input changes the game
//! - How elapsed time changes the game
//! - Who won once the game is over
//!
//! The menu, the binary and autoplay only ever talk to games through this
//! trait (or its object-safe [`Playable`] form), never through game-specific
//! types.

use std::fmt::{Debug, Display};
use std::time::Duration;

use im::Vector;
use tracing::{debug, info};

use crate::core::{GameResult, Phase, PlayerId, Scoreboard};
use crate::error::{GameError, Result};
use crate::games::GameKind;

/// A single mini-game modelled as a reducer over inputs and elapsed time.
///
/// ## Implementation Notes
///
/// - `legal_inputs`: must be finite; empty while the game waits for time
///   to pass (a card flip resolving, a bomb fuse burning)
/// - `handle`: rejected inputs return `Err` and leave the game untouched
/// - `tick`: the only way time passes; never read a clock
/// - `outcome`: `None` until the game reaches [`Phase::End`]
pub trait MiniGame {
    /// Everything a player can do in this game.
    type Input: Clone + Debug + Display;

    /// Which game this is.
    fn kind(&self) -> GameKind;

    /// Current lifecycle phase.
    fn phase(&self) -> Phase;

    /// Seat whose turn it is. Simultaneous games report the first seat.
    fn active_player(&self) -> PlayerId;

    /// Running scores.
    fn scoreboard(&self) -> &Scoreboard;

    /// Inputs `handle` would accept right now.
    fn legal_inputs(&self) -> Vec<Self::Input>;

    /// Apply one input.
    fn handle(&mut self, input: Self::Input) -> Result<()>;

    /// Let `dt` of time pass.
    fn tick(&mut self, dt: Duration);

    /// Final result once the game is over.
    fn outcome(&self) -> Option<GameResult>;

    // === Convenience Methods ===

    /// True once the game reached its final screen.
    fn is_over(&self) -> bool {
        self.phase() == Phase::End
    }

    /// One-line description of the current state.
    fn status(&self) -> String {
        format!(
            "{} | {} | {}'s turn",
            self.kind().title(),
            self.phase(),
            self.active_player()
        )
    }
}

/// Object-safe view of a running game, as held by the menu and the binary.
///
/// Inputs travel as their display strings so callers do not need to know
/// the game's concrete input type.
pub trait Playable {
    fn kind(&self) -> GameKind;
    fn phase(&self) -> Phase;
    fn active_player(&self) -> PlayerId;
    fn scoreboard(&self) -> &Scoreboard;
    fn outcome(&self) -> Option<GameResult>;
    fn status(&self) -> String;

    /// Display strings of the inputs currently accepted.
    fn moves(&self) -> Vec<String>;

    /// Play the input at `index` of [`Playable::moves`]. Returns its label.
    fn play_move(&mut self, index: usize) -> Result<String>;

    /// Play the input whose label is `label`.
    fn play_named(&mut self, label: &str) -> Result<()>;

    /// Let `dt` of time pass.
    fn tick(&mut self, dt: Duration);

    /// Everything that happened so far, oldest first.
    fn log(&self) -> &Vector<String>;

    /// True once the game reached its final screen.
    fn is_over(&self) -> bool {
        self.phase() == Phase::End
    }
}

/// Owns a game and records its inputs and phase changes.
#[derive(Clone, Debug)]
pub struct GameSession<G: MiniGame> {
    game: G,
    log: Vector<String>,
    last_phase: Phase,
}

impl<G: MiniGame> GameSession<G> {
    /// Wrap a freshly created game.
    pub fn new(game: G) -> Self {
        let last_phase = game.phase();
        info!(game = game.kind().name(), "session started");
        Self {
            game,
            log: Vector::new(),
            last_phase,
        }
    }

    /// The wrapped game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Mutable access to the wrapped game.
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Unwrap.
    pub fn into_inner(self) -> G {
        self.game
    }

    fn apply(&mut self, input: G::Input) -> Result<()> {
        let player = self.game.active_player();
        let label = input.to_string();
        self.game.handle(input)?;
        debug!(game = self.game.kind().name(), player = %player, input = %label, "input accepted");
        self.log.push_back(format!("{player}: {label}"));
        self.note_phase();
        Ok(())
    }

    fn note_phase(&mut self) {
        let phase = self.game.phase();
        if phase != self.last_phase {
            self.log.push_back(format!("-- {phase}"));
            if phase == Phase::End {
                if let Some(result) = self.game.outcome() {
                    info!(game = self.game.kind().name(), %result, "game over");
                    self.log.push_back(format!("result: {result}"));
                }
            }
            self.last_phase = phase;
        }
    }
}

impl<G: MiniGame> Playable for GameSession<G> {
    fn kind(&self) -> GameKind {
        self.game.kind()
    }

    fn phase(&self) -> Phase {
        self.game.phase()
    }

    fn active_player(&self) -> PlayerId {
        self.game.active_player()
    }

    fn scoreboard(&self) -> &Scoreboard {
        self.game.scoreboard()
    }

    fn outcome(&self) -> Option<GameResult> {
        self.game.outcome()
    }

    fn status(&self) -> String {
        self.game.status()
    }

    fn moves(&self) -> Vec<String> {
        self.game
            .legal_inputs()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn play_move(&mut self, index: usize) -> Result<String> {
        let input = self
            .game
            .legal_inputs()
            .into_iter()
            .nth(index)
            .ok_or_else(|| GameError::illegal(format!("no move numbered {index}")))?;
        let label = input.to_string();
        self.apply(input)?;
        Ok(label)
    }

    fn play_named(&mut self, label: &str) -> Result<()> {
        let input = self
            .game
            .legal_inputs()
            .into_iter()
            .find(|input| input.to_string() == label)
            .ok_or_else(|| GameError::illegal(format!("'{label}' is not a legal move")))?;
        self.apply(input)
    }

    fn tick(&mut self, dt: Duration) {
        self.game.tick(dt);
        self.note_phase();
    }

    fn log(&self) -> &Vector<String> {
        &self.log
    }
}
