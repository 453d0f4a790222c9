//! Shared round lifecycle: `Ready -> Playing -> Result -> End`.
//!
//! Every game in the collection runs the same four-phase loop. Games own a
//! `PhaseMachine` and drive it with `PhaseEvent`s; the machine rejects any
//! transition that is not part of the loop.
//!
//! ```text
//!            Start          Finish          Next
//!   Ready ----------> Playing ------> Result -----> Ready (next player)
//!     ^                  |               |
//!     |                  | GameOver      | GameOver
//!     |                  v               v
//!     +---- Restart ---- End <-----------+
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{GameError, Result};

/// Named state of a game's per-round lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the active player to begin their round.
    #[default]
    Ready,
    /// The round is in progress.
    Playing,
    /// The round is over and its outcome is on screen.
    Result,
    /// The game is over; final standings are on screen.
    End,
}

impl Phase {
    /// Short lowercase name, used in status lines and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Playing => "playing",
            Phase::Result => "result",
            Phase::End => "end",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Events that move a [`PhaseMachine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// Active player begins their round.
    Start,
    /// The round has been decided.
    Finish,
    /// Hand over to the next player.
    Next,
    /// No more rounds will be played.
    GameOver,
    /// Start a fresh game from the final screen.
    Restart,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the event was received.
    pub from: Phase,
    /// The event that cannot be applied from this phase.
    pub event: PhaseEvent,
}

/// Four-phase round state machine shared by all games.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: Phase,
    version: u32,
}

impl PhaseMachine {
    /// Create a machine in `Ready`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a machine that starts directly in `phase`.
    ///
    /// Used by games whose first round begins without a ready screen.
    #[must_use]
    pub fn starting_in(phase: Phase) -> Self {
        Self { phase, version: 0 }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of transitions applied so far.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// True once the game is over.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::End
    }

    /// Fail with [`GameError::WrongPhase`] unless the machine is in `expected`.
    pub fn require(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Validate and apply an event, returning the new phase.
    pub fn apply(&mut self, event: PhaseEvent) -> Result<Phase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        debug!(from = %self.phase, to = %next, ?event, "phase transition");
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Apply an event the caller expects to be valid.
    ///
    /// An invalid event is logged and ignored; the current phase is returned.
    /// Used from `tick`, where there is no caller to report an error to.
    pub fn advance(&mut self, event: PhaseEvent) -> Phase {
        match self.apply(event) {
            Ok(next) => next,
            Err(err) => {
                warn!(error = %err, "ignored phase event");
                self.phase
            }
        }
    }

    /// Check whether an event would be accepted without applying it.
    #[must_use]
    pub fn can_apply(&self, event: PhaseEvent) -> bool {
        self.compute_transition(event).is_ok()
    }

    fn compute_transition(&self, event: PhaseEvent) -> Result<Phase, InvalidTransition> {
        let next = match (self.phase, event) {
            (Phase::Ready, PhaseEvent::Start) => Phase::Playing,
            (Phase::Playing, PhaseEvent::Finish) => Phase::Result,
            (Phase::Result, PhaseEvent::Next) => Phase::Ready,
            (Phase::Playing | Phase::Result, PhaseEvent::GameOver) => Phase::End,
            (Phase::End, PhaseEvent::Restart) => Phase::Ready,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }
}
