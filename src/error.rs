//! Crate-wide error type.
//!
//! Every input a player can produce is validated by the game it targets.
//! Rejected inputs come back as a `GameError` and leave the game untouched.

use thiserror::Error;

use crate::core::phase::{InvalidTransition, Phase};
use crate::core::PlayerId;

/// Result alias used across the crate.
pub type Result<T, E = GameError> = std::result::Result<T, E>;

/// Why a word chain submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordRejection {
    /// Nothing was typed.
    #[error("no word entered")]
    Empty,
    /// The word does not continue the chain.
    #[error("word must start with '{expected}'")]
    WrongStartingLetter {
        /// Letter the word had to start with.
        expected: char,
    },
    /// The word already appears in the chain.
    #[error("'{0}' has already been used")]
    AlreadyUsed(String),
    /// The word is shorter than the minimum length.
    #[error("word must have at least {min} letters")]
    TooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Errors produced by the menu, the session config and the games.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Player count outside the supported 2-4 range.
    #[error("player count must be between 2 and 4, got {0}")]
    InvalidPlayerCount(usize),
    /// The shared phase machine refused a transition.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// An input arrived in a phase that does not accept it.
    #[error("input not accepted in {actual:?} phase (expected {expected:?})")]
    WrongPhase {
        /// Phase the input needs.
        expected: Phase,
        /// Phase the game is in.
        actual: Phase,
    },
    /// The player is eliminated or otherwise cannot act.
    #[error("{0} cannot act right now")]
    PlayerCannotAct(PlayerId),
    /// The move is not legal in the current state.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// A word chain submission was refused.
    #[error(transparent)]
    Word(#[from] WordRejection),
    /// No game with that menu id or name.
    #[error("unknown game: {0}")]
    UnknownGame(String),
    /// The menu is not on a screen that allows this action.
    #[error("menu action not available: {0}")]
    Menu(String),
    /// The configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GameError {
    /// Shorthand for [`GameError::IllegalMove`].
    pub fn illegal(message: impl Into<String>) -> Self {
        GameError::IllegalMove(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_rejection_messages() {
        let err = GameError::from(WordRejection::WrongStartingLetter { expected: 'k' });
        assert_eq!(err.to_string(), "word must start with 'k'");

        let err = GameError::from(WordRejection::TooShort { min: 3 });
        assert_eq!(err.to_string(), "word must have at least 3 letters");
    }

    #[test]
    fn test_invalid_player_count_message() {
        let err = GameError::InvalidPlayerCount(5);
        assert_eq!(err.to_string(), "player count must be between 2 and 4, got 5");
    }
}
