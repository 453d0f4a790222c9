//! Game contract shared by every mini-game.
//!
//! Games implement `MiniGame`; the menu and the binary hold them as
//! `Box<dyn Playable>` through a [`GameSession`].

pub mod engine;

pub use engine::{GameSession, MiniGame, Playable};
