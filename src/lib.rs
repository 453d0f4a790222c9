//! # party-games
//!
//! A same-device collection of 2-4 player mini-games.
//!
//! ## Design Principles
//!
//! 1. **Games are reducers**: every game consumes explicit inputs and
//!    explicit elapsed time (`tick(dt)`). Nothing reads a clock, so a whole
//!    session replays identically from its seed.
//!
//! 2. **One lifecycle**: every game walks the same `ready -> playing ->
//!    result -> end` phase machine and shares player rotation, timers and
//!    scoring from [`core`].
//!
//! 3. **N-Player First**: every game takes its player count from the
//!    [`SessionConfig`] and works for any table of 2 to 4.
//!
//! ## Modules
//!
//! - `core`: players, RNG, phases, turn order, timers, scores, config, grid
//! - `maze`: procedural maze generation
//! - `rules`: the `MiniGame` contract and its object-safe `Playable` form
//! - `games`: the thirteen games
//! - `menu`: catalog, menu flow and game launch
//! - `autoplay`: random self-play until a game ends

pub mod core;
pub mod error;
pub mod maze;
pub mod rules;
pub mod games;
pub mod menu;
pub mod autoplay;

// Re-export commonly used types
pub use crate::core::{
    AppConfig, Countdown, Delay, DeviceType, Direction, FixedStep, GameResult, GameRng,
    RngSnapshot, Phase, PhaseEvent, PhaseMachine, PlayerColor, PlayerCount, PlayerId, PlayerMap,
    Pos, Scoreboard, SessionConfig, Stopwatch, TimerStatus, TurnOrder,
};

pub use crate::error::{GameError, Result, WordRejection};

pub use crate::maze::{CellMaze, Maze};

pub use crate::rules::{GameSession, MiniGame, Playable};

pub use crate::games::GameKind;

pub use crate::menu::{launch, CatalogEntry, Menu, Screen, CATALOG};

pub use crate::autoplay::{Autoplay, AutoplayConfig, AutoplayReport};
