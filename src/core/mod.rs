//! Game-agnostic building blocks shared by every mini-game.
//!
//! Players and seats, randomness, the four-phase round lifecycle, player
//! rotation, timers, scoring, grid coordinates and session configuration.
//! Games compose these rather than re-implementing them.

pub mod player;
pub mod rng;
pub mod phase;
pub mod turn;
pub mod timer;
pub mod score;
pub mod config;
pub mod grid;

pub use player::{PlayerColor, PlayerCount, PlayerId, PlayerMap};
pub use rng::{GameRng, RngSnapshot};
pub use phase::{InvalidTransition, Phase, PhaseEvent, PhaseMachine};
pub use turn::TurnOrder;
pub use timer::{Countdown, Delay, FixedStep, Stopwatch, TimerStatus};
pub use score::{GameResult, Scoreboard};
pub use config::{AppConfig, DeviceType, SessionConfig};
pub use grid::{Direction, Pos};
