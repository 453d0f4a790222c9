//! The mini-games.
//!
//! Each game lives in its own module with its own state struct, `Input`
//! enum and [`MiniGame`](crate::rules::MiniGame) impl. Games share the
//! phase machine, turn order, timers and scoreboard from [`crate::core`].

pub mod memory_match;
pub mod quick_math;
pub mod color_dash;
pub mod emoji_guess;
pub mod reaction_battle;
pub mod maze_runner;
pub mod tank_battle;
pub mod bomber_arena;
pub mod rocket_race;
pub mod laser_duel;
pub mod shape_drop;
pub mod balloon_pop;
pub mod word_chain;

pub use balloon_pop::BalloonPop;
pub use bomber_arena::BomberArena;
pub use color_dash::ColorDash;
pub use emoji_guess::EmojiGuess;
pub use laser_duel::LaserDuel;
pub use maze_runner::MazeRunner;
pub use memory_match::MemoryMatch;
pub use quick_math::QuickMath;
pub use reaction_battle::ReactionBattle;
pub use rocket_race::RocketRace;
pub use shape_drop::ShapeDrop;
pub use tank_battle::TankBattle;
pub use word_chain::WordChain;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Identifies one game of the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TankBattle,
    BomberArena,
    RocketRace,
    LaserDuel,
    ColorDash,
    MemoryMatch,
    QuickMath,
    ShapeDrop,
    ReactionBattle,
    MazeRunner,
    EmojiGuess,
    WordChain,
    BalloonPop,
}

impl GameKind {
    /// Every game, in menu order.
    pub const ALL: [GameKind; 13] = [
        GameKind::TankBattle,
        GameKind::BomberArena,
        GameKind::RocketRace,
        GameKind::LaserDuel,
        GameKind::ColorDash,
        GameKind::MemoryMatch,
        GameKind::QuickMath,
        GameKind::ShapeDrop,
        GameKind::ReactionBattle,
        GameKind::MazeRunner,
        GameKind::EmojiGuess,
        GameKind::WordChain,
        GameKind::BalloonPop,
    ];

    /// Machine name, as typed on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GameKind::TankBattle => "tank_battle",
            GameKind::BomberArena => "bomber_arena",
            GameKind::RocketRace => "rocket_race",
            GameKind::LaserDuel => "laser_duel",
            GameKind::ColorDash => "color_dash",
            GameKind::MemoryMatch => "memory_match",
            GameKind::QuickMath => "quick_math",
            GameKind::ShapeDrop => "shape_drop",
            GameKind::ReactionBattle => "reaction_battle",
            GameKind::MazeRunner => "maze_runner",
            GameKind::EmojiGuess => "emoji_guess",
            GameKind::WordChain => "word_chain",
            GameKind::BalloonPop => "balloon_pop",
        }
    }

    /// Display title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            GameKind::TankBattle => "Tank Battle",
            GameKind::BomberArena => "Bomber Arena",
            GameKind::RocketRace => "Rocket Race",
            GameKind::LaserDuel => "Laser Duel",
            GameKind::ColorDash => "Color Dash",
            GameKind::MemoryMatch => "Memory Match",
            GameKind::QuickMath => "Quick Math Duel",
            GameKind::ShapeDrop => "Shape Drop",
            GameKind::ReactionBattle => "Reaction Battle",
            GameKind::MazeRunner => "Maze Runner",
            GameKind::EmojiGuess => "Emoji Guess",
            GameKind::WordChain => "Word Chain",
            GameKind::BalloonPop => "Balloon Pop",
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for GameKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| GameError::UnknownGame(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("memory_match".parse::<GameKind>(), Ok(GameKind::MemoryMatch));
        assert_eq!("Word-Chain".parse::<GameKind>(), Ok(GameKind::WordChain));
        assert_eq!(
            "chess".parse::<GameKind>(),
            Err(GameError::UnknownGame("chess".into()))
        );
    }

    #[test]
    fn test_names_unique() {
        for (i, a) in GameKind::ALL.iter().enumerate() {
            for b in &GameKind::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
