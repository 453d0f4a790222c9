//! Game catalog and the menu flow that leads into a game.
//!
//! The menu walks `DeviceSelection -> Main -> GameSelection -> InGame`.
//! Choosing a game produces the [`SessionConfig`] the game is launched with;
//! leaving a game returns to device selection.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{DeviceType, GameRng, PlayerCount, SessionConfig};
use crate::error::{GameError, Result};
use crate::games::{
    BalloonPop, BomberArena, ColorDash, EmojiGuess, GameKind, LaserDuel, MazeRunner, MemoryMatch,
    QuickMath, ReactionBattle, RocketRace, ShapeDrop, TankBattle, WordChain,
};
use crate::rules::{GameSession, Playable};

/// One entry of the game selection screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Menu id.
    pub id: u32,
    pub kind: GameKind,
    pub description: &'static str,
    pub min_players: usize,
    pub max_players: usize,
}

impl CatalogEntry {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.kind.title()
    }

    #[must_use]
    pub fn supports(&self, players: usize) -> bool {
        (self.min_players..=self.max_players).contains(&players)
    }
}

const fn entry(id: u32, kind: GameKind, description: &'static str) -> CatalogEntry {
    CatalogEntry {
        id,
        kind,
        description,
        min_players: PlayerCount::MIN,
        max_players: PlayerCount::MAX,
    }
}

/// Every game in menu order.
pub const CATALOG: [CatalogEntry; 13] = [
    entry(1, GameKind::TankBattle, "Steer your tank and outshoot your rivals."),
    entry(5, GameKind::BomberArena, "Drop bombs in turn and be the last one standing."),
    entry(10, GameKind::RocketRace, "Launch a rocket as close to the target as you can."),
    entry(20, GameKind::LaserDuel, "Bounce your laser off mirrors to hit an opponent."),
    entry(30, GameKind::ColorDash, "Pick the named color before anyone else."),
    entry(40, GameKind::MemoryMatch, "Flip cards and remember where the pairs are."),
    entry(50, GameKind::QuickMath, "Solve arithmetic against the clock."),
    entry(60, GameKind::ShapeDrop, "Catch the falling target shapes."),
    entry(70, GameKind::ReactionBattle, "Tap the moment the signal appears."),
    entry(80, GameKind::MazeRunner, "Find the way out of a fresh maze."),
    entry(90, GameKind::EmojiGuess, "Guess what the emoji means."),
    entry(100, GameKind::WordChain, "Continue the chain with a word from the last letter."),
    entry(110, GameKind::BalloonPop, "Pop balloons and keep your combo going."),
];

/// Catalog entry with menu id `id`.
#[must_use]
pub fn find_entry(id: u32) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

/// Catalog entry of `kind`.
#[must_use]
pub fn entry_for(kind: GameKind) -> &'static CatalogEntry {
    CATALOG
        .iter()
        .find(|entry| entry.kind == kind)
        .unwrap_or(&CATALOG[0])
}

/// Screen the menu is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    DeviceSelection,
    Main,
    GameSelection,
    InGame(GameKind),
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Screen::DeviceSelection => f.write_str("device selection"),
            Screen::Main => f.write_str("main menu"),
            Screen::GameSelection => f.write_str("game selection"),
            Screen::InGame(kind) => write!(f, "playing {kind}"),
        }
    }
}

/// Menu state: chosen device, chosen player count, current screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    screen: Screen,
    device: Option<DeviceType>,
    players: PlayerCount,
    seed: Option<u64>,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    /// Fresh menu on the device selection screen with two players selected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::DeviceSelection,
            device: None,
            players: PlayerCount::default(),
            seed: None,
        }
    }

    /// Launch every game with `seed` instead of a fresh one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn device(&self) -> Option<DeviceType> {
        self.device
    }

    #[must_use]
    pub fn players(&self) -> PlayerCount {
        self.players
    }

    fn require(&self, screen: Screen, action: &str) -> Result<()> {
        if self.screen == screen {
            Ok(())
        } else {
            Err(GameError::Menu(format!("cannot {action} on the {}", self.screen)))
        }
    }

    pub fn select_device(&mut self, device: DeviceType) -> Result<()> {
        self.require(Screen::DeviceSelection, "select a device")?;
        self.device = Some(device);
        self.screen = Screen::Main;
        info!(%device, "device selected");
        Ok(())
    }

    pub fn select_players(&mut self, players: usize) -> Result<()> {
        self.require(Screen::Main, "change the player count")?;
        self.players = PlayerCount::new(players)?;
        Ok(())
    }

    pub fn open_game_selection(&mut self) -> Result<()> {
        self.require(Screen::Main, "open the game list")?;
        self.screen = Screen::GameSelection;
        Ok(())
    }

    /// Game selection back to the main screen.
    pub fn back(&mut self) -> Result<()> {
        self.require(Screen::GameSelection, "go back")?;
        self.screen = Screen::Main;
        Ok(())
    }

    /// Games playable with the selected player count.
    pub fn available_games(&self) -> impl Iterator<Item = &'static CatalogEntry> {
        let players = self.players.get();
        CATALOG.iter().filter(move |entry| entry.supports(players))
    }

    /// Pick the game with menu id `id` and get the session to launch it with.
    pub fn choose_game(&mut self, id: u32) -> Result<SessionConfig> {
        self.require(Screen::GameSelection, "choose a game")?;
        let entry = find_entry(id).ok_or_else(|| GameError::UnknownGame(id.to_string()))?;
        if !entry.supports(self.players.get()) {
            return Err(GameError::InvalidPlayerCount(self.players.get()));
        }
        let session = SessionConfig {
            players: self.players,
            device: self.device.unwrap_or_default(),
            seed: self.seed.unwrap_or_else(GameRng::entropy_seed),
        };
        self.screen = Screen::InGame(entry.kind);
        info!(game = entry.kind.name(), players = %self.players, seed = session.seed, "game chosen");
        Ok(session)
    }

    /// Leave the running game. The device has to be chosen again.
    pub fn back_to_menu(&mut self) -> Result<()> {
        if !matches!(self.screen, Screen::InGame(_)) {
            return Err(GameError::Menu(format!(
                "no game to leave on the {}",
                self.screen
            )));
        }
        self.device = None;
        self.screen = Screen::DeviceSelection;
        Ok(())
    }
}

/// Start `kind` for `session`.
#[must_use]
pub fn launch(kind: GameKind, session: &SessionConfig) -> Box<dyn Playable> {
    match kind {
        GameKind::TankBattle => Box::new(GameSession::new(TankBattle::new(session))),
        GameKind::BomberArena => Box::new(GameSession::new(BomberArena::new(session))),
        GameKind::RocketRace => Box::new(GameSession::new(RocketRace::new(session))),
        GameKind::LaserDuel => Box::new(GameSession::new(LaserDuel::new(session))),
        GameKind::ColorDash => Box::new(GameSession::new(ColorDash::new(session))),
        GameKind::MemoryMatch => Box::new(GameSession::new(MemoryMatch::new(session))),
        GameKind::QuickMath => Box::new(GameSession::new(QuickMath::new(session))),
        GameKind::ShapeDrop => Box::new(GameSession::new(ShapeDrop::new(session))),
        GameKind::ReactionBattle => Box::new(GameSession::new(ReactionBattle::new(session))),
        GameKind::MazeRunner => Box::new(GameSession::new(MazeRunner::new(session))),
        GameKind::EmojiGuess => Box::new(GameSession::new(EmojiGuess::new(session))),
        GameKind::WordChain => Box::new(GameSession::new(WordChain::new(session))),
        GameKind::BalloonPop => Box::new(GameSession::new(BalloonPop::new(session))),
    }
}
