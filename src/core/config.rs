//! Session and application configuration.
//!
//! - `SessionConfig`: what the menu hands to a game on launch (player count,
//!   device type, seed).
//! - `AppConfig`: defaults for the terminal binary, read from a JSON file.

use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::player::PlayerCount;
use super::rng::GameRng;
use crate::error::{GameError, Result};

/// Default location of the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/party-games.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PARTY_GAMES_CONFIG";

/// Which controls the players use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Keyboard and mouse.
    #[default]
    Computer,
    /// Touch screen.
    Phone,
}

impl DeviceType {
    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DeviceType::Computer => "computer",
            DeviceType::Phone => "phone",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "computer" | "pc" | "keyboard" => Ok(DeviceType::Computer),
            "phone" | "mobile" | "touch" => Ok(DeviceType::Phone),
            other => Err(GameError::Config(format!("unknown device type '{other}'"))),
        }
    }
}

/// Everything a game needs to know about the table it is played at.
///
/// ```
/// use party_games::core::{DeviceType, SessionConfig};
///
/// let session = SessionConfig::new(3).unwrap()
///     .with_device(DeviceType::Phone)
///     .with_seed(7);
/// assert_eq!(session.players.get(), 3);
/// assert_eq!(session.seed, 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of people playing.
    pub players: PlayerCount,
    /// Control scheme.
    pub device: DeviceType,
    /// Seed for every random decision of the session.
    pub seed: u64,
}

impl SessionConfig {
    /// Session for `players` people on a computer with seed 0.
    pub fn new(players: usize) -> Result<Self> {
        Ok(Self {
            players: PlayerCount::new(players)?,
            device: DeviceType::default(),
            seed: 0,
        })
    }

    /// Set the device type.
    #[must_use]
    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fresh RNG for this session.
    #[must_use]
    pub fn rng(&self) -> GameRng {
        GameRng::new(self.seed)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            players: PlayerCount::default(),
            device: DeviceType::default(),
            seed: 0,
        }
    }
}

/// Defaults used by the terminal binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Player count when `--players` is not given.
    pub default_players: PlayerCount,
    /// Device when `--device` is not given.
    pub default_device: DeviceType,
    /// Fixed seed; a fresh one is drawn per session when absent.
    pub seed: Option<u64>,
    /// Simulated time per autoplay tick, in milliseconds.
    pub tick_ms: u64,
    /// Autoplay gives up after this many inputs.
    pub max_moves: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_players: PlayerCount::default(),
            default_device: DeviceType::Computer,
            seed: None,
            tick_ms: 100,
            max_moves: 20_000,
        }
    }
}

impl AppConfig {
    /// Load from the configured path, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match Self::from_file(&path) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    players = %config.default_players,
                    device = %config.default_device,
                    "loaded configuration"
                );
                config
            }
            Err(GameError::Config(reason)) if reason == NOT_FOUND => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Read and parse one JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                GameError::Config(NOT_FOUND.to_string())
            } else {
                GameError::Config(err.to_string())
            }
        })?;
        Self::from_json(&contents)
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|err| GameError::Config(err.to_string()))
    }

    /// Session built from these defaults.
    #[must_use]
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            players: self.default_players,
            device: self.default_device,
            seed: self.seed.unwrap_or_else(GameRng::entropy_seed),
        }
    }
}

const NOT_FOUND: &str = "file not found";

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
