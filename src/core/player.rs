//! Seats at the table.
//!
//! A session has two to four players sharing one screen. Each sits in a
//! seat identified by [`PlayerId`], plays in that seat's [`PlayerColor`],
//! and owns one slot of every [`PlayerMap`] the game keeps (scores, lives,
//! positions, answers).

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Seat number, counted from zero and shown from one ("Player 1").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        Self(seat)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub fn color(self) -> PlayerColor {
        PlayerColor::for_seat(self)
    }

    /// Seats `0..count` in play order.
    ///
    /// ```
    /// use party_games::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::all(3).map(|p| p.to_string()).collect();
    /// assert_eq!(seats, ["Player 1", "Player 2", "Player 3"]);
    /// ```
    pub fn all(count: usize) -> impl Iterator<Item = PlayerId> {
        (0..count).map(|seat| PlayerId(seat as u8))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.index() + 1)
    }
}

/// How many people are playing. Only 2, 3 or 4 can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PlayerCount(u8);

impl PlayerCount {
    pub const MIN: usize = 2;
    pub const MAX: usize = 4;

    pub fn new(count: usize) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&count) {
            return Err(GameError::InvalidPlayerCount(count));
        }
        Ok(Self(count as u8))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub fn players(self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.get())
    }
}

impl Default for PlayerCount {
    fn default() -> Self {
        Self(Self::MIN as u8)
    }
}

impl TryFrom<usize> for PlayerCount {
    type Error = GameError;

    fn try_from(count: usize) -> Result<Self> {
        Self::new(count)
    }
}

impl From<PlayerCount> for usize {
    fn from(count: PlayerCount) -> Self {
        count.get()
    }
}

impl fmt::Display for PlayerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} players", self.get())
    }
}

/// Colour of a seat's tank, rocket, marker or score chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl PlayerColor {
    const BY_SEAT: [PlayerColor; 4] = [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    #[must_use]
    pub fn for_seat(player: PlayerId) -> Self {
        Self::BY_SEAT[player.index() % Self::BY_SEAT.len()]
    }

    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Red => "#e74c3c",
            Self::Blue => "#3498db",
            Self::Green => "#2ecc71",
            Self::Yellow => "#f1c40f",
        }
    }
}

/// One value per seat, indexed by [`PlayerId`].
///
/// ```
/// use party_games::core::{PlayerId, PlayerMap};
///
/// let mut lives = PlayerMap::with_value(3, 3u8);
/// lives[PlayerId::new(2)] -= 1;
/// assert_eq!(lives.values().copied().collect::<Vec<_>>(), [3, 3, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    seats: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Fill each of `count` seats from `init`.
    pub fn new(count: usize, init: impl Fn(PlayerId) -> T) -> Self {
        Self {
            seats: PlayerId::all(count).map(init).collect(),
        }
    }

    pub fn with_value(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            seats: vec![value; count],
        }
    }

    pub fn with_default(count: usize) -> Self
    where
        T: Default,
    {
        Self::new(count, |_| T::default())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::all(self.seats.len()).zip(self.seats.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::all(self.seats.len()).zip(self.seats.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.seats.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.seats[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.seats[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seats_shown_from_one() {
        assert_eq!(PlayerId::new(0).to_string(), "Player 1");
        assert_eq!(PlayerId::new(3).index(), 3);
        assert!(PlayerId::new(1) < PlayerId::new(2));
    }

    #[test]
    fn test_only_two_to_four_players() {
        for count in [0, 1, 5, 8] {
            assert_eq!(PlayerCount::new(count), Err(GameError::InvalidPlayerCount(count)));
        }
        for count in 2..=4 {
            assert_eq!(PlayerCount::new(count).unwrap().players().count(), count);
        }
        assert_eq!(PlayerCount::default().get(), 2);
    }

    #[test]
    fn test_player_count_from_config_json() {
        let count: PlayerCount = serde_json::from_str("3").unwrap();
        assert_eq!(count.to_string(), "3 players");
        assert_eq!(serde_json::to_string(&count).unwrap(), "3");
        assert!(serde_json::from_str::<PlayerCount>("9").is_err());
    }

    #[test]
    fn test_seat_colors() {
        let colors: Vec<_> = PlayerId::all(4).map(PlayerId::color).collect();
        assert_eq!(
            colors,
            [PlayerColor::Red, PlayerColor::Blue, PlayerColor::Green, PlayerColor::Yellow]
        );
        assert_eq!(PlayerColor::Blue.hex(), "#3498db");
    }

    #[test]
    fn test_player_map_tracks_each_seat() {
        let mut positions = PlayerMap::new(3, |p| p.index() * 10);
        for (_, pos) in positions.iter_mut() {
            *pos += 1;
        }
        assert_eq!(positions[PlayerId::new(2)], 21);
        assert_eq!(positions.iter().last(), Some((PlayerId::new(2), &21)));
        assert_eq!(PlayerMap::<u32>::with_default(4).player_count(), 4);
    }
}
