//! N-Player capability verification tests.
//!
//! These tests verify that the games have no hidden 2-player assumptions
//! and work for every supported table size.

use std::time::Duration;

use party_games::games::memory_match::{pair_count, MemoryInput, MemoryMatch};
use party_games::games::rocket_race::{RocketInput, RocketRace};
use party_games::games::tank_battle::{Corner, TankBattle, TankInput};
use party_games::{
    DeviceType, MiniGame, Phase, PlayerColor, PlayerCount, PlayerId, PlayerMap, Scoreboard,
    SessionConfig, TurnOrder,
};

/// Test that player counts outside 2-4 are rejected.
#[test]
fn test_player_count_bounds() {
    for count in [0, 1, 5, 8] {
        assert!(PlayerCount::new(count).is_err());
    }
    for count in 2..=4 {
        let players = PlayerCount::new(count).unwrap();
        assert_eq!(players.players().count(), count);
    }
}

/// Test that per-player storage and colors cover every seat.
#[test]
fn test_player_map_n_players() {
    for count in 2..=4 {
        let mut map = PlayerMap::new(count, |p| p.index() * 10);
        for player in PlayerId::all(count) {
            map[player] += 1;
        }
        let values: Vec<usize> = map.values().copied().collect();
        assert_eq!(values, (0..count).map(|i| i * 10 + 1).collect::<Vec<_>>());

        let colors: Vec<PlayerColor> = PlayerId::all(count).map(|p| p.color()).collect();
        let mut unique = colors.clone();
        unique.dedup();
        assert_eq!(unique.len(), count);
    }
}

/// Test that rotation and scoring handle every seat for 2-4 players.
#[test]
fn test_rotation_and_scores_n_players() {
    for count in 2..=4 {
        let players = PlayerCount::new(count).unwrap();
        let mut turns = TurnOrder::new(players).with_rounds_per_player(2);
        let mut scores = Scoreboard::new(players);

        let mut rounds = 0;
        loop {
            let active = turns.active();
            scores.add(active, active.index() as i64 + 1);
            rounds += 1;
            if turns.complete_round() {
                break;
            }
            turns.advance();
        }
        assert_eq!(rounds, count * 2);
        let ranking = scores.ranking();
        assert_eq!(ranking[0].0, PlayerId::new(count as u8 - 1));
        assert_eq!(ranking[0].1, count as i64 * 2);
    }
}

/// Test that turn-based games give every seat exactly one go.
#[test]
fn test_rocket_race_every_seat_plays() {
    for count in 2..=4 {
        let mut game = RocketRace::new(&SessionConfig::new(count).unwrap().with_seed(1));
        game.handle(RocketInput::Start).unwrap();
        let mut order = Vec::new();
        while !game.is_over() {
            order.push(game.active_player());
            game.handle(RocketInput::Launch).unwrap();
            game.tick(Duration::from_millis(900));
        }
        assert_eq!(order, PlayerId::all(count).collect::<Vec<_>>());
        assert_eq!(game.shots().len(), count);
    }
}

/// Test that the memory table grows with the player count.
#[test]
fn test_memory_match_table_size() {
    for count in 2..=4 {
        let session = SessionConfig::new(count).unwrap().with_seed(3);
        let mut game = MemoryMatch::new(&session);
        game.handle(MemoryInput::Start).unwrap();
        assert_eq!(game.cards().len(), pair_count(session.players) * 2);
        assert_eq!(game.phase(), Phase::Playing);
    }
}

/// Test that phone controls exist exactly for the seats at the table.
#[test]
fn test_tank_corners_n_players() {
    for count in 2..=4 {
        let session = SessionConfig::new(count)
            .unwrap()
            .with_device(DeviceType::Phone)
            .with_seed(2);
        let game = TankBattle::new(&session);
        for seat in 0..4u8 {
            let corner = Corner::for_player(PlayerId::new(seat));
            let inputs = game.corner_touch(corner, true);
            if usize::from(seat) < count {
                assert_eq!(inputs, vec![TankInput::Hold(PlayerId::new(seat))]);
            } else {
                assert!(inputs.is_empty());
            }
        }
        assert!(game.key_down("w").is_none());
    }
}
