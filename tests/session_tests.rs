//! Whole-session tests driven through the object-safe `Playable` API.
//!
//! Every game is launched from the menu, played by random autoplay and
//! checked for termination, consistent scores and a deterministic replay.

use std::time::Duration;

use party_games::{
    launch, Autoplay, AutoplayConfig, DeviceType, GameKind, GameResult, Menu, Phase, Screen,
    SessionConfig,
};

/// Caps generous enough for a random walk through a 15x15 maze.
fn long_run() -> AutoplayConfig {
    AutoplayConfig::default()
        .with_max_moves(1_000_000)
        .with_max_ticks(1_000_000)
}

#[test]
fn test_every_turn_based_game_finishes() {
    for kind in GameKind::ALL {
        if kind == GameKind::TankBattle {
            continue;
        }
        for players in 2..=4 {
            let session = SessionConfig::new(players).unwrap().with_seed(players as u64 * 31);
            let mut game = launch(kind, &session);
            let report = Autoplay::new(long_run(), 17).run(game.as_mut());

            assert!(report.finished, "{kind} with {players} players did not finish");
            assert_eq!(game.phase(), Phase::End);
            assert_eq!(report.standings.len(), players);
            assert!(game.moves().is_empty(), "{kind} still offers moves after the end");

            let outcome = report.outcome.unwrap();
            match &outcome {
                GameResult::Winner(p) => assert!(p.index() < players),
                GameResult::Winners(ps) => assert!(ps.len() >= 2),
                GameResult::Draw => {}
            }
        }
    }
}

#[test]
fn test_tank_battle_stays_consistent() {
    let session = SessionConfig::new(4).unwrap().with_seed(8);
    let mut game = launch(GameKind::TankBattle, &session);
    let config = AutoplayConfig::default()
        .with_tick(Duration::from_millis(16))
        .with_max_ticks(5_000);
    let report = Autoplay::new(config, 3).run(game.as_mut());

    assert_ne!(game.phase(), Phase::Ready);
    if report.finished {
        assert!(matches!(report.outcome, Some(GameResult::Winner(_))));
    } else {
        assert_eq!(report.outcome, None);
        assert_eq!(report.ticks, 5_000);
    }
    for (_, score) in game.scoreboard().iter() {
        assert!(score >= 0);
        assert_eq!(score % 25, 0);
    }
}

#[test]
fn test_same_seed_replays_identically() {
    for kind in [GameKind::MemoryMatch, GameKind::BomberArena, GameKind::BalloonPop] {
        let session = SessionConfig::new(3).unwrap().with_seed(99);
        let logs: Vec<Vec<String>> = (0..2)
            .map(|_| {
                let mut game = launch(kind, &session);
                Autoplay::new(long_run(), 4).run(game.as_mut());
                game.log().iter().cloned().collect()
            })
            .collect();
        assert_eq!(logs[0], logs[1], "{kind} diverged");
        assert!(logs[0].iter().any(|line| line.starts_with("result: ")));
    }
}

#[test]
fn test_menu_to_game_and_back() {
    let mut menu = Menu::new().with_seed(12);
    menu.select_device(DeviceType::Phone).unwrap();
    menu.select_players(4).unwrap();
    menu.open_game_selection().unwrap();

    let entry = menu
        .available_games()
        .find(|entry| entry.kind == GameKind::RocketRace)
        .unwrap();
    let session = menu.choose_game(entry.id).unwrap();
    assert_eq!(session.players.get(), 4);
    assert_eq!(session.device, DeviceType::Phone);

    let mut game = launch(GameKind::RocketRace, &session);
    game.play_named("start").unwrap();
    assert!(game.play_named("start").is_err());
    for turn in 0..4 {
        assert_eq!(game.active_player().index(), turn);
        game.play_named("launch").unwrap();
        game.tick(Duration::from_millis(900));
    }
    assert!(game.is_over());
    assert_eq!(game.log().front().map(String::as_str), Some("Player 1: start"));

    menu.back_to_menu().unwrap();
    assert_eq!(menu.screen(), Screen::DeviceSelection);
    assert_eq!(menu.device(), None);
}

#[test]
fn test_rejected_move_leaves_game_untouched() {
    let session = SessionConfig::new(2).unwrap().with_seed(5);
    let mut game = launch(GameKind::WordChain, &session);
    game.play_named("start").unwrap();

    let before = game.status();
    let log_len = game.log().len();
    assert!(game.play_named("word zz").is_err());
    assert!(game.play_move(999).is_err());
    assert_eq!(game.status(), before);
    assert_eq!(game.log().len(), log_len);
}
