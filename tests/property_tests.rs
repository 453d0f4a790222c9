//! Property tests for the shared building blocks.

use std::time::Duration;

use proptest::prelude::*;

use party_games::games::balloon_pop::combo_multiplier;
use party_games::games::bomber_arena::{blast_cells, GRID_SIZE};
use party_games::games::rocket_race::landing_points;
use party_games::games::word_chain::{word_points, Difficulty};
use party_games::{
    Countdown, FixedStep, GameRng, Maze, PlayerCount, PlayerId, Pos, Scoreboard, TimerStatus,
    TurnOrder,
};

proptest! {
    /// Rotation never lands on an eliminated seat and visits every live seat.
    #[test]
    fn rotation_skips_eliminated(players in 2usize..=4, out in proptest::collection::vec(0u8..4, 0..3)) {
        let mut turns = TurnOrder::new(PlayerCount::new(players).unwrap());
        for seat in out {
            if (seat as usize) < players {
                turns.eliminate(PlayerId::new(seat));
            }
        }
        let alive = turns.alive_count();
        prop_assume!(alive >= 2);
        prop_assume!(!turns.is_eliminated(turns.active()));

        let mut seen = Vec::new();
        for _ in 0..alive {
            let next = turns.advance().unwrap();
            prop_assert!(!turns.is_eliminated(next));
            seen.push(next);
        }
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), alive);
    }

    /// Every open tile of a generated maze can reach the finish.
    #[test]
    fn maze_is_connected(seed in any::<u64>(), half in 2usize..10) {
        let size = half * 2 + 1;
        let maze = Maze::generate(size, &mut GameRng::new(seed));
        prop_assert!(maze.is_open(maze.start()));
        prop_assert!(maze.is_open(maze.finish()));
        let path = maze.shortest_path().unwrap();
        let mut at = maze.start();
        for dir in &path {
            at = at.step(*dir);
            prop_assert!(maze.is_open(at));
        }
        prop_assert_eq!(at, maze.finish());
        prop_assert_eq!(maze.shortest_path_len(), Some(path.len()));
    }

    /// Floored scores never go negative whatever the deltas.
    #[test]
    fn floored_scores_stay_non_negative(deltas in proptest::collection::vec(-20i64..20, 0..50)) {
        let mut scores = Scoreboard::new(PlayerCount::new(2).unwrap());
        let p = PlayerId::new(1);
        for delta in deltas {
            let score = scores.add_floored(p, delta);
            prop_assert!(score >= 0);
            prop_assert_eq!(score, scores.score(p));
        }
        prop_assert_eq!(scores.score(PlayerId::new(0)), 0);
    }

    /// A countdown expires exactly once no matter how time is sliced.
    #[test]
    fn countdown_expires_once(slices in proptest::collection::vec(1u64..500, 1..100)) {
        let mut countdown = Countdown::new(Duration::from_secs(2));
        let total: u64 = slices.iter().sum();
        let expired = slices
            .iter()
            .filter(|ms| countdown.tick(Duration::from_millis(**ms)) == TimerStatus::Expired)
            .count();
        prop_assert_eq!(expired, usize::from(total >= 2_000));
    }

    /// Fixed steps add up to the elapsed time divided by the step.
    #[test]
    fn fixed_step_conserves_time(slices in proptest::collection::vec(0u64..100, 0..100)) {
        let mut stepper = FixedStep::new(Duration::from_millis(16));
        let steps: u32 = slices.iter().map(|ms| stepper.advance(Duration::from_millis(*ms))).sum();
        let total: u64 = slices.iter().sum();
        prop_assert_eq!(u64::from(steps), total / 16);
    }

    #[test]
    fn blast_stays_on_grid(x in 0i32..10, y in 0i32..10) {
        let cells = blast_cells(Pos::new(x, y));
        prop_assert!(cells.len() >= 3 && cells.len() <= 5);
        prop_assert!(cells.iter().all(|c| c.in_bounds(GRID_SIZE, GRID_SIZE)));
        prop_assert!(cells.iter().all(|c| c.manhattan(Pos::new(x, y)) <= 1));
    }

    #[test]
    fn landing_points_in_range(distance in 0.0f64..500.0) {
        let points = landing_points(distance);
        prop_assert!((0..=100).contains(&points));
    }

    #[test]
    fn longer_words_never_score_less(len in 3usize..15, secs in 0u64..25, streak in 0u32..6) {
        for difficulty in Difficulty::ALL {
            let short = word_points(len, secs, difficulty, false, streak);
            let long = word_points(len + 1, secs, difficulty, false, streak);
            prop_assert!(long >= short);
            prop_assert!(word_points(len, secs, difficulty, true, streak) >= short);
        }
    }

    #[test]
    fn combo_multiplier_is_monotonic(combo in 0u32..30) {
        prop_assert!(combo_multiplier(combo + 1) >= combo_multiplier(combo));
    }
}
