//! Random self-play for any game.
//!
//! Drives a [`Playable`] with randomly chosen legal inputs, letting a fixed
//! slice of time pass between them, until the game ends or a cap is hit.
//! The binary's `play` command and the integration tests use it to run whole
//! sessions without a human at the table.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::{AppConfig, GameRng, GameResult, PlayerId};
use crate::games::GameKind;
use crate::rules::Playable;

/// Configuration for an autoplay run.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoplayConfig {
    /// Time that passes per tick.
    pub tick: Duration,

    /// Maximum inputs per game (to prevent endless games).
    pub max_moves: usize,

    /// Maximum ticks per game.
    pub max_ticks: usize,

    /// Chance of acting instead of waiting when inputs are available.
    pub act_probability: f64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            max_moves: 20_000,
            max_ticks: 100_000,
            act_probability: 0.5,
        }
    }
}

impl AutoplayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick length and move cap from the application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self::default()
            .with_tick(Duration::from_millis(config.tick_ms.max(1)))
            .with_max_moves(config.max_moves)
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_max_moves(mut self, max: usize) -> Self {
        self.max_moves = max;
        self
    }

    pub fn with_max_ticks(mut self, max: usize) -> Self {
        self.max_ticks = max;
        self
    }

    /// Clamped to `0.0..=1.0`.
    pub fn with_act_probability(mut self, probability: f64) -> Self {
        self.act_probability = probability.clamp(0.0, 1.0);
        self
    }
}

/// What happened during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoplayReport {
    pub kind: GameKind,
    pub moves: usize,
    pub ticks: usize,
    /// Simulated time that passed.
    pub elapsed: Duration,
    /// False when a cap stopped the run first.
    pub finished: bool,
    pub outcome: Option<GameResult>,
    /// Scores, best first.
    pub standings: Vec<(PlayerId, i64)>,
}

impl std::fmt::Display for AutoplayReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}: {} moves, {} ticks, {:.1}s simulated",
            self.kind,
            self.moves,
            self.ticks,
            self.elapsed.as_secs_f64()
        )?;
        match &self.outcome {
            Some(result) => writeln!(f, "result: {result}")?,
            None => writeln!(f, "result: unfinished")?,
        }
        for (rank, (player, score)) in self.standings.iter().enumerate() {
            writeln!(f, "{:>2}. {player}: {score}", rank + 1)?;
        }
        Ok(())
    }
}

/// Plays games with random legal inputs.
#[derive(Clone, Debug)]
pub struct Autoplay {
    config: AutoplayConfig,
    rng: GameRng,
}

impl Autoplay {
    pub fn new(config: AutoplayConfig, seed: u64) -> Self {
        Self {
            config,
            rng: GameRng::new(seed).for_context("autoplay"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AutoplayConfig {
        &self.config
    }

    /// Play `game` until it ends or a cap is reached.
    pub fn run(&mut self, game: &mut dyn Playable) -> AutoplayReport {
        let mut moves = 0;
        let mut ticks = 0;

        while !game.is_over() && moves < self.config.max_moves && ticks < self.config.max_ticks {
            let available = game.moves();
            if !available.is_empty() && self.rng.gen_bool(self.config.act_probability) {
                let index = self.rng.gen_range_usize(0..available.len());
                match game.play_move(index) {
                    Ok(label) => {
                        moves += 1;
                        debug!(move_number = moves, input = %label, "autoplay move");
                        continue;
                    }
                    Err(err) => {
                        warn!(error = %err, input = %available[index], "legal input was rejected");
                    }
                }
            }
            game.tick(self.config.tick);
            ticks += 1;
        }

        let finished = game.is_over();
        if !finished {
            warn!(game = game.kind().name(), moves, ticks, "autoplay stopped before the end");
        }
        let report = AutoplayReport {
            kind: game.kind(),
            moves,
            ticks,
            elapsed: self.config.tick * ticks as u32,
            finished,
            outcome: game.outcome(),
            standings: game.scoreboard().ranking(),
        };
        info!(game = report.kind.name(), moves, ticks, finished, "autoplay finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionConfig;
    use crate::menu::launch;

    #[test]
    fn test_config_builder() {
        let config = AutoplayConfig::new()
            .with_tick(Duration::from_millis(50))
            .with_max_moves(10)
            .with_act_probability(2.0);
        assert_eq!(config.tick, Duration::from_millis(50));
        assert_eq!(config.max_moves, 10);
        assert_eq!(config.act_probability, 1.0);

        let app = AppConfig {
            tick_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(AutoplayConfig::from_app(&app).tick, Duration::from_millis(1));
    }

    #[test]
    fn test_rocket_race_runs_to_the_end() {
        let session = SessionConfig::new(3).unwrap().with_seed(5);
        let mut game = launch(GameKind::RocketRace, &session);
        let report = Autoplay::new(AutoplayConfig::default(), 1).run(game.as_mut());

        assert!(report.finished);
        assert_eq!(report.moves, 4);
        assert_eq!(report.standings.len(), 3);
        assert!(report.outcome.is_some());
        assert!(report.to_string().contains("Rocket Race"));
    }

    #[test]
    fn test_move_cap_stops_run() {
        let session = SessionConfig::new(2).unwrap();
        let mut game = launch(GameKind::MemoryMatch, &session);
        let config = AutoplayConfig::default()
            .with_max_moves(3)
            .with_act_probability(1.0);
        let report = Autoplay::new(config, 2).run(game.as_mut());

        assert!(!report.finished);
        assert_eq!(report.moves, 3);
        assert_eq!(report.outcome, None);
    }
}
