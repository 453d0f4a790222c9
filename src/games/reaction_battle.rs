//! Reaction Battle: wait for the signal, then tap as fast as possible.
//!
//! A round has two stages inside [`Phase::Playing`]: *waiting* for a random
//! delay, then *active* until the player taps. Tapping while waiting is an
//! early tap and costs points. On Medium and Hard the player must hit the
//! one real button among decoys; Hard also flashes distracting emoji.

use std::time::Duration;

use smallvec::SmallVec;
use tracing::debug;

use crate::core::{
    Countdown, Delay, FixedStep, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId,
    PlayerMap, Scoreboard, SessionConfig, Stopwatch, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const ROUNDS_PER_PLAYER: u32 = 3;
pub const EARLY_TAP_PENALTY: i64 = -2;
pub const WRONG_BUTTON_PENALTY: i64 = -1;
/// Reactions faster than this extend the streak.
pub const QUICK_REACTION_MS: u64 = 300;

const DISTRACTION_PERIOD: Duration = Duration::from_secs(1);
const DISTRACTION_VISIBLE: Duration = Duration::from_millis(500);
const DISTRACTION_EMOJI: [&str; 8] = ["🎮", "⚡", "💥", "🔥", "⭐", "🚀", "💫", "🌟"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Range of the random wait before the signal, in milliseconds.
    #[must_use]
    pub const fn wait_range_ms(self) -> (f64, f64) {
        match self {
            Difficulty::Easy => (2_000.0, 4_000.0),
            Difficulty::Medium => (1_500.0, 5_000.0),
            Difficulty::Hard => (1_000.0, 6_000.0),
        }
    }

    /// Buttons on screen; zero means the whole area is the target.
    #[must_use]
    pub const fn button_count(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 3,
            Difficulty::Hard => 5,
        }
    }

    #[must_use]
    pub const fn bonus(self) -> i64 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Base points for a reaction time.
#[must_use]
pub fn base_points(reaction_ms: u64) -> i64 {
    match reaction_ms {
        0..=199 => 5,
        200..=299 => 4,
        300..=399 => 3,
        400..=499 => 2,
        _ => 1,
    }
}

/// Bonus for a streak of quick reactions.
#[must_use]
pub fn streak_bonus(streak: u32) -> i64 {
    if streak >= 3 {
        i64::from((streak - 2).min(5))
    } else {
        0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionInput {
    SetDifficulty(Difficulty),
    Start,
    /// Tap anywhere in the reaction area.
    TapArea,
    /// Tap one of the on-screen buttons.
    TapButton(usize),
    Continue,
}

impl std::fmt::Display for ReactionInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionInput::SetDifficulty(d) => write!(f, "difficulty {d}"),
            ReactionInput::Start => f.write_str("start"),
            ReactionInput::TapArea => f.write_str("tap"),
            ReactionInput::TapButton(i) => write!(f, "button {i}"),
            ReactionInput::Continue => f.write_str("continue"),
        }
    }
}

/// Stage of a round in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Waiting,
    Active,
}

/// How the last round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    EarlyTap,
    WrongButton { reaction_ms: u64 },
    Hit { reaction_ms: u64, points: i64 },
}

/// A decoy emoji flashed on Hard, at a position in unit coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoy {
    pub emoji: &'static str,
    pub x: f64,
    pub y: f64,
}

/// Per-player reaction history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReactionStats {
    pub reaction_times_ms: Vec<u64>,
    pub streak: u32,
    pub max_streak: u32,
    pub fails: u32,
}

impl ReactionStats {
    /// Rounded mean reaction time, 0 without any reaction.
    #[must_use]
    pub fn average_ms(&self) -> u64 {
        if self.reaction_times_ms.is_empty() {
            return 0;
        }
        let sum: u64 = self.reaction_times_ms.iter().sum();
        (sum as f64 / self.reaction_times_ms.len() as f64).round() as u64
    }

    /// Fastest reaction, 0 without any reaction.
    #[must_use]
    pub fn fastest_ms(&self) -> u64 {
        self.reaction_times_ms.iter().copied().min().unwrap_or(0)
    }

    fn fail(&mut self) {
        self.streak = 0;
        self.fails += 1;
    }
}

#[derive(Clone, Debug)]
pub struct ReactionBattle {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    stats: PlayerMap<ReactionStats>,
    difficulty: Difficulty,
    stage: Stage,
    signal: Delay<()>,
    reaction: Stopwatch,
    target_button: Option<usize>,
    distraction_clock: FixedStep,
    distraction_shown: Countdown,
    decoys: SmallVec<[Decoy; 3]>,
    last_outcome: Option<RoundOutcome>,
}

impl ReactionBattle {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("reaction_battle"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(ROUNDS_PER_PLAYER),
            scores: Scoreboard::new(session.players),
            stats: PlayerMap::with_default(session.players.get()),
            difficulty: Difficulty::default(),
            stage: Stage::Waiting,
            signal: Delay::new(),
            reaction: Stopwatch::new(),
            target_button: None,
            distraction_clock: FixedStep::new(DISTRACTION_PERIOD),
            distraction_shown: Countdown::idle(),
            decoys: SmallVec::new(),
            last_outcome: None,
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current stage, meaningful while playing.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Index of the real button this round, if buttons are shown.
    #[must_use]
    pub fn target_button(&self) -> Option<usize> {
        self.target_button
    }

    /// Decoys currently visible.
    #[must_use]
    pub fn visible_decoys(&self) -> &[Decoy] {
        if self.distraction_shown.is_running() {
            &self.decoys
        } else {
            &[]
        }
    }

    #[must_use]
    pub fn stats(&self, player: PlayerId) -> &ReactionStats {
        &self.stats[player]
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<RoundOutcome> {
        self.last_outcome
    }

    /// First seat with the longest streak of the game.
    #[must_use]
    pub fn best_streak_player(&self) -> PlayerId {
        let mut best = PlayerId::new(0);
        for (player, stats) in self.stats.iter() {
            if stats.max_streak > self.stats[best].max_streak {
                best = player;
            }
        }
        best
    }

    fn start_round(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        self.stage = Stage::Waiting;
        self.last_outcome = None;
        self.reaction = Stopwatch::new();

        let buttons = self.difficulty.button_count();
        self.target_button = (buttons > 0).then(|| self.rng.gen_range_usize(0..buttons));

        let (min, max) = self.difficulty.wait_range_ms();
        let wait = min + self.rng.gen_f64() * (max - min);
        self.signal.schedule(Duration::from_millis(wait as u64), ());

        self.distraction_clock.reset();
        self.distraction_shown.cancel();
        self.decoys.clear();
        Ok(())
    }

    fn finish_round(&mut self, outcome: RoundOutcome) -> Result<()> {
        self.signal.cancel();
        self.reaction.stop();
        self.distraction_shown.cancel();
        self.last_outcome = Some(outcome);
        self.phase.apply(PhaseEvent::Finish)?;
        debug!(player = %self.turns.active(), ?outcome, "reaction round over");
        Ok(())
    }

    fn early_tap(&mut self) -> Result<()> {
        let player = self.turns.active();
        self.scores.add_floored(player, EARLY_TAP_PENALTY);
        self.stats[player].fail();
        self.finish_round(RoundOutcome::EarlyTap)
    }

    fn hit(&mut self) -> Result<()> {
        let player = self.turns.active();
        let reaction_ms = self.reaction.elapsed().as_millis() as u64;
        let stats = &mut self.stats[player];
        stats.streak = if reaction_ms < QUICK_REACTION_MS {
            stats.streak + 1
        } else {
            0
        };
        stats.max_streak = stats.max_streak.max(stats.streak);
        stats.reaction_times_ms.push(reaction_ms);

        let points = base_points(reaction_ms) + self.difficulty.bonus() + streak_bonus(stats.streak);
        self.scores.add(player, points);
        self.finish_round(RoundOutcome::Hit {
            reaction_ms,
            points,
        })
    }

    fn tap_area(&mut self) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        if self.target_button.is_some() {
            return Err(GameError::illegal("tap one of the buttons"));
        }
        match self.stage {
            Stage::Waiting => self.early_tap(),
            Stage::Active => self.hit(),
        }
    }

    fn tap_button(&mut self, index: usize) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let target = self
            .target_button
            .ok_or_else(|| GameError::illegal("no buttons on this difficulty"))?;
        if index >= self.difficulty.button_count() {
            return Err(GameError::illegal(format!("there is no button {index}")));
        }
        match self.stage {
            Stage::Waiting => self.early_tap(),
            Stage::Active if index == target => self.hit(),
            Stage::Active => {
                let player = self.turns.active();
                let reaction_ms = self.reaction.elapsed().as_millis() as u64;
                self.scores.add_floored(player, WRONG_BUTTON_PENALTY);
                self.stats[player].fail();
                self.finish_round(RoundOutcome::WrongButton { reaction_ms })
            }
        }
    }

    fn next(&mut self) -> Result<()> {
        self.phase.require(Phase::Result)?;
        if self.turns.complete_round() {
            self.phase.apply(PhaseEvent::GameOver)?;
        } else {
            self.turns.advance();
            self.phase.apply(PhaseEvent::Next)?;
        }
        Ok(())
    }

    fn flash_decoys(&mut self) {
        self.decoys.clear();
        for _ in 0..3 {
            let emoji = self.rng.choose(&DISTRACTION_EMOJI).copied().unwrap_or("⭐");
            let (x, y) = (self.rng.gen_f64(), self.rng.gen_f64());
            self.decoys.push(Decoy { emoji, x, y });
        }
        self.distraction_shown.start(DISTRACTION_VISIBLE);
    }
}

impl MiniGame for ReactionBattle {
    type Input = ReactionInput;

    fn kind(&self) -> GameKind {
        GameKind::ReactionBattle
    }

    fn phase(&self) -> Phase {
        self.phase.phase()
    }

    fn active_player(&self) -> PlayerId {
        self.turns.active()
    }

    fn scoreboard(&self) -> &Scoreboard {
        &self.scores
    }

    fn legal_inputs(&self) -> Vec<ReactionInput> {
        match self.phase.phase() {
            Phase::Ready => {
                let mut inputs: Vec<ReactionInput> = Difficulty::ALL
                    .into_iter()
                    .filter(|d| *d != self.difficulty)
                    .map(ReactionInput::SetDifficulty)
                    .collect();
                inputs.push(ReactionInput::Start);
                inputs
            }
            Phase::Playing => match self.difficulty.button_count() {
                0 => vec![ReactionInput::TapArea],
                n => (0..n).map(ReactionInput::TapButton).collect(),
            },
            Phase::Result => vec![ReactionInput::Continue],
            Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: ReactionInput) -> Result<()> {
        match input {
            ReactionInput::SetDifficulty(difficulty) => {
                self.phase.require(Phase::Ready)?;
                self.difficulty = difficulty;
                Ok(())
            }
            ReactionInput::Start => self.start_round(),
            ReactionInput::TapArea => self.tap_area(),
            ReactionInput::TapButton(index) => self.tap_button(index),
            ReactionInput::Continue => self.next(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase.phase() != Phase::Playing {
            return;
        }
        self.reaction.tick(dt);
        if self.signal.tick(dt).is_some() {
            self.stage = Stage::Active;
            self.reaction.restart();
        }

        if self.difficulty == Difficulty::Hard {
            self.distraction_shown.tick(dt);
            if self.distraction_clock.advance(dt) > 0 {
                self.flash_decoys();
            }
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(difficulty: Difficulty) -> ReactionBattle {
        let mut game = ReactionBattle::new(&SessionConfig::new(2).unwrap().with_seed(17));
        game.handle(ReactionInput::SetDifficulty(difficulty)).unwrap();
        game
    }

    fn wait_for_signal(game: &mut ReactionBattle) {
        while game.stage() == Stage::Waiting {
            game.tick(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_point_tables() {
        assert_eq!(base_points(150), 5);
        assert_eq!(base_points(299), 4);
        assert_eq!(base_points(300), 3);
        assert_eq!(base_points(499), 2);
        assert_eq!(base_points(900), 1);
        assert_eq!(streak_bonus(2), 0);
        assert_eq!(streak_bonus(3), 1);
        assert_eq!(streak_bonus(20), 5);
    }

    #[test]
    fn test_signal_arrives_within_range() {
        let mut game = game(Difficulty::Easy);
        game.handle(ReactionInput::Start).unwrap();
        game.tick(Duration::from_millis(1_999));
        assert_eq!(game.stage(), Stage::Waiting);
        game.tick(Duration::from_millis(2_001));
        assert_eq!(game.stage(), Stage::Active);
    }

    #[test]
    fn test_early_tap_is_floored() {
        let mut game = game(Difficulty::Easy);
        game.handle(ReactionInput::Start).unwrap();
        game.handle(ReactionInput::TapArea).unwrap();

        assert_eq!(game.last_outcome(), Some(RoundOutcome::EarlyTap));
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 0);
        assert_eq!(game.stats(PlayerId::new(0)).fails, 1);
        assert_eq!(game.phase(), Phase::Result);
    }

    #[test]
    fn test_easy_hit_points() {
        let mut game = game(Difficulty::Easy);
        game.handle(ReactionInput::Start).unwrap();
        wait_for_signal(&mut game);
        game.tick(Duration::from_millis(250));
        game.handle(ReactionInput::TapArea).unwrap();

        let Some(RoundOutcome::Hit { reaction_ms, points }) = game.last_outcome() else {
            panic!("expected a hit");
        };
        assert!((250..300).contains(&reaction_ms));
        assert_eq!(points, 4);
        assert_eq!(game.stats(PlayerId::new(0)).streak, 1);
    }

    #[test]
    fn test_buttons_replace_area_taps() {
        let mut game = game(Difficulty::Medium);
        game.handle(ReactionInput::Start).unwrap();
        assert!(game.handle(ReactionInput::TapArea).is_err());
        assert_eq!(game.phase(), Phase::Playing);

        wait_for_signal(&mut game);
        let target = game.target_button().unwrap();
        let wrong = (target + 1) % 3;
        game.scores.add(PlayerId::new(0), 3);
        game.handle(ReactionInput::TapButton(wrong)).unwrap();

        assert!(matches!(game.last_outcome(), Some(RoundOutcome::WrongButton { .. })));
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 2);
    }

    #[test]
    fn test_streak_bonus_on_third_quick_hit() {
        let mut game = game(Difficulty::Hard);
        let p0 = PlayerId::new(0);
        let mut last_points = 0;
        for _ in 0..3 {
            game.handle(ReactionInput::Start).unwrap();
            wait_for_signal(&mut game);
            let target = game.target_button().unwrap();
            game.handle(ReactionInput::TapButton(target)).unwrap();
            if let Some(RoundOutcome::Hit { points, .. }) = game.last_outcome() {
                last_points = points;
            }
            game.handle(ReactionInput::Continue).unwrap();
            // Player 2 taps early.
            game.handle(ReactionInput::Start).unwrap();
            game.handle(ReactionInput::TapButton(0)).unwrap();
            game.handle(ReactionInput::Continue).unwrap();
        }

        assert!(game.is_over());
        // base 5 + hard 2 + streak 1
        assert_eq!(last_points, 8);
        assert_eq!(game.stats(p0).max_streak, 3);
        assert_eq!(game.best_streak_player(), p0);
        assert_eq!(game.stats(PlayerId::new(1)).fails, 3);
        assert_eq!(game.outcome(), Some(GameResult::Winner(p0)));
    }

    #[test]
    fn test_hard_flashes_decoys() {
        let mut game = game(Difficulty::Hard);
        game.handle(ReactionInput::Start).unwrap();
        game.tick(Duration::from_millis(999));
        assert!(game.visible_decoys().is_empty());
        game.tick(Duration::from_millis(1));
        assert_eq!(game.visible_decoys().len(), 3);
        game.tick(Duration::from_millis(500));
        assert!(game.visible_decoys().is_empty());
    }
}
