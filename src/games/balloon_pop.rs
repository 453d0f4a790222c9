//! Balloon Pop: pop as many balloons as you can in thirty seconds.
//!
//! The level rises every ten seconds, which spawns balloons faster, makes
//! them smaller and mixes in special kinds. Popping in a row builds a combo
//! multiplier; missing or popping a penalty balloon resets it.

use std::time::Duration;

use tracing::debug;

use crate::core::{
    Countdown, FixedStep, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId,
    PlayerMap, Scoreboard, SessionConfig, TimerStatus, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const ROUND_TIME: Duration = Duration::from_secs(30);
pub const LEVEL_TIME: Duration = Duration::from_secs(10);
pub const MAX_LEVEL: u32 = 5;
pub const FIELD_WIDTH: f64 = 800.0;
pub const FIELD_HEIGHT: f64 = 500.0;
/// Shrinking balloons vanish at this size.
pub const MIN_SIZE: f64 = 10.0;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BalloonKind {
    Normal,
    Bonus,
    Penalty,
    Moving,
    Shrinking,
}

impl BalloonKind {
    #[must_use]
    pub const fn points(self) -> i64 {
        match self {
            BalloonKind::Normal => 1,
            BalloonKind::Bonus => 3,
            BalloonKind::Penalty => -2,
            BalloonKind::Moving => 2,
            BalloonKind::Shrinking => 4,
        }
    }

    /// Kind for a roll in `[0, 100)` at `level`.
    #[must_use]
    pub fn from_roll(level: u32, roll: f64) -> Self {
        let l = f64::from(level);
        if level >= 3 && roll < 5.0 {
            BalloonKind::Penalty
        } else if level >= 2 && roll < 10.0 + l * 2.0 {
            BalloonKind::Moving
        } else if level >= 2 && roll < 15.0 + l * 3.0 {
            BalloonKind::Shrinking
        } else if roll < 8.0 + l * 1.5 {
            BalloonKind::Bonus
        } else {
            BalloonKind::Normal
        }
    }
}

/// Time between spawns at `level`.
#[must_use]
pub fn spawn_interval(level: u32) -> Duration {
    let millis = match level {
        1 => 900,
        2 => 800,
        3 => 650,
        4 => 500,
        _ => 350,
    };
    Duration::from_millis(millis)
}

#[must_use]
pub fn combo_multiplier(combo: u32) -> f64 {
    match combo {
        c if c >= 10 => 3.0,
        c if c >= 5 => 2.0,
        c if c >= 3 => 1.5,
        _ => 1.0,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Balloon {
    pub id: u32,
    pub kind: BalloonKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Horizontal speed per frame, signed; zero for balloons that stay put.
    pub drift: f64,
    /// Size lost per frame.
    pub shrink_rate: f64,
    /// Time left before the balloon flies away, if it does.
    pub expires_in: Option<Duration>,
}

impl Balloon {
    /// Advance one animation frame. Returns false once the balloon is gone.
    fn frame(&mut self) -> bool {
        if self.drift != 0.0 {
            let mut x = self.x + self.drift;
            if x < 0.0 || x > FIELD_WIDTH - self.size {
                self.drift = -self.drift;
                x = self.x + self.drift;
            }
            self.x = x;
        }
        if self.shrink_rate > 0.0 {
            self.size -= self.shrink_rate;
            if self.size <= MIN_SIZE {
                return false;
            }
        }
        true
    }
}

/// Per-player round record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalloonStats {
    /// Balloons popped that were worth points.
    pub popped: u32,
    pub clicks: u32,
    /// Percent of clicks that popped a scoring balloon.
    pub accuracy: u32,
    pub max_combo: u32,
    pub penalties: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalloonInput {
    Start,
    Pop(u32),
    /// Click on empty sky.
    Miss,
    Continue,
}

impl std::fmt::Display for BalloonInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalloonInput::Start => f.write_str("start"),
            BalloonInput::Pop(id) => write!(f, "pop #{id}"),
            BalloonInput::Miss => f.write_str("miss"),
            BalloonInput::Continue => f.write_str("continue"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BalloonPop {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    stats: PlayerMap<BalloonStats>,
    balloons: Vec<Balloon>,
    next_id: u32,
    level: u32,
    combo: u32,
    clock: Countdown,
    level_clock: FixedStep,
    spawner: FixedStep,
    frames: FixedStep,
}

impl BalloonPop {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("balloon_pop"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(1),
            scores: Scoreboard::new(session.players),
            stats: PlayerMap::with_default(session.players.get()),
            balloons: Vec::new(),
            next_id: 0,
            level: 1,
            combo: 0,
            clock: Countdown::idle(),
            level_clock: FixedStep::new(LEVEL_TIME),
            spawner: FixedStep::new(spawn_interval(1)),
            frames: FixedStep::new(FRAME),
        }
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn combo(&self) -> u32 {
        self.combo
    }

    #[must_use]
    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    #[must_use]
    pub fn stats(&self, player: PlayerId) -> &BalloonStats {
        &self.stats[player]
    }

    #[must_use]
    pub fn seconds_left(&self) -> u64 {
        self.clock.whole_seconds_left()
    }

    /// First seat with the best value of `key`.
    pub fn best_by(&self, key: impl Fn(&BalloonStats) -> u32) -> PlayerId {
        let mut best = PlayerId::new(0);
        for (player, stats) in self.stats.iter() {
            if key(stats) > key(&self.stats[best]) {
                best = player;
            }
        }
        best
    }

    fn start_round(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        self.balloons.clear();
        self.level = 1;
        self.combo = 0;
        self.clock.start(ROUND_TIME);
        self.level_clock.reset();
        self.spawner = FixedStep::new(spawn_interval(1));
        self.frames.reset();
        Ok(())
    }

    fn spawn(&mut self) {
        let level = self.level;
        let l = f64::from(level);
        let kind = BalloonKind::from_roll(level, self.rng.gen_f64() * 100.0);
        let size = 60.0 - l * 3.0;
        let x = self.rng.gen_f64() * (FIELD_WIDTH - size);
        let y = self.rng.gen_f64() * (FIELD_HEIGHT - size);

        let mut balloon = Balloon {
            id: self.next_id + 1,
            kind,
            x,
            y,
            size,
            drift: 0.0,
            shrink_rate: 0.0,
            expires_in: None,
        };
        match kind {
            BalloonKind::Moving => {
                let speed = 1.0 + l * 0.5;
                balloon.drift = if self.rng.gen_bool(0.5) { speed } else { -speed };
            }
            BalloonKind::Shrinking => {
                balloon.shrink_rate = 0.3 + l * 0.1;
                balloon.expires_in = Some(Duration::from_millis(u64::from(4_000 - level * 400)));
            }
            BalloonKind::Bonus => {
                balloon.expires_in = Some(Duration::from_millis(u64::from(3_000 - level * 300)));
            }
            BalloonKind::Normal | BalloonKind::Penalty => {}
        }
        self.next_id += 1;
        self.balloons.push(balloon);
    }

    fn pop(&mut self, id: u32) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let index = self
            .balloons
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| GameError::illegal(format!("no balloon #{id}")))?;
        let balloon = self.balloons.remove(index);
        let player = self.turns.active();

        self.combo = if balloon.kind == BalloonKind::Penalty {
            0
        } else {
            self.combo + 1
        };
        let points = (balloon.kind.points() as f64 * combo_multiplier(self.combo)).round() as i64;
        let score = self.scores.add_floored(player, points);

        let stats = &mut self.stats[player];
        stats.clicks += 1;
        if balloon.kind.points() > 0 {
            stats.popped += 1;
        }
        if balloon.kind == BalloonKind::Penalty {
            stats.penalties += 1;
        }
        stats.max_combo = stats.max_combo.max(self.combo);
        debug!(player = %player, kind = ?balloon.kind, combo = self.combo, points, score, "balloon popped");
        Ok(())
    }

    fn miss(&mut self) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        self.combo = 0;
        self.stats[self.turns.active()].clicks += 1;
        Ok(())
    }

    fn end_round(&mut self) {
        self.clock.cancel();
        self.balloons.clear();
        let stats = &mut self.stats[self.turns.active()];
        stats.accuracy = if stats.clicks > 0 {
            (f64::from(stats.popped) / f64::from(stats.clicks) * 100.0).round() as u32
        } else {
            0
        };
        self.phase.advance(PhaseEvent::Finish);
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

    fn level_up(&mut self, steps: u32) {
        let level = (self.level + steps).min(MAX_LEVEL);
        if level != self.level {
            self.level = level;
            self.spawner = FixedStep::new(spawn_interval(level));
            debug!(level, "balloon level up");
        }
    }
}

impl MiniGame for BalloonPop {
    type Input = BalloonInput;

    fn kind(&self) -> GameKind {
        GameKind::BalloonPop
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

    fn legal_inputs(&self) -> Vec<BalloonInput> {
        match self.phase.phase() {
            Phase::Ready => vec![BalloonInput::Start],
            Phase::Playing => self
                .balloons
                .iter()
                .map(|b| BalloonInput::Pop(b.id))
                .chain(std::iter::once(BalloonInput::Miss))
                .collect(),
            Phase::Result => vec![BalloonInput::Continue],
            Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: BalloonInput) -> Result<()> {
        match input {
            BalloonInput::Start => self.start_round(),
            BalloonInput::Pop(id) => self.pop(id),
            BalloonInput::Miss => self.miss(),
            BalloonInput::Continue => self.next(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase.phase() != Phase::Playing {
            return;
        }

        for _ in 0..self.frames.advance(dt) {
            self.balloons.retain_mut(Balloon::frame);
        }
        self.balloons.retain_mut(|b| match b.expires_in.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(dt);
                !left.is_zero()
            }
            None => true,
        });

        let level_ups = self.level_clock.advance(dt);
        self.level_up(level_ups);
        for _ in 0..self.spawner.advance(dt) {
            self.spawn();
        }

        if self.clock.tick(dt) == TimerStatus::Expired {
            self.end_round();
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> BalloonPop {
        let mut game = BalloonPop::new(&SessionConfig::new(2).unwrap().with_seed(31));
        game.handle(BalloonInput::Start).unwrap();
        game
    }

    fn place(game: &mut BalloonPop, kind: BalloonKind) -> u32 {
        game.next_id += 1;
        game.balloons.push(Balloon {
            id: game.next_id,
            kind,
            x: 100.0,
            y: 100.0,
            size: 50.0,
            drift: 0.0,
            shrink_rate: 0.0,
            expires_in: None,
        });
        game.next_id
    }

    #[test]
    fn test_kind_table() {
        assert_eq!(BalloonKind::from_roll(1, 9.0), BalloonKind::Bonus);
        assert_eq!(BalloonKind::from_roll(1, 9.5), BalloonKind::Normal);
        assert_eq!(BalloonKind::from_roll(2, 4.0), BalloonKind::Moving);
        assert_eq!(BalloonKind::from_roll(3, 4.0), BalloonKind::Penalty);
        assert_eq!(BalloonKind::from_roll(3, 20.0), BalloonKind::Shrinking);
        assert_eq!(BalloonKind::from_roll(5, 25.0), BalloonKind::Shrinking);
        assert_eq!(BalloonKind::from_roll(5, 95.0), BalloonKind::Normal);
    }

    #[test]
    fn test_combo_multiplies_points() {
        let mut game = started();
        let p0 = PlayerId::new(0);
        for _ in 0..3 {
            let id = place(&mut game, BalloonKind::Bonus);
            game.handle(BalloonInput::Pop(id)).unwrap();
        }
        // 3 + 3 + round(3 * 1.5)
        assert_eq!(game.scoreboard().score(p0), 11);
        assert_eq!(game.combo(), 3);

        game.handle(BalloonInput::Miss).unwrap();
        assert_eq!(game.combo(), 0);
        assert_eq!(game.stats(p0).max_combo, 3);
    }

    #[test]
    fn test_penalty_resets_combo_and_floors_score() {
        let mut game = started();
        let p0 = PlayerId::new(0);
        let id = place(&mut game, BalloonKind::Normal);
        game.handle(BalloonInput::Pop(id)).unwrap();
        let id = place(&mut game, BalloonKind::Penalty);
        game.handle(BalloonInput::Pop(id)).unwrap();

        assert_eq!(game.scoreboard().score(p0), 0);
        assert_eq!(game.combo(), 0);
        let stats = game.stats(p0);
        assert_eq!((stats.popped, stats.penalties, stats.clicks), (1, 1, 2));
        assert!(game.handle(BalloonInput::Pop(id)).is_err());
    }

    #[test]
    fn test_special_balloons_animate() {
        let mut game = started();
        place(&mut game, BalloonKind::Moving);
        game.balloons[0].drift = 2.0;
        game.balloons[0].x = FIELD_WIDTH - 51.0;
        game.tick(FRAME);
        assert_eq!(game.balloons()[0].x, FIELD_WIDTH - 53.0);
        assert_eq!(game.balloons()[0].drift, -2.0);

        game.balloons.clear();
        place(&mut game, BalloonKind::Shrinking);
        game.balloons[0].shrink_rate = 10.0;
        game.tick(FRAME * 4);
        assert!(game.balloons().is_empty());

        place(&mut game, BalloonKind::Bonus);
        game.balloons[0].expires_in = Some(Duration::from_millis(100));
        game.tick(Duration::from_millis(100));
        assert!(game.balloons().is_empty());
    }

    #[test]
    fn test_levels_speed_up_spawns() {
        let mut game = started();
        game.tick(Duration::from_millis(900));
        assert_eq!(game.balloons().len(), 1);
        game.tick(Duration::from_millis(9_100));
        assert_eq!(game.level(), 2);
        game.tick(Duration::from_secs(10));
        assert_eq!(game.level(), 3);
        assert!(game.balloons().iter().all(|b| b.size <= 57.0));
    }

    #[test]
    fn test_round_end_accuracy_and_rotation() {
        let mut game = started();
        let p0 = PlayerId::new(0);
        let id = place(&mut game, BalloonKind::Normal);
        game.handle(BalloonInput::Pop(id)).unwrap();
        game.handle(BalloonInput::Miss).unwrap();
        game.handle(BalloonInput::Miss).unwrap();

        game.tick(ROUND_TIME);
        assert_eq!(game.phase(), Phase::Result);
        assert_eq!(game.stats(p0).accuracy, 33);
        assert!(game.balloons().is_empty());

        game.handle(BalloonInput::Continue).unwrap();
        assert_eq!(game.active_player(), PlayerId::new(1));
        game.handle(BalloonInput::Start).unwrap();
        assert_eq!(game.level(), 1);
        game.tick(ROUND_TIME);
        game.handle(BalloonInput::Continue).unwrap();
        assert!(game.is_over());
        assert_eq!(game.best_by(|s| s.popped), p0);
    }
}
