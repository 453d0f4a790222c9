//! Shape Drop: catch the falling target shapes before time runs out.

use std::time::Duration;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::core::{
    Countdown, Delay, FixedStep, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId,
    Scoreboard, SessionConfig, TimerStatus, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const ROUND_TIME: Duration = Duration::from_secs(30);
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(700);
pub const RESULT_TIME: Duration = Duration::from_secs(3);
/// Caught or missed shapes linger this long after spawning.
pub const SHAPE_LIFETIME: Duration = Duration::from_secs(5);
pub const FIELD_WIDTH: f64 = 600.0;
pub const FIELD_HEIGHT: f64 = 400.0;
pub const SHAPE_SIZE: f64 = 50.0;
pub const CATCH_POINTS: i64 = 1;
pub const COMPLETION_BONUS: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Square,
    Circle,
    Triangle,
    Star,
    Heart,
    Hexagon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Square,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Star,
        ShapeKind::Heart,
        ShapeKind::Hexagon,
    ];
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShapeKind::Square => "square",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
            ShapeKind::Hexagon => "hexagon",
        };
        f.write_str(name)
    }
}

/// How many of a shape the player has to catch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub shape: ShapeKind,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FallingShape {
    pub id: u32,
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    /// Time to fall the whole field.
    pub fall_time: Duration,
    pub age: Duration,
    pub caught: bool,
    pub missed: bool,
    /// Target shapes are drawn golden.
    pub golden: bool,
}

impl FallingShape {
    fn is_live(&self) -> bool {
        !self.caught && !self.missed
    }

    fn fall(&mut self, dt: Duration) {
        self.age += dt;
        if !self.is_live() {
            return;
        }
        let progress = (self.age.as_secs_f64() / self.fall_time.as_secs_f64()).min(1.0);
        let y = progress * (FIELD_HEIGHT + 100.0) - 50.0;
        if y > FIELD_HEIGHT {
            self.missed = true;
        } else {
            self.y = y;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeInput {
    Start,
    Catch(u32),
}

impl std::fmt::Display for ShapeInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeInput::Start => f.write_str("start"),
            ShapeInput::Catch(id) => write!(f, "catch #{id}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShapeDrop {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    targets: SmallVec<[Target; 4]>,
    collected: FxHashMap<ShapeKind, u32>,
    shapes: Vec<FallingShape>,
    next_id: u32,
    missed: u32,
    clock: Countdown,
    spawner: FixedStep,
    next_round: Delay<()>,
}

impl ShapeDrop {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("shape_drop"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(1),
            scores: Scoreboard::new(session.players),
            targets: SmallVec::new(),
            collected: FxHashMap::default(),
            shapes: Vec::new(),
            next_id: 0,
            missed: 0,
            clock: Countdown::idle(),
            spawner: FixedStep::new(SPAWN_INTERVAL),
            next_round: Delay::new(),
        }
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Shapes of `kind` caught this round.
    #[must_use]
    pub fn collected(&self, kind: ShapeKind) -> u32 {
        self.collected.get(&kind).copied().unwrap_or(0)
    }

    /// Shapes that fell off the field this round.
    #[must_use]
    pub fn missed(&self) -> u32 {
        self.missed
    }

    #[must_use]
    pub fn shapes(&self) -> &[FallingShape] {
        &self.shapes
    }

    #[must_use]
    pub fn seconds_left(&self) -> u64 {
        self.clock.whole_seconds_left()
    }

    fn is_target(&self, kind: ShapeKind) -> bool {
        self.targets.iter().any(|t| t.shape == kind)
    }

    fn targets_complete(&self) -> bool {
        self.targets
            .iter()
            .all(|t| self.collected(t.shape) >= t.count)
    }

    fn start_round(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        let amount = self.rng.gen_range_usize(3..5);
        self.targets = self
            .rng
            .sample(&ShapeKind::ALL, amount)
            .into_iter()
            .map(|shape| Target {
                shape,
                count: self.rng.gen_range(5..11) as u32,
            })
            .collect();
        self.collected.clear();
        self.shapes.clear();
        self.missed = 0;
        self.clock.start(ROUND_TIME);
        self.spawner.reset();
        Ok(())
    }

    fn spawn(&mut self) {
        let Some(&kind) = self.rng.choose(&ShapeKind::ALL) else {
            return;
        };
        let x = self.rng.gen_f64() * (FIELD_WIDTH - SHAPE_SIZE);
        let fall_time = Duration::from_secs_f64(self.rng.gen_range_f64(2.0..4.0));
        self.next_id += 1;
        self.shapes.push(FallingShape {
            id: self.next_id,
            kind,
            x,
            y: -50.0,
            fall_time,
            age: Duration::ZERO,
            caught: false,
            missed: false,
            golden: self.is_target(kind),
        });
    }

    fn catch(&mut self, id: u32) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let shape = self
            .shapes
            .iter_mut()
            .find(|s| s.id == id && s.is_live())
            .ok_or_else(|| GameError::illegal(format!("no falling shape #{id}")))?;
        shape.caught = true;
        let kind = shape.kind;

        if self.is_target(kind) {
            let player = self.turns.active();
            *self.collected.entry(kind).or_insert(0) += 1;
            self.scores.add(player, CATCH_POINTS);
            if self.targets_complete() {
                self.scores.add(player, COMPLETION_BONUS);
                debug!(player = %player, "all targets collected");
                self.end_round();
            }
        }
        Ok(())
    }

    fn end_round(&mut self) {
        self.clock.cancel();
        self.phase.advance(PhaseEvent::Finish);
        self.next_round.schedule(RESULT_TIME, ());
        debug!(player = %self.turns.active(), missed = self.missed, "shape round over");
    }
}

impl MiniGame for ShapeDrop {
    type Input = ShapeInput;

    fn kind(&self) -> GameKind {
        GameKind::ShapeDrop
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

    fn legal_inputs(&self) -> Vec<ShapeInput> {
        match self.phase.phase() {
            Phase::Ready => vec![ShapeInput::Start],
            Phase::Playing => self
                .shapes
                .iter()
                .filter(|s| s.is_live())
                .map(|s| ShapeInput::Catch(s.id))
                .collect(),
            Phase::Result | Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: ShapeInput) -> Result<()> {
        match input {
            ShapeInput::Start => self.start_round(),
            ShapeInput::Catch(id) => self.catch(id),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.next_round.tick(dt).is_some() {
            if self.turns.complete_round() {
                self.phase.advance(PhaseEvent::GameOver);
            } else {
                self.turns.advance();
                self.phase.advance(PhaseEvent::Next);
            }
            return;
        }
        if self.phase.phase() != Phase::Playing {
            return;
        }

        for shape in &mut self.shapes {
            let was_live = shape.is_live();
            shape.fall(dt);
            if was_live && shape.missed {
                self.missed += 1;
            }
        }
        self.shapes
            .retain(|s| s.is_live() || s.age < SHAPE_LIFETIME);
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

    fn started() -> ShapeDrop {
        let mut game = ShapeDrop::new(&SessionConfig::new(2).unwrap().with_seed(13));
        game.handle(ShapeInput::Start).unwrap();
        game
    }

    fn drop_shape(game: &mut ShapeDrop, kind: ShapeKind) -> u32 {
        game.next_id += 1;
        let golden = game.is_target(kind);
        game.shapes.push(FallingShape {
            id: game.next_id,
            kind,
            x: 100.0,
            y: -50.0,
            fall_time: Duration::from_secs(2),
            age: Duration::ZERO,
            caught: false,
            missed: false,
            golden,
        });
        game.next_id
    }

    #[test]
    fn test_targets_are_distinct() {
        let game = started();
        let targets = game.targets();
        assert!((3..=4).contains(&targets.len()));
        for (i, t) in targets.iter().enumerate() {
            assert!((5..=10).contains(&t.count));
            assert!(targets[i + 1..].iter().all(|o| o.shape != t.shape));
        }
    }

    #[test]
    fn test_spawns_every_700ms() {
        let mut game = started();
        game.tick(Duration::from_millis(699));
        assert!(game.shapes().is_empty());
        game.tick(Duration::from_millis(1));
        assert_eq!(game.shapes().len(), 1);
        game.tick(Duration::from_millis(1_400));
        assert_eq!(game.shapes().len(), 3);
        for shape in game.shapes() {
            assert_eq!(shape.golden, game.is_target(shape.kind));
        }
    }

    #[test]
    fn test_shapes_fall_and_expire() {
        let mut game = started();
        let id = drop_shape(&mut game, ShapeKind::Star);
        game.tick(Duration::from_millis(500));
        let shape = game.shapes().iter().find(|s| s.id == id).unwrap();
        assert!((shape.y - 75.0).abs() < 1e-9);

        game.tick(Duration::from_millis(1_500));
        let shape = game.shapes().iter().find(|s| s.id == id).unwrap();
        assert!(shape.missed);
        assert_eq!(game.missed(), 1);
        assert!(game.handle(ShapeInput::Catch(id)).is_err());

        game.tick(Duration::from_secs(3));
        assert!(game.shapes().iter().all(|s| s.id != id));
    }

    #[test]
    fn test_catching_scores_only_targets() {
        let mut game = started();
        let target = game.targets()[0].shape;
        let other = *ShapeKind::ALL
            .iter()
            .find(|k| !game.is_target(**k))
            .unwrap();

        let hit = drop_shape(&mut game, target);
        let decoy = drop_shape(&mut game, other);
        game.handle(ShapeInput::Catch(hit)).unwrap();
        game.handle(ShapeInput::Catch(decoy)).unwrap();

        assert_eq!(game.collected(target), 1);
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 1);
        assert!(game.handle(ShapeInput::Catch(hit)).is_err());
    }

    #[test]
    fn test_completing_targets_ends_round_early() {
        let mut game = started();
        game.targets = SmallVec::from_slice(&[Target {
            shape: ShapeKind::Heart,
            count: 2,
        }]);
        for _ in 0..2 {
            let id = drop_shape(&mut game, ShapeKind::Heart);
            game.handle(ShapeInput::Catch(id)).unwrap();
        }

        assert_eq!(game.phase(), Phase::Result);
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 12);
        game.tick(RESULT_TIME);
        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.active_player(), PlayerId::new(1));
    }

    #[test]
    fn test_time_up_then_game_over() {
        let mut game = started();
        game.tick(ROUND_TIME);
        assert_eq!(game.phase(), Phase::Result);
        game.tick(RESULT_TIME);

        game.handle(ShapeInput::Start).unwrap();
        assert_eq!(game.seconds_left(), 30);
        game.tick(ROUND_TIME);
        game.tick(RESULT_TIME);
        assert!(game.is_over());
    }
}
