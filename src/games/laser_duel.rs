//! Laser Duel: fire a laser from your corner and bounce it off mirrors.
//!
//! The beam starts heading right and advances in fixed steps. Passing near a
//! mirror swaps its horizontal and vertical travel. It stops on hitting an
//! opponent or leaving the field. Longer beams and hits score more.

use std::time::Duration;

use smallvec::SmallVec;
use tracing::debug;

use crate::core::{
    Delay, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerCount, PlayerId,
    PlayerMap, Scoreboard, SessionConfig, TurnOrder,
};
use crate::error::Result;
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const FIELD_SIZE: f64 = 400.0;
pub const MIRROR_COUNT: usize = 3;
pub const STEP_LENGTH: f64 = 40.0;
pub const MAX_STEPS: usize = 20;
/// Distance on each axis within which the beam touches a mirror or player.
pub const HIT_RADIUS: f64 = 24.0;
pub const POINTS_PER_SEGMENT: i64 = 10;
pub const HIT_BONUS: i64 = 50;
pub const BEAM_TIME: Duration = Duration::from_millis(900);

const CORNER_INSET: f64 = 32.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn near(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < HIT_RADIUS && (self.y - other.y).abs() < HIT_RADIUS
    }

    fn in_field(&self) -> bool {
        (0.0..=FIELD_SIZE).contains(&self.x) && (0.0..=FIELD_SIZE).contains(&self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mirror {
    pub at: Point,
    /// Drawn angle in degrees; the reflection itself is always an axis swap.
    pub angle: f64,
}

/// Straight piece of a beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// A fired beam.
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub shooter: PlayerId,
    pub segments: SmallVec<[Segment; 8]>,
    pub hit: Option<PlayerId>,
}

impl Beam {
    #[must_use]
    pub fn points(&self) -> i64 {
        let base = self.segments.len() as i64 * POINTS_PER_SEGMENT;
        if self.hit.is_some() {
            base + HIT_BONUS
        } else {
            base
        }
    }
}

/// Where each seat stands.
#[must_use]
pub fn corner_positions(players: PlayerCount) -> PlayerMap<Point> {
    let far = FIELD_SIZE - CORNER_INSET;
    let corners = [
        Point::new(CORNER_INSET, CORNER_INSET),
        Point::new(far, CORNER_INSET),
        Point::new(CORNER_INSET, far),
        Point::new(far, far),
    ];
    PlayerMap::new(players.get(), |p| corners[p.index()])
}

/// Trace a beam fired by `shooter`.
#[must_use]
pub fn trace_beam(shooter: PlayerId, players: &PlayerMap<Point>, mirrors: &[Mirror]) -> Beam {
    let mut at = players[shooter];
    let (mut dx, mut dy) = (1.0, 0.0);
    let mut segments = SmallVec::new();
    let mut hit = None;

    for _ in 0..MAX_STEPS {
        let next = Point::new(at.x + dx * STEP_LENGTH, at.y + dy * STEP_LENGTH);
        if mirrors.iter().any(|m| m.at.near(&next)) {
            std::mem::swap(&mut dx, &mut dy);
        }
        segments.push(Segment { from: at, to: next });

        if let Some((target, _)) = players
            .iter()
            .find(|(p, pos)| *p != shooter && pos.near(&next))
        {
            hit = Some(target);
            break;
        }
        if !next.in_field() {
            break;
        }
        at = next;
    }

    Beam {
        shooter,
        segments,
        hit,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaserInput {
    Start,
    Fire,
}

impl std::fmt::Display for LaserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaserInput::Start => f.write_str("start"),
            LaserInput::Fire => f.write_str("fire"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LaserDuel {
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    positions: PlayerMap<Point>,
    mirrors: Vec<Mirror>,
    beam: Option<Beam>,
    fade: Delay<()>,
}

impl LaserDuel {
    pub fn new(session: &SessionConfig) -> Self {
        let mut rng: GameRng = session.rng().for_context("laser_duel");
        let span = FIELD_SIZE - 160.0;
        let mirrors = (0..MIRROR_COUNT)
            .map(|_| Mirror {
                at: Point::new(80.0 + rng.gen_f64() * span, 80.0 + rng.gen_f64() * span),
                angle: rng.gen_f64() * 180.0,
            })
            .collect();
        Self {
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(1),
            scores: Scoreboard::new(session.players),
            positions: corner_positions(session.players),
            mirrors,
            beam: None,
            fade: Delay::new(),
        }
    }

    #[must_use]
    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    #[must_use]
    pub fn position(&self, player: PlayerId) -> Point {
        self.positions[player]
    }

    /// Beam on screen, if one was just fired.
    #[must_use]
    pub fn beam(&self) -> Option<&Beam> {
        self.beam.as_ref()
    }

    fn fire(&mut self) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let shooter = self.turns.active();
        let beam = trace_beam(shooter, &self.positions, &self.mirrors);
        let points = beam.points();
        self.scores.add(shooter, points);
        debug!(player = %shooter, segments = beam.segments.len(), hit = ?beam.hit, points, "laser fired");

        self.beam = Some(beam);
        self.phase.apply(PhaseEvent::Finish)?;
        self.fade.schedule(BEAM_TIME, ());
        Ok(())
    }
}

impl MiniGame for LaserDuel {
    type Input = LaserInput;

    fn kind(&self) -> GameKind {
        GameKind::LaserDuel
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

    fn legal_inputs(&self) -> Vec<LaserInput> {
        match self.phase.phase() {
            Phase::Ready => vec![LaserInput::Start],
            Phase::Playing => vec![LaserInput::Fire],
            Phase::Result | Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: LaserInput) -> Result<()> {
        match input {
            LaserInput::Start => {
                self.phase.apply(PhaseEvent::Start)?;
                Ok(())
            }
            LaserInput::Fire => self.fire(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.fade.tick(dt).is_none() {
            return;
        }
        self.beam = None;
        if self.turns.complete_round() {
            self.phase.advance(PhaseEvent::GameOver);
        } else {
            self.turns.advance();
            self.phase.advance(PhaseEvent::Next);
            self.phase.advance(PhaseEvent::Start);
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(n: usize) -> PlayerMap<Point> {
        corner_positions(PlayerCount::new(n).unwrap())
    }

    #[test]
    fn test_right_column_beam_leaves_at_once() {
        let beam = trace_beam(PlayerId::new(1), &seats(2), &[]);
        assert_eq!(beam.segments.len(), 1);
        assert_eq!(beam.hit, None);
        assert_eq!(beam.points(), 10);
    }

    #[test]
    fn test_open_field_beam_runs_off_the_edge() {
        // 32 -> 72 -> ... -> 392 is 9 steps inside, the 10th leaves.
        let players = PlayerMap::new(2, |p| {
            if p.index() == 0 {
                Point::new(32.0, 200.0)
            } else {
                Point::new(368.0, 32.0)
            }
        });
        let beam = trace_beam(PlayerId::new(0), &players, &[]);
        assert_eq!(beam.segments.len(), 10);
        assert_eq!(beam.hit, None);
        assert_eq!(beam.points(), 100);
    }

    #[test]
    fn test_beam_hits_player_in_line() {
        // Seat 2 at (368, 32) is on seat 1's row; the 8th step lands at 352.
        let beam = trace_beam(PlayerId::new(0), &seats(2), &[]);
        assert_eq!(beam.hit, Some(PlayerId::new(1)));
        assert_eq!(beam.segments.len(), 8);
        assert_eq!(beam.points(), 130);
    }

    #[test]
    fn test_mirror_turns_beam_down() {
        let mirror = Mirror {
            at: Point::new(112.0, 32.0),
            angle: 45.0,
        };
        let beam = trace_beam(PlayerId::new(0), &seats(2), &[mirror]);
        let turned = beam.segments[2];
        assert_eq!(turned.from, Point::new(112.0, 32.0));
        assert_eq!(turned.to, Point::new(112.0, 72.0));
    }

    #[test]
    fn test_turns_and_end() {
        let mut game = LaserDuel::new(&SessionConfig::new(3).unwrap().with_seed(6));
        assert_eq!(game.mirrors().len(), MIRROR_COUNT);
        for m in game.mirrors() {
            assert!((80.0..320.0).contains(&m.at.x));
        }
        game.handle(LaserInput::Start).unwrap();
        for seat in 0..3 {
            assert_eq!(game.active_player(), PlayerId::new(seat));
            game.handle(LaserInput::Fire).unwrap();
            let points = game.beam().unwrap().points();
            assert_eq!(game.scoreboard().score(PlayerId::new(seat)), points);
            game.tick(BEAM_TIME);
        }
        assert!(game.is_over());
        assert!(game.beam().is_none());
    }
}
