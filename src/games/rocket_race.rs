//! Rocket Race: one launch per player, closest landing to the target wins.

use std::time::Duration;

use tracing::debug;

use crate::core::{
    Delay, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, Scoreboard,
    SessionConfig, TurnOrder,
};
use crate::error::Result;
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const FIELD_WIDTH: f64 = 600.0;
pub const FIELD_HEIGHT: f64 = 300.0;
pub const TARGET: (f64, f64) = (FIELD_WIDTH - 60.0, FIELD_HEIGHT / 2.0);
pub const MAX_POINTS: i64 = 100;
pub const LANDING_TIME: Duration = Duration::from_millis(900);

/// Points for landing `distance` units from the target.
#[must_use]
pub fn landing_points(distance: f64) -> i64 {
    (MAX_POINTS - distance.round() as i64).max(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RocketInput {
    Start,
    Launch,
}

impl std::fmt::Display for RocketInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RocketInput::Start => f.write_str("start"),
            RocketInput::Launch => f.write_str("launch"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub player: PlayerId,
    pub x: f64,
    pub y: f64,
    pub distance: f64,
    pub points: i64,
}

#[derive(Clone, Debug)]
pub struct RocketRace {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    shots: Vec<Shot>,
    landing: Delay<()>,
}

impl RocketRace {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("rocket_race"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(1),
            scores: Scoreboard::new(session.players),
            shots: Vec::new(),
            landing: Delay::new(),
        }
    }

    /// Every launch so far, oldest first.
    #[must_use]
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// The rocket in flight, if any.
    #[must_use]
    pub fn rocket(&self) -> Option<&Shot> {
        self.landing.is_pending().then(|| self.shots.last()).flatten()
    }

    fn launch(&mut self) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let y = 40.0 + self.rng.gen_f64() * (FIELD_HEIGHT - 80.0);
        let x = TARGET.0 + (self.rng.gen_f64() - 0.5) * 40.0;
        let distance = (x - TARGET.0).hypot(y - TARGET.1);
        let points = landing_points(distance);
        let player = self.turns.active();
        self.scores.add(player, points);
        self.shots.push(Shot {
            player,
            x,
            y,
            distance,
            points,
        });
        debug!(player = %player, distance, points, "rocket landed");

        self.phase.apply(PhaseEvent::Finish)?;
        self.landing.schedule(LANDING_TIME, ());
        Ok(())
    }
}

impl MiniGame for RocketRace {
    type Input = RocketInput;

    fn kind(&self) -> GameKind {
        GameKind::RocketRace
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

    fn legal_inputs(&self) -> Vec<RocketInput> {
        match self.phase.phase() {
            Phase::Ready => vec![RocketInput::Start],
            Phase::Playing => vec![RocketInput::Launch],
            Phase::Result | Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: RocketInput) -> Result<()> {
        match input {
            RocketInput::Start => {
                self.phase.apply(PhaseEvent::Start)?;
                Ok(())
            }
            RocketInput::Launch => self.launch(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.landing.tick(dt).is_none() {
            return;
        }
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

    #[test]
    fn test_landing_points() {
        assert_eq!(landing_points(0.0), 100);
        assert_eq!(landing_points(12.4), 88);
        assert_eq!(landing_points(12.5), 87);
        assert_eq!(landing_points(140.0), 0);
    }

    #[test]
    fn test_landing_stays_near_target() {
        let mut game = RocketRace::new(&SessionConfig::new(4).unwrap().with_seed(2));
        game.handle(RocketInput::Start).unwrap();
        for _ in 0..4 {
            game.handle(RocketInput::Launch).unwrap();
            let shot = *game.rocket().unwrap();
            assert!((TARGET.0 - 20.0..=TARGET.0 + 20.0).contains(&shot.x));
            assert!((40.0..FIELD_HEIGHT - 40.0).contains(&shot.y));
            assert_eq!(shot.points, landing_points(shot.distance));
            game.tick(LANDING_TIME);
        }
        assert!(game.is_over());
        assert_eq!(game.shots().len(), 4);

        let total: i64 = game.shots().iter().map(|s| s.points).sum();
        let scored: i64 = game.scoreboard().iter().map(|(_, s)| s).sum();
        assert_eq!(total, scored);
    }

    #[test]
    fn test_one_launch_per_turn() {
        let mut game = RocketRace::new(&SessionConfig::new(2).unwrap().with_seed(2));
        game.handle(RocketInput::Start).unwrap();
        game.handle(RocketInput::Launch).unwrap();
        assert!(game.handle(RocketInput::Launch).is_err());

        game.tick(Duration::from_millis(899));
        assert_eq!(game.active_player(), PlayerId::new(0));
        game.tick(Duration::from_millis(1));
        assert_eq!(game.active_player(), PlayerId::new(1));
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.rocket().is_none());
    }
}
