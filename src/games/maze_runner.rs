//! Maze Runner: each player races through a fresh maze with the arrow keys.

use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::core::{
    Direction, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, PlayerMap, Pos,
    Scoreboard, SessionConfig, Stopwatch, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::maze::Maze;
use crate::rules::MiniGame;

pub const MAZE_SIZE: usize = 15;
pub const BASE_POINTS: i64 = 100;
/// Seconds under which finishing earns a time bonus.
pub const PAR_SECONDS: f64 = 30.0;

/// Points for finishing in `seconds` (tenths precision) after `steps` moves.
#[must_use]
pub fn run_points(seconds: f64, steps: u32) -> i64 {
    let time_bonus = ((PAR_SECONDS - seconds).floor() as i64 * 2).max(0);
    let step_penalty = i64::from(steps / 10);
    BASE_POINTS + time_bonus - step_penalty
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MazeInput {
    Start,
    Move(Direction),
    Continue,
}

impl std::fmt::Display for MazeInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MazeInput::Start => f.write_str("start"),
            MazeInput::Move(dir) => write!(f, "move {dir}"),
            MazeInput::Continue => f.write_str("continue"),
        }
    }
}

/// A finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunRecord {
    pub seconds: f64,
    pub steps: u32,
    pub points: i64,
}

#[derive(Clone, Debug)]
pub struct MazeRunner {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    maze: Option<Maze>,
    position: Pos,
    visited: FxHashSet<Pos>,
    steps: u32,
    clock: Stopwatch,
    runs: PlayerMap<Option<RunRecord>>,
}

impl MazeRunner {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("maze_runner"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(1),
            scores: Scoreboard::new(session.players),
            maze: None,
            position: Pos::new(1, 1),
            visited: FxHashSet::default(),
            steps: 0,
            clock: Stopwatch::new(),
            runs: PlayerMap::with_value(session.players.get(), None),
        }
    }

    /// Maze of the current run.
    #[must_use]
    pub fn maze(&self) -> Option<&Maze> {
        self.maze.as_ref()
    }

    #[must_use]
    pub fn position(&self) -> Pos {
        self.position
    }

    /// Steps taken in the current run.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Run time shown on screen, in seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.seconds_tenths()
    }

    /// True when the runner has walked over `pos` this run.
    #[must_use]
    pub fn was_visited(&self, pos: Pos) -> bool {
        self.visited.contains(&pos)
    }

    #[must_use]
    pub fn run(&self, player: PlayerId) -> Option<RunRecord> {
        self.runs[player]
    }

    fn start_run(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        let maze = Maze::generate(MAZE_SIZE, &mut self.rng);
        self.position = maze.start();
        self.maze = Some(maze);
        self.visited.clear();
        self.visited.insert(self.position);
        self.steps = 0;
        self.clock.restart();
        Ok(())
    }

    fn can_move(&self, dir: Direction) -> bool {
        self.maze
            .as_ref()
            .is_some_and(|maze| maze.is_open(self.position.step(dir)))
    }

    fn step(&mut self, dir: Direction) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        if !self.can_move(dir) {
            return Err(GameError::illegal(format!("wall to the {dir}")));
        }
        self.position = self.position.step(dir);
        self.visited.insert(self.position);
        self.steps += 1;

        if self.maze.as_ref().is_some_and(|maze| maze.finish() == self.position) {
            self.finish_run()?;
        }
        Ok(())
    }

    fn finish_run(&mut self) -> Result<()> {
        self.clock.stop();
        let player = self.turns.active();
        let seconds = self.clock.seconds_tenths();
        let points = run_points(seconds, self.steps);
        self.scores.add(player, points);
        self.runs[player] = Some(RunRecord {
            seconds,
            steps: self.steps,
            points,
        });
        debug!(player = %player, seconds, steps = self.steps, points, "maze finished");
        self.phase.apply(PhaseEvent::Finish)?;
        Ok(())
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
}

impl MiniGame for MazeRunner {
    type Input = MazeInput;

    fn kind(&self) -> GameKind {
        GameKind::MazeRunner
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

    fn legal_inputs(&self) -> Vec<MazeInput> {
        match self.phase.phase() {
            Phase::Ready => vec![MazeInput::Start],
            Phase::Playing => Direction::ALL
                .into_iter()
                .filter(|dir| self.can_move(*dir))
                .map(MazeInput::Move)
                .collect(),
            Phase::Result => vec![MazeInput::Continue],
            Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: MazeInput) -> Result<()> {
        match input {
            MazeInput::Start => self.start_run(),
            MazeInput::Move(dir) => self.step(dir),
            MazeInput::Continue => self.next(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.clock.tick(dt);
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }

    fn status(&self) -> String {
        format!(
            "Maze Runner | {} | {} | {:.1}s | {} steps",
            self.phase.phase(),
            self.turns.active(),
            self.clock.seconds_tenths(),
            self.steps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> MazeRunner {
        MazeRunner::new(&SessionConfig::new(2).unwrap().with_seed(21))
    }

    fn solve(game: &mut MazeRunner) -> usize {
        let path = game.maze().unwrap().shortest_path().unwrap();
        for dir in &path {
            game.handle(MazeInput::Move(*dir)).unwrap();
        }
        path.len()
    }

    #[test]
    fn test_run_points() {
        assert_eq!(run_points(0.0, 0), 160);
        assert_eq!(run_points(12.3, 28), 100 + 17 * 2 - 2);
        assert_eq!(run_points(45.0, 5), 100);
        assert_eq!(run_points(29.9, 9), 100);
    }

    #[test]
    fn test_walls_block_moves() {
        let mut game = game();
        game.handle(MazeInput::Start).unwrap();
        assert!(game.handle(MazeInput::Move(Direction::Up)).is_err());
        assert!(game.handle(MazeInput::Move(Direction::Left)).is_err());
        assert_eq!(game.steps(), 0);
        assert_eq!(game.position(), Pos::new(1, 1));
        assert!(!game.legal_inputs().is_empty());
    }

    #[test]
    fn test_reaching_finish_scores() {
        let mut game = game();
        game.handle(MazeInput::Start).unwrap();
        game.tick(Duration::from_millis(10_050));
        let steps = solve(&mut game);

        assert_eq!(game.phase(), Phase::Result);
        let run = game.run(PlayerId::new(0)).unwrap();
        assert_eq!(run.seconds, 10.0);
        assert_eq!(run.steps as usize, steps);
        assert_eq!(run.points, 100 + 40 - (steps as i64 / 10));
        assert!(game.was_visited(game.maze().unwrap().finish()));
    }

    #[test]
    fn test_each_player_gets_a_new_maze() {
        let mut game = game();
        game.handle(MazeInput::Start).unwrap();
        let first = game.maze().unwrap().clone();
        solve(&mut game);
        game.handle(MazeInput::Continue).unwrap();

        assert_eq!(game.active_player(), PlayerId::new(1));
        game.handle(MazeInput::Start).unwrap();
        assert_ne!(game.maze().unwrap(), &first);
        solve(&mut game);
        game.handle(MazeInput::Continue).unwrap();
        assert!(game.is_over());
    }
}
