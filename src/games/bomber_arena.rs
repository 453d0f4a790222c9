//! Bomber Arena: players take turns dropping bombs on a shared grid.
//!
//! A bomb explodes half a second after it is placed and blasts its own cell
//! plus the four neighbours. Anyone standing in the blast is out, bomber
//! included. The last player standing wins; if the grid fills up first the
//! best score wins.

use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::core::{
    Delay, Direction, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, PlayerMap,
    Pos, Scoreboard, SessionConfig, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const GRID_SIZE: usize = 10;
pub const FUSE_TIME: Duration = Duration::from_millis(500);
pub const BLAST_TIME: Duration = Duration::from_millis(800);
pub const POINTS_PER_HIT: i64 = 2;
pub const POINTS_FOR_MISS: i64 = 1;

/// Cells caught by a bomb at `center`, clipped to the grid.
#[must_use]
pub fn blast_cells(center: Pos) -> SmallVec<[Pos; 5]> {
    std::iter::once(center)
        .chain(Direction::ALL.into_iter().map(|dir| center.step(dir)))
        .filter(|cell| cell.in_bounds(GRID_SIZE, GRID_SIZE))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BomberInput {
    Start,
    Drop(Pos),
}

impl std::fmt::Display for BomberInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomberInput::Start => f.write_str("start"),
            BomberInput::Drop(pos) => write!(f, "bomb {pos}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bomb {
    pub pos: Pos,
    pub owner: PlayerId,
    pub exploded: bool,
}

#[derive(Clone, Debug)]
pub struct BomberArena {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    positions: PlayerMap<Pos>,
    bombs: Vec<Bomb>,
    blast: SmallVec<[Pos; 5]>,
    fuse: Delay<Pos>,
    aftermath: Delay<()>,
}

impl BomberArena {
    pub fn new(session: &SessionConfig) -> Self {
        let mut rng = session.rng().for_context("bomber_arena");
        let cells: Vec<usize> = (0..GRID_SIZE * GRID_SIZE).collect();
        let starts = rng.sample(&cells, session.players.get());
        let positions = PlayerMap::new(session.players.get(), |p| {
            let cell = starts[p.index()];
            Pos::new((cell % GRID_SIZE) as i32, (cell / GRID_SIZE) as i32)
        });
        Self {
            rng,
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players),
            scores: Scoreboard::new(session.players),
            positions,
            bombs: Vec::new(),
            blast: SmallVec::new(),
            fuse: Delay::new(),
            aftermath: Delay::new(),
        }
    }

    #[must_use]
    pub fn position(&self, player: PlayerId) -> Pos {
        self.positions[player]
    }

    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        !self.turns.is_eliminated(player)
    }

    #[must_use]
    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    /// Cells of the blast currently on screen.
    #[must_use]
    pub fn blast(&self) -> &[Pos] {
        &self.blast
    }

    /// Cells a bomb may be dropped on: in the grid, no bomb, no player.
    #[must_use]
    pub fn is_free(&self, cell: Pos) -> bool {
        cell.in_bounds(GRID_SIZE, GRID_SIZE)
            && !self.bombs.iter().any(|b| b.pos == cell)
            && !self.positions.values().any(|p| *p == cell)
    }

    fn free_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..GRID_SIZE as i32)
            .flat_map(|y| (0..GRID_SIZE as i32).map(move |x| Pos::new(x, y)))
            .filter(|cell| self.is_free(*cell))
    }

    fn drop_bomb(&mut self, cell: Pos) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        if self.fuse.is_pending() {
            return Err(GameError::illegal("a bomb is already ticking"));
        }
        if !self.is_free(cell) {
            return Err(GameError::illegal(format!("cannot drop a bomb on {cell}")));
        }
        let owner = self.turns.active();
        self.bombs.push(Bomb {
            pos: cell,
            owner,
            exploded: false,
        });
        self.fuse.schedule(FUSE_TIME, cell);
        debug!(player = %owner, %cell, "bomb dropped");
        Ok(())
    }

    fn explode(&mut self, center: Pos) {
        let bomber = self.turns.active();
        self.blast = blast_cells(center);
        for bomb in self.bombs.iter_mut().filter(|b| b.pos == center) {
            bomb.exploded = true;
        }

        let caught: Vec<PlayerId> = self
            .positions
            .iter()
            .filter(|(p, pos)| !self.turns.is_eliminated(*p) && self.blast.contains(*pos))
            .map(|(p, _)| p)
            .collect();
        let hits = caught.iter().filter(|p| **p != bomber).count() as i64;
        for player in caught {
            self.turns.eliminate(player);
        }
        let points = if hits == 0 {
            POINTS_FOR_MISS
        } else {
            hits * POINTS_PER_HIT
        };
        self.scores.add(bomber, points);
        debug!(player = %bomber, hits, points, "bomb exploded");

        self.phase.advance(PhaseEvent::Finish);
        self.aftermath.schedule(BLAST_TIME, ());
    }

    fn next_turn(&mut self) {
        self.blast.clear();
        if self.turns.alive_count() <= 1 || self.free_cells().next().is_none() {
            self.phase.advance(PhaseEvent::GameOver);
            info!(alive = self.turns.alive_count(), bombs = self.bombs.len(), "bomber arena over");
            return;
        }
        self.turns.advance();
        self.phase.advance(PhaseEvent::Next);
        self.phase.advance(PhaseEvent::Start);
    }
}

impl MiniGame for BomberArena {
    type Input = BomberInput;

    fn kind(&self) -> GameKind {
        GameKind::BomberArena
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

    fn legal_inputs(&self) -> Vec<BomberInput> {
        match self.phase.phase() {
            Phase::Ready => vec![BomberInput::Start],
            Phase::Playing if !self.fuse.is_pending() => {
                self.free_cells().map(BomberInput::Drop).collect()
            }
            _ => Vec::new(),
        }
    }

    fn handle(&mut self, input: BomberInput) -> Result<()> {
        match input {
            BomberInput::Start => {
                self.phase.apply(PhaseEvent::Start)?;
                Ok(())
            }
            BomberInput::Drop(cell) => self.drop_bomb(cell),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.aftermath.tick(dt).is_some() {
            self.next_turn();
        }
        if let Some(center) = self.fuse.tick(dt) {
            self.explode(center);
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        if !self.phase.is_over() {
            return None;
        }
        Some(match self.turns.sole_survivor() {
            Some(winner) => GameResult::Winner(winner),
            None => self.scores.result(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(players: usize) -> BomberArena {
        let mut game = BomberArena::new(&SessionConfig::new(players).unwrap().with_seed(4));
        game.handle(BomberInput::Start).unwrap();
        game
    }

    fn place(game: &mut BomberArena, player: u8, x: i32, y: i32) {
        game.positions[PlayerId::new(player)] = Pos::new(x, y);
    }

    fn bomb_and_wait(game: &mut BomberArena, cell: Pos) {
        game.handle(BomberInput::Drop(cell)).unwrap();
        game.tick(FUSE_TIME);
        game.tick(BLAST_TIME);
    }

    #[test]
    fn test_blast_is_clipped() {
        assert_eq!(blast_cells(Pos::new(5, 5)).len(), 5);
        assert_eq!(blast_cells(Pos::new(0, 0)).len(), 3);
        assert_eq!(blast_cells(Pos::new(9, 4)).len(), 4);
    }

    #[test]
    fn test_players_start_on_distinct_cells() {
        let game = started(4);
        let mut cells: Vec<Pos> = PlayerId::all(4).map(|p| game.position(p)).collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_occupied_cells_rejected() {
        let mut game = started(2);
        let other = game.position(PlayerId::new(1));
        assert!(game.handle(BomberInput::Drop(other)).is_err());
        assert!(game.handle(BomberInput::Drop(Pos::new(10, 0))).is_err());
    }

    #[test]
    fn test_miss_scores_one_and_passes_turn() {
        let mut game = started(2);
        place(&mut game, 0, 0, 0);
        place(&mut game, 1, 9, 9);

        game.handle(BomberInput::Drop(Pos::new(5, 5))).unwrap();
        assert!(game.legal_inputs().is_empty());
        assert!(game.handle(BomberInput::Drop(Pos::new(6, 6))).is_err());

        game.tick(FUSE_TIME);
        assert_eq!(game.phase(), Phase::Result);
        assert_eq!(game.blast().len(), 5);
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 1);

        game.tick(BLAST_TIME);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.active_player(), PlayerId::new(1));
        assert!(!game.is_free(Pos::new(5, 5)));
    }

    #[test]
    fn test_hit_eliminates_and_skips_turn() {
        let mut game = started(3);
        place(&mut game, 0, 0, 0);
        place(&mut game, 1, 4, 4);
        place(&mut game, 2, 9, 9);

        bomb_and_wait(&mut game, Pos::new(4, 5));
        assert!(!game.is_alive(PlayerId::new(1)));
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 2);
        assert_eq!(game.active_player(), PlayerId::new(2));

        bomb_and_wait(&mut game, Pos::new(0, 1));
        assert!(game.is_over());
        assert_eq!(game.outcome(), Some(GameResult::Winner(PlayerId::new(2))));
        assert_eq!(game.scoreboard().score(PlayerId::new(2)), 2);
    }

    #[test]
    fn test_bomber_can_blow_themselves_up() {
        let mut game = started(3);
        place(&mut game, 0, 0, 0);
        place(&mut game, 1, 2, 0);
        place(&mut game, 2, 9, 9);

        bomb_and_wait(&mut game, Pos::new(1, 0));
        assert!(!game.is_alive(PlayerId::new(0)));
        assert!(!game.is_alive(PlayerId::new(1)));
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 2);
        assert_eq!(game.outcome(), Some(GameResult::Winner(PlayerId::new(2))));
    }
}
