//! Tank Battle: everyone plays at once in a walled arena.
//!
//! Tanks spin on the spot until their owner holds the move control, then
//! drive forward along their heading. Firing launches a bullet from the
//! muzzle that bounces off walls and vanishes on the third bounce. A bullet
//! hitting an enemy tank deals damage; the last tank standing wins.
//!
//! Positions are in arena units with the origin at the top left. Headings
//! are in degrees, 0 pointing right and growing clockwise.

use std::time::Duration;

use tracing::{debug, info};

use crate::core::{
    DeviceType, Direction, FixedStep, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine,
    PlayerCount, PlayerId, PlayerMap, Pos, Scoreboard, SessionConfig, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::maze::Maze;
use crate::rules::MiniGame;

pub const CELL_SIZE: f64 = 80.0;
pub const WALL_THICKNESS: f64 = 8.0;
pub const ARENA_COLS: usize = 12;
pub const ARENA_ROWS: usize = 8;
pub const ARENA_WIDTH: f64 = ARENA_COLS as f64 * CELL_SIZE;
pub const ARENA_HEIGHT: f64 = ARENA_ROWS as f64 * CELL_SIZE;

pub const CANNON_LENGTH: f64 = 30.0;
pub const BULLET_SIZE: f64 = 8.0;
pub const MAX_HEALTH: u32 = 100;
pub const HIT_DAMAGE: u32 = 25;
pub const MAX_BOUNCES: u32 = 3;

const SPIN_STEP: Duration = Duration::from_millis(30);
const SPIN_DEGREES: f64 = 2.0;
const MOTION_STEP: Duration = Duration::from_millis(16);
const TANK_SPEED: f64 = 6.0;
const BULLET_SPEED: f64 = 10.0;
/// Chance that a closed maze passage is knocked through to open the arena up.
const EXTRA_OPENING_CHANCE: f64 = 0.4;

/// Tank edge length for an arena with `wall_count` walls.
#[must_use]
pub fn tank_size_for(wall_count: usize) -> f64 {
    match wall_count {
        n if n > 60 => 36.0,
        n if n > 40 => 44.0,
        n if n > 25 => 52.0,
        _ => 60.0,
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap; touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    fn is_horizontal(&self) -> bool {
        self.w > self.h
    }
}

/// Which on-screen corner button a seat uses on a phone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Corner {
    const SEATS: [Corner; 4] = [
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::TopLeft,
        Corner::TopRight,
    ];

    #[must_use]
    pub fn for_player(player: PlayerId) -> Corner {
        Self::SEATS[player.index() % Self::SEATS.len()]
    }

    fn player(self) -> PlayerId {
        let seat = Self::SEATS.iter().position(|c| *c == self).unwrap_or(0);
        PlayerId::new(seat as u8)
    }
}

/// What a key or button does for its seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Move,
    Fire,
}

/// Keyboard layout on a shared computer.
#[must_use]
pub fn key_binding(key: &str) -> Option<(PlayerId, Control)> {
    let binding = match key.to_ascii_lowercase().as_str() {
        "w" => (0, Control::Move),
        "e" => (0, Control::Fire),
        "t" => (1, Control::Move),
        "y" => (1, Control::Fire),
        "i" => (2, Control::Move),
        "o" => (2, Control::Fire),
        "up" | "arrowup" => (3, Control::Move),
        "shift" => (3, Control::Fire),
        _ => return None,
    };
    Some((PlayerId::new(binding.0), binding.1))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TankInput {
    Start,
    /// Start driving (move control pressed).
    Hold(PlayerId),
    /// Stop driving and resume spinning.
    Release(PlayerId),
    Fire(PlayerId),
}

impl std::fmt::Display for TankInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TankInput::Start => f.write_str("start"),
            TankInput::Hold(p) => write!(f, "hold {p}"),
            TankInput::Release(p) => write!(f, "release {p}"),
            TankInput::Fire(p) => write!(f, "fire {p}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tank {
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    /// Heading in degrees.
    pub rotation: f64,
    pub health: u32,
    pub holding: bool,
    /// Whether the tank actually moved on the last motion step.
    pub moving: bool,
}

impl Tank {
    fn rect(&self, size: f64) -> Rect {
        Rect::new(self.x, self.y, size, size)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub owner: PlayerId,
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub bounces: u32,
}

impl Bullet {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, BULLET_SIZE, BULLET_SIZE)
    }
}

#[derive(Clone, Debug)]
pub struct TankBattle {
    players: PlayerCount,
    device: DeviceType,
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    walls: Vec<Rect>,
    tank_size: f64,
    tanks: PlayerMap<Tank>,
    bullets: Vec<Bullet>,
    spin_clock: FixedStep,
    motion_clock: FixedStep,
}

impl TankBattle {
    pub fn new(session: &SessionConfig) -> Self {
        let players = session.players;
        Self {
            players,
            device: session.device,
            rng: session.rng().for_context("tank_battle"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(players),
            scores: Scoreboard::new(players),
            walls: Vec::new(),
            tank_size: tank_size_for(0),
            tanks: PlayerMap::new(players.get(), |p| spawn(p, players)),
            bullets: Vec::new(),
            spin_clock: FixedStep::new(SPIN_STEP),
            motion_clock: FixedStep::new(MOTION_STEP),
        }
    }

    #[must_use]
    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    #[must_use]
    pub fn tank_size(&self) -> f64 {
        self.tank_size
    }

    #[must_use]
    pub fn tank(&self, player: PlayerId) -> &Tank {
        &self.tanks[player]
    }

    #[must_use]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Input produced by pressing `key`, on a computer.
    #[must_use]
    pub fn key_down(&self, key: &str) -> Option<TankInput> {
        let (player, control) = self.keyboard(key)?;
        Some(match control {
            Control::Move => TankInput::Hold(player),
            Control::Fire => TankInput::Fire(player),
        })
    }

    /// Input produced by releasing `key`, on a computer.
    #[must_use]
    pub fn key_up(&self, key: &str) -> Option<TankInput> {
        match self.keyboard(key)? {
            (player, Control::Move) => Some(TankInput::Release(player)),
            (_, Control::Fire) => None,
        }
    }

    /// Inputs for one corner button gesture on a phone: pressing holds,
    /// lifting releases, and a completed tap also fires.
    #[must_use]
    pub fn corner_touch(&self, corner: Corner, pressed: bool) -> Vec<TankInput> {
        let player = corner.player();
        if self.device != DeviceType::Phone || player.index() >= self.players.get() {
            return Vec::new();
        }
        if pressed {
            vec![TankInput::Hold(player)]
        } else {
            vec![TankInput::Release(player), TankInput::Fire(player)]
        }
    }

    fn keyboard(&self, key: &str) -> Option<(PlayerId, Control)> {
        if self.device != DeviceType::Computer {
            return None;
        }
        key_binding(key).filter(|(player, _)| player.index() < self.players.get())
    }

    fn build_arena(&mut self) {
        let mut cells = Maze::carve_cells(ARENA_COLS, ARENA_ROWS, &mut self.rng);
        let mut walls = Vec::new();
        for y in 0..ARENA_ROWS as i32 {
            for x in 0..ARENA_COLS as i32 {
                let cell = Pos::new(x, y);
                for dir in [Direction::Right, Direction::Down] {
                    if !cell.step(dir).in_bounds(ARENA_COLS, ARENA_ROWS)
                        || cells.is_passage_open(cell, dir)
                    {
                        continue;
                    }
                    if self.rng.gen_bool(EXTRA_OPENING_CHANCE) {
                        cells.open_passage(cell, dir);
                        continue;
                    }
                    let (px, py) = (f64::from(x) * CELL_SIZE, f64::from(y) * CELL_SIZE);
                    walls.push(match dir {
                        Direction::Right => {
                            Rect::new(px + CELL_SIZE, py, WALL_THICKNESS, CELL_SIZE)
                        }
                        _ => Rect::new(px, py + CELL_SIZE, CELL_SIZE, WALL_THICKNESS),
                    });
                }
            }
        }
        walls.extend([
            Rect::new(0.0, 0.0, ARENA_WIDTH, WALL_THICKNESS),
            Rect::new(0.0, ARENA_HEIGHT - WALL_THICKNESS, ARENA_WIDTH, WALL_THICKNESS),
            Rect::new(0.0, 0.0, WALL_THICKNESS, ARENA_HEIGHT),
            Rect::new(ARENA_WIDTH - WALL_THICKNESS, 0.0, WALL_THICKNESS, ARENA_HEIGHT),
        ]);

        self.tank_size = tank_size_for(walls.len());
        let players = self.players;
        for (player, tank) in self.tanks.iter_mut() {
            *tank = spawn(player, players);
        }
        // Nobody starts wedged inside a wall.
        let size = self.tank_size;
        let spawns: Vec<Rect> = self.tanks.values().map(|t| t.rect(size)).collect();
        walls.retain(|wall| !spawns.iter().any(|s| s.overlaps(wall)));
        self.walls = walls;
        debug!(walls = self.walls.len(), tank_size = self.tank_size, "arena built");
    }

    fn start(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        self.build_arena();
        self.bullets.clear();
        self.scores.reset();
        self.turns.reset();
        self.spin_clock.reset();
        self.motion_clock.reset();
        Ok(())
    }

    fn require_alive(&self, player: PlayerId) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        if player.index() >= self.players.get() || !self.tanks[player].is_alive() {
            return Err(GameError::PlayerCannotAct(player));
        }
        Ok(())
    }

    fn fire(&mut self, player: PlayerId) {
        let tank = &self.tanks[player];
        let rad = tank.rotation.to_radians();
        let half = self.tank_size / 2.0;
        let (cx, cy) = (tank.x + half, tank.y + half);
        let reach = half + CANNON_LENGTH;
        self.bullets.push(Bullet {
            owner: player,
            x: cx + rad.cos() * reach - BULLET_SIZE / 2.0,
            y: cy + rad.sin() * reach - BULLET_SIZE / 2.0,
            rotation: tank.rotation,
            bounces: 0,
        });
    }

    fn spin(&mut self, steps: u32) {
        for (_, tank) in self.tanks.iter_mut() {
            if tank.is_alive() && !tank.holding {
                tank.rotation = (tank.rotation + SPIN_DEGREES * f64::from(steps)) % 360.0;
            }
        }
    }

    fn drive(&mut self) {
        let size = self.tank_size;
        for (_, tank) in self.tanks.iter_mut() {
            if !tank.is_alive() || !tank.holding {
                tank.moving = false;
                continue;
            }
            let rad = tank.rotation.to_radians();
            let next = Rect::new(
                tank.x + rad.cos() * TANK_SPEED,
                tank.y + rad.sin() * TANK_SPEED,
                size,
                size,
            );
            if self.walls.iter().any(|wall| next.overlaps(wall)) {
                tank.moving = false;
            } else {
                tank.x = next.x.clamp(0.0, ARENA_WIDTH - size);
                tank.y = next.y.clamp(0.0, ARENA_HEIGHT - size);
                tank.moving = true;
            }
        }
    }

    fn fly(&mut self) {
        let mut bullets = std::mem::take(&mut self.bullets);
        bullets.retain_mut(|bullet| {
            let rad = bullet.rotation.to_radians();
            bullet.x += rad.cos() * BULLET_SPEED;
            bullet.y += rad.sin() * BULLET_SPEED;

            if bullet.x < 0.0 || bullet.x > ARENA_WIDTH - BULLET_SIZE {
                bullet.rotation = 180.0 - bullet.rotation;
                bullet.bounces += 1;
            }
            if bullet.y < 0.0 || bullet.y > ARENA_HEIGHT - BULLET_SIZE {
                bullet.rotation = 360.0 - bullet.rotation;
                bullet.bounces += 1;
            }
            let rect = bullet.rect();
            if let Some(wall) = self.walls.iter().find(|wall| rect.overlaps(wall)) {
                bullet.rotation = if wall.is_horizontal() {
                    360.0 - bullet.rotation
                } else {
                    180.0 - bullet.rotation
                };
                bullet.bounces += 1;
            }
            if bullet.bounces >= MAX_BOUNCES {
                return false;
            }
            !self.hit_tank(bullet.owner, &rect)
        });
        self.bullets = bullets;
    }

    /// Apply a hit from a bullet at `rect` fired by `owner`. Returns true
    /// when the bullet struck a tank.
    fn hit_tank(&mut self, owner: PlayerId, rect: &Rect) -> bool {
        let size = self.tank_size;
        let Some(target) = self
            .tanks
            .iter()
            .find(|(p, t)| *p != owner && t.is_alive() && t.rect(size).overlaps(rect))
            .map(|(p, _)| p)
        else {
            return false;
        };

        let tank = &mut self.tanks[target];
        tank.health = tank.health.saturating_sub(HIT_DAMAGE);
        self.scores.add(owner, i64::from(HIT_DAMAGE));
        debug!(shooter = %owner, target = %target, health = tank.health, "tank hit");
        if tank.health == 0 {
            tank.holding = false;
            tank.moving = false;
            self.turns.eliminate(target);
            if self.turns.alive_count() <= 1 {
                self.phase.advance(PhaseEvent::GameOver);
                info!(winner = ?self.turns.sole_survivor(), "tank battle over");
            }
        }
        true
    }
}

fn spawn(player: PlayerId, players: PlayerCount) -> Tank {
    let slots = players.get() as f64 + 1.0;
    Tank {
        x: ARENA_WIDTH / slots * (player.index() as f64 + 1.0),
        y: ARENA_HEIGHT / 2.0,
        rotation: 0.0,
        health: MAX_HEALTH,
        holding: false,
        moving: false,
    }
}

impl MiniGame for TankBattle {
    type Input = TankInput;

    fn kind(&self) -> GameKind {
        GameKind::TankBattle
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

    fn legal_inputs(&self) -> Vec<TankInput> {
        match self.phase.phase() {
            Phase::Ready => vec![TankInput::Start],
            Phase::Playing => self
                .tanks
                .iter()
                .filter(|(_, tank)| tank.is_alive())
                .flat_map(|(player, tank)| {
                    let drive = if tank.holding {
                        TankInput::Release(player)
                    } else {
                        TankInput::Hold(player)
                    };
                    [drive, TankInput::Fire(player)]
                })
                .collect(),
            Phase::Result | Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: TankInput) -> Result<()> {
        match input {
            TankInput::Start => self.start(),
            TankInput::Hold(player) => {
                self.require_alive(player)?;
                self.tanks[player].holding = true;
                Ok(())
            }
            TankInput::Release(player) => {
                self.require_alive(player)?;
                self.tanks[player].holding = false;
                Ok(())
            }
            TankInput::Fire(player) => {
                self.require_alive(player)?;
                self.fire(player);
                Ok(())
            }
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase.phase() != Phase::Playing {
            return;
        }
        let spins = self.spin_clock.advance(dt);
        self.spin(spins);
        for _ in 0..self.motion_clock.advance(dt) {
            self.drive();
            self.fly();
            if self.phase.is_over() {
                break;
            }
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

    fn status(&self) -> String {
        let health: Vec<String> = self
            .tanks
            .iter()
            .map(|(p, t)| format!("{p}: {}", t.health))
            .collect();
        format!("Tank Battle | {} | {}", self.phase.phase(), health.join(", "))
    }
}
