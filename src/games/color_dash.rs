//! Color Dash: a colour name is shown, pick the matching swatch.

use std::time::Duration;

use tracing::debug;

use crate::core::{
    Delay, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, Scoreboard,
    SessionConfig, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const ROUNDS_PER_PLAYER: u32 = 3;
pub const RESULT_TIME: Duration = Duration::from_secs(2);
pub const CORRECT_POINTS: i64 = 10;
pub const WRONG_PENALTY: i64 = -5;

/// The six swatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Swatch {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Swatch {
    pub const ALL: [Swatch; 6] = [
        Swatch::Red,
        Swatch::Blue,
        Swatch::Green,
        Swatch::Yellow,
        Swatch::Purple,
        Swatch::Orange,
    ];

    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Swatch::Red => "#e74c3c",
            Swatch::Blue => "#3498db",
            Swatch::Green => "#2ecc71",
            Swatch::Yellow => "#f1c40f",
            Swatch::Purple => "#9b59b6",
            Swatch::Orange => "#e67e22",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Swatch::Red => "red",
            Swatch::Blue => "blue",
            Swatch::Green => "green",
            Swatch::Yellow => "yellow",
            Swatch::Purple => "purple",
            Swatch::Orange => "orange",
        }
    }
}

impl std::fmt::Display for Swatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorInput {
    Start,
    Pick(Swatch),
}

impl std::fmt::Display for ColorInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorInput::Start => f.write_str("start"),
            ColorInput::Pick(swatch) => write!(f, "pick {swatch}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColorDash {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    target: Option<Swatch>,
    options: Vec<Swatch>,
    last_correct: Option<bool>,
    next_round: Delay<()>,
}

impl ColorDash {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("color_dash"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(ROUNDS_PER_PLAYER),
            scores: Scoreboard::new(session.players),
            target: None,
            options: Vec::new(),
            last_correct: None,
            next_round: Delay::new(),
        }
    }

    /// Colour the active player has to find.
    #[must_use]
    pub fn target(&self) -> Option<Swatch> {
        self.target
    }

    /// Swatches on screen, in display order.
    #[must_use]
    pub fn options(&self) -> &[Swatch] {
        &self.options
    }

    /// Whether the last pick was right.
    #[must_use]
    pub fn last_correct(&self) -> Option<bool> {
        self.last_correct
    }

    fn start_round(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        self.target = self.rng.choose(&Swatch::ALL).copied();
        self.options = Swatch::ALL.to_vec();
        self.rng.shuffle(&mut self.options);
        self.last_correct = None;
        Ok(())
    }

    fn pick(&mut self, swatch: Swatch) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let target = self
            .target
            .ok_or_else(|| GameError::illegal("no colour on screen"))?;
        let player = self.turns.active();
        let correct = swatch == target;
        let delta = if correct { CORRECT_POINTS } else { WRONG_PENALTY };
        let score = self.scores.add(player, delta);
        debug!(player = %player, %target, picked = %swatch, score, "colour picked");

        self.last_correct = Some(correct);
        self.phase.apply(PhaseEvent::Finish)?;
        self.next_round.schedule(RESULT_TIME, ());
        Ok(())
    }
}

impl MiniGame for ColorDash {
    type Input = ColorInput;

    fn kind(&self) -> GameKind {
        GameKind::ColorDash
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

    fn legal_inputs(&self) -> Vec<ColorInput> {
        match self.phase.phase() {
            Phase::Ready => vec![ColorInput::Start],
            Phase::Playing => self.options.iter().copied().map(ColorInput::Pick).collect(),
            Phase::Result | Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: ColorInput) -> Result<()> {
        match input {
            ColorInput::Start => self.start_round(),
            ColorInput::Pick(swatch) => self.pick(swatch),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.next_round.tick(dt).is_none() {
            return;
        }
        if self.turns.complete_round() {
            self.phase.advance(PhaseEvent::GameOver);
        } else {
            self.turns.advance();
            self.phase.advance(PhaseEvent::Next);
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }
}
