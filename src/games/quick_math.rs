//! Quick Math Duel: answer arithmetic questions against the clock.
//!
//! Each player gets three questions, taking turns. Questions get harder as
//! the game progresses; the last third of the game adds multi-step
//! questions. Scores never drop below zero.

use std::time::Duration;

use smallvec::SmallVec;
use tracing::debug;

use crate::core::{
    Countdown, Delay, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, Scoreboard,
    SessionConfig, TimerStatus, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const ROUNDS_PER_PLAYER: u32 = 3;
pub const TIME_LIMIT: Duration = Duration::from_secs(5);
pub const RESULT_TIME: Duration = Duration::from_secs(2);
pub const CORRECT_POINTS: i64 = 10;
pub const WRONG_PENALTY: i64 = -5;

/// A multiple-choice arithmetic question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub answer: i64,
    /// Four distinct positive options, one of them `answer`.
    pub options: SmallVec<[i64; 4]>,
}

impl Question {
    /// Generate a question for difficulty 1, 2 or 3.
    pub fn generate(difficulty: u8, rng: &mut GameRng) -> Self {
        let max: i64 = match difficulty {
            1 => 20,
            2 => 50,
            _ => 100,
        };
        let operations = if difficulty > 1 { 4 } else { 3 };

        let (text, answer) = match rng.gen_range(0..operations) {
            0 => {
                let a = rng.gen_range_i64(0..max) + 1;
                let b = rng.gen_range_i64(0..max) + 1;
                (format!("{a} + {b} = ?"), a + b)
            }
            1 => {
                let a = rng.gen_range_i64(0..max) + 30;
                let b = rng.gen_range_i64(0..a - 1) + 1;
                (format!("{a} - {b} = ?"), a - b)
            }
            2 => {
                let (a, b) = match difficulty {
                    1 => (rng.gen_range_i64(0..10) + 1, rng.gen_range_i64(0..10) + 1),
                    2 => (rng.gen_range_i64(0..15) + 5, rng.gen_range_i64(0..10) + 1),
                    _ => (rng.gen_range_i64(0..20) + 10, rng.gen_range_i64(0..15) + 5),
                };
                (format!("{a} × {b} = ?"), a * b)
            }
            _ => match rng.gen_range(0..3) {
                0 => {
                    let a = rng.gen_range_i64(0..90) + 10;
                    let b = rng.gen_range_i64(0..90) + 10;
                    (format!("{a} × {b} = ?"), a * b)
                }
                1 => {
                    let a = rng.gen_range_i64(0..20) + 5;
                    (format!("{a}² = ?"), a * a)
                }
                _ => {
                    let [a, b, c, d] = [(); 4].map(|_| rng.gen_range_i64(0..10) + 5);
                    (format!("({a} + {b}) × ({c} + {d}) = ?"), (a + b) * (c + d))
                }
            },
        };

        let mut options: SmallVec<[i64; 4]> = SmallVec::new();
        options.push(answer);
        let max_offset = (answer / 5).max(5);
        while options.len() < 4 {
            let offset = rng.gen_range_i64(0..max_offset) + 1;
            let wrong = if rng.gen_bool(0.5) { answer + offset } else { answer - offset };
            if wrong > 0 && !options.contains(&wrong) {
                options.push(wrong);
            }
        }
        rng.shuffle(&mut options);

        Self { text, answer, options }
    }
}

/// Difficulty for the 0-based `round` of a game with `total` rounds.
#[must_use]
pub fn difficulty_for(round: u32, total: u32) -> u8 {
    if round * 3 > total * 2 {
        3
    } else if round * 3 > total {
        2
    } else {
        1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathInput {
    /// Show the active player their question.
    Start,
    /// Pick one of the four options.
    Answer(i64),
}

impl std::fmt::Display for MathInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathInput::Start => f.write_str("start"),
            MathInput::Answer(n) => write!(f, "answer {n}"),
        }
    }
}

/// How the last question went.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
    TimedOut,
}

#[derive(Clone, Debug)]
pub struct QuickMath {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    question: Option<Question>,
    difficulty: u8,
    clock: Countdown,
    last_outcome: Option<AnswerOutcome>,
    next_round: Delay<()>,
}

impl QuickMath {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("quick_math"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(ROUNDS_PER_PLAYER),
            scores: Scoreboard::new(session.players),
            question: None,
            difficulty: 1,
            clock: Countdown::idle(),
            last_outcome: None,
            next_round: Delay::new(),
        }
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    #[must_use]
    pub fn seconds_left(&self) -> u64 {
        self.clock.whole_seconds_left()
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<AnswerOutcome> {
        self.last_outcome
    }

    fn ask(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        let total = self.turns.round_limit().unwrap_or(1);
        self.difficulty = difficulty_for(self.turns.rounds_played(), total);
        self.question = Some(Question::generate(self.difficulty, &mut self.rng));
        self.clock.start(TIME_LIMIT);
        Ok(())
    }

    fn settle(&mut self, outcome: AnswerOutcome) {
        let player = self.turns.active();
        let delta = if outcome == AnswerOutcome::Correct {
            CORRECT_POINTS
        } else {
            WRONG_PENALTY
        };
        let score = self.scores.add_floored(player, delta);
        debug!(player = %player, ?outcome, score, "math question settled");

        self.clock.cancel();
        self.last_outcome = Some(outcome);
        self.phase.advance(PhaseEvent::Finish);
        self.next_round.schedule(RESULT_TIME, ());
    }

    fn next_turn(&mut self) {
        if self.turns.complete_round() {
            self.phase.advance(PhaseEvent::GameOver);
        } else {
            self.turns.advance();
            self.phase.advance(PhaseEvent::Next);
        }
    }
}

impl MiniGame for QuickMath {
    type Input = MathInput;

    fn kind(&self) -> GameKind {
        GameKind::QuickMath
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

    fn legal_inputs(&self) -> Vec<MathInput> {
        match (self.phase.phase(), &self.question) {
            (Phase::Ready, _) => vec![MathInput::Start],
            (Phase::Playing, Some(question)) => {
                question.options.iter().copied().map(MathInput::Answer).collect()
            }
            _ => Vec::new(),
        }
    }

    fn handle(&mut self, input: MathInput) -> Result<()> {
        match input {
            MathInput::Start => self.ask(),
            MathInput::Answer(value) => {
                self.phase.require(Phase::Playing)?;
                let question = self
                    .question
                    .as_ref()
                    .ok_or_else(|| GameError::illegal("no question on screen"))?;
                if !question.options.contains(&value) {
                    return Err(GameError::illegal(format!("{value} is not one of the options")));
                }
                let outcome = if value == question.answer {
                    AnswerOutcome::Correct
                } else {
                    AnswerOutcome::Wrong
                };
                self.settle(outcome);
                Ok(())
            }
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.next_round.tick(dt).is_some() {
            self.next_turn();
        }
        if self.clock.tick(dt) == TimerStatus::Expired && self.phase.phase() == Phase::Playing {
            self.settle(AnswerOutcome::TimedOut);
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }

    fn status(&self) -> String {
        let question = self.question.as_ref().map_or("", |q| q.text.as_str());
        format!(
            "Quick Math | {} | {} | round {}/{} | {} | {}s",
            self.phase.phase(),
            self.turns.active(),
            self.turns.current_round(),
            self.turns.round_limit().unwrap_or(0),
            question,
            self.clock.whole_seconds_left()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(players: usize) -> QuickMath {
        QuickMath::new(&SessionConfig::new(players).unwrap().with_seed(21))
    }

    fn wrong_option(game: &QuickMath) -> i64 {
        let q = game.question().unwrap();
        *q.options.iter().find(|o| **o != q.answer).unwrap()
    }

    #[test]
    fn test_options_are_distinct_and_positive() {
        let mut rng = GameRng::new(4);
        for difficulty in 1..=3 {
            for _ in 0..200 {
                let q = Question::generate(difficulty, &mut rng);
                assert_eq!(q.options.len(), 4);
                assert!(q.options.contains(&q.answer));
                assert!(q.options.iter().all(|o| *o > 0));
                for (i, a) in q.options.iter().enumerate() {
                    assert!(!q.options[i + 1..].contains(a));
                }
            }
        }
    }

    #[test]
    fn test_difficulty_schedule() {
        let levels: Vec<u8> = (0..6).map(|r| difficulty_for(r, 6)).collect();
        assert_eq!(levels, vec![1, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_correct_then_wrong_then_floor() {
        let mut game = game(2);
        let p0 = PlayerId::new(0);

        game.handle(MathInput::Start).unwrap();
        let answer = game.question().unwrap().answer;
        game.handle(MathInput::Answer(answer)).unwrap();
        assert_eq!(game.scoreboard().score(p0), 10);
        assert_eq!(game.phase(), Phase::Result);

        game.tick(RESULT_TIME);
        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.active_player(), PlayerId::new(1));

        game.handle(MathInput::Start).unwrap();
        let wrong = wrong_option(&game);
        game.handle(MathInput::Answer(wrong)).unwrap();
        assert_eq!(game.scoreboard().score(PlayerId::new(1)), 0);
        assert_eq!(game.last_outcome(), Some(AnswerOutcome::Wrong));
    }

    #[test]
    fn test_timeout_penalises() {
        let mut game = game(2);
        game.handle(MathInput::Start).unwrap();
        game.tick(Duration::from_millis(4_500));
        assert_eq!(game.seconds_left(), 1);
        game.tick(Duration::from_millis(500));
        assert_eq!(game.last_outcome(), Some(AnswerOutcome::TimedOut));
        assert_eq!(game.phase(), Phase::Result);
        assert!(game.handle(MathInput::Answer(1)).is_err());
    }

    #[test]
    fn test_answer_must_be_an_option() {
        let mut game = game(2);
        game.handle(MathInput::Start).unwrap();
        let impossible = game.question().unwrap().options.iter().max().unwrap() + 1_000;
        assert!(game.handle(MathInput::Answer(impossible)).is_err());
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_game_ends_after_three_rounds_each() {
        let mut game = game(3);
        for _ in 0..9 {
            game.handle(MathInput::Start).unwrap();
            let answer = game.question().unwrap().answer;
            game.handle(MathInput::Answer(answer)).unwrap();
            game.tick(RESULT_TIME);
        }
        assert!(game.is_over());
        assert_eq!(game.difficulty(), 3);
        assert_eq!(
            game.outcome(),
            Some(GameResult::Winners(vec![
                PlayerId::new(0),
                PlayerId::new(1),
                PlayerId::new(2)
            ]))
        );
    }
}
