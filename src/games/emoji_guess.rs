//! Emoji Guess: pick the meaning of an emoji from four options.
//!
//! Five questions per player. No emoji repeats until the whole pool has
//! been shown.

use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::core::{
    Delay, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, PlayerMap, Scoreboard,
    SessionConfig, TurnOrder,
};
use crate::error::{GameError, Result};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const QUESTIONS_PER_PLAYER: u32 = 5;
pub const REVEAL_TIME: Duration = Duration::from_millis(1_500);
pub const CORRECT_POINTS: i64 = 10;

/// One entry of the question pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmojiCard {
    pub emoji: &'static str,
    pub meaning: &'static str,
    pub options: [&'static str; 4],
}

const fn card(emoji: &'static str, meaning: &'static str, options: [&'static str; 4]) -> EmojiCard {
    EmojiCard {
        emoji,
        meaning,
        options,
    }
}

pub const POOL: [EmojiCard; 30] = [
    card("😀", "Smile", ["Smile", "Laughter", "Joy", "Happiness"]),
    card("😂", "Laughter", ["Crying", "Laughter", "Giggle Fit", "Cheer"]),
    card("😍", "In Love", ["Affection", "In Love", "Admiration", "Liking"]),
    card("😎", "Cool", ["Sunny", "Chilly", "Cool", "Relaxed"]),
    card("🤔", "Thoughtful", ["Suspicious", "Curious", "Thoughtful", "Worried"]),
    card("😭", "Sobbing", ["Sad", "Grief", "Sobbing", "Pain"]),
    card("😡", "Angry", ["Furious", "Angry", "Irritated", "Annoyed"]),
    card("🥰", "Loving", ["Passionate", "Loving", "Smitten", "Huggable"]),
    card("🤡", "Clown", ["Clown", "Funny", "Circus", "Fun"]),
    card("🥳", "Celebration", ["Party", "Celebration", "Fun", "Birthday"]),
    card("🤑", "Money Lover", ["Rich", "Money Lover", "Gambling", "Greedy"]),
    card("😴", "Sleepy", ["Tired", "Sleepy", "Sleeping", "Resting"]),
    card("🤯", "Mind Blown", ["Shock", "Mind Blown", "Confusion", "Reaction"]),
    card("👻", "Ghost", ["Fear", "Ghost", "Spirit", "Spooky"]),
    card("👽", "Alien", ["Space", "Alien", "Stranger", "UFO"]),
    card("🤖", "Robot", ["Machine", "Robot", "Technology", "Artificial Intelligence"]),
    card("👨‍💻", "Programmer", ["Computer", "Programmer", "Coder", "Tech Expert"]),
    card("🦸‍♂️", "Superhero", ["Hero", "Superhero", "Strong", "Rescuer"]),
    card("🧠", "Brain", ["Mind", "Brain", "Intelligence", "Thought"]),
    card("❤️", "Love", ["Affection", "Love", "Passion", "Romance"]),
    card("🔥", "Fire", ["Hot", "Fire", "Burning", "Popular"]),
    card("🎮", "Video Game", ["Game", "Video Game", "Fun", "Console"]),
    card("🍕", "Pizza", ["Italian Food", "Pizza", "Fast Food", "Snack"]),
    card("🏆", "Trophy", ["Victory", "Trophy", "Success", "Award"]),
    card("🎯", "Target", ["Aim", "Target", "Accuracy", "Goal"]),
    card("🎁", "Gift", ["Package", "Gift", "Surprise", "Celebration"]),
    card("🧩", "Puzzle Piece", ["Riddle", "Puzzle Piece", "Game", "Challenge"]),
    card("⏰", "Alarm Clock", ["Time", "Alarm Clock", "Alarm", "Stopwatch"]),
    card("🌈", "Rainbow", ["Colours", "Rainbow", "Weather", "Beauty"]),
    card("🚀", "Rocket", ["Launch", "Rocket", "Space", "Speed"]),
];

/// Question currently on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmojiQuestion {
    pub card: EmojiCard,
    /// The card's options in display order.
    pub options: [&'static str; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmojiInput {
    Start,
    Choose(&'static str),
    /// Leave the result screen.
    Continue,
}

impl std::fmt::Display for EmojiInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmojiInput::Start => f.write_str("start"),
            EmojiInput::Choose(option) => write!(f, "choose {option}"),
            EmojiInput::Continue => f.write_str("continue"),
        }
    }
}

/// Per-player answer statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnswerStats {
    pub correct: u32,
    pub total: u32,
}

impl AnswerStats {
    /// Rounded percentage of correct answers; 0 before any answer.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.correct) / f64::from(self.total) * 100.0).round() as u32
    }
}

#[derive(Clone, Debug)]
pub struct EmojiGuess {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    stats: PlayerMap<AnswerStats>,
    used: FxHashSet<&'static str>,
    question: Option<EmojiQuestion>,
    chosen: Option<&'static str>,
    reveal: Delay<()>,
}

impl EmojiGuess {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            rng: session.rng().for_context("emoji_guess"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(session.players).with_rounds_per_player(QUESTIONS_PER_PLAYER),
            scores: Scoreboard::new(session.players),
            stats: PlayerMap::with_default(session.players.get()),
            used: FxHashSet::default(),
            question: None,
            chosen: None,
            reveal: Delay::new(),
        }
    }

    #[must_use]
    pub fn question(&self) -> Option<&EmojiQuestion> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn stats(&self, player: PlayerId) -> AnswerStats {
        self.stats[player]
    }

    /// Whether the last choice was right.
    #[must_use]
    pub fn last_correct(&self) -> Option<bool> {
        let question = self.question.as_ref()?;
        self.chosen.map(|chosen| chosen == question.card.meaning)
    }

    fn draw_card(&mut self) -> EmojiCard {
        if self.used.len() >= POOL.len() {
            self.used.clear();
        }
        let available: Vec<EmojiCard> = POOL
            .iter()
            .filter(|card| !self.used.contains(card.emoji))
            .copied()
            .collect();
        let card = self.rng.choose(&available).copied().unwrap_or(POOL[0]);
        self.used.insert(card.emoji);
        card
    }

    fn ask(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        let card = self.draw_card();
        let mut options = card.options;
        self.rng.shuffle(&mut options);
        self.question = Some(EmojiQuestion { card, options });
        self.chosen = None;
        Ok(())
    }

    fn choose(&mut self, option: &'static str) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        if self.chosen.is_some() {
            return Err(GameError::illegal("an answer was already chosen"));
        }
        let question = self
            .question
            .as_ref()
            .ok_or_else(|| GameError::illegal("no emoji on screen"))?;
        if !question.options.contains(&option) {
            return Err(GameError::illegal(format!("'{option}' is not an option")));
        }

        let player = self.turns.active();
        let correct = option == question.card.meaning;
        let stats = &mut self.stats[player];
        stats.total += 1;
        if correct {
            stats.correct += 1;
            self.scores.add(player, CORRECT_POINTS);
        }
        debug!(player = %player, emoji = question.card.emoji, correct, "emoji answered");

        self.chosen = Some(option);
        self.reveal.schedule(REVEAL_TIME, ());
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

impl MiniGame for EmojiGuess {
    type Input = EmojiInput;

    fn kind(&self) -> GameKind {
        GameKind::EmojiGuess
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

    fn legal_inputs(&self) -> Vec<EmojiInput> {
        match self.phase.phase() {
            Phase::Ready => vec![EmojiInput::Start],
            Phase::Playing => match (&self.question, self.chosen) {
                (Some(question), None) => {
                    question.options.iter().copied().map(EmojiInput::Choose).collect()
                }
                _ => Vec::new(),
            },
            Phase::Result => vec![EmojiInput::Continue],
            Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: EmojiInput) -> Result<()> {
        match input {
            EmojiInput::Start => self.ask(),
            EmojiInput::Choose(option) => self.choose(option),
            EmojiInput::Continue => self.next(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.reveal.tick(dt).is_some() {
            self.phase.advance(PhaseEvent::Finish);
        }
    }

    fn outcome(&self) -> Option<GameResult> {
        self.phase.is_over().then(|| self.scores.result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(players: usize) -> EmojiGuess {
        EmojiGuess::new(&SessionConfig::new(players).unwrap().with_seed(8))
    }

    fn answer(game: &mut EmojiGuess, correct: bool) {
        game.handle(EmojiInput::Start).unwrap();
        let question = game.question().unwrap().clone();
        let pick = if correct {
            question.card.meaning
        } else {
            *question.options.iter().find(|o| **o != question.card.meaning).unwrap()
        };
        game.handle(EmojiInput::Choose(pick)).unwrap();
        game.tick(REVEAL_TIME);
        game.handle(EmojiInput::Continue).unwrap();
    }

    #[test]
    fn test_pool_is_well_formed() {
        for card in POOL {
            assert!(card.options.contains(&card.meaning), "{}", card.emoji);
        }
    }

    #[test]
    fn test_reveal_then_result() {
        let mut game = game(2);
        game.handle(EmojiInput::Start).unwrap();
        let meaning = game.question().unwrap().card.meaning;
        game.handle(EmojiInput::Choose(meaning)).unwrap();

        assert!(game.legal_inputs().is_empty());
        assert!(game.handle(EmojiInput::Choose(meaning)).is_err());
        game.tick(Duration::from_millis(1_000));
        assert_eq!(game.phase(), Phase::Playing);
        game.tick(Duration::from_millis(500));
        assert_eq!(game.phase(), Phase::Result);
        assert_eq!(game.last_correct(), Some(true));
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 10);
    }

    #[test]
    fn test_no_repeats_within_pool() {
        let mut game = game(2);
        let mut seen = FxHashSet::default();
        for _ in 0..10 {
            game.handle(EmojiInput::Start).unwrap();
            let emoji = game.question().unwrap().card.emoji;
            assert!(seen.insert(emoji), "{emoji} repeated");
            let meaning = game.question().unwrap().card.meaning;
            game.handle(EmojiInput::Choose(meaning)).unwrap();
            game.tick(REVEAL_TIME);
            game.handle(EmojiInput::Continue).unwrap();
        }
        assert!(game.is_over());
    }

    #[test]
    fn test_accuracy_and_end() {
        let mut game = game(2);
        for i in 0..10 {
            answer(&mut game, i % 4 != 0);
        }
        assert!(game.is_over());

        let p0 = game.stats(PlayerId::new(0));
        assert_eq!(p0, AnswerStats { correct: 2, total: 5 });
        assert_eq!(p0.accuracy(), 40);
        assert_eq!(game.stats(PlayerId::new(1)).accuracy(), 100);
        assert_eq!(game.outcome(), Some(GameResult::Winner(PlayerId::new(1))));
    }
}
