//! Word Chain: each word must start with the last letter of the previous one.
//!
//! Players type words in turn against a countdown. Running out of time
//! knocks a player out; the last one standing wins, or the best score once
//! the round cap is reached. Every three rounds a fresh set of special
//! letters is drawn: bonus letters pay 50% more, challenge letters cut five
//! seconds off the clock.

use std::time::Duration;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::core::{
    Countdown, GameResult, GameRng, Phase, PhaseEvent, PhaseMachine, PlayerId, PlayerMap,
    Scoreboard, SessionConfig, TimerStatus, TurnOrder,
};
use crate::error::{Result, WordRejection};
use crate::games::GameKind;
use crate::rules::MiniGame;

pub const ROUNDS_PER_PLAYER: u32 = 3;
pub const MIN_WORD_LEN: usize = 3;
pub const MAX_HINTS: usize = 5;
pub const SPECIAL_LETTERS: usize = 3;
/// Seconds taken off the clock on a challenge letter.
pub const CHALLENGE_PENALTY_SECS: u64 = 5;
/// Special letters are redrawn after every this many rounds.
pub const SPECIAL_REFRESH_ROUNDS: u32 = 3;

const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const WORDS_BY_LETTER: &[(char, &[&str])] = &[
    ('a', &["apple", "anchor", "arrow", "artist", "autumn", "almond"]),
    ('b', &["banana", "basket", "bridge", "button", "butter", "blanket"]),
    ('c', &["candle", "carpet", "castle", "cherry", "circle", "cookie"]),
    ('d', &["dragon", "desert", "doctor", "donkey", "dinner", "diamond"]),
    ('e', &["eagle", "engine", "elephant", "evening", "emerald", "envelope"]),
    ('f', &["forest", "feather", "finger", "flower", "fridge", "falcon"]),
    ('g', &["guitar", "giraffe", "glove", "golden", "grape", "ground"]),
    ('h', &["hammer", "harbor", "helmet", "honey", "horse", "hunter"]),
    ('i', &["igloo", "insect", "iron", "ivory", "island", "invite"]),
    ('j', &["jacket", "jelly", "jungle", "jewel", "journey", "juice"]),
    ('k', &["kettle", "kitten", "kingdom", "kitchen", "knight", "koala"]),
    ('l', &["ladder", "lemon", "letter", "lizard", "lantern", "lobster"]),
    ('m', &["magnet", "market", "meadow", "mirror", "monkey", "muffin"]),
    ('n', &["needle", "napkin", "number", "noodle", "nephew", "nature"]),
    ('o', &["ocean", "orange", "oyster", "owl", "onion", "orbit"]),
    ('p', &["pepper", "pillow", "pencil", "planet", "puzzle", "parrot"]),
    ('q', &["queen", "quilt", "quiver", "quartz", "quest", "quiet"]),
    ('r', &["rabbit", "rocket", "river", "ribbon", "robot", "rainbow"]),
    ('s', &["salmon", "saddle", "shadow", "silver", "spider", "sunset"]),
    ('t', &["tiger", "table", "tomato", "tunnel", "turtle", "thunder"]),
    ('u', &["umbrella", "uncle", "unicorn", "uniform", "until", "upper"]),
    ('v', &["valley", "velvet", "violin", "village", "volcano", "voyage"]),
    ('w', &["window", "wallet", "winter", "wizard", "walnut", "whistle"]),
    ('x', &["xylophone", "xenon", "xerox"]),
    ('y', &["yellow", "yogurt", "yacht", "yard", "young", "yarn"]),
    ('z', &["zebra", "zipper", "zero", "zigzag", "zombie", "zone"]),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Seconds on the clock for each word.
    #[must_use]
    pub const fn time_limit_secs(self) -> u64 {
        match self {
            Difficulty::Easy => 25,
            Difficulty::Medium => 20,
            Difficulty::Hard => 15,
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Word pool the hints are drawn from, on top of the general list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    General,
    Science,
    History,
    Geography,
    Literature,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Science,
        Category::History,
        Category::Geography,
        Category::Literature,
    ];

    /// Extra hint words; the general category has none.
    #[must_use]
    pub const fn words(self) -> &'static [&'static str] {
        match self {
            Category::General => &[],
            Category::Science => &[
                "atom", "bacteria", "cell", "circuit", "element", "energy", "gene", "gravity",
                "isotope", "laboratory", "magnet", "neuron", "orbit", "physics", "proton",
                "radiation", "telescope", "velocity", "virus", "enzyme",
            ],
            Category::History => &[
                "alliance", "battle", "castle", "charter", "dynasty", "empire", "era", "kingdom",
                "legion", "monarch", "pharaoh", "reform", "republic", "revolution", "senate",
                "treaty", "tribe", "viking", "war", "archive",
            ],
            Category::Geography => &[
                "canyon", "climate", "delta", "desert", "equator", "fjord", "glacier", "island",
                "latitude", "meridian", "ocean", "plateau", "river", "savanna", "strait",
                "tundra", "valley", "volcano", "harbor", "estuary",
            ],
            Category::Literature => &[
                "author", "ballad", "chapter", "drama", "epic", "fable", "hero", "idiom",
                "legend", "lyric", "metaphor", "novel", "ode", "plot", "poem", "rhyme", "sonnet",
                "theme", "tragedy", "verse",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::General => "general",
            Category::Science => "science",
            Category::History => "history",
            Category::Geography => "geography",
            Category::Literature => "literature",
        };
        f.write_str(name)
    }
}

/// Points for a word of `len` letters.
///
/// `seconds_left` earns one point per started five seconds. A streak of two
/// or more earlier words adds the streak length on top.
#[must_use]
pub fn word_points(
    len: usize,
    seconds_left: u64,
    difficulty: Difficulty,
    bonus_letter: bool,
    previous_streak: u32,
) -> i64 {
    let mut total = (len as f64 + seconds_left.div_ceil(5) as f64) * difficulty.multiplier();
    if bonus_letter {
        total *= 1.5;
    }
    let streak = if previous_streak >= 2 { previous_streak } else { 0 };
    (total + f64::from(streak)).floor() as i64
}

/// General hint words starting with `letter`.
#[must_use]
pub fn words_for_letter(letter: char) -> &'static [&'static str] {
    WORDS_BY_LETTER
        .iter()
        .find(|(l, _)| *l == letter)
        .map_or(&[] as &[&str], |&(_, words)| words)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub player: PlayerId,
    pub word: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainStats {
    pub words: Vec<String>,
    pub streak: u32,
    pub max_streak: u32,
    pub letters: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordInput {
    SetDifficulty(Difficulty),
    SetCategory(Category),
    Start,
    Submit(String),
    ToggleHints,
}

impl std::fmt::Display for WordInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordInput::SetDifficulty(d) => write!(f, "difficulty {d}"),
            WordInput::SetCategory(c) => write!(f, "category {c}"),
            WordInput::Start => f.write_str("start"),
            WordInput::Submit(word) => write!(f, "word {word}"),
            WordInput::ToggleHints => f.write_str("hints"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WordChain {
    rng: GameRng,
    phase: PhaseMachine,
    turns: TurnOrder,
    scores: Scoreboard,
    stats: PlayerMap<ChainStats>,
    difficulty: Difficulty,
    category: Category,
    chain: Vec<ChainLink>,
    used: FxHashSet<String>,
    letter: char,
    bonus_letters: SmallVec<[char; SPECIAL_LETTERS]>,
    challenge_letters: SmallVec<[char; SPECIAL_LETTERS]>,
    hints: Vec<&'static str>,
    show_hints: bool,
    clock: Countdown,
}

impl WordChain {
    pub fn new(session: &SessionConfig) -> Self {
        let players = session.players;
        Self {
            rng: session.rng().for_context("word_chain"),
            phase: PhaseMachine::new(),
            turns: TurnOrder::new(players).with_rounds_per_player(ROUNDS_PER_PLAYER),
            scores: Scoreboard::new(players),
            stats: PlayerMap::with_default(players.get()),
            difficulty: Difficulty::default(),
            category: Category::default(),
            chain: Vec::new(),
            used: FxHashSet::default(),
            letter: 'a',
            bonus_letters: SmallVec::new(),
            challenge_letters: SmallVec::new(),
            hints: Vec::new(),
            show_hints: false,
            clock: Countdown::idle(),
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Letter the next word must start with.
    #[must_use]
    pub fn letter(&self) -> char {
        self.letter
    }

    #[must_use]
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    #[must_use]
    pub fn stats(&self, player: PlayerId) -> &ChainStats {
        &self.stats[player]
    }

    #[must_use]
    pub fn bonus_letters(&self) -> &[char] {
        &self.bonus_letters
    }

    #[must_use]
    pub fn challenge_letters(&self) -> &[char] {
        &self.challenge_letters
    }

    #[must_use]
    pub fn hints(&self) -> &[&'static str] {
        &self.hints
    }

    #[must_use]
    pub fn hints_visible(&self) -> bool {
        self.show_hints
    }

    #[must_use]
    pub fn seconds_left(&self) -> u64 {
        self.clock.whole_seconds_left()
    }

    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        !self.turns.is_eliminated(player)
    }

    fn random_letter(&mut self) -> char {
        self.rng.choose(ALPHABET).copied().unwrap_or('a')
    }

    fn draw_special_letters(&mut self) {
        let bonus: SmallVec<[char; SPECIAL_LETTERS]> =
            (0..SPECIAL_LETTERS).map(|_| self.random_letter()).collect();
        self.bonus_letters = bonus;
        self.challenge_letters.clear();
        while self.challenge_letters.len() < SPECIAL_LETTERS {
            let letter = self.random_letter();
            if !self.bonus_letters.contains(&letter) {
                self.challenge_letters.push(letter);
            }
        }
        debug!(bonus = ?self.bonus_letters, challenge = ?self.challenge_letters, "special letters drawn");
    }

    fn draw_hints(&mut self) {
        let letter = self.letter;
        let mut hints: Vec<&'static str> = Vec::new();
        let candidates = words_for_letter(letter)
            .iter()
            .chain(self.category.words().iter().filter(|w| w.starts_with(letter)));
        for word in candidates {
            if !self.used.contains(*word) && !hints.contains(word) {
                hints.push(*word);
            }
        }
        if hints.len() > MAX_HINTS {
            self.rng.shuffle(&mut hints);
            hints.truncate(MAX_HINTS);
        }
        self.hints = hints;
    }

    fn time_for_letter(&self) -> Duration {
        let mut secs = self.difficulty.time_limit_secs();
        if self.challenge_letters.contains(&self.letter) {
            secs -= CHALLENGE_PENALTY_SECS;
        }
        Duration::from_secs(secs)
    }

    fn begin_turn(&mut self) {
        self.draw_hints();
        self.clock.start(self.time_for_letter());
    }

    fn start(&mut self) -> Result<()> {
        self.phase.apply(PhaseEvent::Start)?;
        self.letter = self.random_letter();
        self.draw_special_letters();
        self.begin_turn();
        info!(letter = %self.letter, difficulty = %self.difficulty, category = %self.category, "word chain started");
        Ok(())
    }

    fn check(&self, word: &str) -> std::result::Result<(), WordRejection> {
        let first = word.chars().next().ok_or(WordRejection::Empty)?;
        if first != self.letter {
            return Err(WordRejection::WrongStartingLetter {
                expected: self.letter,
            });
        }
        if self.used.contains(word) {
            return Err(WordRejection::AlreadyUsed(word.to_string()));
        }
        if word.chars().count() < MIN_WORD_LEN {
            return Err(WordRejection::TooShort { min: MIN_WORD_LEN });
        }
        Ok(())
    }

    fn submit(&mut self, raw: &str) -> Result<()> {
        self.phase.require(Phase::Playing)?;
        let word = raw.trim().to_lowercase();
        self.check(&word)?;

        let player = self.turns.active();
        let len = word.chars().count();
        let bonus = self.bonus_letters.contains(&self.letter);
        let stats = &mut self.stats[player];
        let points = word_points(
            len,
            self.clock.whole_seconds_left(),
            self.difficulty,
            bonus,
            stats.streak,
        );
        stats.streak += 1;
        stats.max_streak = stats.max_streak.max(stats.streak);
        stats.letters += len;
        stats.words.push(word.clone());
        let score = self.scores.add(player, points);
        debug!(player = %player, word = %word, points, score, "word accepted");

        if let Some(last) = word.chars().last() {
            self.letter = last;
        }
        self.used.insert(word.clone());
        self.chain.push(ChainLink { player, word });
        self.next_turn();
        Ok(())
    }

    fn time_out(&mut self) {
        let player = self.turns.active();
        self.turns.eliminate(player);
        info!(player = %player, letter = %self.letter, "ran out of time");
        self.next_turn();
    }

    fn next_turn(&mut self) {
        let round = self.turns.current_round();
        let capped = self.turns.complete_round();
        if self.turns.alive_count() <= 1 || capped {
            self.clock.cancel();
            self.phase.advance(PhaseEvent::GameOver);
            return;
        }
        if round % SPECIAL_REFRESH_ROUNDS == 0 {
            self.draw_special_letters();
        }
        self.turns.advance();
        self.begin_turn();
    }

    fn configure(&mut self, input: &WordInput) -> Result<()> {
        self.phase.require(Phase::Ready)?;
        match input {
            WordInput::SetDifficulty(d) => self.difficulty = *d,
            WordInput::SetCategory(c) => self.category = *c,
            _ => {}
        }
        Ok(())
    }
}

impl MiniGame for WordChain {
    type Input = WordInput;

    fn kind(&self) -> GameKind {
        GameKind::WordChain
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

    fn legal_inputs(&self) -> Vec<WordInput> {
        match self.phase.phase() {
            Phase::Ready => Difficulty::ALL
                .into_iter()
                .filter(|d| *d != self.difficulty)
                .map(WordInput::SetDifficulty)
                .chain(
                    Category::ALL
                        .into_iter()
                        .filter(|c| *c != self.category)
                        .map(WordInput::SetCategory),
                )
                .chain(std::iter::once(WordInput::Start))
                .collect(),
            Phase::Playing => self
                .hints
                .iter()
                .map(|w| WordInput::Submit((*w).to_string()))
                .chain(std::iter::once(WordInput::ToggleHints))
                .collect(),
            Phase::Result | Phase::End => Vec::new(),
        }
    }

    fn handle(&mut self, input: WordInput) -> Result<()> {
        match input {
            WordInput::SetDifficulty(_) | WordInput::SetCategory(_) => self.configure(&input),
            WordInput::Start => self.start(),
            WordInput::Submit(word) => self.submit(&word),
            WordInput::ToggleHints => {
                self.phase.require(Phase::Playing)?;
                self.show_hints = !self.show_hints;
                Ok(())
            }
        }
    }

    fn tick(&mut self, dt: Duration) {
        if self.phase.phase() == Phase::Playing && self.clock.tick(dt) == TimerStatus::Expired {
            self.time_out();
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
        format!(
            "Word Chain | {}'s word must start with '{}' | {}s left",
            self.turns.active(),
            self.letter,
            self.seconds_left()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    /// Started game with a known letter and no special letters.
    fn started(players: usize) -> WordChain {
        let mut game = WordChain::new(&SessionConfig::new(players).unwrap().with_seed(12));
        game.handle(WordInput::Start).unwrap();
        game.letter = 'a';
        game.bonus_letters.clear();
        game.challenge_letters.clear();
        game
    }

    fn say(game: &mut WordChain, word: &str) -> Result<()> {
        game.handle(WordInput::Submit(word.to_string()))
    }

    /// Submit `words` in order, keeping special letters out of the scoring.
    fn play_chain(game: &mut WordChain, words: &[&str]) {
        for word in words {
            say(game, word).unwrap();
            game.bonus_letters.clear();
            game.challenge_letters.clear();
            game.clock.start(game.time_for_letter());
        }
    }

    #[test]
    fn test_word_points() {
        assert_eq!(word_points(5, 20, Difficulty::Medium, false, 0), 13);
        assert_eq!(word_points(5, 20, Difficulty::Medium, true, 0), 20);
        assert_eq!(word_points(5, 20, Difficulty::Medium, false, 2), 15);
        assert_eq!(word_points(3, 1, Difficulty::Easy, false, 1), 4);
        assert_eq!(word_points(4, 11, Difficulty::Hard, false, 0), 14);
    }

    #[test]
    fn test_rejections_in_order() {
        let mut game = started(2);
        let reject = |game: &mut WordChain, word: &str| match say(game, word) {
            Err(GameError::Word(reason)) => reason,
            other => panic!("expected a rejection, got {other:?}"),
        };

        assert_eq!(reject(&mut game, "   "), WordRejection::Empty);
        assert_eq!(
            reject(&mut game, "bat"),
            WordRejection::WrongStartingLetter { expected: 'a' }
        );
        assert_eq!(reject(&mut game, "an"), WordRejection::TooShort { min: 3 });

        say(&mut game, "Apple").unwrap();
        say(&mut game, "eagle").unwrap();
        assert_eq!(
            reject(&mut game, "eagle"),
            WordRejection::AlreadyUsed("eagle".into())
        );
        assert_eq!(game.active_player(), PlayerId::new(0));
        assert_eq!(game.chain().len(), 2);
    }

    #[test]
    fn test_chain_moves_letter_and_scores() {
        let mut game = started(2);
        say(&mut game, "apple").unwrap();
        assert_eq!(game.letter(), 'e');
        assert_eq!(game.active_player(), PlayerId::new(1));
        assert_eq!(game.scoreboard().score(PlayerId::new(0)), 13);
        assert_eq!(game.stats(PlayerId::new(0)).words, vec!["apple".to_string()]);
        assert!(game.hints().iter().all(|w| w.starts_with('e')));
    }

    #[test]
    fn test_streak_bonus_after_two_words() {
        let mut game = started(2);
        play_chain(&mut game, &["apple", "eagle", "engine", "elephant", "tiger"]);
        // Seat 1's third word has a streak of two behind it.
        let p0 = PlayerId::new(0);
        assert_eq!(game.stats(p0).streak, 3);
        assert_eq!(game.stats(p0).max_streak, 3);
        assert_eq!(game.scoreboard().score(p0), 13 + 15 + 15);
    }

    #[test]
    fn test_round_cap_ends_game() {
        let mut game = started(2);
        play_chain(
            &mut game,
            &["apple", "eagle", "engine", "elephant", "tiger", "rabbit"],
        );
        assert!(game.is_over());
        assert_eq!(game.scoreboard().score(PlayerId::new(1)), 13 + 18 + 17);
        assert_eq!(game.outcome(), Some(GameResult::Winner(PlayerId::new(1))));
    }

    #[test]
    fn test_challenge_letter_shortens_clock() {
        let mut game = started(2);
        game.challenge_letters.push('e');
        say(&mut game, "apple").unwrap();
        assert_eq!(game.seconds_left(), 15);
    }

    #[test]
    fn test_timeout_eliminates() {
        let mut game = started(3);
        game.tick(Duration::from_secs(20));
        assert!(!game.is_alive(PlayerId::new(0)));
        assert_eq!(game.active_player(), PlayerId::new(1));

        game.tick(Duration::from_secs(20));
        assert!(game.is_over());
        assert_eq!(game.outcome(), Some(GameResult::Winner(PlayerId::new(2))));
    }

    #[test]
    fn test_setup_only_before_start() {
        let mut game = WordChain::new(&SessionConfig::new(2).unwrap().with_seed(3));
        game.handle(WordInput::SetDifficulty(Difficulty::Hard)).unwrap();
        game.handle(WordInput::SetCategory(Category::Science)).unwrap();
        game.handle(WordInput::Start).unwrap();
        assert!(game.seconds_left() <= 15);
        assert!(game
            .handle(WordInput::SetDifficulty(Difficulty::Easy))
            .is_err());
        assert!(game.hints().len() <= MAX_HINTS);
        assert_eq!(game.bonus_letters().len(), SPECIAL_LETTERS);
        for letter in game.challenge_letters() {
            assert!(!game.bonus_letters().contains(letter));
        }
    }
}
