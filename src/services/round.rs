use std::collections::HashSet;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::models::ImageCard;
use crate::services::masking::render_masked_title;
use crate::services::scoring::{guess_points, COMPLETION_BONUS};
use crate::services::tokenizer::guessable_words;
use crate::utils::distinct_spellings;

/// Length of a round in seconds.
pub const ROUND_SECONDS: u32 = 60;

/// Number of words hidden in easy mode (fewer if the title has fewer
/// distinct guessable words).
pub const EASY_MODE_HIDDEN_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
}

impl Difficulty {
    pub fn from_param(value: &str) -> Option<Difficulty> {
        match value.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Where a round currently stands. Idle (no round at all) is represented by
/// `Session::round` being `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Complete,
    Forfeited,
}

/// Result of submitting a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// No round is accepting guesses.
    Inactive,
    /// The guess was empty after trimming.
    Empty,
    /// The guess was shorter than 3 characters.
    TooShort,
    /// The same guess was already submitted this round.
    AlreadyGuessed,
    /// The word does not occur in the title.
    NotFound { word: String },
    /// The word occurs in the title; all its positions are now revealed.
    Found {
        word: String,
        occurrences: usize,
        points: u32,
        completed: bool,
    },
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    /// The clock hit zero; the round was forfeited automatically.
    Expired,
    /// The round already left the Active phase; nothing was decremented.
    Inactive,
}

/// One submitted guess, in submission order, for the display's history list.
#[derive(Debug, Clone, Serialize)]
pub struct GuessRecord {
    pub word: String,
    pub correct: bool,
}

/// One round of the game: the title, the word sets derived from it, and the
/// countdown. All fields are private; the transition methods are the only
/// entry points for mutation.
#[derive(Debug)]
pub struct Round {
    card: ImageCard,
    title: String,
    guessable: Vec<String>,
    hidden: Vec<String>,
    revealed: HashSet<String>,
    guessed: HashSet<String>,
    history: Vec<GuessRecord>,
    remaining_secs: u32,
    difficulty: Difficulty,
    phase: Phase,
}

impl Round {
    pub fn new(card: ImageCard, title: String, difficulty: Difficulty) -> Round {
        let guessable = guessable_words(&title);
        let hidden = match difficulty {
            Difficulty::Easy => choose_hidden_words(&guessable),
            Difficulty::Hard => Vec::new(),
        };
        Round {
            card,
            title,
            guessable,
            hidden,
            revealed: HashSet::new(),
            guessed: HashSet::new(),
            history: Vec::new(),
            remaining_secs: ROUND_SECONDS,
            difficulty,
            phase: Phase::Active,
        }
    }

    fn evaluate_guess(&mut self, raw: &str) -> GuessOutcome {
        if self.phase != Phase::Active {
            return GuessOutcome::Inactive;
        }

        let guess = raw.trim().to_lowercase();
        if guess.is_empty() {
            return GuessOutcome::Empty;
        }
        if guess.chars().count() < 3 {
            return GuessOutcome::TooShort;
        }
        if !self.guessed.insert(guess.clone()) {
            return GuessOutcome::AlreadyGuessed;
        }

        let occurrences = self.guessable.iter().filter(|word| **word == guess).count();
        if occurrences == 0 {
            self.history.push(GuessRecord {
                word: guess.clone(),
                correct: false,
            });
            return GuessOutcome::NotFound { word: guess };
        }

        // One correct guess reveals every position of the spelling.
        self.revealed.insert(guess.clone());
        self.history.push(GuessRecord {
            word: guess.clone(),
            correct: true,
        });

        let completed = self.is_complete();
        if completed {
            self.phase = Phase::Complete;
        }
        GuessOutcome::Found {
            word: guess,
            occurrences,
            points: guess_points(occurrences),
            completed,
        }
    }

    /// Hard mode: every distinct guessable spelling revealed. Easy mode:
    /// every pre-selected hidden word revealed. Only ever evaluated after a
    /// correct guess, so a title with no guessable words never completes.
    fn is_complete(&self) -> bool {
        match self.difficulty {
            Difficulty::Hard => distinct_spellings(&self.guessable)
                .iter()
                .all(|word| self.revealed.contains(word)),
            Difficulty::Easy => self.hidden.iter().all(|word| self.revealed.contains(word)),
        }
    }

    fn forfeit(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.phase = Phase::Forfeited;
        true
    }

    fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Active {
            return TickOutcome::Inactive;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.phase = Phase::Forfeited;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining: self.remaining_secs,
            }
        }
    }

    pub fn card(&self) -> &ImageCard {
        &self.card
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The display string with unrevealed words masked.
    pub fn masked_title(&self) -> String {
        render_masked_title(
            &self.title,
            &self.guessable,
            &self.revealed,
            self.difficulty,
            &self.hidden,
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    pub fn guessable(&self) -> &[String] {
        &self.guessable
    }

    pub fn hidden_words(&self) -> &[String] {
        &self.hidden
    }
}

/// Pick up to 3 distinct spellings to hide in easy mode, uniformly at random.
fn choose_hidden_words(guessable: &[String]) -> Vec<String> {
    let distinct = distinct_spellings(guessable);
    let mut rng = rand::thread_rng();
    distinct
        .choose_multiple(&mut rng, EASY_MODE_HIDDEN_COUNT)
        .cloned()
        .collect()
}

/// The whole game session: at most one round at a time, plus the score and
/// difficulty that carry across rounds. The sequence number identifies the
/// current round (or Idle gap) so that stale tickers and restart timers can
/// detect that the world moved on under them.
#[derive(Debug)]
pub struct Session {
    round: Option<Round>,
    score: u32,
    last_difficulty: Difficulty,
    round_seq: u64,
}

impl Session {
    pub fn new() -> Session {
        Session {
            round: None,
            score: 0,
            last_difficulty: Difficulty::Hard,
            round_seq: 0,
        }
    }

    /// Install a fresh round, making it the current one. Records the round's
    /// difficulty as the new default for auto-restarts.
    pub fn begin_round(&mut self, round: Round) -> u64 {
        self.last_difficulty = round.difficulty();
        self.round = Some(round);
        self.round_seq += 1;
        self.round_seq
    }

    /// Drop any current round back to Idle. Bumping the sequence number here
    /// invalidates outstanding tickers and restart timers immediately.
    /// Carried-forward score and difficulty are untouched.
    pub fn clear_round(&mut self) -> u64 {
        self.round = None;
        self.round_seq += 1;
        self.round_seq
    }

    pub fn submit_guess(&mut self, raw: &str) -> GuessOutcome {
        let Some(round) = self.round.as_mut() else {
            return GuessOutcome::Inactive;
        };
        let outcome = round.evaluate_guess(raw);
        if let GuessOutcome::Found {
            points, completed, ..
        } = &outcome
        {
            self.score += points;
            if *completed {
                self.score += COMPLETION_BONUS;
            }
        }
        outcome
    }

    pub fn forfeit(&mut self) -> bool {
        self.round.as_mut().map_or(false, Round::forfeit)
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.round.as_mut().map_or(TickOutcome::Inactive, Round::tick)
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn last_difficulty(&self) -> Difficulty {
        self.last_difficulty
    }

    pub fn seq(&self) -> u64 {
        self.round_seq
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}
