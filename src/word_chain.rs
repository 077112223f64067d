use std::collections::HashSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::categories::{Category, Theme};
use crate::difficulty::{adjust_difficulty, DifficultyState, PerformanceSample, Tier};
use crate::sampler::PerformanceSampler;
use crate::util::elapsed_secs;

pub const MIN_WORD_LENGTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    Playing,
    Over,
}

/// Result of submitting a word
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    TooShort,
    AlreadyUsed,
    NotInCategory { theme: Theme },
    WrongStart { expected: char },
    Accepted {
        points: u32,
        /// New pacing when this word completed an adjustment window
        adjusted: Option<DifficultyState>,
    },
    GameOver,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }

    /// Player facing feedback line
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::TooShort => {
                format!("Word must be at least {MIN_WORD_LENGTH} letters long!")
            }
            SubmitOutcome::AlreadyUsed => "Word already used! Try another one.".to_string(),
            SubmitOutcome::NotInCategory { theme } => format!(
                "Invalid {theme}! Please enter a valid {}!",
                theme.singular()
            ),
            SubmitOutcome::WrongStart { expected } => {
                format!("Word must start with '{expected}'!")
            }
            SubmitOutcome::Accepted {
                points,
                adjusted: Some(state),
            } => format!(
                "+{points} points! Difficulty: {}, Time limit: {}s! Keep going!",
                state.tier, state.base_time_limit_secs
            ),
            SubmitOutcome::Accepted {
                points,
                adjusted: None,
            } => format!("+{points} points! Keep going!"),
            SubmitOutcome::GameOver => "Time's up! Game Over!".to_string(),
        }
    }
}

/// Final numbers of a finished word-chain game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChainResult {
    pub theme: Theme,
    pub score: u32,
    pub best_streak: u32,
    pub words_played: u32,
    pub final_tier: Tier,
    pub final_time_limit_secs: u32,
    /// Accepted words in play order, without the start word
    pub words_used: Vec<String>,
    pub total_time_played_secs: f64,
}

/// A single word-chain game: each word must start with the last letter of
/// the previous one and belong to the chosen theme, against a shrinking
/// or growing clock.
#[derive(Debug, Clone)]
pub struct WordChainGame {
    category: Category,
    current_word: String,
    used_words: HashSet<String>,
    words_used: Vec<String>,
    score: u32,
    streak: u32,
    best_streak: u32,
    words_played: u32,
    time_left_secs: f64,
    difficulty: DifficultyState,
    sampler: PerformanceSampler,
    round_started_at: SystemTime,
    played_secs: f64,
    status: ChainStatus,
}

impl WordChainGame {
    /// Start a game with a random word from the theme
    pub fn new(theme: Theme, time_limit_secs: u32) -> Self {
        let category = Category::load(theme);
        let mut rng = rand::thread_rng();
        let start = category
            .random_word(&mut rng)
            .map(str::to_string)
            .unwrap_or_default();
        Self::with_start_word(category, start, time_limit_secs)
    }

    pub fn with_start_word(category: Category, start: String, time_limit_secs: u32) -> Self {
        let start = start.trim().to_lowercase();
        let difficulty = DifficultyState::with_time_limit(time_limit_secs);
        info!(theme = %category.theme, start = %start, "word chain started");

        Self {
            used_words: HashSet::from([start.clone()]),
            current_word: start,
            words_used: Vec::new(),
            category,
            score: 0,
            streak: 0,
            best_streak: 0,
            words_played: 0,
            time_left_secs: difficulty.base_time_limit_secs as f64,
            difficulty,
            sampler: PerformanceSampler::default(),
            round_started_at: SystemTime::now(),
            played_secs: 0.0,
            status: ChainStatus::Playing,
        }
    }

    pub fn theme(&self) -> Theme {
        self.category.theme
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    /// The letter the next word has to start with
    pub fn expected_start(&self) -> Option<char> {
        self.current_word.chars().last()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn words_played(&self) -> u32 {
        self.words_played
    }

    pub fn time_left_secs(&self) -> f64 {
        self.time_left_secs
    }

    pub fn difficulty(&self) -> DifficultyState {
        self.difficulty
    }

    pub fn sampler(&self) -> &PerformanceSampler {
        &self.sampler
    }

    pub fn status(&self) -> ChainStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == ChainStatus::Over
    }

    pub fn is_used(&self, word: &str) -> bool {
        self.used_words.contains(&word.trim().to_lowercase())
    }

    /// Advance the round clock
    pub fn on_tick(&mut self, dt_secs: f64) {
        if self.is_over() {
            return;
        }
        self.played_secs += dt_secs.min(self.time_left_secs);
        self.time_left_secs = (self.time_left_secs - dt_secs).max(0.0);
        if self.time_left_secs <= 0.0 {
            info!(score = self.score, "word chain timed out");
            self.status = ChainStatus::Over;
        }
    }

    /// Submit a word, timing the round with the wall clock
    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        let time_used = elapsed_secs(self.round_started_at, SystemTime::now());
        self.submit_timed(input, time_used)
    }

    pub fn submit_timed(&mut self, input: &str, time_used_secs: f64) -> SubmitOutcome {
        if self.is_over() {
            return SubmitOutcome::GameOver;
        }

        let word = input.trim().to_lowercase();

        if word.chars().count() < MIN_WORD_LENGTH {
            return SubmitOutcome::TooShort;
        }
        if self.used_words.contains(&word) {
            return SubmitOutcome::AlreadyUsed;
        }
        if !self.category.contains(&word) {
            return SubmitOutcome::NotInCategory {
                theme: self.category.theme,
            };
        }

        let expected = match self.expected_start() {
            Some(c) => c,
            None => return self.accept(word, time_used_secs),
        };
        if !word.starts_with(expected) {
            self.sampler.record(PerformanceSample::failure(time_used_secs));
            debug!(word = %word, %expected, "word broke the chain");
            return SubmitOutcome::WrongStart { expected };
        }

        self.accept(word, time_used_secs)
    }

    fn accept(&mut self, word: String, time_used_secs: f64) -> SubmitOutcome {
        let points = word.chars().count() as u32;
        self.sampler
            .record(PerformanceSample::success(points as usize, time_used_secs));

        let adjusted = if self.sampler.adjustment_due() {
            let adjustment = adjust_difficulty(&self.sampler.recent());
            self.difficulty = self.difficulty.apply(adjustment);
            info!(
                tier = %self.difficulty.tier,
                time_limit = self.difficulty.base_time_limit_secs,
                "difficulty adjusted"
            );
            Some(self.difficulty)
        } else {
            None
        };

        self.score += points;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.words_played += 1;
        self.used_words.insert(word.clone());
        self.words_used.push(word.clone());
        self.current_word = word;
        self.time_left_secs = self.difficulty.base_time_limit_secs as f64;
        self.round_started_at = SystemTime::now();

        SubmitOutcome::Accepted { points, adjusted }
    }

    pub fn result(&self) -> WordChainResult {
        WordChainResult {
            theme: self.category.theme,
            score: self.score,
            best_streak: self.best_streak,
            words_played: self.words_played,
            final_tier: self.difficulty.tier,
            final_time_limit_secs: self.difficulty.base_time_limit_secs,
            words_used: self.words_used.clone(),
            total_time_played_secs: self.played_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn game(start: &str) -> WordChainGame {
        let words = ["tiger", "rabbit", "tapir", "rhino", "owl", "lion", "newt", "tortoise", "eel"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        WordChainGame::with_start_word(
            Category::from_words(Theme::Animals, words),
            start.to_string(),
            15,
        )
    }

    #[test]
    fn rejects_short_used_and_foreign_words_without_sampling() {
        let mut g = game("tiger");
        assert_eq!(g.submit_timed("r", 1.0), SubmitOutcome::TooShort);
        assert_eq!(g.submit_timed("Tiger", 1.0), SubmitOutcome::AlreadyUsed);
        assert_matches!(
            g.submit_timed("rose", 1.0),
            SubmitOutcome::NotInCategory {
                theme: Theme::Animals
            }
        );
        assert!(g.sampler().is_empty());
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn wrong_start_records_failure_and_keeps_streak() {
        let mut g = game("tiger");
        assert!(g.submit_timed("rabbit", 2.0).is_accepted());
        assert_eq!(
            g.submit_timed("owl", 3.0),
            SubmitOutcome::WrongStart { expected: 't' }
        );
        assert_eq!(g.streak(), 1);
        let last = g.sampler().last().unwrap();
        assert!(!last.succeeded);
        assert_eq!(last.word_length, 0);
    }

    #[test]
    fn accepted_word_scores_its_length() {
        let mut g = game("tiger");
        let outcome = g.submit_timed(" Rabbit ", 2.0);
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                points: 6,
                adjusted: None
            }
        );
        assert_eq!(g.score(), 6);
        assert_eq!(g.current_word(), "rabbit");
        assert_eq!(g.expected_start(), Some('t'));
        assert!(g.is_used("rabbit"));
        assert_eq!(outcome.message(), "+6 points! Keep going!");
    }

    #[test]
    fn third_round_adjusts_difficulty() {
        let mut g = game("tiger");
        g.submit_timed("rabbit", 2.0);
        g.submit_timed("tortoise", 2.0);
        let outcome = g.submit_timed("eel", 2.0);
        // avg length 17/3 -> 1, avg time 2 -> 2, all succeeded -> 2
        let expected = DifficultyState {
            tier: Tier::Hard,
            base_time_limit_secs: 12,
        };
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                points: 3,
                adjusted: Some(expected)
            }
        );
        assert_eq!(g.difficulty(), expected);
        assert_eq!(g.time_left_secs(), 12.0);
        assert_eq!(g.best_streak(), 3);
    }

    #[test]
    fn failures_count_toward_the_window() {
        let mut g = game("tiger");
        g.submit_timed("owl", 9.0); // wrong start
        g.submit_timed("newt", 9.0); // wrong start
        let outcome = g.submit_timed("rabbit", 9.0);
        assert_matches!(
            outcome,
            SubmitOutcome::Accepted {
                adjusted: Some(DifficultyState {
                    tier: Tier::Easy,
                    base_time_limit_secs: 15
                }),
                ..
            }
        );
    }

    #[test]
    fn clock_runs_out() {
        let mut g = game("tiger");
        g.on_tick(10.0);
        assert!(!g.is_over());
        g.on_tick(5.0);
        assert!(g.is_over());
        assert_eq!(g.time_left_secs(), 0.0);
        assert_eq!(g.submit_timed("rabbit", 1.0), SubmitOutcome::GameOver);
    }

    #[test]
    fn accepted_word_resets_clock() {
        let mut g = game("tiger");
        g.on_tick(9.0);
        g.submit_timed("rhino", 9.0);
        assert_eq!(g.time_left_secs(), 15.0);
    }

    #[test]
    fn result_reflects_session() {
        let mut g = game("tiger");
        g.submit_timed("rabbit", 1.0);
        g.submit_timed("tapir", 1.0);
        let result = g.result();
        assert_eq!(result.score, 11);
        assert_eq!(result.words_played, 2);
        assert_eq!(result.final_tier, Tier::Medium);
        assert_eq!(result.final_time_limit_secs, 15);
        assert_eq!(result.words_used, vec!["rabbit", "tapir"]);
    }

    #[test]
    fn time_played_stops_at_timeout() {
        let mut g = game("tiger");
        g.on_tick(4.0);
        g.submit_timed("rabbit", 4.0);
        g.on_tick(10.0);
        g.on_tick(10.0);
        g.on_tick(10.0);
        assert!(g.is_over());
        assert_eq!(g.result().total_time_played_secs, 19.0);
    }

    #[test]
    fn random_start_is_marked_used() {
        let g = WordChainGame::new(Theme::Fruits, 15);
        assert!(g.is_used(g.current_word()));
        assert_eq!(g.status(), ChainStatus::Playing);
    }
}
