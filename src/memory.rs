use std::time::SystemTime;

use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::util::elapsed_secs;

pub const MAX_LEVEL: u32 = 10;

/// Number of most recent results considered by the attempt budget
const BUDGET_WINDOW: usize = 3;
const BUDGET_WEIGHTS: [f64; BUDGET_WINDOW] = [3.0, 2.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub pairs: u32,
    pub cols: u32,
    pub rows: u32,
    pub attempts: u32,
}

impl LevelConfig {
    const fn new(pairs: u32, cols: u32, rows: u32, attempts: u32) -> Self {
        Self {
            pairs,
            cols,
            rows,
            attempts,
        }
    }
}

const LEVELS: [LevelConfig; MAX_LEVEL as usize] = [
    LevelConfig::new(6, 6, 2, 12),
    LevelConfig::new(8, 4, 4, 15),
    LevelConfig::new(10, 5, 4, 18),
    LevelConfig::new(12, 8, 3, 20),
    LevelConfig::new(15, 10, 3, 25),
    LevelConfig::new(18, 9, 4, 30),
    LevelConfig::new(21, 7, 6, 35),
    LevelConfig::new(24, 8, 6, 40),
    LevelConfig::new(28, 8, 7, 45),
    LevelConfig::new(30, 10, 6, 50),
];

/// Board layout and attempt budget for a level; unknown levels get level 1
pub fn level_config(level: u32) -> LevelConfig {
    match level {
        1..=MAX_LEVEL => LEVELS[(level - 1) as usize],
        _ => LEVELS[0],
    }
}

/// One finished attempt at a memory level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelResult {
    pub level: u32,
    pub won: bool,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub elapsed_secs: f64,
    pub finished_at: DateTime<Local>,
}

impl LevelResult {
    fn usage_ratio(&self) -> f64 {
        if self.max_attempts == 0 {
            1.0
        } else {
            self.attempts_used as f64 / self.max_attempts as f64
        }
    }
}

/// Attempt budget for the next try at a level, based on how the last few went.
///
/// `history` is oldest first. The most recent result weighs 3, then 2, then 1.
/// Players who keep losing get 25% more attempts; players who keep winning
/// with room to spare get 10% fewer. Never below the pair count, never above
/// twice the base budget.
pub fn adaptive_max_attempts(config: LevelConfig, history: &[LevelResult]) -> u32 {
    let base = config.attempts;
    if history.is_empty() {
        return base;
    }

    let recent = history.iter().rev().take(BUDGET_WINDOW);
    let (mut weight_sum, mut win_sum, mut usage_sum) = (0.0, 0.0, 0.0);
    for (result, weight) in recent.zip(BUDGET_WEIGHTS) {
        weight_sum += weight;
        if result.won {
            win_sum += weight;
        }
        usage_sum += weight * result.usage_ratio();
    }
    let win_rate = win_sum / weight_sum;
    let usage = usage_sum / weight_sum;

    let budget = if win_rate < 0.34 {
        base + (base as f64 * 0.25).ceil() as u32
    } else if win_rate == 1.0 && usage < 0.6 {
        base - (base as f64 * 0.10).floor() as u32
    } else {
        base
    };

    let budget = budget.clamp(config.pairs, base * 2);
    debug!(win_rate, usage, base, budget, "memory attempt budget");
    budget
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub value: u32,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub fn is_face_up(&self) -> bool {
        self.is_flipped || self.is_matched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    Ignored,
    FirstCard,
    Matched { won: bool },
    Mismatch { lost: bool },
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    level: u32,
    config: LevelConfig,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    attempts: u32,
    max_attempts: u32,
    matched_pairs: u32,
    status: MemoryStatus,
    started_at: SystemTime,
}

impl MemoryGame {
    /// Shuffled board for a level with the given attempt budget
    pub fn new(level: u32, max_attempts: u32) -> Self {
        let config = level_config(level);
        let mut values: Vec<u32> = (1..=config.pairs).chain(1..=config.pairs).collect();
        values.shuffle(&mut rand::thread_rng());
        Self::with_values(level, values, max_attempts)
    }

    /// Board with a fixed card order
    pub fn with_values(level: u32, values: Vec<u32>, max_attempts: u32) -> Self {
        let level = if (1..=MAX_LEVEL).contains(&level) {
            level
        } else {
            1
        };
        let config = level_config(level);
        info!(level, max_attempts, "memory level started");

        Self {
            level,
            config,
            cards: values
                .into_iter()
                .map(|value| Card {
                    value,
                    is_flipped: false,
                    is_matched: false,
                })
                .collect(),
            flipped: Vec::with_capacity(2),
            attempts: 0,
            max_attempts,
            matched_pairs: 0,
            status: MemoryStatus::Playing,
            started_at: SystemTime::now(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn config(&self) -> LevelConfig {
        self.config
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    pub fn status(&self) -> MemoryStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != MemoryStatus::Playing
    }

    /// Two unmatched cards are face up waiting for `settle`
    pub fn has_pending_mismatch(&self) -> bool {
        self.flipped.len() == 2
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.is_finished() || self.has_pending_mismatch() {
            return FlipOutcome::Ignored;
        }
        match self.cards.get(index) {
            Some(card) if !card.is_face_up() => {}
            _ => return FlipOutcome::Ignored,
        }

        self.cards[index].is_flipped = true;
        self.flipped.push(index);
        if self.flipped.len() == 1 {
            return FlipOutcome::FirstCard;
        }

        self.attempts += 1;
        let (first, second) = (self.flipped[0], self.flipped[1]);

        if self.cards[first].value == self.cards[second].value {
            self.cards[first].is_matched = true;
            self.cards[second].is_matched = true;
            self.flipped.clear();
            self.matched_pairs += 1;

            let won = self.matched_pairs == self.config.pairs;
            if won {
                info!(level = self.level, attempts = self.attempts, "memory level won");
                self.status = MemoryStatus::Won;
            } else if self.attempts >= self.max_attempts {
                self.status = MemoryStatus::Lost;
            }
            FlipOutcome::Matched { won }
        } else {
            let lost = self.attempts >= self.max_attempts;
            if lost {
                info!(level = self.level, "memory level lost");
                self.status = MemoryStatus::Lost;
            }
            FlipOutcome::Mismatch { lost }
        }
    }

    /// Turn a pending mismatch face down again
    pub fn settle(&mut self) {
        if !self.has_pending_mismatch() {
            return;
        }
        for idx in self.flipped.drain(..) {
            self.cards[idx].is_flipped = false;
        }
    }

    /// Snapshot for the session history; None while still playing
    pub fn result(&self) -> Option<LevelResult> {
        if !self.is_finished() {
            return None;
        }
        Some(LevelResult {
            level: self.level,
            won: self.status == MemoryStatus::Won,
            attempts_used: self.attempts,
            max_attempts: self.max_attempts,
            elapsed_secs: elapsed_secs(self.started_at, SystemTime::now()),
            finished_at: Local::now(),
        })
    }
}
