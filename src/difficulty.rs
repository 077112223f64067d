use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::util::mean;

/// Number of most recent rounds the adjuster looks at
pub const ADJUSTMENT_WINDOW: usize = 3;

pub const MIN_TIME_LIMIT_SECS: u32 = 8;
pub const MAX_TIME_LIMIT_SECS: u32 = 20;
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 15;

const STRUGGLING_BONUS_SECS: i32 = 5;
const CRUISING_PENALTY_SECS: i32 = -3;

/// Outcome of a single game round, used for difficulty adaptation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub word_length: usize,
    pub time_used_secs: f64,
    pub succeeded: bool,
    pub category_valid: bool,
}

impl PerformanceSample {
    pub fn success(word_length: usize, time_used_secs: f64) -> Self {
        Self {
            word_length,
            time_used_secs,
            succeeded: true,
            category_valid: true,
        }
    }

    /// A round where the word was in the category but broke the chain
    pub fn failure(time_used_secs: f64) -> Self {
        Self {
            word_length: 0,
            time_used_secs,
            succeeded: false,
            category_valid: true,
        }
    }

    fn counts_as_success(&self) -> bool {
        self.succeeded && self.category_valid
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Tier {
    pub fn from_score(score: u32) -> Self {
        if score >= 4 {
            Tier::Hard
        } else if score >= 2 {
            Tier::Medium
        } else {
            Tier::Easy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub tier: Tier,
    pub time_adjustment_secs: i32,
}

impl Default for Adjustment {
    fn default() -> Self {
        Self {
            tier: Tier::Medium,
            time_adjustment_secs: 0,
        }
    }
}

/// Aggregates over the adjustment window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub avg_word_length: f64,
    pub avg_time_used_secs: f64,
    pub success_ratio: f64,
}

impl WindowSummary {
    /// Summarize the last `ADJUSTMENT_WINDOW` samples, or None if there are fewer
    pub fn from_samples(samples: &[PerformanceSample]) -> Option<Self> {
        if samples.len() < ADJUSTMENT_WINDOW {
            return None;
        }
        let window = &samples[samples.len() - ADJUSTMENT_WINDOW..];

        let lengths: Vec<f64> = window.iter().map(|s| s.word_length as f64).collect();
        let times: Vec<f64> = window.iter().map(|s| s.time_used_secs).collect();
        let successes = window.iter().filter(|s| s.counts_as_success()).count();

        Some(Self {
            avg_word_length: mean(&lengths)?,
            avg_time_used_secs: mean(&times)?,
            success_ratio: successes as f64 / ADJUSTMENT_WINDOW as f64,
        })
    }

    /// Performance score in 0..=6, two points max per dimension
    pub fn score(&self) -> u32 {
        let length_points = if self.avg_word_length > 7.0 {
            2
        } else if self.avg_word_length > 5.0 {
            1
        } else {
            0
        };

        let time_points = if self.avg_time_used_secs < 5.0 {
            2
        } else if self.avg_time_used_secs < 8.0 {
            1
        } else {
            0
        };

        let success_points = if self.success_ratio == 1.0 {
            2
        } else if self.success_ratio >= 0.66 {
            1
        } else {
            0
        };

        length_points + time_points + success_points
    }

    pub fn time_adjustment_secs(&self) -> i32 {
        if self.success_ratio < 0.33 {
            STRUGGLING_BONUS_SECS
        } else if self.success_ratio == 1.0 && self.avg_time_used_secs < 5.0 {
            CRUISING_PENALTY_SECS
        } else {
            0
        }
    }
}

/// Map the most recent rounds to a tier and a time budget change.
///
/// Only the last three samples matter. With fewer than three the result is
/// medium with no change.
pub fn adjust_difficulty(samples: &[PerformanceSample]) -> Adjustment {
    let Some(summary) = WindowSummary::from_samples(samples) else {
        return Adjustment::default();
    };

    let score = summary.score();
    let adjustment = Adjustment {
        tier: Tier::from_score(score),
        time_adjustment_secs: summary.time_adjustment_secs(),
    };

    debug!(
        score,
        avg_len = summary.avg_word_length,
        avg_time = summary.avg_time_used_secs,
        success_ratio = summary.success_ratio,
        tier = %adjustment.tier,
        delta = adjustment.time_adjustment_secs,
        "difficulty recomputed"
    );

    adjustment
}

/// Current pacing for a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub tier: Tier,
    pub base_time_limit_secs: u32,
}

impl Default for DifficultyState {
    fn default() -> Self {
        Self {
            tier: Tier::Medium,
            base_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

impl DifficultyState {
    pub fn with_time_limit(secs: u32) -> Self {
        Self {
            tier: Tier::Medium,
            base_time_limit_secs: clamp_time_limit(secs as i64),
        }
    }

    pub fn apply(self, adjustment: Adjustment) -> Self {
        Self {
            tier: adjustment.tier,
            base_time_limit_secs: clamp_time_limit(
                self.base_time_limit_secs as i64 + adjustment.time_adjustment_secs as i64,
            ),
        }
    }
}

fn clamp_time_limit(secs: i64) -> u32 {
    secs.clamp(MIN_TIME_LIMIT_SECS as i64, MAX_TIME_LIMIT_SECS as i64) as u32
}
