use std::collections::VecDeque;

use crate::difficulty::{PerformanceSample, ADJUSTMENT_WINDOW};

/// Rolling buffer of the most recent round outcomes in a session
#[derive(Debug, Clone)]
pub struct PerformanceSampler {
    capacity: usize,
    samples: VecDeque<PerformanceSample>,
    total_recorded: usize,
}

impl Default for PerformanceSampler {
    fn default() -> Self {
        Self::new(ADJUSTMENT_WINDOW)
    }
}

impl PerformanceSampler {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            total_recorded: 0,
        }
    }

    pub fn record(&mut self, sample: PerformanceSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.total_recorded += 1;
    }

    /// Buffered samples, oldest first
    pub fn recent(&self) -> Vec<PerformanceSample> {
        self.samples.iter().copied().collect()
    }

    pub fn last(&self) -> Option<&PerformanceSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Every sample recorded this session, including ones evicted from the buffer
    pub fn total_recorded(&self) -> usize {
        self.total_recorded
    }

    /// Difficulty is recomputed once per full window of rounds
    pub fn adjustment_due(&self) -> bool {
        self.total_recorded > 0 && self.total_recorded % ADJUSTMENT_WINDOW == 0
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.total_recorded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_window() {
        let mut sampler = PerformanceSampler::default();
        for len in 1..=5 {
            sampler.record(PerformanceSample::success(len, 1.0));
        }
        let lens: Vec<usize> = sampler.recent().iter().map(|s| s.word_length).collect();
        assert_eq!(lens, vec![3, 4, 5]);
        assert_eq!(sampler.total_recorded(), 5);
        assert_eq!(sampler.last().map(|s| s.word_length), Some(5));
    }

    #[test]
    fn adjustment_due_every_third_round() {
        let mut sampler = PerformanceSampler::default();
        assert!(!sampler.adjustment_due());
        let due: Vec<bool> = (0..6)
            .map(|_| {
                sampler.record(PerformanceSample::failure(2.0));
                sampler.adjustment_due()
            })
            .collect();
        assert_eq!(due, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn clear_resets_counts() {
        let mut sampler = PerformanceSampler::new(0);
        sampler.record(PerformanceSample::failure(1.0));
        assert_eq!(sampler.len(), 1);
        sampler.clear();
        assert!(sampler.is_empty());
        assert_eq!(sampler.total_recorded(), 0);
    }
}
