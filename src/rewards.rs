use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::difficulty::Tier;

/// Coins per word-chain point before the difficulty multiplier
pub const WORD_CHAIN_MULTIPLIER: f64 = 1.0;

/// Games scoring above this earn `HIGH_SCORE_BONUS` extra coins
pub const HIGH_SCORE_THRESHOLD: u32 = 1000;
pub const HIGH_SCORE_BONUS: f64 = 50.0;

pub const PERFECT_GAME_SCORE: u32 = 100;
pub const PERFECT_GAME_STREAK: u32 = 5;
pub const LONG_STREAK: u32 = 10;
pub const VETERAN_GAMES: i64 = 100;

pub fn tier_multiplier(tier: Tier) -> f64 {
    match tier {
        Tier::Easy => 1.0,
        Tier::Medium => 1.25,
        Tier::Hard => 1.5,
    }
}

/// Coins awarded for a finished word-chain game
pub fn coins_earned(score: u32, tier: Tier) -> u32 {
    let mut coins = score as f64 * WORD_CHAIN_MULTIPLIER * tier_multiplier(tier);
    if score > HIGH_SCORE_THRESHOLD {
        coins += HIGH_SCORE_BONUS;
    }
    coins.round() as u32
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    #[strum(serialize = "First Game")]
    PlayedOneTime,
    /// 100+ points with a streak above 5
    #[strum(serialize = "Perfect Game")]
    PerfectGame,
    #[strum(serialize = "Ten Streak")]
    TenStreak,
    #[strum(serialize = "Hundred Games")]
    HundredGames,
    #[strum(serialize = "Globetrotter")]
    AllThemesPlayed,
    /// Finished a game on the hard tier
    #[strum(serialize = "Expert")]
    ExpertLevel,
}

pub type Achievements = BTreeSet<Achievement>;

/// Achievements in `after` that were not already in `before`
pub fn newly_unlocked(before: &Achievements, after: &Achievements) -> Vec<Achievement> {
    after.difference(before).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coins_scale_with_tier() {
        assert_eq!(coins_earned(40, Tier::Easy), 40);
        assert_eq!(coins_earned(40, Tier::Medium), 50);
        assert_eq!(coins_earned(40, Tier::Hard), 60);
        assert_eq!(coins_earned(0, Tier::Hard), 0);
    }

    #[test]
    fn coins_round_to_nearest() {
        // 13 * 1.25 = 16.25, 14 * 1.25 = 17.5
        assert_eq!(coins_earned(13, Tier::Medium), 16);
        assert_eq!(coins_earned(14, Tier::Medium), 18);
    }

    #[test]
    fn bonus_only_above_threshold() {
        assert_eq!(coins_earned(1000, Tier::Easy), 1000);
        assert_eq!(coins_earned(1001, Tier::Easy), 1051);
        assert_eq!(coins_earned(1001, Tier::Hard), 1552);
    }

    #[test]
    fn only_new_achievements_are_reported() {
        let before = Achievements::from([Achievement::PlayedOneTime]);
        let after = Achievements::from([
            Achievement::PlayedOneTime,
            Achievement::ExpertLevel,
            Achievement::TenStreak,
        ]);
        assert_eq!(
            newly_unlocked(&before, &after),
            vec![Achievement::TenStreak, Achievement::ExpertLevel]
        );
        assert!(newly_unlocked(&after, &after).is_empty());
        assert_eq!(Achievement::AllThemesPlayed.to_string(), "Globetrotter");
    }
}
