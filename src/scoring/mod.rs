//! Scoring engine.
//!
//! Pure functions mapping a finished game to a score and an efficiency
//! grade. Two modes exist and a controller uses exactly one:
//!
//! - [`ScoringMode::Composite`] (default): base score plus move and time
//!   bonuses on a win, a partial score on a loss. Higher is better.
//! - [`ScoringMode::MoveCount`]: the score is the move count. Lower is
//!   better.
//!
//! ## Composite formula (win)
//!
//! ```text
//! perfect   = 2 * pair_count
//! move_eff  = clamp(1 - (moves - perfect) / (move_limit - perfect), 0, 1)
//! time_eff  = clamp(1 - seconds / (pair_count * 10), 0, 1)
//! score     = base + floor(perfect_bonus * move_eff) + floor(time_bonus_max * time_eff)
//! ```
//!
//! clamped to `[100, base + perfect_bonus + time_bonus_max]`.
//!
//! On a loss: `floor(base * matched / pairs * 0.5)`, floored at 100.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::DifficultyProfile;

/// Lowest score a composite game can report.
pub const MIN_SCORE: u32 = 100;

/// Seconds per pair after which the time bonus is gone.
pub const SECONDS_PER_PAIR: u32 = 10;

/// Share of the base score a loss keeps, scaled by completion.
pub const LOSS_FACTOR: f64 = 0.5;

/// Scoring mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Score is the move count. Lower is better.
    MoveCount,
    /// Base score plus efficiency bonuses. Higher is better.
    #[default]
    Composite,
}

impl ScoringMode {
    /// Whether `candidate` beats `existing` under this mode.
    #[must_use]
    pub fn is_better(self, candidate: u32, existing: u32) -> bool {
        match self {
            ScoringMode::MoveCount => candidate < existing,
            ScoringMode::Composite => candidate > existing,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScoringMode::MoveCount => "move_count",
            ScoringMode::Composite => "composite",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter efficiency grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
    /// Reported for lost games.
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Grade {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
            Grade::NotApplicable => "N/A",
        }
    }

    /// Grade for an efficiency ratio. Boundaries belong to the higher grade.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.9 {
            Grade::APlus
        } else if ratio >= 0.8 {
            Grade::A
        } else if ratio >= 0.7 {
            Grade::B
        } else if ratio >= 0.6 {
            Grade::C
        } else if ratio >= 0.5 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a game ended, as far as scoring cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub won: bool,
    pub move_count: u32,
    pub elapsed_seconds: u32,
    pub matched_pairs: u32,
}

/// Final score and grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub grade: Grade,
}

/// Efficiency grade for a won game.
///
/// `ratio = 2 * pair_count / move_count`. A zero move count grades as A+.
#[must_use]
pub fn efficiency_grade(pair_count: u32, move_count: u32) -> Grade {
    if move_count == 0 {
        return Grade::APlus;
    }
    let perfect = f64::from(pair_count * 2);
    Grade::from_ratio(perfect / f64::from(move_count))
}

/// Move efficiency in `[0, 1]`.
///
/// Without a usable move limit (none, or not above the perfect count) the
/// plain efficiency ratio is used instead.
#[must_use]
pub fn move_efficiency(profile: &DifficultyProfile, move_count: u32) -> f64 {
    let perfect = f64::from(profile.perfect_moves());
    let moves = f64::from(move_count);
    let efficiency = match profile.move_limit {
        Some(limit) if f64::from(limit) > perfect => {
            1.0 - (moves - perfect) / (f64::from(limit) - perfect)
        }
        _ if move_count == 0 => 1.0,
        _ => perfect / moves,
    };
    efficiency.clamp(0.0, 1.0)
}

/// Time efficiency in `[0, 1]`.
#[must_use]
pub fn time_efficiency(profile: &DifficultyProfile, elapsed_seconds: u32) -> f64 {
    let budget = f64::from(profile.pair_count * SECONDS_PER_PAIR);
    if budget <= 0.0 {
        return 0.0;
    }
    (1.0 - f64::from(elapsed_seconds) / budget).clamp(0.0, 1.0)
}

/// Composite score for a finished game.
#[must_use]
pub fn composite_score(profile: &DifficultyProfile, stats: &GameStats) -> ScoreResult {
    let max = profile.max_score().max(MIN_SCORE);

    if stats.won {
        let move_eff = move_efficiency(profile, stats.move_count);
        let time_eff = time_efficiency(profile, stats.elapsed_seconds);
        let move_bonus = (f64::from(profile.perfect_bonus) * move_eff).floor();
        let time_bonus = (f64::from(profile.time_bonus_max) * time_eff).floor();
        let raw = u64::from(profile.base_score) + move_bonus as u64 + time_bonus as u64;
        ScoreResult {
            score: (raw.min(u64::from(max)) as u32).max(MIN_SCORE),
            grade: efficiency_grade(profile.pair_count, stats.move_count),
        }
    } else {
        let completion = if profile.pair_count == 0 {
            0.0
        } else {
            f64::from(stats.matched_pairs) / f64::from(profile.pair_count)
        };
        let raw = (f64::from(profile.base_score) * completion * LOSS_FACTOR).floor() as u32;
        ScoreResult {
            score: raw.clamp(MIN_SCORE, max),
            grade: Grade::NotApplicable,
        }
    }
}

/// Move-count score for a finished game.
#[must_use]
pub fn move_count_score(profile: &DifficultyProfile, stats: &GameStats) -> ScoreResult {
    let grade = if stats.won {
        efficiency_grade(profile.pair_count, stats.move_count)
    } else {
        Grade::NotApplicable
    };
    ScoreResult {
        score: stats.move_count,
        grade,
    }
}

/// Score a finished game under the given mode.
#[must_use]
pub fn score(mode: ScoringMode, profile: &DifficultyProfile, stats: &GameStats) -> ScoreResult {
    match mode {
        ScoringMode::Composite => composite_score(profile, stats),
        ScoringMode::MoveCount => move_count_score(profile, stats),
    }
}
