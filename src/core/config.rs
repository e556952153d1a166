//! Game configuration types.
//!
//! Hosts configure the engine at startup by providing:
//! - `SymbolDef`: One entry of a symbol catalog (the pair tokens)
//! - `DifficultyProfile`: Pair count, move limit and score constants for a tier
//! - `GameConfig`: Combines all tiers plus timing and scoring settings
//!
//! Profiles are read-only once a session starts. `GameConfig::default()`
//! ships three stock tiers; `GameConfig::from_json` loads custom ones.

use std::fmt;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::error::GameError;
use crate::cards::SymbolId;
use crate::scoring::ScoringMode;

/// Reference delay before a mismatched pair flips back.
pub const DEFAULT_MISMATCH_DELAY_MS: u64 = 1000;

/// Elapsed-time tick period.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lowercase name, also used in storage keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(GameError::invalid(format!("unknown difficulty '{other}'"))),
        }
    }
}

/// One symbol in a catalog.
///
/// Only `id` matters to the engine. `name` and `glyph` are carried for the
/// presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub id: SymbolId,
    pub name: String,
    #[serde(default)]
    pub glyph: String,
}

impl SymbolDef {
    pub fn new(id: u16, name: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            id: SymbolId::new(id),
            name: name.into(),
            glyph: glyph.into(),
        }
    }
}

/// Static configuration for one difficulty tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Number of pairs on the board. Must equal `symbols.len()`.
    pub pair_count: u32,

    /// Maximum number of moves. `None` means unlimited.
    #[serde(default)]
    pub move_limit: Option<u32>,

    /// Score awarded for any win.
    pub base_score: u32,

    /// Bonus scaled by move efficiency.
    pub perfect_bonus: u32,

    /// Bonus scaled by time efficiency.
    pub time_bonus_max: u32,

    /// Symbol catalog, ordered, no duplicates.
    pub symbols: Vec<SymbolDef>,
}

impl DifficultyProfile {
    /// Create a profile whose pair count follows the catalog.
    pub fn new(
        symbols: Vec<SymbolDef>,
        base_score: u32,
        perfect_bonus: u32,
        time_bonus_max: u32,
    ) -> Self {
        Self {
            pair_count: symbols.len() as u32,
            move_limit: None,
            base_score,
            perfect_bonus,
            time_bonus_max,
            symbols,
        }
    }

    /// Set a finite move limit.
    #[must_use]
    pub fn with_move_limit(mut self, limit: u32) -> Self {
        self.move_limit = Some(limit);
        self
    }

    /// Minimum move count the scoring treats as perfect play.
    #[must_use]
    pub fn perfect_moves(&self) -> u32 {
        self.pair_count * 2
    }

    /// Highest score a win can earn. Saturates at `u32::MAX`.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.base_score
            .saturating_add(self.perfect_bonus)
            .saturating_add(self.time_bonus_max)
    }

    /// Symbol ids in catalog order.
    #[must_use]
    pub fn tokens(&self) -> Vec<SymbolId> {
        self.symbols.iter().map(|s| s.id).collect()
    }

    /// Look up a symbol definition.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Check the catalog and the pair count.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.symbols.is_empty() {
            return Err(GameError::invalid("empty symbol catalog"));
        }
        if self.pair_count as usize != self.symbols.len() {
            return Err(GameError::invalid(format!(
                "pair count {} does not match catalog of {} symbols",
                self.pair_count,
                self.symbols.len()
            )));
        }
        let mut seen = FxHashSet::default();
        for symbol in &self.symbols {
            if !seen.insert(symbol.id) {
                return Err(GameError::invalid(format!("duplicate symbol {}", symbol.id)));
            }
        }
        if self.move_limit == Some(0) {
            return Err(GameError::invalid("move limit must be at least 1"));
        }
        let total = u64::from(self.base_score)
            + u64::from(self.perfect_bonus)
            + u64::from(self.time_bonus_max);
        if total > u64::from(u32::MAX) {
            return Err(GameError::invalid(format!(
                "score components sum to {total}, above {}",
                u32::MAX
            )));
        }
        Ok(())
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Profile per tier.
    pub profiles: FxHashMap<Difficulty, DifficultyProfile>,

    /// Tier used by `restart` before any session was started.
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,

    /// Scoring mode. Fixed for the lifetime of a controller.
    #[serde(default)]
    pub scoring_mode: ScoringMode,

    /// Display delay for a mismatched pair.
    #[serde(default = "default_mismatch_delay")]
    pub mismatch_delay_ms: u64,

    /// Elapsed-time tick period.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Shuffle seed. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

fn default_mismatch_delay() -> u64 {
    DEFAULT_MISMATCH_DELAY_MS
}

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

impl Default for GameConfig {
    fn default() -> Self {
        let easy = DifficultyProfile::new(
            vec![
                SymbolDef::new(1, "Spade", "♠"),
                SymbolDef::new(2, "Heart", "♥"),
                SymbolDef::new(3, "Club", "♣"),
            ],
            1000,
            500,
            300,
        )
        .with_move_limit(20);

        let medium = DifficultyProfile::new(
            vec![
                SymbolDef::new(1, "Diamond", "♦"),
                SymbolDef::new(2, "Star", "★"),
                SymbolDef::new(3, "Moon", "☽"),
                SymbolDef::new(4, "Sun", "☀"),
            ],
            1500,
            750,
            400,
        )
        .with_move_limit(30);

        let hard = DifficultyProfile::new(
            vec![
                SymbolDef::new(1, "Castle", "♔"),
                SymbolDef::new(2, "Knight", "♘"),
                SymbolDef::new(3, "Queen", "♕"),
                SymbolDef::new(4, "King", "♚"),
                SymbolDef::new(5, "Crown", "👑"),
            ],
            2000,
            1000,
            500,
        )
        .with_move_limit(40);

        Self::empty()
            .with_profile(Difficulty::Easy, easy)
            .with_profile(Difficulty::Medium, medium)
            .with_profile(Difficulty::Hard, hard)
    }
}

impl GameConfig {
    /// Configuration with no tiers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            profiles: FxHashMap::default(),
            default_difficulty: default_difficulty(),
            scoring_mode: ScoringMode::default(),
            mismatch_delay_ms: DEFAULT_MISMATCH_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(text: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Add or replace a tier.
    #[must_use]
    pub fn with_profile(mut self, difficulty: Difficulty, profile: DifficultyProfile) -> Self {
        self.profiles.insert(difficulty, profile);
        self
    }

    #[must_use]
    pub fn with_default_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.default_difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_scoring_mode(mut self, mode: ScoringMode) -> Self {
        self.scoring_mode = mode;
        self
    }

    #[must_use]
    pub fn with_mismatch_delay(mut self, delay_ms: u64) -> Self {
        self.mismatch_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Get the profile for a tier.
    pub fn profile(&self, difficulty: Difficulty) -> Result<&DifficultyProfile, GameError> {
        self.profiles
            .get(&difficulty)
            .ok_or(GameError::UnknownDifficulty(difficulty))
    }

    /// Check timing settings and every configured profile.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.profiles.is_empty() {
            return Err(GameError::invalid("no difficulty profiles configured"));
        }
        if self.mismatch_delay_ms == 0 {
            return Err(GameError::invalid("mismatch delay must be non-zero"));
        }
        if self.tick_interval_ms == 0 {
            return Err(GameError::invalid("tick interval must be non-zero"));
        }
        for (difficulty, profile) in &self.profiles {
            profile
                .validate()
                .map_err(|err| GameError::invalid(format!("{difficulty}: {err}")))?;
        }
        Ok(())
    }
}
