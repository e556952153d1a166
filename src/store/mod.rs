//! Best-score store.
//!
//! Keeps one best score per (difficulty, scoring mode) and only ever moves
//! it in the better direction for that mode. Durable storage goes through an
//! injected [`KeyValueStore`]; the engine never assumes a medium.
//!
//! Backend failures are non-fatal. The in-memory record stays authoritative
//! for the current run and the failure comes back as a warning.
//!
//! ## Storage layout
//!
//! Key `best_score.<mode>.<difficulty>`, value JSON
//! `{"score": 2650, "mode": "composite"}`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Difficulty;
use crate::scoring::ScoringMode;

/// Key prefix for best-score entries.
pub const KEY_PREFIX: &str = "best_score";

/// Best-score backend failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not read or write.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored value could not be decoded.
    #[error("corrupt best-score entry at '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored entry belongs to a different scoring mode.
    #[error("entry at '{key}' was recorded under {found} scoring")]
    ModeMismatch { key: String, found: ScoringMode },

    /// An entry could not be encoded.
    #[error("failed to encode best-score entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key-value collaborator.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-process key-value store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Serialized form of one best score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScoreEntry {
    pub score: u32,
    pub mode: ScoringMode,
}

/// Result of [`BestScoreStore::record_if_better`].
#[derive(Debug)]
pub struct RecordOutcome {
    /// The candidate became the new best.
    pub updated: bool,

    /// Best score after this call.
    pub current_best: u32,

    /// Backend failure encountered along the way, if any.
    pub warning: Option<StoreError>,
}

/// Per-difficulty best scores with compare-and-update semantics.
#[derive(Debug)]
pub struct BestScoreStore<K: KeyValueStore> {
    backend: K,
    cache: FxHashMap<(Difficulty, ScoringMode), u32>,
}

impl<K: KeyValueStore> BestScoreStore<K> {
    pub fn new(backend: K) -> Self {
        Self {
            backend,
            cache: FxHashMap::default(),
        }
    }

    /// Storage key for a tier and mode.
    #[must_use]
    pub fn key(difficulty: Difficulty, mode: ScoringMode) -> String {
        format!("{KEY_PREFIX}.{mode}.{difficulty}")
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }

    /// Read through to the backend and decode the stored entry.
    fn load(&self, difficulty: Difficulty, mode: ScoringMode) -> Result<Option<u32>, StoreError> {
        let key = Self::key(difficulty, mode);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(None);
        };
        let entry: BestScoreEntry =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.clone(),
                source,
            })?;
        if entry.mode != mode {
            return Err(StoreError::ModeMismatch { key, found: entry.mode });
        }
        Ok(Some(entry.score))
    }

    /// Current best, consulting the backend on first use.
    ///
    /// Backend failures are logged and treated as "no stored best".
    pub fn best(&mut self, difficulty: Difficulty, mode: ScoringMode) -> Option<u32> {
        match self.best_checked(difficulty, mode) {
            Ok(best) => best,
            Err(err) => {
                log::warn!("best-score lookup failed for {difficulty}: {err}");
                None
            }
        }
    }

    /// Current best, surfacing backend failures.
    pub fn best_checked(
        &mut self,
        difficulty: Difficulty,
        mode: ScoringMode,
    ) -> Result<Option<u32>, StoreError> {
        if let Some(best) = self.cache.get(&(difficulty, mode)) {
            return Ok(Some(*best));
        }
        let stored = self.load(difficulty, mode)?;
        if let Some(score) = stored {
            self.cache.insert((difficulty, mode), score);
        }
        Ok(stored)
    }

    /// Record `score` if it beats the current best under `mode`.
    pub fn record_if_better(
        &mut self,
        difficulty: Difficulty,
        score: u32,
        mode: ScoringMode,
    ) -> RecordOutcome {
        let (existing, mut warning) = match self.best_checked(difficulty, mode) {
            Ok(best) => (best, None),
            Err(err) => {
                log::warn!("best-score lookup failed for {difficulty}: {err}");
                (self.cache.get(&(difficulty, mode)).copied(), Some(err))
            }
        };

        let updated = existing.map_or(true, |best| mode.is_better(score, best));
        if !updated {
            return RecordOutcome {
                updated,
                current_best: existing.unwrap_or(score),
                warning,
            };
        }

        self.cache.insert((difficulty, mode), score);
        if let Err(err) = self.persist(difficulty, score, mode) {
            log::warn!("failed to persist best score for {difficulty}: {err}");
            warning = Some(err);
        } else {
            log::debug!("new best for {difficulty} ({mode}): {score}");
        }

        RecordOutcome {
            updated,
            current_best: score,
            warning,
        }
    }

    fn persist(
        &mut self,
        difficulty: Difficulty,
        score: u32,
        mode: ScoringMode,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_string(&BestScoreEntry { score, mode })?;
        self.backend.set(&Self::key(difficulty, mode), value)
    }
}
