//! Core engine types: configuration, errors, RNG.
//!
//! Hosts configure difficulty tiers via `GameConfig` rather than modifying
//! the engine.

pub mod config;
pub mod error;
pub mod rng;

pub use config::{
    Difficulty, DifficultyProfile, GameConfig, SymbolDef, DEFAULT_MISMATCH_DELAY_MS,
    DEFAULT_TICK_INTERVAL_MS,
};
pub use error::{GameError, RejectReason};
pub use rng::GameRng;
