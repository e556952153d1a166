//! # memory-match
//!
//! Game engine for a tile-matching memory game: a fixed set of paired
//! tokens is shuffled and dealt face-down, and the player reveals two at a
//! time looking for matching pairs in the fewest moves and least time.
//!
//! ## Design Principles
//!
//! 1. **UI-Agnostic**: The engine never renders. It push-notifies
//!    subscribers with [`GameEvent`]s and answers queries.
//!
//! 2. **Injected Collaborators**: Timers go through a [`Scheduler`], best
//!    scores through a [`KeyValueStore`]. Virtual-clock and in-memory
//!    implementations ship with the crate.
//!
//! 3. **No Global State**: One [`SessionController`] owns one game. Two
//!    games are two controllers.
//!
//! ## Modules
//!
//! - `core`: Difficulty tiers, configuration, errors, RNG
//! - `cards`: Card identity and the deck builder
//! - `engine`: Reveal/match state machine
//! - `scoring`: Score and efficiency grade
//! - `schedule`: Cancellable timers
//! - `store`: Best-score persistence
//! - `session`: Session controller, events, results

pub mod core;
pub mod cards;
pub mod engine;
pub mod scoring;
pub mod schedule;
pub mod store;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Difficulty, DifficultyProfile, GameConfig, GameError, GameRng, RejectReason, SymbolDef,
};

pub use crate::cards::{Card, CardState, Deck, InstanceId, InstanceIdAllocator, SymbolId};

pub use crate::engine::{RevealEngine, RevealStep};

pub use crate::scoring::{GameStats, Grade, ScoreResult, ScoringMode};

pub use crate::schedule::{ManualScheduler, Scheduler, TimerKind, TimerTask, TimerToken};

pub use crate::store::{BestScoreStore, KeyValueStore, MemoryStore, RecordOutcome, StoreError};

pub use crate::session::{
    format_clock, GameEvent, RevealOutcome, Session, SessionController, SessionResult,
    SessionStatus,
};
