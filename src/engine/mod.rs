//! Reveal/match engine.
//!
//! Pure board logic: which cards are up, the move counter, matched pairs.
//! Timing and session status live in `session`.

pub mod reveal;

pub use reveal::{RevealEngine, RevealStep};
