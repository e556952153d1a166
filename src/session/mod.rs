//! Session controller, events and results.
//!
//! ## Key Components
//!
//! - [`SessionController`]: Owns one game and exposes the commands
//!   (`start`, `reveal`, `change_difficulty`, `restart`)
//! - [`GameEvent`]: Push notifications for the presentation layer
//! - [`SessionResult`]: Outcome of a finished session

pub mod controller;
pub mod event;
pub mod summary;

pub use controller::{RevealOutcome, Session, SessionController, SessionStatus};
pub use event::{EventBus, GameEvent, SubscriptionId};
pub use summary::{format_clock, SessionResult};
