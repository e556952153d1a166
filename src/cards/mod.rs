//! Cards and decks.
//!
//! ## Key Types
//!
//! - `SymbolId`: Pair token (two cards share one)
//! - `InstanceId`: Unique id of one physical card
//! - `Card`: Token, instance id and `CardState`
//! - `Deck`: Shuffled sequence of cards, two per token

pub mod card;
pub mod deck;

pub use card::{Card, CardState, InstanceId, InstanceIdAllocator, SymbolId};
pub use deck::Deck;
