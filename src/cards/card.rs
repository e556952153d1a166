//! Card identity and per-card state.
//!
//! A `Card` is one physical tile. Two cards share a `SymbolId` (the pair
//! token); each has its own `InstanceId`.

use serde::{Deserialize, Serialize};

/// Pair token. Two cards in a deck carry the same symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u16);

impl SymbolId {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Unique identifier for one physical card.
///
/// Unique across every deck built from the same [`InstanceIdAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// Monotonic instance id source.
///
/// Never hands out the same id twice, so ids from a discarded deck cannot
/// alias cards of the next one.
#[derive(Clone, Debug, Default)]
pub struct InstanceIdAllocator {
    next: u32,
}

impl InstanceIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn alloc(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Id the next call to `alloc` will return.
    #[must_use]
    pub fn peek(&self) -> InstanceId {
        InstanceId(self.next)
    }
}

/// Per-card visibility state.
///
/// `FaceDown -> FaceUp -> {Matched | FaceDown}`. `Matched` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

/// A card on the board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Pair token.
    pub token: SymbolId,

    /// Unique id of this copy.
    pub instance_id: InstanceId,

    /// Current visibility.
    pub state: CardState,
}

impl Card {
    /// Create a face-down card.
    #[must_use]
    pub fn new(token: SymbolId, instance_id: InstanceId) -> Self {
        Self {
            token,
            instance_id,
            state: CardState::FaceDown,
        }
    }

    #[must_use]
    pub fn is_face_down(&self) -> bool {
        self.state == CardState::FaceDown
    }

    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.state == CardState::FaceUp
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.state == CardState::Matched
    }

    /// Whether the symbol is showing (face-up or matched).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state != CardState::FaceDown
    }
}
