//! Outbound game events.
//!
//! The engine is UI-agnostic: it push-notifies subscribers and never touches
//! presentation state directly. Hosts subscribe closures on the
//! [`EventBus`] owned by the session controller.
//!
//! ## Event order for one reveal
//!
//! 1. `CardRevealed`
//! 2. `MoveCountChanged` (second card of a pair only)
//! 3. `MatchFound` (on a match)
//! 4. `SessionEnded` (when the reveal ended the game)
//!
//! `MismatchResolved` and `TimeChanged` are emitted from timer callbacks.

use serde::{Deserialize, Serialize};

use crate::cards::{InstanceId, SymbolId};
use crate::core::{Difficulty, RejectReason};
use crate::scoring::Grade;

use super::controller::SessionStatus;

/// Something the presentation layer may want to react to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new deck is dealt and the clock is running.
    SessionStarted {
        difficulty: Difficulty,
        pair_count: u32,
        best: Option<u32>,
    },

    /// A card turned face-up.
    CardRevealed(InstanceId),

    /// Two cards with this token were matched.
    MatchFound(SymbolId),

    /// A mismatched pair flipped back; input resumes.
    MismatchResolved,

    /// The move counter changed.
    MoveCountChanged(u32),

    /// The elapsed-time counter changed.
    TimeChanged(u32),

    /// The session reached a terminal status.
    SessionEnded {
        status: SessionStatus,
        score: u32,
        grade: Grade,
        is_new_best: bool,
    },

    /// Diagnostic: a reveal was ignored.
    InputRejected {
        card: InstanceId,
        reason: RejectReason,
    },

    /// Diagnostic: the best-score backend failed. The game is unaffected.
    StoreWarning(String),
}

impl GameEvent {
    /// Diagnostic events carry no game-state change.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, GameEvent::InputRejected { .. } | GameEvent::StoreWarning(_))
    }
}

/// Identifier returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Subscriber list.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u32,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners run in subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every listener.
    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("event: {event:?}");
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..2 {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |event| seen.borrow_mut().push((tag, event.clone())));
        }

        bus.emit(GameEvent::MoveCountChanged(3));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (0, GameEvent::MoveCountChanged(3)));
        assert_eq!(seen[1], (1, GameEvent::MoveCountChanged(3)));
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        bus.emit(GameEvent::MismatchResolved);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(GameEvent::MismatchResolved);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_diagnostic_classification() {
        assert!(GameEvent::StoreWarning("disk full".into()).is_diagnostic());
        assert!(GameEvent::InputRejected {
            card: InstanceId(1),
            reason: RejectReason::NotAcceptingInput
        }
        .is_diagnostic());
        assert!(!GameEvent::TimeChanged(1).is_diagnostic());
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::SessionEnded {
            status: SessionStatus::Won,
            score: 2650,
            grade: Grade::APlus,
            is_new_best: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
