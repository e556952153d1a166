//! Reveal/match state machine.
//!
//! Governs which cards are face-up, matched, or pending. At most two cards
//! are ever in the reveal set. When the second card of a pair is revealed
//! the move counter advances by exactly one and the pair is compared in the
//! same call:
//!
//! - **Match**: both cards become `Matched` and leave the reveal set.
//! - **Mismatch**: both stay `FaceUp` and the engine is *resolving* until
//!   [`RevealEngine::resolve_mismatch`] flips them back. Every reveal is
//!   rejected while resolving.
//!
//! The engine knows nothing about time. Scheduling the mismatch delay is the
//! session controller's job.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardState, Deck, InstanceId, SymbolId};
use crate::core::RejectReason;

/// Result of an accepted reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealStep {
    /// First card of a pair is up.
    FirstCard { card: InstanceId },

    /// Second card matched the first.
    Matched {
        first: InstanceId,
        second: InstanceId,
        token: SymbolId,
    },

    /// Second card did not match. The engine is now resolving.
    Mismatched { first: InstanceId, second: InstanceId },
}

impl RevealStep {
    /// The card turned face-up by this step.
    #[must_use]
    pub fn revealed(&self) -> InstanceId {
        match *self {
            RevealStep::FirstCard { card } => card,
            RevealStep::Matched { second, .. } | RevealStep::Mismatched { second, .. } => second,
        }
    }

    /// Whether this step completed a move.
    #[must_use]
    pub fn completes_move(&self) -> bool {
        !matches!(self, RevealStep::FirstCard { .. })
    }
}

/// Reveal/match engine over one deck.
#[derive(Clone, Debug)]
pub struct RevealEngine {
    deck: Deck,
    revealed: SmallVec<[InstanceId; 2]>,
    move_count: u32,
    matched_pairs: u32,
}

impl RevealEngine {
    /// Take ownership of a freshly built deck.
    #[must_use]
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            revealed: SmallVec::new(),
            move_count: 0,
            matched_pairs: 0,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Completed pair comparisons.
    #[must_use]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Tokens matched so far.
    #[must_use]
    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    #[must_use]
    pub fn pair_count(&self) -> u32 {
        self.deck.pair_count() as u32
    }

    /// Face-up, unmatched cards (0 to 2).
    #[must_use]
    pub fn revealed(&self) -> &[InstanceId] {
        &self.revealed
    }

    /// True while a mismatched pair is waiting to flip back.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.revealed.len() == 2
    }

    /// All pairs matched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.pair_count()
    }

    fn check_revealable(&self, id: InstanceId) -> Result<(), RejectReason> {
        let card = self.deck.get(id).ok_or(RejectReason::UnknownCard)?;
        if self.is_resolving() || card.is_matched() || self.revealed.contains(&id) {
            return Err(RejectReason::NotAcceptingInput);
        }
        Ok(())
    }

    /// Turn a card face-up.
    ///
    /// `move_limit` is the tier's limit; `None` is unlimited. Reaching the
    /// limit is reported as `MoveLimitReached` and leaves the board as is.
    pub fn reveal(
        &mut self,
        id: InstanceId,
        move_limit: Option<u32>,
    ) -> Result<RevealStep, RejectReason> {
        self.check_revealable(id)?;
        if move_limit.is_some_and(|limit| self.move_count >= limit) {
            return Err(RejectReason::MoveLimitReached);
        }

        self.deck.set_state(id, CardState::FaceUp);
        self.revealed.push(id);

        if self.revealed.len() < 2 {
            return Ok(RevealStep::FirstCard { card: id });
        }

        self.move_count += 1;
        let (first, second) = (self.revealed[0], self.revealed[1]);
        let first_token = self.deck.get(first).map(|c| c.token);
        let second_token = self.deck.get(second).map(|c| c.token);

        match (first_token, second_token) {
            (Some(a), Some(b)) if a == b => {
                self.deck.set_state(first, CardState::Matched);
                self.deck.set_state(second, CardState::Matched);
                self.revealed.clear();
                self.matched_pairs += 1;
                Ok(RevealStep::Matched { first, second, token: a })
            }
            _ => Ok(RevealStep::Mismatched { first, second }),
        }
    }

    /// Flip a mismatched pair back face-down and resume input.
    ///
    /// Returns the pair, or `None` when nothing was resolving.
    pub fn resolve_mismatch(&mut self) -> Option<(InstanceId, InstanceId)> {
        if !self.is_resolving() {
            return None;
        }
        let (first, second) = (self.revealed[0], self.revealed[1]);
        self.deck.set_state(first, CardState::FaceDown);
        self.deck.set_state(second, CardState::FaceDown);
        self.revealed.clear();
        Some((first, second))
    }
}
