//! Deck building and the deck container.
//!
//! `Deck::build` duplicates each token, gives every copy a fresh
//! `InstanceId`, and applies a uniform shuffle. After that the composition
//! of a deck never changes; only per-card `state` does.
//!
//! Cards live in an `im::Vector`, so cloning a deck for the presentation
//! layer is O(1).

use im::Vector;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use super::card::{Card, CardState, InstanceId, InstanceIdAllocator, SymbolId};
use crate::core::{GameError, GameRng};

/// Ordered, shuffled sequence of cards.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Deck {
    cards: Vector<Card>,
    #[serde(skip)]
    positions: FxHashMap<InstanceId, usize>,
}

impl Deck {
    /// Build a shuffled deck holding exactly two cards per token.
    ///
    /// Fails with `InvalidConfiguration` for an empty or duplicated token
    /// list. Nothing is allocated on failure.
    pub fn build(
        tokens: &[SymbolId],
        rng: &mut GameRng,
        ids: &mut InstanceIdAllocator,
    ) -> Result<Self, GameError> {
        if tokens.is_empty() {
            return Err(GameError::invalid("symbol catalog is empty"));
        }
        let mut seen = FxHashSet::default();
        if let Some(dup) = tokens.iter().find(|t| !seen.insert(**t)) {
            return Err(GameError::invalid(format!("duplicate symbol {dup} in catalog")));
        }

        let mut cards: Vec<Card> = Vec::with_capacity(tokens.len() * 2);
        for &token in tokens {
            cards.push(Card::new(token, ids.alloc()));
            cards.push(Card::new(token, ids.alloc()));
        }
        rng.shuffle(&mut cards);

        Ok(Self::from_cards(cards))
    }

    fn from_cards(cards: Vec<Card>) -> Self {
        let positions = cards
            .iter()
            .enumerate()
            .map(|(i, c)| (c.instance_id, i))
            .collect();
        Self {
            cards: cards.into_iter().collect(),
            positions,
        }
    }

    /// Number of cards (twice the pair count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// Cards in board order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Card at a board position.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Card> {
        self.cards.get(position)
    }

    /// Board position of an instance.
    #[must_use]
    pub fn position_of(&self, id: InstanceId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Look up a card by instance id.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&Card> {
        self.position_of(id).and_then(|i| self.cards.get(i))
    }

    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Change the state of one card. Returns false for unknown ids.
    pub(crate) fn set_state(&mut self, id: InstanceId, state: CardState) -> bool {
        match self.position_of(id).and_then(|i| self.cards.get_mut(i)) {
            Some(card) => {
                card.state = state;
                true
            }
            None => false,
        }
    }

    /// Count of cards in a given state.
    #[must_use]
    pub fn count_in_state(&self, state: CardState) -> usize {
        self.cards.iter().filter(|c| c.state == state).count()
    }

    /// Instance ids of the two copies of a token, in board order.
    #[must_use]
    pub fn instances_of(&self, token: SymbolId) -> Vec<InstanceId> {
        self.cards
            .iter()
            .filter(|c| c.token == token)
            .map(|c| c.instance_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u16) -> Vec<SymbolId> {
        (1..=n).map(SymbolId::new).collect()
    }

    #[test]
    fn test_build_two_per_token() {
        let mut rng = GameRng::new(42);
        let mut ids = InstanceIdAllocator::new();
        let deck = Deck::build(&tokens(4), &mut rng, &mut ids).unwrap();

        assert_eq!(deck.len(), 8);
        assert_eq!(deck.pair_count(), 4);
        for token in tokens(4) {
            assert_eq!(deck.instances_of(token).len(), 2);
        }
        assert_eq!(deck.count_in_state(CardState::FaceDown), 8);
    }

    #[test]
    fn test_instance_ids_unique() {
        let mut rng = GameRng::new(42);
        let mut ids = InstanceIdAllocator::new();
        let first = Deck::build(&tokens(3), &mut rng, &mut ids).unwrap();
        let second = Deck::build(&tokens(3), &mut rng, &mut ids).unwrap();

        let mut all: Vec<_> = first.iter().chain(second.iter()).map(|c| c.instance_id).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 12);
        for card in first.iter() {
            assert!(!second.contains(card.instance_id));
        }
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let mut rng = GameRng::new(42);
        let mut ids = InstanceIdAllocator::new();
        let err = Deck::build(&[], &mut rng, &mut ids).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration(_)));
        assert_eq!(ids.peek(), InstanceId(0));
    }

    #[test]
    fn test_duplicate_tokens_rejected() {
        let mut rng = GameRng::new(42);
        let mut ids = InstanceIdAllocator::new();
        let dup = [SymbolId::new(1), SymbolId::new(2), SymbolId::new(1)];
        assert!(Deck::build(&dup, &mut rng, &mut ids).is_err());
    }

    #[test]
    fn test_deterministic_with_seed() {
        let order = |seed| {
            let mut rng = GameRng::new(seed);
            let mut ids = InstanceIdAllocator::new();
            let deck = Deck::build(&tokens(5), &mut rng, &mut ids).unwrap();
            deck.iter().map(|c| c.instance_id).collect::<Vec<_>>()
        };
        assert_eq!(order(7), order(7));
        assert_ne!(order(7), order(8));
    }

    #[test]
    fn test_lookup_and_set_state() {
        let mut rng = GameRng::new(1);
        let mut ids = InstanceIdAllocator::new();
        let mut deck = Deck::build(&tokens(2), &mut rng, &mut ids).unwrap();

        let id = deck.at(0).unwrap().instance_id;
        assert_eq!(deck.position_of(id), Some(0));
        assert!(deck.set_state(id, CardState::FaceUp));
        assert!(deck.get(id).unwrap().is_face_up());

        assert!(!deck.set_state(InstanceId(999), CardState::FaceUp));
        assert!(deck.get(InstanceId(999)).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rng = GameRng::new(1);
        let mut ids = InstanceIdAllocator::new();
        let mut deck = Deck::build(&tokens(2), &mut rng, &mut ids).unwrap();
        let snapshot = deck.clone();

        let id = deck.at(0).unwrap().instance_id;
        deck.set_state(id, CardState::Matched);

        assert!(deck.get(id).unwrap().is_matched());
        assert!(snapshot.get(id).unwrap().is_face_down());
    }
}
