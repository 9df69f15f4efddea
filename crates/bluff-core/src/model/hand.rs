use crate::model::strength::Strength;
use rand::Rng;
use std::vec::Vec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Strength>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Strength>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn deal<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let cards = (0..size).map(|_| Strength::random(rng)).collect();
        Self::with_cards(cards)
    }

    pub fn remove(&mut self, card: Strength) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn weakest(&self) -> Option<Strength> {
        self.cards.first().copied()
    }

    pub fn strongest(&self) -> Option<Strength> {
        self.cards.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strength> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Strength] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards.sort();
    }
}
