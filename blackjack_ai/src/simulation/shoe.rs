use super::{Card, Suit};
use crate::GameError;

use strum::IntoEnumIterator;

use rand::Rng;

/// Represents a shoe in the real world: one or more full decks combined.
/// Cards are drawn uniformly at random without replacement; the table
/// refills the shoe before every episode.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    cards: Vec<Card>,
}

impl Shoe {
    /// Creates a full shoe with `number_of_decks` times 52 cards.
    pub fn new(number_of_decks: u8) -> Shoe {
        let mut shoe = Shoe {
            number_of_decks,
            cards: Vec::with_capacity(number_of_decks as usize * 52),
        };
        shoe.refill();
        shoe
    }

    /// Returns all dealt cards to the shoe, restoring the full composition.
    pub fn refill(&mut self) {
        self.cards.clear();
        for _ in 0..self.number_of_decks {
            for suit in Suit::iter() {
                for face_value in 1..=13 {
                    self.cards.push(Card { face_value, suit });
                }
            }
        }
    }

    /// Removes and returns a uniformly random remaining card. Drawing from
    /// an empty shoe is a hard error, never a silent no-op.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Result<Card, GameError> {
        if self.cards.is_empty() {
            return Err(GameError::EmptyShoe);
        }
        let index = rng.gen_range(0..self.cards.len());
        Ok(self.cards.swap_remove(index))
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}
