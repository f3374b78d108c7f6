use super::Card;

/// The ordered cards held by one participant. Order is irrelevant to scoring
/// but preserved for display.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(8),
        }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn has_ace(&self) -> bool {
        self.cards.iter().any(|card| card.is_ace())
    }

    /// Best achievable blackjack total. Aces start at 11 and are demoted to 1
    /// one at a time while the total exceeds 21, so the result is the highest
    /// total not above 21, or the minimal total of a busted hand.
    pub fn score(&self) -> u16 {
        let mut total: u16 = self.cards.iter().map(|card| card.score_value()).sum();
        let mut elevens = self.cards.iter().filter(|card| card.is_ace()).count();
        while total > 21 && elevens > 0 {
            total -= 10;
            elevens -= 1;
        }
        total
    }
}
