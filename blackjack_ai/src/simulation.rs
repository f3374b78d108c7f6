pub mod hand;
pub mod shoe;

use crate::learning::State;
use crate::training::{Records, TrainingContext};
use crate::{Action, GameError, Outcome, Rule};
use blackjack_ai_macros::allowed_phase;
use rand::Rng;
use strum_macros::EnumIter;

use self::hand::Hand;
use self::shoe::Shoe;

static FACE_VALUE_TO_SCORE_VALUE: [u16; 13] = [11, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

/// Represents a card in the real world with a suit and a face value.
/// Scoring ignores the suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub face_value: u8,
    pub suit: Suit,
}

impl Card {
    /// The value the card contributes to a hand before any Ace demotion:
    /// J, Q and K count 10, an Ace starts at 11.
    pub fn score_value(&self) -> u16 {
        FACE_VALUE_TO_SCORE_VALUE[(self.face_value - 1) as usize]
    }

    pub fn is_ace(&self) -> bool {
        self.face_value == 1
    }
}

impl Default for Card {
    fn default() -> Self {
        Card {
            face_value: 1,
            suit: Suit::Diamond,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        };
        let value = match self.face_value {
            1 => 'A',
            2 => '2',
            3 => '3',
            4 => '4',
            5 => '5',
            6 => '6',
            7 => '7',
            8 => '8',
            9 => '9',
            10 => 'T',
            11 => 'J',
            12 => 'Q',
            13 => 'K',
            _ => panic!("Invalid card face value!"),
        };
        write!(f, "{}{}", suit, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Dealing,
    PlayerTurn,
    DealerTurn,
    Resolved,
}

/// Simulates one blackjack table played by the learning agent against the
/// dealer. The table is an explicit state machine advanced one discrete tick
/// at a time by [`Table::step`], so a rendering loop and headless training
/// share the same core. Phase methods reject out-of-order calls with
/// [`GameError::WrongPhase`].
pub struct Table<R: Rng> {
    rule: Rule,
    phase: GamePhase,
    shoe: Shoe,
    player_hand: Hand,
    dealer_hand: Hand,
    dealer_revealed: bool,
    last_decision: Option<(State, Action)>,
    rng: R,
}

impl<R: Rng> Table<R> {
    pub fn new(rule: &Rule, rng: R) -> Self {
        Table {
            rule: *rule,
            phase: GamePhase::Dealing,
            shoe: Shoe::new(rule.number_of_decks),
            player_hand: Hand::new(),
            dealer_hand: Hand::new(),
            dealer_revealed: false,
            last_decision: None,
            rng,
        }
    }

    /// Advances the state machine by one tick. Returns the outcome when this
    /// tick resolved an episode, `None` otherwise.
    pub fn step<H: TableEventHandler>(
        &mut self,
        context: &mut TrainingContext,
        handler: &mut H,
    ) -> Result<Option<Outcome>, GameError> {
        match self.phase {
            GamePhase::Dealing => {
                self.deal_initial_cards(handler)?;
                Ok(None)
            }
            GamePhase::PlayerTurn => {
                self.play_player_decision(context, handler)?;
                Ok(None)
            }
            GamePhase::DealerTurn => {
                self.play_dealer_tick(handler)?;
                Ok(None)
            }
            GamePhase::Resolved => Ok(Some(self.resolve(context, handler)?)),
        }
    }

    /// Runs ticks until the current episode resolves.
    pub fn run_episode<H: TableEventHandler>(
        &mut self,
        context: &mut TrainingContext,
        handler: &mut H,
    ) -> Result<Outcome, GameError> {
        loop {
            if let Some(outcome) = self.step(context, handler)? {
                return Ok(outcome);
            }
        }
    }

    /// Can be called at Dealing phase.
    /// Refills the shoe, clears both hands and deals two cards each to the
    /// player and the dealer, alternating. The dealer's first card stays
    /// face down.
    #[allowed_phase(Dealing)]
    pub fn deal_initial_cards<H: TableEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), GameError> {
        self.shoe.refill();
        self.player_hand.clear();
        self.dealer_hand.clear();
        self.dealer_revealed = false;
        self.last_decision = None;

        for _ in 0..2 {
            let card = self.shoe.draw(&mut self.rng)?;
            self.player_hand.receive_card(card);
            let card = self.shoe.draw(&mut self.rng)?;
            self.dealer_hand.receive_card(card);
        }

        self.phase = GamePhase::PlayerTurn;
        handler.on_deal_cards(&self.player_hand, &self.dealer_hand);
        Ok(())
    }

    /// Can be called at PlayerTurn phase.
    /// Asks the agent for one decision. A Hit draws one card and ends the
    /// turn only on a bust; a Stand ends the turn immediately. The
    /// (state, action) pair is retained so the decision that ended the turn
    /// receives the terminal update at resolution.
    #[allowed_phase(PlayerTurn)]
    pub fn play_player_decision<H: TableEventHandler>(
        &mut self,
        context: &mut TrainingContext,
        handler: &mut H,
    ) -> Result<Action, GameError> {
        let state = State::from_hands(&self.player_hand, &self.dealer_hand);
        let action = context.agent.choose_action(state, &mut self.rng);
        self.last_decision = Some((state, action));

        match action {
            Action::Hit => {
                let card = self.shoe.draw(&mut self.rng)?;
                self.player_hand.receive_card(card);
                if self.player_hand.score() > 21 {
                    self.end_player_turn();
                }
            }
            Action::Stand => self.end_player_turn(),
        }

        handler.on_decision(state, action, &self.player_hand);
        Ok(action)
    }

    /// Can be called at DealerTurn phase.
    /// One tick draws at most one card: the dealer keeps drawing while below
    /// the stand threshold and the player has not busted. Returns true once
    /// the dealer is done and the table moved to Resolved.
    #[allowed_phase(DealerTurn)]
    pub fn play_dealer_tick<H: TableEventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<bool, GameError> {
        if self.dealer_hand.score() < self.rule.dealer_stand_threshold
            && self.player_hand.score() <= 21
        {
            let card = self.shoe.draw(&mut self.rng)?;
            self.dealer_hand.receive_card(card);
            handler.on_dealer_draw(&self.dealer_hand);
            Ok(false)
        } else {
            self.phase = GamePhase::Resolved;
            Ok(true)
        }
    }

    /// Can be called at Resolved phase.
    /// Compares the two hands, applies the terminal Q-update for the decision
    /// that ended the player's turn, tallies the record, decays epsilon and
    /// moves back to Dealing for the next episode.
    #[allowed_phase(Resolved)]
    pub fn resolve<H: TableEventHandler>(
        &mut self,
        context: &mut TrainingContext,
        handler: &mut H,
    ) -> Result<Outcome, GameError> {
        let player_score = self.player_hand.score();
        let dealer_score = self.dealer_hand.score();
        let outcome = if player_score > 21 {
            Outcome::Bust
        } else if dealer_score > 21 || player_score > dealer_score {
            Outcome::Win
        } else if player_score < dealer_score {
            Outcome::Loss
        } else {
            Outcome::Push
        };

        let (state, action) = self
            .last_decision
            .take()
            .ok_or(GameError::MissingDecision)?;
        context.agent.update(state, action, outcome.reward());
        context.records.record(outcome);
        context.agent.decay_epsilon();

        self.phase = GamePhase::Dealing;
        handler.on_outcome(outcome, &self.player_hand, &self.dealer_hand, &context.records);
        Ok(outcome)
    }

    fn end_player_turn(&mut self) {
        self.dealer_revealed = true;
        self.phase = GamePhase::DealerTurn;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player_hand(&self) -> &Hand {
        &self.player_hand
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    /// Whether the dealer's hole card is face up (true from the end of the
    /// player's turn until the next deal).
    pub fn dealer_revealed(&self) -> bool {
        self.dealer_revealed
    }
}

/// Render sink for the table. Implementations draw hands and outcomes to a
/// display surface; the core never blocks on them.
pub trait TableEventHandler {
    fn on_deal_cards(&mut self, player_hand: &Hand, dealer_hand: &Hand);
    fn on_decision(&mut self, state: State, action: Action, player_hand: &Hand);
    fn on_dealer_draw(&mut self, dealer_hand: &Hand);
    fn on_outcome(
        &mut self,
        outcome: Outcome,
        player_hand: &Hand,
        dealer_hand: &Hand,
        records: &Records,
    );
}

/// Event handler for headless training: ignores every event.
pub struct NullHandler;

impl TableEventHandler for NullHandler {
    fn on_deal_cards(&mut self, _: &Hand, _: &Hand) {}
    fn on_decision(&mut self, _: State, _: Action, _: &Hand) {}
    fn on_dealer_draw(&mut self, _: &Hand) {}
    fn on_outcome(&mut self, _: Outcome, _: &Hand, _: &Hand, _: &Records) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LearningConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(face_value: u8) -> Card {
        Card {
            face_value,
            suit: Suit::Spade,
        }
    }

    fn table_with_hands(player: &[u8], dealer: &[u8], phase: GamePhase) -> Table<StdRng> {
        let mut table = Table::new(&Rule::default(), StdRng::seed_from_u64(7));
        for &face_value in player {
            table.player_hand.receive_card(card(face_value));
        }
        for &face_value in dealer {
            table.dealer_hand.receive_card(card(face_value));
        }
        table.phase = phase;
        table
    }

    fn greedy_context() -> TrainingContext {
        TrainingContext::new(LearningConfig {
            initial_epsilon: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn dealing_gives_two_cards_each() {
        let mut table = Table::new(&Rule::default(), StdRng::seed_from_u64(1));
        table.deal_initial_cards(&mut NullHandler).unwrap();
        assert_eq!(table.player_hand().cards().len(), 2);
        assert_eq!(table.dealer_hand().cards().len(), 2);
        assert_eq!(table.shoe.remaining(), 4 * 52 - 4);
        assert_eq!(table.phase(), GamePhase::PlayerTurn);
        assert!(!table.dealer_revealed());
    }

    #[test]
    fn first_decision_of_an_untrained_agent_is_stand() {
        // Both values start at 0.0, and an exact tie resolves to Stand.
        let mut table = table_with_hands(&[10, 9], &[6, 7], GamePhase::PlayerTurn);
        let mut context = greedy_context();

        let action = table
            .play_player_decision(&mut context, &mut NullHandler)
            .unwrap();

        assert_eq!(action, Action::Stand);
        assert_eq!(table.player_hand().cards().len(), 2);
        assert_eq!(table.phase(), GamePhase::DealerTurn);
        assert!(table.dealer_revealed());
        let (state, action) = table.last_decision.unwrap();
        assert_eq!(
            state,
            State {
                player_total: 19,
                dealer_up_value: 7,
                usable_ace: false,
            }
        );
        assert_eq!(action, Action::Stand);
    }

    #[test]
    fn hit_draws_one_card_and_may_keep_the_turn() {
        let mut table = table_with_hands(&[2, 3], &[6, 7], GamePhase::PlayerTurn);
        let mut context = greedy_context();
        // Bias the agent so that Hit is the greedy choice for the dealt state.
        let state = State::from_hands(table.player_hand(), table.dealer_hand());
        context.agent.update(state, Action::Hit, 1.0);

        let action = table
            .play_player_decision(&mut context, &mut NullHandler)
            .unwrap();

        assert_eq!(action, Action::Hit);
        assert_eq!(table.player_hand().cards().len(), 3);
        // 2 + 3 plus any card cannot bust, so the turn continues.
        assert_eq!(table.phase(), GamePhase::PlayerTurn);
    }

    #[test]
    fn dealer_draws_below_threshold() {
        let mut table = table_with_hands(&[10, 9], &[10, 6], GamePhase::DealerTurn);
        let finished = table.play_dealer_tick(&mut NullHandler).unwrap();
        assert!(!finished);
        assert_eq!(table.dealer_hand().cards().len(), 3);
        assert_eq!(table.phase(), GamePhase::DealerTurn);
    }

    #[test]
    fn dealer_stands_at_threshold() {
        let mut table = table_with_hands(&[10, 9], &[10, 7], GamePhase::DealerTurn);
        let finished = table.play_dealer_tick(&mut NullHandler).unwrap();
        assert!(finished);
        assert_eq!(table.dealer_hand().cards().len(), 2);
        assert_eq!(table.phase(), GamePhase::Resolved);
    }

    #[test]
    fn dealer_does_not_draw_against_a_busted_player() {
        let mut table = table_with_hands(&[10, 9, 5], &[10, 6], GamePhase::DealerTurn);
        let finished = table.play_dealer_tick(&mut NullHandler).unwrap();
        assert!(finished);
        assert_eq!(table.dealer_hand().cards().len(), 2);
        assert_eq!(table.phase(), GamePhase::Resolved);
    }

    #[test]
    fn bust_resolves_as_loss_regardless_of_dealer_hand() {
        let mut table = table_with_hands(&[10, 9, 5], &[10, 6], GamePhase::Resolved);
        let state = State {
            player_total: 24,
            dealer_up_value: 6,
            usable_ace: false,
        };
        table.last_decision = Some((state, Action::Hit));
        let mut context = greedy_context();

        let outcome = table.resolve(&mut context, &mut NullHandler).unwrap();

        assert_eq!(outcome, Outcome::Bust);
        assert_eq!(context.records.losses, 1);
        assert_eq!(context.records.wins, 0);
        let values = context.agent.action_values(state).unwrap();
        // 0.0 + 0.1 * (-1.0 - 0.0)
        assert!((values[Action::Hit.index()] + 0.1).abs() < 1e-12);
        assert_eq!(table.phase(), GamePhase::Dealing);
    }

    #[test]
    fn equal_scores_resolve_as_push_with_zero_reward() {
        let mut table = table_with_hands(&[10, 10], &[10, 10], GamePhase::Resolved);
        let state = State {
            player_total: 20,
            dealer_up_value: 10,
            usable_ace: false,
        };
        table.last_decision = Some((state, Action::Stand));
        let mut context = greedy_context();

        let outcome = table.resolve(&mut context, &mut NullHandler).unwrap();

        assert_eq!(outcome, Outcome::Push);
        assert_eq!(context.records.draws, 1);
        let values = context.agent.action_values(state).unwrap();
        assert_eq!(values[Action::Stand.index()], 0.0);
    }

    #[test]
    fn dealer_bust_resolves_as_win() {
        let mut table = table_with_hands(&[10, 9], &[10, 6, 10], GamePhase::Resolved);
        let state = State {
            player_total: 19,
            dealer_up_value: 6,
            usable_ace: false,
        };
        table.last_decision = Some((state, Action::Stand));
        let mut context = greedy_context();

        let outcome = table.resolve(&mut context, &mut NullHandler).unwrap();

        assert_eq!(outcome, Outcome::Win);
        assert_eq!(context.records.wins, 1);
        let values = context.agent.action_values(state).unwrap();
        assert!((values[Action::Stand.index()] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn resolution_decays_epsilon_once() {
        let mut table = table_with_hands(&[10, 10], &[10, 9], GamePhase::Resolved);
        table.last_decision = Some((
            State {
                player_total: 20,
                dealer_up_value: 9,
                usable_ace: false,
            },
            Action::Stand,
        ));
        let mut context = TrainingContext::new(LearningConfig::default());

        table.resolve(&mut context, &mut NullHandler).unwrap();

        assert!((context.agent.epsilon() - 0.9995).abs() < 1e-12);
    }

    #[test]
    fn phase_guards_reject_out_of_order_calls() {
        let mut table = Table::new(&Rule::default(), StdRng::seed_from_u64(3));
        assert_eq!(table.phase(), GamePhase::Dealing);

        let result = table.play_dealer_tick(&mut NullHandler);
        assert!(matches!(
            result,
            Err(GameError::WrongPhase {
                expected: GamePhase::DealerTurn,
                found: GamePhase::Dealing,
                ..
            })
        ));

        let mut context = greedy_context();
        let result = table.resolve(&mut context, &mut NullHandler);
        assert!(result.is_err());
    }

    #[test]
    fn resolution_without_a_decision_is_an_error() {
        // A table whose phase was forced to Resolved with no retained
        // decision must fail loudly instead of updating anything.
        let mut table = table_with_hands(&[10, 9], &[10, 7], GamePhase::Resolved);
        let mut context = greedy_context();

        let result = table.resolve(&mut context, &mut NullHandler);

        assert!(matches!(result, Err(GameError::MissingDecision)));
        assert_eq!(context.records.episodes(), 0);
        assert_eq!(context.agent.known_states(), 0);
    }

    #[test]
    fn full_episode_runs_to_a_single_tally() {
        let mut table = Table::new(&Rule::default(), StdRng::seed_from_u64(11));
        let mut context = TrainingContext::new(LearningConfig::default());

        let outcome = table.run_episode(&mut context, &mut NullHandler).unwrap();

        assert_eq!(context.records.episodes(), 1);
        match outcome {
            Outcome::Win => assert_eq!(context.records.wins, 1),
            Outcome::Bust | Outcome::Loss => assert_eq!(context.records.losses, 1),
            Outcome::Push => assert_eq!(context.records.draws, 1),
        }
        assert_eq!(table.phase(), GamePhase::Dealing);
    }
}
