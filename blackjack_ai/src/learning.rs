use std::collections::HashMap;
use std::ops::RangeInclusive;

use rand::Rng;

use crate::simulation::hand::Hand;
use crate::{Action, LearningConfig};

/// Player totals covered by the policy chart.
pub const PLAYER_TOTAL_RANGE: RangeInclusive<u16> = 4..=21;
/// Dealer upcard values covered by the policy chart (11 is an Ace).
pub const DEALER_UP_RANGE: RangeInclusive<u16> = 2..=11;

/// The compact learning state: deliberately coarse (no dealer hole card, no
/// shoe composition) so the table stays small enough to learn in a few
/// thousand episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    pub player_total: u16,
    pub dealer_up_value: u16,
    pub usable_ace: bool,
}

impl State {
    /// Abstracts the two hands at a decision point. The dealer's second
    /// dealt card is the face-up one in the rendered layout, so its value
    /// becomes `dealer_up_value` (10 for faces, 11 for an Ace).
    ///
    /// `usable_ace` is set when the player holds any Ace and the hand has
    /// not busted. An Ace already demoted to 1 still sets the flag; the
    /// abstraction only checks for the presence of an Ace under 21.
    ///
    /// Panics if the dealer holds fewer than two cards.
    pub fn from_hands(player_hand: &Hand, dealer_hand: &Hand) -> State {
        let player_total = player_hand.score();
        let upcard = dealer_hand.cards()[1];
        State {
            player_total,
            dealer_up_value: upcard.score_value(),
            usable_ace: player_hand.has_ace() && player_total <= 21,
        }
    }
}

/// Epsilon-greedy tabular Q-learning agent over the two actions.
///
/// The table maps each state to one value per action. States are
/// materialized with neutral values on first sight, so a lookup miss is
/// never an error; the table grows monotonically over a run.
pub struct Agent {
    config: LearningConfig,
    epsilon: f64,
    q_table: HashMap<State, [f64; 2]>,
}

impl Agent {
    pub fn new(config: LearningConfig) -> Agent {
        Agent {
            epsilon: config.initial_epsilon,
            config,
            q_table: HashMap::new(),
        }
    }

    /// With probability epsilon returns a uniformly random action, otherwise
    /// the greedy one.
    pub fn choose_action<R: Rng>(&mut self, state: State, rng: &mut R) -> Action {
        self.q_table.entry(state).or_insert([0.0; 2]);
        if rng.gen::<f64>() < self.epsilon {
            Action::from_index(rng.gen_range(0..2))
        } else {
            self.greedy_action(state)
        }
    }

    /// Argmax over the stored values; an exact tie resolves to Stand. An
    /// unseen state reads as a tie.
    pub fn greedy_action(&self, state: State) -> Action {
        let values = self.q_table.get(&state).copied().unwrap_or([0.0; 2]);
        if values[Action::Hit.index()] > values[Action::Stand.index()] {
            Action::Hit
        } else {
            Action::Stand
        }
    }

    /// Single-step temporal-difference update toward a terminal reward.
    /// Called exactly once per episode, at hand termination, so there is no
    /// successor state to bootstrap from.
    pub fn update(&mut self, state: State, action: Action, reward: f64) {
        let values = self.q_table.entry(state).or_insert([0.0; 2]);
        let old_value = values[action.index()];
        values[action.index()] = old_value + self.config.learning_rate * (reward - old_value);
    }

    /// Multiplicative decay, floored. Monotonically non-increasing.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = self.config.epsilon_floor.max(self.epsilon * self.config.epsilon_decay);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn action_values(&self, state: State) -> Option<[f64; 2]> {
        self.q_table.get(&state).copied()
    }

    /// Number of distinct states the agent has encountered.
    pub fn known_states(&self) -> usize {
        self.q_table.len()
    }

    /// Greedy action for every (player total, dealer upcard) cell with
    /// `usable_ace = false`. Rows follow [`PLAYER_TOTAL_RANGE`], columns
    /// [`DEALER_UP_RANGE`]; unseen cells default to Stand. This feeds the
    /// external policy heatmap.
    pub fn policy_grid(&self) -> Vec<Vec<Action>> {
        PLAYER_TOTAL_RANGE
            .map(|player_total| {
                DEALER_UP_RANGE
                    .map(|dealer_up_value| {
                        self.greedy_action(State {
                            player_total,
                            dealer_up_value,
                            usable_ace: false,
                        })
                    })
                    .collect()
            })
            .collect()
    }
}
