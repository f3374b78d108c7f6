pub mod learning;
pub mod simulation;
pub mod training;

use thiserror::Error;

use crate::simulation::GamePhase;

/// Table rules for a training table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    /// The dealer keeps drawing while below this total.
    pub dealer_stand_threshold: u16,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 4,
            dealer_stand_threshold: 17,
        }
    }
}

/// Hyper-parameters of the Q-learning agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningConfig {
    pub learning_rate: f64,
    /// Carried as part of the configuration surface. The agent performs a
    /// single update per episode at hand termination, so there is no
    /// successor state to discount and this value stays inert.
    pub discount_factor: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_floor: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        LearningConfig {
            learning_rate: 0.1,
            discount_factor: 0.95,
            initial_epsilon: 1.0,
            epsilon_decay: 0.9995,
            epsilon_floor: 0.01,
        }
    }
}

/// The two actions the agent chooses between. The discriminants are the
/// indices into the per-state value array, so an argmax tie resolves to
/// Stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Stand = 0,
    Hit = 1,
}

impl Action {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Action {
        match index {
            0 => Action::Stand,
            1 => Action::Hit,
            _ => panic!("Invalid action index!"),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Stand => write!(f, "Stand"),
            Action::Hit => write!(f, "Hit"),
        }
    }
}

/// How a resolved episode ended. A bust is kept separate from an ordinary
/// loss for reporting, but both tally and reward the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Bust,
    Win,
    Loss,
    Push,
}

impl Outcome {
    pub fn reward(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Bust | Outcome::Loss => -1.0,
            Outcome::Push => 0.0,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Bust => "BUST!",
            Outcome::Win => "WIN!",
            Outcome::Loss => "LOSE!",
            Outcome::Push => "PUSH!",
        }
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    /// Drawing from an exhausted shoe. The shoe is refilled before every
    /// episode and a single hand cannot consume a whole deck, so this
    /// signals a broken reset invariant and must halt the run.
    #[error("cannot draw from an empty shoe")]
    EmptyShoe,
    /// A phase-guarded method was invoked out of order.
    #[error("{method} is only allowed in the {expected:?} phase (currently in {found:?})")]
    WrongPhase {
        method: &'static str,
        expected: GamePhase,
        found: GamePhase,
    },
    /// Resolution was reached without a retained player decision. The state
    /// machine never produces this on its own; it guards against a table
    /// whose phase was forced externally.
    #[error("cannot resolve an episode before a player decision")]
    MissingDecision,
}
