use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::learning::Agent;
use crate::simulation::{Table, TableEventHandler};
use crate::{GameError, LearningConfig, Outcome, Rule};

const PROGRESS_LOG_PERIOD: u64 = 1000;

/// Win/loss/draw tallies across a training run. Each terminal episode
/// increments exactly one counter; a bust tallies as a loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Records {
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

impl Records {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Bust | Outcome::Loss => self.losses += 1,
            Outcome::Push => self.draws += 1,
        }
    }

    /// Number of completed episodes.
    pub fn episodes(&self) -> u64 {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f64 {
        if self.episodes() == 0 {
            0.0
        } else {
            self.wins as f64 / self.episodes() as f64
        }
    }
}

/// Everything the learning loop mutates between episodes: the agent
/// (Q-table and exploration rate) and the running record. Owned by the
/// training driver and passed explicitly to the table, never ambient.
pub struct TrainingContext {
    pub agent: Agent,
    pub records: Records,
}

impl TrainingContext {
    pub fn new(config: LearningConfig) -> TrainingContext {
        TrainingContext {
            agent: Agent::new(config),
            records: Records::default(),
        }
    }
}

/// Drives the table through repeated training episodes.
pub struct Trainer<R: Rng> {
    table: Table<R>,
    context: TrainingContext,
}

impl Trainer<StdRng> {
    /// A seeded trainer reproduces its run card for card; `None` seeds from
    /// entropy.
    pub fn new(rule: &Rule, config: LearningConfig, seed: Option<u64>) -> Trainer<StdRng> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Trainer::with_rng(rule, config, rng)
    }
}

impl<R: Rng> Trainer<R> {
    pub fn with_rng(rule: &Rule, config: LearningConfig, rng: R) -> Trainer<R> {
        Trainer {
            table: Table::new(rule, rng),
            context: TrainingContext::new(config),
        }
    }

    /// Runs the given number of complete episodes. The context is consistent
    /// at every episode boundary, so training can be stopped and resumed by
    /// calling this again.
    pub fn train<H: TableEventHandler>(
        &mut self,
        episodes: u64,
        handler: &mut H,
    ) -> Result<(), GameError> {
        for _ in 0..episodes {
            self.table.run_episode(&mut self.context, handler)?;
            let done = self.context.records.episodes();
            if done % PROGRESS_LOG_PERIOD == 0 {
                debug!(
                    "episode {}: epsilon {:.4}, win rate {:.3}, {} states",
                    done,
                    self.context.agent.epsilon(),
                    self.context.records.win_rate(),
                    self.context.agent.known_states(),
                );
            }
        }
        Ok(())
    }

    pub fn agent(&self) -> &Agent {
        &self.context.agent
    }

    pub fn records(&self) -> &Records {
        &self.context.records
    }
}
