use blackjack_ai::{LearningConfig, Rule};
use serde::{Deserialize, Serialize};
use std::fs;

/// Contents of the trainer's YAML config file. Every field falls back to
/// its default, so a partial file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub trainer: ConfigTrainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub dealer_stand_threshold: u16,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            dealer_stand_threshold: rule.dealer_stand_threshold,
        }
    }
}

impl From<ConfigRule> for Rule {
    fn from(config: ConfigRule) -> Rule {
        Rule {
            number_of_decks: config.number_of_decks,
            dealer_stand_threshold: config.dealer_stand_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigTrainer {
    pub episodes: u64,
    /// Progress is reported every this many episodes in headless runs.
    pub report_period: u64,
    /// Seed for the shoe and the exploration coin; omit for an entropy seed.
    pub seed: Option<u64>,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_floor: f64,
}

impl Default for ConfigTrainer {
    fn default() -> Self {
        let learning = LearningConfig::default();
        ConfigTrainer {
            episodes: 10_000,
            report_period: 1_000,
            seed: None,
            learning_rate: learning.learning_rate,
            discount_factor: learning.discount_factor,
            initial_epsilon: learning.initial_epsilon,
            epsilon_decay: learning.epsilon_decay,
            epsilon_floor: learning.epsilon_floor,
        }
    }
}

impl From<&ConfigTrainer> for LearningConfig {
    fn from(config: &ConfigTrainer) -> LearningConfig {
        LearningConfig {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            initial_epsilon: config.initial_epsilon,
            epsilon_decay: config.epsilon_decay,
            epsilon_floor: config.epsilon_floor,
        }
    }
}

/// Reads the content of a given config file and parses it to a Config.
///
/// Panics if any error occurs.
pub fn parse_config_from_file(filename: &str) -> Config {
    let file_content = fs::read_to_string(filename).unwrap();
    serde_yaml::from_str(&file_content).unwrap()
}
