mod report;

use blackjack_ai::simulation::NullHandler;
use blackjack_ai::training::Trainer;
use blackjack_ai::GameError;
use blackjack_ai_drivers::{parse_config_from_file, Config};
use clap::Parser;
use log::info;
use rand::Rng;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_ai.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,
    /// Override the number of training episodes from the config
    #[arg(short, long)]
    episodes: Option<u64>,
    /// Seed the shoe and the exploration coin for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,
    /// Render every hand to the console while training
    #[arg(short, long)]
    watch: bool,
    /// Print the learned policy chart when training finishes
    #[arg(short = 'p', long)]
    show_policy: bool,
}

fn main() {
    env_logger::init();
    let args = CommandLineArgs::parse();

    let config = load_config(&args.config);
    let rule = config.rule.clone().into();
    let learning = (&config.trainer).into();
    let episodes = args.episodes.unwrap_or(config.trainer.episodes);
    let seed = args.seed.or(config.trainer.seed);

    let mut trainer = Trainer::new(&rule, learning, seed);
    let result = if args.watch {
        trainer.train(episodes, &mut report::ConsoleHandler::new())
    } else {
        train_in_periods(&mut trainer, episodes, config.trainer.report_period)
    };
    result.expect("training halted");

    report::print_summary(trainer.records(), trainer.agent());
    if args.show_policy {
        report::print_policy_chart(trainer.agent());
    }
}

/// Headless training with a progress line after each reporting period.
fn train_in_periods<R: Rng>(
    trainer: &mut Trainer<R>,
    episodes: u64,
    report_period: u64,
) -> Result<(), GameError> {
    let period = report_period.max(1);
    let mut remaining = episodes;
    while remaining > 0 {
        let batch = remaining.min(period);
        trainer.train(batch, &mut NullHandler)?;
        remaining -= batch;
        info!(
            "{} episodes done: epsilon {:.4}, win rate {:.2}%, {} states",
            trainer.records().episodes(),
            trainer.agent().epsilon(),
            trainer.records().win_rate() * 100.0,
            trainer.agent().known_states(),
        );
    }
    Ok(())
}

fn load_config(path: &str) -> Config {
    if path == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().expect("Cannot find home directory");
        let config_file_path = home_dir.join(".blackjack_ai.yml");
        if !config_file_path.exists() {
            // No config file is fine: train with the defaults.
            return Config::default();
        }
        if config_file_path.is_dir() {
            panic!("This should be a path rather than a directory");
        }
        return parse_config_from_file(config_file_path.to_str().unwrap());
    }
    parse_config_from_file(path)
}
