use blackjack_ai::learning::{Agent, State, DEALER_UP_RANGE, PLAYER_TOTAL_RANGE};
use blackjack_ai::simulation::hand::Hand;
use blackjack_ai::simulation::TableEventHandler;
use blackjack_ai::training::Records;
use blackjack_ai::{Action, Outcome};
use colored::Colorize;

/// Render sink for --watch mode: draws each hand to the console with the
/// dealer's hole card masked until the player's turn ends.
#[derive(Debug, Default)]
pub struct ConsoleHandler;

impl ConsoleHandler {
    pub fn new() -> ConsoleHandler {
        ConsoleHandler
    }
}

fn format_hand(hand: &Hand, mask_hole_card: bool) -> String {
    hand.cards()
        .iter()
        .enumerate()
        .map(|(i, card)| {
            if mask_hole_card && i == 0 {
                String::from("???")
            } else {
                card.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl TableEventHandler for ConsoleHandler {
    fn on_deal_cards(&mut self, player_hand: &Hand, dealer_hand: &Hand) {
        println!("Dealer: {}", format_hand(dealer_hand, true));
        println!(
            "Player: {}  ({})",
            format_hand(player_hand, false),
            player_hand.score()
        );
    }

    fn on_decision(&mut self, state: State, action: Action, player_hand: &Hand) {
        println!(
            "  ({}, {}, {}) -> {}   hand: {}  ({})",
            state.player_total,
            state.dealer_up_value,
            state.usable_ace,
            action,
            format_hand(player_hand, false),
            player_hand.score(),
        );
    }

    fn on_dealer_draw(&mut self, dealer_hand: &Hand) {
        println!(
            "Dealer draws: {}  ({})",
            format_hand(dealer_hand, false),
            dealer_hand.score()
        );
    }

    fn on_outcome(
        &mut self,
        outcome: Outcome,
        player_hand: &Hand,
        dealer_hand: &Hand,
        records: &Records,
    ) {
        let message = match outcome {
            Outcome::Win => outcome.message().green(),
            _ => outcome.message().red(),
        };
        println!(
            "{}  Dealer {} ({}) vs Player {} ({})",
            message,
            format_hand(dealer_hand, false),
            dealer_hand.score(),
            format_hand(player_hand, false),
            player_hand.score(),
        );
        println!(
            "Episode {}: Wins: {}  Losses: {}  Draws: {}",
            records.episodes(),
            records.wins,
            records.losses,
            records.draws
        );
        println!();
    }
}

pub fn print_summary(records: &Records, agent: &Agent) {
    println!("Episodes: {}", records.episodes());
    println!(
        "Wins: {}  Losses: {}  Draws: {}  Win rate: {:.2}%",
        records.wins,
        records.losses,
        records.draws,
        records.win_rate() * 100.0
    );
    println!(
        "Exploration rate: {:.4}   States learned: {}",
        agent.epsilon(),
        agent.known_states()
    );
}

/// Two-color chart of the greedy policy for hands without a usable Ace.
/// Rows are player totals, columns the dealer upcard (11 = Ace).
pub fn print_policy_chart(agent: &Agent) {
    let grid = agent.policy_grid();

    print!("     ");
    for dealer_up_value in DEALER_UP_RANGE {
        print!("{:>3}", dealer_up_value);
    }
    println!();

    for (player_total, row) in PLAYER_TOTAL_RANGE.zip(grid.iter()) {
        print!("{:>4} ", player_total);
        for action in row {
            let cell = match action {
                Action::Hit => " H ".red(),
                Action::Stand => " S ".green(),
            };
            print!("{}", cell);
        }
        println!();
    }

    println!("{} = hit, {} = stand", "H".red(), "S".green());
}
