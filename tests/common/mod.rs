#![allow(dead_code)]

use patience::{Board, Card, Game, IdentityShuffler, RuleConfig, card::TOTAL_CARDS};

/// Parses a partial board and puts every card it leaves out at the bottom of the stock, face down.
pub fn fill_board(text: &str) -> Board {
    let partial = Board::parse(text).unwrap();
    let mut present = [false; TOTAL_CARDS];
    let mut mark = |card: &Card| present[card.id()] = true;
    partial.stock().cards().iter().for_each(&mut mark);
    partial.waste().cards().iter().for_each(&mut mark);
    partial
        .tableaus()
        .iter()
        .flat_map(|t| t.cards())
        .for_each(&mut mark);
    for foundation in partial.foundations() {
        for value in 1..=foundation.value() {
            mark(&Card::new(foundation.suit(), value));
        }
    }

    let missing: String = (0..TOTAL_CARDS)
        .filter(|&id| !present[id])
        .map(|id| Card::from_id(id).pretty_print())
        .collect();
    let stock: String = partial
        .stock()
        .cards()
        .iter()
        .map(Card::pretty_print)
        .collect();
    let rest: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("Stock:"))
        .collect();
    let board = Board::parse(&format!("Stock: {missing}{stock}\n{}", rest.join("\n"))).unwrap();
    board.validate().unwrap();
    board
}

pub fn game_with(text: &str, rules: RuleConfig) -> Game<IdentityShuffler> {
    Game::from_board(fill_board(text), rules, IdentityShuffler).unwrap()
}

pub fn game(text: &str) -> Game<IdentityShuffler> {
    game_with(text, RuleConfig::default())
}

pub fn identity_game() -> Game<IdentityShuffler> {
    Game::new(RuleConfig::default(), IdentityShuffler).unwrap()
}
