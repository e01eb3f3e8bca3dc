//! Move validation. Every function here is a pure read of the board; the engine mutates only
//! after one of them has accepted the move.

use crate::board::{Board, Tableau};
use crate::card::Card;
use crate::config::RuleConfig;

use thiserror::Error;

/// Which placement rule admitted a tableau move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One rank down, opposite colour, or a card the empty-pile rule accepts.
    Normal,
    /// One rank down, same colour; spends one unit of the same-colour allowance.
    SameColour,
}

impl Placement {
    pub fn uses_allowance(self) -> bool {
        matches!(self, Placement::SameColour)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the move breaks the placement rules")]
    RuleViolation,
    #[error("there is no card to take")]
    EmptySource,
    #[error("the target pile would grow past {limit} cards")]
    StackTooLong { limit: usize },
    #[error("the cards were dropped back on their own pile")]
    SamePile,
    #[error("there is no tableau pile {}", .0 + 1)]
    NoSuchPile(usize),
}

pub type MoveResult<T> = Result<T, Rejection>;

fn tableau(board: &Board, idx: usize) -> MoveResult<&Tableau> {
    board.tableau(idx).ok_or(Rejection::NoSuchPile(idx))
}

/// Index of the foundation that takes `card` next, if any.
pub fn foundation_for(board: &Board, card: &Card) -> MoveResult<usize> {
    let idx = card.suit().index();
    if board.foundations()[idx].accepts(card) {
        Ok(idx)
    } else {
        Err(Rejection::RuleViolation)
    }
}

pub fn check_waste_to_foundation(board: &Board) -> MoveResult<usize> {
    let card = board.waste().peek_top().ok_or(Rejection::EmptySource)?;
    foundation_for(board, card)
}

/// Only the top card of a pile may go to a foundation.
pub fn check_tableau_to_foundation(board: &Board, pile: usize) -> MoveResult<usize> {
    let card = tableau(board, pile)?
        .peek_top()
        .ok_or(Rejection::EmptySource)?;
    if !card.is_face_up() {
        return Err(Rejection::RuleViolation);
    }
    foundation_for(board, card)
}

/// Whether `card` may be laid on `target`, and through which rule.
pub fn check_placement(
    card: &Card,
    target: &Tableau,
    rules: &RuleConfig,
    allowance: u8,
) -> MoveResult<Placement> {
    let Some(top) = target.peek_top() else {
        return if rules.empty_tableau.accepts(card) {
            Ok(Placement::Normal)
        } else {
            Err(Rejection::RuleViolation)
        };
    };

    if !top.is_face_up() || card.value() + 1 != top.value() {
        return Err(Rejection::RuleViolation);
    }
    if card.color() != top.color() {
        Ok(Placement::Normal)
    } else if allowance > 0 {
        Ok(Placement::SameColour)
    } else {
        Err(Rejection::RuleViolation)
    }
}

fn check_stack_limit(target: &Tableau, count: usize, rules: &RuleConfig) -> MoveResult<()> {
    if target.len() + count > rules.max_tableau_len {
        return Err(Rejection::StackTooLong {
            limit: rules.max_tableau_len,
        });
    }
    Ok(())
}

pub fn check_waste_to_tableau(
    board: &Board,
    rules: &RuleConfig,
    allowance: u8,
    target: usize,
) -> MoveResult<Placement> {
    let target = tableau(board, target)?;
    let card = board.waste().peek_top().ok_or(Rejection::EmptySource)?;
    check_stack_limit(target, 1, rules)?;
    check_placement(card, target, rules, allowance)
}

/// Checks moving the card at `card_index` of `source`, with everything above it, onto `target`.
pub fn check_tableau_to_tableau(
    board: &Board,
    rules: &RuleConfig,
    allowance: u8,
    source: usize,
    card_index: usize,
    target: usize,
) -> MoveResult<Placement> {
    let from = tableau(board, source)?;
    let to = tableau(board, target)?;
    if source == target {
        return Err(Rejection::SamePile);
    }
    let card = from.get(card_index).ok_or(Rejection::EmptySource)?;
    if !card.is_face_up() {
        return Err(Rejection::RuleViolation);
    }
    check_stack_limit(to, from.len() - card_index, rules)?;
    check_placement(card, to, rules, allowance)
}
