//! Rules engine for single-player Klondike patience.
//!
//! The engine owns the piles, validates every move before applying it and reports what changed.
//! Rendering, input and persistence live with the caller.
pub mod action;
pub mod board;
pub mod card;
pub mod config;
pub mod deal;
pub mod engine;
pub mod rules;

pub use crate::action::{Action, Outcome, describe_action, format_actions, parse_actions};
pub use crate::board::Board;
pub use crate::card::{Card, Color, Suit};
pub use crate::config::{ConfigError, EmptyTableauRule, RecycleStrategy, RuleConfig};
pub use crate::deal::{IdentityShuffler, RandomShuffler, Shuffler};
pub use crate::engine::{FoundationMove, Game, TableauMove};
pub use crate::rules::{MoveResult, Placement, Rejection};
