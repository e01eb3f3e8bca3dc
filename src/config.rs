use crate::card::{Card, MAX_RANK};

use std::{fmt, str::FromStr};
use thiserror::Error;

pub const DEFAULT_MAX_TABLEAU_LEN: usize = 19;
pub const DEFAULT_SAME_COLOUR_MOVES: u8 = 3;
/// A full King-to-Ace run must always fit in one pile.
pub const MIN_MAX_TABLEAU_LEN: usize = MAX_RANK as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max tableau length {0} is below the minimum of {min}", min = MIN_MAX_TABLEAU_LEN)]
    StackLimitTooSmall(usize),
    #[error("unknown recycle strategy '{0}', expected 'shuffle' or 'restart'")]
    UnknownRecycleStrategy(String),
}

/// What an empty tableau pile accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTableauRule {
    #[default]
    KingOnly,
    /// Easy mode: anything but an ace.
    AnyExceptAce,
}

impl EmptyTableauRule {
    pub fn accepts(self, card: &Card) -> bool {
        match self {
            EmptyTableauRule::KingOnly => card.is_king(),
            EmptyTableauRule::AnyExceptAce => !card.is_ace(),
        }
    }
}

/// How the waste goes back to the stock once the stock runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecycleStrategy {
    #[default]
    Shuffle,
    /// Keep the order, so the stock replays the same draws.
    Restart,
}

impl fmt::Display for RecycleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecycleStrategy::Shuffle => "shuffle",
            RecycleStrategy::Restart => "restart",
        })
    }
}

impl FromStr for RecycleStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shuffle" => Ok(RecycleStrategy::Shuffle),
            "restart" => Ok(RecycleStrategy::Restart),
            _ => Err(ConfigError::UnknownRecycleStrategy(s.to_string())),
        }
    }
}

/// Rule parameters injected into a game at construction; read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleConfig {
    /// Longest a tableau pile may grow through a move.
    pub max_tableau_len: usize,
    /// Same-colour placements allowed per game.
    pub same_colour_moves: u8,
    pub empty_tableau: EmptyTableauRule,
    pub recycle: RecycleStrategy,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_tableau_len: DEFAULT_MAX_TABLEAU_LEN,
            same_colour_moves: DEFAULT_SAME_COLOUR_MOVES,
            empty_tableau: EmptyTableauRule::default(),
            recycle: RecycleStrategy::default(),
        }
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tableau_len < MIN_MAX_TABLEAU_LEN {
            return Err(ConfigError::StackLimitTooSmall(self.max_tableau_len));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    #[test]
    fn test_default_config_is_valid() {
        let config = RuleConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.empty_tableau, EmptyTableauRule::KingOnly);
        assert_eq!(config.recycle, RecycleStrategy::Shuffle);
    }

    #[test]
    fn test_stack_limit_floor() {
        let config = RuleConfig {
            max_tableau_len: 12,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err, ConfigError::StackLimitTooSmall(12));
        assert_eq!(
            err.to_string(),
            "max tableau length 12 is below the minimum of 13"
        );
    }

    #[test]
    fn test_empty_tableau_rules() {
        let king = Card::new(Suit::Club, 13);
        let queen = Card::new(Suit::Club, 12);
        let ace = Card::new(Suit::Club, 1);
        assert!(EmptyTableauRule::KingOnly.accepts(&king));
        assert!(!EmptyTableauRule::KingOnly.accepts(&queen));
        assert!(EmptyTableauRule::AnyExceptAce.accepts(&queen));
        assert!(!EmptyTableauRule::AnyExceptAce.accepts(&ace));
    }

    #[test]
    fn test_recycle_strategy_round_trip() {
        for strategy in [RecycleStrategy::Shuffle, RecycleStrategy::Restart] {
            assert_eq!(strategy.to_string().parse::<RecycleStrategy>(), Ok(strategy));
        }
        assert!("Restart".parse::<RecycleStrategy>().is_ok());
        assert!("reverse".parse::<RecycleStrategy>().is_err());
    }
}
