use crate::board::{Board, TOTAL_TABLEAUS};
use crate::card::Card;
use crate::deal::Shuffler;
use crate::engine::{FoundationMove, Game, TableauMove};
use crate::rules::{MoveResult, Rejection};

use anyhow::{Context, Result, bail, ensure};

/// One player command in compact notation. Pile indices are zero-based here and one-based in text.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Draw,
    /// Recycle with the configured strategy.
    Recycle,
    Shuffle,
    Restart,
    Rewind,
    WasteToFoundation,
    WasteToTableau(usize),
    TableauToFoundation(usize),
    TableauToTableau(usize, usize, usize), // (from_index, to_index, count)
    Flip(usize),
    RevealAll,
    FastComplete,
}

/// What an applied action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Drew(Card),
    Recycled(usize),
    Rewound(Card),
    Foundation(FoundationMove),
    Tableau(TableauMove),
    Flipped(bool),
    Revealed(usize),
    Completed(usize),
}

impl Outcome {
    pub fn describe(&self) -> String {
        match self {
            Outcome::Drew(card) => format!("drew {card}"),
            Outcome::Recycled(count) => format!("{count} cards back in the stock"),
            Outcome::Rewound(card) => format!("{card} back on the stock"),
            Outcome::Foundation(mv) => {
                let mut s = format!("{} to Foundation{}", mv.card, mv.foundation + 1);
                if let Some(card) = mv.revealed {
                    s.push_str(&format!(", revealed {card}"));
                }
                if mv.won {
                    s.push_str(", game won");
                }
                s
            }
            Outcome::Tableau(mv) => {
                let mut s = format!("{} card(s) moved", mv.cards_moved);
                if mv.placement.uses_allowance() {
                    s.push_str(" using a same-colour move");
                }
                if let Some(card) = mv.revealed {
                    s.push_str(&format!(", revealed {card}"));
                }
                s
            }
            Outcome::Flipped(flipped) => {
                if *flipped {
                    "flipped".into()
                } else {
                    "nothing to flip".into()
                }
            }
            Outcome::Revealed(count) => format!("revealed {count} cards"),
            Outcome::Completed(count) => format!("played {count} cards to the foundations"),
        }
    }
}

fn parse_pile(s: &str) -> Result<usize> {
    let digits = s
        .strip_prefix('T')
        .with_context(|| format!("Expected a tableau like 'T3', found '{s}'"))?;
    let idx = digits
        .parse::<usize>()
        .with_context(|| format!("Invalid tableau number '{digits}'"))?;
    ensure!(
        (1..=TOTAL_TABLEAUS).contains(&idx),
        "Tableau number {idx} is outside 1..={TOTAL_TABLEAUS}"
    );
    Ok(idx - 1)
}

fn parse_action(token: &str) -> Result<Vec<Action>> {
    let token = token.to_ascii_uppercase();
    let single = match token.as_str() {
        "D" => Action::Draw,
        "R" => Action::Recycle,
        "RS" => Action::Shuffle,
        "RR" => Action::Restart,
        "U" => Action::Rewind,
        "V" => Action::RevealAll,
        "C" => Action::FastComplete,
        "W:F" => Action::WasteToFoundation,
        _ => {
            if let Some(count) = token.strip_suffix('D') {
                let count = count
                    .parse::<usize>()
                    .with_context(|| format!("Invalid draw count '{count}'"))?;
                ensure!(count > 0, "Draw count must be positive");
                return Ok(vec![Action::Draw; count]);
            }
            if let Some(pile) = token.strip_suffix('^') {
                Action::Flip(parse_pile(pile)?)
            } else if let Some((from, to)) = token.split_once(':') {
                match (from, to) {
                    ("W", to) => Action::WasteToTableau(parse_pile(to)?),
                    (from, "F") => Action::TableauToFoundation(parse_pile(from)?),
                    (from, to) => {
                        let (to, count) = match to.split_once('@') {
                            Some((to, count)) => {
                                let count = count
                                    .parse::<usize>()
                                    .with_context(|| format!("Invalid run length '{count}'"))?;
                                ensure!(count > 0, "Run length must be positive");
                                (to, count)
                            }
                            None => (to, 1),
                        };
                        Action::TableauToTableau(parse_pile(from)?, parse_pile(to)?, count)
                    }
                }
            } else {
                bail!("Unknown action");
            }
        }
    };
    Ok(vec![single])
}

/// Parses whitespace-separated actions, e.g. `3D W:T2 T1:T4@3 T1^ R`.
pub fn parse_actions(content: &str) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    for token in content.split_whitespace() {
        actions.extend(parse_action(token).with_context(|| format!("Failed to parse action '{token}'"))?);
    }
    Ok(actions)
}

pub fn format_actions(actions: &[Action]) -> String {
    let mut list = vec![];
    let mut i = 0;
    while i < actions.len() {
        let str = match actions[i] {
            Action::Draw => {
                let count = actions[i..]
                    .iter()
                    .take_while(|a| matches!(a, Action::Draw))
                    .count();
                i += count;
                list.push(if count == 1 {
                    "D".into()
                } else {
                    format!("{count}D")
                });
                continue;
            }
            Action::Recycle => "R".into(),
            Action::Shuffle => "RS".into(),
            Action::Restart => "RR".into(),
            Action::Rewind => "U".into(),
            Action::WasteToFoundation => "W:F".into(),
            Action::WasteToTableau(idx) => format!("W:T{}", idx + 1),
            Action::TableauToFoundation(idx) => format!("T{}:F", idx + 1),
            Action::TableauToTableau(from_idx, to_idx, count) => {
                let mut str = format!("T{}:T{}", from_idx + 1, to_idx + 1);
                if count > 1 {
                    str.push_str(&format!("@{count}"));
                }
                str
            }
            Action::Flip(idx) => format!("T{}^", idx + 1),
            Action::RevealAll => "V".into(),
            Action::FastComplete => "C".into(),
        };
        list.push(str);
        i += 1;
    }

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.len()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.truncate(output.trim_end().len());
        output.push('\n');
    }

    output
}

/// Human-readable form of an action against the board it is about to be applied to.
pub fn describe_action(board: &Board, action: &Action) -> String {
    let format_card =
        |card: Option<&Card>| -> String { card.map(Card::pretty_print).unwrap_or_default() };
    let tableau_top = |idx: usize| format_card(board.tableau(idx).and_then(|t| t.peek_top()));

    match action {
        Action::Draw => {
            let card = format_card(board.stock().peek_top().map(|c| c.turned_up()).as_ref());
            format!("Draw {card}")
        }
        Action::Recycle => "Recycle".to_string(),
        Action::Shuffle => "Shuffle the waste into the stock".to_string(),
        Action::Restart => "Restart the stock".to_string(),
        Action::Rewind => format!("Rewind {}", format_card(board.waste().peek_top())),
        Action::WasteToFoundation => {
            format!("(Waste) {} -> Foundation", format_card(board.waste().peek_top()))
        }
        Action::WasteToTableau(idx) => format!(
            "(Waste) {} -> (Tableau{}) {}",
            format_card(board.waste().peek_top()),
            idx + 1,
            tableau_top(*idx)
        ),
        Action::TableauToFoundation(idx) => {
            format!("(Tableau{}) {} -> Foundation", idx + 1, tableau_top(*idx))
        }
        Action::TableauToTableau(from_idx, to_idx, count) => {
            let from_cards = board
                .tableau(*from_idx)
                .map(|t| {
                    let cards = t.cards();
                    cards[cards.len().saturating_sub(*count)..]
                        .iter()
                        .map(Card::pretty_print)
                        .collect::<String>()
                })
                .unwrap_or_default();
            format!(
                "(Tableau{}) {from_cards} -> (Tableau{}) {}",
                from_idx + 1,
                to_idx + 1,
                tableau_top(*to_idx)
            )
        }
        Action::Flip(idx) => format!("Flip Tableau{}", idx + 1),
        Action::RevealAll => "Reveal all tableau cards".to_string(),
        Action::FastComplete => "Fast complete".to_string(),
    }
}

impl<S: Shuffler> Game<S> {
    /// Dispatches an action to the matching command.
    pub fn apply(&mut self, action: &Action) -> MoveResult<Outcome> {
        let outcome = match *action {
            Action::Draw => Outcome::Drew(self.draw_card()?),
            Action::Recycle => Outcome::Recycled(self.recycle()?),
            Action::Shuffle => Outcome::Recycled(self.shuffle_discard_pile()?),
            Action::Restart => Outcome::Recycled(self.restart_draw_pile()?),
            Action::Rewind => Outcome::Rewound(self.rewind_one_card()?),
            Action::WasteToFoundation => {
                Outcome::Foundation(self.play_discard_pile_card_to_foundation()?)
            }
            Action::WasteToTableau(target) => {
                Outcome::Tableau(self.play_discard_pile_card_to_tableau(target)?)
            }
            Action::TableauToFoundation(pile) => {
                Outcome::Foundation(self.move_tableau_card_to_foundation(pile)?)
            }
            Action::TableauToTableau(from, to, count) => {
                let len = self
                    .board()
                    .tableau(from)
                    .ok_or(Rejection::NoSuchPile(from))?
                    .len();
                let card_index = len.checked_sub(count).ok_or(Rejection::EmptySource)?;
                Outcome::Tableau(self.move_tableau_cards_to_another_tableau(from, card_index, to)?)
            }
            Action::Flip(pile) => Outcome::Flipped(self.flip_top_tableau_card(pile)?),
            Action::RevealAll => Outcome::Revealed(self.reveal_all_tableau_cards()),
            Action::FastComplete => Outcome::Completed(self.fast_complete()?),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::deal::IdentityShuffler;

    #[test]
    fn test_parse_actions() {
        let actions = parse_actions("3d W:T2 t1:t4@3 T7:F W:F T3^ R RS RR U V C").unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Draw,
                Action::Draw,
                Action::Draw,
                Action::WasteToTableau(1),
                Action::TableauToTableau(0, 3, 3),
                Action::TableauToFoundation(6),
                Action::WasteToFoundation,
                Action::Flip(2),
                Action::Recycle,
                Action::Shuffle,
                Action::Restart,
                Action::Rewind,
                Action::RevealAll,
                Action::FastComplete,
            ]
        );
    }

    #[test]
    fn test_parse_actions_errors() {
        for bad in ["X", "T8:F", "T0^", "0D", "T1:T2@0", "W:Q", "T1:T2@x"] {
            let err = parse_actions(bad).unwrap_err();
            assert!(
                format!("{err:#}").contains(bad),
                "error for {bad} should name the token: {err:#}"
            );
        }
    }

    #[test]
    fn test_format_actions() {
        let actions = parse_actions("D D D W:T2 T1:T4@3 T1:T4 T2^").unwrap();
        let formatted = format_actions(&actions);
        assert_eq!(formatted.split_whitespace().collect::<Vec<_>>(), [
            "3D", "W:T2", "T1:T4@3", "T1:T4", "T2^"
        ]);
        assert_eq!(parse_actions(&formatted).unwrap(), actions);
    }

    #[test]
    fn test_apply_actions() {
        let mut game = Game::new(RuleConfig::default(), IdentityShuffler).unwrap();

        let describe = describe_action(game.board(), &Action::Draw);
        assert_eq!(describe, "Draw K♦");

        let outcomes: Vec<Outcome> = parse_actions("T1:F 2D U")
            .unwrap()
            .iter()
            .map(|action| game.apply(action).unwrap())
            .collect();
        assert!(matches!(outcomes[0], Outcome::Foundation(mv) if mv.source_emptied));
        assert!(matches!(outcomes[1], Outcome::Drew(card) if card.pretty_print() == "K♦"));
        assert!(matches!(outcomes[3], Outcome::Rewound(card) if card.pretty_print() == "Q♦"));

        assert_eq!(
            game.apply(&Action::TableauToTableau(2, 0, 1)),
            Err(Rejection::RuleViolation)
        );
        assert_eq!(
            game.apply(&Action::TableauToTableau(2, 0, 9)),
            Err(Rejection::EmptySource)
        );
        assert_eq!(
            describe_action(game.board(), &Action::TableauToTableau(3, 1, 2)),
            "(Tableau4) 9♠T♠ -> (Tableau2) 3♠"
        );
    }
}
