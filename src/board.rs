use crate::card::{Card, MAX_RANK, Suit, TOTAL_CARDS, TOTAL_SUITS};
use crate::deal::Shuffler;

use anyhow::{Context, Result, bail, ensure};
use smallvec::SmallVec;

pub const TOTAL_FOUNDATIONS: usize = TOTAL_SUITS;
pub const TOTAL_TABLEAUS: usize = 7;
pub const TALON_SIZE: usize = 24;
const TABLEAU_SIZE: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) stock: StockPile,
    pub(crate) waste: WastePile,
    pub(crate) foundations: [FoundationPile; TOTAL_FOUNDATIONS],
    pub(crate) tableaus: [Tableau; TOTAL_TABLEAUS],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            stock: StockPile::default(),
            waste: WastePile::default(),
            foundations: Suit::ALL.map(FoundationPile::new),
            tableaus: Default::default(),
        }
    }
}

impl Board {
    /// An empty board: no cards anywhere, every foundation at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stock(&self) -> &StockPile {
        &self.stock
    }

    pub fn waste(&self) -> &WastePile {
        &self.waste
    }

    pub fn foundations(&self) -> &[FoundationPile; TOTAL_FOUNDATIONS] {
        &self.foundations
    }

    pub fn foundation(&self, suit: Suit) -> &FoundationPile {
        &self.foundations[suit.index()]
    }

    pub fn tableaus(&self) -> &[Tableau; TOTAL_TABLEAUS] {
        &self.tableaus
    }

    pub fn tableau(&self, idx: usize) -> Option<&Tableau> {
        self.tableaus.get(idx)
    }

    /// Number of cards already accepted by the foundations.
    pub fn foundation_score(&self) -> u32 {
        self.foundations.iter().map(|f| f.value() as u32).sum()
    }

    /// Cards accounted for across every pile; 52 on any legal board.
    pub fn card_count(&self) -> usize {
        self.stock.len()
            + self.waste.len()
            + self.tableaus.iter().map(Tableau::len).sum::<usize>()
            + self.foundation_score() as usize
    }

    pub fn empty_tableau_count(&self) -> usize {
        self.tableaus.iter().filter(|t| t.is_empty()).count()
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(FoundationPile::is_complete)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks every standing invariant of a board and reports the first breach.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; TOTAL_CARDS];
        let mut check_card = |card: &Card, place: &str| -> Result<()> {
            ensure!(!seen[card.id()], "{card} appears more than once ({place})");
            seen[card.id()] = true;
            Ok(())
        };

        for card in self.stock.cards() {
            ensure!(!card.is_face_up(), "stock card {card} is face up");
            check_card(card, "stock")?;
        }
        for card in self.waste.cards() {
            ensure!(card.is_face_up(), "waste card {card} is face down");
            check_card(card, "waste")?;
        }
        for foundation in &self.foundations {
            for value in 1..=foundation.value() {
                check_card(&Card::new(foundation.suit(), value), "foundation")?;
            }
        }
        for (i, tableau) in self.tableaus.iter().enumerate() {
            ensure!(
                tableau.has_face_down_prefix(),
                "Tableau{} has a face-down card above a face-up one",
                i + 1
            );
            for card in tableau.cards() {
                check_card(card, "tableau")?;
            }
        }

        let count = seen.iter().filter(|&&s| s).count();
        ensure!(
            count == TOTAL_CARDS,
            "board holds {count} cards, expected {TOTAL_CARDS}"
        );
        Ok(())
    }

    pub(crate) fn draw(&mut self) -> Option<Card> {
        let card = self.stock.pop()?;
        self.waste.push(card);
        Some(card.turned_up())
    }

    /// Puts the waste top back on the stock. Needs a card below the top to re-expose.
    pub(crate) fn rewind(&mut self) -> Option<Card> {
        if self.waste.len() < 2 {
            return None;
        }
        let card = self.waste.pop()?;
        self.stock.push(card);
        Some(card)
    }

    /// Turns the waste back into the stock so the draws replay in their original order.
    pub(crate) fn restart_stock(&mut self) -> usize {
        let count = self.waste.len();
        for card in self.waste.cards.drain(..).rev() {
            self.stock.push(card);
        }
        count
    }

    pub(crate) fn restock_shuffled(&mut self, shuffler: &mut impl Shuffler) -> usize {
        let mut cards: Vec<Card> = self.waste.cards.drain(..).collect();
        shuffler.shuffle(&mut cards);
        let count = cards.len();
        for card in cards {
            self.stock.push(card);
        }
        count
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Self::new();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Stock:") {
                for card in Self::parse_cards(rest.trim()).with_context(line_context)? {
                    board.stock.push(card);
                }
            } else if let Some(rest) = line.strip_prefix("Waste:") {
                for card in Self::parse_cards(rest.trim()).with_context(line_context)? {
                    board.waste.push(card);
                }
            } else if let Some(rest) = line.strip_prefix("Foundation") {
                let mut parts = rest.splitn(2, ':');
                let idx = Self::parse_index(parts.next(), TOTAL_FOUNDATIONS)
                    .context("Invalid foundation index")
                    .with_context(line_context)?;
                let cards = Self::parse_cards(parts.next().unwrap_or("").trim())
                    .with_context(line_context)?;
                if let Some(top) = cards.last() {
                    let foundation = &mut board.foundations[idx];
                    if top.suit() != foundation.suit() {
                        bail!(
                            "Foundation{} holds {}, found {top}; {}",
                            idx + 1,
                            foundation.suit().symbol(),
                            line_context()
                        );
                    }
                    foundation.value = top.value();
                }
            } else if let Some(rest) = line.strip_prefix("Tableau") {
                let mut parts = rest.splitn(2, ':');
                let idx = Self::parse_index(parts.next(), TOTAL_TABLEAUS)
                    .context("Invalid tableau index")
                    .with_context(line_context)?;
                let cards_str = parts.next().unwrap_or("").trim();
                let (before, after) = match cards_str.find('|') {
                    Some(split) => {
                        let (b, a) = cards_str.split_at(split);
                        (b, &a[1..])
                    }
                    None => (cards_str, ""),
                };
                let tableau = &mut board.tableaus[idx];
                for card in Self::parse_cards(before.trim()).with_context(line_context)? {
                    tableau.push(card);
                }
                for card in Self::parse_cards(after.trim()).with_context(line_context)? {
                    tableau.push(card.turned_up());
                }
            } else {
                bail!("Unknown pile; {}", line_context());
            }
        }

        Ok(board)
    }

    fn parse_index(s: Option<&str>, len: usize) -> Result<usize> {
        let idx = s.unwrap_or("").trim().parse::<usize>()?;
        ensure!((1..=len).contains(&idx), "index {idx} is outside 1..={len}");
        Ok(idx - 1)
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c1) = chars.peek() {
            if c1.is_whitespace() {
                chars.next();
                continue;
            }
            let rank = c1;
            chars.next();
            let suit = match chars.next() {
                Some(s) => s,
                None => bail!("Missing suit after rank '{rank}'"),
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn pretty_print(&self) -> String {
        let mut lines = Vec::new();

        if !self.stock.is_empty() {
            lines.push(format!("Stock: {}", join_cards(self.stock.cards())));
        }

        if !self.waste.is_empty() {
            lines.push(format!("Waste: {}", join_cards(self.waste.cards())));
        }

        for (i, foundation) in self.foundations.iter().enumerate() {
            if let Some(card) = foundation.top_card() {
                lines.push(format!("Foundation{}: {card}", i + 1));
            }
        }

        for (i, tableau) in self.tableaus.iter().enumerate() {
            if tableau.is_empty() {
                continue;
            }
            let split = tableau.first_face_up().unwrap_or(tableau.len());
            let (down, up) = tableau.cards().split_at(split);
            let mut line = format!("Tableau{}: {}", i + 1, join_cards(down));
            if !up.is_empty() {
                line.push('|');
                line.push_str(&join_cards(up));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

fn join_cards(cards: &[Card]) -> String {
    cards.iter().map(Card::pretty_print).collect()
}

/// Face-down draw pile; the last card is the next one drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPile {
    cards: SmallVec<[Card; TALON_SIZE]>,
}

impl StockPile {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub(crate) fn push(&mut self, mut card: Card) {
        card.turn_down();
        self.cards.push(card);
    }

    pub(crate) fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }
}

/// Face-up discard pile. Only the top card is playable; the one below it is what a rewind exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WastePile {
    cards: SmallVec<[Card; TALON_SIZE]>,
}

impl WastePile {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn peek_below_top(&self) -> Option<&Card> {
        self.cards.iter().rev().nth(1)
    }

    pub(crate) fn push(&mut self, mut card: Card) {
        card.turn_up();
        self.cards.push(card);
    }

    pub(crate) fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }
}

/// A foundation keeps no cards, only the highest value it has accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundationPile {
    suit: Suit,
    value: u8,
}

impl FoundationPile {
    pub fn new(suit: Suit) -> Self {
        Self { suit, value: 0 }
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    pub fn is_complete(&self) -> bool {
        self.value == MAX_RANK
    }

    pub fn top_card(&self) -> Option<Card> {
        (self.value > 0).then(|| Card::new(self.suit, self.value).turned_up())
    }

    pub fn accepts(&self, card: &Card) -> bool {
        card.suit() == self.suit && card.value() == self.value + 1
    }

    pub(crate) fn advance(&mut self) {
        assert!(self.value < MAX_RANK, "{:?} foundation is already complete", self.suit);
        self.value += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tableau {
    cards: SmallVec<[Card; TABLEAU_SIZE]>,
}

impl Tableau {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// Index of the lowest face-up card, i.e. where the playable run starts.
    pub fn first_face_up(&self) -> Option<usize> {
        self.cards.iter().position(Card::is_face_up)
    }

    pub fn is_fully_face_up(&self) -> bool {
        self.cards.iter().all(Card::is_face_up)
    }

    /// Whether every card, read from the base upward, is exactly one rank below the one under it.
    pub fn descends_from_base(&self) -> bool {
        self.cards
            .windows(2)
            .all(|pair| pair[1].value() + 1 == pair[0].value())
    }

    pub fn has_face_down_prefix(&self) -> bool {
        self.cards
            .windows(2)
            .all(|pair| !pair[0].is_face_up() || pair[1].is_face_up())
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub(crate) fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub(crate) fn split_off(&mut self, index: usize) -> Vec<Card> {
        self.cards.drain(index..).collect()
    }

    pub(crate) fn extend(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    /// Turns the top card face up if it is face down, returning it.
    pub(crate) fn flip_top(&mut self) -> Option<Card> {
        let top = self.cards.last_mut()?;
        if top.is_face_up() {
            return None;
        }
        top.turn_up();
        Some(*top)
    }

    pub(crate) fn reveal_all(&mut self) -> usize {
        let mut flipped = 0;
        for card in self.cards.iter_mut().filter(|c| !c.is_face_up()) {
            card.turn_up();
            flipped += 1;
        }
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD_STR: &str = r#"Stock: 5♦2♥8♦K♣7♥J♣
Waste: 7♦Q♥K♥T♦6♣9♥K♦J♠T♣Q♣3♣2♦Q♦8♥6♥7♠8♠
Foundation1: A♠
Foundation3: 2♣
Tableau1: |5♣
Tableau2: J♥|6♠
Tableau3: T♠5♥|Q♠
Tableau4: 9♠T♥2♠|9♣
Tableau5: 7♣4♥3♠|A♦
Tableau6: 3♥3♦4♣5♠4♦|8♣
Tableau7: 6♦4♠A♥9♦K♠|J♦"#;

    #[test]
    fn test_parse_board() {
        let board = Board::parse(BOARD_STR).unwrap();
        board.validate().unwrap();
        assert_eq!(BOARD_STR, board.pretty_print());
        assert_eq!(board.foundation_score(), 3);
        assert_eq!(board.card_count(), TOTAL_CARDS);
        assert_eq!(board.waste().peek_top().unwrap().pretty_print(), "8♠");
        assert_eq!(board.waste().peek_below_top().unwrap().pretty_print(), "7♠");
        assert_eq!(board.tableau(6).unwrap().first_face_up(), Some(5));
    }

    #[test]
    fn test_new_board() {
        let board = Board::new();
        assert_eq!(board.foundation_score(), 0);
        assert_eq!(board.empty_tableau_count(), TOTAL_TABLEAUS);
        assert!(!board.is_won());
        assert!(!board.is_valid());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let text = BOARD_STR.replace("Tableau1: |5♣", "Tableau1: |8♠");
        let board = Board::parse(&text).unwrap();
        let err = board.validate().unwrap_err();
        assert!(err.to_string().contains("8♠ appears more than once"));
    }

    #[test]
    fn test_validate_rejects_face_down_above_face_up() {
        let mut board = Board::parse(BOARD_STR).unwrap();
        let mut card = Card::parse('Q', '♠').unwrap();
        card.turn_down();
        board.tableaus[0].push(Card::parse('4', '♥').unwrap().turned_up());
        board.tableaus[0].push(card);
        assert!(!board.tableaus[0].has_face_down_prefix());
        let err = board.validate().unwrap_err();
        assert!(err.to_string().contains("Tableau1 has a face-down card"));
    }

    #[test]
    fn test_parse_rejects_wrong_foundation_suit() {
        let err = Board::parse("Foundation2: 3♠").unwrap_err();
        assert!(format!("{err:#}").contains("Foundation2"));
        assert!(Board::parse("Tableau8: |K♠").is_err());
        assert!(Board::parse("Reserve: K♠").is_err());
    }

    #[test]
    fn test_restart_stock_replays_draw_order() {
        let mut board = Board::parse("Stock: 3♠2♠A♠").unwrap();
        let drawn: Vec<Card> = std::iter::from_fn(|| board.draw()).collect();
        assert_eq!(board.waste().len(), 3);
        assert_eq!(board.restart_stock(), 3);
        assert!(board.stock().cards().iter().all(|c| !c.is_face_up()));
        let replayed: Vec<Card> = std::iter::from_fn(|| board.draw()).collect();
        assert_eq!(drawn, replayed);
    }

    #[test]
    fn test_rewind_needs_card_below() {
        let mut board = Board::parse("Stock: 3♠2♠A♠").unwrap();
        board.draw();
        assert_eq!(board.rewind(), None);
        board.draw();
        let rewound = board.rewind().unwrap();
        assert_eq!(rewound.pretty_print(), "2♠");
        assert!(!board.stock().peek_top().unwrap().is_face_up());
        assert_eq!(board.waste().peek_top().unwrap().pretty_print(), "A♠");
    }

    #[test]
    fn test_tableau_flip_and_reveal() {
        let mut board = Board::parse("Tableau1: K♠Q♥J♠").unwrap();
        let tableau = &mut board.tableaus[0];
        assert_eq!(tableau.flip_top().unwrap().pretty_print(), "J♠");
        assert_eq!(tableau.flip_top(), None);
        assert_eq!(tableau.reveal_all(), 2);
        assert!(tableau.is_fully_face_up());
        assert!(tableau.descends_from_base());
    }

    #[test]
    fn test_foundation_accepts_successor_only() {
        let mut foundation = FoundationPile::new(Suit::Heart);
        assert!(foundation.accepts(&Card::new(Suit::Heart, 1)));
        assert!(!foundation.accepts(&Card::new(Suit::Diamond, 1)));
        assert!(!foundation.accepts(&Card::new(Suit::Heart, 2)));
        foundation.advance();
        assert_eq!(foundation.top_card().unwrap().pretty_print(), "A♥");
        assert!(foundation.accepts(&Card::new(Suit::Heart, 2)));
    }
}
