use anyhow::{Context, Result};

use std::fmt;

pub const MAX_RANK: u8 = 13;
pub const TOTAL_SUITS: usize = 4;
pub const TOTAL_CARDS: usize = TOTAL_SUITS * MAX_RANK as usize;

const RANKS: [char; 13] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Spade,
    Heart,
    Club,
    Diamond,
}

impl Suit {
    /// Suit order, which is also the foundation order.
    pub const ALL: [Suit; TOTAL_SUITS] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self) -> Color {
        match self {
            Suit::Heart | Suit::Diamond => Color::Red,
            Suit::Spade | Suit::Club => Color::Black,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Heart => '♥',
            Suit::Club => '♣',
            Suit::Diamond => '♦',
        }
    }

    /// Accepts the suit symbol or its ASCII initial, so boards can be typed on any keyboard.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '♠' | 'S' | 's' => Some(Suit::Spade),
            '♥' | 'H' | 'h' => Some(Suit::Heart),
            '♣' | 'C' | 'c' => Some(Suit::Club),
            '♦' | 'D' | 'd' => Some(Suit::Diamond),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// A playing card. Identity is suit and value; orientation is the only mutable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    suit: Suit,
    value: u8,
    face_up: bool,
}

impl Card {
    /// Creates a face-down card. `value` runs from 1 (Ace) to 13 (King).
    pub fn new(suit: Suit, value: u8) -> Self {
        assert!(
            (1..=MAX_RANK).contains(&value),
            "card value must be within 1..=13, got {value}"
        );
        Self {
            suit,
            value,
            face_up: false,
        }
    }

    /// The card for a dense id in `0..52`, suit-major.
    pub fn from_id(id: usize) -> Self {
        assert!(id < TOTAL_CARDS, "card id out of range: {id}");
        Self::new(
            Suit::ALL[id / MAX_RANK as usize],
            (id % MAX_RANK as usize) as u8 + 1,
        )
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let value = RANKS
            .iter()
            .position(|&r| r == rank.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit = Suit::from_symbol(suit)
            .with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Card::new(suit, value as u8 + 1))
    }

    pub fn id(&self) -> usize {
        self.suit.index() * MAX_RANK as usize + (self.value - 1) as usize
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn color(&self) -> Color {
        self.suit.color()
    }

    pub fn is_face_up(&self) -> bool {
        self.face_up
    }

    pub fn is_ace(&self) -> bool {
        self.value == 1
    }

    pub fn is_king(&self) -> bool {
        self.value == MAX_RANK
    }

    pub fn turn_up(&mut self) {
        self.face_up = true;
    }

    pub fn turn_down(&mut self) {
        self.face_up = false;
    }

    pub fn turned_up(mut self) -> Self {
        self.face_up = true;
        self
    }

    pub fn pretty_print(&self) -> String {
        format!("{}{}", RANKS[(self.value - 1) as usize], self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}
