use crate::board::{Board, TOTAL_TABLEAUS};
use crate::card::{Card, MAX_RANK, Suit, TOTAL_CARDS};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Source of card order for deals and shuffled recycles.
pub trait Shuffler {
    fn shuffle(&mut self, cards: &mut [Card]);
}

/// Uniform Fisher–Yates shuffle.
#[derive(Debug, Clone)]
pub struct RandomShuffler {
    rng: StdRng,
}

impl RandomShuffler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible deals for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomShuffler {
    fn default() -> Self {
        Self::new()
    }
}

impl Shuffler for RandomShuffler {
    fn shuffle(&mut self, cards: &mut [Card]) {
        cards.shuffle(&mut self.rng);
    }
}

/// Leaves the order untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle(&mut self, _cards: &mut [Card]) {}
}

/// All 52 cards face down, suit by suit, Ace to King.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(TOTAL_CARDS);
    for suit in Suit::ALL {
        for value in 1..=MAX_RANK {
            deck.push(Card::new(suit, value));
        }
    }
    deck
}

/// Deals a 52-card deck: tableau `i` takes the next `i + 1` cards with only the last one face up,
/// and the remaining 24 cards form the stock, the last of them on top.
pub fn deal(deck: &[Card]) -> Board {
    assert_eq!(deck.len(), TOTAL_CARDS, "a deal needs a full deck");

    let mut board = Board::new();
    let mut m = 0;
    for (i, tableau) in board.tableaus.iter_mut().enumerate() {
        for _ in 0..=i {
            tableau.push(deck[m]);
            m += 1;
        }
        tableau.flip_top();
    }
    debug_assert_eq!(m, TOTAL_TABLEAUS * (TOTAL_TABLEAUS + 1) / 2);

    for &card in &deck[m..] {
        board.stock.push(card);
    }

    board
}

pub fn shuffled_board(shuffler: &mut impl Shuffler) -> Board {
    let mut deck = standard_deck();
    shuffler.shuffle(&mut deck);
    deal(&deck)
}
