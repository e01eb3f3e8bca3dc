use crate::board::Board;
use crate::card::Card;
use crate::config::{ConfigError, RecycleStrategy, RuleConfig};
use crate::deal::{RandomShuffler, Shuffler, shuffled_board};
use crate::rules::{self, MoveResult, Placement, Rejection};

use log::{debug, info, trace};

/// A card played to a foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundationMove {
    pub card: Card,
    pub foundation: usize,
    /// Face-down card turned up on the source pile, for tableau sources.
    pub revealed: Option<Card>,
    pub source_emptied: bool,
    /// Whether this move completed the last foundation.
    pub won: bool,
}

/// A card or run laid on a tableau pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableauMove {
    pub placement: Placement,
    pub cards_moved: usize,
    pub revealed: Option<Card>,
    pub source_emptied: bool,
}

/// One game session. Every mutation goes through a command that validates first; a rejected
/// command leaves the game untouched.
#[derive(Debug, Clone)]
pub struct Game<S = RandomShuffler> {
    board: Board,
    rules: RuleConfig,
    shuffler: S,
    same_colour_moves_remaining: u8,
    score: u32,
    won: bool,
}

impl Game<RandomShuffler> {
    pub fn with_rules(rules: RuleConfig) -> Result<Self, ConfigError> {
        Self::new(rules, RandomShuffler::new())
    }
}

impl Default for Game<RandomShuffler> {
    fn default() -> Self {
        Self::with_rules(RuleConfig::default()).expect("default rules are valid")
    }
}

impl<S: Shuffler> Game<S> {
    /// Validates the rules and deals a first game.
    pub fn new(rules: RuleConfig, shuffler: S) -> Result<Self, ConfigError> {
        rules.validate()?;
        let mut game = Self {
            board: Board::new(),
            rules,
            shuffler,
            same_colour_moves_remaining: rules.same_colour_moves,
            score: 0,
            won: false,
        };
        game.new_game();
        Ok(game)
    }

    /// Resumes play from an arbitrary board, which must pass [`Board::validate`].
    pub fn from_board(board: Board, rules: RuleConfig, shuffler: S) -> anyhow::Result<Self> {
        rules.validate()?;
        board.validate()?;
        Ok(Self {
            score: board.foundation_score(),
            won: board.is_won(),
            board,
            rules,
            shuffler,
            same_colour_moves_remaining: rules.same_colour_moves,
        })
    }

    /// Throws the current game away and deals a fresh one.
    pub fn new_game(&mut self) {
        self.board = shuffled_board(&mut self.shuffler);
        self.same_colour_moves_remaining = self.rules.same_colour_moves;
        self.score = 0;
        self.won = false;
        info!(
            "New game dealt: {} cards in the stock, {} same-colour moves allowed",
            self.board.stock().len(),
            self.same_colour_moves_remaining
        );
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn same_colour_moves_remaining(&self) -> u8 {
        self.same_colour_moves_remaining
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn empty_tableau_count(&self) -> usize {
        self.board.empty_tableau_count()
    }

    /// Nothing is left to decide: the talon is spent, every tableau card is face up, and each
    /// pile descends one rank at a time from its base, so the piles unwind onto the foundations.
    pub fn is_forced_win(&self) -> bool {
        !self.board.is_won()
            && self.board.stock().is_empty()
            && self.board.waste().is_empty()
            && self
                .board
                .tableaus()
                .iter()
                .all(|t| t.is_fully_face_up() && t.descends_from_base())
    }

    pub fn draw_card(&mut self) -> MoveResult<Card> {
        let card = self
            .board
            .draw()
            .ok_or(Rejection::EmptySource)
            .inspect_err(|r| trace!("Draw rejected: {r}"))?;
        debug!("Drew {card}, {} left in the stock", self.board.stock().len());
        Ok(card)
    }

    fn check_recycle(&self) -> MoveResult<()> {
        if self.board.waste().is_empty() {
            Err(Rejection::EmptySource)
        } else if !self.board.stock().is_empty() {
            Err(Rejection::RuleViolation)
        } else {
            Ok(())
        }
    }

    /// Returns the waste to the stock in a fresh random order.
    pub fn shuffle_discard_pile(&mut self) -> MoveResult<usize> {
        self.check_recycle()
            .inspect_err(|r| trace!("Shuffle rejected: {r}"))?;
        let count = self.board.restock_shuffled(&mut self.shuffler);
        info!("Shuffled {count} waste cards back into the stock");
        Ok(count)
    }

    /// Returns the waste to the stock so the draws replay in the same order.
    pub fn restart_draw_pile(&mut self) -> MoveResult<usize> {
        self.check_recycle()
            .inspect_err(|r| trace!("Restart rejected: {r}"))?;
        let count = self.board.restart_stock();
        info!("Restarted the stock with {count} cards");
        Ok(count)
    }

    /// Recycles the waste with the configured strategy.
    pub fn recycle(&mut self) -> MoveResult<usize> {
        match self.rules.recycle {
            RecycleStrategy::Shuffle => self.shuffle_discard_pile(),
            RecycleStrategy::Restart => self.restart_draw_pile(),
        }
    }

    /// Undoes one draw. Needs a card below the waste top to expose.
    pub fn rewind_one_card(&mut self) -> MoveResult<Card> {
        let card = self
            .board
            .rewind()
            .ok_or(Rejection::EmptySource)
            .inspect_err(|r| trace!("Rewind rejected: {r}"))?;
        debug!("Rewound {card} onto the stock");
        Ok(card)
    }

    fn advance_foundation(&mut self, idx: usize) -> bool {
        self.board.foundations[idx].advance();
        self.score += 1;
        self.check_for_win()
    }

    pub fn play_discard_pile_card_to_foundation(&mut self) -> MoveResult<FoundationMove> {
        let foundation = rules::check_waste_to_foundation(&self.board)
            .inspect_err(|r| trace!("Waste to foundation rejected: {r}"))?;
        let card = self
            .board
            .waste
            .pop()
            .expect("validated waste has a top card");
        let won = self.advance_foundation(foundation);
        debug!("Played {card} from the waste to Foundation{}", foundation + 1);
        Ok(FoundationMove {
            card,
            foundation,
            revealed: None,
            source_emptied: self.board.waste().is_empty(),
            won,
        })
    }

    pub fn move_tableau_card_to_foundation(&mut self, pile: usize) -> MoveResult<FoundationMove> {
        let foundation = rules::check_tableau_to_foundation(&self.board, pile)
            .inspect_err(|r| trace!("Tableau{} to foundation rejected: {r}", pile + 1))?;
        let card = self.board.tableaus[pile]
            .pop()
            .expect("validated tableau has a top card");
        let revealed = self.board.tableaus[pile].flip_top();
        let won = self.advance_foundation(foundation);
        debug!(
            "Played {card} from Tableau{} to Foundation{}",
            pile + 1,
            foundation + 1
        );
        Ok(FoundationMove {
            card,
            foundation,
            revealed,
            source_emptied: self.board.tableaus[pile].is_empty(),
            won,
        })
    }

    fn spend_allowance(&mut self, placement: Placement) {
        if placement.uses_allowance() {
            self.same_colour_moves_remaining -= 1;
            debug!(
                "Same-colour move used, {} left",
                self.same_colour_moves_remaining
            );
        }
    }

    pub fn play_discard_pile_card_to_tableau(&mut self, target: usize) -> MoveResult<TableauMove> {
        let placement = rules::check_waste_to_tableau(
            &self.board,
            &self.rules,
            self.same_colour_moves_remaining,
            target,
        )
        .inspect_err(|r| trace!("Waste to Tableau{} rejected: {r}", target + 1))?;
        let card = self
            .board
            .waste
            .pop()
            .expect("validated waste has a top card");
        self.board.tableaus[target].push(card);
        self.spend_allowance(placement);
        debug!("Played {card} from the waste to Tableau{}", target + 1);
        Ok(TableauMove {
            placement,
            cards_moved: 1,
            revealed: None,
            source_emptied: self.board.waste().is_empty(),
        })
    }

    /// Moves the card at `card_index` of `source`, and every card above it, onto `target`.
    pub fn move_tableau_cards_to_another_tableau(
        &mut self,
        source: usize,
        card_index: usize,
        target: usize,
    ) -> MoveResult<TableauMove> {
        let placement = rules::check_tableau_to_tableau(
            &self.board,
            &self.rules,
            self.same_colour_moves_remaining,
            source,
            card_index,
            target,
        )
        .inspect_err(|r| {
            trace!(
                "Tableau{} to Tableau{} rejected: {r}",
                source + 1,
                target + 1
            )
        })?;
        let run = self.board.tableaus[source].split_off(card_index);
        let cards_moved = run.len();
        let base = run[0];
        self.board.tableaus[target].extend(run);
        let revealed = self.board.tableaus[source].flip_top();
        self.spend_allowance(placement);
        debug!(
            "Moved {cards_moved} card(s) from {base} on Tableau{} to Tableau{}",
            source + 1,
            target + 1
        );
        Ok(TableauMove {
            placement,
            cards_moved,
            revealed,
            source_emptied: self.board.tableaus[source].is_empty(),
        })
    }

    /// Turns up a face-down top card. Returns whether anything flipped.
    pub fn flip_top_tableau_card(&mut self, pile: usize) -> MoveResult<bool> {
        let tableau = self
            .board
            .tableaus
            .get_mut(pile)
            .ok_or(Rejection::NoSuchPile(pile))?;
        let flipped = tableau.flip_top();
        if let Some(card) = flipped {
            debug!("Flipped {card} on Tableau{}", pile + 1);
        }
        Ok(flipped.is_some())
    }

    /// Turns every tableau card face up without touching placement.
    pub fn reveal_all_tableau_cards(&mut self) -> usize {
        let flipped: usize = self
            .board
            .tableaus
            .iter_mut()
            .map(|t| t.reveal_all())
            .sum();
        debug!("Revealed {flipped} tableau cards");
        flipped
    }

    pub fn check_for_win(&mut self) -> bool {
        if !self.won && self.board.is_won() {
            self.won = true;
            info!("Game won with a score of {}", self.score);
        }
        self.won
    }

    /// Plays out a forced win, lowest tableau top first. Returns the number of cards played.
    pub fn fast_complete(&mut self) -> MoveResult<usize> {
        if !self.is_forced_win() {
            trace!("Fast complete rejected: the game is not a forced win");
            return Err(Rejection::RuleViolation);
        }
        let mut played = 0;
        while let Some(pile) = self.lowest_tableau_top() {
            self.move_tableau_card_to_foundation(pile)?;
            played += 1;
        }
        info!("Fast complete played {played} cards");
        Ok(played)
    }

    fn lowest_tableau_top(&self) -> Option<usize> {
        self.board
            .tableaus()
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.peek_top().map(|card| (card.value(), i)))
            .min()
            .map(|(_, i)| i)
    }
}
