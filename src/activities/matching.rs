//! Memory matching game: every word becomes an english card and a thai
//! card, face down in one shuffled deck.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use super::{MIN_ACTIVITY_WORDS, sample_words};
use crate::word_list::SavedWord;

/// Which face of a pair a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CardSide {
    English,
    Thai,
}

/// One card on the board; both cards of a word share a `pair_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    pub side: CardSide,
    pub text: String,
    pub pair_id: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// The click changed nothing: locked board, bad index, or a card that is
    /// already up.
    Ignored,
    /// First card of a try turned up.
    Revealed,
    Matched { completed: bool },
    /// Board locks until the host acknowledges with a mismatch resolve.
    Mismatched,
}

#[derive(Debug, Clone)]
pub struct MatchBoard {
    cards: Vec<MatchCard>,
    selection: Vec<SavedWord>,
    face_up: Vec<bool>,
    matched: Vec<bool>,
    picked: Vec<usize>,
    mismatch: Option<(usize, usize)>,
    matched_pairs: usize,
}

impl MatchBoard {
    /// Deal a board from a sample of the pool; under four words there is no
    /// game to play.
    pub fn start(pool: &[SavedWord], count: usize, rng: &mut impl Rng) -> Option<MatchBoard> {
        if pool.len() < MIN_ACTIVITY_WORDS {
            return None;
        }
        let selection = sample_words(pool, count, rng);
        Some(MatchBoard::from_selection(selection, rng))
    }

    /// Redeal the same words in a fresh layout.
    pub fn restart_same(&self, rng: &mut impl Rng) -> MatchBoard {
        MatchBoard::from_selection(self.selection.clone(), rng)
    }

    fn from_selection(selection: Vec<SavedWord>, rng: &mut impl Rng) -> MatchBoard {
        let cards = build_cards(&selection, rng);
        info!(pairs = selection.len(), "Matching board dealt");
        let count = cards.len();
        MatchBoard {
            cards,
            selection,
            face_up: vec![false; count],
            matched: vec![false; count],
            picked: Vec::new(),
            mismatch: None,
            matched_pairs: 0,
        }
    }

    /// Turn a card up. The second card of a try either locks the pair in or
    /// locks the whole board until the mismatch is resolved.
    pub fn flip(&mut self, card_idx: usize) -> FlipOutcome {
        if self.mismatch.is_some() || card_idx >= self.cards.len() {
            return FlipOutcome::Ignored;
        }
        if self.face_up[card_idx] || self.matched[card_idx] {
            return FlipOutcome::Ignored;
        }

        self.face_up[card_idx] = true;
        self.picked.push(card_idx);
        if self.picked.len() < 2 {
            return FlipOutcome::Revealed;
        }

        let (first, second) = (self.picked[0], self.picked[1]);
        self.picked.clear();
        if self.cards[first].pair_id == self.cards[second].pair_id {
            self.matched[first] = true;
            self.matched[second] = true;
            self.matched_pairs += 1;
            let completed = self.matched_pairs == self.selection.len();
            debug!(pairs = self.matched_pairs, completed, "Pair matched");
            FlipOutcome::Matched { completed }
        } else {
            debug!(first, second, "Mismatch; board locked");
            self.mismatch = Some((first, second));
            FlipOutcome::Mismatched
        }
    }

    /// Host acknowledgment after its flip-back delay: turn the mismatched
    /// pair down and unlock the board.
    pub fn resolve_mismatch(&mut self) {
        if let Some((first, second)) = self.mismatch.take() {
            self.face_up[first] = false;
            self.face_up[second] = false;
        }
    }

    pub fn cards(&self) -> &[MatchCard] {
        &self.cards
    }

    pub fn is_face_up(&self, card_idx: usize) -> bool {
        self.face_up.get(card_idx).copied().unwrap_or(false)
    }

    pub fn is_matched(&self, card_idx: usize) -> bool {
        self.matched.get(card_idx).copied().unwrap_or(false)
    }

    pub fn is_locked(&self) -> bool {
        self.mismatch.is_some()
    }

    pub fn mismatch(&self) -> Option<(usize, usize)> {
        self.mismatch
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn pair_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_completed(&self) -> bool {
        self.matched_pairs == self.selection.len()
    }

    pub fn selection(&self) -> &[SavedWord] {
        &self.selection
    }
}

fn build_cards(selection: &[SavedWord], rng: &mut impl Rng) -> Vec<MatchCard> {
    let mut cards = Vec::with_capacity(selection.len() * 2);
    for (pair_id, word) in selection.iter().enumerate() {
        cards.push(MatchCard {
            side: CardSide::English,
            text: word.english.clone(),
            pair_id,
        });
        cards.push(MatchCard {
            side: CardSide::Thai,
            text: word.thai.clone(),
            pair_id,
        });
    }
    cards.shuffle(rng);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(n: usize) -> Vec<SavedWord> {
        (0..n)
            .map(|i| SavedWord {
                english: format!("word{i}"),
                thai: format!("คำ{i}"),
            })
            .collect()
    }

    fn board_of(pairs: usize, seed: u64) -> MatchBoard {
        let mut rng = StdRng::seed_from_u64(seed);
        MatchBoard::start(&pool(pairs.max(MIN_ACTIVITY_WORDS)), pairs, &mut rng)
            .expect("pool is large enough")
    }

    /// Index of the other card sharing `pair_id`.
    fn partner(board: &MatchBoard, card_idx: usize) -> usize {
        let pair_id = board.cards()[card_idx].pair_id;
        board
            .cards()
            .iter()
            .enumerate()
            .find(|(idx, card)| *idx != card_idx && card.pair_id == pair_id)
            .map(|(idx, _)| idx)
            .expect("every card has a partner")
    }

    /// Some card whose pair differs from the one at `card_idx`.
    fn stranger(board: &MatchBoard, card_idx: usize) -> usize {
        let pair_id = board.cards()[card_idx].pair_id;
        board
            .cards()
            .iter()
            .position(|card| card.pair_id != pair_id)
            .expect("board has more than one pair")
    }

    #[test]
    fn small_pools_refuse_to_deal() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(MatchBoard::start(&pool(3), 4, &mut rng).is_none());
    }

    #[test]
    fn every_word_gets_an_english_and_a_thai_card() {
        let board = board_of(4, 2);
        assert_eq!(board.cards().len(), 8);
        for pair_id in 0..4 {
            let sides: Vec<CardSide> = board
                .cards()
                .iter()
                .filter(|c| c.pair_id == pair_id)
                .map(|c| c.side)
                .collect();
            assert_eq!(sides.len(), 2);
            assert!(sides.contains(&CardSide::English));
            assert!(sides.contains(&CardSide::Thai));
        }
    }

    #[test]
    fn matching_two_cards_locks_them_in_without_locking_the_board() {
        let mut board = board_of(4, 3);
        assert_eq!(board.flip(0), FlipOutcome::Revealed);
        let partner_idx = partner(&board, 0);
        assert_eq!(
            board.flip(partner_idx),
            FlipOutcome::Matched { completed: false }
        );
        assert!(board.is_matched(0));
        assert!(board.is_matched(partner_idx));
        assert!(!board.is_locked());
        assert_eq!(board.matched_pairs(), 1);
    }

    #[test]
    fn mismatch_locks_the_board_until_resolved() {
        let mut board = board_of(4, 4);
        board.flip(0);
        let stranger_idx = stranger(&board, 0);
        assert_eq!(board.flip(stranger_idx), FlipOutcome::Mismatched);
        assert!(board.is_locked());
        assert_eq!(board.flip(partner(&board, 0)), FlipOutcome::Ignored);

        board.resolve_mismatch();
        assert!(!board.is_locked());
        assert!(!board.is_face_up(0));
        assert!(!board.is_face_up(stranger_idx));
        assert_eq!(board.matched_pairs(), 0);
    }

    #[test]
    fn face_up_and_matched_cards_ignore_clicks() {
        let mut board = board_of(4, 5);
        board.flip(0);
        assert_eq!(board.flip(0), FlipOutcome::Ignored);
        let partner_idx = partner(&board, 0);
        board.flip(partner_idx);
        assert_eq!(board.flip(partner_idx), FlipOutcome::Ignored);
        assert_eq!(board.flip(99), FlipOutcome::Ignored);
    }

    #[test]
    fn completing_every_pair_reports_completion() {
        let mut board = board_of(4, 6);
        let mut outcomes = Vec::new();
        for pair_id in 0..4 {
            let first = board
                .cards()
                .iter()
                .position(|c| c.pair_id == pair_id)
                .expect("pair exists");
            board.flip(first);
            outcomes.push(board.flip(partner(&board, first)));
        }
        assert_eq!(outcomes.last(), Some(&FlipOutcome::Matched { completed: true }));
        assert!(board.is_completed());
        assert_eq!(board.matched_pairs(), board.pair_count());
    }

    #[test]
    fn restart_same_redeals_the_same_words_face_down() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = board_of(4, 7);
        board.flip(0);
        board.flip(partner(&board, 0));
        let redeal = board.restart_same(&mut rng);
        let mut before: Vec<&str> = board.selection().iter().map(|w| w.english.as_str()).collect();
        let mut after: Vec<&str> = redeal.selection().iter().map(|w| w.english.as_str()).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
        assert_eq!(redeal.matched_pairs(), 0);
        assert!((0..redeal.cards().len()).all(|idx| !redeal.is_face_up(idx)));
    }
}
