//! Saved-word activities: sampling, sizing, and the two games.

pub mod matching;
pub mod quiz;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use ts_rs::TS;

use crate::word_list::SavedWord;

/// Activities need four words before they make sense: a quiz question wants
/// three distractors, a board wants a few pairs.
pub const MIN_ACTIVITY_WORDS: usize = 4;

const FIXED_COUNTS: [usize; 4] = [4, 8, 12, 16];

/// One entry in the "how many words" picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct WordCountOption {
    pub value: usize,
    /// Marks the "All (N words)" entry; N is the pool rounded down to even.
    pub all: bool,
}

/// Fixed sizes that fit the pool, plus an "All" entry when the even-rounded
/// pool size is not already offered. Pools under four words offer nothing.
pub fn word_count_options(pool_len: usize) -> Vec<WordCountOption> {
    let mut options: Vec<WordCountOption> = FIXED_COUNTS
        .iter()
        .copied()
        .filter(|&value| value <= pool_len)
        .map(|value| WordCountOption { value, all: false })
        .collect();

    let all_count = pool_len - pool_len % 2;
    if all_count >= MIN_ACTIVITY_WORDS && !options.iter().any(|o| o.value == all_count) {
        options.push(WordCountOption {
            value: all_count,
            all: true,
        });
    }
    options
}

/// Shuffle-and-truncate sample shared by both games.
pub fn sample_words(pool: &[SavedWord], count: usize, rng: &mut impl Rng) -> Vec<SavedWord> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// Whether a finished game should offer the same-words/new-words choice.
/// With the whole pool in play there is nothing new to draw, so the host
/// shows a single replay instead.
pub fn replay_has_choice(pool_len: usize, used: usize) -> bool {
    pool_len > used && used > 0
}
