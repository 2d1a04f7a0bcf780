//! Multiple-choice quiz: english prompt, four translation options.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use super::{MIN_ACTIVITY_WORDS, sample_words};
use crate::word_list::SavedWord;

pub const OPTION_COUNT: usize = 4;

/// One prompt with its shuffled options. The right option is the one whose
/// english matches the prompt's.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub prompt: SavedWord,
    pub options: Vec<SavedWord>,
}

/// A quiz run: fixed question order, one locked-in answer per question,
/// score at the end.
#[derive(Debug, Clone)]
pub struct QuizRound {
    questions: Vec<QuizQuestion>,
    selection: Vec<SavedWord>,
    current: usize,
    score: usize,
    answered: Option<usize>,
}

impl QuizRound {
    /// Deal a fresh quiz from a sample of the pool. Pools under four words
    /// cannot fill an option set, so they refuse to start.
    pub fn start(pool: &[SavedWord], count: usize, rng: &mut impl Rng) -> Option<QuizRound> {
        if pool.len() < MIN_ACTIVITY_WORDS {
            return None;
        }
        let selection = sample_words(pool, count, rng);
        Some(QuizRound::from_selection(pool, selection, rng))
    }

    /// Replay with the same words in a fresh order. Distractors still come
    /// from the current pool, which may have changed since the last run.
    pub fn restart_same(&self, pool: &[SavedWord], rng: &mut impl Rng) -> QuizRound {
        QuizRound::from_selection(pool, self.selection.clone(), rng)
    }

    fn from_selection(
        pool: &[SavedWord],
        mut selection: Vec<SavedWord>,
        rng: &mut impl Rng,
    ) -> QuizRound {
        selection.shuffle(rng);
        let questions = build_questions(pool, &selection, rng);
        info!(questions = questions.len(), "Quiz started");
        QuizRound {
            questions,
            selection,
            current: 0,
            score: 0,
            answered: None,
        }
    }

    /// Lock in an option. Returns whether it was right, or `None` when the
    /// index is out of range, the question is already answered, or the quiz
    /// is over.
    pub fn answer(&mut self, option_idx: usize) -> Option<bool> {
        if self.answered.is_some() {
            return None;
        }
        let question = self.questions.get(self.current)?;
        let option = question.options.get(option_idx)?;
        let correct = option.english == question.prompt.english;
        self.answered = Some(option_idx);
        if correct {
            self.score += 1;
        }
        debug!(question = self.current, correct, "Quiz answer locked in");
        Some(correct)
    }

    /// Move to the next question; only valid once the current one is
    /// answered.
    pub fn advance(&mut self) {
        if self.answered.take().is_some() {
            self.current += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    pub fn answered_option(&self) -> Option<usize> {
        self.answered
    }

    /// Index of the right option, revealed once the question is answered.
    pub fn correct_option(&self) -> Option<usize> {
        self.answered?;
        let question = self.questions.get(self.current)?;
        question
            .options
            .iter()
            .position(|o| o.english == question.prompt.english)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn selection(&self) -> &[SavedWord] {
        &self.selection
    }
}

/// Each question gets the prompt plus up to three distractors drawn from
/// the whole pool, all shuffled together.
fn build_questions(
    pool: &[SavedWord],
    selection: &[SavedWord],
    rng: &mut impl Rng,
) -> Vec<QuizQuestion> {
    selection
        .iter()
        .map(|prompt| {
            let mut options: Vec<SavedWord> = pool
                .iter()
                .filter(|w| w.english != prompt.english)
                .cloned()
                .collect();
            options.shuffle(rng);
            options.truncate(OPTION_COUNT - 1);
            options.push(prompt.clone());
            options.shuffle(rng);
            QuizQuestion {
                prompt: prompt.clone(),
                options,
            }
        })
        .collect()
}
