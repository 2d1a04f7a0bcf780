//! Comprehension-question parsing.
//!
//! The question bank is line-oriented: `Q:` starts a question, `A:` adds an
//! answer to the current one, and an answer ending in `[correct]` is the one
//! the reveal colors green. Anything else is ignored, as are `A:` lines
//! before the first `Q:`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub correct: bool,
}

pub fn parse_questions(text: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut current: Option<Question> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix("Q:") {
            if let Some(done) = current.take() {
                questions.push(done);
            }
            current = Some(Question {
                prompt: rest.trim().to_string(),
                answers: Vec::new(),
            });
        } else if let Some(rest) = line.strip_prefix("A:") {
            if let Some(question) = current.as_mut() {
                question.answers.push(parse_answer(rest));
            }
        }
    }

    if let Some(done) = current {
        questions.push(done);
    }
    questions
}

/// Only the text before the first `[` is the answer; the marker must read
/// exactly `[correct]` with nothing after it.
fn parse_answer(rest: &str) -> Answer {
    let mut segments = rest.split('[');
    let text = segments.next().unwrap_or_default().trim().to_string();
    let correct = segments.next().map(str::trim) == Some("correct]");
    Answer { text, correct }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_and_a_lines_build_questions() {
        let bank = parse_questions("Q: Who sat?\nA: The cat [correct]\nA: The dog");
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].prompt, "Who sat?");
        assert_eq!(
            bank[0].answers,
            [
                Answer {
                    text: "The cat".to_string(),
                    correct: true
                },
                Answer {
                    text: "The dog".to_string(),
                    correct: false
                }
            ]
        );
    }

    #[test]
    fn several_questions_split_on_q_lines() {
        let bank = parse_questions("Q: One?\nA: a\nQ: Two?\nA: b [correct]");
        assert_eq!(bank.len(), 2);
        assert_eq!(bank[1].prompt, "Two?");
        assert!(bank[1].answers[0].correct);
    }

    #[test]
    fn answers_before_any_question_are_dropped() {
        let bank = parse_questions("A: orphan\nQ: Real?\nA: yes [correct]");
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].answers.len(), 1);
    }

    #[test]
    fn stray_lines_and_blanks_are_ignored() {
        let bank = parse_questions("intro notes\n\nQ: Real?\n  \nnote\nA: yes");
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].prompt, "Real?");
        assert_eq!(bank[0].answers.len(), 1);
    }

    #[test]
    fn correct_marker_must_match_exactly() {
        let bank = parse_questions("Q: Pick\nA: a [correct]\nA: b [correct] extra\nA: c [wrong]");
        let flags: Vec<bool> = bank[0].answers.iter().map(|a| a.correct).collect();
        assert_eq!(flags, [true, false, false]);
        assert_eq!(bank[0].answers[1].text, "b");
    }

    #[test]
    fn empty_text_yields_no_questions() {
        assert!(parse_questions("").is_empty());
        assert!(parse_questions("\n  \n").is_empty());
    }
}
