//! Splits lesson paragraphs into offset-stable word and separator runs.
//!
//! Offsets count Unicode scalar values over the paragraphs joined with a
//! single `'\n'`, which is exactly the text handed to the speech engine.
//! Boundary callbacks report indices into that joined text, so highlighting
//! only works if both sides agree on this scheme.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One run of word or separator characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Token {
    pub text: String,
    /// Inclusive char offset into the joined text.
    pub start_offset: usize,
    /// Exclusive char offset into the joined text.
    pub end_offset: usize,
    pub is_word: bool,
}

impl Token {
    /// Lowercased form used for glossary and saved-list lookups.
    pub fn key(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn char_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// Word runs may carry apostrophes and hyphens so contractions and compounds
/// stay whole.
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\'' || ch == '-'
}

/// Join paragraphs the way the speech engine receives them.
pub fn join_paragraphs(paragraphs: &[String]) -> String {
    paragraphs.join("\n")
}

/// Tokenize paragraphs into runs that partition the joined text exactly.
///
/// A run is a word when it contains at least one alphanumeric char, so a
/// stray `--` stays a separator even though `-` is a word char. The implied
/// `'\n'` between paragraphs advances offsets by one but never becomes a
/// token of its own when it would be empty.
pub fn tokenize(paragraphs: &[String]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0usize;

    for (idx, paragraph) in paragraphs.iter().enumerate() {
        if idx > 0 {
            // The joined '\n' separator between paragraphs.
            cursor += 1;
        }
        tokenize_paragraph(paragraph, cursor, &mut tokens);
        cursor += paragraph.chars().count();
    }

    tokens
}

fn tokenize_paragraph(paragraph: &str, base: usize, tokens: &mut Vec<Token>) {
    let mut current = String::new();
    let mut current_start = 0usize;
    let mut current_is_word = false;
    let mut offset = 0usize;

    for ch in paragraph.chars() {
        let word_char = is_word_char(ch);
        if current.is_empty() {
            current_start = offset;
            current_is_word = word_char;
        } else if word_char != current_is_word {
            push_token(tokens, &current, base + current_start, current_is_word);
            current.clear();
            current_start = offset;
            current_is_word = word_char;
        }
        current.push(ch);
        offset += 1;
    }

    if !current.is_empty() {
        push_token(tokens, &current, base + current_start, current_is_word);
    }
}

fn push_token(tokens: &mut Vec<Token>, text: &str, start: usize, word_class: bool) {
    // A run of word-class chars with no alphanumeric in it ("--", "'") reads
    // as punctuation, not a word.
    let is_word = word_class && text.chars().any(char::is_alphanumeric);
    tokens.push(Token {
        text: text.to_string(),
        start_offset: start,
        end_offset: start + text.chars().count(),
        is_word,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn reassemble(paragraphs: &[String], tokens: &[Token]) -> String {
        let joined = join_paragraphs(paragraphs);
        let chars: Vec<char> = joined.chars().collect();
        let mut out = String::new();
        let mut cursor = 0;
        for token in tokens {
            while cursor < token.start_offset {
                out.push(chars[cursor]);
                cursor += 1;
            }
            out.push_str(&token.text);
            cursor = token.end_offset;
        }
        while cursor < chars.len() {
            out.push(chars[cursor]);
            cursor += 1;
        }
        out
    }

    #[test]
    fn tokens_partition_the_joined_text_exactly() {
        let text = paragraphs(&["The cat sat.", "It purred, twice!"]);
        let tokens = tokenize(&text);
        assert_eq!(reassemble(&text, &tokens), join_paragraphs(&text));
        for pair in tokens.windows(2) {
            assert!(pair[0].end_offset <= pair[1].start_offset);
        }
    }

    #[test]
    fn simple_sentence_splits_into_expected_words() {
        let tokens = tokenize(&paragraphs(&["The cat sat."]));
        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is_word)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(words, ["The", "cat", "sat"]);
        assert_eq!(tokens.last().map(|t| t.text.as_str()), Some("."));
    }

    #[test]
    fn apostrophes_and_hyphens_stay_inside_words() {
        let tokens = tokenize(&paragraphs(&["don't re-read"]));
        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is_word)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(words, ["don't", "re-read"]);
    }

    #[test]
    fn punctuation_only_runs_are_not_words() {
        let tokens = tokenize(&paragraphs(&["wait -- what"]));
        let dashes = tokens
            .iter()
            .find(|t| t.text.contains("--"))
            .expect("dash run should tokenize");
        assert!(!dashes.is_word);
    }

    #[test]
    fn paragraph_joins_advance_offsets_by_one() {
        let text = paragraphs(&["One", "Two"]);
        let tokens = tokenize(&text);
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 3);
        // "One\nTwo": the second word starts after the joined newline.
        assert_eq!(tokens[1].start_offset, 4);
        assert_eq!(tokens[1].text, "Two");
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let text = paragraphs(&["แมว cat"]);
        let tokens = tokenize(&text);
        let cat = tokens
            .iter()
            .find(|t| t.text == "cat")
            .expect("ascii word should tokenize");
        assert_eq!(cat.start_offset, 4);
        assert_eq!(cat.end_offset, 7);
    }

    #[test]
    fn empty_paragraph_list_yields_no_tokens() {
        assert!(tokenize(&[]).is_empty());
        assert!(tokenize(&paragraphs(&[""])).is_empty());
    }

    #[test]
    fn lookup_key_lowercases_text() {
        let tokens = tokenize(&paragraphs(&["Cat"]));
        assert_eq!(tokens[0].key(), "cat");
    }
}
