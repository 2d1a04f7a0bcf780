//! Maps speech-boundary char indices onto word tokens.
//!
//! Engines are sloppy about where a boundary lands: some report the space
//! before a word, some skip punctuation runs entirely, and a final boundary
//! can point past the end of the text. Resolution therefore walks word
//! tokens only and degrades in order: the token containing the index, else
//! the next word after it, else the last word in the text.

use crate::tokenizer::Token;

/// Resolve a boundary char index to a token index. `None` only when the
/// text has no word tokens at all.
pub fn resolve(tokens: &[Token], global_char_index: usize) -> Option<usize> {
    let mut first_after = None;
    let mut last_word = None;

    for (idx, token) in tokens.iter().enumerate() {
        if !token.is_word {
            continue;
        }
        if token.start_offset <= global_char_index && global_char_index < token.end_offset {
            return Some(idx);
        }
        if first_after.is_none() && token.start_offset >= global_char_index {
            first_after = Some(idx);
        }
        last_word = Some(idx);
    }

    first_after.or(last_word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn tokens_for(text: &str) -> Vec<Token> {
        tokenize(&[text.to_string()])
    }

    #[test]
    fn index_inside_a_word_resolves_that_word() {
        // "The cat sat." -> cat spans chars 4..7.
        let tokens = tokens_for("The cat sat.");
        let idx = resolve(&tokens, 5).expect("index inside cat should resolve");
        assert_eq!(tokens[idx].text, "cat");
    }

    #[test]
    fn word_start_resolves_that_word() {
        let tokens = tokens_for("The cat sat.");
        let idx = resolve(&tokens, 4).expect("start of cat should resolve");
        assert_eq!(tokens[idx].text, "cat");
    }

    #[test]
    fn separator_offsets_resolve_to_the_next_word() {
        // Char 3 is the space between "The" and "cat".
        let tokens = tokens_for("The cat sat.");
        let idx = resolve(&tokens, 3).expect("separator should resolve forward");
        assert_eq!(tokens[idx].text, "cat");
    }

    #[test]
    fn indices_past_the_end_fall_back_to_the_last_word() {
        let tokens = tokens_for("The cat sat.");
        let idx = resolve(&tokens, 500).expect("overrun should resolve to last word");
        assert_eq!(tokens[idx].text, "sat");
    }

    #[test]
    fn trailing_punctuation_is_never_highlighted() {
        // Char 11 is the final period; the nearest word wins instead.
        let tokens = tokens_for("The cat sat.");
        let idx = resolve(&tokens, 11).expect("period offset should resolve to a word");
        assert!(tokens[idx].is_word);
        assert_eq!(tokens[idx].text, "sat");
    }

    #[test]
    fn text_without_words_resolves_nothing() {
        let tokens = tokens_for("... --- ...");
        assert_eq!(resolve(&tokens, 0), None);
        assert!(resolve(&[], 3).is_none());
    }
}
