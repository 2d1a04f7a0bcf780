//! Case-insensitive word-to-translation lookups.
//!
//! Two layers: the base mapping parsed from the lesson blob, and an overlay
//! fed by the saved-word list. Saving a word with a translation shadows the
//! base entry; removing it drops only the overlay, so the lesson's own
//! translation comes back instead of disappearing with the saved word.

use std::collections::HashMap;
use tracing::debug;

use crate::word_list::SavedWord;

#[derive(Debug, Clone, Default)]
pub struct Glossary {
    base: HashMap<String, String>,
    overlay: HashMap<String, String>,
}

impl Glossary {
    /// Build the base layer from parsed lesson pairs. Keys are lowercased so
    /// lookups through [`crate::tokenizer::Token::key`] always hit.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut base = HashMap::new();
        for (word, translation) in pairs {
            base.insert(word.to_lowercase(), translation.clone());
        }
        Glossary {
            base,
            overlay: HashMap::new(),
        }
    }

    /// Overlay translations carried by the saved-word list, e.g. at startup.
    pub fn merge_saved(&mut self, words: &[SavedWord]) {
        let mut merged = 0usize;
        for word in words {
            if !word.thai.trim().is_empty() {
                self.overlay
                    .insert(word.english.to_lowercase(), word.thai.clone());
                merged += 1;
            }
        }
        if merged > 0 {
            debug!(merged, "Merged saved-word translations into glossary");
        }
    }

    /// Record or replace a user-supplied translation. Empty input leaves the
    /// glossary untouched, matching how saves without a translation behave.
    pub fn upsert(&mut self, english: &str, thai: &str) {
        if thai.trim().is_empty() {
            return;
        }
        self.overlay
            .insert(english.to_lowercase(), thai.to_string());
    }

    /// Drop the user-supplied translation for a word, if any. The base layer
    /// is never touched.
    pub fn remove(&mut self, english: &str) {
        self.overlay.remove(&english.to_lowercase());
    }

    /// Case-insensitive lookup, overlay first. Entries with an empty
    /// translation count as absent.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        let key = word.to_lowercase();
        self.overlay
            .get(&key)
            .or_else(|| self.base.get(&key))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    pub fn has_definition(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.overlay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.overlay.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_glossary() -> Glossary {
        Glossary::from_pairs(&[
            ("cat".to_string(), "แมว".to_string()),
            ("sat".to_string(), "นั่ง".to_string()),
        ])
    }

    #[test]
    fn lookup_is_case_insensitive_on_both_sides() {
        let mut glossary = Glossary::from_pairs(&[("Cat".to_string(), "แมว".to_string())]);
        assert_eq!(glossary.lookup("cat"), Some("แมว"));
        assert_eq!(glossary.lookup("CAT"), Some("แมว"));
        glossary.upsert("DOG", "หมา");
        assert_eq!(glossary.lookup("dog"), Some("หมา"));
    }

    #[test]
    fn saved_words_shadow_base_entries() {
        let mut glossary = base_glossary();
        glossary.merge_saved(&[SavedWord {
            english: "cat".to_string(),
            thai: "แมวเหมียว".to_string(),
        }]);
        assert_eq!(glossary.lookup("cat"), Some("แมวเหมียว"));
    }

    #[test]
    fn removing_an_overlay_restores_the_base_translation() {
        let mut glossary = base_glossary();
        glossary.upsert("cat", "แมวเหมียว");
        glossary.remove("cat");
        assert_eq!(glossary.lookup("cat"), Some("แมว"));
        glossary.remove("sat");
        assert_eq!(glossary.lookup("sat"), Some("นั่ง"));
    }

    #[test]
    fn empty_translations_do_not_count_as_definitions() {
        let mut glossary = Glossary::from_pairs(&[("bare".to_string(), String::new())]);
        assert!(!glossary.has_definition("bare"));
        glossary.upsert("bare", "   ");
        assert!(!glossary.has_definition("bare"));
        glossary.merge_saved(&[SavedWord {
            english: "bare".to_string(),
            thai: "  ".to_string(),
        }]);
        assert!(!glossary.has_definition("bare"));
    }

    #[test]
    fn unknown_words_have_no_definition() {
        let glossary = base_glossary();
        assert_eq!(glossary.lookup("dog"), None);
        assert!(!glossary.has_definition("dog"));
    }
}
