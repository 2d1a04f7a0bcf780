//! The saved-word list: persistence, ordering, dedupe and CSV export.
//!
//! The list lives in the store as a JSON array under
//! [`crate::store::WORD_LIST_KEY`]. Every operation reads the stored value
//! fresh and writes the whole list back, so hosts sharing one store see each
//! other's edits without extra plumbing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::store::{KvStore, WORD_LIST_KEY};

/// One saved vocabulary entry. `english` keeps the casing it was saved with;
/// dedupe and lookups treat it case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedWord {
    pub english: String,
    pub thai: String,
}

/// Read the list, newest first. Missing or corrupt values yield an empty
/// list so a damaged store never takes the widget down.
pub fn load_word_list(store: &dyn KvStore) -> Vec<SavedWord> {
    let Some(raw) = store.get(WORD_LIST_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(words) => words,
        Err(err) => {
            warn!("Discarding unreadable word list: {err}");
            Vec::new()
        }
    }
}

/// Write the whole list back. Serialization failure is logged and dropped,
/// store write errors are the store's problem.
pub fn save_word_list(store: &mut dyn KvStore, words: &[SavedWord]) {
    match serde_json::to_string(words) {
        Ok(raw) => store.set(WORD_LIST_KEY, &raw),
        Err(err) => warn!("Could not serialize word list: {err}"),
    }
}

/// Prepend a word unless an entry with the same english form (ignoring case)
/// already exists. Returns whether the list changed.
pub fn add_word(store: &mut dyn KvStore, word: SavedWord) -> bool {
    let mut words = load_word_list(store);
    let key = word.english.to_lowercase();
    if words.iter().any(|w| w.english.to_lowercase() == key) {
        debug!(word = %word.english, "Word already saved; keeping first entry");
        return false;
    }
    words.insert(0, word);
    save_word_list(store, &words);
    true
}

/// Drop a word by its english form (ignoring case). Returns whether the list
/// changed.
pub fn remove_word(store: &mut dyn KvStore, english: &str) -> bool {
    let mut words = load_word_list(store);
    let key = english.to_lowercase();
    let before = words.len();
    words.retain(|w| w.english.to_lowercase() != key);
    if words.len() == before {
        return false;
    }
    save_word_list(store, &words);
    true
}

/// Render the list as `english,thai` lines in list order. Values are taken
/// verbatim, so a comma inside a field shifts columns; the format matches
/// what the original exporter produced.
pub fn export_csv(words: &[SavedWord]) -> String {
    words
        .iter()
        .map(|w| format!("{},{}", w.english, w.thai))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn word(english: &str, thai: &str) -> SavedWord {
        SavedWord {
            english: english.to_string(),
            thai: thai.to_string(),
        }
    }

    #[test]
    fn new_words_land_at_the_front() {
        let mut store = MemStore::new();
        assert!(add_word(&mut store, word("cat", "แมว")));
        assert!(add_word(&mut store, word("dog", "หมา")));
        let words = load_word_list(&store);
        assert_eq!(words[0].english, "dog");
        assert_eq!(words[1].english, "cat");
    }

    #[test]
    fn adding_dedupes_case_insensitively_keeping_the_first_entry() {
        let mut store = MemStore::new();
        assert!(add_word(&mut store, word("Cat", "แมว")));
        assert!(!add_word(&mut store, word("cat", "อื่น")));
        let words = load_word_list(&store);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].english, "Cat");
        assert_eq!(words[0].thai, "แมว");
    }

    #[test]
    fn removing_ignores_missing_words() {
        let mut store = MemStore::new();
        add_word(&mut store, word("cat", "แมว"));
        assert!(!remove_word(&mut store, "dog"));
        assert!(remove_word(&mut store, "CAT"));
        assert!(load_word_list(&store).is_empty());
    }

    #[test]
    fn corrupt_store_values_read_as_empty() {
        let mut store = MemStore::new();
        store.set(WORD_LIST_KEY, "{not json");
        assert!(load_word_list(&store).is_empty());
    }

    #[test]
    fn csv_lines_keep_list_order_and_raw_values() {
        let words = vec![word("cat", "แมว"), word("so, yes", "ใช่")];
        assert_eq!(export_csv(&words), "cat,แมว\nso, yes,ใช่");
        assert_eq!(export_csv(&[]), "");
    }

    #[test]
    fn list_reads_see_external_store_changes() {
        let mut store = MemStore::new();
        add_word(&mut store, word("cat", "แมว"));
        store.set(WORD_LIST_KEY, "[]");
        assert!(load_word_list(&store).is_empty());
    }
}
