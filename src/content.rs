//! Lesson content parsing.
//!
//! A lesson ships as one text blob with `---`-separated sections: title,
//! paragraphs, glossary, then optionally an audio directive and a question
//! bank. The first three are required; a blob without them is unusable and
//! loading fails outright. Everything optional degrades instead, so a typo
//! in the glossary or question sections never blanks the reading pane.

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::questions::{Question, parse_questions};

static RE_AUDIO_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r"audio-src\s*=\s*(\S+)").unwrap());

/// Parsed lesson, ready to hand to the widget.
#[derive(Debug, Clone)]
pub struct ContentDoc {
    pub title: String,
    pub paragraphs: Vec<String>,
    /// Raw glossary pairs as authored; keys get lowercased when the
    /// [`crate::glossary::Glossary`] is built.
    pub glossary_pairs: Vec<(String, String)>,
    pub audio_url: Option<String>,
    pub questions: Vec<Question>,
}

/// Read and parse a lesson file from disk.
pub fn load_content(path: &Path) -> Result<ContentDoc> {
    let blob = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lesson at {}", path.display()))?;
    let doc = parse_content(&blob)
        .with_context(|| format!("Failed to parse lesson at {}", path.display()))?;
    info!(
        title = %doc.title,
        paragraphs = doc.paragraphs.len(),
        glossary_entries = doc.glossary_pairs.len(),
        questions = doc.questions.len(),
        has_audio = doc.audio_url.is_some(),
        "Loaded lesson content"
    );
    Ok(doc)
}

/// Parse a lesson blob. Text is NFC-normalized up front so char offsets stay
/// stable between tokenization and speech-boundary reporting.
pub fn parse_content(blob: &str) -> Result<ContentDoc> {
    let blob: String = blob.nfc().collect();
    let sections: Vec<&str> = blob.split("---").map(str::trim).collect();
    if sections.len() < 3 {
        bail!(
            "Lesson content needs at least title, text and glossary sections separated by `---` (found {})",
            sections.len()
        );
    }

    let title = sections[0].to_string();
    let paragraphs: Vec<String> = sections[1]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let glossary_pairs = match parse_glossary(sections[2]) {
        Ok(pairs) => pairs,
        Err(err) => {
            warn!("Ignoring unreadable glossary section: {err}");
            Vec::new()
        }
    };

    let audio_url = sections
        .get(3)
        .filter(|section| section.starts_with("audio"))
        .and_then(|section| RE_AUDIO_SRC.captures(section))
        .map(|caps| caps[1].to_string());

    let questions = sections
        .get(4)
        .and_then(|section| section.strip_prefix("questions"))
        .map(parse_questions)
        .unwrap_or_default();

    Ok(ContentDoc {
        title,
        paragraphs,
        glossary_pairs,
        audio_url,
        questions,
    })
}

/// Glossary sections are comma-separated `word: translation` pairs. Empty
/// pieces (e.g. a trailing comma) are tolerated; a piece without a colon or
/// without a word marks the whole section unreadable.
fn parse_glossary(section: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for piece in section.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let mut parts = piece.split(':');
        let word = parts.next().map(str::trim).unwrap_or_default();
        let Some(translation) = parts.next().map(str::trim) else {
            bail!("glossary entry {piece:?} has no `word: translation` shape");
        };
        if word.is_empty() {
            bail!("glossary entry {piece:?} has an empty word");
        }
        pairs.push((word.to_string(), translation.to_string()));
    }
    Ok(pairs)
}
