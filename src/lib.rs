//! Headless core for an embeddable reading-practice widget.
//!
//! The crate owns everything except rendering and raw input:
//! - Parse a lesson blob into title, paragraphs, glossary, audio and questions.
//! - Tokenize paragraphs into offset-stable word/separator runs.
//! - Drive playback (speech synthesis or a pre-recorded clip) and map
//!   boundary callbacks back onto word tokens for highlighting.
//! - Persist the saved-word list and theme through a key-value store.
//! - Run the multiple-choice quiz and the memory matching game.
//!
//! Hosts construct a [`session::ReaderWidget`], feed it [`session::WidgetCommand`]s,
//! poll [`session::ReaderWidget::pump`] while audio is live, and render the
//! [`session::WidgetSnapshot`] each event carries.

pub mod activities;
pub mod config;
pub mod content;
pub mod glossary;
pub mod highlight;
pub mod playback;
pub mod questions;
pub mod session;
pub mod store;
pub mod theme;
pub mod tokenizer;
pub mod word_list;

pub use content::{ContentDoc, load_content, parse_content};
pub use session::{ReaderWidget, WidgetCommand, WidgetEvent, WidgetSnapshot};
pub use store::{FileStore, KvStore, MemStore};

use std::fs;
use std::path::Path;

use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Regenerate the TypeScript mirror of every snapshot type a host renders.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<tokenizer::Token>(out_dir)?;
    export_single_type::<word_list::SavedWord>(out_dir)?;
    export_single_type::<theme::Theme>(out_dir)?;
    export_single_type::<playback::PlaybackState>(out_dir)?;
    export_single_type::<playback::BackendKind>(out_dir)?;
    export_single_type::<activities::WordCountOption>(out_dir)?;
    export_single_type::<activities::matching::CardSide>(out_dir)?;
    export_single_type::<session::TokenView>(out_dir)?;
    export_single_type::<session::PlaybackView>(out_dir)?;
    export_single_type::<session::PopupView>(out_dir)?;
    export_single_type::<session::QuizView>(out_dir)?;
    export_single_type::<session::MatchCardView>(out_dir)?;
    export_single_type::<session::MatchingView>(out_dir)?;
    export_single_type::<session::ActivityView>(out_dir)?;
    export_single_type::<session::QuestionAnswerView>(out_dir)?;
    export_single_type::<session::QuestionView>(out_dir)?;
    export_single_type::<session::ExportStatus>(out_dir)?;
    export_single_type::<session::WidgetSnapshot>(out_dir)?;
    export_single_type::<session::WidgetCommand>(out_dir)?;
    export_single_type::<session::WidgetEvent>(out_dir)?;

    let index_content = r#"export type { Token } from "./Token";
export type { SavedWord } from "./SavedWord";
export type { Theme } from "./Theme";
export type { PlaybackState } from "./PlaybackState";
export type { BackendKind } from "./BackendKind";
export type { WordCountOption } from "./WordCountOption";
export type { CardSide } from "./CardSide";
export type { TokenView } from "./TokenView";
export type { PlaybackView } from "./PlaybackView";
export type { PopupView } from "./PopupView";
export type { QuizView } from "./QuizView";
export type { MatchCardView } from "./MatchCardView";
export type { MatchingView } from "./MatchingView";
export type { ActivityView } from "./ActivityView";
export type { QuestionAnswerView } from "./QuestionAnswerView";
export type { QuestionView } from "./QuestionView";
export type { ExportStatus } from "./ExportStatus";
export type { WidgetSnapshot } from "./WidgetSnapshot";
export type { WidgetCommand } from "./WidgetCommand";
export type { WidgetEvent } from "./WidgetEvent";
"#;

    fs::write(out_dir.join("index.ts"), index_content).map_err(|err| {
        format!(
            "Failed to write {}: {err}",
            out_dir.join("index.ts").display()
        )
    })?;

    Ok(())
}
