//! Demo host for the reader widget.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load a lesson blob and user configuration from `conf/config.toml`.
//! - Drive a scripted session against the headless widget, tracing every
//!   snapshot change a real rendering layer would paint.

use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use readalong::config::load_config;
use readalong::playback::{PacedEngine, PlaybackState};
use readalong::{FileStore, ReaderWidget, WidgetCommand, load_content};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let lesson_path = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %lesson_path.display(),
        level = %config.log_level,
        "Starting reader demo"
    );
    info!(
        store_dir = %config.store_dir,
        voice = %config.preferred_voice,
        slow_rate = config.slow_rate,
        chars_per_sec = config.speech_chars_per_sec,
        "Active playback configuration"
    );

    let doc = load_content(&lesson_path)?;
    let store = FileStore::new(&config.store_dir);
    let engine = PacedEngine::new(config.speech_chars_per_sec);
    let mut widget = ReaderWidget::from_doc(doc, Box::new(store), Box::new(engine), &config);

    let snapshot = widget.apply(WidgetCommand::GetSnapshot).snapshot;
    info!(
        title = %snapshot.title,
        tokens = snapshot.tokens.len(),
        saved_words = snapshot.word_list.len(),
        backend = ?snapshot.playback.backend,
        "Lesson loaded"
    );

    // Read the passage once, tracing each highlight as it lands.
    widget.apply(WidgetCommand::ToggleListen);
    pump_until_idle(&mut widget);

    save_defined_words(&mut widget);
    run_quiz(&mut widget);
    export_word_list(&mut widget);

    let snapshot = widget.apply(WidgetCommand::GetSnapshot).snapshot;
    info!(
        saved_words = snapshot.word_list.len(),
        activities_enabled = snapshot.activities_enabled,
        theme = %snapshot.theme,
        "Demo finished"
    );
    widget.dispose();
    Ok(())
}

/// Click every word with a glossary entry once and save it from the popup.
fn save_defined_words(widget: &mut ReaderWidget) {
    let snapshot = widget.apply(WidgetCommand::GetSnapshot).snapshot;
    let mut seen = Vec::new();
    for (token_idx, token) in snapshot.tokens.iter().enumerate() {
        if !token.has_definition {
            continue;
        }
        let key = token.text.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let event = widget.apply(WidgetCommand::WordClick { token_idx });
        pump_until_idle(widget);
        if let Some(popup) = event.snapshot.popup {
            info!(word = %popup.word, translation = ?popup.translation, "Saving word");
            widget.apply(WidgetCommand::SaveWord {
                english: popup.word,
                thai: popup.translation.unwrap_or_default(),
            });
        }
    }
}

/// Play one quiz round, answering each prompt with its saved translation.
fn run_quiz(widget: &mut ReaderWidget) {
    let event = widget.apply(WidgetCommand::StartQuiz);
    if event.snapshot.activity.is_none() {
        warn!("Quiz unavailable; not enough saved words");
        return;
    }
    loop {
        let snapshot = widget.apply(WidgetCommand::GetSnapshot).snapshot;
        let Some(quiz) = snapshot.activity.as_ref().and_then(|a| a.quiz.as_ref()) else {
            break;
        };
        if quiz.finished {
            info!(score = quiz.score, total = quiz.question_count, "Quiz finished");
            break;
        }
        let Some(prompt) = quiz.prompt.clone() else {
            break;
        };
        let option_idx = snapshot
            .word_list
            .iter()
            .find(|w| w.english == prompt)
            .and_then(|w| quiz.options.iter().position(|o| o == &w.thai))
            .unwrap_or(0);

        let event = widget.apply(WidgetCommand::AnswerQuiz { option_idx });
        if let Some(quiz) = event.snapshot.activity.as_ref().and_then(|a| a.quiz.as_ref()) {
            info!(
                question = quiz.question_number,
                prompt = %prompt,
                correct = quiz.answered_option == quiz.correct_option,
                "Answered"
            );
        }
        widget.apply(WidgetCommand::NextQuestion);
    }
    widget.apply(WidgetCommand::CloseActivity);
}

/// Hosts put the CSV on the clipboard; here it goes to the log instead.
fn export_word_list(widget: &mut ReaderWidget) {
    if let Some(csv) = widget.export_csv() {
        info!(lines = csv.lines().count(), "Saved-word export:\n{csv}");
        widget.apply(WidgetCommand::MarkExport { ok: true });
        widget.apply(WidgetCommand::ResetExportStatus);
    }
}

fn pump_until_idle(widget: &mut ReaderWidget) {
    loop {
        for event in widget.pump() {
            match event.action {
                "widget_highlight" => {
                    if let Some(idx) = event.snapshot.active_token_idx {
                        info!(word = %event.snapshot.tokens[idx].text, "Highlight");
                    }
                }
                "widget_playback_ended" => info!("Playback finished"),
                _ => {}
            }
        }
        let state = widget.apply(WidgetCommand::GetSnapshot).snapshot.playback.state;
        if state == PlaybackState::Idle {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: readalong <path-to-lesson>"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
