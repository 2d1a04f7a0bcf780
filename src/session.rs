//! Headless widget session: commands in, snapshots out.
//!
//! [`ReaderWidget`] owns every piece of widget state and hands hosts a
//! serializable [`WidgetSnapshot`] after each command, so rendering layers
//! stay dumb: draw the snapshot, forward clicks as [`WidgetCommand`]s, and
//! poll [`ReaderWidget::pump`] on a short interval while audio is live.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::activities::matching::{CardSide, MatchBoard};
use crate::activities::quiz::QuizRound;
use crate::activities::{
    MIN_ACTIVITY_WORDS, WordCountOption, replay_has_choice, word_count_options,
};
use crate::config::AppConfig;
use crate::content::{ContentDoc, parse_content};
use crate::glossary::Glossary;
use crate::highlight;
use crate::playback::{
    BackendKind, ClipPlayer, PlaybackController, PlaybackSignal, PlaybackState, SpeechEngine,
};
use crate::questions::Question;
use crate::store::KvStore;
use crate::theme::{self, Theme};
use crate::tokenizer::{self, Token};
use crate::word_list::{self, SavedWord};

/// Activity panel titles, shown verbatim by hosts.
pub const QUIZ_TITLE: &str = "Multiple Choice Quiz";
pub const MATCHING_TITLE: &str = "Memory Game";

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TokenView {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub is_word: bool,
    /// Hosts underline these; any word token is clickable regardless.
    pub has_definition: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PlaybackView {
    pub state: PlaybackState,
    pub backend: BackendKind,
    pub pause_enabled: bool,
    pub slow_enabled: bool,
    pub slow_active: bool,
    pub last_rate: f32,
    pub active_rate: Option<f32>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PopupView {
    pub word: String,
    pub translation: Option<String>,
    pub is_saved: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct QuizView {
    /// 1-based; sticks at the last question once finished.
    pub question_number: usize,
    pub question_count: usize,
    /// English prompt, absent on the results view.
    pub prompt: Option<String>,
    pub options: Vec<String>,
    pub answered_option: Option<usize>,
    /// Revealed only once the current question is answered.
    pub correct_option: Option<usize>,
    pub score: usize,
    pub finished: bool,
    /// Offer same-words and new-words replays separately.
    pub replay_choice: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct MatchCardView {
    pub text: String,
    pub side: CardSide,
    pub pair_id: usize,
    pub face_up: bool,
    pub matched: bool,
    pub mismatched: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct MatchingView {
    pub cards: Vec<MatchCardView>,
    pub matched_pairs: usize,
    pub pair_count: usize,
    /// Locked boards ignore flips until the mismatch is resolved.
    pub locked: bool,
    pub completed: bool,
    pub replay_choice: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ActivityView {
    pub title: String,
    pub quiz: Option<QuizView>,
    pub matching: Option<MatchingView>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct QuestionAnswerView {
    pub text: String,
    pub correct: bool,
    pub revealed: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct QuestionView {
    pub prompt: String,
    pub answers: Vec<QuestionAnswerView>,
}

/// Clipboard handoff state. The widget builds CSV; the host owns the actual
/// clipboard and reports back, then reverts the label on its own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ExportStatus {
    #[default]
    Idle,
    Copied,
    Failed,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct WidgetSnapshot {
    pub title: String,
    pub theme: Theme,
    pub tokens: Vec<TokenView>,
    pub active_token_idx: Option<usize>,
    pub playback: PlaybackView,
    pub word_list: Vec<SavedWord>,
    pub popup: Option<PopupView>,
    pub activities_enabled: bool,
    pub export_enabled: bool,
    pub export_status: ExportStatus,
    pub word_count_options: Vec<WordCountOption>,
    pub selected_word_count: Option<usize>,
    pub activity: Option<ActivityView>,
    pub questions: Vec<QuestionView>,
}

/// Everything a host can ask the widget to do.
#[derive(Debug, Clone, Serialize, serde::Deserialize, TS)]
#[serde(tag = "command", rename_all = "snake_case")]
#[ts(export)]
pub enum WidgetCommand {
    GetSnapshot,
    ToggleListen,
    TogglePause,
    ToggleSlow,
    WordClick { token_idx: usize },
    ClosePopup,
    SaveWord { english: String, thai: String },
    RemoveWord { english: String },
    PlayFromHere,
    PlayWord { english: String },
    SelectWordCount { count: usize },
    StartQuiz,
    AnswerQuiz { option_idx: usize },
    NextQuestion,
    StartMatching,
    FlipCard { card_idx: usize },
    ResolveMismatch,
    ReplayActivity { same_words: bool },
    CloseActivity,
    RevealAnswer { question_idx: usize, answer_idx: usize },
    MarkExport { ok: bool },
    ResetExportStatus,
    ToggleTheme,
}

impl WidgetCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "widget_get_snapshot",
            Self::ToggleListen => "widget_toggle_listen",
            Self::TogglePause => "widget_toggle_pause",
            Self::ToggleSlow => "widget_toggle_slow",
            Self::WordClick { .. } => "widget_word_click",
            Self::ClosePopup => "widget_close_popup",
            Self::SaveWord { .. } => "widget_save_word",
            Self::RemoveWord { .. } => "widget_remove_word",
            Self::PlayFromHere => "widget_play_from_here",
            Self::PlayWord { .. } => "widget_play_word",
            Self::SelectWordCount { .. } => "widget_select_word_count",
            Self::StartQuiz => "widget_start_quiz",
            Self::AnswerQuiz { .. } => "widget_answer_quiz",
            Self::NextQuestion => "widget_next_question",
            Self::StartMatching => "widget_start_matching",
            Self::FlipCard { .. } => "widget_flip_card",
            Self::ResolveMismatch => "widget_resolve_mismatch",
            Self::ReplayActivity { .. } => "widget_replay_activity",
            Self::CloseActivity => "widget_close_activity",
            Self::RevealAnswer { .. } => "widget_reveal_answer",
            Self::MarkExport { .. } => "widget_mark_export",
            Self::ResetExportStatus => "widget_reset_export_status",
            Self::ToggleTheme => "widget_toggle_theme",
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct WidgetEvent {
    pub action: &'static str,
    pub snapshot: WidgetSnapshot,
}

enum ActivityState {
    Quiz(QuizRound),
    Matching(MatchBoard),
}

struct PopupContext {
    token_idx: usize,
    word: String,
}

pub struct ReaderWidget {
    title: String,
    full_text: String,
    tokens: Vec<Token>,
    glossary: Glossary,
    questions: Vec<Question>,
    revealed: Vec<Vec<bool>>,
    store: Box<dyn KvStore>,
    playback: PlaybackController,
    active_token_idx: Option<usize>,
    popup: Option<PopupContext>,
    selected_word_count: Option<usize>,
    activity: Option<ActivityState>,
    export_status: ExportStatus,
    theme: Theme,
}

impl ReaderWidget {
    /// Parse and build in one go. Content errors are fatal here; the host
    /// keeps whatever inert surface it wants.
    pub fn from_blob(
        blob: &str,
        store: Box<dyn KvStore>,
        engine: Box<dyn SpeechEngine>,
        config: &AppConfig,
    ) -> Result<Self> {
        let doc = parse_content(blob)?;
        Ok(Self::from_doc(doc, store, engine, config))
    }

    /// Build from a parsed lesson. A clip that fails to load degrades to the
    /// speech path instead of failing the widget.
    pub fn from_doc(
        doc: ContentDoc,
        store: Box<dyn KvStore>,
        engine: Box<dyn SpeechEngine>,
        config: &AppConfig,
    ) -> Self {
        let tokens = tokenizer::tokenize(&doc.paragraphs);
        let full_text = tokenizer::join_paragraphs(&doc.paragraphs);

        let mut glossary = Glossary::from_pairs(&doc.glossary_pairs);
        let saved = word_list::load_word_list(store.as_ref());
        glossary.merge_saved(&saved);

        let clip = doc
            .audio_url
            .as_deref()
            .and_then(|url| match ClipPlayer::load(url) {
                Ok(clip) => Some(clip),
                Err(err) => {
                    warn!("Clip unavailable, falling back to speech: {err:?}");
                    None
                }
            });
        let playback =
            PlaybackController::new(engine, clip, config.slow_rate, &config.preferred_voice);

        let theme = theme::load_theme(store.as_ref());
        let revealed = doc
            .questions
            .iter()
            .map(|q| vec![false; q.answers.len()])
            .collect();

        info!(
            title = %doc.title,
            tokens = tokens.len(),
            saved_words = saved.len(),
            "Reader widget ready"
        );

        ReaderWidget {
            title: doc.title,
            full_text,
            tokens,
            glossary,
            questions: doc.questions,
            revealed,
            store,
            playback,
            active_token_idx: None,
            popup: None,
            selected_word_count: None,
            activity: None,
            export_status: ExportStatus::Idle,
            theme,
        }
    }

    pub fn apply(&mut self, command: WidgetCommand) -> WidgetEvent {
        let action = command.action();
        match command {
            WidgetCommand::GetSnapshot => {}
            WidgetCommand::ToggleListen => self.playback.toggle_listen(&self.full_text),
            WidgetCommand::TogglePause => self.playback.toggle_pause(),
            WidgetCommand::ToggleSlow => self.playback.toggle_slow(&self.full_text),
            WidgetCommand::WordClick { token_idx } => self.word_click(token_idx),
            WidgetCommand::ClosePopup => self.popup = None,
            WidgetCommand::SaveWord { english, thai } => self.save_word(english, thai),
            WidgetCommand::RemoveWord { english } => self.remove_word(&english),
            WidgetCommand::PlayFromHere => self.play_from_here(),
            WidgetCommand::PlayWord { english } => self.playback.speak_word(&english),
            WidgetCommand::SelectWordCount { count } => self.select_word_count(count),
            WidgetCommand::StartQuiz => self.start_quiz(),
            WidgetCommand::AnswerQuiz { option_idx } => self.answer_quiz(option_idx),
            WidgetCommand::NextQuestion => self.next_question(),
            WidgetCommand::StartMatching => self.start_matching(),
            WidgetCommand::FlipCard { card_idx } => self.flip_card(card_idx),
            WidgetCommand::ResolveMismatch => self.resolve_mismatch(),
            WidgetCommand::ReplayActivity { same_words } => self.replay_activity(same_words),
            WidgetCommand::CloseActivity => self.activity = None,
            WidgetCommand::RevealAnswer {
                question_idx,
                answer_idx,
            } => self.reveal_answer(question_idx, answer_idx),
            WidgetCommand::MarkExport { ok } => self.mark_export(ok),
            WidgetCommand::ResetExportStatus => self.export_status = ExportStatus::Idle,
            WidgetCommand::ToggleTheme => self.toggle_theme(),
        }

        // Idle playback never keeps a highlight.
        if self.playback.state() == PlaybackState::Idle {
            self.active_token_idx = None;
        }

        WidgetEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    /// Drain playback into events. Hosts call this on a short interval while
    /// audio is live; idle widgets return nothing.
    pub fn pump(&mut self) -> Vec<WidgetEvent> {
        let signals = self.playback.poll();
        let mut events = Vec::new();
        for signal in signals {
            match signal {
                PlaybackSignal::Highlight { global_char_index } => {
                    self.active_token_idx = highlight::resolve(&self.tokens, global_char_index);
                    events.push(WidgetEvent {
                        action: "widget_highlight",
                        snapshot: self.snapshot(),
                    });
                }
                PlaybackSignal::Finished => {
                    self.active_token_idx = None;
                    events.push(WidgetEvent {
                        action: "widget_playback_ended",
                        snapshot: self.snapshot(),
                    });
                }
            }
        }
        events
    }

    /// CSV for the host clipboard; `None` when there is nothing to copy.
    pub fn export_csv(&self) -> Option<String> {
        let words = self.saved_words();
        if words.is_empty() {
            return None;
        }
        Some(word_list::export_csv(&words))
    }

    /// Stop playback and drop live audio handles.
    pub fn dispose(&mut self) {
        self.playback.stop();
        self.active_token_idx = None;
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let words = self.saved_words();
        let options = word_count_options(words.len());
        let selected_word_count = self.effective_word_count(words.len());
        let activities_enabled = words.len() >= MIN_ACTIVITY_WORDS;
        let export_enabled = !words.is_empty();

        let tokens = self
            .tokens
            .iter()
            .map(|token| TokenView {
                text: token.text.clone(),
                start_offset: token.start_offset,
                end_offset: token.end_offset,
                is_word: token.is_word,
                has_definition: token.is_word && self.glossary.has_definition(&token.key()),
            })
            .collect();

        let popup = self.popup.as_ref().map(|popup| {
            let key = popup.word.to_lowercase();
            PopupView {
                word: popup.word.clone(),
                translation: self.glossary.lookup(&popup.word).map(str::to_string),
                is_saved: words.iter().any(|w| w.english.to_lowercase() == key),
            }
        });

        let playback = PlaybackView {
            state: self.playback.state(),
            backend: self.playback.backend(),
            pause_enabled: self.playback.pause_enabled(),
            slow_enabled: self.playback.slow_enabled(),
            slow_active: self.playback.slow_active(),
            last_rate: self.playback.last_rate(),
            active_rate: self.playback.active_rate(),
        };

        let activity = self
            .activity
            .as_ref()
            .map(|activity| self.activity_view(activity, words.len()));

        let questions = self
            .questions
            .iter()
            .enumerate()
            .map(|(q_idx, question)| QuestionView {
                prompt: question.prompt.clone(),
                answers: question
                    .answers
                    .iter()
                    .enumerate()
                    .map(|(a_idx, answer)| QuestionAnswerView {
                        text: answer.text.clone(),
                        correct: answer.correct,
                        revealed: self
                            .revealed
                            .get(q_idx)
                            .and_then(|flags| flags.get(a_idx))
                            .copied()
                            .unwrap_or(false),
                    })
                    .collect(),
            })
            .collect();

        WidgetSnapshot {
            title: self.title.clone(),
            theme: self.theme,
            tokens,
            active_token_idx: self.active_token_idx,
            playback,
            word_list: words,
            popup,
            activities_enabled,
            export_enabled,
            export_status: self.export_status,
            word_count_options: options,
            selected_word_count,
            activity,
            questions,
        }
    }

    fn saved_words(&self) -> Vec<SavedWord> {
        word_list::load_word_list(self.store.as_ref())
    }

    /// The stored selection when it still fits the pool, else the first
    /// offered option, else nothing.
    fn effective_word_count(&self, pool_len: usize) -> Option<usize> {
        let options = word_count_options(pool_len);
        self.selected_word_count
            .filter(|count| options.iter().any(|o| o.value == *count))
            .or_else(|| options.first().map(|o| o.value))
    }

    fn word_click(&mut self, token_idx: usize) {
        let Some(token) = self.tokens.get(token_idx) else {
            debug!(token_idx, "Ignoring click outside the token list");
            return;
        };
        if !token.is_word {
            return;
        }
        let word = token.key();
        self.playback.speak_word(&word);
        self.popup = Some(PopupContext { token_idx, word });
    }

    fn save_word(&mut self, english: String, thai: String) {
        let added = word_list::add_word(
            self.store.as_mut(),
            SavedWord {
                english: english.clone(),
                thai: thai.clone(),
            },
        );
        if added && !thai.trim().is_empty() {
            self.glossary.upsert(&english, &thai);
        }
        self.popup = None;
    }

    fn remove_word(&mut self, english: &str) {
        word_list::remove_word(self.store.as_mut(), english);
        self.glossary.remove(english);
        let key = english.to_lowercase();
        if self
            .popup
            .as_ref()
            .is_some_and(|popup| popup.word.to_lowercase() == key)
        {
            self.popup = None;
        }
    }

    fn play_from_here(&mut self) {
        let Some(popup) = self.popup.take() else {
            return;
        };
        let Some(token) = self.tokens.get(popup.token_idx) else {
            return;
        };
        let start = token.start_offset;
        let tail: String = self.full_text.chars().skip(start).collect();
        self.playback.play_from(tail, start);
    }

    fn select_word_count(&mut self, count: usize) {
        let options = word_count_options(self.saved_words().len());
        if options.iter().any(|o| o.value == count) {
            self.selected_word_count = Some(count);
        } else {
            debug!(count, "Ignoring word-count selection with no matching option");
        }
    }

    fn start_quiz(&mut self) {
        let pool = self.saved_words();
        if let Some(count) = self.effective_word_count(pool.len()) {
            if let Some(round) = QuizRound::start(&pool, count, &mut rand::thread_rng()) {
                self.activity = Some(ActivityState::Quiz(round));
                return;
            }
        }
        warn!(words = pool.len(), "Not enough saved words to start a quiz");
    }

    fn start_matching(&mut self) {
        let pool = self.saved_words();
        if let Some(count) = self.effective_word_count(pool.len()) {
            if let Some(board) = MatchBoard::start(&pool, count, &mut rand::thread_rng()) {
                self.activity = Some(ActivityState::Matching(board));
                return;
            }
        }
        warn!(
            words = pool.len(),
            "Not enough saved words to start the matching game"
        );
    }

    fn answer_quiz(&mut self, option_idx: usize) {
        if let Some(ActivityState::Quiz(round)) = self.activity.as_mut() {
            round.answer(option_idx);
        }
    }

    fn next_question(&mut self) {
        if let Some(ActivityState::Quiz(round)) = self.activity.as_mut() {
            round.advance();
        }
    }

    fn flip_card(&mut self, card_idx: usize) {
        if let Some(ActivityState::Matching(board)) = self.activity.as_mut() {
            board.flip(card_idx);
        }
    }

    fn resolve_mismatch(&mut self) {
        if let Some(ActivityState::Matching(board)) = self.activity.as_mut() {
            board.resolve_mismatch();
        }
    }

    /// Same words redeal in place; new words draw a fresh sample at the
    /// current count. A pool that shrank below the minimum keeps the
    /// finished view up instead.
    fn replay_activity(&mut self, same_words: bool) {
        let pool = self.saved_words();
        let count = self.effective_word_count(pool.len());
        let mut rng = rand::thread_rng();

        let next = match (&self.activity, same_words) {
            (Some(ActivityState::Quiz(round)), true) => {
                Some(ActivityState::Quiz(round.restart_same(&pool, &mut rng)))
            }
            (Some(ActivityState::Quiz(_)), false) => count
                .and_then(|count| QuizRound::start(&pool, count, &mut rng))
                .map(ActivityState::Quiz),
            (Some(ActivityState::Matching(board)), true) => {
                Some(ActivityState::Matching(board.restart_same(&mut rng)))
            }
            (Some(ActivityState::Matching(_)), false) => count
                .and_then(|count| MatchBoard::start(&pool, count, &mut rng))
                .map(ActivityState::Matching),
            (None, _) => None,
        };

        if let Some(next) = next {
            self.activity = Some(next);
        }
    }

    fn reveal_answer(&mut self, question_idx: usize, answer_idx: usize) {
        if let Some(flags) = self.revealed.get_mut(question_idx) {
            if let Some(flag) = flags.get_mut(answer_idx) {
                *flag = true;
            }
        }
    }

    fn mark_export(&mut self, ok: bool) {
        self.export_status = if ok {
            ExportStatus::Copied
        } else {
            ExportStatus::Failed
        };
        info!(ok, "Export acknowledged");
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        theme::save_theme(self.store.as_mut(), self.theme);
        info!(theme = %self.theme, "Theme switched");
    }

    fn activity_view(&self, activity: &ActivityState, pool_len: usize) -> ActivityView {
        match activity {
            ActivityState::Quiz(round) => {
                let question = round.current_question();
                ActivityView {
                    title: QUIZ_TITLE.to_string(),
                    quiz: Some(QuizView {
                        question_number: (round.current_index() + 1).min(round.total().max(1)),
                        question_count: round.total(),
                        prompt: question.map(|q| q.prompt.english.clone()),
                        options: question
                            .map(|q| q.options.iter().map(|o| o.thai.clone()).collect())
                            .unwrap_or_default(),
                        answered_option: round.answered_option(),
                        correct_option: round.correct_option(),
                        score: round.score(),
                        finished: round.is_finished(),
                        replay_choice: replay_has_choice(pool_len, round.selection().len()),
                    }),
                    matching: None,
                }
            }
            ActivityState::Matching(board) => {
                let cards = board
                    .cards()
                    .iter()
                    .enumerate()
                    .map(|(idx, card)| MatchCardView {
                        text: card.text.clone(),
                        side: card.side,
                        pair_id: card.pair_id,
                        face_up: board.is_face_up(idx),
                        matched: board.is_matched(idx),
                        mismatched: board
                            .mismatch()
                            .is_some_and(|(first, second)| first == idx || second == idx),
                    })
                    .collect();
                ActivityView {
                    title: MATCHING_TITLE.to_string(),
                    quiz: None,
                    matching: Some(MatchingView {
                        cards,
                        matched_pairs: board.matched_pairs(),
                        pair_count: board.pair_count(),
                        locked: board.is_locked(),
                        completed: board.is_completed(),
                        replay_choice: replay_has_choice(pool_len, board.pair_count()),
                    }),
                }
            }
        }
    }
}
