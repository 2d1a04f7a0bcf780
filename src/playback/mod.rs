//! Playback state machine over the lesson's two audio paths.
//!
//! A lesson either ships a pre-recorded clip or falls back to synthesized
//! speech; the path is fixed at load time and the controller owns whichever
//! is live. Only one session may sound at a time: any start halts the
//! current session first, across both paths. Word clicks and play-from-here
//! always run through the speech engine, even when the lesson plays a clip.

mod backend;
mod clip;
mod transitions;

pub use backend::{
    BackendKind, BoundaryKind, EngineEvent, PacedEngine, ScriptedEngine, SpeechEngine,
    SpeechRequest, VoiceInfo, pick_voice,
};
pub use clip::ClipPlayer;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use transitions::{PauseOutcome, PressOutcome};

const DEFAULT_RATE: f32 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// What a poll pass surfaced for the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    /// A word boundary landed; the index is global to the joined lesson text.
    Highlight { global_char_index: usize },
    /// The session ended, naturally or by engine failure.
    Finished,
}

/// One live or paused utterance on the speech path.
struct SpeechSession {
    source_text: String,
    rate: f32,
    /// Added to every boundary index; non-zero when speaking a tail of the
    /// lesson text.
    char_offset_base: usize,
    /// Single-word playback keeps the pane highlight out of it.
    boundaries: bool,
}

pub struct PlaybackController {
    backend: BackendKind,
    engine: Box<dyn SpeechEngine>,
    clip: Option<ClipPlayer>,
    state: PlaybackState,
    session: Option<SpeechSession>,
    last_rate: f32,
    slow_rate: f32,
    voice: Option<String>,
}

impl PlaybackController {
    /// The clip decides the backend: lessons that ship audio play it, all
    /// others synthesize.
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        clip: Option<ClipPlayer>,
        slow_rate: f32,
        preferred_voice: &str,
    ) -> Self {
        let backend = if clip.is_some() {
            BackendKind::Clip
        } else {
            BackendKind::Speech
        };
        let voice = pick_voice(&engine.voices(), preferred_voice);
        info!(
            backend = ?backend,
            voice = voice.as_deref().unwrap_or("engine default"),
            "Playback ready"
        );
        PlaybackController {
            backend,
            engine,
            clip,
            state: PlaybackState::Idle,
            session: None,
            last_rate: DEFAULT_RATE,
            slow_rate,
            voice,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn last_rate(&self) -> f32 {
        self.last_rate
    }

    /// Rate of the live session; a clip has none.
    pub fn active_rate(&self) -> Option<f32> {
        if self.state == PlaybackState::Idle {
            return None;
        }
        self.session.as_ref().map(|s| s.rate)
    }

    pub fn pause_enabled(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    pub fn slow_enabled(&self) -> bool {
        self.backend == BackendKind::Speech
    }

    pub fn slow_active(&self) -> bool {
        self.state != PlaybackState::Idle
            && self
                .session
                .as_ref()
                .is_some_and(|s| (s.rate - self.slow_rate).abs() < f32::EPSILON)
    }

    /// Listen control: start the lesson from the top, or stop what is live.
    pub fn toggle_listen(&mut self, full_text: &str) {
        match transitions::on_listen_pressed(self.backend, self.state) {
            PressOutcome::StartClip => self.start_clip(),
            PressOutcome::StopClip => self.stop_clip(),
            PressOutcome::StartSpeech { slow } => {
                let rate = if slow { self.slow_rate } else { DEFAULT_RATE };
                self.start_speech(full_text.to_string(), 0, rate, true);
            }
            PressOutcome::CancelSpeech => self.cancel_speech(),
            PressOutcome::Ignore => {}
        }
    }

    /// Slow control: same toggle at the slow rate, no-op under a clip.
    pub fn toggle_slow(&mut self, full_text: &str) {
        match transitions::on_slow_pressed(self.backend, self.state) {
            PressOutcome::StartClip => self.start_clip(),
            PressOutcome::StopClip => self.stop_clip(),
            PressOutcome::StartSpeech { slow } => {
                let rate = if slow { self.slow_rate } else { DEFAULT_RATE };
                self.start_speech(full_text.to_string(), 0, rate, true);
            }
            PressOutcome::CancelSpeech => self.cancel_speech(),
            PressOutcome::Ignore => {}
        }
    }

    pub fn toggle_pause(&mut self) {
        match transitions::on_pause_pressed(self.backend, self.state) {
            PauseOutcome::PauseEngine => {
                info!("Pausing speech");
                self.engine.pause();
                self.state = PlaybackState::Paused;
            }
            PauseOutcome::ResumeEngine => {
                info!("Resuming speech");
                self.engine.resume();
                self.state = PlaybackState::Playing;
            }
            PauseOutcome::PauseClip => {
                if let Some(clip) = &self.clip {
                    clip.pause();
                }
                self.state = PlaybackState::Paused;
            }
            PauseOutcome::ResumeClip => {
                if let Some(clip) = &self.clip {
                    clip.resume();
                }
                self.state = PlaybackState::Playing;
            }
            PauseOutcome::Ignore => {}
        }
    }

    /// Speak a tail of the lesson text at the last used rate. Boundary
    /// indices get rebased so highlights land on the right tokens.
    pub fn play_from(&mut self, text: String, char_offset_base: usize) {
        let rate = self.last_rate;
        self.start_speech(text, char_offset_base, rate, true);
    }

    /// Speak one word at the default rate, without pane highlighting.
    pub fn speak_word(&mut self, word: &str) {
        self.start_speech(word.to_string(), 0, DEFAULT_RATE, false);
    }

    /// Stop whatever is live. Also the dispose path.
    pub fn stop(&mut self) {
        self.halt_current();
    }

    /// Drain engine events and clip completion into widget-facing signals.
    pub fn poll(&mut self) -> Vec<PlaybackSignal> {
        let mut signals = Vec::new();

        if self.session.is_some() {
            while let Some(event) = self.engine.poll_event() {
                match event {
                    EngineEvent::Boundary {
                        kind: BoundaryKind::Word,
                        char_index,
                    } => {
                        let Some(session) = self.session.as_ref() else {
                            break;
                        };
                        if session.boundaries {
                            signals.push(PlaybackSignal::Highlight {
                                global_char_index: session.char_offset_base + char_index,
                            });
                        }
                    }
                    EngineEvent::Boundary { .. } => {}
                    EngineEvent::Finished => {
                        if let Some(session) = self.session.take() {
                            info!(
                                chars = session.source_text.chars().count(),
                                "Speech session finished"
                            );
                        }
                        self.state = PlaybackState::Idle;
                        signals.push(PlaybackSignal::Finished);
                        break;
                    }
                    EngineEvent::Errored { message } => {
                        warn!(%message, "Speech engine failed; treating as end of playback");
                        self.session = None;
                        self.state = PlaybackState::Idle;
                        signals.push(PlaybackSignal::Finished);
                        break;
                    }
                }
            }
        } else if self.state != PlaybackState::Idle
            && self.clip.as_ref().is_some_and(ClipPlayer::finished)
        {
            info!("Clip playback finished");
            self.state = PlaybackState::Idle;
            signals.push(PlaybackSignal::Finished);
        }

        signals
    }

    fn start_speech(&mut self, text: String, char_offset_base: usize, rate: f32, boundaries: bool) {
        self.halt_current();
        info!(
            chars = text.chars().count(),
            rate,
            offset = char_offset_base,
            "Starting speech session"
        );
        self.engine.speak(SpeechRequest {
            text: text.clone(),
            rate,
            voice: self.voice.clone(),
        });
        self.last_rate = rate;
        self.session = Some(SpeechSession {
            source_text: text,
            rate,
            char_offset_base,
            boundaries,
        });
        self.state = PlaybackState::Playing;
    }

    fn cancel_speech(&mut self) {
        info!("Stopping speech session");
        if self.session.take().is_some() {
            self.engine.cancel();
        }
        self.state = PlaybackState::Idle;
    }

    fn start_clip(&mut self) {
        let Some(clip) = self.clip.as_mut() else {
            return;
        };
        match clip.start() {
            Ok(()) => {
                info!("Starting clip playback");
                self.state = PlaybackState::Playing;
            }
            Err(err) => {
                warn!("Clip playback failed to start: {err:?}");
                self.state = PlaybackState::Idle;
            }
        }
    }

    fn stop_clip(&mut self) {
        info!("Stopping clip playback");
        if let Some(clip) = self.clip.as_mut() {
            clip.stop();
        }
        self.state = PlaybackState::Idle;
    }

    /// At most one session may sound at a time, across both paths. Exactly
    /// one engine cancel per replaced speech session.
    fn halt_current(&mut self) {
        if self.session.take().is_some() {
            self.engine.cancel();
        } else if self.state != PlaybackState::Idle {
            if let Some(clip) = self.clip.as_mut() {
                clip.stop();
            }
        }
        self.state = PlaybackState::Idle;
    }
}
