//! Speech-engine seam and the engines shipped with the crate.
//!
//! Engines are polled rather than callback-driven: the widget pumps
//! [`SpeechEngine::poll_event`] while audio is live and events come back in
//! speaking order. [`PacedEngine`] fakes synthesis on a wall clock so
//! headless hosts still get highlight timing; [`ScriptedEngine`] replays a
//! pre-loaded tape for tests and deterministic replays.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

/// Which audio path a session runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BackendKind {
    /// Synthesized speech: rate control and word-boundary callbacks.
    Speech,
    /// A pre-recorded clip: opaque audio, fixed pace, no boundaries.
    Clip,
}

impl BackendKind {
    pub fn supports_rate(self) -> bool {
        matches!(self, BackendKind::Speech)
    }

    pub fn supports_boundaries(self) -> bool {
        matches!(self, BackendKind::Speech)
    }
}

/// Boundary granularity. Only word boundaries drive highlighting; engines
/// that also report sentence boundaries get those filtered upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Boundary { kind: BoundaryKind, char_index: usize },
    Finished,
    Errored { message: String },
}

/// One utterance handed to an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub rate: f32,
    pub voice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
    pub default: bool,
}

pub trait SpeechEngine {
    /// Start speaking, replacing any current utterance.
    fn speak(&mut self, request: SpeechRequest);

    /// Drop the current utterance. Does not emit `Finished`.
    fn cancel(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Next pending event, if any. Paused engines report nothing.
    fn poll_event(&mut self) -> Option<EngineEvent>;

    fn voices(&self) -> Vec<VoiceInfo>;
}

/// Pick the voice to request: English voices only, preferring an exact name
/// match, then the engine's default, then whatever comes first.
pub fn pick_voice(voices: &[VoiceInfo], preferred: &str) -> Option<String> {
    let english: Vec<&VoiceInfo> = voices
        .iter()
        .filter(|v| v.lang.starts_with("en"))
        .collect();
    english
        .iter()
        .find(|v| v.name == preferred)
        .or_else(|| english.iter().find(|v| v.default))
        .or_else(|| english.first())
        .map(|v| v.name.clone())
}

/// Word starts and total char count for pacing. Approximates the reading
/// pane's tokenization closely enough for the highlight resolver to absorb
/// any drift.
fn word_starts(text: &str) -> (Vec<usize>, usize) {
    let mut starts = Vec::new();
    let mut in_word = false;
    let mut total = 0usize;
    for (offset, ch) in text.chars().enumerate() {
        let word_char = ch.is_alphanumeric() || ch == '\'' || ch == '-';
        if word_char && !in_word {
            starts.push(offset);
        }
        in_word = word_char;
        total = offset + 1;
    }
    (starts, total)
}

/// Silent "synthesis" that paces word boundaries on a wall clock. Hosts
/// without an OS speech stack still get live highlighting at roughly
/// reading speed.
pub struct PacedEngine {
    chars_per_sec: f32,
    utterance: Option<PacedUtterance>,
}

struct PacedUtterance {
    word_starts: Vec<usize>,
    next_word: usize,
    total_chars: usize,
    rate: f32,
    started_at: Instant,
    elapsed_before_pause: Duration,
    paused: bool,
}

impl PacedEngine {
    pub fn new(chars_per_sec: f32) -> Self {
        PacedEngine {
            chars_per_sec,
            utterance: None,
        }
    }
}

impl SpeechEngine for PacedEngine {
    fn speak(&mut self, request: SpeechRequest) {
        let (starts, total) = word_starts(&request.text);
        debug!(
            words = starts.len(),
            chars = total,
            rate = request.rate,
            "Pacing utterance"
        );
        self.utterance = Some(PacedUtterance {
            word_starts: starts,
            next_word: 0,
            total_chars: total,
            rate: request.rate.max(0.05),
            started_at: Instant::now(),
            elapsed_before_pause: Duration::ZERO,
            paused: false,
        });
    }

    fn cancel(&mut self) {
        self.utterance = None;
    }

    fn pause(&mut self) {
        if let Some(utterance) = self.utterance.as_mut() {
            if !utterance.paused {
                utterance.elapsed_before_pause += utterance.started_at.elapsed();
                utterance.paused = true;
            }
        }
    }

    fn resume(&mut self) {
        if let Some(utterance) = self.utterance.as_mut() {
            if utterance.paused {
                utterance.started_at = Instant::now();
                utterance.paused = false;
            }
        }
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        let chars_per_sec = self.chars_per_sec;
        let utterance = self.utterance.as_mut()?;
        if utterance.paused {
            return None;
        }

        let elapsed = utterance.elapsed_before_pause + utterance.started_at.elapsed();
        let spoken = elapsed.as_secs_f32() * chars_per_sec * utterance.rate;

        if let Some(&start) = utterance.word_starts.get(utterance.next_word) {
            if start as f32 <= spoken {
                utterance.next_word += 1;
                return Some(EngineEvent::Boundary {
                    kind: BoundaryKind::Word,
                    char_index: start,
                });
            }
        }

        if spoken >= utterance.total_chars as f32 {
            self.utterance = None;
            return Some(EngineEvent::Finished);
        }
        None
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            name: "Paced English".to_string(),
            lang: "en-US".to_string(),
            default: true,
        }]
    }
}

/// Engine that replays a pre-loaded tape. Clones share state, so a test can
/// keep a probe handle while the widget owns the engine.
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    inner: Rc<RefCell<ScriptedState>>,
}

#[derive(Default)]
struct ScriptedState {
    tape: VecDeque<EngineEvent>,
    requests: Vec<SpeechRequest>,
    cancels: usize,
    speaking: bool,
    paused: bool,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        ScriptedEngine::default()
    }

    /// Queue an event for a future poll. The tape only plays while an
    /// utterance is live, and `cancel` drops whatever is still queued.
    pub fn script(&self, event: EngineEvent) {
        self.inner.borrow_mut().tape.push_back(event);
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.inner.borrow().requests.clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.inner.borrow().cancels
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.borrow().speaking
    }

    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }
}

impl SpeechEngine for ScriptedEngine {
    fn speak(&mut self, request: SpeechRequest) {
        let mut state = self.inner.borrow_mut();
        state.requests.push(request);
        state.speaking = true;
        state.paused = false;
    }

    fn cancel(&mut self) {
        let mut state = self.inner.borrow_mut();
        state.cancels += 1;
        state.speaking = false;
        state.paused = false;
        state.tape.clear();
    }

    fn pause(&mut self) {
        let mut state = self.inner.borrow_mut();
        if state.speaking {
            state.paused = true;
        }
    }

    fn resume(&mut self) {
        self.inner.borrow_mut().paused = false;
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        let mut state = self.inner.borrow_mut();
        if !state.speaking || state.paused {
            return None;
        }
        let event = state.tape.pop_front();
        if matches!(
            event,
            Some(EngineEvent::Finished) | Some(EngineEvent::Errored { .. })
        ) {
            state.speaking = false;
        }
        event
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            name: "Scripted English".to_string(),
            lang: "en-US".to_string(),
            default: true,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str, default: bool) -> VoiceInfo {
        VoiceInfo {
            name: name.to_string(),
            lang: lang.to_string(),
            default,
        }
    }

    #[test]
    fn voice_pick_prefers_exact_name_then_default_then_first() {
        let voices = vec![
            voice("Thai Voice", "th-TH", true),
            voice("English A", "en-GB", false),
            voice("English B", "en-US", true),
            voice("Google US English", "en-US", false),
        ];
        assert_eq!(
            pick_voice(&voices, "Google US English").as_deref(),
            Some("Google US English")
        );
        assert_eq!(
            pick_voice(&voices, "Missing Voice").as_deref(),
            Some("English B")
        );
        let no_default = vec![voice("th", "th-TH", true), voice("English A", "en-GB", false)];
        assert_eq!(
            pick_voice(&no_default, "Missing Voice").as_deref(),
            Some("English A")
        );
        assert_eq!(pick_voice(&[voice("th", "th-TH", true)], "x"), None);
    }

    #[test]
    fn word_starts_track_alphanumeric_runs() {
        let (starts, total) = word_starts("The cat.");
        assert_eq!(starts, [0, 4]);
        assert_eq!(total, 8);
        assert_eq!(word_starts(""), (Vec::new(), 0));
    }

    #[test]
    fn paced_engine_emits_boundaries_then_finishes() {
        // A huge pace makes every word due on the first polls, without sleeps.
        let mut engine = PacedEngine::new(1e12);
        engine.speak(SpeechRequest {
            text: "The cat".to_string(),
            rate: 1.0,
            voice: None,
        });
        let mut events = Vec::new();
        for _ in 0..1000 {
            match engine.poll_event() {
                Some(event) => {
                    let done = event == EngineEvent::Finished;
                    events.push(event);
                    if done {
                        break;
                    }
                }
                // Not due yet; at this pace the next spin will be.
                None => {}
            }
        }
        assert_eq!(
            events,
            [
                EngineEvent::Boundary {
                    kind: BoundaryKind::Word,
                    char_index: 0
                },
                EngineEvent::Boundary {
                    kind: BoundaryKind::Word,
                    char_index: 4
                },
                EngineEvent::Finished,
            ]
        );
        assert_eq!(engine.poll_event(), None);
    }

    #[test]
    fn paced_engine_reports_nothing_while_paused() {
        let mut engine = PacedEngine::new(1e12);
        engine.speak(SpeechRequest {
            text: "The cat".to_string(),
            rate: 1.0,
            voice: None,
        });
        engine.pause();
        assert_eq!(engine.poll_event(), None);
        engine.resume();
        assert!(engine.poll_event().is_some());
    }

    #[test]
    fn paced_engine_cancel_drops_the_utterance_silently() {
        let mut engine = PacedEngine::new(1e12);
        engine.speak(SpeechRequest {
            text: "word".to_string(),
            rate: 1.0,
            voice: None,
        });
        engine.cancel();
        assert_eq!(engine.poll_event(), None);
    }

    #[test]
    fn scripted_tape_plays_only_while_speaking() {
        let mut engine = ScriptedEngine::new();
        engine.script(EngineEvent::Finished);
        assert_eq!(engine.poll_event(), None);
        engine.speak(SpeechRequest {
            text: "x".to_string(),
            rate: 1.0,
            voice: None,
        });
        assert_eq!(engine.poll_event(), Some(EngineEvent::Finished));
        assert!(!engine.is_speaking());
    }

    #[test]
    fn scripted_cancel_clears_tape_and_counts() {
        let mut engine = ScriptedEngine::new();
        let probe = engine.clone();
        engine.speak(SpeechRequest {
            text: "x".to_string(),
            rate: 1.0,
            voice: None,
        });
        engine.script(EngineEvent::Boundary {
            kind: BoundaryKind::Word,
            char_index: 0,
        });
        engine.cancel();
        assert_eq!(probe.cancel_count(), 1);
        engine.speak(SpeechRequest {
            text: "y".to_string(),
            rate: 1.0,
            voice: None,
        });
        assert_eq!(engine.poll_event(), None);
        assert_eq!(probe.requests().len(), 2);
    }
}
