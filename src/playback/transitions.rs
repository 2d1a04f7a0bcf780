use super::{BackendKind, PlaybackState};

/// What a listen or slow press should do, given where playback stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PressOutcome {
    StartSpeech { slow: bool },
    StartClip,
    StopClip,
    CancelSpeech,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PauseOutcome {
    PauseEngine,
    ResumeEngine,
    PauseClip,
    ResumeClip,
    Ignore,
}

/// Listen is a start/stop toggle on whichever path the lesson selected.
pub(super) fn on_listen_pressed(backend: BackendKind, state: PlaybackState) -> PressOutcome {
    match (backend, state) {
        (BackendKind::Clip, PlaybackState::Idle) => PressOutcome::StartClip,
        (BackendKind::Clip, _) => PressOutcome::StopClip,
        (BackendKind::Speech, PlaybackState::Idle) => PressOutcome::StartSpeech { slow: false },
        (BackendKind::Speech, _) => PressOutcome::CancelSpeech,
    }
}

/// Slow is the same toggle at the slow rate, and a no-op under a clip since
/// recorded audio has no rate control.
pub(super) fn on_slow_pressed(backend: BackendKind, state: PlaybackState) -> PressOutcome {
    match (backend, state) {
        (BackendKind::Clip, _) => PressOutcome::Ignore,
        (BackendKind::Speech, PlaybackState::Idle) => PressOutcome::StartSpeech { slow: true },
        (BackendKind::Speech, _) => PressOutcome::CancelSpeech,
    }
}

/// Pause flips between playing and paused; it never stops and never starts.
pub(super) fn on_pause_pressed(backend: BackendKind, state: PlaybackState) -> PauseOutcome {
    match (backend, state) {
        (_, PlaybackState::Idle) => PauseOutcome::Ignore,
        (BackendKind::Clip, PlaybackState::Playing) => PauseOutcome::PauseClip,
        (BackendKind::Clip, PlaybackState::Paused) => PauseOutcome::ResumeClip,
        (BackendKind::Speech, PlaybackState::Playing) => PauseOutcome::PauseEngine,
        (BackendKind::Speech, PlaybackState::Paused) => PauseOutcome::ResumeEngine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_starts_from_idle_on_either_path() {
        assert_eq!(
            on_listen_pressed(BackendKind::Speech, PlaybackState::Idle),
            PressOutcome::StartSpeech { slow: false }
        );
        assert_eq!(
            on_listen_pressed(BackendKind::Clip, PlaybackState::Idle),
            PressOutcome::StartClip
        );
    }

    #[test]
    fn listen_stops_live_audio_even_while_paused() {
        assert_eq!(
            on_listen_pressed(BackendKind::Speech, PlaybackState::Playing),
            PressOutcome::CancelSpeech
        );
        assert_eq!(
            on_listen_pressed(BackendKind::Speech, PlaybackState::Paused),
            PressOutcome::CancelSpeech
        );
        assert_eq!(
            on_listen_pressed(BackendKind::Clip, PlaybackState::Paused),
            PressOutcome::StopClip
        );
    }

    #[test]
    fn slow_is_a_no_op_under_a_clip() {
        for state in [
            PlaybackState::Idle,
            PlaybackState::Playing,
            PlaybackState::Paused,
        ] {
            assert_eq!(
                on_slow_pressed(BackendKind::Clip, state),
                PressOutcome::Ignore
            );
        }
    }

    #[test]
    fn slow_toggles_speech_like_listen_but_slow() {
        assert_eq!(
            on_slow_pressed(BackendKind::Speech, PlaybackState::Idle),
            PressOutcome::StartSpeech { slow: true }
        );
        assert_eq!(
            on_slow_pressed(BackendKind::Speech, PlaybackState::Playing),
            PressOutcome::CancelSpeech
        );
    }

    #[test]
    fn pause_only_flips_live_audio() {
        assert_eq!(
            on_pause_pressed(BackendKind::Speech, PlaybackState::Idle),
            PauseOutcome::Ignore
        );
        assert_eq!(
            on_pause_pressed(BackendKind::Speech, PlaybackState::Playing),
            PauseOutcome::PauseEngine
        );
        assert_eq!(
            on_pause_pressed(BackendKind::Speech, PlaybackState::Paused),
            PauseOutcome::ResumeEngine
        );
        assert_eq!(
            on_pause_pressed(BackendKind::Clip, PlaybackState::Playing),
            PauseOutcome::PauseClip
        );
        assert_eq!(
            on_pause_pressed(BackendKind::Clip, PlaybackState::Paused),
            PauseOutcome::ResumeClip
        );
    }
}
