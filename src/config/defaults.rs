pub(crate) fn default_store_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_slow_rate() -> f32 {
    0.6
}

pub(crate) fn default_preferred_voice() -> String {
    "Google US English".to_string()
}

pub(crate) fn default_speech_chars_per_sec() -> f32 {
    15.0
}
