use serde::Deserialize;

/// High-level widget configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_store_dir")]
    pub store_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_slow_rate")]
    pub slow_rate: f32,
    #[serde(default = "crate::config::defaults::default_preferred_voice")]
    pub preferred_voice: String,
    #[serde(default = "crate::config::defaults::default_speech_chars_per_sec")]
    pub speech_chars_per_sec: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_dir: crate::config::defaults::default_store_dir(),
            log_level: crate::config::defaults::default_log_level(),
            slow_rate: crate::config::defaults::default_slow_rate(),
            preferred_voice: crate::config::defaults::default_preferred_voice(),
            speech_chars_per_sec: crate::config::defaults::default_speech_chars_per_sec(),
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", label)
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
