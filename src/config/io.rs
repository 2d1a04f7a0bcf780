use crate::config::AppConfig;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

/// Parse configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str::<AppConfig>(contents)
}

/// Serialize configuration back to TOML, e.g. for writing a starter file.
pub fn serialize_config(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = parse_config("slow_rate = 0.5\n").expect("partial config should parse");
        assert_eq!(cfg.slow_rate, 0.5);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.store_dir, ".cache");
        assert_eq!(cfg.preferred_voice, "Google US English");
    }

    #[test]
    fn serialized_config_parses_back() {
        let cfg = AppConfig::default();
        let raw = serialize_config(&cfg).expect("default config should serialize");
        let back = parse_config(&raw).expect("serialized config should parse");
        assert_eq!(back.log_level, cfg.log_level);
        assert_eq!(back.store_dir, cfg.store_dir);
    }
}
