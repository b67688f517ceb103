use chdata_error::{ensure, DataResult, StatusCode};
use serde::{Deserialize, Serialize};

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Формат вывода событий.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Настройки логирования. `RUST_LOG`, если задана, имеет приоритет над
/// `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

impl LoggingConfig {
    /// Директива для `EnvFilter`: уровень для этого крейта, остальные не
    /// громче `warn`.
    pub fn build_filter_directive(&self) -> String {
        format!("warn,chdata={}", self.level)
    }

    pub fn validate(&self) -> DataResult<()> {
        let level = self.level.to_ascii_lowercase();
        ensure!(
            LEVELS.contains(&level.as_str()),
            StatusCode::Config,
            "Invalid log level '{}', expected one of: {}",
            self.level,
            LEVELS.join(", ")
        );
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_directive() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.build_filter_directive(), "warn,chdata=info");
        assert!(config.validate().is_ok());
    }

    /// Тест проверяет отказ на неизвестном уровне.
    #[test]
    fn test_invalid_level() {
        let config = LoggingConfig {
            level: "loud".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::Config);
        assert!(err.to_string().contains("loud"), "got: {err}");
    }

    #[test]
    fn test_format_serde_names() {
        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
        let f: LogFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(f, LogFormat::Pretty);
    }
}
