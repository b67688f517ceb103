use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// `RUST_LOG`, если задана; иначе директива из конфигурации, при ошибке
/// в ней `info`.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    let directive = config.build_filter_directive();

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match EnvFilter::try_new(&directive) {
            Ok(filter) => filter,
            Err(e) => {
                // подписчик ещё не установлен, поэтому пишем напрямую
                eprintln!(
                    "Invalid log filter directive from config ('{directive}'): {e}; falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        sync::{Arc, Mutex},
    };

    use serial_test::serial;
    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;

    // Мини-буферный writer для тестов
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> fmt::MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn config_with_level(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            ..Default::default()
        }
    }

    /// Тест проверяет, что некорректная директива не приводит к панике.
    #[test]
    #[serial]
    fn test_invalid_directive_falls_back() {
        env::remove_var("RUST_LOG");
        let filter = build_filter_from_config(&config_with_level("no such level!!"));
        assert_eq!(filter.to_string(), "info");
    }

    /// Тест проверяет, что уровень из конфигурации отсекает события ниже.
    #[test]
    #[serial]
    fn test_config_level_filters_events() {
        env::remove_var("RUST_LOG");
        let filter = build_filter_from_config(&config_with_level("warn"));

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = fmt::layer()
            .with_writer(VecMakeWriter(buffer.clone()))
            .with_filter(filter);
        let subscriber = Registry::default().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::info!(target: "chdata::processor", "info is filtered out");
        tracing::warn!(target: "chdata::processor", "warn passes through");

        let out = buffer.lock().unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.contains("warn passes through"), "got: {s}");
        assert!(!s.contains("info is filtered out"), "got: {s}");
    }

    #[test]
    #[serial]
    fn test_rust_log_takes_priority() {
        env::set_var("RUST_LOG", "trace");
        let filter = build_filter_from_config(&config_with_level("error"));
        env::remove_var("RUST_LOG");
        assert_eq!(filter.to_string(), "trace");
    }
}
