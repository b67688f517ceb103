//! Структурное логирование поверх `tracing-subscriber`.

pub mod config;
mod filters;
mod formatter;

// Публичный экспорт
pub use config::{LogFormat, LoggingConfig};
use chdata_error::{DataResult, GenericError, StackError, StatusCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Устанавливает глобальный подписчик. Повторный вызов возвращает ошибку
/// `Config`, уже установленный подписчик не меняется.
pub fn init_logging(config: &LoggingConfig) -> DataResult<()> {
    config.validate()?;

    let env_filter = filters::build_filter_from_config(config);
    let output = formatter::build_formatter_from_config(config, config.format, config.with_ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .try_init()
        .map_err(|e| {
            StackError::new(GenericError::new(
                StatusCode::Config,
                format!("Failed to initialize logging: {e}"),
            ))
        })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = ?config.format,
        "Logging system initialized"
    );
    Ok(())
}
