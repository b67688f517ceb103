use std::path::Path;

use chdata_error::{ensure, DataResult, ResultExt, GenericError, StackError, StatusCode};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Префикс переменных окружения: `CHDATA_DATA__USE_BINARY_STRING=true`.
pub const ENV_PREFIX: &str = "CHDATA";

/// Размер буфера ввода-вывода по умолчанию.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Формат потока строк.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataFormat {
    /// Только значения, схема известна заранее.
    #[default]
    RowBinary,
    /// Заголовок с именами и типами колонок перед строками.
    RowBinaryWithNamesAndTypes,
}

/// Параметры слоя данных. Неизменяемы после построения и разделяются
/// всеми процессорами колонок.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// String и FixedString помечаются как бинарные.
    pub use_binary_string: bool,
    /// UInt8/16/32 представлены знаковыми Int16/32/64.
    pub widen_unsigned_types: bool,
    /// `as_array` всегда упаковывает элементы в объекты.
    pub use_objects_in_array: bool,
    /// Читатель строк переиспользует значения от строки к строке.
    pub reuse_value_wrapper: bool,
    pub buffer_size: usize,
    /// Предел префикса длины строк и контейнеров.
    pub max_element_count: u64,
    pub format: DataFormat,
}

/// Построитель [`DataConfig`] с проверкой при `build`.
#[derive(Debug, Clone, Default)]
pub struct DataConfigBuilder {
    config: DataConfig,
}

/// Все настройки процесса: слой данных и логирование.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl DataConfig {
    pub fn builder() -> DataConfigBuilder {
        DataConfigBuilder::default()
    }

    pub fn validate(&self) -> DataResult<()> {
        ensure!(
            self.buffer_size > 0,
            StatusCode::Config,
            "buffer_size must be greater than 0"
        );
        ensure!(
            self.max_element_count > 0,
            StatusCode::Config,
            "max_element_count must be greater than 0"
        );
        Ok(())
    }

    /// Секция `data` из [`Settings::load`].
    pub fn load() -> DataResult<Self> {
        Ok(Settings::load()?.data)
    }

    /// Секция `data` из [`Settings::load_from`].
    pub fn load_from(path: impl AsRef<Path>) -> DataResult<Self> {
        Ok(Settings::load_from(path)?.data)
    }
}

impl DataConfigBuilder {
    pub fn use_binary_string(
        mut self,
        value: bool,
    ) -> Self {
        self.config.use_binary_string = value;
        self
    }

    pub fn widen_unsigned_types(
        mut self,
        value: bool,
    ) -> Self {
        self.config.widen_unsigned_types = value;
        self
    }

    pub fn use_objects_in_array(
        mut self,
        value: bool,
    ) -> Self {
        self.config.use_objects_in_array = value;
        self
    }

    pub fn reuse_value_wrapper(
        mut self,
        value: bool,
    ) -> Self {
        self.config.reuse_value_wrapper = value;
        self
    }

    pub fn buffer_size(
        mut self,
        value: usize,
    ) -> Self {
        self.config.buffer_size = value;
        self
    }

    pub fn max_element_count(
        mut self,
        value: u64,
    ) -> Self {
        self.config.max_element_count = value;
        self
    }

    pub fn format(
        mut self,
        value: DataFormat,
    ) -> Self {
        self.config.format = value;
        self
    }

    pub fn build(self) -> DataResult<DataConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Settings {
    /// Загружает настройки из переменных окружения `CHDATA_*`.
    pub fn load() -> DataResult<Self> {
        Self::from_builder(Config::builder())
    }

    /// Загружает настройки из TOML-файла; переменные окружения имеют
    /// приоритет над файлом.
    pub fn load_from(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        let builder = Config::builder().add_source(File::from(path).required(true));
        Self::from_builder(builder).with_context(|| format!("Failed to load {}", path.display()))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>
    ) -> DataResult<Self> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(from_config_error)?;

        settings.data.validate()?;
        settings.logging.validate()?;
        tracing::debug!(
            format = ?settings.data.format,
            use_binary_string = settings.data.use_binary_string,
            widen_unsigned_types = settings.data.widen_unsigned_types,
            use_objects_in_array = settings.data.use_objects_in_array,
            "Settings loaded"
        );
        Ok(settings)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            use_binary_string: false,
            widen_unsigned_types: false,
            use_objects_in_array: false,
            reuse_value_wrapper: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_element_count: i32::MAX as u64,
            format: DataFormat::RowBinary,
        }
    }
}

fn from_config_error(err: ConfigError) -> StackError {
    StackError::new(GenericError::new(
        StatusCode::Config,
        format!("Invalid configuration: {err}"),
    ))
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
