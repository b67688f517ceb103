use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных (домен значения, диапазоны)
/// - 3xxx: Ошибки разбора (числа, имена типов)
/// - 6xxx: Поток / кодек
///
/// # Реализация:
/// - `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde_repr").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Unsupported = 1001,
    Unexpected = 1002,
    Internal = 1003,
    InvalidArgs = 1004,
    NotImplemented = 1005,
    Config = 1006,

    // === 2xxx: Ошибки данных ===
    TypeError = 2000,
    InvalidValue = 2001,
    InvalidBoolean = 2002,
    InvalidEnum = 2003,
    OutOfRange = 2004,
    DateTimeRange = 2005,
    DivisionByZero = 2006,

    // === 3xxx: Разбор ===
    ParseError = 3000,
    InvalidNumber = 3001,
    InvalidTypeName = 3002,
    InvalidUtf8 = 3003,

    // === 6xxx: Поток/кодек ===
    Io = 6000,
    UnexpectedEof = 6001,
    InvalidLength = 6002,
    SizeLimit = 6003,
    DepthLimit = 6004,
    CorruptedData = 6005,
    EncodingError = 6006,
    DecodingError = 6007,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    ///
    /// Возвращает `None`, если значение не соответствует ни одному варианту.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Вернёт `true`, если переданный `code` означает успешный результат.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Повторять имеет смысл только ввод-вывод: повтор всегда делает
    /// транспортный уровень, ядро ничего не повторяет само.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }

    /// Ошибка вызывающей стороны: неверное значение, аргумент или строка.
    ///
    /// Диапазоны `2xxx..3xxx` плюс `InvalidArgs` (1004).
    pub fn is_client_error(&self) -> bool {
        let c = self.code();
        if (2000..=3999).contains(&c) {
            return true;
        }
        matches!(self, Self::InvalidArgs)
    }

    /// Внутренняя ошибка библиотеки (диапазон `1xxx`, кроме `InvalidArgs`).
    pub fn is_server_error(&self) -> bool {
        (1000..=1999).contains(&self.code()) && !matches!(self, Self::InvalidArgs)
    }

    /// Ошибка потока или кодека (диапазон 6xxx).
    pub fn is_stream_error(&self) -> bool {
        (6000..=6999).contains(&self.code())
    }

    /// Требуется ли логировать как критическую ошибку.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Internal | Self::CorruptedData)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::TypeError
            | Self::InvalidValue
            | Self::InvalidBoolean
            | Self::InvalidEnum
            | Self::OutOfRange
            | Self::DateTimeRange
            | Self::DivisionByZero
            | Self::InvalidNumber => LogLevel::Debug,
            Self::InvalidArgs | Self::ParseError | Self::InvalidTypeName | Self::InvalidUtf8 => {
                LogLevel::Info
            }
            Self::Internal | Self::CorruptedData => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
