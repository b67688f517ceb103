use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Ошибки бинарного кодека RowBinary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Поток закончился раньше, чем прочитано значение
    UnexpectedEof {
        what: String,
        expected_bytes: Option<u64>,
    },

    /// Префикс длины вне допустимого диапазона
    InvalidLength {
        what: String,
        length: u64,
        limit: u64,
    },

    /// Байты не образуют корректное значение
    CorruptedData {
        what: String,
        reason: String,
        offset: Option<u64>,
    },

    /// Значение не того вида, который ожидает сериализатор
    TypeMismatch { expected: String, got: String },

    /// Значение длиннее, чем позволяет тип колонки
    ValueTooLarge { what: String, size: u64, limit: u64 },
}

impl CodecError {
    pub fn corrupted(
        what: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CorruptedData {
            what: what.into(),
            reason: reason.into(),
            offset: None,
        }
    }

    /// Добавляет смещение в потоке (если известно).
    pub fn with_offset(
        mut self,
        offset: u64,
    ) -> Self {
        if let Self::CorruptedData { offset: o, .. } = &mut self {
            *o = Some(offset);
        }
        self
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof {
                what,
                expected_bytes,
            } => {
                write!(f, "Unexpected end of stream while reading {what}")?;
                if let Some(n) = expected_bytes {
                    write!(f, " (expected {n} bytes)")?;
                }
                Ok(())
            }
            Self::InvalidLength {
                what,
                length,
                limit,
            } => write!(f, "Invalid length {length} for {what} (limit: {limit})"),
            Self::CorruptedData {
                what,
                reason,
                offset,
            } => {
                write!(f, "Corrupted {what}: {reason}")?;
                if let Some(o) = offset {
                    write!(f, " [offset: 0x{o:X}]")?;
                }
                Ok(())
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "Expected {expected} value, got {got}")
            }
            Self::ValueTooLarge { what, size, limit } => {
                write!(f, "{what} size {size} exceeds limit {limit}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

impl ErrorExt for CodecError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnexpectedEof { .. } => StatusCode::UnexpectedEof,
            Self::InvalidLength { .. } => StatusCode::InvalidLength,
            Self::CorruptedData { .. } => StatusCode::CorruptedData,
            Self::TypeMismatch { .. } => StatusCode::EncodingError,
            Self::ValueTooLarge { .. } => StatusCode::SizeLimit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::UnexpectedEof { .. } => "Unexpected end of stream".to_string(),
            _ => self.to_string(),
        }
    }
}
