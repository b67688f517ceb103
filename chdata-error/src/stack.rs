use std::{fmt, panic::Location, sync::Arc};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{ErrorExt, LogLevel, StatusCode};

/// Основная структура ошибки с поддержкой контекста и трассировки.
///
/// Контексты добавляются по мере распространения ошибки вверх по стеку,
/// например номер колонки при чтении строки RowBinary.
#[derive(Clone)]
pub struct StackError {
    inner: Arc<dyn ErrorExt>,
    contexts: Arc<Vec<ErrorContext>>,
}

/// Контекст ошибки с location tracking.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub message: String,
    pub location: Option<&'static Location<'static>>,
}

/// Структура для сериализации ошибок (feature = "serde").
#[cfg(feature = "serde")]
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<String>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StackError {
    /// Создаёт новую ошибку.
    #[track_caller]
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            inner: Arc::new(err),
            contexts: Arc::new(Vec::new()),
        }
    }

    /// Добавляет контекст к ошибке.
    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        let mut new_contexts = (*self.contexts).clone();
        new_contexts.push(ErrorContext {
            message: msg.into(),
            location: Some(Location::caller()),
        });
        self.contexts = Arc::new(new_contexts);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    pub fn client_message(&self) -> String {
        self.inner.client_message()
    }

    /// Корневая ошибка без контекстов.
    pub fn root(&self) -> &dyn ErrorExt {
        self.inner.as_ref()
    }

    pub fn contexts(&self) -> &[ErrorContext] {
        &self.contexts
    }

    /// Попытка downcast к конкретному типу ошибки.
    pub fn downcast_ref<T: ErrorExt + 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// `true`, если корневая ошибка означает конец потока.
    pub fn is_eof(&self) -> bool {
        self.status_code() == StatusCode::UnexpectedEof
    }

    /// Сериализация для внешних ответов (требует feature = "serde").
    #[cfg(feature = "serde")]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.status_code().code(),
            message: self.client_message(),
            #[cfg(debug_assertions)]
            contexts: Some(self.format_contexts()),
            #[cfg(not(debug_assertions))]
            contexts: None,
        }
    }

    fn format_contexts(&self) -> Vec<String> {
        self.contexts
            .iter()
            .map(|ctx| match ctx.location {
                Some(loc) => format!("{} ({}:{})", ctx.message, loc.file(), loc.line()),
                None => ctx.message.clone(),
            })
            .collect()
    }

    pub fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }

    pub fn is_critical(&self) -> bool {
        self.status_code().is_critical()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StackError
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut debug = f.debug_struct("StackError");
        debug.field("inner", &self.inner.to_string());
        debug.field("status_code", &self.status_code());

        if !self.contexts.is_empty() {
            debug.field("contexts", &self.format_contexts());
        }

        debug.finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.contexts.is_empty() {
            return write!(f, "{}", self.inner);
        }
        // Последний добавленный контекст самый внешний.
        let contexts: Vec<&str> = self
            .contexts
            .iter()
            .rev()
            .map(|c| c.message.as_str())
            .collect();
        write!(f, "{}: {}", contexts.join(": "), self.inner)
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    #[track_caller]
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

impl From<StackError> for std::io::Error {
    fn from(e: StackError) -> Self {
        let kind = if e.is_eof() {
            std::io::ErrorKind::UnexpectedEof
        } else {
            std::io::ErrorKind::Other
        };
        std::io::Error::new(kind, e.to_string())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecError, ValueError};

    #[test]
    fn test_context_chain() {
        let err = ValueError::Arithmetic {
            reason: "Division by zero".to_string(),
        };
        let stack = StackError::new(err)
            .context("UInt32 remainder")
            .context("evaluating expression");

        assert_eq!(stack.contexts().len(), 2);
        assert_eq!(stack.contexts()[0].message, "UInt32 remainder");
        assert!(stack.contexts()[0].location.is_some());
        assert_eq!(
            stack.to_string(),
            "evaluating expression: UInt32 remainder: Division by zero"
        );
    }

    #[test]
    fn test_downcast() {
        let stack = StackError::new(CodecError::CorruptedData {
            what: "Nullable flag".to_string(),
            reason: "expected 0 or 1, got 7".to_string(),
            offset: None,
        });

        assert!(stack.downcast_ref::<CodecError>().is_some());
        assert!(stack.downcast_ref::<ValueError>().is_none());
        assert!(stack.is_critical());
    }

    #[test]
    fn test_eof_maps_back_to_io_kind() {
        let stack = StackError::new(CodecError::UnexpectedEof {
            what: "Int32".to_string(),
            expected_bytes: Some(4),
        });
        assert!(stack.is_eof());

        let io: std::io::Error = stack.into();
        assert_eq!(io.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialization() {
        let stack = StackError::new(ValueError::InvalidBoolean {
            value: "2".to_string(),
        })
        .context("update");

        let response = stack.to_response();
        assert_eq!(response.code, StatusCode::InvalidBoolean as u32);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("2002"));
    }
}
