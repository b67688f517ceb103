use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Ошибки разбора имени типа колонки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    /// Имя не соответствует ни одному известному типу
    UnknownType { name: String },

    /// Синтаксически неверное имя типа
    InvalidTypeName { name: String, reason: String },

    /// Неверные параметры типа (арность, точность, масштаб)
    InvalidArguments { type_name: String, reason: String },

    /// Недопустимая вложенность обёрток (Nullable(LowCardinality(..)) и т.п.)
    InvalidNesting { outer: String, inner: String },

    /// Скобки не сбалансированы
    Unbalanced { name: String, position: usize },
}

impl ColumnError {
    pub fn invalid_arguments(
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArguments {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ColumnError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "Unknown data type: {name}"),
            Self::InvalidTypeName { name, reason } => {
                write!(f, "Invalid type name '{name}': {reason}")
            }
            Self::InvalidArguments { type_name, reason } => {
                write!(f, "{reason} (type: {type_name})")
            }
            Self::InvalidNesting { outer, inner } => {
                write!(f, "{outer} cannot wrap {inner}")
            }
            Self::Unbalanced { name, position } => {
                write!(
                    f,
                    "Unbalanced brackets or quotes in '{name}' at position {position}"
                )
            }
        }
    }
}

impl std::error::Error for ColumnError {}

impl ErrorExt for ColumnError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidTypeName
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
