use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки преобразования и обновления типизированных значений.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Значение вне домена целевого типа (отрицательный IPv4 и т.п.).
    #[error("{reason}")]
    IllegalArgument { reason: String },

    /// Булево значение не из таблицы 0/1, T/F, Y/N.
    #[error("Invalid boolean value: {value}, please use 1/0, T/F, Y/N")]
    InvalidBoolean { value: String },

    /// Код или имя, не объявленные в Enum.
    #[error("Unknown enum value {value} for {enum_type}")]
    InvalidEnum { value: String, enum_type: String },

    /// Строку не удалось разобрать как число.
    #[error("Invalid {target} value: \"{input}\"")]
    NumberFormat { input: String, target: String },

    /// Деление на ноль или null.
    #[error("{reason}")]
    Arithmetic { reason: String },

    /// Точное преобразование потребовало бы округления.
    #[error("Rounding necessary to convert {value} to {target}")]
    Rounding { value: String, target: String },

    /// Величина не помещается в целевой тип.
    #[error("Value {value} is out of range for {target}")]
    OutOfRange { value: String, target: String },

    /// Величина даёт дату или время вне допустимого диапазона.
    #[error("Value {value} cannot be converted to {target}: out of range")]
    DateTimeRange { value: String, target: String },

    /// Преобразование между видами значений не определено.
    #[error("Cannot convert {from} to {to}")]
    Unsupported { from: String, to: String },
}

impl ValueError {
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalArgument {
            reason: reason.into(),
        }
    }

    pub fn number_format(
        input: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::NumberFormat {
            input: input.into(),
            target: target.into(),
        }
    }

    pub fn out_of_range(
        value: impl ToString,
        target: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            target: target.into(),
        }
    }

    pub fn rounding(
        value: impl ToString,
        target: impl Into<String>,
    ) -> Self {
        Self::Rounding {
            value: value.to_string(),
            target: target.into(),
        }
    }

    pub fn date_time_range(
        value: impl ToString,
        target: impl Into<String>,
    ) -> Self {
        Self::DateTimeRange {
            value: value.to_string(),
            target: target.into(),
        }
    }

    pub fn unsupported(
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::Unsupported {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl ErrorExt for ValueError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::IllegalArgument { .. } => StatusCode::InvalidValue,
            Self::InvalidBoolean { .. } => StatusCode::InvalidBoolean,
            Self::InvalidEnum { .. } => StatusCode::InvalidEnum,
            Self::NumberFormat { .. } => StatusCode::InvalidNumber,
            Self::Arithmetic { .. } => StatusCode::DivisionByZero,
            Self::Rounding { .. } => StatusCode::InvalidNumber,
            Self::OutOfRange { .. } => StatusCode::OutOfRange,
            Self::DateTimeRange { .. } => StatusCode::DateTimeRange,
            Self::Unsupported { .. } => StatusCode::TypeError,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет тексты сообщений доменных ошибок.
    #[test]
    fn test_display() {
        assert_eq!(
            ValueError::InvalidBoolean {
                value: "2".to_string()
            }
            .to_string(),
            "Invalid boolean value: 2, please use 1/0, T/F, Y/N"
        );
        assert_eq!(
            ValueError::number_format("-1", "UInt8").to_string(),
            "Invalid UInt8 value: \"-1\""
        );
        assert_eq!(
            ValueError::unsupported("Array", "Int32").to_string(),
            "Cannot convert Array to Int32"
        );
        assert_eq!(
            ValueError::date_time_range(70000, "Date").to_string(),
            "Value 70000 cannot be converted to Date: out of range"
        );
        assert_eq!(
            ValueError::rounding("1.5", "BigInteger").to_string(),
            "Rounding necessary to convert 1.5 to BigInteger"
        );
    }

    /// Тест проверяет соответствие вариантов статус-кодам.
    #[test]
    fn test_status_codes() {
        assert_eq!(
            ValueError::illegal("negative").status_code(),
            StatusCode::InvalidValue
        );
        assert_eq!(
            ValueError::out_of_range(300, "UInt8").status_code(),
            StatusCode::OutOfRange
        );
        assert_eq!(
            ValueError::Arithmetic {
                reason: "Division by zero".into()
            }
            .status_code(),
            StatusCode::DivisionByZero
        );
        assert_eq!(
            ValueError::rounding("300.99", "BigInteger").status_code(),
            StatusCode::InvalidNumber
        );
        assert!(ValueError::number_format("x", "Int8")
            .status_code()
            .is_client_error());
    }
}
