//! Беззнаковые целые фиксированной ширины поверх знакового хранения.
//!
//! Каждый тип хранит битовый шаблон в знаковом целом той же ширины, а
//! сравнение, деление, остаток, разбор и вывод выполняет по беззнаковой
//! величине. Сложение, вычитание и умножение идут по модулю 2^n.

use std::{
    fmt,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use chdata_error::{DataResult, StackError, ValueError};

macro_rules! unsigned_int {
    ($(#[$meta:meta])* $name:ident, $signed:ty, $unsigned:ty, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($signed);

        ////////////////////////////////////////////////////////////////////////
        // Собственные методы
        ////////////////////////////////////////////////////////////////////////

        impl $name {
            pub const ZERO: Self = Self(0);
            pub const ONE: Self = Self(1);
            pub const TWO: Self = Self(2);
            pub const TEN: Self = Self(10);
            pub const MIN_VALUE: Self = Self(0);
            pub const MAX_VALUE: Self = Self(-1);

            /// Кол-во бит в представлении.
            pub const BITS: u32 = <$signed>::BITS;

            /// Переинтерпретирует знаковый битовый шаблон. Никогда не падает.
            pub const fn value_of(bits: $signed) -> Self {
                Self(bits)
            }

            pub const fn from_unsigned(value: $unsigned) -> Self {
                Self(value as $signed)
            }

            /// Беззнаковая величина.
            pub const fn get(self) -> $unsigned {
                self.0 as $unsigned
            }

            /// Исходное знаковое хранение.
            pub const fn bits(self) -> $signed {
                self.0
            }

            /// Разбирает неотрицательное десятичное число в `[0, 2^n - 1]`.
            pub fn parse(s: &str) -> DataResult<Self> {
                s.parse::<$unsigned>()
                    .map(Self::from_unsigned)
                    .map_err(|_| StackError::from(ValueError::number_format(s, $label)))
            }

            /// Как [`parse`](Self::parse), но `None` тоже считается ошибкой
            /// формата.
            pub fn parse_opt(s: Option<&str>) -> DataResult<Self> {
                match s {
                    Some(s) => Self::parse(s),
                    None => Err(ValueError::number_format("null", $label).into()),
                }
            }

            pub const fn wrapping_add(
                self,
                other: Self,
            ) -> Self {
                Self(self.0.wrapping_add(other.0))
            }

            pub const fn wrapping_sub(
                self,
                other: Self,
            ) -> Self {
                Self(self.0.wrapping_sub(other.0))
            }

            pub const fn wrapping_mul(
                self,
                other: Self,
            ) -> Self {
                Self(self.0.wrapping_mul(other.0))
            }

            /// Беззнаковое деление. `None` или ноль дают ошибку `Arithmetic`.
            pub fn divide(
                self,
                divisor: Option<Self>,
            ) -> DataResult<Self> {
                let d = Self::checked_divisor(divisor)?;
                Ok(Self::from_unsigned(self.get() / d))
            }

            /// Беззнаковый остаток. `None` или ноль дают ошибку `Arithmetic`.
            pub fn remainder(
                self,
                divisor: Option<Self>,
            ) -> DataResult<Self> {
                let d = Self::checked_divisor(divisor)?;
                Ok(Self::from_unsigned(self.get() % d))
            }

            fn checked_divisor(divisor: Option<Self>) -> DataResult<$unsigned> {
                match divisor {
                    Some(d) if d.0 != 0 => Ok(d.get()),
                    Some(_) => Err(ValueError::Arithmetic {
                        reason: concat!($label, " division by zero").to_string(),
                    }
                    .into()),
                    None => Err(ValueError::Arithmetic {
                        reason: concat!($label, " division by null").to_string(),
                    }
                    .into()),
                }
            }

            pub const fn to_i8(self) -> i8 {
                self.get() as i8
            }

            pub const fn to_i16(self) -> i16 {
                self.get() as i16
            }

            pub const fn to_i32(self) -> i32 {
                self.get() as i32
            }

            pub const fn to_i64(self) -> i64 {
                self.get() as i64
            }

            pub fn to_f32(self) -> f32 {
                self.get() as f32
            }

            pub fn to_f64(self) -> f64 {
                self.get() as f64
            }
        }

        ////////////////////////////////////////////////////////////////////////
        // Общие реализации трейтов
        ////////////////////////////////////////////////////////////////////////

        impl PartialOrd for $name {
            fn partial_cmp(
                &self,
                other: &Self,
            ) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(
                &self,
                other: &Self,
            ) -> std::cmp::Ordering {
                self.get().cmp(&other.get())
            }
        }

        impl fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                write!(f, "{}({})", $label, self.get())
            }
        }

        impl FromStr for $name {
            type Err = StackError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$unsigned> for $name {
            fn from(value: $unsigned) -> Self {
                Self::from_unsigned(value)
            }
        }

        impl From<$name> for $unsigned {
            fn from(value: $name) -> Self {
                value.get()
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(
                self,
                rhs: Self,
            ) -> Self {
                self.wrapping_add(rhs)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(
                self,
                rhs: Self,
            ) -> Self {
                self.wrapping_sub(rhs)
            }
        }

        impl Mul for $name {
            type Output = Self;

            fn mul(
                self,
                rhs: Self,
            ) -> Self {
                self.wrapping_mul(rhs)
            }
        }

        /// `None` оставляет значение без изменений.
        impl Add<Option<$name>> for $name {
            type Output = Self;

            fn add(
                self,
                rhs: Option<Self>,
            ) -> Self {
                rhs.map_or(self, |r| self.wrapping_add(r))
            }
        }

        /// `None` оставляет значение без изменений.
        impl Sub<Option<$name>> for $name {
            type Output = Self;

            fn sub(
                self,
                rhs: Option<Self>,
            ) -> Self {
                rhs.map_or(self, |r| self.wrapping_sub(r))
            }
        }

        /// Умножение на `None` даёт ноль.
        impl Mul<Option<$name>> for $name {
            type Output = Self;

            fn mul(
                self,
                rhs: Option<Self>,
            ) -> Self {
                rhs.map_or(Self::ZERO, |r| self.wrapping_mul(r))
            }
        }
    };
}

unsigned_int!(
    /// Беззнаковое 8-битное целое (`UInt8`).
    UInt8,
    i8,
    u8,
    "UInt8"
);
unsigned_int!(
    /// Беззнаковое 16-битное целое (`UInt16`).
    UInt16,
    i16,
    u16,
    "UInt16"
);
unsigned_int!(
    /// Беззнаковое 32-битное целое (`UInt32`).
    UInt32,
    i32,
    u32,
    "UInt32"
);
unsigned_int!(
    /// Беззнаковое 64-битное целое (`UInt64`).
    UInt64,
    i64,
    u64,
    "UInt64"
);

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chdata_error::StatusCode;
    use rstest::rstest;

    use super::*;

    /// Тест проверяет разбор граничных значений и отказ на некорректном вводе.
    #[rstest]
    #[case("0", Some(0))]
    #[case("255", Some(255))]
    #[case("+7", Some(7))]
    #[case("256", None)]
    #[case("-1", None)]
    #[case("", None)]
    #[case("1a", None)]
    fn test_parse_uint8(
        #[case] input: &str,
        #[case] expected: Option<u8>,
    ) {
        let parsed = UInt8::parse(input);
        match expected {
            Some(v) => assert_eq!(parsed.unwrap().get(), v, "input: {input}"),
            None => {
                let err = parsed.unwrap_err();
                assert_eq!(err.status_code(), StatusCode::InvalidNumber, "got: {err}");
            }
        }
    }

    #[test]
    fn test_parse_null() {
        let err = UInt32::parse_opt(None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidNumber);
        assert_eq!(UInt32::parse_opt(Some("42")).unwrap(), UInt32::from(42));
    }

    /// Тест проверяет, что MAX_VALUE хранится как -1 и печатается беззнаково.
    #[test]
    fn test_constants() {
        assert_eq!(UInt8::MAX_VALUE.bits(), -1);
        assert_eq!(UInt8::MAX_VALUE.to_string(), "255");
        assert_eq!(UInt16::MAX_VALUE.to_string(), "65535");
        assert_eq!(UInt32::MAX_VALUE.to_string(), "4294967295");
        assert_eq!(UInt64::MAX_VALUE.to_string(), "18446744073709551615");
        assert_eq!(UInt64::TEN.get(), 10);
        assert_eq!(UInt16::BITS, 16);
    }

    /// Тест проверяет беззнаковый порядок.
    #[test]
    fn test_ordering() {
        assert!(UInt8::value_of(-1) > UInt8::value_of(127));
        assert!(UInt64::MAX_VALUE > UInt64::ONE);
        assert_eq!(UInt32::MIN_VALUE, UInt32::ZERO);
    }

    /// Тест проверяет модульную арифметику и Option-операнды.
    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(UInt8::MAX_VALUE + UInt8::ONE, UInt8::ZERO);
        assert_eq!(UInt8::ZERO - UInt8::ONE, UInt8::MAX_VALUE);
        assert_eq!(UInt8::from(16) * UInt8::from(16), UInt8::ZERO);
        assert_eq!(UInt16::TEN + None, UInt16::TEN);
        assert_eq!(UInt16::TEN - None, UInt16::TEN);
        assert_eq!(UInt16::TEN * None, UInt16::ZERO);
        assert_eq!(UInt16::TEN * Some(UInt16::TWO), UInt16::from(20));
    }

    /// Тест проверяет беззнаковое деление и ошибки деления на ноль и null.
    #[test]
    fn test_divide_and_remainder() {
        let max = UInt8::MAX_VALUE;
        assert_eq!(max.divide(Some(UInt8::TWO)).unwrap().get(), 127);
        assert_eq!(max.remainder(Some(UInt8::TEN)).unwrap().get(), 5);

        let err = max.divide(Some(UInt8::ZERO)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::DivisionByZero);
        assert!(err.to_string().contains("division by zero"), "got: {err}");

        let err = UInt64::ONE.remainder(None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::DivisionByZero);
    }

    /// Тест проверяет проекции по беззнаковой величине.
    #[test]
    fn test_projections() {
        let v = UInt8::MAX_VALUE;
        assert_eq!(v.to_i8(), -1);
        assert_eq!(v.to_i16(), 255);
        assert_eq!(v.to_i64(), 255);
        assert_eq!(v.to_f64(), 255.0);

        let big = UInt64::MAX_VALUE;
        assert_eq!(big.to_i64(), -1);
        assert_eq!(big.to_f64(), 18446744073709551615.0);
        assert_eq!(format!("{big:?}"), "UInt64(18446744073709551615)");
    }
}
