//! Десятичное число произвольной точности: мантисса [`BigInt`] и масштаб.
//!
//! Мантисса Decimal256 занимает до 76 десятичных разрядов, поэтому
//! `rust_decimal::Decimal` (96 бит) используется только на границе с
//! приложением.

use std::{cmp::Ordering, fmt, str::FromStr};

use chdata_error::{StackError, ValueError};
use num_bigint::{BigInt, Sign};
use num_traits::{Float, ToPrimitive, Zero};

/// Предел масштаба при разборе текста с экспонентой.
const MAX_PARSED_SCALE: i64 = 4096;

/// Значение `mantissa * 10^-scale`.
///
/// Сравнение числовое: `1.5` и `1.50` равны.
#[derive(Debug, Clone)]
pub struct BigDecimal {
    mantissa: BigInt,
    scale: u32,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BigDecimal {
    pub fn new(
        mantissa: impl Into<BigInt>,
        scale: u32,
    ) -> Self {
        Self {
            mantissa: mantissa.into(),
            scale,
        }
    }

    pub fn zero(scale: u32) -> Self {
        Self::new(BigInt::zero(), scale)
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.sign() == Sign::Minus
    }

    /// `true`, если дробная часть равна нулю.
    pub fn is_integer(&self) -> bool {
        self.scale == 0 || (&self.mantissa % pow10(self.scale)).is_zero()
    }

    /// Целая часть с отбрасыванием дробной (к нулю).
    pub fn trunc(&self) -> BigInt {
        &self.mantissa / pow10(self.scale)
    }

    /// То же число в масштабе `scale`. Лишние разряды отбрасываются к нулю.
    ///
    /// ```
    /// use chdata::value::BigDecimal;
    ///
    /// let d: BigDecimal = "-3.14159".parse().unwrap();
    /// assert_eq!(d.with_scale(2).to_string(), "-3.14");
    /// assert_eq!(d.with_scale(6).to_string(), "-3.141590");
    /// ```
    pub fn with_scale(
        &self,
        scale: u32,
    ) -> Self {
        let mantissa = match scale.cmp(&self.scale) {
            Ordering::Equal => self.mantissa.clone(),
            Ordering::Greater => &self.mantissa * pow10(scale - self.scale),
            Ordering::Less => &self.mantissa / pow10(self.scale - scale),
        };
        Self { mantissa, scale }
    }

    /// Точное двоичное значение float. `None` для NaN и бесконечностей.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        let (bits, exponent, sign) = f.integer_decode();
        let mut mantissa = BigInt::from(bits);
        if sign < 0 {
            mantissa = -mantissa;
        }
        let d = if exponent >= 0 {
            Self::new(mantissa << exponent as usize, 0)
        } else {
            // m * 2^-k == m * 5^k * 10^-k
            let k = exponent.unsigned_abs() as u32;
            Self::new(mantissa * BigInt::from(5u8).pow(k), k)
        };
        Some(d.normalized())
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or_default()
    }

    /// `None`, если мантисса шире 96 бит или масштаб больше 28.
    pub fn to_decimal(&self) -> Option<rust_decimal::Decimal> {
        let mantissa = self.mantissa.to_i128()?;
        rust_decimal::Decimal::try_from_i128_with_scale(mantissa, self.scale).ok()
    }

    /// Без незначащих нулей дробной части.
    fn normalized(mut self) -> Self {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return self;
        }
        let ten = BigInt::from(10u8);
        while self.scale > 0 && (&self.mantissa % &ten).is_zero() {
            self.mantissa /= &ten;
            self.scale -= 1;
        }
        self
    }
}

/// `10^k`.
pub(crate) fn pow10(k: u32) -> BigInt {
    BigInt::from(10u8).pow(k)
}

/// Младшие 128 бит дополнительного кода.
pub(crate) fn low_bits_i128(big: &BigInt) -> i128 {
    let bytes = big.to_signed_bytes_le();
    let fill = if big.sign() == Sign::Minus { 0xFF } else { 0 };
    let mut buf = [fill; 16];
    let n = bytes.len().min(16);
    buf[..n].copy_from_slice(&bytes[..n]);
    i128::from_le_bytes(buf)
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl PartialEq for BigDecimal {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigDecimal {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.with_scale(scale)
            .mantissa
            .cmp(&other.with_scale(scale).mantissa)
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let digits = self.mantissa.magnitude().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            f.write_str(&digits)
        } else if digits.len() <= scale {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        } else {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        }
    }
}

/// Разбирает `[+-]digits[.digits][(e|E)[+-]digits]`.
impl FromStr for BigDecimal {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StackError::from(ValueError::number_format(s, "Decimal"));
        let t = s.trim();

        let (body, exponent) = match t.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&t[..i], t[i + 1..].parse::<i64>().map_err(|_| invalid())?),
            None => (t, 0),
        };
        let (negative, body) = match body.as_bytes().first() {
            Some(b'-') => (true, &body[1..]),
            Some(b'+') => (false, &body[1..]),
            _ => (false, body),
        };
        let (int, frac) = body.split_once('.').unwrap_or((body, ""));
        let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if int.len() + frac.len() == 0 || !digits(int) || !digits(frac) {
            return Err(invalid());
        }

        let scale = (frac.len() as i64).saturating_sub(exponent);
        if scale.abs() > MAX_PARSED_SCALE {
            return Err(ValueError::out_of_range(t, "Decimal").into());
        }
        let mut mantissa = BigInt::from_str(&format!("{int}{frac}")).map_err(|_| invalid())?;
        if negative {
            mantissa = -mantissa;
        }
        if scale < 0 {
            Ok(Self::new(mantissa * pow10(scale.unsigned_abs() as u32), 0))
        } else {
            Ok(Self::new(mantissa, scale as u32))
        }
    }
}

impl From<rust_decimal::Decimal> for BigDecimal {
    fn from(d: rust_decimal::Decimal) -> Self {
        Self::new(d.mantissa(), d.scale())
    }
}

impl From<BigInt> for BigDecimal {
    fn from(v: BigInt) -> Self {
        Self::new(v, 0)
    }
}

impl From<i64> for BigDecimal {
    fn from(v: i64) -> Self {
        Self::new(v, 0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chdata_error::StatusCode;
    use rstest::rstest;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("0", "0")]
    #[case("-0.5", "-0.5")]
    #[case("+12.340", "12.340")]
    #[case(".25", "0.25")]
    #[case("1.5E-2", "0.015")]
    #[case("12e3", "12000")]
    #[case("-0.00001", "-0.00001")]
    #[case(
        "1234567890123456789012345678901234567.8",
        "1234567890123456789012345678901234567.8"
    )]
    fn test_parse_and_display(
        #[case] text: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(dec(text).to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case("1.2.3")]
    #[case("1e")]
    #[case("0x10")]
    #[case("NaN")]
    fn test_parse_rejects(#[case] text: &str) {
        let err = text.parse::<BigDecimal>().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidNumber);
    }

    #[test]
    fn test_parse_rejects_huge_exponent() {
        let err = "1e999999".parse::<BigDecimal>().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::OutOfRange);
    }

    /// Тест проверяет отбрасывание разрядов к нулю для обоих знаков.
    #[test]
    fn test_with_scale_truncates_toward_zero() {
        assert_eq!(dec("1.239").with_scale(2).to_string(), "1.23");
        assert_eq!(dec("-1.239").with_scale(2).to_string(), "-1.23");
        assert_eq!(dec("-0.9").with_scale(0).to_string(), "0");
        assert_eq!(dec("7").with_scale(3).mantissa(), &BigInt::from(7000));
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(dec("1.5"), dec("1.50"));
        assert_ne!(dec("1.5"), dec("1.51"));
        assert!(dec("-2") < dec("-1.99"));
    }

    /// Тест проверяет точное двоичное значение float.
    #[test]
    fn test_from_f64_is_exact() {
        assert_eq!(BigDecimal::from_f64(0.5).unwrap().to_string(), "0.5");
        assert_eq!(BigDecimal::from_f64(-2.0).unwrap().to_string(), "-2");
        assert_eq!(
            BigDecimal::from_f64(0.1).unwrap().to_string(),
            "0.1000000000000000055511151231257827021181583404541015625"
        );
        assert_eq!(
            BigDecimal::from_f64(1e30).unwrap().to_string(),
            "1000000000000000019884624838656"
        );
        assert!(BigDecimal::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_integer_parts() {
        let d = dec("-300.99");
        assert!(!d.is_integer());
        assert_eq!(d.trunc(), BigInt::from(-300));
        assert!(dec("12.000").is_integer());
        assert_eq!(d.to_f64(), -300.99);
    }

    /// Тест проверяет границу с rust_decimal.
    #[test]
    fn test_rust_decimal_interop() {
        let small = rust_decimal::Decimal::new(-12345, 2);
        let d = BigDecimal::from(small);
        assert_eq!(d.to_string(), "-123.45");
        assert_eq!(d.to_decimal(), Some(small));

        let wide = BigDecimal::new(pow10(30), 0);
        assert_eq!(wide.to_decimal(), None);
    }

    #[test]
    fn test_low_bits() {
        assert_eq!(low_bits_i128(&BigInt::from(-1)), -1);
        assert_eq!(low_bits_i128(&(BigInt::from(1) << 128usize)), 0);
        assert_eq!(
            low_bits_i128(&((BigInt::from(1) << 128usize) + 300)),
            300
        );
        assert_eq!(low_bits_i128(&BigInt::from(u128::MAX)), -1);
    }
}
