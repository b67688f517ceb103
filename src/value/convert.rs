//! Проекции значения: числа, большие числа, дата и время, UUID, IP,
//! объект приложения и массивы.

use std::{
    borrow::Cow,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use chdata_error::{DataResult, ValueError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use uuid::Uuid;

use super::{
    decimal::{low_bits_i128, BigDecimal},
    object::{ArrayObject, Object},
    temporal::{self, NANOS_PER_SECOND},
    Value,
};
use crate::column::{TimeZone, MAX_DECIMAL_SCALE};

/// Числовая проекция скаляра.
#[derive(Debug, Clone)]
pub(crate) enum Numeric {
    Int(i128),
    /// Целые шире i128: UInt128, Int256, UInt256.
    Big(BigInt),
    Float(f64),
    Decimal(BigDecimal),
}

impl Numeric {
    /// Младшие 128 бит целой части. Дробная часть отбрасывается, float
    /// насыщается.
    pub(crate) fn to_i128(&self) -> i128 {
        match self {
            Numeric::Int(v) => *v,
            Numeric::Big(b) => low_bits_i128(b),
            Numeric::Float(f) => *f as i128,
            Numeric::Decimal(d) => low_bits_i128(&d.trunc()),
        }
    }

    /// Целая часть без потери старших разрядов.
    pub(crate) fn to_big(&self) -> BigInt {
        match self {
            Numeric::Int(v) => BigInt::from(*v),
            Numeric::Big(b) => b.clone(),
            Numeric::Float(f) => BigInt::from_f64(f.trunc()).unwrap_or_default(),
            Numeric::Decimal(d) => d.trunc(),
        }
    }

    pub(crate) fn to_f64(&self) -> f64 {
        match self {
            Numeric::Int(v) => *v as f64,
            Numeric::Big(b) => b.to_f64().unwrap_or_default(),
            Numeric::Float(f) => *f,
            Numeric::Decimal(d) => d.to_f64(),
        }
    }
}

/// Float сначала насыщается до `$via` (i32 для Int8/16/32, i64 для
/// Int64), затем сужается по младшим битам, как целые.
macro_rules! integer_projection {
    ($(#[$meta:meta])* $fn:ident, $ty:ty, $via:ty, $label:literal) => {
        $(#[$meta])*
        pub fn $fn(&self) -> DataResult<$ty> {
            if let Some(text) = self.text() {
                return parse_text::<$ty>(&text, $label);
            }
            Ok(match self.numeric($label)? {
                None => 0,
                Some(Numeric::Float(f)) => f as $via as $ty,
                Some(n) => n.to_i128() as $ty,
            })
        }
    };
}

impl Value {
    /// Текст непустой строки. Пустая строка ведёт себя как null.
    pub(crate) fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String {
                value: Some(bytes),
                ..
            } if !bytes.is_empty() => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }

    /// Числовая проекция; `None` для null-or-empty.
    pub(crate) fn numeric(
        &self,
        target: &str,
    ) -> DataResult<Option<Numeric>> {
        let n = match self {
            Value::Bool(Some(b)) => Numeric::Int(*b as i128),
            Value::Int8(Some(v)) => Numeric::Int(*v as i128),
            Value::Int16(Some(v)) => Numeric::Int(*v as i128),
            Value::Int32(Some(v)) => Numeric::Int(*v as i128),
            Value::Int64(Some(v)) => Numeric::Int(*v as i128),
            Value::UInt8(Some(v)) => Numeric::Int(v.get() as i128),
            Value::UInt16(Some(v)) => Numeric::Int(v.get() as i128),
            Value::UInt32(Some(v)) => Numeric::Int(v.get() as i128),
            Value::UInt64(Some(v)) => Numeric::Int(v.get() as i128),
            Value::Float32(Some(v)) => Numeric::Float(*v as f64),
            Value::Float64(Some(v)) => Numeric::Float(*v),
            Value::WideInt { value: Some(b), .. } => match b.to_i128() {
                Some(v) => Numeric::Int(v),
                None => Numeric::Big(b.clone()),
            },
            Value::Decimal { value: Some(d), .. } => Numeric::Decimal(d.clone()),
            Value::String {
                value: Some(bytes),
                ..
            } if !bytes.is_empty() => {
                let text = String::from_utf8_lossy(bytes);
                return parse_numeric(&text, target).map(Some);
            }
            Value::Date(Some(d)) => Numeric::Int(temporal::epoch_day(*d) as i128),
            Value::DateTime { value: Some(dt), .. } => {
                Numeric::Int(temporal::epoch_second(dt) as i128)
            }
            Value::Time { value: Some(n), .. } => Numeric::Int((*n / NANOS_PER_SECOND) as i128),
            Value::Enum { value: Some(c), .. } => Numeric::Int(*c as i128),
            Value::Uuid(Some(u)) => Numeric::Int(u.as_u128() as i128),
            Value::Ipv4(Some(ip)) => Numeric::Int(u32::from(*ip) as i128),
            Value::Ipv6(Some(ip)) => Numeric::Int(u128::from(*ip) as i128),
            v if v.is_container() => {
                return Err(ValueError::unsupported(v.kind_name(), target).into())
            }
            _ => return Ok(None),
        };
        Ok(Some(n))
    }

    /// `0` -> false, `1` -> true, null -> false. Строки проверяются по
    /// таблице `""/0/false/no` и `1/true/yes`.
    pub fn as_bool(&self) -> DataResult<bool> {
        if let Some(text) = self.text() {
            return parse_bool_text(&text);
        }
        let Some(n) = self.numeric("Bool")? else {
            return Ok(false);
        };
        let exact = match &n {
            Numeric::Int(v) => Some(*v),
            Numeric::Big(_) => None,
            Numeric::Float(f) if f.fract() == 0.0 => Some(*f as i128),
            Numeric::Decimal(d) if d.is_integer() => d.trunc().to_i128(),
            Numeric::Float(_) | Numeric::Decimal(_) => None,
        };
        match exact {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ValueError::InvalidBoolean {
                value: self.as_string().unwrap_or_default(),
            }
            .into()),
        }
    }

    integer_projection!(
        /// Целые обрезаются по младшим битам, Decimal отбрасывает дробную
        /// часть. Float насыщается до i32 и затем обрезается: `300.0` даёт
        /// `44`, `+Inf` даёт `-1`.
        as_i8,
        i8,
        i32,
        "Int8"
    );
    integer_projection!(as_i16, i16, i32, "Int16");
    integer_projection!(as_i32, i32, i32, "Int32");
    integer_projection!(as_i64, i64, i64, "Int64");

    pub fn as_f32(&self) -> DataResult<f32> {
        if let Some(text) = self.text() {
            return parse_text::<f32>(&text, "Float32");
        }
        Ok(match self.numeric("Float32")? {
            None => 0.0,
            Some(Numeric::Float(f)) => f as f32,
            Some(n) => n.to_f64() as f32,
        })
    }

    pub fn as_f64(&self) -> DataResult<f64> {
        if let Some(text) = self.text() {
            return parse_text::<f64>(&text, "Float64");
        }
        Ok(self.numeric("Float64")?.map_or(0.0, |n| n.to_f64()))
    }

    /// Целое произвольной точности с учётом беззнаковых типов.
    pub fn as_big_integer(&self) -> DataResult<Option<BigInt>> {
        if self.is_container() {
            return Err(ValueError::unsupported(self.kind_name(), "BigInteger").into());
        }
        if self.is_null_or_empty() {
            return Ok(None);
        }

        let big = match self {
            Value::UInt64(Some(v)) => BigInt::from(v.get()),
            Value::WideInt { value: Some(b), .. } => b.clone(),
            Value::Uuid(Some(u)) => BigInt::from(u.as_u128()),
            Value::Ipv6(Some(ip)) => BigInt::from(u128::from(*ip)),
            Value::String { .. } => {
                let text = self.text().unwrap_or_default();
                BigInt::from_str(text.trim())
                    .map_err(|_| ValueError::number_format(text.as_ref(), "BigInteger"))?
            }
            Value::Float32(Some(f)) => float_to_big(*f as f64)?,
            Value::Float64(Some(f)) => float_to_big(*f)?,
            Value::Decimal { value: Some(d), .. } => {
                if !d.is_integer() {
                    return Err(ValueError::rounding(d, "BigInteger").into());
                }
                d.trunc()
            }
            other => match other.numeric("BigInteger")? {
                Some(n) => n.to_big(),
                None => return Ok(None),
            },
        };
        Ok(Some(big))
    }

    /// Десятичное число с масштабом `scale`.
    ///
    /// Целые виды трактуются как доли: `1` при масштабе 5 даёт `0.00001`.
    /// Decimal, Float и String переводятся в масштаб с отбрасыванием лишних
    /// разрядов. DateTime даёт `секунды.наносекунды`, Time целые секунды.
    pub fn as_big_decimal(
        &self,
        scale: u32,
    ) -> DataResult<Option<BigDecimal>> {
        if scale > MAX_DECIMAL_SCALE {
            return Err(ValueError::out_of_range(scale, "Decimal scale").into());
        }
        if self.is_container() {
            return Err(ValueError::unsupported(self.kind_name(), "Decimal").into());
        }
        if self.is_null_or_empty() {
            return Ok(None);
        }

        let d = match self {
            Value::Decimal { value: Some(d), .. } => d.with_scale(scale),
            Value::Float32(Some(f)) => float_to_decimal(*f as f64)?.with_scale(scale),
            Value::Float64(Some(f)) => float_to_decimal(*f)?.with_scale(scale),
            Value::String { .. } => {
                let text = self.text().unwrap_or_default();
                parse_decimal(&text)?.with_scale(scale)
            }
            Value::DateTime { value: Some(dt), .. } => {
                let nanos = temporal::epoch_second(dt) as i128 * NANOS_PER_SECOND as i128
                    + dt.nanosecond() as i128;
                BigDecimal::new(nanos, 9).with_scale(scale)
            }
            Value::Time { value: Some(n), .. } => {
                BigDecimal::from(*n / NANOS_PER_SECOND).with_scale(scale)
            }
            Value::Uuid(Some(u)) => BigDecimal::new(u.as_u128(), scale),
            Value::Ipv6(Some(ip)) => BigDecimal::new(u128::from(*ip), scale),
            other => match other.numeric("Decimal")? {
                Some(n) => BigDecimal::new(n.to_big(), scale),
                None => return Ok(None),
            },
        };
        Ok(Some(d))
    }

    /// Дата. DateTime даёт дату в своём часовом поясе, целые трактуются как
    /// день от 1970-01-01.
    pub fn as_date(&self) -> DataResult<Option<NaiveDate>> {
        if self.is_null_or_empty() && !self.is_container() {
            return Ok(None);
        }
        match self {
            Value::Date(Some(d)) => Ok(Some(*d)),
            Value::DateTime {
                value: Some(dt),
                tz,
                ..
            } => Ok(Some(local(dt, tz).date())),
            Value::String { .. } => {
                let text = self.text().unwrap_or_default();
                temporal::parse_date(&text)
                    .or_else(|| temporal::parse_date_time(&text).map(|dt| dt.date()))
                    .map(Some)
                    .ok_or_else(|| ValueError::number_format(text.as_ref(), "Date").into())
            }
            Value::Time { .. }
            | Value::Uuid(_)
            | Value::Ipv4(_)
            | Value::Ipv6(_)
            | Value::Array { .. }
            | Value::Map { .. }
            | Value::Tuple { .. }
            | Value::Nested { .. } => Err(ValueError::unsupported(self.kind_name(), "Date").into()),
            other => {
                let day = other.numeric("Date")?.map_or(0, |n| n.to_i128());
                i64::try_from(day)
                    .ok()
                    .and_then(temporal::date_from_epoch_day)
                    .map(Some)
                    .ok_or_else(|| ValueError::date_time_range(day, "Date").into())
            }
        }
    }

    /// Локальные дата и время в часовом поясе значения с точностью `scale`.
    /// Числа трактуются как секунды от начала эпохи.
    pub fn as_date_time(
        &self,
        scale: u32,
    ) -> DataResult<Option<NaiveDateTime>> {
        if self.is_null_or_empty() && !self.is_container() {
            return Ok(None);
        }
        let dt = match self {
            Value::DateTime {
                value: Some(dt),
                tz,
                ..
            } => local(dt, tz),
            Value::Date(Some(d)) => d.and_time(chrono::NaiveTime::MIN),
            Value::String { .. } => {
                let text = self.text().unwrap_or_default();
                temporal::parse_date_time(&text)
                    .ok_or_else(|| ValueError::number_format(text.as_ref(), "DateTime"))?
            }
            Value::Time { .. }
            | Value::Uuid(_)
            | Value::Ipv4(_)
            | Value::Ipv6(_)
            | Value::Array { .. }
            | Value::Map { .. }
            | Value::Tuple { .. }
            | Value::Nested { .. } => {
                return Err(ValueError::unsupported(self.kind_name(), "DateTime").into())
            }
            other => match other.numeric("DateTime")? {
                Some(n) => seconds_to_date_time(&n)?,
                None => return Ok(None),
            },
        };
        Ok(Some(temporal::truncate_date_time(dt, scale)))
    }

    /// Момент времени со смещением часового пояса значения.
    pub fn as_offset_date_time(&self) -> DataResult<Option<DateTime<FixedOffset>>> {
        match self {
            Value::DateTime {
                value: Some(dt),
                tz,
                ..
            } => Ok(Some(dt.and_utc().with_timezone(&tz.offset()))),
            other => Ok(other
                .as_date_time(9)?
                .map(|dt| dt.and_utc().fixed_offset())),
        }
    }

    /// Время суток или длительность. Числа трактуются как секунды.
    pub fn as_time(&self) -> DataResult<Option<TimeDelta>> {
        if self.is_null_or_empty() && !self.is_container() {
            return Ok(None);
        }
        match self {
            Value::Time { value: Some(n), .. } => Ok(Some(TimeDelta::nanoseconds(*n))),
            Value::DateTime {
                value: Some(dt),
                tz,
                ..
            } => {
                let t = local(dt, tz).time();
                Ok(Some(t.signed_duration_since(chrono::NaiveTime::MIN)))
            }
            Value::String { .. } => {
                let text = self.text().unwrap_or_default();
                temporal::parse_time(&text)
                    .map(|n| Some(TimeDelta::nanoseconds(n)))
                    .ok_or_else(|| ValueError::number_format(text.as_ref(), "Time").into())
            }
            Value::Date(_)
            | Value::Uuid(_)
            | Value::Ipv4(_)
            | Value::Ipv6(_)
            | Value::Array { .. }
            | Value::Map { .. }
            | Value::Tuple { .. }
            | Value::Nested { .. } => Err(ValueError::unsupported(self.kind_name(), "Time").into()),
            other => {
                let seconds = other.numeric("Time")?.map_or(0, |n| n.to_i128());
                i64::try_from(seconds)
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .map(Some)
                    .ok_or_else(|| ValueError::date_time_range(seconds, "Time").into())
            }
        }
    }

    /// UUID; числа трактуются как 128-битная беззнаковая величина.
    pub fn as_uuid(&self) -> DataResult<Option<Uuid>> {
        match self {
            Value::Uuid(u) => Ok(*u),
            Value::String { .. } if !self.is_null_or_empty() => {
                let text = self.text().unwrap_or_default();
                Uuid::parse_str(text.trim())
                    .map(Some)
                    .map_err(|_| ValueError::number_format(text.as_ref(), "UUID").into())
            }
            _ => Ok(self
                .magnitude("UUID", |b| b.to_u128())?
                .map(Uuid::from_u128)),
        }
    }

    pub fn as_ipv4(&self) -> DataResult<Option<Ipv4Addr>> {
        match self {
            Value::Ipv4(ip) => Ok(*ip),
            Value::Ipv6(None) => Ok(None),
            Value::Ipv6(Some(ip)) => ip
                .to_ipv4_mapped()
                .map(Some)
                .ok_or_else(|| ValueError::illegal(format!("{ip} is not an IPv4-mapped address")).into()),
            Value::String { .. } if !self.is_null_or_empty() => {
                match parse_ip(&self.text().unwrap_or_default())? {
                    IpAddr::V4(ip) => Ok(Some(ip)),
                    IpAddr::V6(ip) => ip.to_ipv4_mapped().map(Some).ok_or_else(|| {
                        ValueError::illegal(format!("{ip} is not an IPv4-mapped address")).into()
                    }),
                }
            }
            _ => Ok(self
                .magnitude("IPv4", |b| b.to_u32())?
                .map(Ipv4Addr::from)),
        }
    }

    pub fn as_ipv6(&self) -> DataResult<Option<Ipv6Addr>> {
        match self {
            Value::Ipv6(ip) => Ok(*ip),
            Value::Ipv4(ip) => Ok(ip.map(|v| v.to_ipv6_mapped())),
            Value::String { .. } if !self.is_null_or_empty() => {
                match parse_ip(&self.text().unwrap_or_default())? {
                    IpAddr::V4(ip) => Ok(Some(ip.to_ipv6_mapped())),
                    IpAddr::V6(ip) => Ok(Some(ip)),
                }
            }
            _ => Ok(self
                .magnitude("IPv6", |b| b.to_u128())?
                .map(Ipv6Addr::from)),
        }
    }

    /// Неотрицательная величина, помещающаяся в целевой тип.
    fn magnitude<T>(
        &self,
        target: &str,
        narrow: impl Fn(&BigInt) -> Option<T>,
    ) -> DataResult<Option<T>> {
        match self.as_big_integer()? {
            None => Ok(None),
            Some(big) => narrow(&big).map(Some).ok_or_else(|| {
                ValueError::illegal(format!("{big} is negative or too large for {target}")).into()
            }),
        }
    }

    /// Представление на стороне приложения.
    pub fn as_object(&self) -> Object {
        if self.is_null() {
            return Object::Null;
        }
        match self {
            Value::Bool(Some(v)) => Object::Bool(*v),
            Value::Int8(Some(v)) => Object::I8(*v),
            Value::Int16(Some(v)) => Object::I16(*v),
            Value::Int32(Some(v)) => Object::I32(*v),
            Value::Int64(Some(v)) => Object::I64(*v),
            Value::UInt8(Some(v)) => Object::U8(*v),
            Value::UInt16(Some(v)) => Object::U16(*v),
            Value::UInt32(Some(v)) => Object::U32(*v),
            Value::UInt64(Some(v)) => Object::U64(*v),
            Value::Float32(Some(v)) => Object::F32(*v),
            Value::Float64(Some(v)) => Object::F64(*v),
            Value::WideInt { value: Some(b), .. } => Object::BigInteger(b.clone()),
            Value::Decimal { value: Some(d), .. } => Object::Decimal(d.clone()),
            Value::String {
                value: Some(bytes),
                binary: true,
            } => Object::Bytes(bytes.clone()),
            Value::String {
                value: Some(bytes),
                ..
            } => Object::String(String::from_utf8_lossy(bytes).into_owned()),
            Value::Date(Some(d)) => Object::Date(*d),
            Value::DateTime {
                value: Some(dt),
                tz,
                ..
            } => Object::DateTime(local(dt, tz)),
            Value::Time { value: Some(n), .. } => Object::Duration(TimeDelta::nanoseconds(*n)),
            Value::Enum {
                value: Some(code),
                def,
            } => match def.name_of(*code) {
                Some(name) => Object::String(name.to_string()),
                None => Object::I16(*code),
            },
            Value::Uuid(Some(u)) => Object::Uuid(*u),
            Value::Ipv4(Some(ip)) => Object::Ipv4(*ip),
            Value::Ipv6(Some(ip)) => Object::Ipv6(*ip),
            Value::Array { .. } => Object::Array(self.as_array()),
            Value::Map { keys, values, .. } => Object::Map(
                keys.iter()
                    .zip(values)
                    .map(|(k, v)| (k.as_object(), v.as_object()))
                    .collect(),
            ),
            Value::Tuple { fields, .. } => {
                Object::Tuple(fields.iter().map(Value::as_object).collect())
            }
            Value::Nested { rows, .. } => Object::Array(ArrayObject::Objects(
                rows.iter()
                    .map(|row| Object::Tuple(row.iter().map(Value::as_object).collect()))
                    .collect(),
            )),
            _ => Object::Null,
        }
    }

    /// Массив на стороне приложения.
    ///
    /// Скаляр даёт массив из одного элемента. Array с примитивным
    /// ненулевым элементом отдаёт вектор без упаковки, если не включён
    /// `use_objects_in_array`.
    pub fn as_array(&self) -> ArrayObject {
        match self {
            Value::Array {
                items,
                elem,
                primitive: true,
            } => primitive_array(items, elem),
            Value::Array { items, .. } => {
                ArrayObject::Objects(items.iter().map(Value::as_object).collect())
            }
            Value::Tuple { fields, .. } => {
                ArrayObject::Objects(fields.iter().map(Value::as_object).collect())
            }
            Value::Map { keys, values, .. } => ArrayObject::Objects(
                keys.iter()
                    .zip(values)
                    .map(|(k, v)| Object::Tuple(vec![k.as_object(), v.as_object()]))
                    .collect(),
            ),
            Value::Nested { .. } => match self.as_object() {
                Object::Array(rows) => rows,
                _ => ArrayObject::Objects(Vec::new()),
            },
            scalar => ArrayObject::Objects(vec![scalar.as_object()]),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Внутренние функции
////////////////////////////////////////////////////////////////////////////////

fn primitive_array(
    items: &[Value],
    elem: &Value,
) -> ArrayObject {
    match elem {
        Value::Bool(_) => {
            ArrayObject::Bools(items.iter().map(|v| v.as_bool().unwrap_or_default()).collect())
        }
        Value::Int8(_) => ArrayObject::I8(items.iter().map(|v| v.as_i8().unwrap_or_default()).collect()),
        Value::Int16(_) => {
            ArrayObject::I16(items.iter().map(|v| v.as_i16().unwrap_or_default()).collect())
        }
        Value::Int32(_) => {
            ArrayObject::I32(items.iter().map(|v| v.as_i32().unwrap_or_default()).collect())
        }
        Value::Int64(_) => {
            ArrayObject::I64(items.iter().map(|v| v.as_i64().unwrap_or_default()).collect())
        }
        Value::Float32(_) => {
            ArrayObject::F32(items.iter().map(|v| v.as_f32().unwrap_or_default()).collect())
        }
        Value::Float64(_) => {
            ArrayObject::F64(items.iter().map(|v| v.as_f64().unwrap_or_default()).collect())
        }
        _ => ArrayObject::Objects(items.iter().map(Value::as_object).collect()),
    }
}

/// Локальное время момента `dt` (UTC) в поясе `tz`.
pub(crate) fn local(
    dt: &NaiveDateTime,
    tz: &TimeZone,
) -> NaiveDateTime {
    dt.and_utc().with_timezone(&tz.offset()).naive_local()
}

pub(crate) fn parse_text<T: FromStr>(
    text: &str,
    target: &str,
) -> DataResult<T> {
    text.trim()
        .parse::<T>()
        .map_err(|_| ValueError::number_format(text, target).into())
}

/// Строка -> число: целое, затем Decimal, затем float.
fn parse_numeric(
    text: &str,
    target: &str,
) -> DataResult<Numeric> {
    let t = text.trim();
    if let Ok(v) = t.parse::<i128>() {
        return Ok(Numeric::Int(v));
    }
    if let Ok(d) = BigDecimal::from_str(t) {
        return Ok(Numeric::Decimal(d));
    }
    t.parse::<f64>()
        .map(Numeric::Float)
        .map_err(|_| ValueError::number_format(text, target).into())
}

pub(crate) fn parse_bool_text(text: &str) -> DataResult<bool> {
    let t = text.trim();
    if t.is_empty() || t == "0" || t.eq_ignore_ascii_case("false") || t.eq_ignore_ascii_case("no")
    {
        Ok(false)
    } else if t == "1" || t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("yes") {
        Ok(true)
    } else {
        Err(ValueError::InvalidBoolean {
            value: text.to_string(),
        }
        .into())
    }
}

pub(crate) fn parse_decimal(text: &str) -> DataResult<BigDecimal> {
    BigDecimal::from_str(text)
}

fn parse_ip(text: &str) -> DataResult<IpAddr> {
    IpAddr::from_str(text.trim())
        .map_err(|_| ValueError::number_format(text, "IP address").into())
}

fn float_to_big(f: f64) -> DataResult<BigInt> {
    if !f.is_finite() {
        return Err(ValueError::number_format(f.to_string(), "BigInteger").into());
    }
    BigInt::from_f64(f.trunc()).ok_or_else(|| ValueError::number_format(f.to_string(), "BigInteger").into())
}

/// Точное значение float.
pub(crate) fn float_to_decimal(f: f64) -> DataResult<BigDecimal> {
    BigDecimal::from_f64(f).ok_or_else(|| ValueError::number_format(f.to_string(), "Decimal").into())
}

fn seconds_to_date_time(n: &Numeric) -> DataResult<NaiveDateTime> {
    let ns = NANOS_PER_SECOND as i128;
    let (seconds, nanos) = match n {
        Numeric::Int(v) => (*v, 0),
        Numeric::Big(b) => (b.to_i128().unwrap_or(i128::MAX), 0),
        Numeric::Float(f) => {
            let s = f.floor();
            (s as i128, ((f - s) * NANOS_PER_SECOND as f64) as u32)
        }
        Numeric::Decimal(d) => {
            let total = d.with_scale(9).mantissa().to_i128().unwrap_or(i128::MAX);
            (total.div_euclid(ns), total.rem_euclid(ns) as u32)
        }
    };
    i64::try_from(seconds)
        .ok()
        .and_then(|s| temporal::date_time_from_parts(s, nanos.min(999_999_999)))
        .ok_or_else(|| ValueError::date_time_range(seconds, "DateTime").into())
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
