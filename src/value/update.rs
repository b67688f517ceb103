//! Присваивание значения из объекта приложения или другого значения.

use chdata_error::{DataResult, StackError, ValueError};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use uuid::Uuid;

use super::{
    convert::Numeric,
    decimal::BigDecimal,
    object::Object,
    temporal::{self, NANOS_PER_SECOND},
    Value,
};
use crate::{
    column::{EnumDef, TimeZone},
    unsigned::{UInt16, UInt32, UInt64, UInt8},
};

impl Value {
    /// Присваивает значение из объекта. Сужение следует правилам `as_*`,
    /// `Object::Null` переводит значение в null.
    ///
    /// # Ошибки
    ///
    /// Ошибка возвращается, если объект не укладывается в домен значения
    /// (булево вне таблицы, необъявленный код Enum, арность Tuple).
    pub fn update(
        &mut self,
        source: impl Into<Object>,
    ) -> DataResult<&mut Self> {
        let object = source.into();
        self.update_object(&object)?;
        Ok(self)
    }

    /// Копирует содержимое другого значения через его объектную проекцию.
    pub fn update_value(
        &mut self,
        source: &Value,
    ) -> DataResult<&mut Self> {
        if source.is_null() {
            self.reset_to_null_or_empty();
            return Ok(self);
        }
        // момент времени переносится без перевода через локальное время
        if let (
            Value::DateTime { value, scale, .. },
            Value::DateTime { value: Some(dt), .. },
        ) = (&mut *self, source)
        {
            *value = Some(temporal::truncate_date_time(*dt, *scale));
            return Ok(self);
        }

        let object = match source {
            Value::String {
                value: Some(bytes),
                ..
            } => Object::Bytes(bytes.clone()),
            Value::Enum {
                value: Some(code), ..
            } if !matches!(self, Value::Enum { .. }) => Object::I16(*code),
            other => other.as_object(),
        };
        self.update_object(&object)?;
        Ok(self)
    }

    pub(crate) fn update_object(
        &mut self,
        object: &Object,
    ) -> DataResult<()> {
        if object.is_null() {
            self.reset_to_null_or_empty();
            return Ok(());
        }
        if self.is_container() {
            return self.update_container(object);
        }

        match (&mut *self, object) {
            (Value::Bool(v), Object::Char(c)) => {
                *v = Some(bool_from_char(*c)?);
                return Ok(());
            }
            (Value::Uuid(v), Object::BigInteger(big)) => {
                *v = Some(Uuid::from_u128(big_magnitude(big, "UUID", |b| b.to_u128())?));
                return Ok(());
            }
            (Value::Ipv6(v), Object::BigInteger(big)) => {
                let bits = big_magnitude(big, "IPv6", |b| b.to_u128())?;
                *v = Some(bits.into());
                return Ok(());
            }
            _ => {}
        }

        let source = object_to_value(object)?;
        self.assign(&source)
    }

    fn assign(
        &mut self,
        src: &Value,
    ) -> DataResult<()> {
        let temporal_target = matches!(
            self,
            Value::Date(_) | Value::DateTime { .. } | Value::Time { .. }
        );
        if temporal_target && matches!(src, Value::String { .. }) && src.is_null_or_empty() {
            self.reset_to_default();
            return Ok(());
        }

        match self {
            Value::Bool(v) => *v = Some(src.as_bool()?),
            Value::Int8(v) => *v = Some(src.as_i8()?),
            Value::Int16(v) => *v = Some(src.as_i16()?),
            Value::Int32(v) => *v = Some(src.as_i32()?),
            Value::Int64(v) => *v = Some(src.as_i64()?),
            // текст разбирается в беззнаковом домене, числа обрезаются
            Value::UInt8(v) => {
                *v = Some(match src.text() {
                    Some(text) => UInt8::parse(text.trim())?,
                    None => UInt8::value_of(src.as_i8()?),
                })
            }
            Value::UInt16(v) => {
                *v = Some(match src.text() {
                    Some(text) => UInt16::parse(text.trim())?,
                    None => UInt16::value_of(src.as_i16()?),
                })
            }
            Value::UInt32(v) => {
                *v = Some(match src.text() {
                    Some(text) => UInt32::parse(text.trim())?,
                    None => UInt32::value_of(src.as_i32()?),
                })
            }
            Value::UInt64(v) => {
                *v = Some(match (src, src.text()) {
                    (Value::UInt64(Some(u)), _) => *u,
                    (_, Some(text)) => UInt64::parse(text.trim())?,
                    (other, None) => UInt64::value_of(other.as_i64()?),
                })
            }
            Value::Float32(v) => *v = Some(src.as_f32()?),
            Value::Float64(v) => *v = Some(src.as_f64()?),
            Value::WideInt { value, .. } => *value = src.as_big_integer()?,
            Value::Decimal { value, scale } => *value = real_decimal(src, *scale)?,
            Value::String { value, .. } => {
                *value = match src {
                    Value::String { value: v, .. } => v.clone(),
                    other => other.as_string().map(String::into_bytes),
                }
            }
            Value::Date(v) => *v = src.as_date()?,
            Value::DateTime { value, scale, tz } => *value = date_time_from(src, *scale, tz)?,
            Value::Time { value, scale } => *value = time_from(src, *scale)?,
            Value::Enum { value, def } => *value = Some(enum_code(src, def)?),
            Value::Uuid(v) => *v = src.as_uuid()?,
            Value::Ipv4(v) => *v = src.as_ipv4()?,
            Value::Ipv6(v) => *v = src.as_ipv6()?,
            container => {
                return Err(ValueError::unsupported(src.kind_name(), container.kind_name()).into())
            }
        }
        Ok(())
    }

    /// Пересобирает контейнер из прототипов. При ошибке прежнее
    /// содержимое сохраняется.
    fn update_container(
        &mut self,
        object: &Object,
    ) -> DataResult<()> {
        match (self, object) {
            (Value::Array { items, elem, .. }, Object::Array(_) | Object::Tuple(_)) => {
                let objects = object_list(object).unwrap_or_default();
                *items = build(elem, &objects)?;
            }
            (
                Value::Map {
                    keys,
                    values,
                    key,
                    value,
                },
                Object::Map(pairs),
            ) => {
                let mut new_keys = Vec::with_capacity(pairs.len());
                let mut new_values = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    new_keys.push(build_one(key, k)?);
                    new_values.push(build_one(value, v)?);
                }
                *keys = new_keys;
                *values = new_values;
            }
            (Value::Tuple { fields, types }, Object::Tuple(_) | Object::Array(_)) => {
                let objects = object_list(object).unwrap_or_default();
                check_arity("Tuple", types.len(), objects.len())?;
                *fields = types
                    .iter()
                    .zip(&objects)
                    .map(|(t, o)| build_one(t, o))
                    .collect::<DataResult<_>>()?;
            }
            (Value::Nested { rows, fields }, Object::Array(_)) => {
                let objects = object_list(object).unwrap_or_default();
                let mut new_rows = Vec::with_capacity(objects.len());
                for row in &objects {
                    let cells = object_list(row).ok_or_else(|| {
                        StackError::from(ValueError::unsupported(row.kind_name(), "Nested row"))
                    })?;
                    check_arity("Nested", fields.len(), cells.len())?;
                    new_rows.push(
                        fields
                            .iter()
                            .zip(&cells)
                            .map(|((_, t), o)| build_one(t, o))
                            .collect::<DataResult<Vec<_>>>()?,
                    );
                }
                *rows = new_rows;
            }
            (target, object) => {
                return Err(ValueError::unsupported(object.kind_name(), target.kind_name()).into())
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Внутренние функции
////////////////////////////////////////////////////////////////////////////////

fn build_one(
    prototype: &Value,
    object: &Object,
) -> DataResult<Value> {
    let mut v = Value::instantiate(prototype);
    v.update_object(object)?;
    Ok(v)
}

fn build(
    prototype: &Value,
    objects: &[Object],
) -> DataResult<Vec<Value>> {
    objects.iter().map(|o| build_one(prototype, o)).collect()
}

fn object_list(object: &Object) -> Option<Vec<Object>> {
    match object {
        Object::Array(arr) => Some(arr.clone().into_objects()),
        Object::Tuple(items) => Some(items.clone()),
        _ => None,
    }
}

fn check_arity(
    kind: &str,
    expected: usize,
    got: usize,
) -> DataResult<()> {
    if expected != got {
        return Err(ValueError::illegal(format!(
            "{kind} expects {expected} fields, got {got}"
        ))
        .into());
    }
    Ok(())
}

/// `1 T t Y y` -> true, `0 F f N n` -> false.
fn bool_from_char(c: char) -> DataResult<bool> {
    match c {
        '1' | 'T' | 't' | 'Y' | 'y' => Ok(true),
        '0' | 'F' | 'f' | 'N' | 'n' => Ok(false),
        other => Err(ValueError::InvalidBoolean {
            value: other.to_string(),
        }
        .into()),
    }
}

fn big_magnitude<T>(
    big: &BigInt,
    target: &str,
    narrow: impl Fn(&BigInt) -> Option<T>,
) -> DataResult<T> {
    narrow(big).ok_or_else(|| {
        ValueError::illegal(format!("{big} is negative or too large for {target}")).into()
    })
}

/// Временное значение-источник для объекта приложения.
fn object_to_value(object: &Object) -> DataResult<Value> {
    let v = match object {
        Object::Null => Value::String {
            value: None,
            binary: false,
        },
        Object::Bool(b) => Value::Bool(Some(*b)),
        Object::Char(c) => Value::string(c.to_string()),
        Object::I8(v) => Value::Int8(Some(*v)),
        Object::I16(v) => Value::Int16(Some(*v)),
        Object::I32(v) => Value::Int32(Some(*v)),
        Object::I64(v) => Value::Int64(Some(*v)),
        Object::U8(v) => Value::UInt8(Some(*v)),
        Object::U16(v) => Value::UInt16(Some(*v)),
        Object::U32(v) => Value::UInt32(Some(*v)),
        Object::U64(v) => Value::UInt64(Some(*v)),
        Object::F32(v) => Value::Float32(Some(*v)),
        Object::F64(v) => Value::Float64(Some(*v)),
        Object::BigInteger(big) => {
            if let Some(v) = big.to_i64() {
                Value::Int64(Some(v))
            } else if let Some(v) = big.to_u64() {
                Value::UInt64(Some(UInt64::from_unsigned(v)))
            } else {
                Value::Decimal {
                    value: Some(BigDecimal::from(big.clone())),
                    scale: 0,
                }
            }
        }
        Object::Decimal(d) => Value::Decimal {
            value: Some(d.clone()),
            scale: d.scale(),
        },
        Object::String(s) => Value::string(s.as_str()),
        Object::Bytes(b) => Value::String {
            value: Some(b.clone()),
            binary: true,
        },
        Object::Date(d) => Value::Date(Some(*d)),
        // локальное время без пояса
        Object::DateTime(dt) => Value::DateTime {
            value: Some(*dt),
            scale: 9,
            tz: TimeZone::utc(),
        },
        Object::Duration(d) => Value::Time {
            value: Some(
                d.num_nanoseconds()
                    .ok_or_else(|| ValueError::date_time_range(d, "Time"))?,
            ),
            scale: 9,
        },
        Object::Uuid(u) => Value::Uuid(Some(*u)),
        Object::Ipv4(ip) => Value::Ipv4(Some(*ip)),
        Object::Ipv6(ip) => Value::Ipv6(Some(*ip)),
        Object::Array(_) | Object::Map(_) | Object::Tuple(_) => {
            return Err(ValueError::unsupported(object.kind_name(), "scalar").into())
        }
    };
    Ok(v)
}

/// Вещественная величина источника в масштабе `scale`: целое `5` даёт
/// `5.00`, а не долю.
fn real_decimal(
    src: &Value,
    scale: u32,
) -> DataResult<Option<BigDecimal>> {
    match src {
        Value::Decimal { .. } | Value::Float32(_) | Value::Float64(_) | Value::String { .. } => {
            src.as_big_decimal(scale)
        }
        other => match other.numeric("Decimal")? {
            Some(n) => Ok(Some(BigDecimal::from(n.to_big()).with_scale(scale))),
            None => Ok(None),
        },
    }
}

fn is_integral(v: &Value) -> bool {
    matches!(
        v,
        Value::Int8(_)
            | Value::Int16(_)
            | Value::Int32(_)
            | Value::Int64(_)
            | Value::UInt8(_)
            | Value::UInt16(_)
            | Value::UInt32(_)
            | Value::UInt64(_)
    )
}

fn local_to_utc(
    dt: NaiveDateTime,
    tz: &TimeZone,
) -> DataResult<NaiveDateTime> {
    let offset = TimeDelta::seconds(tz.offset().local_minus_utc() as i64);
    dt.checked_sub_signed(offset)
        .ok_or_else(|| ValueError::date_time_range(dt, "DateTime").into())
}

/// Момент UTC для DateTime. Целые трактуются как тики масштаба значения,
/// дробные числа как секунды, даты и строки как локальное время в `tz`.
fn date_time_from(
    src: &Value,
    scale: u32,
    tz: &TimeZone,
) -> DataResult<Option<NaiveDateTime>> {
    let utc = match src {
        v if is_integral(v) => {
            let ticks = v.as_i64()?;
            temporal::date_time_from_ticks(ticks, scale)
                .ok_or_else(|| ValueError::date_time_range(ticks, "DateTime"))?
        }
        Value::DateTime { value: Some(dt), .. } => local_to_utc(*dt, tz)?,
        Value::Date(_) | Value::String { .. } => match src.as_date_time(9)? {
            Some(local) => local_to_utc(local, tz)?,
            None => return Ok(None),
        },
        Value::Float32(_) | Value::Float64(_) | Value::Decimal { .. } => {
            match src.numeric("DateTime")? {
                Some(n) => seconds_to_utc(n)?,
                None => return Ok(None),
            }
        }
        other => return Err(ValueError::unsupported(other.kind_name(), "DateTime").into()),
    };
    Ok(Some(temporal::truncate_date_time(utc, scale)))
}

fn seconds_to_utc(n: Numeric) -> DataResult<NaiveDateTime> {
    let nanos = match &n {
        Numeric::Decimal(d) => d.with_scale(9).mantissa().to_i128(),
        other => Some((other.to_f64() * NANOS_PER_SECOND as f64) as i128),
    };
    nanos
        .and_then(|n| i64::try_from(n).ok())
        .and_then(|n| temporal::date_time_from_ticks(n, 9))
        .ok_or_else(|| ValueError::date_time_range(n.to_f64(), "DateTime").into())
}

/// Наносекунды для Time. Целые трактуются как тики масштаба значения.
fn time_from(
    src: &Value,
    scale: u32,
) -> DataResult<Option<i64>> {
    let unit = temporal::pow10(9 - scale.min(9));
    let nanos = match src {
        v if is_integral(v) => {
            let ticks = v.as_i64()?;
            ticks
                .checked_mul(unit)
                .ok_or_else(|| ValueError::date_time_range(ticks, "Time"))?
        }
        Value::Time { value: Some(n), .. } => *n,
        Value::DateTime { value: Some(dt), .. } => {
            let since_midnight = dt.time().signed_duration_since(NaiveTime::MIN);
            since_midnight.num_nanoseconds().unwrap_or_default()
        }
        _ => match src.as_time()? {
            Some(d) => d
                .num_nanoseconds()
                .ok_or_else(|| ValueError::date_time_range(d, "Time"))?,
            None => return Ok(None),
        },
    };
    Ok(Some(nanos - nanos % unit))
}

fn enum_code(
    src: &Value,
    def: &EnumDef,
) -> DataResult<i16> {
    let invalid = |value: String| -> StackError {
        ValueError::InvalidEnum {
            value,
            enum_type: def.to_string(),
        }
        .into()
    };

    let code = match src {
        Value::String { .. } => {
            let text = src.as_string().unwrap_or_default();
            if let Some(code) = def.code_of(&text) {
                return Ok(code);
            }
            text.trim()
                .parse::<i16>()
                .map_err(|_| invalid(format!("'{text}'")))?
        }
        other => {
            let v = other.as_i64()?;
            i16::try_from(v).map_err(|_| invalid(v.to_string()))?
        }
    };
    if def.contains(code) {
        Ok(code)
    } else {
        Err(invalid(code.to_string()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
