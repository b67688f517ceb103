//! Дерево кодеков RowBinary: один узел на узел дескриптора типа.

use std::{
    borrow::Cow,
    io::{Read, Write},
    net::{Ipv4Addr, Ipv6Addr},
    sync::Arc,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chdata_error::{CodecError, DataResult, StackError, ValueError};
use chrono::NaiveDateTime;
use num_bigint::{BigInt, Sign};
use uuid::Uuid;

use crate::{
    column::{decimal_width, ColumnType, EnumDef, WideInt},
    stream::{eof_as, ByteInput, ByteOutput},
    unsigned::{UInt16, UInt32, UInt64, UInt8},
    value::{
        temporal::{self, NANOS_PER_SECOND},
        BigDecimal, Value,
    },
};

/// Чтение фиксированной ширины с ошибкой `UnexpectedEof` для типа.
macro_rules! read_fixed {
    ($input:expr, $method:ident, $what:expr, $width:expr) => {
        $input
            .$method::<LittleEndian>()
            .map_err(|e| eof_as(e, $what, $width))?
    };
    ($input:expr, $method:ident, $what:expr) => {
        $input.$method().map_err(|e| eof_as(e, $what, 1))?
    };
}

/// Узел кодека. Неизменяем и разделяется через `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Codec {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    /// Дополнительный код в 16 или 32 байтах little-endian.
    WideInt(WideInt),
    /// `width`: 4, 8, 16 или 32 байта мантиссы.
    Decimal {
        width: usize,
        scale: u32,
    },
    String,
    FixedString(usize),
    Date,
    Date32,
    /// `None`: u32 секунды, `Some(p)`: i64 тики.
    DateTime {
        precision: Option<u32>,
    },
    /// `None`: i32 секунды, `Some(p)`: i64 тики.
    Time {
        precision: Option<u32>,
    },
    Enum(Arc<EnumDef>),
    Uuid,
    Ipv4,
    Ipv6,
    Nullable(Arc<Codec>),
    LowCardinality(Arc<Codec>),
    Array(Arc<Codec>),
    Map(Arc<Codec>, Arc<Codec>),
    Tuple(Vec<Arc<Codec>>),
    /// Кодеки полей. На проводе: число строк, затем поля каждой строки.
    Nested(Vec<Arc<Codec>>),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Codec {
    pub fn build(column_type: &ColumnType) -> Arc<Codec> {
        Arc::new(match column_type {
            ColumnType::Interval(_) | ColumnType::Geo(_) => {
                return Self::build(&column_type.layout())
            }
            ColumnType::Bool => Codec::Bool,
            ColumnType::Int8 => Codec::Int8,
            ColumnType::Int16 => Codec::Int16,
            ColumnType::Int32 => Codec::Int32,
            ColumnType::Int64 => Codec::Int64,
            ColumnType::UInt8 => Codec::UInt8,
            ColumnType::UInt16 => Codec::UInt16,
            ColumnType::UInt32 => Codec::UInt32,
            ColumnType::UInt64 => Codec::UInt64,
            ColumnType::Float32 => Codec::Float32,
            ColumnType::Float64 => Codec::Float64,
            ColumnType::WideInt(kind) => Codec::WideInt(*kind),
            ColumnType::Decimal { precision, scale } => Codec::Decimal {
                width: decimal_width(*precision),
                scale: *scale,
            },
            ColumnType::String => Codec::String,
            ColumnType::FixedString(n) => Codec::FixedString(*n),
            ColumnType::Date => Codec::Date,
            ColumnType::Date32 => Codec::Date32,
            ColumnType::DateTime { precision, .. } => Codec::DateTime {
                precision: *precision,
            },
            ColumnType::Time { precision, .. } => Codec::Time {
                precision: *precision,
            },
            ColumnType::Enum(def) => Codec::Enum(Arc::clone(def)),
            ColumnType::Uuid => Codec::Uuid,
            ColumnType::Ipv4 => Codec::Ipv4,
            ColumnType::Ipv6 => Codec::Ipv6,
            ColumnType::Nullable(inner) => Codec::Nullable(Self::build(inner)),
            ColumnType::LowCardinality(inner) => Codec::LowCardinality(Self::build(inner)),
            ColumnType::Array(elem) => Codec::Array(Self::build(elem)),
            ColumnType::Map(k, v) => Codec::Map(Self::build(k), Self::build(v)),
            ColumnType::Tuple(fields) => {
                Codec::Tuple(fields.iter().map(|f| Self::build(&f.column_type)).collect())
            }
            ColumnType::Nested(fields) => {
                Codec::Nested(fields.iter().map(|f| Self::build(&f.column_type)).collect())
            }
        })
    }

    /// Имя для сообщений об ошибках.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Codec::Bool => "Bool",
            Codec::Int8 => "Int8",
            Codec::Int16 => "Int16",
            Codec::Int32 => "Int32",
            Codec::Int64 => "Int64",
            Codec::UInt8 => "UInt8",
            Codec::UInt16 => "UInt16",
            Codec::UInt32 => "UInt32",
            Codec::UInt64 => "UInt64",
            Codec::Float32 => "Float32",
            Codec::Float64 => "Float64",
            Codec::WideInt(kind) => kind.name(),
            Codec::Decimal { .. } => "Decimal",
            Codec::String => "String",
            Codec::FixedString(_) => "FixedString",
            Codec::Date => "Date",
            Codec::Date32 => "Date32",
            Codec::DateTime { precision: None } => "DateTime",
            Codec::DateTime { .. } => "DateTime64",
            Codec::Time { precision: None } => "Time",
            Codec::Time { .. } => "Time64",
            Codec::Enum(_) => "Enum",
            Codec::Uuid => "UUID",
            Codec::Ipv4 => "IPv4",
            Codec::Ipv6 => "IPv6",
            Codec::Nullable(_) => "Nullable",
            Codec::LowCardinality(_) => "LowCardinality",
            Codec::Array(_) => "Array",
            Codec::Map(..) => "Map",
            Codec::Tuple(_) => "Tuple",
            Codec::Nested(_) => "Nested",
        }
    }

    /// Читает одно значение в `value`, переиспользуя его элементы.
    pub(crate) fn read<R: Read + ?Sized>(
        &self,
        value: &mut Value,
        input: &mut R,
        limit: u64,
    ) -> DataResult<()> {
        match (self, value) {
            (Codec::Nullable(inner), value) => match read_fixed!(input, read_u8, "Nullable flag") {
                1 => {
                    value.reset_to_null_or_empty();
                }
                0 => inner.read(value, input, limit)?,
                flag => {
                    return Err(CodecError::corrupted(
                        "Nullable flag",
                        format!("expected 0 or 1, got {flag}"),
                    )
                    .into())
                }
            },
            (Codec::LowCardinality(inner), value) => inner.read(value, input, limit)?,
            (Codec::Bool, Value::Bool(v)) => {
                *v = Some(match read_fixed!(input, read_u8, "Bool") {
                    0 => false,
                    1 => true,
                    b => {
                        return Err(
                            CodecError::corrupted("Bool", format!("expected 0 or 1, got {b}")).into(),
                        )
                    }
                })
            }
            (Codec::Int8, Value::Int8(v)) => *v = Some(read_fixed!(input, read_i8, "Int8")),
            (Codec::Int16, Value::Int16(v)) => {
                *v = Some(read_fixed!(input, read_i16, "Int16", 2))
            }
            (Codec::Int32, Value::Int32(v)) => {
                *v = Some(read_fixed!(input, read_i32, "Int32", 4))
            }
            (Codec::Int64, Value::Int64(v)) => {
                *v = Some(read_fixed!(input, read_i64, "Int64", 8))
            }
            (Codec::UInt8, Value::UInt8(v)) => {
                *v = Some(UInt8::from_unsigned(read_fixed!(input, read_u8, "UInt8")))
            }
            (Codec::UInt8, Value::Int16(v)) => {
                *v = Some(read_fixed!(input, read_u8, "UInt8") as i16)
            }
            (Codec::UInt16, Value::UInt16(v)) => {
                *v = Some(UInt16::from_unsigned(read_fixed!(
                    input, read_u16, "UInt16", 2
                )))
            }
            (Codec::UInt16, Value::Int32(v)) => {
                *v = Some(read_fixed!(input, read_u16, "UInt16", 2) as i32)
            }
            (Codec::UInt32, Value::UInt32(v)) => {
                *v = Some(UInt32::from_unsigned(read_fixed!(
                    input, read_u32, "UInt32", 4
                )))
            }
            (Codec::UInt32, Value::Int64(v)) => {
                *v = Some(read_fixed!(input, read_u32, "UInt32", 4) as i64)
            }
            (Codec::UInt64, Value::UInt64(v)) => {
                *v = Some(UInt64::from_unsigned(read_fixed!(
                    input, read_u64, "UInt64", 8
                )))
            }
            (Codec::Float32, Value::Float32(v)) => {
                *v = Some(read_fixed!(input, read_f32, "Float32", 4))
            }
            (Codec::Float64, Value::Float64(v)) => {
                *v = Some(read_fixed!(input, read_f64, "Float64", 8))
            }
            (Codec::WideInt(kind), Value::WideInt { value, .. }) => {
                *value = Some(read_big(
                    input,
                    kind.width(),
                    kind.is_signed(),
                    kind.name(),
                )?);
            }
            (Codec::Decimal { width, scale }, Value::Decimal { value, .. }) => {
                let mantissa = match width {
                    4 => BigInt::from(read_fixed!(input, read_i32, "Decimal32", 4)),
                    8 => BigInt::from(read_fixed!(input, read_i64, "Decimal64", 8)),
                    16 => BigInt::from(read_fixed!(input, read_i128, "Decimal128", 16)),
                    _ => read_big(input, 32, true, "Decimal256")?,
                };
                *value = Some(BigDecimal::new(mantissa, *scale));
            }
            (Codec::String, Value::String { value, .. }) => {
                let n = input.read_length("String", limit)?;
                input.read_fully_into(value.get_or_insert_with(Vec::new), n)?;
            }
            (Codec::FixedString(n), Value::String { value, .. }) => {
                input.read_fully_into(value.get_or_insert_with(Vec::new), *n)?;
            }
            (Codec::Date, Value::Date(v)) => {
                let day = read_fixed!(input, read_u16, "Date", 2) as i64;
                *v = Some(date_from_wire(day, "Date")?);
            }
            (Codec::Date32, Value::Date(v)) => {
                let day = read_fixed!(input, read_i32, "Date32", 4) as i64;
                *v = Some(date_from_wire(day, "Date32")?);
            }
            (Codec::DateTime { precision: None }, Value::DateTime { value, .. }) => {
                let seconds = read_fixed!(input, read_u32, "DateTime", 4) as i64;
                *value = Some(
                    temporal::date_time_from_parts(seconds, 0)
                        .ok_or_else(|| out_of_range_on_wire("DateTime", seconds))?,
                );
            }
            (Codec::DateTime { precision: Some(p) }, Value::DateTime { value, .. }) => {
                let ticks = read_fixed!(input, read_i64, "DateTime64", 8);
                *value = Some(
                    temporal::date_time_from_ticks(ticks, *p)
                        .ok_or_else(|| out_of_range_on_wire("DateTime64", ticks))?,
                );
            }
            (Codec::Time { precision: None }, Value::Time { value, .. }) => {
                let seconds = read_fixed!(input, read_i32, "Time", 4) as i64;
                *value = Some(seconds * NANOS_PER_SECOND);
            }
            (Codec::Time { precision: Some(p) }, Value::Time { value, .. }) => {
                let ticks = read_fixed!(input, read_i64, "Time64", 8);
                let unit = temporal::pow10(9 - (*p).min(9));
                *value = Some(
                    ticks
                        .checked_mul(unit)
                        .ok_or_else(|| out_of_range_on_wire("Time64", ticks))?,
                );
            }
            (Codec::Enum(def), Value::Enum { value, .. }) => {
                let code = if def.bits() == 8 {
                    read_fixed!(input, read_i8, "Enum8") as i16
                } else {
                    read_fixed!(input, read_i16, "Enum16", 2)
                };
                if !def.contains(code) {
                    return Err(CodecError::corrupted(
                        format!("Enum{}", def.bits()),
                        format!("undeclared code {code}"),
                    )
                    .into());
                }
                *value = Some(code);
            }
            (Codec::Uuid, Value::Uuid(v)) => {
                let high = read_fixed!(input, read_u64, "UUID", 16);
                let low = read_fixed!(input, read_u64, "UUID", 16);
                *v = Some(Uuid::from_u64_pair(high, low));
            }
            (Codec::Ipv4, Value::Ipv4(v)) => {
                *v = Some(Ipv4Addr::from(read_fixed!(input, read_u32, "IPv4", 4)))
            }
            (Codec::Ipv6, Value::Ipv6(v)) => {
                let mut octets = [0u8; 16];
                input
                    .read_exact(&mut octets)
                    .map_err(|e| eof_as(e, "IPv6", 16))?;
                *v = Some(Ipv6Addr::from(octets));
            }
            (Codec::Array(codec), Value::Array { items, elem, .. }) => {
                let n = input.read_length("Array", limit)?;
                read_elements(codec, items, elem, n, input, limit)?;
            }
            (
                Codec::Map(key_codec, value_codec),
                Value::Map {
                    keys,
                    values,
                    key,
                    value,
                },
            ) => {
                let n = input.read_length("Map", limit)?;
                read_elements(key_codec, keys, key, n, input, limit)?;
                read_elements(value_codec, values, value, n, input, limit)?;
            }
            (Codec::Tuple(codecs), Value::Tuple { fields, types }) => {
                if fields.len() != types.len() {
                    *fields = types.iter().map(Value::instantiate).collect();
                }
                for (codec, field) in codecs.iter().zip(fields.iter_mut()) {
                    codec.read(field, input, limit)?;
                }
            }
            (Codec::Nested(codecs), Value::Nested { rows, fields }) => {
                read_nested(codecs, rows, fields, input, limit)?;
            }
            (codec, value) => return Err(mismatch(codec, value)),
        }
        Ok(())
    }

    /// Пишет одно значение. Null в колонке без Nullable пишется как
    /// значение по умолчанию.
    pub(crate) fn write<W: Write + ?Sized>(
        &self,
        value: &Value,
        output: &mut W,
    ) -> DataResult<()> {
        match self {
            Codec::Nullable(inner) => {
                if value.is_null() {
                    output.write_byte(1)?;
                } else {
                    output.write_byte(0)?;
                    inner.write(value, output)?;
                }
            }
            Codec::LowCardinality(inner) => inner.write(value, output)?,
            Codec::Bool => output.write_u8(value.as_bool()? as u8)?,
            Codec::Int8 | Codec::UInt8 => output.write_i8(value.as_i8()?)?,
            Codec::Int16 | Codec::UInt16 => output.write_i16::<LittleEndian>(value.as_i16()?)?,
            Codec::Int32 | Codec::UInt32 => output.write_i32::<LittleEndian>(value.as_i32()?)?,
            Codec::Int64 => output.write_i64::<LittleEndian>(value.as_i64()?)?,
            Codec::UInt64 => {
                let bits = match (value, value.text()) {
                    (Value::UInt64(v), _) => v.map_or(0, |u| u.get()),
                    (_, Some(text)) if !text.starts_with('-') => UInt64::parse(&text)?.get(),
                    (other, _) => other.as_i64()? as u64,
                };
                output.write_u64::<LittleEndian>(bits)?
            }
            Codec::Float32 => output.write_f32::<LittleEndian>(value.as_f32()?)?,
            Codec::Float64 => output.write_f64::<LittleEndian>(value.as_f64()?)?,
            Codec::WideInt(kind) => {
                let big = value.as_big_integer()?.unwrap_or_default();
                let bytes = wide_int_bytes(&big, *kind)
                    .ok_or_else(|| ValueError::out_of_range(&big, kind.name()))?;
                output.write_bytes(&bytes)?
            }
            Codec::Decimal { width, scale } => {
                let mantissa = value
                    .as_big_decimal(*scale)?
                    .map(|d| d.mantissa().clone())
                    .unwrap_or_default();
                let bytes = fixed_le_bytes(&mantissa, *width).ok_or_else(|| {
                    ValueError::out_of_range(&mantissa, format!("Decimal{}", width * 8))
                })?;
                output.write_bytes(&bytes)?
            }
            Codec::String => {
                let bytes = string_bytes(value);
                output.write_var_uint(bytes.len() as u64)?;
                output.write_bytes(&bytes)?;
            }
            Codec::FixedString(n) => {
                let bytes = string_bytes(value);
                if bytes.len() > *n {
                    return Err(CodecError::ValueTooLarge {
                        what: format!("FixedString({n})"),
                        size: bytes.len() as u64,
                        limit: *n as u64,
                    }
                    .into());
                }
                output.write_bytes(&bytes)?;
                output.write_bytes(&vec![0u8; *n - bytes.len()])?;
            }
            Codec::Date => {
                let day = value.as_date()?.map_or(0, temporal::epoch_day);
                let day = u16::try_from(day).map_err(|_| ValueError::date_time_range(day, "Date"))?;
                output.write_u16::<LittleEndian>(day)?
            }
            Codec::Date32 => {
                let day = value.as_date()?.map_or(0, temporal::epoch_day);
                let day =
                    i32::try_from(day).map_err(|_| ValueError::date_time_range(day, "Date32"))?;
                output.write_i32::<LittleEndian>(day)?
            }
            Codec::DateTime { precision: None } => {
                let seconds = instant(value)?.map_or(0, |dt| temporal::epoch_second(&dt));
                let seconds = u32::try_from(seconds)
                    .map_err(|_| ValueError::date_time_range(seconds, "DateTime"))?;
                output.write_u32::<LittleEndian>(seconds)?
            }
            Codec::DateTime { precision: Some(p) } => {
                let ticks = match instant(value)? {
                    Some(dt) => temporal::date_time_to_ticks(&dt, *p)
                        .ok_or_else(|| ValueError::date_time_range(dt, "DateTime64"))?,
                    None => 0,
                };
                output.write_i64::<LittleEndian>(ticks)?
            }
            Codec::Time { precision: None } => {
                let seconds = time_nanos(value)?.div_euclid(NANOS_PER_SECOND);
                let seconds =
                    i32::try_from(seconds).map_err(|_| ValueError::date_time_range(seconds, "Time"))?;
                output.write_i32::<LittleEndian>(seconds)?
            }
            Codec::Time { precision: Some(p) } => {
                let unit = temporal::pow10(9 - (*p).min(9));
                output.write_i64::<LittleEndian>(time_nanos(value)?.div_euclid(unit))?
            }
            Codec::Enum(def) => {
                let code = enum_code(def, value)?;
                if def.bits() == 8 {
                    output.write_i8(code as i8)?
                } else {
                    output.write_i16::<LittleEndian>(code)?
                }
            }
            Codec::Uuid => {
                let (high, low) = value.as_uuid()?.unwrap_or_default().as_u64_pair();
                output.write_u64::<LittleEndian>(high)?;
                output.write_u64::<LittleEndian>(low)?;
            }
            Codec::Ipv4 => {
                let ip = value.as_ipv4()?.unwrap_or(Ipv4Addr::UNSPECIFIED);
                output.write_u32::<LittleEndian>(u32::from(ip))?
            }
            Codec::Ipv6 => {
                let ip = value.as_ipv6()?.unwrap_or(Ipv6Addr::UNSPECIFIED);
                output.write_bytes(&ip.octets())?
            }
            Codec::Array(codec) => match value {
                Value::Array { items, .. } => {
                    output.write_var_uint(items.len() as u64)?;
                    for item in items {
                        codec.write(item, output)?;
                    }
                }
                other => return Err(mismatch(self, other)),
            },
            Codec::Map(key_codec, value_codec) => match value {
                Value::Map { keys, values, .. } => {
                    output.write_var_uint(keys.len() as u64)?;
                    for k in keys {
                        key_codec.write(k, output)?;
                    }
                    for v in values {
                        value_codec.write(v, output)?;
                    }
                }
                other => return Err(mismatch(self, other)),
            },
            Codec::Tuple(codecs) => match value {
                Value::Tuple { fields, types } if fields.is_empty() => {
                    for (codec, prototype) in codecs.iter().zip(types.iter()) {
                        let mut default = prototype.clone();
                        default.reset_to_default();
                        codec.write(&default, output)?;
                    }
                }
                Value::Tuple { fields, .. } if fields.len() == codecs.len() => {
                    for (codec, field) in codecs.iter().zip(fields) {
                        codec.write(field, output)?;
                    }
                }
                other => return Err(mismatch(self, other)),
            },
            Codec::Nested(codecs) => match value {
                Value::Nested { rows, .. } => {
                    if let Some(row) = rows.iter().find(|r| r.len() != codecs.len()) {
                        return Err(CodecError::TypeMismatch {
                            expected: format!("Nested row of {} fields", codecs.len()),
                            got: format!("{} fields", row.len()),
                        }
                        .into());
                    }
                    output.write_var_uint(rows.len() as u64)?;
                    for row in rows {
                        for (codec, cell) in codecs.iter().zip(row) {
                            codec.write(cell, output)?;
                        }
                    }
                }
                other => return Err(mismatch(self, other)),
            },
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Внутренние функции
////////////////////////////////////////////////////////////////////////////////

fn read_elements<R: Read + ?Sized>(
    codec: &Codec,
    items: &mut Vec<Value>,
    prototype: &Value,
    n: usize,
    input: &mut R,
    limit: u64,
) -> DataResult<()> {
    items.truncate(n);
    for i in 0..n {
        if i == items.len() {
            items.push(Value::instantiate(prototype));
        }
        codec.read(&mut items[i], input, limit)?;
    }
    Ok(())
}

/// Nested: число строк, затем поля каждой строки по порядку.
fn read_nested<R: Read + ?Sized>(
    codecs: &[Arc<Codec>],
    rows: &mut Vec<Vec<Value>>,
    fields: &[(String, Value)],
    input: &mut R,
    limit: u64,
) -> DataResult<()> {
    let n = input.read_length("Nested", limit)?;
    rows.truncate(n);
    for r in 0..n {
        if r == rows.len() {
            rows.push(fields.iter().map(|(_, p)| Value::instantiate(p)).collect());
        }
        let row = &mut rows[r];
        if row.len() != fields.len() {
            *row = fields.iter().map(|(_, p)| Value::instantiate(p)).collect();
        }
        for (codec, cell) in codecs.iter().zip(row.iter_mut()) {
            codec.read(cell, input, limit)?;
        }
    }
    Ok(())
}

fn mismatch(
    codec: &Codec,
    value: &Value,
) -> StackError {
    CodecError::TypeMismatch {
        expected: codec.kind_name().to_string(),
        got: value.kind_name().to_string(),
    }
    .into()
}

fn out_of_range_on_wire(
    what: &str,
    raw: i64,
) -> StackError {
    CodecError::corrupted(what, format!("value {raw} is out of range")).into()
}

fn date_from_wire(
    day: i64,
    what: &str,
) -> DataResult<chrono::NaiveDate> {
    temporal::date_from_epoch_day(day).ok_or_else(|| out_of_range_on_wire(what, day))
}

/// Целое из `width` байт little-endian.
fn read_big<R: Read + ?Sized>(
    input: &mut R,
    width: usize,
    signed: bool,
    what: &str,
) -> DataResult<BigInt> {
    let mut buf = [0u8; 32];
    let buf = &mut buf[..width];
    input
        .read_exact(buf)
        .map_err(|e| eof_as(e, what, width as u64))?;
    Ok(if signed {
        BigInt::from_signed_bytes_le(buf)
    } else {
        BigInt::from_bytes_le(Sign::Plus, buf)
    })
}

/// Дополнительный код в `width` байтах; `None`, если не помещается.
fn fixed_le_bytes(
    big: &BigInt,
    width: usize,
) -> Option<Vec<u8>> {
    let mut bytes = big.to_signed_bytes_le();
    if bytes.len() > width {
        return None;
    }
    let fill = if big.sign() == Sign::Minus { 0xFF } else { 0 };
    bytes.resize(width, fill);
    Some(bytes)
}

/// Беззнаковые виды принимают `0..2^n`. Знаковые принимают
/// `-2^(n-1)..2^n`: неотрицательное значение пишется своими битами.
fn wide_int_bytes(
    big: &BigInt,
    kind: WideInt,
) -> Option<Vec<u8>> {
    let width = kind.width();
    let negative = big.sign() == Sign::Minus;
    if negative && !kind.is_signed() {
        return None;
    }
    if negative {
        return fixed_le_bytes(big, width);
    }
    let (_, magnitude) = big.to_bytes_le();
    if magnitude.len() > width {
        return None;
    }
    let mut bytes = magnitude;
    bytes.resize(width, 0);
    Some(bytes)
}

fn string_bytes(value: &Value) -> Cow<'_, [u8]> {
    match value {
        Value::String { value, .. } => Cow::Borrowed(value.as_deref().unwrap_or_default()),
        other => Cow::Owned(other.as_string().unwrap_or_default().into_bytes()),
    }
}

/// Момент UTC: DateTime хранит его напрямую, остальные виды проходят через
/// `as_offset_date_time`.
fn instant(value: &Value) -> DataResult<Option<NaiveDateTime>> {
    match value {
        Value::DateTime { value, .. } => Ok(*value),
        other => Ok(other.as_offset_date_time()?.map(|dt| dt.naive_utc())),
    }
}

fn time_nanos(value: &Value) -> DataResult<i64> {
    match value {
        Value::Time { value, .. } => Ok(value.unwrap_or(0)),
        other => match other.as_time()? {
            Some(d) => d
                .num_nanoseconds()
                .ok_or_else(|| ValueError::date_time_range(d, "Time").into()),
            None => Ok(0),
        },
    }
}

/// Код Enum для записи. Null пишется как 0 без проверки домена.
fn enum_code(
    def: &Arc<EnumDef>,
    value: &Value,
) -> DataResult<i16> {
    let code = match value {
        Value::Enum { value: None, .. } => return Ok(0),
        Value::Enum { value: Some(code), .. } => *code,
        other if other.is_null() => return Ok(0),
        other => {
            let mut converted = Value::Enum {
                value: None,
                def: Arc::clone(def),
            };
            converted.update_value(other)?;
            match converted {
                Value::Enum { value, .. } => value.unwrap_or(0),
                _ => 0,
            }
        }
    };
    if !def.contains(code) {
        return Err(ValueError::InvalidEnum {
            value: code.to_string(),
            enum_type: def.to_string(),
        }
        .into());
    }
    Ok(code)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
