use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use num_bigint::BigInt;
use uuid::Uuid;

use super::decimal::BigDecimal;
use crate::unsigned::{UInt16, UInt32, UInt64, UInt8};

/// Представление значения на стороне приложения.
///
/// Результат [`Value::as_object`](super::Value::as_object) и вход
/// [`Value::update`](super::Value::update).
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(UInt8),
    U16(UInt16),
    U32(UInt32),
    U64(UInt64),
    F32(f32),
    F64(f64),
    BigInteger(BigInt),
    Decimal(BigDecimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    /// Локальное время в часовом поясе колонки.
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
    Uuid(Uuid),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Array(ArrayObject),
    Map(Vec<(Object, Object)>),
    Tuple(Vec<Object>),
}

/// Массив на стороне приложения: вектор примитивов без упаковки или
/// вектор объектов.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayObject {
    Objects(Vec<Object>),
    Bools(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Object {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Имя вида объекта для сообщений об ошибках.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Char(_) => "Char",
            Self::I8(_) => "Int8",
            Self::I16(_) => "Int16",
            Self::I32(_) => "Int32",
            Self::I64(_) => "Int64",
            Self::U8(_) => "UInt8",
            Self::U16(_) => "UInt16",
            Self::U32(_) => "UInt32",
            Self::U64(_) => "UInt64",
            Self::F32(_) => "Float32",
            Self::F64(_) => "Float64",
            Self::BigInteger(_) => "BigInteger",
            Self::Decimal(_) => "Decimal",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Date(_) => "Date",
            Self::DateTime(_) => "DateTime",
            Self::Duration(_) => "Duration",
            Self::Uuid(_) => "UUID",
            Self::Ipv4(_) => "IPv4",
            Self::Ipv6(_) => "IPv6",
            Self::Array(_) => "Array",
            Self::Map(_) => "Map",
            Self::Tuple(_) => "Tuple",
        }
    }
}

impl ArrayObject {
    pub fn len(&self) -> usize {
        match self {
            Self::Objects(v) => v.len(),
            Self::Bools(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true`, если элементы хранятся без упаковки.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Objects(_))
    }

    /// Упаковывает элементы в объекты.
    pub fn into_objects(self) -> Vec<Object> {
        match self {
            Self::Objects(v) => v,
            Self::Bools(v) => v.into_iter().map(Object::Bool).collect(),
            Self::I8(v) => v.into_iter().map(Object::I8).collect(),
            Self::I16(v) => v.into_iter().map(Object::I16).collect(),
            Self::I32(v) => v.into_iter().map(Object::I32).collect(),
            Self::I64(v) => v.into_iter().map(Object::I64).collect(),
            Self::F32(v) => v.into_iter().map(Object::F32).collect(),
            Self::F64(v) => v.into_iter().map(Object::F64).collect(),
        }
    }
}

macro_rules! object_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Object {
                fn from(v: $ty) -> Self {
                    Object::$variant(v)
                }
            }
        )*
    };
}

object_from!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    UInt8 => U8,
    UInt16 => U16,
    UInt32 => U32,
    UInt64 => U64,
    f32 => F32,
    f64 => F64,
    BigInt => BigInteger,
    BigDecimal => Decimal,
    String => String,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    TimeDelta => Duration,
    Uuid => Uuid,
    Ipv4Addr => Ipv4,
    Ipv6Addr => Ipv6,
    ArrayObject => Array,
    Vec<(Object, Object)> => Map,
);

impl From<u8> for Object {
    fn from(v: u8) -> Self {
        Object::U8(UInt8::from(v))
    }
}

impl From<u16> for Object {
    fn from(v: u16) -> Self {
        Object::U16(UInt16::from(v))
    }
}

impl From<u32> for Object {
    fn from(v: u32) -> Self {
        Object::U32(UInt32::from(v))
    }
}

impl From<u64> for Object {
    fn from(v: u64) -> Self {
        Object::U64(UInt64::from(v))
    }
}

impl From<rust_decimal::Decimal> for Object {
    fn from(v: rust_decimal::Decimal) -> Self {
        Object::Decimal(BigDecimal::from(v))
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::String(v.to_string())
    }
}

impl From<&[u8]> for Object {
    fn from(v: &[u8]) -> Self {
        Object::Bytes(v.to_vec())
    }
}

impl From<Vec<Object>> for Object {
    fn from(v: Vec<Object>) -> Self {
        Object::Array(ArrayObject::Objects(v))
    }
}

impl<T: Into<Object>> From<Option<T>> for Object {
    fn from(v: Option<T>) -> Self {
        v.map_or(Object::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Object::from(255u8), Object::U8(UInt8::MAX_VALUE));
        assert_eq!(Object::from("x"), Object::String("x".into()));
        assert_eq!(Object::from(None::<i32>), Object::Null);
        assert_eq!(Object::from(Some(1i64)), Object::I64(1));
        assert_eq!(Object::from(vec![Object::I8(1)]).kind_name(), "Array");
        assert_eq!(
            Object::from(rust_decimal::Decimal::new(-5, 1)),
            Object::Decimal(BigDecimal::new(-5, 1))
        );
    }

    /// Тест проверяет упаковку примитивного массива в объекты.
    #[test]
    fn test_array_into_objects() {
        let arr = ArrayObject::I32(vec![1, 2]);
        assert!(arr.is_primitive());
        assert_eq!(arr.len(), 2);
        assert_eq!(
            arr.into_objects(),
            vec![Object::I32(1), Object::I32(2)]
        );
        assert!(ArrayObject::Objects(vec![]).is_empty());
    }
}
