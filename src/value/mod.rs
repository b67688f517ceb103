//! Типизированное значение колонки.
//!
//! [`Value`]: изменяемый контейнер одного значения, который переиспользуется
//! от строки к строке. Каждый скалярный вариант хранит `Option`: `None`
//! означает состояние null-or-empty. Контейнеры хранят прототипы дочерних
//! значений (`Arc<Value>`), из которых создаются элементы.

pub mod convert;
pub mod decimal;
pub mod object;
pub mod sql;
pub(crate) mod temporal;
pub mod update;

use std::{
    net::{Ipv4Addr, Ipv6Addr},
    sync::Arc,
};

use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::BigInt;
use uuid::Uuid;

// Публичный экспорт
pub use decimal::BigDecimal;
pub use object::{ArrayObject, Object};

use crate::{
    column::{ColumnType, EnumDef, TimeZone, WideInt},
    config::DataConfig,
    unsigned::{UInt16, UInt32, UInt64, UInt8},
};

/// Значение одной колонки.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<UInt8>),
    UInt16(Option<UInt16>),
    UInt32(Option<UInt32>),
    UInt64(Option<UInt64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    /// Int128/UInt128/Int256/UInt256. Диапазон проверяется при записи.
    WideInt {
        value: Option<BigInt>,
        kind: WideInt,
    },
    Decimal {
        value: Option<BigDecimal>,
        scale: u32,
    },
    /// Байты строки; `binary` выставляется для `use_binary_string`.
    String {
        value: Option<Vec<u8>>,
        binary: bool,
    },
    Date(Option<NaiveDate>),
    /// Момент времени в UTC; `tz` используется только для отображения.
    DateTime {
        value: Option<NaiveDateTime>,
        scale: u32,
        tz: TimeZone,
    },
    /// Наносекунды (могут быть отрицательными и превышать сутки).
    Time {
        value: Option<i64>,
        scale: u32,
    },
    Enum {
        value: Option<i16>,
        def: Arc<EnumDef>,
    },
    Uuid(Option<Uuid>),
    Ipv4(Option<Ipv4Addr>),
    Ipv6(Option<Ipv6Addr>),
    /// `primitive`: элементы отдаются `as_array` вектором без упаковки.
    Array {
        items: Vec<Value>,
        elem: Arc<Value>,
        primitive: bool,
    },
    Map {
        keys: Vec<Value>,
        values: Vec<Value>,
        key: Arc<Value>,
        value: Arc<Value>,
    },
    Tuple {
        fields: Vec<Value>,
        types: Arc<[Value]>,
    },
    Nested {
        rows: Vec<Vec<Value>>,
        fields: Arc<[(String, Value)]>,
    },
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Value {
    /// Строковое значение (не бинарное).
    pub fn string(s: impl Into<String>) -> Self {
        Self::String {
            value: Some(s.into().into_bytes()),
            binary: false,
        }
    }

    /// Пустой массив с прототипом элемента.
    pub fn array_of(elem: Value) -> Self {
        let primitive = matches!(
            elem,
            Self::Bool(_)
                | Self::Int8(_)
                | Self::Int16(_)
                | Self::Int32(_)
                | Self::Int64(_)
                | Self::Float32(_)
                | Self::Float64(_)
        );
        Self::Array {
            items: Vec::new(),
            elem: Arc::new(elem),
            primitive,
        }
    }

    /// Имя вида значения для сообщений об ошибках.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::UInt8(_) => "UInt8",
            Self::UInt16(_) => "UInt16",
            Self::UInt32(_) => "UInt32",
            Self::UInt64(_) => "UInt64",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::WideInt { kind, .. } => kind.name(),
            Self::Decimal { .. } => "Decimal",
            Self::String { .. } => "String",
            Self::Date(_) => "Date",
            Self::DateTime { .. } => "DateTime",
            Self::Time { .. } => "Time",
            Self::Enum { .. } => "Enum",
            Self::Uuid(_) => "UUID",
            Self::Ipv4(_) => "IPv4",
            Self::Ipv6(_) => "IPv6",
            Self::Array { .. } => "Array",
            Self::Map { .. } => "Map",
            Self::Tuple { .. } => "Tuple",
            Self::Nested { .. } => "Nested",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Array { .. } | Self::Map { .. } | Self::Tuple { .. } | Self::Nested { .. }
        )
    }

    /// `true`, если скалярное значение равно null. Контейнеры не бывают null.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Bool(v) => v.is_none(),
            Self::Int8(v) => v.is_none(),
            Self::Int16(v) => v.is_none(),
            Self::Int32(v) => v.is_none(),
            Self::Int64(v) => v.is_none(),
            Self::UInt8(v) => v.is_none(),
            Self::UInt16(v) => v.is_none(),
            Self::UInt32(v) => v.is_none(),
            Self::UInt64(v) => v.is_none(),
            Self::Float32(v) => v.is_none(),
            Self::Float64(v) => v.is_none(),
            Self::WideInt { value, .. } => value.is_none(),
            Self::Decimal { value, .. } => value.is_none(),
            Self::String { value, .. } => value.is_none(),
            Self::Date(v) => v.is_none(),
            Self::DateTime { value, .. } => value.is_none(),
            Self::Time { value, .. } => value.is_none(),
            Self::Enum { value, .. } => value.is_none(),
            Self::Uuid(v) => v.is_none(),
            Self::Ipv4(v) => v.is_none(),
            Self::Ipv6(v) => v.is_none(),
            Self::Array { .. } | Self::Map { .. } | Self::Tuple { .. } | Self::Nested { .. } => {
                false
            }
        }
    }

    /// `true` для null, пустой строки и контейнера без элементов.
    pub fn is_null_or_empty(&self) -> bool {
        match self {
            Self::String { value, .. } => value.as_ref().map_or(true, |b| b.is_empty()),
            Self::Array { items, .. } => items.is_empty(),
            Self::Map { keys, .. } => keys.is_empty(),
            Self::Tuple { fields, .. } => fields.is_empty(),
            Self::Nested { rows, .. } => rows.is_empty(),
            other => other.is_null(),
        }
    }

    /// `true` для строк, созданных с `use_binary_string`.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::String { binary: true, .. })
    }

    /// Переводит значение в состояние null-or-empty. Прототипы сохраняются.
    pub fn reset_to_null_or_empty(&mut self) -> &mut Self {
        match self {
            Self::Bool(v) => *v = None,
            Self::Int8(v) => *v = None,
            Self::Int16(v) => *v = None,
            Self::Int32(v) => *v = None,
            Self::Int64(v) => *v = None,
            Self::UInt8(v) => *v = None,
            Self::UInt16(v) => *v = None,
            Self::UInt32(v) => *v = None,
            Self::UInt64(v) => *v = None,
            Self::Float32(v) => *v = None,
            Self::Float64(v) => *v = None,
            Self::WideInt { value, .. } => *value = None,
            Self::Decimal { value, .. } => *value = None,
            Self::String { value, .. } => *value = None,
            Self::Date(v) => *v = None,
            Self::DateTime { value, .. } => *value = None,
            Self::Time { value, .. } => *value = None,
            Self::Enum { value, .. } => *value = None,
            Self::Uuid(v) => *v = None,
            Self::Ipv4(v) => *v = None,
            Self::Ipv6(v) => *v = None,
            Self::Array { items, .. } => items.clear(),
            Self::Map { keys, values, .. } => {
                keys.clear();
                values.clear();
            }
            Self::Tuple { fields, .. } => fields.clear(),
            Self::Nested { rows, .. } => rows.clear(),
        }
        self
    }

    /// Переводит значение в значение по умолчанию своего типа: ноль, пустая
    /// строка, 1970-01-01, первый код Enum, нулевой UUID/IP. Tuple получает
    /// значения по умолчанию во всех полях.
    pub fn reset_to_default(&mut self) -> &mut Self {
        match self {
            Self::Bool(v) => *v = Some(false),
            Self::Int8(v) => *v = Some(0),
            Self::Int16(v) => *v = Some(0),
            Self::Int32(v) => *v = Some(0),
            Self::Int64(v) => *v = Some(0),
            Self::UInt8(v) => *v = Some(UInt8::ZERO),
            Self::UInt16(v) => *v = Some(UInt16::ZERO),
            Self::UInt32(v) => *v = Some(UInt32::ZERO),
            Self::UInt64(v) => *v = Some(UInt64::ZERO),
            Self::Float32(v) => *v = Some(0.0),
            Self::Float64(v) => *v = Some(0.0),
            Self::WideInt { value, .. } => *value = Some(BigInt::default()),
            Self::Decimal { value, scale } => *value = Some(BigDecimal::zero(*scale)),
            Self::String { value, .. } => *value = Some(Vec::new()),
            Self::Date(v) => *v = Some(temporal::epoch_date()),
            Self::DateTime { value, .. } => *value = Some(temporal::epoch_date_time()),
            Self::Time { value, .. } => *value = Some(0),
            Self::Enum { value, def } => *value = Some(def.first_code()),
            Self::Uuid(v) => *v = Some(Uuid::nil()),
            Self::Ipv4(v) => *v = Some(Ipv4Addr::UNSPECIFIED),
            Self::Ipv6(v) => *v = Some(Ipv6Addr::UNSPECIFIED),
            Self::Tuple { fields, types } => {
                fields.clear();
                fields.extend(types.iter().map(|t| {
                    let mut v = t.clone();
                    v.reset_to_default();
                    v
                }));
            }
            Self::Array { items, .. } => items.clear(),
            Self::Map { keys, values, .. } => {
                keys.clear();
                values.clear();
            }
            Self::Nested { rows, .. } => rows.clear(),
        }
        self
    }

    /// Копия значения. Обе копии независимы для изменения; глубокая копия
    /// также дублирует прототипы дочерних значений.
    pub fn copy(
        &self,
        deep: bool,
    ) -> Value {
        let mut copy = self.clone();
        if deep {
            copy.detach_prototypes();
        }
        copy
    }

    fn detach_prototypes(&mut self) {
        match self {
            Self::Array { items, elem, .. } => {
                *elem = Arc::new(elem.copy(true));
                items.iter_mut().for_each(Self::detach_prototypes);
            }
            Self::Map {
                keys,
                values,
                key,
                value,
            } => {
                *key = Arc::new(key.copy(true));
                *value = Arc::new(value.copy(true));
                keys.iter_mut().for_each(Self::detach_prototypes);
                values.iter_mut().for_each(Self::detach_prototypes);
            }
            Self::Tuple { fields, types } => {
                *types = types.iter().map(|t| t.copy(true)).collect();
                fields.iter_mut().for_each(Self::detach_prototypes);
            }
            Self::Nested { rows, fields } => {
                *fields = fields
                    .iter()
                    .map(|(n, t)| (n.clone(), t.copy(true)))
                    .collect();
                rows.iter_mut()
                    .flatten()
                    .for_each(Self::detach_prototypes);
            }
            _ => {}
        }
    }

    /// Новый элемент из прототипа в состоянии null-or-empty.
    pub(crate) fn instantiate(prototype: &Value) -> Value {
        let mut v = prototype.clone();
        v.reset_to_null_or_empty();
        v
    }
}

impl ColumnType {
    /// Создаёт пустое значение для колонки этого типа.
    ///
    /// С `widen_unsigned_types` UInt8/16/32 представлены знаковыми
    /// Int16/32/64; UInt64 всегда остаётся UInt64.
    pub fn new_value(
        &self,
        config: &DataConfig,
    ) -> Value {
        let widen = config.widen_unsigned_types;
        match self {
            ColumnType::Bool => Value::Bool(None),
            ColumnType::Int8 => Value::Int8(None),
            ColumnType::Int16 => Value::Int16(None),
            ColumnType::Int32 => Value::Int32(None),
            ColumnType::Int64 => Value::Int64(None),
            ColumnType::UInt8 if widen => Value::Int16(None),
            ColumnType::UInt8 => Value::UInt8(None),
            ColumnType::UInt16 if widen => Value::Int32(None),
            ColumnType::UInt16 => Value::UInt16(None),
            ColumnType::UInt32 if widen => Value::Int64(None),
            ColumnType::UInt32 => Value::UInt32(None),
            ColumnType::UInt64 => Value::UInt64(None),
            ColumnType::Float32 => Value::Float32(None),
            ColumnType::Float64 => Value::Float64(None),
            ColumnType::WideInt(kind) => Value::WideInt {
                value: None,
                kind: *kind,
            },
            ColumnType::Decimal { scale, .. } => Value::Decimal {
                value: None,
                scale: *scale,
            },
            ColumnType::String | ColumnType::FixedString(_) => Value::String {
                value: None,
                binary: config.use_binary_string,
            },
            ColumnType::Date | ColumnType::Date32 => Value::Date(None),
            ColumnType::DateTime {
                precision,
                timezone,
            } => Value::DateTime {
                value: None,
                scale: precision.unwrap_or(0),
                tz: timezone.clone().unwrap_or_default(),
            },
            ColumnType::Time { precision, .. } => Value::Time {
                value: None,
                scale: precision.unwrap_or(0),
            },
            ColumnType::Enum(def) => Value::Enum {
                value: None,
                def: Arc::clone(def),
            },
            ColumnType::Uuid => Value::Uuid(None),
            ColumnType::Ipv4 => Value::Ipv4(None),
            ColumnType::Ipv6 => Value::Ipv6(None),
            ColumnType::Array(elem) => Value::Array {
                items: Vec::new(),
                elem: Arc::new(elem.new_value(config)),
                primitive: !config.use_objects_in_array && elem.is_primitive(),
            },
            ColumnType::Map(k, v) => Value::Map {
                keys: Vec::new(),
                values: Vec::new(),
                key: Arc::new(k.new_value(config)),
                value: Arc::new(v.new_value(config)),
            },
            ColumnType::Tuple(fields) => Value::Tuple {
                fields: Vec::new(),
                types: fields
                    .iter()
                    .map(|f| f.column_type.new_value(config))
                    .collect(),
            },
            ColumnType::Nested(fields) => Value::Nested {
                rows: Vec::new(),
                fields: fields
                    .iter()
                    .map(|f| {
                        (
                            f.name.clone().unwrap_or_default(),
                            f.column_type.new_value(config),
                        )
                    })
                    .collect(),
            },
            ColumnType::Interval(_) | ColumnType::Geo(_) => self.layout().new_value(config),
            ColumnType::LowCardinality(inner) | ColumnType::Nullable(inner) => {
                inner.new_value(config)
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
