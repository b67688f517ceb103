use std::{fmt, str::FromStr, sync::Arc};

use chdata_error::{ColumnError, DataResult, StackError};

use super::{
    enum_def::{quote, EnumDef},
    parser,
    timezone::TimeZone,
};

/// Максимальная точность Decimal (Decimal256).
pub const MAX_DECIMAL_PRECISION: u32 = 76;
/// Масштаб не превышает точность.
pub const MAX_DECIMAL_SCALE: u32 = MAX_DECIMAL_PRECISION;
/// Максимальная точность DateTime64/Time64.
pub const MAX_TIME_PRECISION: u32 = 9;

/// Дескриптор типа колонки.
///
/// Неизменяем после разбора; контейнеры всегда хранят разрешённые
/// дочерние дескрипторы.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
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
    WideInt(WideInt),
    Decimal {
        precision: u32,
        scale: u32,
    },
    String,
    FixedString(usize),
    Date,
    Date32,
    /// `precision: None` соответствует DateTime (секунды в u32),
    /// `Some(p)` соответствует DateTime64(p).
    DateTime {
        precision: Option<u32>,
        timezone: Option<TimeZone>,
    },
    /// `precision: None` соответствует Time (секунды в i32),
    /// `Some(p)` соответствует Time64(p).
    Time {
        precision: Option<u32>,
        timezone: Option<TimeZone>,
    },
    Enum(Arc<EnumDef>),
    Uuid,
    Ipv4,
    Ipv6,
    /// Хранится как Int64.
    Interval(IntervalKind),
    /// Геометрия поверх Tuple(Float64, Float64) и массивов точек.
    Geo(GeoKind),
    Array(Box<ColumnType>),
    Map(Box<ColumnType>, Box<ColumnType>),
    Tuple(Vec<Field>),
    Nested(Vec<Field>),
    LowCardinality(Box<ColumnType>),
    Nullable(Box<ColumnType>),
}

/// Целые шире 64 бит.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WideInt {
    Int128,
    UInt128,
    Int256,
    UInt256,
}

/// Единица IntervalXxx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoKind {
    Point,
    Ring,
    LineString,
    Polygon,
    MultiLineString,
    MultiPolygon,
}

/// Поле Tuple/Nested: необязательное имя и тип.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Option<String>,
    pub column_type: ColumnType,
}

/// Именованная колонка результата.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ColumnType {
    /// Разбирает имя типа, например `LowCardinality(Nullable(String))`.
    pub fn parse(name: &str) -> DataResult<Self> {
        parser::parse_type(name)
    }

    /// Имя семейства без параметров.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::WideInt(kind) => kind.name(),
            Self::Decimal { .. } => "Decimal",
            Self::String => "String",
            Self::FixedString(_) => "FixedString",
            Self::Date => "Date",
            Self::Date32 => "Date32",
            Self::DateTime {
                precision: None, ..
            } => "DateTime",
            Self::DateTime { .. } => "DateTime64",
            Self::Time {
                precision: None, ..
            } => "Time",
            Self::Time { .. } => "Time64",
            Self::Enum(def) if def.bits() == 8 => "Enum8",
            Self::Enum(_) => "Enum16",
            Self::Uuid => "UUID",
            Self::Ipv4 => "IPv4",
            Self::Ipv6 => "IPv6",
            Self::Interval(kind) => kind.name(),
            Self::Geo(kind) => kind.name(),
            Self::Array(_) => "Array",
            Self::Map(..) => "Map",
            Self::Tuple(_) => "Tuple",
            Self::Nested(_) => "Nested",
            Self::LowCardinality(_) => "LowCardinality",
            Self::Nullable(_) => "Nullable",
        }
    }

    /// `true` для `Nullable(T)` и `LowCardinality(Nullable(T))`.
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Nullable(_) => true,
            Self::LowCardinality(inner) => inner.is_nullable(),
            _ => false,
        }
    }

    pub fn is_low_cardinality(&self) -> bool {
        matches!(self, Self::LowCardinality(_))
    }

    /// Тип без обёрток LowCardinality и Nullable.
    pub fn base(&self) -> &ColumnType {
        match self {
            Self::LowCardinality(inner) | Self::Nullable(inner) => inner.base(),
            other => other,
        }
    }

    /// Примитивы, для которых `as_array` может вернуть вектор без упаковки.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Float32
                | Self::Float64
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Array(_) | Self::Map(..) | Self::Tuple(_) | Self::Nested(_) | Self::Geo(_)
        )
    }

    /// Тип, которым значение представлено в памяти и на проводе. Для
    /// Interval это Int64, для геометрии Tuple и Array, для остальных
    /// сам тип.
    pub fn layout(&self) -> ColumnType {
        match self {
            Self::Interval(_) => Self::Int64,
            Self::Geo(kind) => kind.layout(),
            other => other.clone(),
        }
    }

    /// Типы, которые допускает LowCardinality (возможно под Nullable).
    pub fn supports_low_cardinality(&self) -> bool {
        let inner = match self {
            Self::Nullable(inner) => inner.as_ref(),
            other => other,
        };
        matches!(
            inner,
            Self::Bool
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::WideInt(_)
                | Self::Float32
                | Self::Float64
                | Self::Decimal { .. }
                | Self::String
                | Self::FixedString(_)
                | Self::Date
                | Self::Date32
                | Self::DateTime { .. }
                | Self::Time { .. }
                | Self::Uuid
                | Self::Ipv4
                | Self::Ipv6
        )
    }

    /// Масштаб дробной части для Decimal, DateTime64 и Time64.
    pub fn scale(&self) -> u32 {
        match self.base() {
            Self::Decimal { scale, .. } => *scale,
            Self::DateTime { precision, .. } | Self::Time { precision, .. } => {
                precision.unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Ширина мантиссы Decimal в байтах по точности.
pub fn decimal_width(precision: u32) -> usize {
    match precision {
        0..=9 => 4,
        10..=18 => 8,
        19..=38 => 16,
        _ => 32,
    }
}

impl WideInt {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int128 => "Int128",
            Self::UInt128 => "UInt128",
            Self::Int256 => "Int256",
            Self::UInt256 => "UInt256",
        }
    }

    /// Ширина на проводе в байтах.
    pub fn width(self) -> usize {
        match self {
            Self::Int128 | Self::UInt128 => 16,
            Self::Int256 | Self::UInt256 => 32,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::Int128 | Self::Int256)
    }
}

impl IntervalKind {
    pub const ALL: [IntervalKind; 11] = [
        Self::Nanosecond,
        Self::Microsecond,
        Self::Millisecond,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Nanosecond => "IntervalNanosecond",
            Self::Microsecond => "IntervalMicrosecond",
            Self::Millisecond => "IntervalMillisecond",
            Self::Second => "IntervalSecond",
            Self::Minute => "IntervalMinute",
            Self::Hour => "IntervalHour",
            Self::Day => "IntervalDay",
            Self::Week => "IntervalWeek",
            Self::Month => "IntervalMonth",
            Self::Quarter => "IntervalQuarter",
            Self::Year => "IntervalYear",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl GeoKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Ring => "Ring",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Point" => Self::Point,
            "Ring" => Self::Ring,
            "LineString" => Self::LineString,
            "Polygon" => Self::Polygon,
            "MultiLineString" => Self::MultiLineString,
            "MultiPolygon" => Self::MultiPolygon,
            _ => return None,
        };
        Some(kind)
    }

    /// Point = Tuple(Float64, Float64), Ring и LineString = Array(Point),
    /// Polygon и MultiLineString = Array(Ring), MultiPolygon = Array(Polygon).
    pub fn layout(self) -> ColumnType {
        let array = |kind: GeoKind| ColumnType::Array(Box::new(kind.layout()));
        match self {
            Self::Point => ColumnType::Tuple(vec![
                Field::unnamed(ColumnType::Float64),
                Field::unnamed(ColumnType::Float64),
            ]),
            Self::Ring | Self::LineString => array(Self::Point),
            Self::Polygon | Self::MultiLineString => array(Self::Ring),
            Self::MultiPolygon => array(Self::Polygon),
        }
    }
}

impl Field {
    pub fn new(
        name: Option<String>,
        column_type: ColumnType,
    ) -> Self {
        Self { name, column_type }
    }

    pub fn unnamed(column_type: ColumnType) -> Self {
        Self::new(None, column_type)
    }

    pub fn named(
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self::new(Some(name.into()), column_type)
    }
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Создаёт колонку из имени и имени типа.
    pub fn with_type_name(
        name: impl Into<String>,
        type_name: &str,
    ) -> DataResult<Self> {
        Ok(Self::new(name, ColumnType::parse(type_name)?))
    }

    /// Разбирает список колонок вида `a Int32, b Nullable(String)`.
    pub fn parse_list(list: &str) -> DataResult<Vec<Column>> {
        parser::split_args(list)?
            .into_iter()
            .map(|decl| {
                let field = parser::parse_field(decl)?;
                match field.name {
                    Some(name) => Ok(Column::new(name, field.column_type)),
                    None => Err(ColumnError::InvalidTypeName {
                        name: decl.to_string(),
                        reason: "column declaration must start with a name".to_string(),
                    }
                    .into()),
                }
            })
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl FromStr for ColumnType {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Decimal { precision, scale } => write!(f, "Decimal({precision}, {scale})"),
            Self::FixedString(n) => write!(f, "FixedString({n})"),
            Self::DateTime {
                precision,
                timezone,
            }
            | Self::Time {
                precision,
                timezone,
            } => {
                f.write_str(self.family())?;
                match (precision, timezone) {
                    (None, None) => Ok(()),
                    (None, Some(tz)) => write!(f, "({})", quote(tz.name())),
                    (Some(p), None) => write!(f, "({p})"),
                    (Some(p), Some(tz)) => write!(f, "({p}, {})", quote(tz.name())),
                }
            }
            Self::Enum(def) => write!(f, "{def}"),
            Self::Array(elem) => write!(f, "Array({elem})"),
            Self::Map(k, v) => write!(f, "Map({k}, {v})"),
            Self::Tuple(fields) | Self::Nested(fields) => {
                write!(f, "{}(", self.family())?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
            Self::LowCardinality(inner) => write!(f, "LowCardinality({inner})"),
            Self::Nullable(inner) => write!(f, "Nullable({inner})"),
            other => f.write_str(other.family()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", quote_identifier(name), self.column_type),
            None => write!(f, "{}", self.column_type),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} {}", quote_identifier(&self.name), self.column_type)
    }
}

/// Имя в обратных кавычках, если это не простой идентификатор.
fn quote_identifier(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}
