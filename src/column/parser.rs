//! Разбор имён типов колонок.
//!
//! Разбор чистый: без ввода-вывода и глобального состояния. Аргументы
//! разделяются запятыми на нулевой глубине скобок с учётом строк в
//! одинарных кавычках и имён в обратных кавычках.

use std::sync::Arc;

use chdata_error::{ColumnError, DataResult};

use super::{
    column_type::{
        ColumnType, Field, GeoKind, IntervalKind, WideInt, MAX_DECIMAL_PRECISION,
        MAX_TIME_PRECISION,
    },
    enum_def::EnumDef,
    timezone::TimeZone,
};

/// Разбирает имя типа целиком.
pub(crate) fn parse_type(name: &str) -> DataResult<ColumnType> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ColumnError::InvalidTypeName {
            name: String::new(),
            reason: "empty type name".to_string(),
        }
        .into());
    }
    check_balanced(name)?;

    let (family, args) = split_family(name)?;
    match args {
        None => parse_simple(name, family),
        Some(args) => parse_parametrized(name, family, args),
    }
}

/// Разбирает поле Tuple/Nested или объявление колонки: `[name] Type`.
pub(crate) fn parse_field(decl: &str) -> DataResult<Field> {
    let decl = decl.trim();

    if let Some(rest) = decl.strip_prefix('`') {
        let (name, after) = read_backticked(decl, rest)?;
        return Ok(Field::named(name, parse_type(after)?));
    }

    // Имя отделено первым пробелом, который стоит до любой скобки.
    let head_end = decl.find('(').unwrap_or(decl.len());
    if let Some(ws) = decl[..head_end].find(char::is_whitespace) {
        let (name, rest) = decl.split_at(ws);
        let rest = rest.trim_start();
        if !rest.is_empty() {
            return Ok(Field::named(name, parse_type(rest)?));
        }
    }

    Ok(Field::unnamed(parse_type(decl)?))
}

/// Делит список аргументов по запятым на нулевой глубине.
pub(crate) fn split_args(args: &str) -> DataResult<Vec<&str>> {
    let mut parts = Vec::new();
    if args.trim().is_empty() {
        return Ok(parts);
    }

    let mut depth = 0usize;
    let mut start = 0;
    let mut scanner = Scanner::new(args);
    while let Some((i, c)) = scanner.next_significant()? {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(args[start..].trim());

    if parts.iter().any(|p| p.is_empty()) {
        return Err(ColumnError::InvalidTypeName {
            name: args.to_string(),
            reason: "empty argument".to_string(),
        }
        .into());
    }
    Ok(parts)
}

////////////////////////////////////////////////////////////////////////////////
// Внутренние функции
////////////////////////////////////////////////////////////////////////////////

/// Посимвольный обход, пропускающий содержимое кавычек.
struct Scanner<'a> {
    src: &'a str,
    chars: std::str::CharIndices<'a>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices(),
        }
    }

    /// Следующий символ вне кавычек. Закрывающая кавычка возвращается как
    /// сам символ кавычки.
    fn next_significant(&mut self) -> DataResult<Option<(usize, char)>> {
        let Some((i, c)) = self.chars.next() else {
            return Ok(None);
        };
        match c {
            '\'' => {
                self.skip_quoted(i, '\'', true)?;
                Ok(Some((i, c)))
            }
            '`' => {
                self.skip_quoted(i, '`', false)?;
                Ok(Some((i, c)))
            }
            _ => Ok(Some((i, c))),
        }
    }

    fn skip_quoted(
        &mut self,
        open: usize,
        quote: char,
        backslash: bool,
    ) -> DataResult<()> {
        while let Some((_, c)) = self.chars.next() {
            if backslash && c == '\\' {
                self.chars.next();
            } else if c == quote {
                return Ok(());
            }
        }
        Err(ColumnError::Unbalanced {
            name: self.src.to_string(),
            position: open,
        }
        .into())
    }
}

fn check_balanced(name: &str) -> DataResult<()> {
    let mut depth = 0i64;
    let mut scanner = Scanner::new(name);
    while let Some((i, c)) = scanner.next_significant()? {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ColumnError::Unbalanced {
                        name: name.to_string(),
                        position: i,
                    }
                    .into());
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ColumnError::Unbalanced {
            name: name.to_string(),
            position: name.len(),
        }
        .into());
    }
    Ok(())
}

/// `Family(args)` -> (`Family`, Some(`args`)); `Family` -> (`Family`, None).
fn split_family(name: &str) -> DataResult<(&str, Option<&str>)> {
    match name.find('(') {
        None => Ok((name, None)),
        Some(open) => {
            if !name.ends_with(')') {
                return Err(ColumnError::InvalidTypeName {
                    name: name.to_string(),
                    reason: "unexpected characters after closing bracket".to_string(),
                }
                .into());
            }
            let family = name[..open].trim();
            if family.is_empty() {
                return Err(ColumnError::InvalidTypeName {
                    name: name.to_string(),
                    reason: "missing type family".to_string(),
                }
                .into());
            }
            Ok((family, Some(&name[open + 1..name.len() - 1])))
        }
    }
}

fn read_backticked<'a>(
    decl: &str,
    rest: &'a str,
) -> DataResult<(String, &'a str)> {
    let mut name = String::new();
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '`' {
            if matches!(chars.peek(), Some((_, '`'))) {
                chars.next();
                name.push('`');
                continue;
            }
            return Ok((name, &rest[i + 1..]));
        }
        name.push(c);
    }
    Err(ColumnError::Unbalanced {
        name: decl.to_string(),
        position: 0,
    }
    .into())
}

/// Типы без параметров и их SQL-синонимы.
fn parse_simple(
    name: &str,
    family: &str,
) -> DataResult<ColumnType> {
    let t = match family {
        "Bool" => ColumnType::Bool,
        "Int8" => ColumnType::Int8,
        "Int16" => ColumnType::Int16,
        "Int32" => ColumnType::Int32,
        "Int64" => ColumnType::Int64,
        "UInt8" => ColumnType::UInt8,
        "UInt16" => ColumnType::UInt16,
        "UInt32" => ColumnType::UInt32,
        "UInt64" => ColumnType::UInt64,
        "Int128" => ColumnType::WideInt(WideInt::Int128),
        "UInt128" => ColumnType::WideInt(WideInt::UInt128),
        "Int256" => ColumnType::WideInt(WideInt::Int256),
        "UInt256" => ColumnType::WideInt(WideInt::UInt256),
        "Float32" => ColumnType::Float32,
        "Float64" => ColumnType::Float64,
        "String" => ColumnType::String,
        "Date" => ColumnType::Date,
        "Date32" => ColumnType::Date32,
        "DateTime" | "DateTime32" => ColumnType::DateTime {
            precision: None,
            timezone: None,
        },
        "Time" => ColumnType::Time {
            precision: None,
            timezone: None,
        },
        "UUID" => ColumnType::Uuid,
        "IPv4" => ColumnType::Ipv4,
        "IPv6" => ColumnType::Ipv6,
        "Decimal" => ColumnType::Decimal {
            precision: 10,
            scale: 0,
        },
        other => {
            if let Some(kind) = IntervalKind::from_name(other) {
                ColumnType::Interval(kind)
            } else if let Some(kind) = GeoKind::from_name(other) {
                ColumnType::Geo(kind)
            } else {
                return parse_alias(name, other, None);
            }
        }
    };
    Ok(t)
}

/// SQL-синонимы (без учёта регистра).
fn parse_alias(
    name: &str,
    family: &str,
    args: Option<&str>,
) -> DataResult<ColumnType> {
    let upper = family.to_ascii_uppercase();
    let t = match upper.as_str() {
        "BOOL" | "BOOLEAN" => ColumnType::Bool,
        "TINYINT" | "INT1" | "BYTE" => ColumnType::Int8,
        "SMALLINT" | "INT2" => ColumnType::Int16,
        "INT" | "INT4" | "INTEGER" => ColumnType::Int32,
        "BIGINT" | "INT8" => ColumnType::Int64,
        "FLOAT" | "REAL" => ColumnType::Float32,
        "DOUBLE" => ColumnType::Float64,
        "TEXT" | "VARCHAR" | "CHAR" | "BLOB" | "LONGTEXT" | "MEDIUMTEXT" | "TINYTEXT" => {
            ColumnType::String
        }
        "BINARY" => match args {
            Some(args) => parse_fixed_string(name, args)?,
            None => ColumnType::String,
        },
        "DEC" | "NUMERIC" => match args {
            Some(args) => parse_decimal(name, args)?,
            None => parse_simple(name, "Decimal")?,
        },
        "TIMESTAMP" => ColumnType::DateTime {
            precision: None,
            timezone: None,
        },
        "INET4" => ColumnType::Ipv4,
        "INET6" => ColumnType::Ipv6,
        _ => {
            return Err(ColumnError::UnknownType {
                name: name.to_string(),
            }
            .into())
        }
    };
    Ok(t)
}

fn parse_parametrized(
    name: &str,
    family: &str,
    args: &str,
) -> DataResult<ColumnType> {
    match family {
        "LowCardinality" => {
            let inner = parse_type(single_arg(family, args)?)?;
            if inner.is_low_cardinality() {
                return Err(nesting("LowCardinality", &inner));
            }
            if let ColumnType::Nullable(n) = &inner {
                if n.is_low_cardinality() {
                    return Err(nesting("Nullable", n));
                }
            }
            if !inner.supports_low_cardinality() {
                return Err(nesting("LowCardinality", &inner));
            }
            Ok(ColumnType::LowCardinality(Box::new(inner)))
        }
        "Nullable" => {
            let inner = parse_type(single_arg(family, args)?)?;
            if matches!(
                inner,
                ColumnType::Nullable(_) | ColumnType::LowCardinality(_)
            ) || inner.is_container()
            {
                return Err(nesting("Nullable", &inner));
            }
            Ok(ColumnType::Nullable(Box::new(inner)))
        }
        "Array" => {
            let parts = split_args(args)?;
            if parts.len() != 1 {
                return Err(ColumnError::invalid_arguments(
                    name,
                    "Array can have one and only one nested column",
                )
                .into());
            }
            Ok(ColumnType::Array(Box::new(parse_type(parts[0])?)))
        }
        "Map" => {
            let parts = split_args(args)?;
            if parts.len() != 2 {
                return Err(
                    ColumnError::invalid_arguments(name, "Map should have two nested columns")
                        .into(),
                );
            }
            Ok(ColumnType::Map(
                Box::new(parse_type(parts[0])?),
                Box::new(parse_type(parts[1])?),
            ))
        }
        "Tuple" => {
            let fields = parse_fields(args)?;
            if fields.is_empty() {
                return Err(ColumnError::invalid_arguments(
                    name,
                    "Tuple should have at least one nested column",
                )
                .into());
            }
            Ok(ColumnType::Tuple(fields))
        }
        "Nested" => {
            let fields = parse_fields(args)?;
            if fields.is_empty() {
                return Err(ColumnError::invalid_arguments(
                    name,
                    "Nested should have at least one nested column",
                )
                .into());
            }
            if fields.iter().any(|f| f.name.is_none()) {
                return Err(
                    ColumnError::invalid_arguments(name, "Nested columns must be named").into(),
                );
            }
            Ok(ColumnType::Nested(fields))
        }
        "SimpleAggregateFunction" => {
            let parts = split_args(args)?;
            if parts.len() != 2 {
                return Err(ColumnError::invalid_arguments(
                    name,
                    "SimpleAggregateFunction should have a function and a type",
                )
                .into());
            }
            parse_type(parts[1])
        }
        "Decimal" => parse_decimal(name, args),
        "Decimal32" => parse_fixed_decimal(name, args, 9),
        "Decimal64" => parse_fixed_decimal(name, args, 18),
        "Decimal128" => parse_fixed_decimal(name, args, 38),
        "Decimal256" => parse_fixed_decimal(name, args, 76),
        "DateTime" | "DateTime32" => {
            let parts = split_args(args)?;
            match parts.as_slice() {
                [] => Ok(ColumnType::DateTime {
                    precision: None,
                    timezone: None,
                }),
                [tz] => Ok(ColumnType::DateTime {
                    precision: None,
                    timezone: Some(parse_timezone(name, tz)?),
                }),
                _ => Err(ColumnError::invalid_arguments(
                    name,
                    "DateTime expects an optional timezone",
                )
                .into()),
            }
        }
        "DateTime64" => {
            let (precision, timezone) = parse_precision_and_zone(name, args)?;
            Ok(ColumnType::DateTime {
                precision: Some(precision),
                timezone,
            })
        }
        "Time" => {
            let parts = split_args(args)?;
            match parts.as_slice() {
                [] => Ok(ColumnType::Time {
                    precision: None,
                    timezone: None,
                }),
                [tz] => Ok(ColumnType::Time {
                    precision: None,
                    timezone: Some(parse_timezone(name, tz)?),
                }),
                _ => {
                    Err(ColumnError::invalid_arguments(name, "Time expects an optional timezone")
                        .into())
                }
            }
        }
        "Time64" => {
            let (precision, timezone) = parse_precision_and_zone(name, args)?;
            Ok(ColumnType::Time {
                precision: Some(precision),
                timezone,
            })
        }
        "FixedString" => parse_fixed_string(name, args),
        "Enum8" => Ok(ColumnType::Enum(Arc::new(EnumDef::new(8, parse_enum_entries(name, args)?)?))),
        "Enum16" => Ok(ColumnType::Enum(Arc::new(EnumDef::new(
            16,
            parse_enum_entries(name, args)?,
        )?))),
        "Enum" => Ok(ColumnType::Enum(Arc::new(EnumDef::auto(parse_enum_entries(
            name, args,
        )?)?))),
        other => parse_alias(name, other, Some(args)),
    }
}

fn nesting(
    outer: &str,
    inner: &ColumnType,
) -> chdata_error::StackError {
    ColumnError::InvalidNesting {
        outer: outer.to_string(),
        inner: inner.family().to_string(),
    }
    .into()
}

fn single_arg<'a>(
    family: &str,
    args: &'a str,
) -> DataResult<&'a str> {
    let parts = split_args(args)?;
    match parts.as_slice() {
        [one] => Ok(one),
        _ => Err(ColumnError::invalid_arguments(
            family,
            format!("{family} should have exactly one nested column"),
        )
        .into()),
    }
}

fn parse_fields(args: &str) -> DataResult<Vec<Field>> {
    split_args(args)?.into_iter().map(parse_field).collect()
}

fn parse_number<T: std::str::FromStr>(
    name: &str,
    arg: &str,
    what: &str,
) -> DataResult<T> {
    arg.trim().parse::<T>().map_err(|_| {
        ColumnError::invalid_arguments(name, format!("Invalid {what}: '{}'", arg.trim())).into()
    })
}

fn parse_decimal(
    name: &str,
    args: &str,
) -> DataResult<ColumnType> {
    let parts = split_args(args)?;
    let (precision, scale) = match parts.as_slice() {
        [p] => (parse_number::<u32>(name, p, "precision")?, 0),
        [p, s] => (
            parse_number::<u32>(name, p, "precision")?,
            parse_number::<u32>(name, s, "scale")?,
        ),
        _ => {
            return Err(ColumnError::invalid_arguments(
                name,
                "Decimal expects precision and optional scale",
            )
            .into())
        }
    };
    decimal(name, precision, scale)
}

fn parse_fixed_decimal(
    name: &str,
    args: &str,
    precision: u32,
) -> DataResult<ColumnType> {
    let scale = parse_number::<u32>(name, single_arg(name, args)?, "scale")?;
    decimal(name, precision, scale)
}

fn decimal(
    name: &str,
    precision: u32,
    scale: u32,
) -> DataResult<ColumnType> {
    if precision == 0 || precision > MAX_DECIMAL_PRECISION {
        return Err(ColumnError::invalid_arguments(
            name,
            format!("Decimal precision {precision} is out of range 1..={MAX_DECIMAL_PRECISION}"),
        )
        .into());
    }
    if scale > precision {
        return Err(ColumnError::invalid_arguments(
            name,
            format!("Decimal scale {scale} exceeds precision {precision}"),
        )
        .into());
    }
    Ok(ColumnType::Decimal { precision, scale })
}

fn parse_precision_and_zone(
    name: &str,
    args: &str,
) -> DataResult<(u32, Option<TimeZone>)> {
    let parts = split_args(args)?;
    let (precision, timezone) = match parts.as_slice() {
        [p] => (parse_number::<u32>(name, p, "precision")?, None),
        [p, tz] => (
            parse_number::<u32>(name, p, "precision")?,
            Some(parse_timezone(name, tz)?),
        ),
        _ => {
            return Err(ColumnError::invalid_arguments(
                name,
                "expected precision and optional timezone",
            )
            .into())
        }
    };
    if precision > MAX_TIME_PRECISION {
        return Err(ColumnError::invalid_arguments(
            name,
            format!("Precision {precision} exceeds {MAX_TIME_PRECISION}"),
        )
        .into());
    }
    Ok((precision, timezone))
}

fn parse_timezone(
    name: &str,
    arg: &str,
) -> DataResult<TimeZone> {
    Ok(TimeZone::parse(&unquote(name, arg)?))
}

fn parse_fixed_string(
    name: &str,
    args: &str,
) -> DataResult<ColumnType> {
    let n = parse_number::<usize>(name, single_arg(name, args)?, "length")?;
    if n == 0 {
        return Err(
            ColumnError::invalid_arguments(name, "FixedString length must be positive").into(),
        );
    }
    Ok(ColumnType::FixedString(n))
}

/// Разбирает `'a' = 1, 'b' = 2`. Без `=` код продолжает предыдущий
/// (начиная с 1).
fn parse_enum_entries(
    name: &str,
    args: &str,
) -> DataResult<Vec<(String, i16)>> {
    let mut entries = Vec::new();
    let mut next_code: i32 = 1;
    for part in split_args(args)? {
        let (label, code) = match find_closing_quote(part) {
            Some(end) => {
                let label = unquote(name, &part[..=end])?;
                let rest = part[end + 1..].trim();
                match rest.strip_prefix('=') {
                    Some(code) => (label, parse_number::<i32>(name, code, "enum code")?),
                    None if rest.is_empty() => (label, next_code),
                    None => {
                        return Err(ColumnError::invalid_arguments(
                            name,
                            format!("Invalid enum entry: {part}"),
                        )
                        .into())
                    }
                }
            }
            None => {
                return Err(ColumnError::invalid_arguments(
                    name,
                    format!("Enum name must be quoted: {part}"),
                )
                .into())
            }
        };
        let code = i16::try_from(code).map_err(|_| {
            ColumnError::invalid_arguments(name, format!("Enum code {code} is out of Int16 range"))
        })?;
        next_code = code as i32 + 1;
        entries.push((label, code));
    }
    Ok(entries)
}

/// Индекс закрывающей кавычки строки, начинающейся с `'`.
fn find_closing_quote(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, '\'')) => {}
        _ => return None,
    }
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\'' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Снимает одинарные кавычки и экранирование.
fn unquote(
    name: &str,
    arg: &str,
) -> DataResult<String> {
    let arg = arg.trim();
    let inner = arg
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .filter(|_| arg.len() >= 2)
        .ok_or_else(|| {
            ColumnError::invalid_arguments(name, format!("Expected quoted string, got {arg}"))
        })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chdata_error::StatusCode;
    use rstest::rstest;

    use super::*;

    /// Тест проверяет, что каноническое имя разбирается в равный дескриптор.
    #[rstest]
    #[case("Bool")]
    #[case("UInt64")]
    #[case("Int128")]
    #[case("UInt256")]
    #[case("Decimal(18, 4)")]
    #[case("Decimal(76, 30)")]
    #[case("FixedString(16)")]
    #[case("Date32")]
    #[case("DateTime")]
    #[case("DateTime('Europe/Moscow')")]
    #[case("DateTime64(3)")]
    #[case("DateTime64(9, 'UTC')")]
    #[case("Time")]
    #[case("Time64(6)")]
    #[case("Enum8('a' = 1, 'it\\'s' = -3)")]
    #[case("Enum16('big' = 1000)")]
    #[case("UUID")]
    #[case("IPv6")]
    #[case("IntervalSecond")]
    #[case("IntervalYear")]
    #[case("Point")]
    #[case("MultiPolygon")]
    #[case("Array(Array(UInt8))")]
    #[case("Map(String, Array(Nullable(Int32)))")]
    #[case("Tuple(Int8, String)")]
    #[case("Tuple(a Int8, `b c` Nullable(String))")]
    #[case("Nested(id UInt32, tags Array(String))")]
    #[case("LowCardinality(Nullable(String))")]
    fn test_canonical_roundtrip(#[case] name: &str) {
        let parsed = ColumnType::parse(name).unwrap();
        assert_eq!(parsed.to_string(), name);
        assert_eq!(ColumnType::parse(&parsed.to_string()).unwrap(), parsed);
    }

    #[rstest]
    #[case("BOOLEAN", ColumnType::Bool)]
    #[case("tinyint", ColumnType::Int8)]
    #[case("INTEGER", ColumnType::Int32)]
    #[case("BIGINT", ColumnType::Int64)]
    #[case("REAL", ColumnType::Float32)]
    #[case("DOUBLE", ColumnType::Float64)]
    #[case("VARCHAR(255)", ColumnType::String)]
    #[case("BINARY(4)", ColumnType::FixedString(4))]
    #[case("INET4", ColumnType::Ipv4)]
    #[case("Decimal32(2)", ColumnType::Decimal { precision: 9, scale: 2 })]
    #[case("Decimal128(10)", ColumnType::Decimal { precision: 38, scale: 10 })]
    #[case("Decimal256(20)", ColumnType::Decimal { precision: 76, scale: 20 })]
    #[case("Int256", ColumnType::WideInt(WideInt::Int256))]
    #[case("IntervalMillisecond", ColumnType::Interval(IntervalKind::Millisecond))]
    #[case("Ring", ColumnType::Geo(GeoKind::Ring))]
    #[case("NUMERIC(10, 2)", ColumnType::Decimal { precision: 10, scale: 2 })]
    #[case("DateTime32", ColumnType::DateTime { precision: None, timezone: None })]
    #[case("SimpleAggregateFunction(sum, UInt64)", ColumnType::UInt64)]
    fn test_aliases(
        #[case] name: &str,
        #[case] expected: ColumnType,
    ) {
        assert_eq!(ColumnType::parse(name).unwrap(), expected, "name: {name}");
    }

    /// Тест проверяет сообщения об ошибках арности.
    #[rstest]
    #[case("Array(Int8, Int16)", "Array can have one and only one nested column")]
    #[case("Array()", "Array can have one and only one nested column")]
    #[case("Map(String)", "Map should have two nested columns")]
    #[case("Tuple()", "Tuple should have at least one nested column")]
    #[case("Nested()", "Nested should have at least one nested column")]
    fn test_arity_errors(
        #[case] name: &str,
        #[case] message: &str,
    ) {
        let err = ColumnType::parse(name).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidTypeName);
        assert!(err.to_string().contains(message), "got: {err}");
    }

    /// Тест проверяет правила вложенности обёрток.
    #[rstest]
    #[case("Nullable(LowCardinality(String))")]
    #[case("Nullable(Nullable(Int8))")]
    #[case("LowCardinality(LowCardinality(String))")]
    #[case("Nullable(Array(Int8))")]
    #[case("LowCardinality(Array(String))")]
    #[case("LowCardinality(Map(String, String))")]
    fn test_invalid_nesting(#[case] name: &str) {
        let err = ColumnType::parse(name).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidTypeName);
        assert!(err.to_string().contains("cannot wrap"), "got: {err}");
    }

    #[rstest]
    #[case("")]
    #[case("Int7")]
    #[case("Int512")]
    #[case("IntervalFortnight")]
    #[case("Decimal256(77)")]
    #[case("Decimal(77, 2)")]
    #[case("Decimal(5, 6)")]
    #[case("DateTime64(10)")]
    #[case("FixedString(0)")]
    #[case("FixedString(x)")]
    #[case("Array(Int8")]
    #[case("Array(Int8))")]
    #[case("Enum8('a = 1)")]
    #[case("Enum8(a = 1)")]
    #[case("Enum8('a' = 300)")]
    #[case("Nested(Int8)")]
    #[case("Tuple(Int8,)")]
    fn test_malformed(#[case] name: &str) {
        let err = ColumnType::parse(name).unwrap_err();
        assert_eq!(
            err.status_code(),
            StatusCode::InvalidTypeName,
            "name: {name}, got: {err}"
        );
    }

    /// Тест проверяет, что запятые внутри кавычек и скобок не делят аргументы.
    #[test]
    fn test_split_args_respects_quotes() {
        let parts = split_args("'a,b' = 1, Map(String, Int8), `x,y` UInt8").unwrap();
        assert_eq!(parts, vec!["'a,b' = 1", "Map(String, Int8)", "`x,y` UInt8"]);
    }

    #[test]
    fn test_enum_widths_and_implicit_codes() {
        let t = ColumnType::parse("Enum('a', 'b', 'c' = 10, 'd')").unwrap();
        let ColumnType::Enum(def) = t else {
            panic!("expected enum");
        };
        assert_eq!(def.bits(), 8);
        assert_eq!(def.code_of("b"), Some(2));
        assert_eq!(def.code_of("d"), Some(11));

        let t = ColumnType::parse("Enum('a' = -200)").unwrap();
        assert_eq!(t.family(), "Enum16");
    }

    #[test]
    fn test_timezone_offsets() {
        let t = ColumnType::parse("DateTime64(3, '+05:30')").unwrap();
        let ColumnType::DateTime {
            timezone: Some(tz),
            ..
        } = t
        else {
            panic!("expected timezone");
        };
        assert_eq!(tz.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn test_parse_field_and_column_list() {
        let field = parse_field("`weird ``name``` Nullable(UInt8)").unwrap();
        assert_eq!(field.name.as_deref(), Some("weird `name`"));

        let cols = super::super::Column::parse_list("a Int32, b LowCardinality(String)").unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[1].name, "b");
        assert!(cols[1].column_type.is_low_cardinality());

        assert!(super::super::Column::parse_list("Int32").is_err());
    }
}
