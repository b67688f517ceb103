//! Контракт преобразований типизированных значений.

use std::str::FromStr;

use chdata::{BigDecimal, ColumnType, DataConfig, Object, StatusCode, UInt64, UInt8, Value};
use num_bigint::BigInt;
use rstest::rstest;

fn value_of(name: &str) -> Value {
    ColumnType::parse(name)
        .unwrap()
        .new_value(&DataConfig::default())
}

fn updated(
    name: &str,
    source: impl Into<Object>,
) -> Value {
    let mut value = value_of(name);
    value.update(source).unwrap();
    value
}

/// Тест проверяет согласованность сужающих проекций.
#[test]
fn test_narrowing_consistency() {
    let v = Value::UInt8(Some(UInt8::from_unsigned(255)));
    assert_eq!(v.as_i8().unwrap(), -1);
    assert_eq!(v.as_i16().unwrap(), 255);
    assert_eq!(v.as_i32().unwrap(), 255);
    assert_eq!(v.as_big_integer().unwrap(), Some(BigInt::from(255)));

    let max = Value::UInt64(Some(UInt64::MAX_VALUE));
    assert_eq!(max.as_i64().unwrap(), -1);
    assert_eq!(
        max.as_big_integer().unwrap(),
        Some(BigInt::from(u64::MAX))
    );
}

/// Тест проверяет, что null даёт ноль в числах и `None` в остальном.
#[rstest]
#[case("Int8")]
#[case("UInt32")]
#[case("Float64")]
#[case("Decimal(18, 4)")]
#[case("Nullable(UInt64)")]
fn test_null_propagation(#[case] name: &str) {
    let v = value_of(name);
    assert!(v.is_null());
    assert_eq!(v.as_i8().unwrap(), 0);
    assert_eq!(v.as_i64().unwrap(), 0);
    assert_eq!(v.as_f32().unwrap(), 0.0);
    assert_eq!(v.as_f64().unwrap(), 0.0);
    assert!(!v.as_bool().unwrap());
    assert_eq!(v.as_big_integer().unwrap(), None);
    assert_eq!(v.as_big_decimal(2).unwrap(), None);
    assert_eq!(v.as_string(), None);
}

#[rstest]
#[case(0, Some(false))]
#[case(1, Some(true))]
#[case(2, None)]
#[case(-1, None)]
fn test_boolean_domain(
    #[case] input: i8,
    #[case] expected: Option<bool>,
) {
    let result = Value::Int8(Some(input)).as_bool();
    match expected {
        Some(b) => assert_eq!(result.unwrap(), b),
        None => assert_eq!(result.unwrap_err().status_code(), StatusCode::InvalidBoolean),
    }
}

/// Тест проверяет, что целые трактуются как доли при масштабе.
#[test]
fn test_decimal_scale() {
    let one = Value::Int32(Some(1));
    assert_eq!(
        one.as_big_decimal(5).unwrap(),
        Some(BigDecimal::from_str("0.00001").unwrap())
    );
    assert_eq!(
        one.as_big_decimal(0).unwrap(),
        Some(BigDecimal::from_str("1").unwrap())
    );

    let d = Value::Decimal {
        value: Some(BigDecimal::from_str("12.3456").unwrap()),
        scale: 4,
    };
    assert_eq!(
        d.as_big_decimal(2).unwrap(),
        Some(BigDecimal::from_str("12.34").unwrap())
    );
    assert_eq!(
        d.as_big_decimal(77).unwrap_err().status_code(),
        StatusCode::OutOfRange
    );
}

#[rstest]
#[case("Int32", "123", 123)]
#[case("Int32", " 42", 42)]
#[case("UInt8", "255", 255)]
#[case("Float64", "2.9", 2)]
fn test_string_sources(
    #[case] target: &str,
    #[case] text: &str,
    #[case] expected: i64,
) {
    let v = updated(target, text);
    assert_eq!(v.as_i64().unwrap(), expected);
}

#[test]
fn test_string_parse_errors() {
    let err = Value::string("abc").as_i32().unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidNumber);

    let mut v = value_of("UInt8");
    let err = v.update("-1").unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidNumber);
}

/// Тест проверяет отказ контейнеров в скалярных проекциях.
#[test]
fn test_container_projections() {
    let array = updated("Array(Int8)", vec![Object::I8(1), Object::I8(2)]);
    assert_eq!(
        array.as_i32().unwrap_err().status_code(),
        StatusCode::TypeError
    );
    assert_eq!(array.as_string().unwrap(), "[1,2]");
    assert_eq!(array.to_sql_expression(), "[1,2]");
}

#[test]
fn test_enum_names_and_codes() {
    let mut e = value_of("Enum8('a' = 1, 'b' = 2)");
    e.update("b").unwrap();
    assert_eq!(e.as_string().unwrap(), "b");
    assert_eq!(e.as_i32().unwrap(), 2);
    assert_eq!(e.to_sql_expression(), "2");

    let err = e.update(5i8).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidEnum);
}

/// Тест проверяет отображение DateTime в часовом поясе колонки.
#[test]
fn test_date_time_in_column_zone() {
    let mut utc = value_of("DateTime64(3, 'UTC')");
    utc.update("2024-03-01 12:30:45.123").unwrap();
    assert_eq!(utc.as_string().unwrap(), "2024-03-01 12:30:45.123");

    let mut shifted = value_of("DateTime64(3, '+03:00')");
    shifted.update_value(&utc).unwrap();
    assert_eq!(shifted.as_string().unwrap(), "2024-03-01 15:30:45.123");
    assert_eq!(
        shifted.as_offset_date_time().unwrap(),
        utc.as_offset_date_time().unwrap()
    );
}

#[test]
fn test_reset_and_copy() {
    let mut v = updated("Tuple(Int8, String)", Object::Tuple(vec![Object::I8(7), Object::from("x")]));
    let copy = v.copy(true);
    v.reset_to_default();
    assert_eq!(v.to_sql_expression(), "(0,'')");
    assert_eq!(copy.to_sql_expression(), "(7,'x')");

    v.reset_to_null_or_empty();
    assert!(v.is_null_or_empty());
}

#[test]
fn test_binary_strings() {
    let config = DataConfig::builder().use_binary_string(true).build().unwrap();
    let mut v = ColumnType::parse("String").unwrap().new_value(&config);
    v.update(vec![0xFFu8, 0x00]).unwrap();
    assert!(v.is_binary());
    assert_eq!(v.as_object(), Object::Bytes(vec![0xFF, 0x00]));
}
