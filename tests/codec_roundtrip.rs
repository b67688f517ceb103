//! Круговые проверки кодека RowBinary: построчно и блоком колонки, в
//! простой форме типа и под LowCardinality.

use std::io::Cursor;

use chdata::{ColumnType, DataConfig, DataProcessor, Deserializer, Serializer, StatusCode, Value};
use rstest::rstest;

fn processor(name: &str) -> (Deserializer, Serializer) {
    let column_type = ColumnType::parse(name).unwrap();
    DataProcessor::for_column(&DataConfig::default(), &column_type).unwrap()
}

fn values_from_text(
    de: &Deserializer,
    texts: &[&str],
) -> Vec<Value> {
    texts
        .iter()
        .map(|text| {
            let mut v = de.new_value();
            v.update(*text).unwrap();
            v
        })
        .collect()
}

/// Пишет значения построчно, читает обратно и сверяет значения и байты.
fn assert_row_round_trip(
    name: &str,
    values: &[Value],
) -> Vec<u8> {
    let (de, ser) = processor(name);
    let mut bytes = Vec::new();
    for v in values {
        ser.serialize(v, &mut bytes).unwrap();
    }

    let mut input = Cursor::new(bytes.clone());
    let mut decoded = Vec::new();
    let mut slot = de.new_value();
    for _ in values {
        decoded.push(de.deserialize(&mut slot, &mut input).unwrap().clone());
    }
    assert_eq!(input.position() as usize, bytes.len(), "{name}: trailing bytes");
    assert_eq!(decoded, values, "{name}");

    let mut again = Vec::new();
    for v in &decoded {
        ser.serialize(v, &mut again).unwrap();
    }
    assert_eq!(again, bytes, "{name}: re-encoded bytes differ");
    bytes
}

#[rstest]
#[case("Bool", &["true", "false"])]
#[case("Int8", &["-128", "0", "127"])]
#[case("Int16", &["-32768", "32767"])]
#[case("Int32", &["-2147483648", "2147483647"])]
#[case("Int64", &["-9223372036854775808", "9223372036854775807"])]
#[case("UInt8", &["0", "255"])]
#[case("UInt16", &["65535"])]
#[case("UInt32", &["4294967295"])]
#[case("UInt64", &["18446744073709551615", "1"])]
#[case("Float32", &["1.5", "-0.25"])]
#[case("Float64", &["3.141592653589793", "-1e300"])]
#[case("Decimal(9, 2)", &["123.45", "-0.01"])]
#[case("Decimal(18, 6)", &["123456789012.345678"])]
#[case("Decimal(38, 10)", &["-1.0000000001"])]
#[case("Decimal(38, 2)", &["-123456789012345678901234567890123456.78"])]
#[case("Decimal256(20)", &["12345678901234567890123456789012345678901234567890.5"])]
#[case("Int128", &["-170141183460469231731687303715884105728", "1"])]
#[case("UInt128", &["340282366920938463463374607431768211455"])]
#[case("Int256", &["-1", "99999999999999999999999999999999999999999"])]
#[case("UInt256", &["0", "115792089237316195423570985008687907853269984665640564039457584007913129639935"])]
#[case("String", &["", "hello", "строка"])]
#[case("FixedString(4)", &["abcd"])]
#[case("Date", &["1970-01-01", "2024-02-29"])]
#[case("Date32", &["1900-01-01", "2299-12-31"])]
#[case("DateTime('UTC')", &["2024-02-29 23:59:59"])]
#[case("DateTime64(6, 'UTC')", &["2024-02-29 23:59:59.123456"])]
#[case("Time", &["12:34:56", "-01:00:00"])]
#[case("Time64(3)", &["01:02:03.25"])]
#[case("UUID", &["123e4567-e89b-12d3-a456-426614174000"])]
#[case("IPv4", &["192.168.0.1"])]
#[case("IPv6", &["2001:db8::1"])]
fn test_scalar_round_trip(
    #[case] name: &str,
    #[case] texts: &[&str],
) {
    let (de, _) = processor(name);
    let values = values_from_text(&de, texts);
    let plain = assert_row_round_trip(name, &values);

    // построчно LowCardinality прозрачен: те же байты и те же значения
    let lc_name = format!("LowCardinality({name})");
    let lc = assert_row_round_trip(&lc_name, &values);
    assert_eq!(plain, lc);

    let nullable = format!("Nullable({name})");
    let (de, _) = processor(&nullable);
    let mut with_null = values_from_text(&de, texts);
    with_null.push(de.new_value());
    assert_row_round_trip(&nullable, &with_null);
}

#[test]
fn test_enum_round_trip() {
    let name = "Enum8('a' = 1, 'b' = -2)";
    let (de, _) = processor(name);
    let values = values_from_text(&de, &["b", "a"]);
    assert_eq!(assert_row_round_trip(name, &values), vec![0xFE, 1]);

    let name = "Enum16('big' = 1000)";
    let (de, _) = processor(name);
    let values = values_from_text(&de, &["big"]);
    assert_eq!(assert_row_round_trip(name, &values), vec![0xE8, 0x03]);
}

/// Тест проверяет составные типы и их вложенность.
#[rstest]
#[case("Array(Array(UInt8))", "[[1,2],[2,1]]")]
#[case("Array(Nullable(Int32))", "[1,NULL,3]")]
#[case("Map(String, Array(Int8))", "{'a' : [1],'b' : []}")]
#[case("Tuple(Int8, String, Nullable(Float64))", "(1,'x',NULL)")]
#[case("Array(Tuple(UInt16, LowCardinality(String)))", "[(1,'a'),(2,'b')]")]
#[case("Nested(n1 UInt8, n2 Nullable(String), n3 Tuple(x Int16))", "[1,'a',(0)],[0,'b',(1)]")]
#[case("Point", "(1.0,-0.5)")]
fn test_composite_round_trip(
    #[case] name: &str,
    #[case] sql: &str,
) {
    let (de, ser) = processor(name);
    let mut sample = de.new_value();
    de.deserialize(&mut sample, &mut Cursor::new(encode_sample(name)))
        .unwrap();
    assert_eq!(sample.to_sql_expression(), sql);

    let mut bytes = Vec::new();
    ser.serialize(&sample, &mut bytes).unwrap();
    assert_eq!(bytes, encode_sample(name));
}

/// Ручная раскладка образцов для составных типов.
fn encode_sample(name: &str) -> Vec<u8> {
    match name {
        "Array(Array(UInt8))" => vec![2, 2, 1, 2, 2, 2, 1],
        "Array(Nullable(Int32))" => vec![3, 0, 1, 0, 0, 0, 1, 0, 3, 0, 0, 0],
        "Map(String, Array(Int8))" => vec![2, 1, b'a', 1, b'b', 1, 1, 0],
        "Tuple(Int8, String, Nullable(Float64))" => vec![1, 1, b'x', 1],
        "Array(Tuple(UInt16, LowCardinality(String)))" => {
            vec![2, 1, 0, 1, b'a', 2, 0, 1, b'b']
        }
        // число строк, затем поля каждой строки
        "Nested(n1 UInt8, n2 Nullable(String), n3 Tuple(x Int16))" => {
            vec![2, 1, 0, 1, b'a', 0, 0, 0, 0, 1, b'b', 1, 0]
        }
        "Point" => [1.0f64.to_le_bytes(), (-0.5f64).to_le_bytes()].concat(),
        other => panic!("no sample for {other}"),
    }
}

/// Тест проверяет, что float пишется в целую колонку младшими битами.
#[rstest]
#[case("Int8", 300.0, &[44])]
#[case("Int16", 70000.0, &[0x70, 0x11])]
#[case("UInt8", 255.9, &[0xFF])]
#[case("Int32", -1e10, &[0x00, 0x00, 0x00, 0x80])]
#[case("Int64", 1e19, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F])]
fn test_float_to_integer_bytes(
    #[case] name: &str,
    #[case] f: f64,
    #[case] expected: &[u8],
) {
    let (_, ser) = processor(name);
    let mut bytes = Vec::new();
    ser.serialize(&Value::Float64(Some(f)), &mut bytes).unwrap();
    assert_eq!(bytes, expected);
}

/// Тест проверяет мантиссу Decimal128 шире 96 бит на уровне байт.
#[test]
fn test_wide_decimal_bytes() {
    let name = "Decimal(38, 0)";
    let (de, ser) = processor(name);
    let bytes = 10i128.pow(30).to_le_bytes();

    let mut value = de.new_value();
    de.deserialize(&mut value, &mut Cursor::new(&bytes)).unwrap();
    assert_eq!(value.as_string().unwrap(), "1000000000000000000000000000000");

    let mut again = Vec::new();
    ser.serialize(&value, &mut again).unwrap();
    assert_eq!(again, bytes);
}

/// Тест проверяет, что Interval хранится как Int64.
#[test]
fn test_interval_bytes() {
    let (de, ser) = processor("IntervalDay");
    let mut value = de.new_value();
    value.update(-3i64).unwrap();
    let mut bytes = Vec::new();
    ser.serialize(&value, &mut bytes).unwrap();
    assert_eq!(bytes, (-3i64).to_le_bytes());
}

/// Тест проверяет словарную раскладку блока колонки.
#[rstest]
#[case("LowCardinality(String)", &["x", "y", "x", "x", "z"], 3)]
#[case("LowCardinality(UInt64)", &["1", "1", "1"], 1)]
#[case("LowCardinality(Date)", &["2024-01-01", "2024-01-02"], 2)]
fn test_column_block_round_trip(
    #[case] name: &str,
    #[case] texts: &[&str],
    #[case] distinct: u8,
) {
    let (de, ser) = processor(name);
    let values = values_from_text(&de, texts);

    let mut bytes = Vec::new();
    ser.serialize_column(&values, &mut bytes).unwrap();
    assert_eq!(bytes[0], distinct);

    let decoded = de
        .deserialize_column(values.len(), &mut Cursor::new(&bytes))
        .unwrap();
    assert_eq!(decoded, values);

    // ключи идут одним байтом в конце блока
    let keys = &bytes[bytes.len() - values.len()..];
    assert!(keys.iter().all(|k| *k < distinct));
}

#[test]
fn test_truncated_input_is_rejected() {
    let (de, ser) = processor("Tuple(String, Int64)");
    let mut sample = de.new_value();
    sample
        .update(chdata::Object::Tuple(vec!["abc".into(), 7i64.into()]))
        .unwrap();
    let mut bytes = Vec::new();
    ser.serialize(&sample, &mut bytes).unwrap();

    for cut in 0..bytes.len() {
        let mut slot = de.new_value();
        let err = de
            .deserialize(&mut slot, &mut Cursor::new(&bytes[..cut]))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UnexpectedEof, "cut at {cut}");
    }
}

#[test]
fn test_overlong_varint_is_corrupted() {
    let (de, _) = processor("String");
    let mut slot = de.new_value();
    let err = de
        .deserialize(&mut slot, &mut Cursor::new(vec![0xFF; 11]))
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CorruptedData);
}
