//! Property-based tests для кодека RowBinary
//!
//! Тесты генерируют случайные значения каждого поддерживаемого типа и
//! проверяют, что запись и чтение дают то же значение и те же байты.

use std::io::Cursor;

use chdata::{
    stream::{read_varint, varint_size, write_varint},
    ColumnType, DataConfig, DataProcessor, Object, Value,
};
use proptest::prelude::*;

use generators::*;

const PROPTEST_CASES: u32 = 512;

/// Строит значение колонки `name` из объекта.
fn build(
    name: &str,
    object: Object,
) -> Value {
    let column_type = ColumnType::parse(name).unwrap();
    let mut value = column_type.new_value(&DataConfig::default());
    value.update(object).unwrap();
    value
}

fn round_trip(
    name: &str,
    value: &Value,
) -> Result<(), TestCaseError> {
    let column_type = ColumnType::parse(name).unwrap();
    let (de, ser) = DataProcessor::for_column(&DataConfig::default(), &column_type).unwrap();

    let mut bytes = Vec::new();
    ser.serialize(value, &mut bytes).unwrap();

    let mut decoded = de.new_value();
    let mut input = Cursor::new(&bytes);
    de.deserialize(&mut decoded, &mut input).unwrap();
    prop_assert_eq!(input.position() as usize, bytes.len());
    prop_assert_eq!(&decoded, value);

    let mut again = Vec::new();
    ser.serialize(&decoded, &mut again).unwrap();
    prop_assert_eq!(again, bytes);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: PROPTEST_CASES,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_scalar_round_trip((name, object) in low_cardinality_scalar_strategy()) {
        let value = build(name, object);
        round_trip(name, &value)?;
        round_trip(&format!("LowCardinality({name})"), &value)?;
        round_trip(&format!("Nullable({name})"), &value)?;
    }

    #[test]
    fn prop_composite_round_trip((name, object) in composite_strategy()) {
        let value = build(name, object);
        round_trip(name, &value)?;
    }

    /// Блок колонки LowCardinality восстанавливает все строки.
    #[test]
    fn prop_low_cardinality_block((name, objects) in low_cardinality_column_strategy()) {
        let lc_name = format!("LowCardinality({name})");
        let column_type = ColumnType::parse(&lc_name).unwrap();
        let (de, ser) = DataProcessor::for_column(&DataConfig::default(), &column_type).unwrap();
        let values: Vec<Value> = objects.into_iter().map(|o| build(name, o)).collect();

        let mut bytes = Vec::new();
        ser.serialize_column(&values, &mut bytes).unwrap();
        let decoded = de.deserialize_column(values.len(), &mut Cursor::new(&bytes)).unwrap();
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn prop_varint_round_trip(v in any::<u64>()) {
        let mut buf = Vec::new();
        let written = write_varint(&mut buf, v).unwrap();
        prop_assert_eq!(written, buf.len());
        prop_assert_eq!(varint_size(v), buf.len());
        prop_assert_eq!(read_varint(&mut Cursor::new(&buf)).unwrap(), v);
    }

    /// Десериализатор не паникует на произвольных байтах.
    #[test]
    fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for name in [
            "Nullable(String)",
            "Array(Map(String, Nullable(Int32)))",
            "Tuple(Decimal(38, 10), DateTime64(9, 'UTC'), Enum8('a' = 1))",
            "Nested(a UInt8, b Array(IPv6))",
            "LowCardinality(Nullable(FixedString(3)))",
        ] {
            let column_type = ColumnType::parse(name).unwrap();
            let (de, ser) = DataProcessor::for_column(&DataConfig::default(), &column_type).unwrap();
            let mut value = de.new_value();
            if de.deserialize(&mut value, &mut Cursor::new(&bytes)).is_ok() {
                // запись может отказать по диапазону, но не паниковать
                let mut out = Vec::new();
                let _ = ser.serialize(&value, &mut out);
            }
        }
    }
}
