#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use chdata::{ColumnType, DataConfig, DataProcessor, Value};

/// Типы колонок, покрывающие все ветви кодека.
const TYPE_NAMES: &[&str] = &[
    "Nullable(String)",
    "FixedString(5)",
    "Decimal(38, 10)",
    "DateTime64(9, 'UTC')",
    "Time64(6)",
    "Enum16('a' = -1, 'b' = 300)",
    "Array(Map(String, Nullable(Int32)))",
    "Tuple(UUID, IPv4, IPv6, Bool)",
    "Nested(a UInt8, b Array(Date32))",
    "LowCardinality(Nullable(String))",
];

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    type_index: u8,
    widen_unsigned_types: bool,
    column_block: bool,
    rows: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let name = TYPE_NAMES[input.type_index as usize % TYPE_NAMES.len()];
    let column_type = ColumnType::parse(name).expect("Fixed type names must parse");
    let config = DataConfig::builder()
        .widen_unsigned_types(input.widen_unsigned_types)
        .max_element_count(1 << 16)
        .build()
        .expect("Valid config");
    let (de, ser) = DataProcessor::for_column(&config, &column_type).expect("Processor");
    let mut cursor = Cursor::new(&input.data);

    // Основной тест: декодер не должен паниковать ни на каких данных.
    let decoded: Vec<Value> = if input.column_block {
        match de.deserialize_column(input.rows as usize, &mut cursor) {
            Ok(values) => values,
            Err(_) => return,
        }
    } else {
        let mut value = de.new_value();
        match de.deserialize(&mut value, &mut cursor) {
            Ok(v) => vec![v.clone()],
            Err(_) => return,
        }
    };

    // Декодированное значение должно записываться обратно без паники.
    // Ошибка диапазона допустима (например, DateTime64 на краю i64).
    let mut buf = Vec::new();
    let _ = ser.serialize_column(&decoded, &mut buf);
    for value in &decoded {
        let _ = value.to_sql_expression();
        let _ = value.as_string();
    }
});
