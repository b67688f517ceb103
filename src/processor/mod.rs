//! Процессор данных: пара десериализатор/сериализатор для типа колонки.
//!
//! Дерево кодеков строится один раз на колонку и далее только читается,
//! поэтому пара может разделяться между потоками через `Arc`.

pub mod codec;
pub mod low_cardinality;
pub mod row_binary;

use std::{
    io::{Read, Write},
    sync::Arc,
};

use chdata_error::DataResult;
use tracing::debug;

// Публичный экспорт
pub use codec::Codec;
pub use low_cardinality::key_width;
pub use row_binary::{Records, RowBinaryReader, RowBinaryWriter};

use crate::{column::ColumnType, config::DataConfig, value::Value};

/// Фабрика пар десериализатор/сериализатор.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataProcessor;

impl DataProcessor {
    /// Строит пару для `column_type` с учётом флагов `config`.
    pub fn for_column(
        config: &DataConfig,
        column_type: &ColumnType,
    ) -> DataResult<(Deserializer, Serializer)> {
        config.validate()?;
        let codec = Codec::build(column_type);
        debug!(column_type = %column_type, "Built data processor");
        Ok((
            Deserializer {
                column_type: column_type.clone(),
                codec: Arc::clone(&codec),
                prototype: column_type.new_value(config),
                limit: config.max_element_count,
            },
            Serializer {
                column_type: column_type.clone(),
                codec,
            },
        ))
    }
}

/// Читает значения одного типа колонки.
#[derive(Debug, Clone)]
pub struct Deserializer {
    column_type: ColumnType,
    codec: Arc<Codec>,
    prototype: Value,
    limit: u64,
}

impl Deserializer {
    /// Читает ровно одно значение в `value` и возвращает его же.
    ///
    /// При ошибке содержимое `value` не определено, строку следует
    /// отбросить целиком.
    pub fn deserialize<'v, R: Read + ?Sized>(
        &self,
        value: &'v mut Value,
        input: &mut R,
    ) -> DataResult<&'v mut Value> {
        self.codec.read(value, input, self.limit)?;
        Ok(value)
    }

    /// Новое значение в состоянии null-or-empty для этой колонки.
    pub fn new_value(&self) -> Value {
        Value::instantiate(&self.prototype)
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Читает блок из `rows` значений. LowCardinality читается в словарной
    /// раскладке, прочие типы как `rows` значений подряд.
    pub fn deserialize_column<R: Read + ?Sized>(
        &self,
        rows: usize,
        input: &mut R,
    ) -> DataResult<Vec<Value>> {
        if let Codec::LowCardinality(inner) = self.codec.as_ref() {
            return low_cardinality::read_block(inner, &self.prototype, rows, input, self.limit);
        }
        let mut values = Vec::with_capacity(rows.min(1024));
        for _ in 0..rows {
            let mut value = self.new_value();
            self.codec.read(&mut value, input, self.limit)?;
            values.push(value);
        }
        Ok(values)
    }
}

/// Пишет значения одного типа колонки.
#[derive(Debug, Clone)]
pub struct Serializer {
    column_type: ColumnType,
    codec: Arc<Codec>,
}

impl Serializer {
    /// Пишет одно значение. Null в колонке без Nullable записывается как
    /// значение по умолчанию.
    pub fn serialize<W: Write + ?Sized>(
        &self,
        value: &Value,
        output: &mut W,
    ) -> DataResult<()> {
        self.codec.write(value, output)
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Обратная операция к [`Deserializer::deserialize_column`].
    pub fn serialize_column<W: Write + ?Sized>(
        &self,
        values: &[Value],
        output: &mut W,
    ) -> DataResult<()> {
        if let Codec::LowCardinality(inner) = self.codec.as_ref() {
            return low_cardinality::write_block(inner, values, output);
        }
        for value in values {
            self.codec.write(value, output)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chdata_error::StatusCode;

    use super::*;

    fn processor(name: &str) -> (Deserializer, Serializer) {
        let column_type = ColumnType::parse(name).unwrap();
        DataProcessor::for_column(&DataConfig::default(), &column_type).unwrap()
    }

    /// Тест проверяет вложенный массив из примера документации.
    #[test]
    fn test_nested_array_round_trip() {
        let (de, ser) = processor("Array(Array(UInt8))");
        let bytes = vec![2, 2, 1, 2, 2, 2, 1];
        let mut value = de.new_value();
        de.deserialize(&mut value, &mut Cursor::new(&bytes)).unwrap();
        assert_eq!(value.to_sql_expression(), "[[1,2],[2,1]]");

        let mut out = Vec::new();
        ser.serialize(&value, &mut out).unwrap();
        assert_eq!(out, bytes);
    }

    /// Тест проверяет прозрачность LowCardinality для построчного чтения.
    #[test]
    fn test_low_cardinality_is_transparent_per_row() {
        let (plain, _) = processor("String");
        let (lc, _) = processor("LowCardinality(String)");
        let bytes = [3, b'a', b'b', b'c'];

        let mut a = plain.new_value();
        let mut b = lc.new_value();
        plain.deserialize(&mut a, &mut Cursor::new(&bytes)).unwrap();
        lc.deserialize(&mut b, &mut Cursor::new(&bytes)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_column_block() {
        let (de, ser) = processor("LowCardinality(Nullable(String))");
        let values = vec![Value::string("x"), de.new_value(), Value::string("x")];
        let mut out = Vec::new();
        ser.serialize_column(&values, &mut out).unwrap();
        let decoded = de.deserialize_column(3, &mut Cursor::new(out)).unwrap();
        assert_eq!(decoded[0], values[0]);
        assert!(decoded[1].is_null());
        assert_eq!(decoded[2], values[2]);

        let (de, ser) = processor("Int32");
        let values: Vec<Value> = (1..=3).map(|i| Value::Int32(Some(i))).collect();
        let mut out = Vec::new();
        ser.serialize_column(&values, &mut out).unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(de.deserialize_column(3, &mut Cursor::new(out)).unwrap(), values);
    }

    #[test]
    fn test_max_element_count() {
        let column_type = ColumnType::parse("Array(Int8)").unwrap();
        let config = DataConfig::builder().max_element_count(2).build().unwrap();
        let (de, _) = DataProcessor::for_column(&config, &column_type).unwrap();
        let mut value = de.new_value();
        let err = de
            .deserialize(&mut value, &mut Cursor::new(vec![3, 1, 2, 3]))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidLength);
    }

    #[test]
    fn test_invalid_config() {
        let config = DataConfig {
            buffer_size: 0,
            ..DataConfig::default()
        };
        let err = DataProcessor::for_column(&config, &ColumnType::Int8).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::Config);
    }
}
