//! Блок колонки LowCardinality: словарь различных значений и ключ на строку.
//!
//! Раскладка: varint размер словаря, значения словаря (кодеком внутреннего
//! типа, в порядке первого появления), varint кол-во строк, затем ключи.
//! Ширина ключа выводится из размера словаря и явно не записывается.

use std::{
    collections::HashMap,
    io::{Read, Write},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chdata_error::{CodecError, DataResult};
use tracing::trace;

use super::codec::Codec;
use crate::{
    stream::{eof_as, ByteInput, ByteOutput},
    value::Value,
};

/// Минимальная ширина ключа (байт), способная индексировать `size` записей.
pub fn key_width(size: u64) -> usize {
    if size <= 1 << 8 {
        1
    } else if size <= 1 << 16 {
        2
    } else if size <= 1 << 32 {
        4
    } else {
        8
    }
}

/// Пишет `values` одним блоком.
pub(crate) fn write_block<W: Write + ?Sized>(
    inner: &Codec,
    values: &[Value],
    output: &mut W,
) -> DataResult<()> {
    // значения сравниваются по закодированным байтам
    let mut index: HashMap<Vec<u8>, u64> = HashMap::new();
    let mut dictionary: Vec<Vec<u8>> = Vec::new();
    let mut keys = Vec::with_capacity(values.len());
    for value in values {
        let mut encoded = Vec::new();
        inner.write(value, &mut encoded)?;
        let key = match index.get(&encoded) {
            Some(key) => *key,
            None => {
                let key = dictionary.len() as u64;
                index.insert(encoded.clone(), key);
                dictionary.push(encoded);
                key
            }
        };
        keys.push(key);
    }

    let size = dictionary.len() as u64;
    let width = key_width(size);
    trace!(dictionary_size = size, key_width = width, rows = values.len(), "Writing LowCardinality block");

    output.write_var_uint(size)?;
    for entry in &dictionary {
        output.write_bytes(entry)?;
    }
    output.write_var_uint(values.len() as u64)?;
    for key in keys {
        match width {
            1 => output.write_u8(key as u8)?,
            2 => output.write_u16::<LittleEndian>(key as u16)?,
            4 => output.write_u32::<LittleEndian>(key as u32)?,
            _ => output.write_u64::<LittleEndian>(key)?,
        }
    }
    Ok(())
}

/// Читает блок из `rows` значений. Каждая строка получает копию записи
/// словаря.
pub(crate) fn read_block<R: Read + ?Sized>(
    inner: &Codec,
    prototype: &Value,
    rows: usize,
    input: &mut R,
    limit: u64,
) -> DataResult<Vec<Value>> {
    let size = input.read_length("LowCardinality dictionary", limit)?;
    let mut dictionary = Vec::with_capacity(size.min(rows.max(1)));
    for _ in 0..size {
        let mut entry = Value::instantiate(prototype);
        inner.read(&mut entry, input, limit)?;
        dictionary.push(entry);
    }

    let count = input.read_var_uint()?;
    if count != rows as u64 {
        return Err(CodecError::corrupted(
            "LowCardinality block",
            format!("expected {rows} rows, got {count}"),
        )
        .into());
    }

    let width = key_width(size as u64);
    trace!(dictionary_size = size, key_width = width, rows, "Reading LowCardinality block");

    let mut values = Vec::with_capacity(rows);
    for _ in 0..rows {
        let key = match width {
            1 => input.read_u8().map_err(|e| eof_as(e, "LowCardinality key", 1))? as u64,
            2 => input
                .read_u16::<LittleEndian>()
                .map_err(|e| eof_as(e, "LowCardinality key", 2))? as u64,
            4 => input
                .read_u32::<LittleEndian>()
                .map_err(|e| eof_as(e, "LowCardinality key", 4))? as u64,
            _ => input
                .read_u64::<LittleEndian>()
                .map_err(|e| eof_as(e, "LowCardinality key", 8))?,
        };
        let entry = usize::try_from(key)
            .ok()
            .and_then(|k| dictionary.get(k))
            .ok_or_else(|| {
                CodecError::corrupted(
                    "LowCardinality key",
                    format!("key {key} is outside dictionary of {size} entries"),
                )
            })?;
        values.push(entry.clone());
    }
    Ok(values)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
