//! Многоколоночный поток RowBinary: строки из значений колонок подряд.
//!
//! Формат `RowBinaryWithNamesAndTypes` предваряет строки заголовком:
//! varint кол-во колонок, имена колонок, затем имена типов.

use std::io::{BufReader, BufWriter, Read, Write};

use chdata_error::{bail, ensure, DataResult, ErrorExt, ResultExt, StatusCode};
use tracing::{debug, warn};

use super::{DataProcessor, Deserializer, Serializer};
use crate::{
    column::Column,
    config::{DataConfig, DataFormat},
    stream::{ByteInput, ByteOutput, CountingReader, CountingWriter},
    value::Value,
};

/// Читатель строк с одним переиспользуемым значением на колонку.
#[derive(Debug)]
pub struct RowBinaryReader<R: Read> {
    input: CountingReader<BufReader<R>>,
    columns: Vec<Column>,
    deserializers: Vec<Deserializer>,
    row: Vec<Value>,
    column_index: usize,
    reuse_values: bool,
    done: bool,
}

/// Итератор строк, см. [`RowBinaryReader::records`].
pub struct Records<'a, R: Read> {
    reader: &'a mut RowBinaryReader<R>,
}

/// Писатель строк RowBinary.
#[derive(Debug)]
pub struct RowBinaryWriter<W: Write> {
    output: CountingWriter<BufWriter<W>>,
    columns: Vec<Column>,
    serializers: Vec<Serializer>,
    format: DataFormat,
    column_index: usize,
    header_written: bool,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<R: Read> RowBinaryReader<R> {
    /// Создаёт читатель. Для `RowBinaryWithNamesAndTypes` колонки берутся из
    /// заголовка потока, для `RowBinary` их нужно передать явно.
    pub fn new(
        config: &DataConfig,
        input: R,
        columns: Option<Vec<Column>>,
    ) -> DataResult<Self> {
        let mut input = CountingReader::new(BufReader::with_capacity(config.buffer_size, input));
        let columns = match config.format {
            DataFormat::RowBinaryWithNamesAndTypes => {
                read_header(&mut input, config.max_element_count)
                    .context("Failed to read RowBinaryWithNamesAndTypes header")?
            }
            DataFormat::RowBinary => match columns {
                Some(columns) => columns,
                None => bail!(
                    StatusCode::InvalidArgs,
                    "Columns must be specified for {:?} format",
                    config.format
                ),
            },
        };
        ensure!(
            !columns.is_empty(),
            StatusCode::InvalidArgs,
            "At least one column is required"
        );

        let deserializers = columns
            .iter()
            .map(|c| DataProcessor::for_column(config, &c.column_type).map(|(de, _)| de))
            .collect::<DataResult<Vec<_>>>()?;
        let row = deserializers.iter().map(Deserializer::new_value).collect();
        debug!(columns = columns.len(), format = ?config.format, "Created RowBinary reader");

        Ok(Self {
            input,
            columns,
            deserializers,
            row,
            column_index: 0,
            reuse_values: config.reuse_value_wrapper,
            done: false,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Кол-во байт, прочитанных из потока (включая заголовок).
    pub fn position(&self) -> u64 {
        self.input.position()
    }

    /// Читает следующую строку целиком. `None` при чистом конце потока.
    pub fn next_record(&mut self) -> DataResult<Option<&[Value]>> {
        if self.done {
            return Ok(None);
        }
        if !self.reuse_values {
            self.row = self.deserializers.iter().map(Deserializer::new_value).collect();
        }
        loop {
            match self.read_next()? {
                None => return Ok(None),
                Some(_) if self.column_index == 0 => return Ok(Some(&self.row)),
                Some(_) => {}
            }
        }
    }

    /// Читает значение следующей колонки. После последней колонки строки
    /// позиция возвращается к первой.
    pub fn next_value(&mut self) -> DataResult<Option<&Value>> {
        if self.done {
            return Ok(None);
        }
        match self.read_next()? {
            None => Ok(None),
            Some(i) => Ok(Some(&self.row[i])),
        }
    }

    /// Итератор собственных копий строк.
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self }
    }

    /// Возвращает индекс прочитанной колонки или `None` при чистом конце.
    fn read_next(&mut self) -> DataResult<Option<usize>> {
        let i = self.column_index;
        let n = self.columns.len();
        let start = self.input.position();

        let result = self.deserializers[i].deserialize(&mut self.row[i], &mut self.input);
        match result {
            Ok(_) => {
                self.column_index = (i + 1) % n;
                Ok(Some(i))
            }
            Err(e) if e.is_eof() && i == 0 && self.input.position() == start => {
                self.done = true;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                let name = &self.columns[i].name;
                if e.is_critical() {
                    warn!(
                        column = %name,
                        position = self.input.position(),
                        error = %e.root().log_message(),
                        "Corrupted row data"
                    );
                }
                let msg = if e.is_eof() {
                    format!("Reached end of the stream when reading column #{} of {n}: {name}", i + 1)
                } else {
                    format!("Failed to read column #{} of {n}: {name}", i + 1)
                };
                Err(e.context(msg))
            }
        }
    }
}

impl<W: Write> RowBinaryWriter<W> {
    pub fn new(
        config: &DataConfig,
        output: W,
        columns: Vec<Column>,
    ) -> DataResult<Self> {
        ensure!(
            !columns.is_empty(),
            StatusCode::InvalidArgs,
            "At least one column is required"
        );
        let serializers = columns
            .iter()
            .map(|c| DataProcessor::for_column(config, &c.column_type).map(|(_, ser)| ser))
            .collect::<DataResult<Vec<_>>>()?;

        Ok(Self {
            output: CountingWriter::new(BufWriter::with_capacity(config.buffer_size, output)),
            columns,
            serializers,
            format: config.format,
            column_index: 0,
            header_written: false,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Пишет заголовок, если формат его требует. Повторный вызов ничего не
    /// делает.
    pub fn write_header(&mut self) -> DataResult<()> {
        if self.header_written || self.format != DataFormat::RowBinaryWithNamesAndTypes {
            self.header_written = true;
            return Ok(());
        }
        self.output.write_var_uint(self.columns.len() as u64)?;
        for column in &self.columns {
            write_text(&mut self.output, &column.name)?;
        }
        for column in &self.columns {
            write_text(&mut self.output, &column.column_type.to_string())?;
        }
        self.header_written = true;
        Ok(())
    }

    pub fn write_record(
        &mut self,
        values: &[Value],
    ) -> DataResult<()> {
        ensure!(
            values.len() == self.columns.len(),
            StatusCode::InvalidArgs,
            "Expected {} values in a row, got {}",
            self.columns.len(),
            values.len()
        );
        ensure!(
            self.column_index == 0,
            StatusCode::InvalidArgs,
            "Previous row is incomplete at column #{}",
            self.column_index + 1
        );
        for value in values {
            self.write_value(value)?;
        }
        Ok(())
    }

    /// Пишет значение текущей колонки и переходит к следующей.
    pub fn write_value(
        &mut self,
        value: &Value,
    ) -> DataResult<()> {
        if !self.header_written {
            self.write_header()?;
        }
        let i = self.column_index;
        let n = self.columns.len();
        self.serializers[i]
            .serialize(value, &mut self.output)
            .with_context(|| {
                format!("Failed to write column #{} of {n}: {}", i + 1, self.columns[i].name)
            })?;
        self.column_index = (i + 1) % n;
        Ok(())
    }

    /// Кол-во байт, переданных в буфер вывода.
    pub fn position(&self) -> u64 {
        self.output.position()
    }

    pub fn flush(&mut self) -> DataResult<()> {
        self.output.flush().context("Failed to flush output")
    }

    /// Сбрасывает буфер и возвращает исходный поток.
    pub fn into_inner(mut self) -> DataResult<W> {
        self.flush()?;
        self.output
            .into_inner()
            .into_inner()
            .map_err(|e| e.into_error())
            .context("Failed to flush output")
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl<R: Read> Iterator for Records<'_, R> {
    type Item = DataResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.next_record() {
            Ok(Some(row)) => Some(Ok(row.to_vec())),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Внутренние функции
////////////////////////////////////////////////////////////////////////////////

fn read_header<R: Read + ?Sized>(
    input: &mut R,
    limit: u64,
) -> DataResult<Vec<Column>> {
    let count = input.read_length("column count", limit)?;
    let mut names = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        names.push(read_text(input, limit)?);
    }
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let type_name = read_text(input, limit)?;
        columns.push(Column::with_type_name(name, &type_name)?);
    }
    Ok(columns)
}

fn read_text<R: Read + ?Sized>(
    input: &mut R,
    limit: u64,
) -> DataResult<String> {
    let n = input.read_length("header string", limit)?;
    Ok(String::from_utf8(input.read_fully(n)?)?)
}

fn write_text<W: Write + ?Sized>(
    output: &mut W,
    text: &str,
) -> DataResult<()> {
    output.write_var_uint(text.len() as u64)?;
    output.write_bytes(text.as_bytes())
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
