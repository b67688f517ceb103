use std::io::{self, Write};

use chdata_error::{DataResult, ResultExt};

use super::varint::write_varint;

/// Расширение `Write` для записи RowBinary.
///
/// Сброс буферов выполняется стандартным `Write::flush`.
pub trait ByteOutput: Write {
    fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> DataResult<()> {
        self.write_all(bytes).context("Failed to write bytes")
    }

    fn write_byte(
        &mut self,
        byte: u8,
    ) -> DataResult<()> {
        self.write_bytes(&[byte])
    }

    /// Пишет LEB128 varint, возвращает кол-во записанных байт.
    fn write_var_uint(
        &mut self,
        value: u64,
    ) -> DataResult<usize> {
        write_varint(self, value)
    }
}

impl<W: Write + ?Sized> ByteOutput for W {}

/// Обёртка над `Write`, считающая записанные байты.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
