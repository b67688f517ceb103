use std::io::{self, Read};

use chdata_error::{CodecError, DataResult, ResultExt};

use super::varint::read_varint;

/// Стартовая ёмкость буфера для длины из недоверенного потока.
const MAX_PREALLOC: usize = 64 * 1024;

/// Расширение `Read` для чтения RowBinary.
///
/// Реализовано для любого `Read`, включая `dyn Read`.
pub trait ByteInput: Read {
    /// Читает ровно `n` байт.
    ///
    /// Буфер растёт по мере чтения, поэтому испорченный префикс длины не
    /// приводит к выделению гигабайт памяти заранее.
    fn read_fully(
        &mut self,
        n: usize,
    ) -> DataResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_fully_into(&mut buf, n)?;
        Ok(buf)
    }

    /// То же, что [`read_fully`](Self::read_fully), но в переиспользуемый
    /// буфер (содержимое заменяется).
    fn read_fully_into(
        &mut self,
        buf: &mut Vec<u8>,
        n: usize,
    ) -> DataResult<()> {
        buf.clear();
        buf.reserve(n.min(MAX_PREALLOC));
        let read = (&mut *self)
            .take(n as u64)
            .read_to_end(buf)
            .context("Failed to read bytes")?;
        if read < n {
            return Err(CodecError::UnexpectedEof {
                what: format!("{n} bytes ({read} available)"),
                expected_bytes: Some(n as u64),
            }
            .into());
        }
        Ok(())
    }

    /// Читает один знаковый байт.
    fn read_byte(&mut self) -> DataResult<i8> {
        Ok(self.read_unsigned_byte()? as i8)
    }

    /// Читает один беззнаковый байт.
    fn read_unsigned_byte(&mut self) -> DataResult<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b).map_err(|e| eof_as(e, "byte", 1))?;
        Ok(b[0])
    }

    fn read_var_uint(&mut self) -> DataResult<u64> {
        read_varint(self)
    }

    /// Читает varint-длину и проверяет её по лимиту.
    fn read_length(
        &mut self,
        what: &str,
        limit: u64,
    ) -> DataResult<usize> {
        let length = self.read_var_uint()?;
        if length > limit || usize::try_from(length).is_err() {
            return Err(CodecError::InvalidLength {
                what: what.to_string(),
                length,
                limit,
            }
            .into());
        }
        Ok(length as usize)
    }
}

impl<R: Read + ?Sized> ByteInput for R {}

/// Преобразует `io::Error` в ошибку кодека с указанием типа значения.
pub(crate) fn eof_as(
    err: io::Error,
    what: &str,
    width: u64,
) -> chdata_error::StackError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        CodecError::UnexpectedEof {
            what: what.to_string(),
            expected_bytes: Some(width),
        }
        .into()
    } else {
        err.into()
    }
}

/// Обёртка над `Read`, считающая прочитанные байты.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Кол-во байт, прочитанных с момента создания.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chdata_error::StatusCode;

    use super::*;

    /// Тест проверяет чтение ровно n байт и EOF при нехватке данных.
    #[test]
    fn test_read_fully() {
        let mut input = Cursor::new(vec![1u8, 2, 3, 4]);
        assert_eq!(input.read_fully(3).unwrap(), vec![1, 2, 3]);

        let err = input.read_fully(2).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UnexpectedEof);
        assert!(err.to_string().contains("1 available"), "got: {err}");
    }

    /// Тест проверяет, что огромная длина не приводит к панике или аллокации.
    #[test]
    fn test_read_fully_huge_length() {
        let mut input = Cursor::new(vec![0u8; 8]);
        let err = input.read_fully(usize::MAX / 2).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_read_bytes() {
        let mut input = Cursor::new(vec![0xFFu8, 0xFF]);
        assert_eq!(input.read_byte().unwrap(), -1);
        assert_eq!(input.read_unsigned_byte().unwrap(), 255);
        assert!(input.read_unsigned_byte().unwrap_err().is_eof());
    }

    /// Тест проверяет лимит длины.
    #[test]
    fn test_read_length_limit() {
        let mut input = Cursor::new(vec![0x80, 0x01, 0x05]);
        let err = input.read_length("Array", 100).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidLength);
        assert_eq!(input.read_length("String", 100).unwrap(), 5);
    }

    /// Тест проверяет, что `ByteInput` доступен для `dyn Read`.
    #[test]
    fn test_dyn_read() {
        let mut cursor = Cursor::new(vec![7u8]);
        let input: &mut dyn Read = &mut cursor;
        assert_eq!(input.read_unsigned_byte().unwrap(), 7);
    }

    #[test]
    fn test_counting_reader() {
        let mut input = CountingReader::new(Cursor::new(vec![0xAC, 0x02, 9]));
        assert_eq!(input.read_var_uint().unwrap(), 300);
        assert_eq!(input.position(), 2);
        input.read_unsigned_byte().unwrap();
        assert_eq!(input.position(), 3);
    }
}
