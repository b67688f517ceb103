//! LEB128 без знака: префиксы длины String/Array/Map, размер словаря и
//! число строк блока LowCardinality, заголовок RowBinaryWithNamesAndTypes.
//!
//! Младшие 7 бит идут первыми, старший бит байта означает продолжение.
//! Значение u64 занимает от 1 до [`MAX_VARINT_LEN`] байт.

use std::io::{Read, Write};

use chdata_error::{CodecError, DataResult, ResultExt};

/// Предел длины varint для u64.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

/// Пишет `value` и возвращает число записанных байт.
///
/// ```
/// use chdata::stream::write_varint;
///
/// let mut prefix = Vec::new();
/// write_varint(&mut prefix, 300).unwrap();
/// assert_eq!(prefix, [0xAC, 0x02]);
/// ```
pub fn write_varint<W: Write + ?Sized>(
    w: &mut W,
    value: u64,
) -> DataResult<usize> {
    let mut encoded = [0u8; MAX_VARINT_LEN];
    let mut rest = value;
    let mut len = 0;
    while rest > PAYLOAD as u64 {
        encoded[len] = (rest as u8 & PAYLOAD) | CONTINUATION;
        rest >>= 7;
        len += 1;
    }
    encoded[len] = rest as u8;
    len += 1;

    w.write_all(&encoded[..len])
        .context("Failed to write varint bytes")?;
    Ok(len)
}

/// Читает одно значение.
///
/// Обрыв потока даёт `UnexpectedEof`, последовательность длиннее
/// [`MAX_VARINT_LEN`] или переполнение u64 дают `CorruptedData`.
///
/// ```
/// use std::io::Cursor;
///
/// use chdata::stream::read_varint;
///
/// let mut prefix = Cursor::new([0xAC, 0x02, 0xFF]);
/// assert_eq!(read_varint(&mut prefix).unwrap(), 300);
/// assert_eq!(prefix.position(), 2);
/// ```
pub fn read_varint<R: Read + ?Sized>(r: &mut R) -> DataResult<u64> {
    let mut value = 0u64;
    for index in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte)
            .context("Failed to read varint byte")?;
        let byte = byte[0];

        // в десятом байте остаётся место только для старшего бита u64
        if index == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(CodecError::corrupted(
                "varint",
                format!("Varint overflows u64 (last byte 0x{byte:02X})"),
            )
            .into());
        }

        value |= u64::from(byte & PAYLOAD) << (7 * index);
        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }

    Err(CodecError::corrupted(
        "varint",
        format!("Varint too long (>{MAX_VARINT_LEN} bytes), possible corruption"),
    )
    .into())
}

/// Сколько байт займёт `value`.
pub fn varint_size(value: u64) -> usize {
    let significant = 64 - (value | 1).leading_zeros() as usize;
    significant.div_ceil(7)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chdata_error::StatusCode;
    use rstest::rstest;

    use super::*;

    /// Тест проверяет раскладку на границах ширины, включая предел длины
    /// по умолчанию и длину за ним.
    #[rstest]
    #[case(0, &[0x00])]
    #[case(127, &[0x7F])]
    #[case(128, &[0x80, 0x01])]
    #[case(16_383, &[0xFF, 0x7F])]
    #[case(16_384, &[0x80, 0x80, 0x01])]
    #[case(i32::MAX as u64, &[0xFF, 0xFF, 0xFF, 0xFF, 0x07])]
    #[case(i32::MAX as u64 + 1, &[0x80, 0x80, 0x80, 0x80, 0x08])]
    #[case(u64::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01])]
    fn test_layout(
        #[case] value: u64,
        #[case] expected: &[u8],
    ) {
        let mut buf = Vec::new();
        assert_eq!(write_varint(&mut buf, value).unwrap(), expected.len());
        assert_eq!(buf, expected);
        assert_eq!(varint_size(value), expected.len());
        assert_eq!(read_varint(&mut Cursor::new(expected)).unwrap(), value);
    }

    /// Тест проверяет, что за префиксом строки остаётся её содержимое.
    #[test]
    fn test_prefix_then_payload() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 3).unwrap();
        buf.extend_from_slice(b"abc");

        let mut cursor = Cursor::new(buf);
        let len = read_varint(&mut cursor).unwrap() as usize;
        let mut payload = vec![0u8; len];
        cursor.read_exact(&mut payload).unwrap();
        assert_eq!(payload, b"abc");
    }

    /// Тест проверяет отказ на слишком длинной и переполняющей записи.
    #[rstest]
    #[case(vec![0x80; 11])]
    #[case(vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02])]
    fn test_corrupted(#[case] data: Vec<u8>) {
        let err = read_varint(&mut Cursor::new(data)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CorruptedData);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![0x80])]
    #[case(vec![0xAC, 0x80, 0x80])]
    fn test_truncated(#[case] data: Vec<u8>) {
        let err = read_varint(&mut Cursor::new(data)).unwrap_err();
        assert!(err.is_eof(), "expected EOF, got: {err}");
        assert!(err.to_string().starts_with("Failed to read varint byte"));
    }
}
