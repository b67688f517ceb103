//! Многоколоночный поток RowBinary.

use std::io::Cursor;

use chdata::{
    Column, DataConfig, DataFormat, DataResult, Object, RowBinaryReader, RowBinaryWriter,
    StatusCode, Value,
};

fn columns() -> Vec<Column> {
    Column::parse_list(
        "id UInt64, tags Array(LowCardinality(String)), score Nullable(Decimal(9, 3)), seen DateTime('UTC')",
    )
    .unwrap()
}

fn row(
    id: u64,
    tags: &[&str],
    score: Option<&str>,
    seen: i64,
) -> Vec<Value> {
    let config = DataConfig::default();
    let objects = vec![
        Object::from(id),
        Object::from(tags.iter().map(|t| Object::from(*t)).collect::<Vec<_>>()),
        Object::from(score),
        Object::I64(seen),
    ];
    columns()
        .iter()
        .zip(objects)
        .map(|(c, o)| {
            let mut v = c.column_type.new_value(&config);
            v.update(o).unwrap();
            v
        })
        .collect()
}

fn sample_rows() -> Vec<Vec<Value>> {
    vec![
        row(1, &["a", "b"], Some("1.5"), 1_700_000_000),
        row(2, &[], None, 0),
        row(u64::MAX, &["a"], Some("-0.001"), 4_294_967_295),
    ]
}

fn write_all(config: &DataConfig) -> Vec<u8> {
    let mut writer = RowBinaryWriter::new(config, Vec::new(), columns()).unwrap();
    writer.write_header().unwrap();
    for r in sample_rows() {
        writer.write_record(&r).unwrap();
    }
    writer.into_inner().unwrap()
}

#[test]
fn test_plain_round_trip() {
    let config = DataConfig::default();
    let bytes = write_all(&config);
    let mut reader = RowBinaryReader::new(&config, Cursor::new(&bytes), Some(columns())).unwrap();
    let rows = reader.records().collect::<DataResult<Vec<_>>>().unwrap();
    assert_eq!(rows, sample_rows());
    assert_eq!(reader.position(), bytes.len() as u64);
}

/// Тест проверяет заголовок имён и типов.
#[test]
fn test_header_round_trip() {
    let config = DataConfig::builder()
        .format(DataFormat::RowBinaryWithNamesAndTypes)
        .build()
        .unwrap();
    let bytes = write_all(&config);
    assert_eq!(bytes[0], 4);
    assert_eq!(&bytes[1..4], &[2, b'i', b'd']);

    let mut reader = RowBinaryReader::new(&config, Cursor::new(&bytes), None).unwrap();
    assert_eq!(reader.columns(), columns().as_slice());
    let first = reader.next_record().unwrap().unwrap();
    assert_eq!(first[2].as_string().unwrap(), "1.500");
    assert_eq!(first[3].as_string().unwrap(), "2023-11-14 22:13:20");
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn test_empty_stream() {
    let config = DataConfig::default();
    let mut reader = RowBinaryReader::new(&config, Cursor::new(Vec::new()), Some(columns())).unwrap();
    assert!(reader.next_record().unwrap().is_none());
    assert!(reader.next_value().unwrap().is_none());
}

/// Тест проверяет обрыв потока в каждой позиции, кроме границы строки.
#[test]
fn test_truncation_reports_column() {
    let config = DataConfig::default();
    let bytes = write_all(&config);
    let first_row_len = {
        let mut reader = RowBinaryReader::new(&config, Cursor::new(&bytes), Some(columns())).unwrap();
        reader.next_record().unwrap();
        reader.position() as usize
    };

    for cut in 1..first_row_len {
        let mut reader =
            RowBinaryReader::new(&config, Cursor::new(&bytes[..cut]), Some(columns())).unwrap();
        let err = reader.next_record().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UnexpectedEof, "cut at {cut}");
        assert!(
            err.to_string().starts_with("Reached end of the stream when reading column #"),
            "got: {err}"
        );
    }
}

#[test]
fn test_header_requires_valid_types() {
    let config = DataConfig::builder()
        .format(DataFormat::RowBinaryWithNamesAndTypes)
        .build()
        .unwrap();
    let bytes = vec![1, 1, b'x', 4, b'I', b'n', b't', b'7'];
    let err = RowBinaryReader::new(&config, Cursor::new(bytes), None).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidTypeName);
    assert!(err.to_string().starts_with("Failed to read RowBinaryWithNamesAndTypes header"));
}
