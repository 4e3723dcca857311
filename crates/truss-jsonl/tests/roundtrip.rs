//! Integration tests for read/write round-trip operations.
//!
//! These tests verify that data written with `JsonlWriter` can be read back
//! with `JsonlReader`, across the full IO cycle including the atomic file
//! path.

use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tempfile::tempdir;
use truss_jsonl::{JsonlReader, JsonlWriter, read_jsonl_resilient, write_jsonl_atomic};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TestRecord {
    id: u32,
    name: String,
    active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ComplexRecord {
    id: String,
    value: f64,
    tags: Vec<String>,
    metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Metadata {
    created_by: String,
    version: u32,
}

/// Write one value, read it back through a fresh reader.
async fn roundtrip<T>(original: &T) -> T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let buffer = Cursor::new(Vec::new());
    let mut writer = JsonlWriter::new(buffer);
    writer.write(original).await.unwrap();
    writer.flush().await.unwrap();

    let data = writer.into_inner().into_inner().into_inner();
    let mut reader = JsonlReader::new(Cursor::new(data));
    reader.read_line().await.unwrap().unwrap()
}

#[rstest]
#[case::simple(TestRecord { id: 1, name: "Alice".to_string(), active: true })]
#[case::special_chars(TestRecord { id: 42, name: "Line1\nLine2\tTabbed\"Quoted\"\\Backslash".to_string(), active: true })]
#[case::unicode(TestRecord { id: 1, name: "Hello, \u{4e16}\u{754c}! \u{1F600} \u{00e9}\u{00e8}".to_string(), active: true })]
#[case::empty_string(TestRecord { id: 1, name: String::new(), active: false })]
#[case::large_name(TestRecord { id: 1, name: "x".repeat(100_000), active: true })]
#[tokio::test]
async fn roundtrip_test_record(#[case] original: TestRecord) {
    let read_back = roundtrip(&original).await;
    assert_eq!(original, read_back);
}

#[rstest]
#[case::with_metadata(ComplexRecord {
    id: "abc-123".to_string(),
    value: 1.23456,
    tags: vec!["tag1".to_string(), "tag2".to_string()],
    metadata: Some(Metadata { created_by: "test".to_string(), version: 1 }),
})]
#[case::null_optional(ComplexRecord {
    id: "xyz-789".to_string(),
    value: 0.0,
    tags: vec![],
    metadata: None,
})]
#[tokio::test]
async fn roundtrip_complex_record(#[case] original: ComplexRecord) {
    let read_back = roundtrip(&original).await;
    assert_eq!(original, read_back);
}

#[tokio::test]
async fn roundtrip_single_record_verifies_eof() {
    let original = TestRecord {
        id: 1,
        name: "Alice".to_string(),
        active: true,
    };

    let buffer = Cursor::new(Vec::new());
    let mut writer = JsonlWriter::new(buffer);
    writer.write(&original).await.unwrap();
    writer.flush().await.unwrap();

    let data = writer.into_inner().into_inner().into_inner();
    let mut reader = JsonlReader::new(Cursor::new(data));

    let read_back: TestRecord = reader.read_line().await.unwrap().unwrap();
    assert_eq!(original, read_back);

    let eof: Option<TestRecord> = reader.read_line().await.unwrap();
    assert!(eof.is_none());
}

#[tokio::test]
async fn roundtrip_multiple_records() {
    let records = vec![
        TestRecord {
            id: 1,
            name: "Alice".to_string(),
            active: true,
        },
        TestRecord {
            id: 2,
            name: "Bob".to_string(),
            active: false,
        },
        TestRecord {
            id: 3,
            name: "Charlie".to_string(),
            active: true,
        },
    ];

    let buffer = Cursor::new(Vec::new());
    let mut writer = JsonlWriter::new(buffer);
    writer.write_all(records.iter()).await.unwrap();
    writer.flush().await.unwrap();

    let data = writer.into_inner().into_inner().into_inner();
    let mut reader = JsonlReader::new(Cursor::new(data));

    let mut read_back = Vec::new();
    while let Some(record) = reader.read_line::<TestRecord>().await.unwrap() {
        read_back.push(record);
    }

    assert_eq!(records, read_back);
}

#[tokio::test]
async fn roundtrip_through_atomic_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.jsonl");

    let records: Vec<TestRecord> = (0..50)
        .map(|id| TestRecord {
            id,
            name: format!("Record {}", id),
            active: id % 2 == 0,
        })
        .collect();

    write_jsonl_atomic(&path, &records).await.unwrap();

    let (read_back, warnings) = read_jsonl_resilient::<TestRecord, _>(&path).await.unwrap();
    assert!(warnings.is_empty());
    assert_eq!(records, read_back);
}
