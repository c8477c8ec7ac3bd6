use std::sync::Arc;

use lob_middleware::LobMiddlewareError;
use lob_middleware::driver::{ColumnDescriptor, DriverError, RawField, RawRow};
use lob_middleware::reader::rows::{RowsReaderOptions, project_single_column_json, read_rows};
use lob_middleware::reader::column_names;
use lob_middleware::results::Record;
use lob_middleware::test_utils::{MOCK_CLOB_CODE, MockLobRead, mock_codes};
use lob_middleware::types::RowValues;

fn columns(names: &[&str]) -> Arc<Vec<String>> {
    column_names(names.iter().map(|name| ColumnDescriptor::new(*name)).collect())
}

fn lob_row(id: i64, chunks: usize) -> RawRow {
    let chunks = (0..chunks).map(|i| format!("c{i};").into_bytes()).collect();
    RawRow::Positional(vec![
        RawField::Scalar(RowValues::Int(id)),
        RawField::Lob {
            type_code: MOCK_CLOB_CODE,
            stream: Box::new(MockLobRead::from_chunks(chunks)),
        },
    ])
}

#[tokio::test]
async fn empty_batch_resolves_immediately() {
    let cols = columns(&["ID"]);
    let records = read_rows(&cols, Vec::new(), mock_codes(), &RowsReaderOptions::default())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn output_order_matches_input_order_under_contention() {
    // Rows with wildly different LOB sizes complete out of order under a
    // 2-wide cap; slot indexing still pins them to input positions.
    let cols = columns(&["ID", "BODY"]);
    let raw: Vec<RawRow> = vec![
        lob_row(0, 12),
        lob_row(1, 1),
        lob_row(2, 7),
        lob_row(3, 0),
        lob_row(4, 3),
    ];
    let options = RowsReaderOptions {
        parallel_limit: 2,
        yield_every_rows: 2,
    };
    let records = read_rows(&cols, raw, mock_codes(), &options).await.unwrap();
    let ids: Vec<i64> = records
        .iter()
        .map(|r| *r.get("ID").and_then(RowValues::as_int).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn large_batch_with_scalar_rows_keeps_order() {
    let cols = columns(&["ID"]);
    let raw: Vec<RawRow> = (0..250)
        .map(|i| RawRow::Positional(vec![RawField::Scalar(RowValues::Int(i))]))
        .collect();
    let records = read_rows(&cols, raw, mock_codes(), &RowsReaderOptions::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 250);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.get("ID"), Some(&RowValues::Int(i as i64)));
    }
}

#[tokio::test]
async fn first_row_error_aborts_the_batch() {
    let cols = columns(&["ID", "BODY"]);
    let raw = vec![
        lob_row(0, 2),
        RawRow::Positional(vec![
            RawField::Scalar(RowValues::Int(1)),
            RawField::Lob {
                type_code: MOCK_CLOB_CODE,
                stream: Box::new(MockLobRead::failing_after(
                    vec![],
                    DriverError::new("bad lob"),
                )),
            },
        ]),
        lob_row(2, 2),
    ];
    let err = read_rows(&cols, raw, mock_codes(), &RowsReaderOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LobMiddlewareError::Driver(e) if e.message == "bad lob"));
}

fn single_column_record(value: RowValues) -> Record {
    Record::new(Arc::new(vec!["DOC".to_string()]), vec![value])
}

#[test]
fn json_projection_parses_each_sole_value() {
    let records = vec![
        single_column_record(RowValues::Text(r#"{"a":1}"#.into())),
        single_column_record(RowValues::Null),
        single_column_record(RowValues::Text(String::new())),
    ];
    let values = project_single_column_json(&records).unwrap();
    assert_eq!(values[0], serde_json::json!({"a": 1}));
    assert_eq!(values[1], serde_json::json!({}));
    assert_eq!(values[2], serde_json::json!({}));
}

#[test]
fn json_projection_rejects_multi_column_records() {
    let records = vec![Record::new(
        Arc::new(vec!["A".to_string(), "B".to_string()]),
        vec![RowValues::Int(1), RowValues::Int(2)],
    )];
    let err = project_single_column_json(&records).unwrap_err();
    assert!(matches!(err, LobMiddlewareError::Execution(_)));
}

#[test]
fn json_projection_rejects_unparseable_text() {
    let records = vec![single_column_record(RowValues::Text("not json".into()))];
    assert!(project_single_column_json(&records).is_err());
}
