use lob_middleware::driver::{DriverError, LobKind, LobWrite};
use lob_middleware::stream::{read_fully, write_fully};
use lob_middleware::test_utils::{MockEvent, MockLobRead, MockLobWrite, log_events, new_log};
use lob_middleware::types::{LobPayload, RowValues};
use lob_middleware::LobMiddlewareError;

#[tokio::test]
async fn character_stream_joins_chunks_into_text() {
    let mut stream = MockLobRead::from_chunks(vec![b"hello ".to_vec(), b"world".to_vec()]);
    let value = read_fully(&mut stream, LobKind::Character).await.unwrap();
    assert_eq!(value, RowValues::Text("hello world".to_string()));
}

#[tokio::test]
async fn binary_stream_concatenates_chunks_into_blob() {
    let mut stream = MockLobRead::from_chunks(vec![vec![1, 2], vec![3], vec![4, 5]]);
    let value = read_fully(&mut stream, LobKind::Binary).await.unwrap();
    assert_eq!(value, RowValues::Blob(vec![1, 2, 3, 4, 5]));
}

#[tokio::test]
async fn multibyte_sequence_split_across_chunks_still_decodes() {
    // "é" is 0xC3 0xA9; the chunk boundary lands in the middle.
    let mut stream = MockLobRead::from_chunks(vec![vec![b'c', b'a', b'f', 0xC3], vec![0xA9]]);
    let value = read_fully(&mut stream, LobKind::Character).await.unwrap();
    assert_eq!(value, RowValues::Text("café".to_string()));
}

#[tokio::test]
async fn chunk_error_discards_accumulated_data() {
    let mut stream =
        MockLobRead::failing_after(vec![b"partial".to_vec()], DriverError::new("read failed"));
    let err = read_fully(&mut stream, LobKind::Character).await.unwrap_err();
    match err {
        LobMiddlewareError::Driver(e) => assert_eq!(e.message, "read failed"),
        other => panic!("expected driver error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_utf8_character_content_is_a_stream_error() {
    let mut stream = MockLobRead::from_chunks(vec![vec![0xFF, 0xFE]]);
    let err = read_fully(&mut stream, LobKind::Character).await.unwrap_err();
    assert!(matches!(err, LobMiddlewareError::Stream(_)));
}

#[tokio::test]
async fn empty_stream_yields_empty_content() {
    let mut stream = MockLobRead::from_chunks(vec![]);
    let text = read_fully(&mut stream, LobKind::Character).await.unwrap();
    assert_eq!(text, RowValues::Text(String::new()));

    let mut stream = MockLobRead::from_chunks(vec![]);
    let blob = read_fully(&mut stream, LobKind::Binary).await.unwrap();
    assert_eq!(blob, RowValues::Blob(Vec::new()));
}

#[tokio::test]
async fn write_fully_skips_absent_stream_or_payload() {
    let log = new_log();
    let mut sink = MockLobWrite::new("sink", log.clone());

    write_fully(None, Some(&LobPayload::Text("x".into())))
        .await
        .unwrap();
    write_fully(Some(&mut sink as &mut dyn LobWrite), None)
        .await
        .unwrap();

    assert!(log_events(&log).is_empty());
}

#[tokio::test]
async fn write_tags_text_utf8_and_leaves_binary_untagged() {
    let log = new_log();

    let mut text_sink = MockLobWrite::new("text", log.clone());
    write_fully(
        Some(&mut text_sink as &mut dyn LobWrite),
        Some(&LobPayload::Text("grüß".into())),
    )
    .await
    .unwrap();

    let mut blob_sink = MockLobWrite::new("blob", log.clone());
    write_fully(
        Some(&mut blob_sink as &mut dyn LobWrite),
        Some(&LobPayload::Blob(vec![0, 159, 146, 150])),
    )
    .await
    .unwrap();

    let events = log_events(&log);
    assert_eq!(
        events,
        vec![
            MockEvent::LobWrite {
                label: "text".into(),
                bytes: "grüß".as_bytes().to_vec(),
                utf8: true,
            },
            MockEvent::LobWrite {
                label: "blob".into(),
                bytes: vec![0, 159, 146, 150],
                utf8: false,
            },
        ]
    );
}

#[tokio::test]
async fn write_then_read_round_trip_is_byte_identical() {
    let log = new_log();

    let mut sink = MockLobWrite::new("clob", log.clone());
    write_fully(
        Some(&mut sink as &mut dyn LobWrite),
        Some(&LobPayload::Text("round trip ✓".into())),
    )
    .await
    .unwrap();

    let written = match &log_events(&log)[0] {
        MockEvent::LobWrite { bytes, .. } => bytes.clone(),
        other => panic!("unexpected event {other:?}"),
    };
    let mut stream = MockLobRead::from_chunks(vec![written]);
    let value = read_fully(&mut stream, LobKind::Character).await.unwrap();
    assert_eq!(value, RowValues::Text("round trip ✓".to_string()));

    let payload = vec![7u8, 0, 255, 42];
    let mut sink = MockLobWrite::new("blob", log.clone());
    write_fully(
        Some(&mut sink as &mut dyn LobWrite),
        Some(&LobPayload::Blob(payload.clone())),
    )
    .await
    .unwrap();
    let written = match log_events(&log).last() {
        Some(MockEvent::LobWrite { bytes, .. }) => bytes.clone(),
        other => panic!("unexpected event {other:?}"),
    };
    let mut stream = MockLobRead::from_chunks(vec![written]);
    let value = read_fully(&mut stream, LobKind::Binary).await.unwrap();
    assert_eq!(value, RowValues::Blob(payload));
}

#[tokio::test]
async fn write_error_propagates_and_suppresses_completion() {
    let log = new_log();
    let mut sink = MockLobWrite::failing("bad", log.clone(), DriverError::new("write failed"));
    let err = write_fully(
        Some(&mut sink as &mut dyn LobWrite),
        Some(&LobPayload::Text("x".into())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LobMiddlewareError::Driver(e) if e.message == "write failed"));
    assert!(log_events(&log).is_empty());
}
