use std::collections::HashMap;

use lob_middleware::LobMiddlewareError;
use lob_middleware::driver::{DriverError, LobWrite};
use lob_middleware::test_utils::{MockEvent, MockLobWrite, MockLog, log_events, new_log};
use lob_middleware::types::{LobPayload, LobWriteJob};
use lob_middleware::writer::{write_record, write_records};

type OutBinds = HashMap<String, Vec<Box<dyn LobWrite>>>;

fn sink(label: &str, log: &MockLog) -> Box<dyn LobWrite> {
    Box::new(MockLobWrite::new(label, log.clone()))
}

fn job(bind: &str, payload: LobPayload) -> LobWriteJob {
    LobWriteJob {
        bind_name: bind.to_string(),
        payload,
    }
}

fn written_labels(log: &MockLog) -> Vec<String> {
    log_events(log)
        .into_iter()
        .map(|event| match event {
            MockEvent::LobWrite { label, .. } => label,
            other => panic!("unexpected event {other:?}"),
        })
        .collect()
}

#[tokio::test]
async fn single_row_write_targets_the_sole_stream() {
    let log = new_log();
    let mut out_binds: OutBinds = HashMap::from([("clob1".to_string(), vec![sink("s1", &log)])]);

    write_record(
        &mut out_binds,
        &[job("clob1", LobPayload::Text("content".into()))],
    )
    .await
    .unwrap();

    assert_eq!(
        log_events(&log),
        vec![MockEvent::LobWrite {
            label: "s1".into(),
            bytes: b"content".to_vec(),
            utf8: true,
        }]
    );
}

#[tokio::test]
async fn multi_row_write_sends_the_same_payload_to_every_stream() {
    let log = new_log();
    let mut out_binds: OutBinds = HashMap::from([(
        "LOB1".to_string(),
        vec![sink("s1", &log), sink("s2", &log)],
    )]);

    write_records(&mut out_binds, &[job("LOB1", LobPayload::Text("text".into()))])
        .await
        .unwrap();

    let events = log_events(&log);
    assert_eq!(events.len(), 2);
    for (event, label) in events.iter().zip(["s1", "s2"]) {
        assert_eq!(
            event,
            &MockEvent::LobWrite {
                label: label.into(),
                bytes: b"text".to_vec(),
                utf8: true,
            }
        );
    }
}

#[tokio::test]
async fn writes_run_in_job_order_across_bind_variables() {
    let log = new_log();
    let mut out_binds: OutBinds = HashMap::from([
        ("a".to_string(), vec![sink("a1", &log), sink("a2", &log)]),
        ("b".to_string(), vec![sink("b1", &log)]),
    ]);

    write_records(
        &mut out_binds,
        &[
            job("a", LobPayload::Text("first".into())),
            job("b", LobPayload::Blob(vec![1])),
        ],
    )
    .await
    .unwrap();

    assert_eq!(written_labels(&log), vec!["a1", "a2", "b1"]);
}

#[tokio::test]
async fn first_write_error_aborts_the_remainder() {
    let log = new_log();
    let mut out_binds: OutBinds = HashMap::from([(
        "LOB1".to_string(),
        vec![
            Box::new(MockLobWrite::failing(
                "s1",
                log.clone(),
                DriverError::new("disk full"),
            )) as Box<dyn LobWrite>,
            sink("s2", &log),
        ],
    )]);

    let err = write_records(&mut out_binds, &[job("LOB1", LobPayload::Text("x".into()))])
        .await
        .unwrap_err();
    assert!(matches!(err, LobMiddlewareError::Driver(e) if e.message == "disk full"));
    assert!(log_events(&log).is_empty());
}

#[tokio::test]
async fn empty_payloads_and_unknown_binds_are_skipped() {
    let log = new_log();
    let mut out_binds: OutBinds = HashMap::from([("known".to_string(), vec![sink("s1", &log)])]);

    write_record(
        &mut out_binds,
        &[
            job("known", LobPayload::Text(String::new())),
            job("unknown", LobPayload::Text("dropped".into())),
        ],
    )
    .await
    .unwrap();
    write_records(
        &mut out_binds,
        &[job("known", LobPayload::Blob(Vec::new()))],
    )
    .await
    .unwrap();

    assert!(log_events(&log).is_empty());
}
