// crates/core/tests/poller.rs
//! Polling behavior against a scripted fake server.
//!
//! Each test mounts an ordered sequence of `/job-status/{id}` responses
//! and asserts on the emitted event stream and the terminal outcome. The
//! poll interval is shortened so a full job lifecycle fits in
//! milliseconds; the cadence semantics are interval-count based, not
//! wall-clock based.

use std::time::Duration;

use maskdeck_core::{
    shared_session, with_session, ApiClient, EventStream, JobOutcome, JobPoller, NoticeLevel,
    PollerTask, SharedSession, StepEvent,
};
use maskdeck_types::{JobHandle, StepKind};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_INTERVAL: Duration = Duration::from_millis(25);

/// Poller wired to `server` with the test interval.
fn poller_for(server: &MockServer) -> (JobPoller, EventStream) {
    let (tx, rx) = maskdeck_core::channel();
    let poller =
        JobPoller::new(ApiClient::new(server.uri()), tx).with_interval(TEST_INTERVAL);
    (poller, rx)
}

fn start(
    poller: &JobPoller,
    job_id: &str,
    step: StepKind,
) -> (PollerTask, SharedSession) {
    let session = shared_session();
    let task = poller.start(JobHandle::new(job_id, step), session.clone());
    (task, session)
}

/// Drain every event currently buffered on the stream.
fn drain(rx: &mut EventStream) -> Vec<StepEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn running(progress: u8) -> serde_json::Value {
    json!({"status": "running", "progress": progress, "message": ""})
}

async fn mount_status(server: &MockServer, job_id: &str, body: serde_json::Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/job-status/{job_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

#[tokio::test]
async fn running_responses_never_complete_or_stop_polling() {
    let server = MockServer::start().await;
    mount_status(&server, "job-1", running(30), None).await;

    let (poller, mut rx) = poller_for(&server);
    let (task, _session) = start(&poller, "job-1", StepKind::Masking);

    // The task must still be pending well past several poll cycles.
    let outcome = tokio::time::timeout(TEST_INTERVAL * 8, task.outcome()).await;
    assert!(outcome.is_err(), "poller terminated on a running-only job");

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.len() >= 4,
        "expected repeated polls, saw {}",
        requests.len()
    );

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .all(|e| !matches!(e, StepEvent::Completed { .. } | StepEvent::RetryUnlocked { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, StepEvent::Progress { percent: 30, .. })));
}

#[tokio::test]
async fn completed_job_populates_session_and_stops_fetching() {
    let server = MockServer::start().await;
    mount_status(&server, "job-2", running(40), Some(2)).await;
    mount_status(
        &server,
        "job-2",
        json!({
            "status": "completed",
            "progress": 100,
            "message": "masking done: 2 files",
            "result": {
                "processed_files": [
                    {"original_name": "kim_900101.pdf", "masked_name": "1.pdf", "size": 100},
                    {"original_name": "lee_851231.pdf", "masked_name": "2.pdf", "size": 200}
                ],
                "file_mapping": [
                    {"number": 1, "original_name": "kim_900101.pdf", "masked_name": "1.pdf"},
                    {"number": 2, "original_name": "lee_851231.pdf", "masked_name": "2.pdf"}
                ],
                "total_processed": 2
            }
        }),
        None,
    )
    .await;

    let (poller, mut rx) = poller_for(&server);
    let (task, session) = start(&poller, "job-2", StepKind::Masking);

    let outcome = tokio::time::timeout(TEST_INTERVAL * 40, task.outcome())
        .await
        .expect("poller did not terminate");
    assert_eq!(outcome, JobOutcome::Completed);

    // Result buffers are populated and the active-job slot is cleared.
    with_session(&session, |ctx| {
        assert_eq!(ctx.masked_files().len(), 2);
        assert_eq!(ctx.file_mapping().len(), 2);
        assert_eq!(ctx.file_mapping()[1].masked_name, "2.pdf");
        assert!(ctx.active_job(StepKind::Masking).is_none());
    })
    .unwrap();

    // Idempotent termination: no fetch happens after the terminal poll.
    let fetched = server.received_requests().await.unwrap().len();
    tokio::time::sleep(TEST_INTERVAL * 5).await;
    assert_eq!(server.received_requests().await.unwrap().len(), fetched);

    let events = drain(&mut rx);
    let completions = events
        .iter()
        .filter(|e| matches!(e, StepEvent::Completed { .. }))
        .count();
    assert_eq!(completions, 1);
    // The terminal message surfaces as a single success notice.
    let successes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            StepEvent::Notice {
                level: NoticeLevel::Success,
                text,
                ..
            } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(successes, vec!["masking done: 2 files"]);
    assert!(events
        .iter()
        .any(|e| matches!(e, StepEvent::Progress { percent: 100, step: StepKind::Masking })));
    // Every event belongs to the masking step; the OCR indicator is
    // never touched.
    assert!(events.iter().all(|e| e.step() == StepKind::Masking));
}

#[tokio::test]
async fn fractional_progress_snapshots_drive_the_bar() {
    // The server reports running progress as a raw float; those
    // snapshots must map to progress events, not be dropped as
    // malformed.
    let server = MockServer::start().await;
    mount_status(
        &server,
        "job-f",
        json!({
            "status": "running",
            "progress": 33.33333333333333,
            "message": "1/3 files processed"
        }),
        None,
    )
    .await;

    let (poller, mut rx) = poller_for(&server);
    let (mut task, _session) = start(&poller, "job-f", StepKind::Masking);

    tokio::time::sleep(TEST_INTERVAL * 4).await;
    task.cancel();

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, StepEvent::Progress { percent: 33, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        StepEvent::Notice {
            level: NoticeLevel::Info,
            ..
        }
    )));
    assert!(events.iter().all(|e| !matches!(
        e,
        StepEvent::Notice {
            level: NoticeLevel::Error,
            ..
        }
    )));
}

#[tokio::test]
async fn transport_error_is_invisible_and_polling_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job-status/job-3"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "job-3", running(10), None).await;

    let (poller, mut rx) = poller_for(&server);
    let (mut task, _session) = start(&poller, "job-3", StepKind::Masking);

    tokio::time::sleep(TEST_INTERVAL * 6).await;
    task.cancel();

    let events = drain(&mut rx);
    // No error notice and no state change attributable to the failed poll.
    assert!(events.iter().all(|e| !matches!(
        e,
        StepEvent::Notice {
            level: NoticeLevel::Error,
            ..
        }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, StepEvent::Progress { percent: 10, .. })));
}

#[tokio::test]
async fn malformed_body_is_treated_as_inconclusive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job-status/job-4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "job-4", running(55), None).await;

    let (poller, mut rx) = poller_for(&server);
    let (mut task, _session) = start(&poller, "job-4", StepKind::Masking);

    tokio::time::sleep(TEST_INTERVAL * 6).await;
    task.cancel();

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, StepEvent::Progress { percent: 55, .. })));
    assert!(events.iter().all(|e| !matches!(
        e,
        StepEvent::Notice {
            level: NoticeLevel::Error,
            ..
        }
    )));
}

#[tokio::test]
async fn failed_job_produces_one_error_notice_and_unlocks_retry() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "job-5",
        json!({"status": "failed", "progress": 0, "error": "disk full"}),
        None,
    )
    .await;

    let (poller, mut rx) = poller_for(&server);
    let (task, _session) = start(&poller, "job-5", StepKind::Masking);

    let outcome = tokio::time::timeout(TEST_INTERVAL * 40, task.outcome())
        .await
        .expect("poller did not terminate");
    assert_eq!(
        outcome,
        JobOutcome::Failed {
            error: "disk full".to_string()
        }
    );

    let events = drain(&mut rx);
    let error_notices: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            StepEvent::Notice {
                step,
                level: NoticeLevel::Error,
                text,
            } => Some((*step, text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(error_notices.len(), 1);
    assert_eq!(error_notices[0].0, StepKind::Masking);
    assert!(error_notices[0].1.contains("disk full"));

    let unlocks: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, StepEvent::RetryUnlocked { .. }))
        .collect();
    assert_eq!(unlocks.len(), 1);
    assert_eq!(unlocks[0].step(), StepKind::Masking);

    // No completion, and nothing leaks onto the other step.
    assert!(events
        .iter()
        .all(|e| !matches!(e, StepEvent::Completed { .. })));
    assert!(events.iter().all(|e| e.step() == StepKind::Masking));
}

#[tokio::test]
async fn ocr_polls_surface_current_file_from_the_log() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "ocr-1",
        json!({
            "status": "running",
            "progress": 20,
            "log_output": "===== run start\n[1/3] 1.pdf"
        }),
        Some(2),
    )
    .await;
    mount_status(
        &server,
        "ocr-1",
        json!({
            "status": "running",
            "progress": 60,
            "log_output": "===== run start\n[1/3] 1.pdf\nocr ok\n[2/3] 2.pdf"
        }),
        Some(2),
    )
    .await;
    mount_status(
        &server,
        "ocr-1",
        json!({"status": "completed", "progress": 100}),
        None,
    )
    .await;

    let (poller, mut rx) = poller_for(&server);
    let (task, _session) = start(&poller, "ocr-1", StepKind::Ocr);

    let outcome = tokio::time::timeout(TEST_INTERVAL * 60, task.outcome())
        .await
        .expect("poller did not terminate");
    assert_eq!(outcome, JobOutcome::Completed);

    let events = drain(&mut rx);

    // The waiting state is announced before any file is extracted.
    let first_indicator = events.iter().position(|e| {
        matches!(
            e,
            StepEvent::Waiting { .. } | StepEvent::CurrentFile { .. }
        )
    });
    assert!(matches!(
        first_indicator.map(|i| &events[i]),
        Some(StepEvent::Waiting { .. })
    ));

    let files: Vec<Option<String>> = events
        .iter()
        .filter_map(|e| match e {
            StepEvent::CurrentFile { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();

    // 1.pdf, then 2.pdf, then hidden on completion. The repeated polls
    // of the same log suffix emit no duplicate signals.
    assert_eq!(
        files,
        vec![
            Some("1.pdf".to_string()),
            Some("2.pdf".to_string()),
            None
        ]
    );
    assert!(events.iter().all(|e| e.step() == StepKind::Ocr));
}

#[tokio::test]
async fn dropping_the_task_stops_polling() {
    let server = MockServer::start().await;
    mount_status(&server, "job-6", running(5), None).await;

    let (poller, _rx) = poller_for(&server);
    let (task, _session) = start(&poller, "job-6", StepKind::Masking);

    tokio::time::sleep(TEST_INTERVAL * 3).await;
    drop(task);
    tokio::time::sleep(TEST_INTERVAL).await;

    let fetched = server.received_requests().await.unwrap().len();
    tokio::time::sleep(TEST_INTERVAL * 5).await;
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        fetched,
        "polls continued after the task handle was dropped"
    );
}

#[tokio::test]
async fn concurrent_masking_and_ocr_pollers_stay_disjoint() {
    let server = MockServer::start().await;
    mount_status(&server, "mask-1", running(25), None).await;
    mount_status(
        &server,
        "ocr-2",
        json!({"status": "running", "progress": 75, "log_output": "[1/1] 9.pdf"}),
        None,
    )
    .await;

    let (poller, mut rx) = poller_for(&server);
    let session = shared_session();
    let mut mask_task = poller.start(JobHandle::new("mask-1", StepKind::Masking), session.clone());
    let mut ocr_task = poller.start(JobHandle::new("ocr-2", StepKind::Ocr), session.clone());

    tokio::time::sleep(TEST_INTERVAL * 5).await;
    mask_task.cancel();
    ocr_task.cancel();

    let events = drain(&mut rx);
    for event in &events {
        match event {
            StepEvent::Progress { step, percent } => match step {
                StepKind::Masking => assert_eq!(*percent, 25),
                StepKind::Ocr => assert_eq!(*percent, 75),
            },
            StepEvent::Waiting { step } => assert_eq!(*step, StepKind::Ocr),
            StepEvent::CurrentFile { step, .. } => assert_eq!(*step, StepKind::Ocr),
            _ => {}
        }
    }

    with_session(&session, |ctx| {
        assert_eq!(ctx.active_job(StepKind::Masking), Some("mask-1"));
        assert_eq!(ctx.active_job(StepKind::Ocr), Some("ocr-2"));
    })
    .unwrap();
}
