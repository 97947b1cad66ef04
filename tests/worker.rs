//! Background worker tests.

use std::{path::PathBuf, sync::mpsc};

use vidgif::{
    ConversionError, ConversionOptions, ConversionRequest, ConversionStatus, ConversionWorker,
    Converter, TargetParameters,
};

mod common;

use common::{GatedVideo, SyntheticVideo};

fn fast_worker() -> ConversionWorker {
    ConversionWorker::new(Converter::new(ConversionOptions::new().with_quantizer_speed(30)))
}

fn target() -> TargetParameters {
    TargetParameters::new(10.0, 16).expect("valid target")
}

#[test]
fn status_display_text() {
    assert_eq!(ConversionStatus::Idle.to_string(), "");
    assert_eq!(
        ConversionStatus::Processing.to_string(),
        "Processing... This may take a while."
    );
    assert_eq!(
        ConversionStatus::Failed("No frames were retained from the source video".to_string())
            .to_string(),
        "No frames were retained from the source video"
    );
    assert!(!ConversionStatus::Processing.is_finished());
    assert!(ConversionStatus::Failed(String::new()).is_finished());
}

#[test]
fn start_requires_runtime() {
    let worker = ConversionWorker::default();
    let request = ConversionRequest::new("in.mov", "out.gif", target());

    let result = worker.start(request);
    assert!(matches!(result, Err(ConversionError::WorkerFailed(_))));
    assert!(!worker.is_busy());
    assert_eq!(worker.status(), ConversionStatus::Idle);
}

#[tokio::test]
async fn completes_and_records_output() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("done.gif");
    let worker = fast_worker();
    assert_eq!(worker.status(), ConversionStatus::Idle);
    assert_eq!(worker.last_output_directory(), None);

    let task = worker
        .start_source(SyntheticVideo::new(32, 18, 30.0, 30), output.clone(), target())
        .expect("Failed to start");
    let report = task.await.expect("Conversion failed");

    assert_eq!(report.frames_written, 10);
    assert!(output.exists());
    assert!(!worker.is_busy());
    assert_eq!(worker.status(), ConversionStatus::Complete(report));
    assert_eq!(worker.last_output(), Some(output));
    assert_eq!(
        worker.last_output_directory(),
        Some(directory.path().to_path_buf())
    );
}

#[tokio::test]
async fn second_start_rejected_while_busy() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let first_output = directory.path().join("first.gif");
    let second_output = directory.path().join("second.gif");
    let worker = fast_worker();

    let (release, gate) = mpsc::channel();
    let task = worker
        .start_source(
            GatedVideo::new(gate, SyntheticVideo::new(32, 18, 30.0, 30)),
            first_output.clone(),
            target(),
        )
        .expect("Failed to start");

    assert!(worker.is_busy());
    assert_eq!(worker.status(), ConversionStatus::Processing);

    let rejected = worker.start_source(
        SyntheticVideo::new(32, 18, 30.0, 30),
        second_output.clone(),
        target(),
    );
    assert!(matches!(rejected, Err(ConversionError::Busy)));

    release.send(()).expect("Failed to release gate");
    task.await.expect("First conversion failed");

    assert!(first_output.exists());
    assert!(!second_output.exists());

    // Idle again, so a new job is accepted.
    let task = worker
        .start_source(SyntheticVideo::new(32, 18, 30.0, 30), second_output.clone(), target())
        .expect("Failed to start after completion");
    task.await.expect("Second conversion failed");
    assert!(second_output.exists());
    assert_eq!(worker.last_output(), Some(second_output));
}

#[tokio::test]
async fn failure_is_published() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("empty.gif");
    let worker = fast_worker();
    let mut status = worker.subscribe();

    let task = worker
        .start_source(SyntheticVideo::new(32, 18, 30.0, 0), output.clone(), target())
        .expect("Failed to start");
    let result = task.await;

    assert!(matches!(result, Err(ConversionError::EmptyOutput)));
    assert!(!output.exists());
    assert_eq!(worker.last_output(), None);

    let last = status.borrow_and_update().clone();
    assert_eq!(
        last,
        ConversionStatus::Failed("No frames were retained from the source video".to_string())
    );
}

#[tokio::test]
async fn missing_input_fails_through_task() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output: PathBuf = directory.path().join("never.gif");
    let worker = ConversionWorker::default();

    let request = ConversionRequest::new("this_file_does_not_exist.mov", &output, target());
    let result = worker.start(request).expect("Failed to start").await;

    assert!(matches!(result, Err(ConversionError::UnreadableInput { .. })));
    assert!(!output.exists());
    assert!(matches!(worker.status(), ConversionStatus::Failed(_)));
}

#[tokio::test]
async fn idle_when_finished_status_arrives() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let worker = fast_worker();
    let mut status = worker.subscribe();

    let first = worker
        .start_source(
            SyntheticVideo::new(32, 18, 30.0, 30),
            directory.path().join("one.gif"),
            target(),
        )
        .expect("Failed to start");

    status
        .wait_for(ConversionStatus::is_finished)
        .await
        .expect("Status channel closed");
    assert!(!worker.is_busy());

    // Started from the status notification, before the first task is awaited.
    let second = worker
        .start_source(
            SyntheticVideo::new(32, 18, 30.0, 30),
            directory.path().join("two.gif"),
            target(),
        )
        .expect("Worker still busy after publishing its result");

    first.await.expect("First conversion failed");
    second.await.expect("Second conversion failed");
}
