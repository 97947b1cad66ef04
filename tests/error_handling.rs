//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for unreadable
//! inputs and bad preview requests.

use std::path::Path;

use vidgif::{ConversionError, PREVIEW_HEIGHT, PREVIEW_WIDTH, VideoFile};

mod common;

#[test]
fn open_nonexistent_file() {
    let result = VideoFile::open("this_file_does_not_exist.mp4");
    let error = result.expect_err("opened a file that does not exist");

    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to open video at this_file_does_not_exist.mp4"),
        "Error message should name the path: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mov");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = VideoFile::open(&invalid_file_path);
    assert!(
        matches!(result, Err(ConversionError::UnreadableInput { .. })),
        "Expected unreadable input for garbage file"
    );
}

#[test]
fn convert_invalid_file_writes_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"garbage").expect("Failed to write invalid file");
    let output = temporary_directory.path().join("out.gif");

    let result = vidgif::convert(&invalid_file_path, &output, 10.0, 320);
    assert!(result.is_err());
    assert!(!output.exists());
}

#[test]
fn convert_rejects_bad_parameters_before_opening() {
    let result = vidgif::convert("this_file_does_not_exist.mp4", "out.gif", 0.0, 320);
    assert!(matches!(result, Err(ConversionError::InvalidParameters(_))));

    let result = vidgif::convert("this_file_does_not_exist.mp4", "out.gif", 10.0, 0);
    assert!(matches!(result, Err(ConversionError::InvalidParameters(_))));
}

#[test]
fn preview_rejects_zero_size() {
    let result = vidgif::preview("this_file_does_not_exist.mp4", 0, PREVIEW_HEIGHT);
    assert!(matches!(result, Err(ConversionError::InvalidParameters(_))));
}

#[test]
fn probe_fixture_metadata() {
    let path = common::sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let metadata = VideoFile::probe(path).expect("Failed to probe fixture");
    assert_eq!((metadata.width, metadata.height), (640, 360));
    assert!((metadata.frames_per_second - 30.0).abs() < 0.01);
    assert!((metadata.duration_seconds() - 5.0).abs() < 0.2);
    assert!(metadata.frame_count > 0);
    assert_eq!(metadata.derived_height(320), 180);
}

#[test]
fn preview_fixture() {
    let path = common::sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let image = vidgif::preview(path, PREVIEW_WIDTH, PREVIEW_HEIGHT).expect("Failed to preview");
    assert_eq!(image.dimensions(), (PREVIEW_WIDTH, PREVIEW_HEIGHT));

    let mut video = VideoFile::open(path).expect("Failed to open fixture");
    let first = video.first_frame().expect("Failed to decode first frame");
    assert_eq!(first.dimensions(), (640, 360));
}
