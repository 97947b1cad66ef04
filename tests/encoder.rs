//! GIF encoder tests.

use image::RgbImage;
use vidgif::{ConversionError, GifSettings, GifWriter, ResizeFilter, encode_gif, resize_frame};

mod common;

use common::{read_gif, synthetic_frame};

fn fast_settings(delay_centiseconds: u16) -> GifSettings {
    GifSettings {
        delay_centiseconds,
        speed: 30,
        ..GifSettings::default()
    }
}

#[test]
fn encodes_frames_in_order_with_delay() {
    let frames: Vec<RgbImage> = (0..6).map(|index| synthetic_frame(40, 24, index)).collect();
    let bytes = encode_gif(Vec::new(), &frames, fast_settings(10)).expect("Failed to encode");

    let (screen, decoded) = read_gif(&bytes);
    assert_eq!(screen, (40, 24));
    assert_eq!(decoded.len(), 6);
    for (width, height, delay) in decoded {
        assert_eq!((width, height), (40, 24));
        assert_eq!(delay, 10);
    }
}

#[test]
fn single_frame_gif() {
    let frames = vec![synthetic_frame(16, 16, 0)];
    let bytes = encode_gif(Vec::new(), &frames, fast_settings(4)).expect("Failed to encode");

    let (_, decoded) = read_gif(&bytes);
    assert_eq!(decoded, vec![(16, 16, 4)]);
}

#[test]
fn empty_sequence_is_rejected() {
    let result = encode_gif(Vec::new(), &[], GifSettings::default());
    assert!(matches!(result, Err(ConversionError::EmptyOutput)));
}

#[test]
fn mismatched_frame_is_rejected() {
    let mut writer =
        GifWriter::new(Vec::new(), 32, 18, fast_settings(10)).expect("Failed to create writer");
    writer
        .write_frame(&synthetic_frame(32, 18, 0))
        .expect("Failed to write matching frame");

    let result = writer.write_frame(&synthetic_frame(18, 32, 1));
    assert!(matches!(result, Err(ConversionError::GifEncodeError(_))));
    assert_eq!(writer.frames_written(), 1);
}

#[test]
fn oversized_dimensions_are_rejected() {
    let result = GifWriter::new(Vec::new(), 70_000, 10, GifSettings::default());
    assert!(matches!(result, Err(ConversionError::GifEncodeError(_))));

    let result = GifWriter::new(Vec::new(), 10, 0, GifSettings::default());
    assert!(matches!(result, Err(ConversionError::GifEncodeError(_))));
}

#[test]
fn incremental_writer_matches_whole_sequence() {
    let frames: Vec<RgbImage> = (0..4).map(|index| synthetic_frame(24, 12, index)).collect();
    let settings = fast_settings(10);

    let whole = encode_gif(Vec::new(), &frames, settings).expect("Failed to encode");

    let mut writer = GifWriter::new(Vec::new(), 24, 12, settings).expect("Failed to create writer");
    for frame in &frames {
        writer.write_frame(frame).expect("Failed to write frame");
    }
    let incremental = writer.finish().expect("Failed to finish");

    assert_eq!(whole, incremental);
}

#[test]
fn resize_to_target_size() {
    let frame = synthetic_frame(192, 108, 0);
    for filter in [ResizeFilter::Nearest, ResizeFilter::CatmullRom, ResizeFilter::Lanczos3] {
        let resized = resize_frame(frame.clone(), 48, 27, filter);
        assert_eq!(resized.dimensions(), (48, 27), "{filter}");
    }

    let unchanged = resize_frame(frame.clone(), 192, 108, ResizeFilter::Gaussian);
    assert_eq!(unchanged, frame);
}
