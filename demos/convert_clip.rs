//! Estimate, then convert a clip to GIF with progress output.
//!
//! Usage: `cargo run --example convert_clip -- path/to/video.mov [width] [fps]`

use std::sync::Arc;

use vidgif::{
    ConversionError, ConversionOptions, ConversionRequest, Converter, ProgressCallback,
    ProgressInfo, TargetParameters, VideoFile, estimate_for_file,
};

struct PrintProgress;

impl ProgressCallback for PrintProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.percentage {
            Some(percentage) => println!("{:?}: {percentage:.0}%", info.stage),
            None => println!("{:?}: {} frames", info.stage, info.current),
        }
    }
}

fn main() -> Result<(), ConversionError> {
    let mut args = std::env::args().skip(1);
    let path = args.next().expect("Usage: convert_clip <video_path> [width] [fps]");
    let width = args.next().unwrap_or_else(|| "320".to_string());
    let fps = args.next().unwrap_or_else(|| "10".to_string());

    let metadata = VideoFile::probe(&path)?;
    println!(
        "Input: {}x{} @ {:.2} fps, {:.1}s",
        metadata.width,
        metadata.height,
        metadata.frames_per_second,
        metadata.duration_seconds()
    );

    let target = TargetParameters::parse(&fps, &width)?;
    println!("{}", estimate_for_file(&path, &target)?);

    let request = ConversionRequest::new(&path, "output.gif", target);
    let options = ConversionOptions::new()
        .with_progress(Arc::new(PrintProgress))
        .with_batch_size(10);
    let report = Converter::new(options).convert(&request)?;

    println!(
        "GIF saved to {}: {} frames at {}x{}",
        report.output.display(),
        report.frames_written,
        report.width,
        report.height
    );
    Ok(())
}
