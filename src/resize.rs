//! Frame resampling.

use std::{fmt, str::FromStr};

use image::{RgbImage, imageops::FilterType};

/// Resampling filter used to shrink retained frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest neighbour. Fast, blocky.
    Nearest,
    /// Linear (bilinear) filter.
    Triangle,
    /// Cubic filter. This is the default.
    #[default]
    CatmullRom,
    /// Gaussian filter. Soft.
    Gaussian,
    /// Lanczos with window 3. Sharpest, slowest.
    Lanczos3,
}

impl ResizeFilter {
    fn to_filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::CatmullRom => "catmull-rom",
            ResizeFilter::Gaussian => "gaussian",
            ResizeFilter::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "triangle" | "bilinear" | "linear" => Ok(ResizeFilter::Triangle),
            "catmull-rom" | "catmullrom" | "bicubic" | "cubic" => Ok(ResizeFilter::CatmullRom),
            "gaussian" => Ok(ResizeFilter::Gaussian),
            "lanczos3" | "lanczos" => Ok(ResizeFilter::Lanczos3),
            other => Err(format!("unknown resize filter: {other}")),
        }
    }
}

/// Resize `frame` to exactly `width` × `height`.
///
/// Frames already at the target size are returned without resampling.
pub fn resize_frame(frame: RgbImage, width: u32, height: u32, filter: ResizeFilter) -> RgbImage {
    if frame.width() == width && frame.height() == height {
        return frame;
    }
    image::imageops::resize(&frame, width, height, filter.to_filter_type())
}
