//! FFmpeg console verbosity.
//!
//! FFmpeg writes its own diagnostics straight to stderr, independently of the
//! `log` facade this crate uses. [`set_decoder_verbosity`] tunes that output;
//! a command-line front end typically silences everything below errors
//! unless asked to be verbose.

use std::{fmt, str::FromStr};

use ffmpeg_next::util::log::Level;

/// How much FFmpeg prints to stderr while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecoderVerbosity {
    /// Print nothing.
    Quiet,
    /// Recoverable errors and worse.
    #[default]
    Error,
    /// Warnings and worse (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Everything FFmpeg can print, including decoder debugging.
    Debug,
}

impl DecoderVerbosity {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            DecoderVerbosity::Quiet => Level::Quiet,
            DecoderVerbosity::Error => Level::Error,
            DecoderVerbosity::Warning => Level::Warning,
            DecoderVerbosity::Info => Level::Info,
            DecoderVerbosity::Debug => Level::Debug,
        }
    }
}

impl fmt::Display for DecoderVerbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecoderVerbosity::Quiet => "quiet",
            DecoderVerbosity::Error => "error",
            DecoderVerbosity::Warning => "warning",
            DecoderVerbosity::Info => "info",
            DecoderVerbosity::Debug => "debug",
        };
        f.write_str(name)
    }
}

impl FromStr for DecoderVerbosity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(DecoderVerbosity::Quiet),
            "error" => Ok(DecoderVerbosity::Error),
            "warning" | "warn" => Ok(DecoderVerbosity::Warning),
            "info" => Ok(DecoderVerbosity::Info),
            "debug" | "trace" => Ok(DecoderVerbosity::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Set FFmpeg's stderr verbosity for the whole process.
pub fn set_decoder_verbosity(verbosity: DecoderVerbosity) {
    log::debug!("Setting FFmpeg log level to {verbosity}");
    ffmpeg_next::util::log::set_level(verbosity.to_ffmpeg_level());
}
