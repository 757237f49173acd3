//! Error types.
//!
//! [`SessionError`] covers everything a session command can refuse to do.
//! [`AppError`] is what the binary deals in: it wraps session, config and
//! parsing failures for `?` propagation up to `main`.

use std::fmt;

use image::ImageError;
use thiserror::Error;

/// Reasons the recolor operation refuses a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecolorError {
    #[error("image has no pixels")]
    EmptyImage,

    /// The pixel type has fewer than the three color channels the distance needs.
    #[error("image has {0} channel(s), at least 3 are needed")]
    TooFewChannels(u8),
}

/// Inputs that must be chosen before a recolor can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Image,
    SourceColor,
    TargetColor,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Image => write!(f, "an image"),
            Missing::SourceColor => write!(f, "a color from the image"),
            Missing::TargetColor => write!(f, "a new color"),
        }
    }
}

fn join_missing(missing: &[Missing]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No image loaded. Please open an image first.")]
    NoImage,

    #[error(
        "Please load an image, select a color from the image, and choose a new color (missing: {}).",
        join_missing(.missing)
    )]
    Precondition { missing: Vec<Missing> },

    #[error("point ({x}, {y}) lies outside the {width}x{height} area")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("recolor failed: {0}")]
    Recolor(#[from] RecolorError),

    // Load and Save share a source type, so neither takes #[from].
    #[error("could not open image: {0}")]
    Load(#[source] ImageError),

    #[error("could not save image: {0}")]
    Save(#[source] ImageError),

    #[error("unsupported image format '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("empty color")]
    Empty,

    #[error("invalid hex color '{0}'")]
    Hex(String),

    #[error("invalid color '{0}', expected three values in 0-255")]
    Channel(String),

    #[error("unknown color name '{0}'")]
    UnknownName(String),
}

/// A command-script line that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Color(#[from] ColorParseError),

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("could not read named colors: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}
