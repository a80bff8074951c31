use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the detection core.
///
/// Configuration and dimension errors are structural: the session cannot
/// continue once one of them is returned.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown region mode `{0}` (expected raw, hull or merge)")]
    UnknownMode(String),

    #[error(
        "frame is {frame_width}x{frame_height} but background is {background_width}x{background_height}"
    )]
    DimensionMismatch {
        frame_width: u32,
        frame_height: u32,
        background_width: u32,
        background_height: u32,
    },

    #[error("debug directory is not empty: {}", .0.display())]
    DebugDirNotEmpty(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DetectionError>;
