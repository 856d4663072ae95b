//! Error types for capture reading

use std::io;

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Capture framing that cannot be interpreted at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Source ended before the 4-byte magic number
    #[error("Capture is shorter than its magic number")]
    TruncatedMagic,

    /// Magic number is neither byte order variant
    #[error("Magic number {0:02X?} not recognized")]
    UnrecognizedMagic([u8; 4]),
}

/// Error type for capture operations
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Unparseable capture framing, fatal for the current file
    #[error("Invalid capture file format: {0}")]
    Format(#[from] FormatError),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CaptureError {
    /// Whether this is a framing error rather than an I/O failure
    pub const fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}
