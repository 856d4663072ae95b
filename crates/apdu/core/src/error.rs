//! Error type for APDU parsing helpers
//!
//! Decoding of captured payloads never fails (invalid candidates are simply
//! filtered out), so the only errors here come from parsing user supplied
//! text such as hex APDUs and status words.

/// Result type for APDU helpers
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for text level APDU parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input was not valid hex
    #[error("Invalid hex input {input:?}: {source}")]
    InvalidHex {
        /// The offending input, whitespace stripped
        input: String,
        /// Underlying hex error
        source: hex::FromHexError,
    },

    /// Hex input decoded to nothing
    #[error("Empty APDU")]
    EmptyApdu,

    /// Status word is not four hex digits
    #[error("Invalid status word: {0:?}")]
    InvalidStatusWord(String),
}
