//! Error types for scenario building, signing and session handling

use std::io;

/// Result type for scenario operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed lower-level cause kept for diagnostics
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for scenario operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A supplied APDU was not valid hex
    #[error("Invalid APDU hex: {0}")]
    InvalidApduHex(#[source] sicct_apdu_core::Error),

    /// A configured status word was not four hex digits
    #[error("Invalid status word {0:?}")]
    InvalidStatusWord(String),

    /// No private key was loaded before signing
    #[error("Signing unavailable: no private key loaded")]
    SigningUnavailable,

    /// Cryptographic or encoding failure while signing
    #[error("Signing failed: {source}")]
    Signing {
        /// Underlying cause
        source: BoxError,
    },

    /// Private key or certificate chain could not be read
    #[error("Invalid key material: {0}")]
    KeyMaterial(String),

    /// Reading key material from disk failed
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A compact token did not have the expected shape
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// JSON encoding failure
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The card service did not open a session
    #[error("Session open failed: {0}")]
    SessionOpenFailed(String),

    /// Operation requires an open session
    #[error("No open session")]
    NoOpenSession,
}

/// Why a scenario could not be signed
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// No private key was successfully loaded
    #[error("No signing key loaded")]
    Unavailable,

    /// Lower-level failure during signing
    #[error("Signing failed: {source}")]
    Signing {
        /// Underlying cause
        source: BoxError,
    },
}

impl SignError {
    pub(crate) fn signing<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Signing {
            source: source.into(),
        }
    }
}

impl From<SignError> for Error {
    fn from(err: SignError) -> Self {
        match err {
            SignError::Unavailable => Self::SigningUnavailable,
            SignError::Signing { source } => Self::Signing { source },
        }
    }
}
