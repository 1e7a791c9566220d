//! Error Module - Runtime Shim Errors
//!
//! Exporting the chain head itself cannot fail. Errors only come from the
//! ambient layers around it:
//!
//! - `Configuration` - unrecognised `BRONZE_LOG_*` environment value
//! - `ConcurrentAccess` - overlapping use of the root chain (debug builds)
//! - `Abi` - a chain pointer that does not form a valid stack entry view
//! - `Io` - the diagnostic line could not be written

use bronze_abi::AbiError;
use thiserror::Error;

/// Main error type for runtime shim operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration error
    ///
    /// **When returned:** an environment variable holds a value outside the
    /// documented set
    ///
    /// **Recovery strategy:** fall back to [`crate::ShimConfig::default`]
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Root chain entered from a second thread while still held
    ///
    /// **When returned:** debug builds only, by [`crate::try_exclusive`]
    ///
    /// **Recovery strategy:** none; the mutator and collector are not
    /// alternating as required
    #[error("shadow-stack root chain entered concurrently (held by thread token {holder})")]
    ConcurrentAccess { holder: usize },

    /// Shadow-stack record error
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Diagnostic output failed
    ///
    /// **Recovery strategy:** report on stderr and continue; the export has
    /// already happened
    #[error("Diagnostic write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for runtime shim operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
