//! Error Module - Shadow-Stack Layout Errors
//!
//! Errors raised when a raw frame map or stack entry is turned into a
//! checked view. The layouts themselves carry no error state; these only
//! surface when externally produced data breaks the layout invariants.

use thiserror::Error;

/// Error type for view construction over shadow-stack records
///
/// # Examples
///
/// ```rust
/// use bronze_abi::AbiError;
///
/// fn describe(err: &AbiError) -> &'static str {
///     match err {
///         AbiError::MetaExceedsRoots { .. } => "corrupt frame map",
///         AbiError::NullPointer { .. } => "missing record",
///         _ => "bad record",
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Null pointer where a record was required
    ///
    /// **When returned:** `from_raw` was handed a null frame map or entry.
    /// A null *chain head* is an empty stack and never reaches a view.
    #[error("Null {what} pointer")]
    NullPointer { what: &'static str },

    /// Record address is not aligned for its type
    ///
    /// **When returned:** the pointer does not satisfy `align_of` of the
    /// record, so it cannot point at code-generator output.
    #[error("Misaligned record: address {address:#x} is not aligned to {alignment} bytes")]
    Misaligned { address: usize, alignment: usize },

    /// A frame map count is negative
    #[error("Negative {field} in frame map: {value}")]
    NegativeCount { field: &'static str, value: i32 },

    /// A count does not fit the `i32` field of a frame map
    #[error("{field} = {value} does not fit in a frame map")]
    CountOverflow { field: &'static str, value: usize },

    /// More metadata entries than roots
    ///
    /// **When returned:** `num_meta > num_roots`, which the code generator
    /// never emits.
    #[error("Frame map declares {num_meta} metadata entries for only {num_roots} roots")]
    MetaExceedsRoots { num_meta: usize, num_roots: usize },
}

impl AbiError {
    /// Check if the error means the record bytes themselves are corrupt
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            AbiError::NegativeCount { .. } | AbiError::MetaExceedsRoots { .. }
        )
    }
}

/// Result type alias for view construction
pub type Result<T> = std::result::Result<T, AbiError>;
