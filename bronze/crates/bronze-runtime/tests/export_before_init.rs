//! Export State Before Initialization
//!
//! Kept in its own test binary: no other test may export first.

use bronze_runtime::{export_state, exported_entry, exported_head, internal_head, ExportState};

/// **Invariant verified:** the exported head starts out null and
/// uninitialized, matching the zero-initialized internal head.
#[test]
fn test_exported_head_is_null_before_init() {
    assert_eq!(export_state(), ExportState::Uninitialized);
    assert!(exported_head().is_null());
    assert!(internal_head().is_null());
    assert!(unsafe { exported_entry() }.unwrap().is_none());
}
