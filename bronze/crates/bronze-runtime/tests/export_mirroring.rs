//! Root Chain Export Tests - Snapshot Semantics
//!
//! These tests pin down what `bronze_init` guarantees and, just as
//! importantly, what it does not:
//! - the exported head equals the internal head at call time, bit for bit
//! - repeated exports with an unchanged head change nothing
//! - later pushes and pops are NOT reflected in the exported head

mod common;

use bronze_abi::{FrameMapStorage, StackEntryStorage};
use bronze_runtime::{
    bronze_init, export_root_chain, export_state, exported_entry, exported_head,
    get_llvm_gc_root_chain, internal_head, ExportState,
};
use common::{fake_entry, quiet_logger, ChainFixture};
use quickcheck_macros::quickcheck;
use std::ptr;

/// ============================================================================
/// MIRRORING
/// ============================================================================

/// **Invariant verified:** for any head value V, export leaves exactly V in
/// the exported head and returns it.
#[quickcheck]
fn prop_export_copies_head_exactly(address: usize) -> bool {
    let fixture = ChainFixture::new();
    let logger = quiet_logger();
    let head = fake_entry(address);
    fixture.set_head(head);

    let copied = export_root_chain(&logger);

    copied == head && exported_head() == head && export_state() == ExportState::Initialized
}

/// **Invariant verified:** an empty stack (null head) is a normal value.
#[test]
fn test_export_of_empty_stack() {
    let fixture = ChainFixture::new();
    let logger = quiet_logger();
    fixture.set_head(fake_entry(0x1000));
    export_root_chain(&logger);

    fixture.set_head(ptr::null_mut());
    let copied = export_root_chain(&logger);

    assert!(copied.is_null());
    assert!(exported_head().is_null());
    assert!(unsafe { exported_entry() }.unwrap().is_none());
}

/// **Invariant verified:** exporting twice with an unchanged head is
/// idempotent.
#[test]
fn test_export_twice_is_idempotent() {
    let fixture = ChainFixture::new();
    let logger = quiet_logger();
    let head = fake_entry(0x7f00_1230);
    fixture.set_head(head);

    let first = export_root_chain(&logger);
    let second = export_root_chain(&logger);

    assert_eq!(first, head);
    assert_eq!(second, head);
    assert_eq!(exported_head(), head);
    assert_eq!(logger.event_count(), 2);
}

/// ============================================================================
/// DIVERGENCE
/// ============================================================================

/// **Invariant verified:** the exported head is a snapshot. A push after
/// export moves the internal head only; a pop does the same. This is the
/// documented behaviour, not a defect.
#[test]
fn test_exported_head_does_not_follow_push_and_pop() {
    let fixture = ChainFixture::new();
    let logger = quiet_logger();

    let map = FrameMapStorage::new(1, [ptr::null()]).unwrap();
    let mut outer = StackEntryStorage::new(map.as_frame_map(), [ptr::null_mut()]);
    let mut inner = StackEntryStorage::new(map.as_frame_map(), [ptr::null_mut()]);

    // main() pushes its frame, then the host exports.
    fixture.set_head(outer.as_stack_entry());
    export_root_chain(&logger);
    assert_eq!(exported_head(), outer.as_stack_entry());

    // A callee pushes.
    inner.set_next(outer.as_stack_entry());
    fixture.set_head(inner.as_stack_entry());
    assert_eq!(internal_head(), inner.as_stack_entry());
    assert_eq!(exported_head(), outer.as_stack_entry());

    // Both frames return.
    fixture.set_head(ptr::null_mut());
    assert!(internal_head().is_null());
    assert_eq!(exported_head(), outer.as_stack_entry());
}

/// **Invariant verified:** the live accessor tracks the internal head while
/// the exported snapshot stays put.
#[test]
fn test_live_accessor_tracks_internal_head() {
    let fixture = ChainFixture::new();
    let logger = quiet_logger();
    fixture.set_head(fake_entry(0x2000));
    export_root_chain(&logger);

    fixture.set_head(fake_entry(0x3000));

    assert_eq!(get_llvm_gc_root_chain(), fake_entry(0x3000));
    assert_eq!(exported_head(), fake_entry(0x2000));
}

/// ============================================================================
/// VIEWS AND C ENTRY POINT
/// ============================================================================

#[test]
fn test_exported_entry_view() {
    let fixture = ChainFixture::new();
    let logger = quiet_logger();

    let root = 0xabc0 as *mut std::ffi::c_void;
    let map = FrameMapStorage::<0>::new(1, []).unwrap();
    let mut entry = StackEntryStorage::new(map.as_frame_map(), [root]);
    fixture.set_head(entry.as_stack_entry());
    export_root_chain(&logger);

    let view = unsafe { exported_entry() }
        .unwrap()
        .expect("exported head is not null");
    assert!(view.is_outermost());
    assert_eq!(view.roots().unwrap(), &[root]);
    assert_eq!(view.map().unwrap().unwrap().meta_for(0), Some(ptr::null()));
}

/// **Invariant verified:** the C entry point performs the same copy.
#[test]
fn test_bronze_init_exports() {
    let fixture = ChainFixture::new();
    let head = fake_entry(0x5550);
    fixture.set_head(head);

    bronze_init();

    assert_eq!(exported_head(), head);
    assert_eq!(export_state(), ExportState::Initialized);
}
