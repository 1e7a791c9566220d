//! Layout Module - Frame Map and Stack Entry Records
//!
//! These are the records LLVM's `shadow-stack` GC strategy emits for every
//! instrumented function. Field order, width and padding are a binary
//! contract with already-compiled code and must never change.
//!
//! # Layout
//!
//! ```text
//! FrameMap (constant data, one per function)
//! ┌───────────┬──────────┬──────────────────────────────┐
//! │ num_roots │ num_meta │ meta[0 .. num_meta]          │
//! │ i32       │ i32      │ *const c_void each           │
//! └───────────┴──────────┴──────────────────────────────┘
//!
//! StackEntry (in the stack frame of every active function)
//! ┌──────────┬──────────┬──────────────────────────────┐
//! │ next     │ map      │ roots[0 .. map.num_roots]    │
//! │ *mut     │ *const   │ *mut c_void each             │
//! └──────────┴──────────┴──────────────────────────────┘
//! ```
//!
//! The trailing arrays are declared with length zero; their real length is
//! read from the frame map. Use [`crate::view`] to look at them.

use std::ffi::c_void;
use std::mem::{align_of, offset_of, size_of};

use static_assertions::const_assert_eq;

/// Size of one pointer slot on the target
pub const POINTER_SIZE: usize = size_of::<*const c_void>();

/// Size of the fixed part of a frame map (two `i32` counts)
pub const FRAME_MAP_HEADER_SIZE: usize = 2 * size_of::<i32>();

/// Size of the fixed part of a stack entry (`next` and `map`)
pub const STACK_ENTRY_HEADER_SIZE: usize = 2 * POINTER_SIZE;

/// The map for a single function's stack frame
///
/// One of these is compiled as constant data into the executable for each
/// instrumented function. Storage of metadata is elided for roots whose
/// `@llvm.gcroot` metadata argument is null, so `num_meta` may be smaller
/// than `num_roots`; the roots with metadata always come first.
#[repr(C)]
#[derive(Debug)]
pub struct FrameMap {
    /// Number of roots in the stack frame
    pub num_roots: i32,
    /// Number of metadata entries; `<= num_roots`
    pub num_meta: i32,
    /// Metadata for each root, `num_meta` entries in place
    pub meta: [*const c_void; 0],
}

/// A link in the dynamic shadow stack
///
/// One of these is embedded in the stack frame of each function on the
/// call stack. Functions push and pop it in their prologue and epilogue.
#[repr(C)]
#[derive(Debug)]
pub struct StackEntry {
    /// Link to the caller's entry, null for the outermost one
    pub next: *mut StackEntry,
    /// Constant frame map describing this frame
    pub map: *const FrameMap,
    /// Stack roots, `map.num_roots` slots in place
    pub roots: [*mut c_void; 0],
}

/// Name of the record in LLVM's `GCFrameMap` header
pub type LLVMFrameMap = FrameMap;

/// Name of the record in LLVM's `GCFrameMap` header
pub type LLVMStackEntry = StackEntry;

const_assert_eq!(offset_of!(FrameMap, num_roots), 0);
const_assert_eq!(offset_of!(FrameMap, num_meta), size_of::<i32>());
const_assert_eq!(offset_of!(FrameMap, meta), FRAME_MAP_HEADER_SIZE);
const_assert_eq!(size_of::<FrameMap>(), FRAME_MAP_HEADER_SIZE);
const_assert_eq!(align_of::<FrameMap>(), align_of::<*const c_void>());

const_assert_eq!(offset_of!(StackEntry, next), 0);
const_assert_eq!(offset_of!(StackEntry, map), POINTER_SIZE);
const_assert_eq!(offset_of!(StackEntry, roots), STACK_ENTRY_HEADER_SIZE);
const_assert_eq!(size_of::<StackEntry>(), STACK_ENTRY_HEADER_SIZE);

impl FrameMap {
    /// Byte size of a frame map carrying `num_meta` metadata entries
    pub const fn size_with_meta(num_meta: usize) -> usize {
        FRAME_MAP_HEADER_SIZE + num_meta * POINTER_SIZE
    }
}

impl StackEntry {
    /// Byte size of a stack entry carrying `num_roots` root slots
    pub const fn size_with_roots(num_roots: usize) -> usize {
        STACK_ENTRY_HEADER_SIZE + num_roots * POINTER_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_map_field_order() {
        assert_eq!(offset_of!(FrameMap, num_roots), 0);
        assert_eq!(offset_of!(FrameMap, num_meta), 4);
        assert_eq!(offset_of!(FrameMap, meta), 8);
        assert_eq!(size_of::<FrameMap>(), 8);
    }

    #[test]
    fn test_stack_entry_field_order() {
        let ptr = size_of::<*const ()>();
        assert_eq!(offset_of!(StackEntry, next), 0);
        assert_eq!(offset_of!(StackEntry, map), ptr);
        assert_eq!(offset_of!(StackEntry, roots), 2 * ptr);
        assert_eq!(size_of::<StackEntry>(), 2 * ptr);
    }

    #[test]
    fn test_trailing_sizes() {
        assert_eq!(FrameMap::size_with_meta(0), 8);
        assert_eq!(FrameMap::size_with_meta(3), 8 + 3 * POINTER_SIZE);
        assert_eq!(StackEntry::size_with_roots(2), 4 * POINTER_SIZE);
    }

    #[test]
    fn test_c_names_alias_layouts() {
        assert_eq!(size_of::<LLVMFrameMap>(), size_of::<FrameMap>());
        assert_eq!(size_of::<LLVMStackEntry>(), size_of::<StackEntry>());
    }
}
