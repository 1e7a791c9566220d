//! Storage Module - Sized Shadow-Stack Records
//!
//! The code generator lays frame maps and stack entries out as one
//! contiguous region: a fixed header followed by the trailing array. Rust
//! code that builds those records itself (hand-instrumented hosts,
//! interpreters, tests) uses these const-generic twins, whose prefix is
//! identical to [`FrameMap`] / [`StackEntry`].

use std::ffi::c_void;
use std::ptr;

use crate::error::{AbiError, Result};
use crate::layout::{FrameMap, StackEntry};

/// Frame map with `N` metadata entries stored in place
#[repr(C)]
#[derive(Debug)]
pub struct FrameMapStorage<const N: usize> {
    pub num_roots: i32,
    pub num_meta: i32,
    pub meta: [*const c_void; N],
}

impl<const N: usize> FrameMapStorage<N> {
    /// Create a frame map for `num_roots` roots, the first `N` of which
    /// carry the given metadata
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bronze_abi::FrameMapStorage;
    ///
    /// let map = FrameMapStorage::new(3, [std::ptr::null()]).unwrap();
    /// assert_eq!(map.num_roots, 3);
    /// assert_eq!(map.num_meta, 1);
    ///
    /// assert!(FrameMapStorage::new(0, [std::ptr::null()]).is_err());
    /// ```
    pub fn new(num_roots: usize, meta: [*const c_void; N]) -> Result<Self> {
        if N > num_roots {
            return Err(AbiError::MetaExceedsRoots {
                num_meta: N,
                num_roots,
            });
        }
        let num_roots = i32::try_from(num_roots).map_err(|_| AbiError::CountOverflow {
            field: "num_roots",
            value: num_roots,
        })?;

        Ok(Self {
            num_roots,
            num_meta: N as i32,
            meta,
        })
    }

    /// Pointer to this record viewed as a [`FrameMap`]
    pub fn as_frame_map(&self) -> *const FrameMap {
        (self as *const Self).cast()
    }
}

/// Stack entry with `N` root slots stored in place
///
/// The record must not move while it is linked into a chain.
#[repr(C)]
#[derive(Debug)]
pub struct StackEntryStorage<const N: usize> {
    pub next: *mut StackEntry,
    pub map: *const FrameMap,
    pub roots: [*mut c_void; N],
}

impl<const N: usize> StackEntryStorage<N> {
    /// Create an unlinked entry described by `map`
    pub fn new(map: *const FrameMap, roots: [*mut c_void; N]) -> Self {
        Self {
            next: ptr::null_mut(),
            map,
            roots,
        }
    }

    /// Link this entry to its caller's entry
    pub fn set_next(&mut self, next: *mut StackEntry) {
        self.next = next;
    }

    /// Pointer to this record viewed as a [`StackEntry`]
    pub fn as_stack_entry(&mut self) -> *mut StackEntry {
        (self as *mut Self).cast()
    }
}
