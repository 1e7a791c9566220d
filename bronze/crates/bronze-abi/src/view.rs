//! View Module - Non-Owning Views over Shadow-Stack Records
//!
//! Frame maps and stack entries are allocated by generated code; the
//! trailing arrays are only reachable through raw pointers and a count that
//! lives in the frame map. The views here pair the record pointer with its
//! validated counts and hand out borrowed slices. They never own, copy or
//! grow the trailing storage.
//!
//! # Example
//!
//! ```rust
//! use bronze_abi::{FrameMapStorage, StackEntryRef, StackEntryStorage};
//! use std::ptr;
//!
//! let map = FrameMapStorage::new(2, [ptr::null()]).unwrap();
//! let mut entry = StackEntryStorage::new(map.as_frame_map(), [ptr::null_mut(); 2]);
//!
//! let view = unsafe { StackEntryRef::from_raw(entry.as_stack_entry()) }.unwrap();
//! assert!(view.is_outermost());
//! assert_eq!(view.roots().unwrap().len(), 2);
//! ```

use std::ffi::c_void;
use std::marker::PhantomData;
use std::mem::align_of;
use std::ptr::{self, NonNull};
use std::slice;

use crate::error::{AbiError, Result};
use crate::layout::{FrameMap, StackEntry};

fn check_aligned<T>(ptr: *const T) -> Result<()> {
    let address = ptr as usize;
    let alignment = align_of::<T>();
    if address & (alignment - 1) != 0 {
        return Err(AbiError::Misaligned { address, alignment });
    }
    Ok(())
}

fn check_count(field: &'static str, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| AbiError::NegativeCount { field, value })
}

/// Borrowed view of one frame map and its metadata entries
#[derive(Debug, Clone, Copy)]
pub struct FrameMapRef<'a> {
    raw: NonNull<FrameMap>,
    num_roots: usize,
    num_meta: usize,
    _marker: PhantomData<&'a FrameMap>,
}

impl<'a> FrameMapRef<'a> {
    /// Create a view of the frame map at `ptr`
    ///
    /// # Returns
    /// `Err` for a null or misaligned pointer, a negative count, or more
    /// metadata entries than roots.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point at a frame map followed by `num_meta`
    /// metadata pointers, readable and unmodified for `'a`.
    pub unsafe fn from_raw(ptr: *const FrameMap) -> Result<Self> {
        let raw = NonNull::new(ptr.cast_mut()).ok_or(AbiError::NullPointer { what: "frame map" })?;
        check_aligned(ptr)?;

        let (num_roots, num_meta) = unsafe { ((*ptr).num_roots, (*ptr).num_meta) };
        let num_roots = check_count("num_roots", num_roots)?;
        let num_meta = check_count("num_meta", num_meta)?;
        if num_meta > num_roots {
            return Err(AbiError::MetaExceedsRoots {
                num_meta,
                num_roots,
            });
        }

        Ok(Self {
            raw,
            num_roots,
            num_meta,
            _marker: PhantomData,
        })
    }

    /// Number of roots in the frame
    pub fn num_roots(&self) -> usize {
        self.num_roots
    }

    /// Number of roots that carry metadata
    pub fn num_meta(&self) -> usize {
        self.num_meta
    }

    /// Metadata entries, in root order
    pub fn meta(&self) -> &'a [*const c_void] {
        // SAFETY: from_raw's contract covers num_meta trailing entries.
        unsafe {
            let first = ptr::addr_of!((*self.raw.as_ptr()).meta).cast::<*const c_void>();
            slice::from_raw_parts(first, self.num_meta)
        }
    }

    /// Metadata for root `index`
    ///
    /// Roots `[0, num_meta)` carry the stored metadata, roots
    /// `[num_meta, num_roots)` carry null, anything past the last root is
    /// `None`.
    pub fn meta_for(&self, index: usize) -> Option<*const c_void> {
        if index < self.num_meta {
            Some(self.meta()[index])
        } else if index < self.num_roots {
            Some(ptr::null())
        } else {
            None
        }
    }

    /// Raw pointer to the frame map
    pub fn as_ptr(&self) -> *const FrameMap {
        self.raw.as_ptr()
    }
}

/// Borrowed view of one stack entry and its root slots
#[derive(Debug, Clone, Copy)]
pub struct StackEntryRef<'a> {
    raw: NonNull<StackEntry>,
    _marker: PhantomData<&'a StackEntry>,
}

impl<'a> StackEntryRef<'a> {
    /// Create a view of the stack entry at `ptr`
    ///
    /// A null chain head is an empty stack; callers check for it before
    /// building a view, so null here is an error.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point at a live stack entry whose `map` is
    /// null or satisfies [`FrameMapRef::from_raw`], followed by
    /// `map.num_roots` root slots. The entry must stay linked (its frame
    /// must not return) for `'a`.
    pub unsafe fn from_raw(ptr: *const StackEntry) -> Result<Self> {
        let raw =
            NonNull::new(ptr.cast_mut()).ok_or(AbiError::NullPointer { what: "stack entry" })?;
        check_aligned(ptr)?;
        Ok(Self {
            raw,
            _marker: PhantomData,
        })
    }

    /// Link to the caller's entry, null for the outermost entry
    pub fn next_ptr(&self) -> *mut StackEntry {
        unsafe { (*self.raw.as_ptr()).next }
    }

    /// Check if this is the outermost entry of the chain
    pub fn is_outermost(&self) -> bool {
        self.next_ptr().is_null()
    }

    /// Frame map describing this entry, `None` when the map pointer is null
    pub fn map(&self) -> Result<Option<FrameMapRef<'a>>> {
        let map = unsafe { (*self.raw.as_ptr()).map };
        if map.is_null() {
            return Ok(None);
        }
        // SAFETY: from_raw's contract covers the map pointer.
        unsafe { FrameMapRef::from_raw(map) }.map(Some)
    }

    /// Root slots of this frame, empty when the entry has no map
    pub fn roots(&self) -> Result<&'a [*mut c_void]> {
        let num_roots = match self.map()? {
            Some(map) => map.num_roots(),
            None => 0,
        };
        // SAFETY: from_raw's contract covers num_roots trailing slots.
        unsafe {
            let first = ptr::addr_of!((*self.raw.as_ptr()).roots).cast::<*mut c_void>();
            Ok(slice::from_raw_parts(first, num_roots))
        }
    }

    /// Raw pointer to the entry
    pub fn as_ptr(&self) -> *const StackEntry {
        self.raw.as_ptr()
    }
}
