//! Root Chain - Process-Wide Shadow-Stack Heads
//!
//! Two globals of type `*mut StackEntry` live here:
//!
//! - `llvm_gc_root_chain` - the head the code generator's prologue and
//!   epilogue push to and pop from. This crate only reads it.
//! - `llvm_gc_root_chain_bronze_ref` - the head this library exports to
//!   other linkage units. It is written once per [`crate::export_root_chain`]
//!   call and is a snapshot, not an alias.
//!
//! The two names differ on purpose: the code generator declares its global
//! with a structural type, and a nominally typed declaration of the same
//! name would collide with it.
//!
//! ## Linking
//!
//! With the `external-root-chain` feature the internal head is resolved
//! from instrumented objects. Without it this crate defines the
//! zero-initialized head itself, which is what the code generator would
//! emit, so hand-instrumented hosts and tests link without LLVM output.
//!
//! ## Threading
//!
//! The chain is a plain global list with no synchronization. One mutator
//! and one collector use it in strict stop-the-world alternation; they may
//! be different threads, but never at the same time. Debug builds check
//! this: every accessor enters a [`ChainAccess`] and overlapping entry from
//! a second thread panics. The C entry points report it on stderr instead,
//! since they cannot unwind. Release builds compile the check away.

use std::marker::PhantomData;
use std::ptr;

use bronze_abi::{StackEntry, StackEntryRef};

use crate::error::Result;

/// Symbol name of the code generator's chain head
pub const INTERNAL_SYMBOL: &str = "llvm_gc_root_chain";

/// Symbol name of the exported chain head
pub const EXPORTED_SYMBOL: &str = "llvm_gc_root_chain_bronze_ref";

#[cfg(not(feature = "external-root-chain"))]
#[no_mangle]
#[allow(non_upper_case_globals)]
pub static mut llvm_gc_root_chain: *mut StackEntry = ptr::null_mut();

#[cfg(feature = "external-root-chain")]
#[allow(non_upper_case_globals)]
extern "C" {
    static mut llvm_gc_root_chain: *mut StackEntry;
}

/// Exported chain head. Initialized so it is a regular, not a common, symbol.
#[no_mangle]
#[allow(non_upper_case_globals)]
pub static mut llvm_gc_root_chain_bronze_ref: *mut StackEntry = ptr::null_mut();

#[cfg(debug_assertions)]
mod owner {
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static OWNER: AtomicUsize = AtomicUsize::new(0);
    static NEXT_TOKEN: AtomicUsize = AtomicUsize::new(1);

    thread_local! {
        static TOKEN: usize = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        static DEPTH: Cell<usize> = const { Cell::new(0) };
    }

    /// Claim the chain for this thread, or name the thread holding it.
    pub(super) fn claim() -> Result<(), usize> {
        DEPTH.with(|depth| {
            if depth.get() == 0 {
                let me = TOKEN.with(|token| *token);
                OWNER.compare_exchange(0, me, Ordering::Acquire, Ordering::Relaxed)?;
            }
            depth.set(depth.get() + 1);
            Ok(())
        })
    }

    /// Drop one claim; the chain is free again once the last one is gone.
    pub(super) fn release() {
        DEPTH.with(|depth| {
            let remaining = depth.get() - 1;
            depth.set(remaining);
            if remaining == 0 {
                OWNER.store(0, Ordering::Release);
            }
        });
    }
}

/// Exclusive use of the root chain by the current thread
///
/// A collector holds this across a scan. Guards nest on one thread and may
/// be dropped in any order; the chain stays claimed until the last one is
/// gone.
#[must_use = "the chain is only claimed while the guard is alive"]
pub struct ChainAccess {
    _not_send: PhantomData<*const ()>,
}

impl ChainAccess {
    #[cfg(debug_assertions)]
    fn enter() -> Result<Self> {
        owner::claim().map_err(|holder| crate::error::RuntimeError::ConcurrentAccess { holder })?;
        Ok(ChainAccess {
            _not_send: PhantomData,
        })
    }

    #[cfg(not(debug_assertions))]
    fn enter() -> Result<Self> {
        Ok(ChainAccess {
            _not_send: PhantomData,
        })
    }
}

impl Drop for ChainAccess {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        owner::release();
    }
}

/// Enter the chain
///
/// # Panics
///
/// In debug builds, if another thread is inside the chain at the same time.
pub fn exclusive() -> ChainAccess {
    match try_exclusive() {
        Ok(access) => access,
        Err(e) => panic!("{}", e),
    }
}

/// Enter the chain, reporting overlapping use instead of panicking
///
/// Always succeeds in release builds.
pub fn try_exclusive() -> Result<ChainAccess> {
    ChainAccess::enter()
}

/// Entry for the C entry points, which must not unwind: overlapping use is
/// written to stderr and the caller proceeds unchecked.
pub(crate) fn enter_or_report() -> Option<ChainAccess> {
    match try_exclusive() {
        Ok(access) => Some(access),
        Err(e) => {
            eprintln!("bronze: {}", e);
            None
        },
    }
}

pub(crate) unsafe fn read_internal() -> *mut StackEntry {
    unsafe { ptr::addr_of!(llvm_gc_root_chain).read() }
}

pub(crate) unsafe fn write_exported(head: *mut StackEntry) {
    unsafe { ptr::addr_of_mut!(llvm_gc_root_chain_bronze_ref).write(head) }
}

/// Current value of the code generator's chain head (innermost entry)
pub fn internal_head() -> *mut StackEntry {
    let _access = exclusive();
    unsafe { read_internal() }
}

/// Current value of the exported chain head
///
/// Null until the first export; afterwards the head as of the last export.
pub fn exported_head() -> *mut StackEntry {
    let _access = exclusive();
    unsafe { ptr::addr_of!(llvm_gc_root_chain_bronze_ref).read() }
}

/// Replace the code generator's chain head
///
/// For hosts that push and pop shadow-stack entries themselves.
///
/// # Safety
///
/// `head` must be null or point at a stack entry that stays valid until it
/// is popped, and the resulting chain must be acyclic and null-terminated.
pub unsafe fn set_internal_head(head: *mut StackEntry) {
    let _access = exclusive();
    unsafe { ptr::addr_of_mut!(llvm_gc_root_chain).write(head) }
}

/// View of the entry the exported head points at, `None` for an empty stack
///
/// # Safety
///
/// The snapshot goes stale as soon as instrumented code pops the entry it
/// names. The caller must know that entry is still linked for `'a`.
pub unsafe fn exported_entry<'a>() -> Result<Option<StackEntryRef<'a>>> {
    let head = exported_head();
    if head.is_null() {
        return Ok(None);
    }
    Ok(Some(unsafe { StackEntryRef::from_raw(head) }?))
}

/// Live chain head, for collectors linked against this library
///
/// Never panics: overlapping use in debug builds is reported on stderr.
#[no_mangle]
pub extern "C" fn get_llvm_gc_root_chain() -> *mut StackEntry {
    let _access = enter_or_report();
    unsafe { read_internal() }
}
