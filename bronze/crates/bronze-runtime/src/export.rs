//! Root Chain Export
//!
//! Copies the code generator's chain head into the exported symbol.
//!
//! The copy is a one-shot snapshot. After it, instrumented functions keep
//! pushing and popping `llvm_gc_root_chain` while
//! `llvm_gc_root_chain_bronze_ref` keeps the value it had at the call, so
//! the two diverge as soon as any instrumented function runs. Collectors
//! that need the live head call `get_llvm_gc_root_chain` or re-export
//! before each scan.

use std::sync::atomic::{AtomicBool, Ordering};

use bronze_abi::StackEntry;

use crate::chain::{self, ChainAccess, EXPORTED_SYMBOL, INTERNAL_SYMBOL};
use crate::logging::{self, ShimEvent, ShimLogger};

static EXPORTED: AtomicBool = AtomicBool::new(false);

/// Export lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    /// The exported head still holds its initial null
    Uninitialized,
    /// The exported head holds the internal head as of the last export
    Initialized,
}

/// Current export lifecycle state
pub fn export_state() -> ExportState {
    if EXPORTED.load(Ordering::Relaxed) {
        ExportState::Initialized
    } else {
        ExportState::Uninitialized
    }
}

/// Copy the internal chain head into the exported head
///
/// Reads `llvm_gc_root_chain` once, writes `llvm_gc_root_chain_bronze_ref`
/// once, then logs the copied address through `logger`. A null head is an
/// empty stack and is copied like any other value.
///
/// # Returns
/// The value now held by the exported head
///
/// # Examples
///
/// ```rust
/// use bronze_runtime::{export_root_chain, exported_head, ShimLogger, ShimConfig};
///
/// let logger = ShimLogger::with_writer(ShimConfig::default(), std::io::sink());
/// let head = export_root_chain(&logger);
/// assert_eq!(exported_head(), head);
/// ```
pub fn export_root_chain(logger: &ShimLogger) -> *mut StackEntry {
    export_with(Some(chain::exclusive()), logger)
}

fn export_with(access: Option<ChainAccess>, logger: &ShimLogger) -> *mut StackEntry {
    let head = {
        let _access = access;
        // SAFETY: the guard, when present, rules out an overlapping push,
        // pop or scan; without it the caller has already reported the overlap.
        unsafe {
            let head = chain::read_internal();
            chain::write_exported(head);
            head
        }
    };
    EXPORTED.store(true, Ordering::Relaxed);

    logger.log(ShimEvent::ChainExported {
        symbol: EXPORTED_SYMBOL,
        source: INTERNAL_SYMBOL,
        address: head as usize,
    });
    head
}

/// Initialize the exported root chain head
///
/// C entry point; writes the diagnostic line through the process-wide
/// logger. Never panics: overlapping use in debug builds is reported on
/// stderr and the export goes ahead.
#[no_mangle]
pub extern "C" fn bronze_init() {
    export_with(chain::enter_or_report(), logging::global());
}
