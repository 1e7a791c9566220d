//! Bronze Runtime Library
//!
//! Exports the head of LLVM's shadow-stack root chain to other linkage
//! units so an external garbage collector can find the GC roots of code
//! compiled with the `shadow-stack` strategy:
//! - `llvm_gc_root_chain_bronze_ref` - exported snapshot of the chain head
//! - `bronze_init()` - takes the snapshot and logs the captured address
//! - `get_llvm_gc_root_chain()` - live chain head
//!
//! Record layouts come from [`bronze_abi`]. The chain is single-threaded by
//! contract; see [`chain`].

pub mod chain;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;

pub use bronze_abi::{FrameMap, StackEntry};
pub use chain::{
    exclusive, exported_entry, exported_head, get_llvm_gc_root_chain, internal_head,
    set_internal_head, try_exclusive, ChainAccess, EXPORTED_SYMBOL, INTERNAL_SYMBOL,
};
pub use config::{LogFormat, LogSink, ShimConfig};
pub use error::{Result, RuntimeError};
pub use export::{bronze_init, export_root_chain, export_state, ExportState};
pub use logging::{ShimEvent, ShimLogger, DEFAULT_HISTORY_LIMIT};
