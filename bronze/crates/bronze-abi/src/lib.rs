//! bronze-abi - Shadow-Stack Record Layouts
//!
//! LLVM's `shadow-stack` GC strategy keeps GC roots in an explicit linked
//! list threaded through the stack frames of instrumented functions. This
//! crate is the single declaration of the two records that list is made
//! of. Every artifact that touches the chain (the exporting runtime, a
//! collector, a host that pushes frames by hand) depends on it, so the
//! layouts cannot drift between separately linked pieces.
//!
//! ## Records
//!
//! - [`FrameMap`]: per-function constant data, root count plus metadata for
//!   the first `num_meta` roots.
//! - [`StackEntry`]: per-call link, caller pointer plus frame map plus the
//!   root slots themselves.
//!
//! Both end in a variable-length array. [`FrameMapRef`] and
//! [`StackEntryRef`] are borrowed views over that storage;
//! [`FrameMapStorage`] and [`StackEntryStorage`] lay records out from Rust.
//!
//! ## Threading
//!
//! The records carry no synchronization. The chain they form is mutated by
//! one mutator and read by one collector in stop-the-world alternation.

pub mod error;
pub mod layout;
pub mod storage;
pub mod view;

pub use error::{AbiError, Result};
pub use layout::{
    FrameMap, LLVMFrameMap, LLVMStackEntry, StackEntry, FRAME_MAP_HEADER_SIZE, POINTER_SIZE,
    STACK_ENTRY_HEADER_SIZE,
};
pub use storage::{FrameMapStorage, StackEntryStorage};
pub use view::{FrameMapRef, StackEntryRef};
