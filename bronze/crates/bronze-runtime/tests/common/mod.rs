//! Test Utilities for the Root Chain Export Tests
//!
//! The chain heads are process-wide, and the test harness runs tests of one
//! binary on parallel threads. Every test that touches the heads goes
//! through [`ChainFixture`], which serializes them and resets the internal
//! head before and after.

#![allow(dead_code)]

use bronze_runtime::{set_internal_head, ShimConfig, ShimLogger, StackEntry};
use parking_lot::{const_mutex, Mutex, MutexGuard};
use std::io::{self, Write};
use std::mem::align_of;
use std::ptr;
use std::sync::Arc;

static SERIAL: Mutex<()> = const_mutex(());

/// ============================================================================
/// CHAIN FIXTURE
/// ============================================================================

/// Exclusive use of the process-wide chain heads for one test
pub struct ChainFixture {
    _serial: MutexGuard<'static, ()>,
}

impl ChainFixture {
    /// Lock the heads and start from an empty internal chain
    pub fn new() -> Self {
        let serial = SERIAL.lock();
        unsafe { set_internal_head(ptr::null_mut()) };
        Self { _serial: serial }
    }

    /// Simulate an instrumented prologue/epilogue moving the head
    pub fn set_head(&self, head: *mut StackEntry) {
        unsafe { set_internal_head(head) };
    }
}

impl Drop for ChainFixture {
    fn drop(&mut self) {
        unsafe { set_internal_head(ptr::null_mut()) };
    }
}

/// Pointer value that is aligned like a stack entry; never dereferenced
pub fn fake_entry(address: usize) -> *mut StackEntry {
    (address & !(align_of::<StackEntry>() - 1)) as *mut StackEntry
}

/// ============================================================================
/// OUTPUT CAPTURE
/// ============================================================================

/// Writer that keeps everything written to it
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logger writing into a buffer the test can inspect
pub fn capturing_logger(config: ShimConfig) -> (ShimLogger, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (ShimLogger::with_writer(config, buffer.clone()), buffer)
}

/// Logger with default config that discards output
pub fn quiet_logger() -> ShimLogger {
    ShimLogger::with_writer(ShimConfig::default(), io::sink())
}
