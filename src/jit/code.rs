//! Finalized code wrapper
//!
//! [`CompiledCode`] owns an executable [`Buffer`] and exposes its base
//! address as the entry function. Keeping the buffer inside the wrapper
//! ties the mapping's lifetime to every outstanding way of calling it.

use super::buffer::{Buffer, BufferState};

/// Signature of a compiled entry point: heap base in, tagged value out.
pub type EntryFn = unsafe extern "C" fn(u64) -> u64;

/// An executable program.
pub struct CompiledCode {
    buf: Buffer,
}

impl CompiledCode {
    /// Wrap a finalized buffer. Panics if the buffer is still writable.
    pub fn new(buf: Buffer) -> CompiledCode {
        assert!(
            buf.state() == BufferState::Executable,
            "buffer must be made executable before wrapping"
        );
        CompiledCode { buf }
    }

    /// Invoke the entry point.
    ///
    /// # Safety
    /// - The buffer must begin with a complete function compiled by this
    ///   crate (ending in `ret`).
    /// - `heap_base` must point to a writable region of at least 16 bytes
    ///   per pair the program allocates.
    /// - The generated code assumes exclusive use of the heap; concurrent
    ///   calls need disjoint heaps.
    pub unsafe fn call(&self, heap_base: u64) -> u64 {
        let entry: EntryFn = std::mem::transmute(self.buf.as_ptr());
        entry(heap_base)
    }
}

impl std::fmt::Debug for CompiledCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledCode")
            .field("entry", &self.buf.as_ptr())
            .field("len", &self.buf.len())
            .finish()
    }
}
