//! # pagepool-core
//!
//! Page-based, size-class-segregated block allocation for engine subsystems.
//!
//! The crate provides a fixed-size [`BlockAllocator`](pool::block::BlockAllocator)
//! that grows by whole pages and serves allocate/free in O(1), and a
//! [`MemoryManager`](pool::manager::MemoryManager) that routes requests to a
//! per-size-class allocator array, falling back to a general-heap registry for
//! oversized requests. No `unsafe` code is permitted at the crate level: page
//! memory is owned `Box<[u8]>` buffers and callers hold opaque handles instead
//! of raw pointers.

#![deny(unsafe_code)]

pub mod global;
pub mod pool;
pub mod runtime;

pub use pool::block::{BlockAllocator, BlockHandle};
pub use pool::heap::{HeapAllocator, HeapHandle};
pub use pool::manager::{
    Allocation, Lifecycle, ManagerEvent, ManagerEventKind, ManagerStats, MemoryManager,
};
pub use runtime::{ModuleHost, RuntimeModule};
