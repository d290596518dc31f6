//! Process-global memory manager.
//!
//! A single manager shared engine-wide, matching the subsystem's role as a
//! drop-in replacement for the general heap. Access is serialized by one
//! mutex: this is a convenience layer for coarse-grained use, not a
//! concurrent allocator. Threads with allocation-heavy workloads should own
//! their own [`MemoryManager`] instead of contending here.

use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::pool::manager::MemoryManager;

static GLOBAL: OnceLock<Mutex<MemoryManager>> = OnceLock::new();

/// The process-global manager.
///
/// Created uninitialized on first access; callers drive `initialize` and
/// `finalize` explicitly, normally through the engine's module lifecycle.
pub fn global() -> &'static Mutex<MemoryManager> {
    GLOBAL.get_or_init(|| Mutex::new(MemoryManager::new()))
}
