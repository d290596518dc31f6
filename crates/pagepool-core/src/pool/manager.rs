//! Request routing across the size-class pools and the general heap.
//!
//! [`MemoryManager`] is the single entry point engine subsystems allocate
//! through. A direct-mapped lookup table sends each request to the best-fit
//! [`BlockAllocator`]; requests above the largest class go to the
//! [`HeapAllocator`] with their exact size. The manager keeps no
//! per-allocation metadata: callers return the handle together with the
//! original request size, and routing is re-derived from that size alone.

use super::block::{BlockAllocator, BlockHandle};
use super::heap::{HeapAllocator, HeapHandle};
use super::size_class::{ALIGNMENT, BLOCK_SIZES, MAX_BLOCK_SIZE, PAGE_SIZE, build_lookup_table};
use crate::runtime::RuntimeModule;

/// Lifecycle state of a [`MemoryManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed but not initialized, or finalized.
    Uninitialized,
    /// Serving requests.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AllocationRepr {
    /// Served from the size-class pool `class`.
    Pooled { class: usize, block: BlockHandle },
    /// Served from the general heap.
    Heap(HeapHandle),
}

/// Opaque handle returned by [`MemoryManager::allocate`].
///
/// The manager keeps no record of it; the caller passes it back to
/// [`MemoryManager::free`] together with the original request size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation(AllocationRepr);

impl Allocation {
    /// True when the allocation was served from a size-class pool.
    pub fn is_pooled(&self) -> bool {
        matches!(self.0, AllocationRepr::Pooled { .. })
    }
}

/// Running totals for one manager instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Requests served from a size-class pool.
    pub pooled_allocations: u64,
    /// Requests served from the general heap.
    pub heap_allocations: u64,
    /// Frees routed to a size-class pool.
    pub pooled_frees: u64,
    /// Frees routed to the general heap.
    pub heap_frees: u64,
}

/// Event kind recorded in the manager's lifecycle log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerEventKind {
    Initialized,
    Finalized,
    PooledAlloc,
    HeapAlloc,
    PooledFree,
    HeapFree,
    /// A heap-routed free whose handle was not live.
    UnknownHeapFree,
    /// A free whose size routed to a different path than its handle.
    MismatchedFree,
}

/// One record of the in-memory lifecycle log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerEvent {
    /// Monotonic sequence id.
    pub sequence: u64,
    /// What happened.
    pub kind: ManagerEventKind,
    /// Request size, when the event has one.
    pub size: Option<usize>,
    /// Size class involved, when the event has one.
    pub class: Option<usize>,
}

/// Size-class dispatcher over an array of block allocators plus a
/// general-heap fallback.
///
/// Not thread-safe; see [`crate::global`] for the serialized process-wide
/// instance.
pub struct MemoryManager {
    lifecycle: Lifecycle,
    /// Direct-mapped request-size table; empty until initialized.
    lookup: Vec<usize>,
    /// One allocator per size class; empty until initialized.
    allocators: Vec<BlockAllocator>,
    heap: HeapAllocator,
    stats: ManagerStats,
    events: Vec<ManagerEvent>,
    next_sequence: u64,
}

impl MemoryManager {
    /// Creates an uninitialized manager; call
    /// [`initialize`](Self::initialize) before allocating.
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            lookup: Vec::new(),
            allocators: Vec::new(),
            heap: HeapAllocator::new(),
            stats: ManagerStats::default(),
            events: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Builds the lookup table and one allocator per size class.
    ///
    /// Idempotent: a `Ready` manager is left untouched.
    pub fn initialize(&mut self) {
        if self.lifecycle == Lifecycle::Ready {
            return;
        }

        self.lookup = build_lookup_table();
        self.allocators = BLOCK_SIZES
            .iter()
            .map(|&block_size| BlockAllocator::new(block_size, PAGE_SIZE, ALIGNMENT))
            .collect();
        self.heap = HeapAllocator::new();
        self.lifecycle = Lifecycle::Ready;
        self.record(ManagerEventKind::Initialized, None, None);
    }

    /// Drops every allocator, the lookup table, and the heap registry,
    /// returning to `Uninitialized`.
    ///
    /// The manager must be re-initialized before serving requests again.
    /// The lifecycle log survives finalization.
    pub fn finalize(&mut self) {
        self.lookup = Vec::new();
        self.allocators = Vec::new();
        self.heap = HeapAllocator::new();
        self.lifecycle = Lifecycle::Uninitialized;
        self.record(ManagerEventKind::Finalized, None, None);
    }

    /// Reserved periodic hook; deliberately does nothing.
    pub fn tick(&mut self) {}

    /// Returns the allocator responsible for `size`, or `None` when the
    /// request exceeds the largest configured class.
    pub fn allocator_for(&self, size: usize) -> Option<&BlockAllocator> {
        self.class_for(size).map(|class| &self.allocators[class])
    }

    /// Mutable variant of [`allocator_for`](Self::allocator_for).
    pub fn allocator_for_mut(&mut self, size: usize) -> Option<&mut BlockAllocator> {
        self.class_for(size).map(|class| &mut self.allocators[class])
    }

    /// Allocates `size` bytes, routed to the best-fit size class or to the
    /// general heap above [`MAX_BLOCK_SIZE`].
    ///
    /// A pooled block may be larger than requested, up to its class block
    /// size. The handle plus the original `size` must be passed back to
    /// [`free`](Self::free).
    pub fn allocate(&mut self, size: usize) -> Allocation {
        debug_assert_eq!(self.lifecycle, Lifecycle::Ready);

        match self.class_for(size) {
            Some(class) => {
                let block = self.allocators[class].allocate();
                self.stats.pooled_allocations += 1;
                self.record(ManagerEventKind::PooledAlloc, Some(size), Some(class));
                Allocation(AllocationRepr::Pooled { class, block })
            }
            None => {
                let handle = self.heap.allocate(size);
                self.stats.heap_allocations += 1;
                self.record(ManagerEventKind::HeapAlloc, Some(size), None);
                Allocation(AllocationRepr::Heap(handle))
            }
        }
    }

    /// Frees `allocation`, which must have come from
    /// [`allocate`](Self::allocate) on this manager with the same `size`.
    ///
    /// Routing is re-derived from `size` alone; a mismatched size is a
    /// contract violation that release builds do not detect beyond a
    /// lifecycle-log entry.
    pub fn free(&mut self, allocation: Allocation, size: usize) {
        debug_assert_eq!(self.lifecycle, Lifecycle::Ready);

        match (self.class_for(size), allocation.0) {
            (Some(class), AllocationRepr::Pooled { class: handle_class, block }) => {
                debug_assert_eq!(handle_class, class);
                self.allocators[class].free(block);
                self.stats.pooled_frees += 1;
                self.record(ManagerEventKind::PooledFree, Some(size), Some(class));
            }
            (None, AllocationRepr::Heap(handle)) => {
                if self.heap.free(handle) {
                    self.stats.heap_frees += 1;
                    self.record(ManagerEventKind::HeapFree, Some(size), None);
                } else {
                    self.record(ManagerEventKind::UnknownHeapFree, Some(size), None);
                }
            }
            _ => {
                debug_assert!(
                    false,
                    "allocation handle does not match the routing for size {size}"
                );
                self.record(ManagerEventKind::MismatchedFree, Some(size), None);
            }
        }
    }

    /// Read access to an allocation's bytes. Pooled blocks expose their
    /// full class block size; heap buffers expose exactly the requested
    /// size.
    pub fn bytes(&self, allocation: Allocation) -> &[u8] {
        match allocation.0 {
            AllocationRepr::Pooled { class, block } => self.allocators[class].bytes(block),
            AllocationRepr::Heap(handle) => self.heap.bytes(handle),
        }
    }

    /// Mutable access to an allocation's bytes.
    pub fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        match allocation.0 {
            AllocationRepr::Pooled { class, block } => self.allocators[class].bytes_mut(block),
            AllocationRepr::Heap(handle) => self.heap.bytes_mut(handle),
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Running totals.
    pub fn stats(&self) -> ManagerStats {
        self.stats
    }

    /// The general-heap registry, for observability.
    pub fn heap(&self) -> &HeapAllocator {
        &self.heap
    }

    /// A view of the lifecycle log.
    pub fn events(&self) -> &[ManagerEvent] {
        &self.events
    }

    /// Drains the lifecycle log.
    pub fn drain_events(&mut self) -> Vec<ManagerEvent> {
        std::mem::take(&mut self.events)
    }

    fn class_for(&self, size: usize) -> Option<usize> {
        if size > MAX_BLOCK_SIZE || self.lookup.is_empty() {
            None
        } else {
            Some(self.lookup[size])
        }
    }

    fn record(&mut self, kind: ManagerEventKind, size: Option<usize>, class: Option<usize>) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.events.push(ManagerEvent {
            sequence,
            kind,
            size,
            class,
        });
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeModule for MemoryManager {
    fn initialize(&mut self) {
        MemoryManager::initialize(self);
    }

    fn finalize(&mut self) {
        MemoryManager::finalize(self);
    }

    fn tick(&mut self) {
        MemoryManager::tick(self);
    }
}
