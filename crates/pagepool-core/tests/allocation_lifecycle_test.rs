//! End-to-end lifecycle tests across the allocation subsystem.

use pagepool_core::pool::block::{BlockAllocator, BlockHandle, PAGE_HEADER_SIZE};
use pagepool_core::pool::manager::{Lifecycle, MemoryManager};
use pagepool_core::pool::size_class::MAX_BLOCK_SIZE;
use pagepool_core::runtime::{ModuleHost, RuntimeModule};

#[test]
fn standalone_allocator_full_lifecycle() {
    let mut allocator = BlockAllocator::new(16, 128, 4);
    assert_eq!(allocator.block_size(), 16);
    let per_page = (128 - PAGE_HEADER_SIZE) / 16;
    assert_eq!(allocator.blocks_per_page(), per_page);

    // Fill the first page: every handle distinct, no second page yet.
    let mut handles: Vec<BlockHandle> = (0..per_page).map(|_| allocator.allocate()).collect();
    for (i, a) in handles.iter().enumerate() {
        for b in handles.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
    assert_eq!(allocator.num_pages(), 1);

    // One more allocation grows a second page.
    handles.push(allocator.allocate());
    assert_eq!(allocator.num_pages(), 2);
    assert_eq!(allocator.num_blocks(), 2 * per_page);

    // Returning everything refills the free list; pages are kept.
    for handle in handles {
        allocator.free(handle);
    }
    assert_eq!(allocator.num_free_blocks(), allocator.num_blocks());
    assert_eq!(allocator.num_pages(), 2);
}

#[test]
fn manager_driven_through_module_lifecycle() {
    let mut manager = MemoryManager::new();

    RuntimeModule::initialize(&mut manager);
    assert_eq!(manager.lifecycle(), Lifecycle::Ready);

    let small = manager.allocate(32);
    let large = manager.allocate(MAX_BLOCK_SIZE + 512);
    assert!(small.is_pooled());
    assert!(!large.is_pooled());

    RuntimeModule::tick(&mut manager);

    manager.free(small, 32);
    manager.free(large, MAX_BLOCK_SIZE + 512);

    RuntimeModule::finalize(&mut manager);
    assert_eq!(manager.lifecycle(), Lifecycle::Uninitialized);
}

#[test]
fn module_host_owns_engine_modules() {
    // The manager participates in a host alongside other modules; the host
    // only needs the trait surface.
    struct NullRenderer {
        ticks: usize,
    }

    impl RuntimeModule for NullRenderer {
        fn initialize(&mut self) {}
        fn finalize(&mut self) {}
        fn tick(&mut self) {
            self.ticks += 1;
        }
    }

    let mut host = ModuleHost::new();
    host.register(Box::new(MemoryManager::new()));
    host.register(Box::new(NullRenderer { ticks: 0 }));

    host.initialize_all();
    for _ in 0..3 {
        host.tick_all();
    }
    host.finalize_all();
}

#[test]
fn caller_data_round_trips_through_manager() {
    let mut manager = MemoryManager::new();
    manager.initialize();

    let allocation = manager.allocate(64);
    manager.bytes_mut(allocation)[..13].copy_from_slice(b"vertex-buffer");
    assert_eq!(&manager.bytes(allocation)[..13], b"vertex-buffer");
    manager.free(allocation, 64);

    manager.finalize();
}
