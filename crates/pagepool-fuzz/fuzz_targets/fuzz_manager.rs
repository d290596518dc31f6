#![no_main]
use libfuzzer_sys::fuzz_target;

use pagepool_core::pool::manager::{Allocation, MemoryManager};
use pagepool_core::pool::size_class::MAX_BLOCK_SIZE;

fuzz_target!(|data: &[u8]| {
    // Parse data as a sequence of allocate/free/tick operations.
    if data.len() < 4 {
        return;
    }

    let mut manager = MemoryManager::new();
    manager.initialize();
    let mut live: Vec<(Allocation, usize)> = Vec::new();

    for chunk in data.chunks(4) {
        if chunk.len() < 4 {
            break;
        }
        let op = chunk[0] % 3;
        let size = u16::from_le_bytes([chunk[1], chunk[2]]) as usize % (MAX_BLOCK_SIZE * 4);

        match op {
            0 => {
                let allocation = manager.allocate(size);
                live.push((allocation, size));
            }
            1 => {
                if let Some((allocation, size)) = live.pop() {
                    manager.free(allocation, size);
                }
            }
            _ => {
                manager.tick();
            }
        }

        let stats = manager.stats();
        assert!(stats.pooled_frees <= stats.pooled_allocations);
        assert!(stats.heap_frees <= stats.heap_allocations);
        let live_heap = live.iter().filter(|(_, size)| *size > MAX_BLOCK_SIZE).count();
        assert_eq!(manager.heap().active_count(), live_heap);
    }

    // Clean up
    for (allocation, size) in live.drain(..) {
        manager.free(allocation, size);
    }
    manager.finalize();
});
