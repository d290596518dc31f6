//! Conformance checks over the allocation subsystem.
//!
//! Each check exercises one clause of the allocation contract against a
//! fresh allocator or manager and reports `None` on success or a failure
//! detail string.

use pagepool_core::pool::block::{
    BlockAllocator, LINK_SIZE, PAGE_HEADER_SIZE, PATTERN_ALIGN, PATTERN_ALLOC, PATTERN_FREE,
};
use pagepool_core::pool::manager::MemoryManager;
use pagepool_core::pool::size_class::{MAX_BLOCK_SIZE, build_lookup_table};

/// One registered conformance check.
pub struct Check {
    /// Check identifier.
    pub name: &'static str,
    /// Contract clause the check covers.
    pub clause: &'static str,
    /// Returns `None` on success, a failure detail otherwise.
    pub run: fn() -> Option<String>,
}

/// Every conformance check, in execution order.
pub fn all_checks() -> Vec<Check> {
    vec![
        Check {
            name: "lookup_table_monotonic",
            clause: "size-class routing",
            run: lookup_table_monotonic,
        },
        Check {
            name: "round_trip_preserves_free_count",
            clause: "allocate/free accounting",
            run: round_trip_preserves_free_count,
        },
        Check {
            name: "consecutive_allocations_distinct",
            clause: "no aliasing",
            run: consecutive_allocations_distinct,
        },
        Check {
            name: "free_list_conservation",
            clause: "allocate/free accounting",
            run: free_list_conservation,
        },
        Check {
            name: "growth_trigger",
            clause: "page growth",
            run: growth_trigger,
        },
        Check {
            name: "fallback_boundary",
            clause: "general-heap fallback",
            run: fallback_boundary,
        },
        Check {
            name: "fill_pattern_visibility",
            clause: "diagnostic fill",
            run: fill_pattern_visibility,
        },
        Check {
            name: "standalone_allocator_geometry",
            clause: "page/block geometry",
            run: standalone_allocator_geometry,
        },
    ]
}

fn lookup_table_monotonic() -> Option<String> {
    let table = build_lookup_table();
    if table.len() != MAX_BLOCK_SIZE + 1 {
        return Some(format!(
            "table length {} != {}",
            table.len(),
            MAX_BLOCK_SIZE + 1
        ));
    }
    for (size, window) in table.windows(2).enumerate() {
        if window[0] > window[1] {
            return Some(format!(
                "table regresses between sizes {} and {}: {} > {}",
                size,
                size + 1,
                window[0],
                window[1]
            ));
        }
    }
    None
}

fn round_trip_preserves_free_count() -> Option<String> {
    let mut manager = MemoryManager::new();
    manager.initialize();

    for size in [1, 4, 17, 96, 97, 640, 641, MAX_BLOCK_SIZE] {
        // Warm the pool so the measured pair cannot trigger growth.
        let warmup = manager.allocate(size);
        manager.free(warmup, size);

        let Some(pool) = manager.allocator_for(size) else {
            return Some(format!("no allocator configured for size {}", size));
        };
        let before = pool.num_free_blocks();
        let allocation = manager.allocate(size);
        manager.free(allocation, size);
        let Some(pool) = manager.allocator_for(size) else {
            return Some(format!("no allocator configured for size {}", size));
        };
        let after = pool.num_free_blocks();
        if before != after {
            return Some(format!(
                "size {}: free count changed across a round trip ({} -> {})",
                size, before, after
            ));
        }
    }
    None
}

fn consecutive_allocations_distinct() -> Option<String> {
    let mut allocator = BlockAllocator::new(32, 8192, 4);
    let mut seen = Vec::new();
    for step in 0..512 {
        let handle = allocator.allocate();
        if seen.contains(&handle) {
            return Some(format!("allocation {} returned a live handle", step));
        }
        seen.push(handle);
    }
    None
}

fn free_list_conservation() -> Option<String> {
    let mut allocator = BlockAllocator::new(16, 8192, 4);
    let per_page = allocator.blocks_per_page();

    // Saturate one page, then churn without net growth.
    let mut live: Vec<_> = (0..per_page).map(|_| allocator.allocate()).collect();
    for round in 0..64 {
        let Some(handle) = live.pop() else {
            return Some(format!("round {}: no live handle to return", round));
        };
        allocator.free(handle);
        live.push(allocator.allocate());

        let outstanding = live.len();
        if allocator.num_free_blocks() + outstanding != allocator.num_blocks() {
            return Some(format!(
                "round {}: {} free + {} outstanding != {} total",
                round,
                allocator.num_free_blocks(),
                outstanding,
                allocator.num_blocks()
            ));
        }
        if allocator.num_pages() != 1 {
            return Some(format!("round {}: unexpected growth", round));
        }
    }
    None
}

fn growth_trigger() -> Option<String> {
    let mut allocator = BlockAllocator::new(16, 128, 4);
    let per_page = allocator.blocks_per_page();

    for _ in 0..per_page {
        allocator.allocate();
    }
    if allocator.num_pages() != 1 {
        return Some(format!(
            "{} allocations created {} pages, expected 1",
            per_page,
            allocator.num_pages()
        ));
    }

    allocator.allocate();
    if allocator.num_pages() != 2 {
        return Some(format!(
            "{} allocations created {} pages, expected 2",
            per_page + 1,
            allocator.num_pages()
        ));
    }
    None
}

fn fallback_boundary() -> Option<String> {
    let mut manager = MemoryManager::new();
    manager.initialize();

    let boundary = manager.allocate(MAX_BLOCK_SIZE);
    if !boundary.is_pooled() || manager.heap().allocations() != 0 {
        return Some(format!(
            "{}-byte request was not served from a pool",
            MAX_BLOCK_SIZE
        ));
    }
    manager.free(boundary, MAX_BLOCK_SIZE);

    let beyond = manager.allocate(MAX_BLOCK_SIZE + 1);
    if beyond.is_pooled() || manager.heap().allocations() != 1 {
        return Some(format!(
            "{}-byte request was not served from the general heap",
            MAX_BLOCK_SIZE + 1
        ));
    }
    manager.free(beyond, MAX_BLOCK_SIZE + 1);
    if manager.heap().active_count() != 0 {
        return Some("general-heap buffer survived its free".into());
    }
    None
}

fn fill_pattern_visibility() -> Option<String> {
    // payload 10 rounds up to 12: two trailing padding bytes
    let mut allocator = BlockAllocator::with_fill_patterns(10, 128, 4, true);
    let handle = allocator.allocate();

    let bytes = allocator.bytes(handle);
    if !bytes[..10].iter().all(|&b| b == PATTERN_ALLOC) {
        return Some("allocated payload not stamped".into());
    }
    if !bytes[10..].iter().all(|&b| b == PATTERN_ALIGN) {
        return Some("alignment padding not stamped".into());
    }

    allocator.free(handle);
    let bytes = allocator.bytes(handle);
    // The first word of a freed block carries the free-list link.
    if !bytes[LINK_SIZE..10].iter().all(|&b| b == PATTERN_FREE) {
        return Some("freed payload not stamped".into());
    }
    if !bytes[10..].iter().all(|&b| b == PATTERN_ALIGN) {
        return Some("alignment padding lost across free".into());
    }
    None
}

fn standalone_allocator_geometry() -> Option<String> {
    let mut allocator = BlockAllocator::new(16, 128, 4);
    if allocator.block_size() != 16 {
        return Some(format!("block size {}, expected 16", allocator.block_size()));
    }
    let expected_per_page = (128 - PAGE_HEADER_SIZE) / 16;
    if allocator.blocks_per_page() != expected_per_page {
        return Some(format!(
            "{} blocks per page, expected {}",
            allocator.blocks_per_page(),
            expected_per_page
        ));
    }

    let handles: Vec<_> = (0..expected_per_page).map(|_| allocator.allocate()).collect();
    if allocator.num_pages() != 1 {
        return Some("first page split across multiple pages".into());
    }

    allocator.allocate();
    if allocator.num_pages() != 2 {
        return Some("second page not created on demand".into());
    }

    for handle in handles {
        allocator.free(handle);
    }
    if allocator.num_free_blocks() + 1 != allocator.num_blocks() {
        return Some("free accounting off after returning the first page".into());
    }
    if allocator.num_pages() != 2 {
        return Some("pages reclaimed early".into());
    }
    None
}
