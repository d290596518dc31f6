//! Size-class table for pooled allocations.
//!
//! Every request up to [`MAX_BLOCK_SIZE`] bytes is served by one of a fixed
//! set of block-size classes, each backed by its own allocator. The table is
//! hand-tuned: fine 4-byte steps where small engine objects cluster, then
//! coarser 32- and 64-byte steps. Requests above the largest class take the
//! general-heap path instead.

/// Number of configured size classes.
pub const NUM_SIZE_CLASSES: usize = 47;

/// Block sizes (bytes) serviced by pooled allocators, strictly increasing.
pub const BLOCK_SIZES: [usize; NUM_SIZE_CLASSES] = [
    // 4-byte increments
    4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60, 64, 68, 72, 76, 80, 84, 88, 92, 96,
    // 32-byte increments
    128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 480, 512, 544, 576, 608, 640,
    // 64-byte increments
    704, 768, 832, 896, 960, 1024,
];

/// Largest request (bytes) served from a pooled allocator.
pub const MAX_BLOCK_SIZE: usize = BLOCK_SIZES[NUM_SIZE_CLASSES - 1];

/// Page size (bytes) shared by every class allocator.
pub const PAGE_SIZE: usize = 8192;

/// Alignment (bytes) shared by every class allocator.
pub const ALIGNMENT: usize = 4;

/// Builds the direct-mapped request-size lookup table.
///
/// The returned table has length `MAX_BLOCK_SIZE + 1`; `table[i]` is the
/// index of the smallest configured block size that can hold an `i`-byte
/// request. Sizes above `MAX_BLOCK_SIZE` are not representable in the table
/// and must be checked by the caller before indexing.
pub fn build_lookup_table() -> Vec<usize> {
    let mut table = Vec::with_capacity(MAX_BLOCK_SIZE + 1);
    let mut class = 0;
    for size in 0..=MAX_BLOCK_SIZE {
        if size > BLOCK_SIZES[class] {
            class += 1;
        }
        table.push(class);
    }
    table
}

/// Returns the class index responsible for `size`, or `None` when the
/// request must take the general-heap path.
///
/// Linear scan over the table; the manager keeps a materialized lookup
/// table for its hot path and uses this only as the reference definition.
pub fn class_index(size: usize) -> Option<usize> {
    if size > MAX_BLOCK_SIZE {
        None
    } else {
        BLOCK_SIZES.iter().position(|&block| size <= block)
    }
}
