//! Fixed-size block allocation with page-granular growth.
//!
//! A [`BlockAllocator`] services exactly one block size. It grows by whole
//! pages, subdivides each page into back-to-back blocks, and threads every
//! free block onto a LIFO free list stored in the blocks' own bytes: the
//! first word of a free block holds the encoded handle of the next free
//! block. Allocate and free are O(1); pages are only released wholesale, by
//! [`BlockAllocator::free_all`], [`BlockAllocator::reset`], or on drop.
//!
//! Page memory is owned `Box<[u8]>` buffers and blocks are addressed by
//! opaque [`BlockHandle`]s, so the whole module stays within safe slice
//! indexing.

use std::mem;

/// Bytes reserved at the front of every page for the page header.
pub const PAGE_HEADER_SIZE: usize = mem::size_of::<u64>();

/// Bytes a free block needs to store its free-list link word.
pub const LINK_SIZE: usize = mem::size_of::<u64>();

/// Diagnostic stamp for trailing alignment-padding bytes.
pub const PATTERN_ALIGN: u8 = 0xFC;

/// Diagnostic stamp for freshly allocated payload bytes.
pub const PATTERN_ALLOC: u8 = 0xFD;

/// Diagnostic stamp for freed payload bytes.
pub const PATTERN_FREE: u8 = 0xFE;

/// Link word terminating the free list.
const LINK_NONE: u64 = u64::MAX;

/// Opaque handle to one block of a [`BlockAllocator`].
///
/// A handle stays valid until the block is freed or the allocator is reset.
/// Handles must only be passed back to the allocator that produced them;
/// that contract is not checked in release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    /// Index of the owning page.
    page: u32,
    /// Byte offset of the block within its page.
    offset: u32,
}

impl BlockHandle {
    fn encode(self) -> u64 {
        (u64::from(self.page) << 32) | u64::from(self.offset)
    }

    fn decode(word: u64) -> Option<Self> {
        if word == LINK_NONE {
            None
        } else {
            Some(Self {
                page: (word >> 32) as u32,
                offset: word as u32,
            })
        }
    }
}

/// One page: a boxed buffer whose first [`PAGE_HEADER_SIZE`] bytes are the
/// header region, followed by `blocks_per_page` back-to-back blocks.
struct Page {
    bytes: Box<[u8]>,
}

impl Page {
    fn new(page_size: usize) -> Self {
        Self {
            bytes: vec![0u8; page_size].into_boxed_slice(),
        }
    }
}

/// Fixed-size block allocator over a growing list of pages.
///
/// Not thread-safe; wrap in a mutex or keep one instance per thread.
pub struct BlockAllocator {
    /// Every page created since the last reset, in creation order. Pages
    /// are never released individually.
    pages: Vec<Page>,
    /// Head of the LIFO free list, threaded through free-block bytes.
    free_head: Option<BlockHandle>,

    data_size: usize,
    page_size: usize,
    alignment: usize,
    block_size: usize,
    /// Trailing bytes of each block that are alignment padding.
    padding_size: usize,
    blocks_per_page: usize,

    num_pages: usize,
    num_blocks: usize,
    num_free_blocks: usize,

    /// Stamp blocks with diagnostic byte patterns on every state change.
    fill_patterns: bool,
}

impl BlockAllocator {
    /// Creates an allocator for `data_size`-byte objects.
    ///
    /// Diagnostic fill follows the build profile; use
    /// [`with_fill_patterns`](Self::with_fill_patterns) to pin it.
    pub fn new(data_size: usize, page_size: usize, alignment: usize) -> Self {
        Self::with_fill_patterns(data_size, page_size, alignment, cfg!(debug_assertions))
    }

    /// Creates an allocator with diagnostic fill explicitly enabled or
    /// disabled.
    pub fn with_fill_patterns(
        data_size: usize,
        page_size: usize,
        alignment: usize,
        fill_patterns: bool,
    ) -> Self {
        let mut allocator = Self {
            pages: Vec::new(),
            free_head: None,
            data_size: 0,
            page_size: 0,
            alignment: 0,
            block_size: 0,
            padding_size: 0,
            blocks_per_page: 0,
            num_pages: 0,
            num_blocks: 0,
            num_free_blocks: 0,
            fill_patterns,
        };
        allocator.reset(data_size, page_size, alignment);
        allocator
    }

    /// Discards every page, then reconfigures the allocator.
    ///
    /// The discard happens even when the parameters are unchanged.
    /// `alignment` must be a nonzero power of two and `page_size` must hold
    /// the page header plus at least one block; both are checked in debug
    /// builds only.
    pub fn reset(&mut self, data_size: usize, page_size: usize, alignment: usize) {
        self.free_all();

        debug_assert!(alignment.is_power_of_two());

        let payload_size = data_size.max(LINK_SIZE);
        let block_size = align_up(payload_size, alignment);
        debug_assert!(page_size >= PAGE_HEADER_SIZE + block_size);

        self.data_size = data_size;
        self.page_size = page_size;
        self.alignment = alignment;
        self.block_size = block_size;
        self.padding_size = block_size - payload_size;
        self.blocks_per_page = (page_size - PAGE_HEADER_SIZE) / block_size;
    }

    /// Takes one block off the free list, growing by a page if necessary.
    ///
    /// The handle addresses `block_size` bytes; the trailing `padding_size`
    /// bytes are alignment padding. There is no recoverable failure path:
    /// if the underlying heap cannot supply a new page the process aborts.
    pub fn allocate(&mut self) -> BlockHandle {
        let handle = match self.free_head {
            Some(handle) => handle,
            None => self.grow(),
        };
        self.free_head = self.read_link(handle);
        self.num_free_blocks -= 1;

        if self.fill_patterns {
            self.fill_block(handle, PATTERN_ALLOC);
        }

        handle
    }

    /// Returns a block to the head of the free list.
    ///
    /// `handle` must come from [`allocate`](Self::allocate) on this instance
    /// and must not have been freed since; neither is detected in release
    /// builds.
    pub fn free(&mut self, handle: BlockHandle) {
        debug_assert!((handle.page as usize) < self.pages.len());
        debug_assert_eq!((handle.offset as usize - PAGE_HEADER_SIZE) % self.block_size, 0);

        if self.fill_patterns {
            self.fill_block(handle, PATTERN_FREE);
        }
        // The link word overwrites the first bytes of the freed stamp.
        self.write_link(handle, self.free_head);
        self.free_head = Some(handle);
        self.num_free_blocks += 1;
    }

    /// Releases every page and clears all accounting.
    ///
    /// Safe to call on an allocator that never grew.
    pub fn free_all(&mut self) {
        self.pages.clear();
        self.free_head = None;
        self.num_pages = 0;
        self.num_blocks = 0;
        self.num_free_blocks = 0;
    }

    /// Full `block_size`-byte region addressed by `handle`.
    ///
    /// Panics if the handle does not address a block of this allocator.
    pub fn bytes(&self, handle: BlockHandle) -> &[u8] {
        let start = handle.offset as usize;
        &self.pages[handle.page as usize].bytes[start..start + self.block_size]
    }

    /// Mutable access to the region addressed by `handle`.
    pub fn bytes_mut(&mut self, handle: BlockHandle) -> &mut [u8] {
        let start = handle.offset as usize;
        let block_size = self.block_size;
        &mut self.pages[handle.page as usize].bytes[start..start + block_size]
    }

    /// Object size this allocator was configured for.
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    /// Bytes per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Configured alignment.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bytes per block after rounding the payload up to the alignment.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Trailing bytes of each block that are alignment padding.
    pub fn padding_size(&self) -> usize {
        self.padding_size
    }

    /// Blocks carved out of each page.
    pub fn blocks_per_page(&self) -> usize {
        self.blocks_per_page
    }

    /// Pages currently owned.
    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// Total blocks across all pages.
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Blocks currently on the free list.
    pub fn num_free_blocks(&self) -> usize {
        self.num_free_blocks
    }

    /// Blocks currently handed out.
    pub fn num_allocated_blocks(&self) -> usize {
        self.num_blocks - self.num_free_blocks
    }

    /// Whether diagnostic fill is active.
    pub fn fill_patterns(&self) -> bool {
        self.fill_patterns
    }

    /// Creates one page, threads its blocks into a fresh free list in page
    /// order, and returns the new list head.
    fn grow(&mut self) -> BlockHandle {
        debug_assert!(self.blocks_per_page > 0);

        let page = self.pages.len() as u32;
        self.pages.push(Page::new(self.page_size));
        self.num_pages += 1;
        self.num_blocks += self.blocks_per_page;
        self.num_free_blocks += self.blocks_per_page;

        let block_size = self.block_size;
        let handle_at = move |index: usize| BlockHandle {
            page,
            offset: (PAGE_HEADER_SIZE + index * block_size) as u32,
        };

        if self.fill_patterns {
            for index in 0..self.blocks_per_page {
                self.fill_block(handle_at(index), PATTERN_FREE);
            }
        }

        for index in 0..self.blocks_per_page - 1 {
            self.write_link(handle_at(index), Some(handle_at(index + 1)));
        }
        self.write_link(handle_at(self.blocks_per_page - 1), None);

        let head = handle_at(0);
        self.free_head = Some(head);
        head
    }

    fn write_link(&mut self, handle: BlockHandle, next: Option<BlockHandle>) {
        let word = next.map_or(LINK_NONE, BlockHandle::encode);
        self.bytes_mut(handle)[..LINK_SIZE].copy_from_slice(&word.to_le_bytes());
    }

    fn read_link(&self, handle: BlockHandle) -> Option<BlockHandle> {
        let mut word = [0u8; LINK_SIZE];
        word.copy_from_slice(&self.bytes(handle)[..LINK_SIZE]);
        BlockHandle::decode(u64::from_le_bytes(word))
    }

    /// Stamps the payload region with `pattern` and the trailing padding
    /// with [`PATTERN_ALIGN`].
    fn fill_block(&mut self, handle: BlockHandle, pattern: u8) {
        let payload_end = self.block_size - self.padding_size;
        let bytes = self.bytes_mut(handle);
        bytes[..payload_end].fill(pattern);
        bytes[payload_end..].fill(PATTERN_ALIGN);
    }
}

fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_sixteen_byte_blocks() {
        let allocator = BlockAllocator::new(16, 128, 4);
        assert_eq!(allocator.block_size(), 16);
        assert_eq!(allocator.padding_size(), 0);
        assert_eq!(allocator.blocks_per_page(), (128 - PAGE_HEADER_SIZE) / 16);
        assert_eq!(allocator.num_pages(), 0);
    }

    #[test]
    fn test_geometry_payload_never_below_link_size() {
        // A 4-byte object still needs room for the free-list link word.
        let allocator = BlockAllocator::new(4, 8192, 4);
        assert_eq!(allocator.block_size(), 8);
        assert_eq!(allocator.padding_size(), 0);
    }

    #[test]
    fn test_geometry_alignment_padding() {
        // payload 10, rounded to 12: two trailing padding bytes
        let allocator = BlockAllocator::new(10, 128, 4);
        assert_eq!(allocator.block_size(), 12);
        assert_eq!(allocator.padding_size(), 2);
        assert_eq!(allocator.blocks_per_page(), (128 - PAGE_HEADER_SIZE) / 12);
    }

    #[test]
    fn test_allocate_grows_one_page() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        let handle = allocator.allocate();
        assert_eq!(allocator.num_pages(), 1);
        assert_eq!(allocator.num_blocks(), allocator.blocks_per_page());
        assert_eq!(allocator.num_free_blocks(), allocator.blocks_per_page() - 1);
        assert_eq!(allocator.bytes(handle).len(), 16);
    }

    #[test]
    fn test_consecutive_allocations_distinct() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        let a = allocator.allocate();
        let b = allocator.allocate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_page_exhaustion_triggers_growth() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        let per_page = allocator.blocks_per_page();

        let handles: Vec<BlockHandle> = (0..per_page).map(|_| allocator.allocate()).collect();
        assert_eq!(allocator.num_pages(), 1);
        assert_eq!(allocator.num_free_blocks(), 0);

        let extra = allocator.allocate();
        assert_eq!(allocator.num_pages(), 2);
        assert!(handles.iter().all(|&h| h != extra));
    }

    #[test]
    fn test_free_is_lifo() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        let a = allocator.allocate();
        let b = allocator.allocate();

        allocator.free(a);
        allocator.free(b);
        assert_eq!(allocator.allocate(), b);
        assert_eq!(allocator.allocate(), a);
    }

    #[test]
    fn test_round_trip_preserves_free_count() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        let warmup = allocator.allocate();
        allocator.free(warmup);

        let before = allocator.num_free_blocks();
        let handle = allocator.allocate();
        allocator.free(handle);
        assert_eq!(allocator.num_free_blocks(), before);
    }

    #[test]
    fn test_conservation_without_growth() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        let per_page = allocator.blocks_per_page();

        let mut live: Vec<BlockHandle> = (0..per_page).map(|_| allocator.allocate()).collect();
        for _ in 0..3 {
            let handle = live.pop().unwrap();
            allocator.free(handle);
        }
        live.push(allocator.allocate());

        assert_eq!(allocator.num_pages(), 1);
        assert_eq!(
            allocator.num_free_blocks() + live.len(),
            allocator.num_blocks()
        );
        assert_eq!(allocator.num_allocated_blocks(), live.len());
    }

    #[test]
    fn test_free_all_keeps_nothing() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        for _ in 0..20 {
            allocator.allocate();
        }
        assert!(allocator.num_pages() >= 2);

        allocator.free_all();
        assert_eq!(allocator.num_pages(), 0);
        assert_eq!(allocator.num_blocks(), 0);
        assert_eq!(allocator.num_free_blocks(), 0);
    }

    #[test]
    fn test_free_all_on_empty_allocator() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        allocator.free_all();
        assert_eq!(allocator.num_pages(), 0);
    }

    #[test]
    fn test_reset_discards_pages_even_for_same_parameters() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        allocator.allocate();
        assert_eq!(allocator.num_pages(), 1);

        allocator.reset(16, 128, 4);
        assert_eq!(allocator.num_pages(), 0);
        assert_eq!(allocator.num_free_blocks(), 0);
        assert_eq!(allocator.block_size(), 16);
    }

    #[test]
    fn test_reset_reconfigures_geometry() {
        let mut allocator = BlockAllocator::new(16, 128, 4);
        allocator.reset(64, 8192, 8);
        assert_eq!(allocator.block_size(), 64);
        assert_eq!(allocator.blocks_per_page(), (8192 - PAGE_HEADER_SIZE) / 64);
    }

    #[test]
    fn test_fill_pattern_after_allocate() {
        let mut allocator = BlockAllocator::with_fill_patterns(10, 128, 4, true);
        let handle = allocator.allocate();

        let bytes = allocator.bytes(handle);
        assert!(bytes[..10].iter().all(|&b| b == PATTERN_ALLOC));
        assert!(bytes[10..].iter().all(|&b| b == PATTERN_ALIGN));
    }

    #[test]
    fn test_fill_pattern_after_free() {
        let mut allocator = BlockAllocator::with_fill_patterns(16, 128, 4, true);
        let handle = allocator.allocate();
        allocator.free(handle);

        // The first word of a freed block carries the free-list link; the
        // freed stamp is visible on the remaining payload bytes.
        let bytes = allocator.bytes(handle);
        assert!(bytes[LINK_SIZE..16].iter().all(|&b| b == PATTERN_FREE));
    }

    #[test]
    fn test_fill_disabled_leaves_bytes_alone() {
        let mut allocator = BlockAllocator::with_fill_patterns(16, 128, 4, false);
        let handle = allocator.allocate();
        allocator.bytes_mut(handle).fill(0xAB);

        let again = {
            allocator.free(handle);
            allocator.allocate()
        };
        assert_eq!(again, handle);
        // Only the link word changed while the block sat on the free list.
        assert!(allocator.bytes(again)[LINK_SIZE..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_caller_bytes_survive_other_allocations() {
        let mut allocator = BlockAllocator::with_fill_patterns(16, 128, 4, true);
        let first = allocator.allocate();
        allocator.bytes_mut(first).fill(0x5A);

        let second = allocator.allocate();
        allocator.free(second);

        assert!(allocator.bytes(first).iter().all(|&b| b == 0x5A));
    }
}
