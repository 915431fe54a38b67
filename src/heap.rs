use log::{debug, trace};

use crate::config::HeapConfig;
use crate::constants::{align_up, ALIGNMENT, BOOTSTRAP, DWORD, MIN_BLOCK, OVERHEAD, WORD};
use crate::error::AllocError;
use crate::segment::Segment;
use crate::tag::{self, Tag};

/// Handle to an allocated payload: its byte offset within the heap.
///
/// Offsets stay stable for the payload's whole lifetime because the
/// backing segment never moves. The bytes themselves are reached through
/// [`Heap::payload`] and [`Heap::payload_mut`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Ptr(pub(crate) usize);

impl Ptr {
    pub fn offset(&self) -> usize {
        self.0
    }
}

/// A boundary-tag, implicit free list allocator over one contiguous,
/// monotonically growing heap.
///
/// Block metadata lives inline in the managed bytes: every block starts
/// and ends with a word holding its size and allocation flag, so the
/// previous and next block are reachable in O(1) with no side tables.
/// Free blocks are found by a first-fit scan from the heap start; freeing
/// eagerly merges with free neighbors so no two adjacent free blocks ever
/// survive a public operation.
pub struct Heap {
    segment: Segment,
    /// Prologue payload offset; the first real block begins one overhead
    /// past it.
    base: usize,
    chunk: usize,
}

impl Heap {
    pub fn new() -> Result<Heap, AllocError> {
        Self::with_config(HeapConfig::default())
    }

    /// Bootstraps a heap: alignment padding, an allocated prologue
    /// sentinel, the terminating epilogue, then one chunk of free space.
    pub fn with_config(config: HeapConfig) -> Result<Heap, AllocError> {
        if config.chunk % ALIGNMENT != 0 || config.chunk < MIN_BLOCK {
            return Err(AllocError::BadRequest);
        }

        // Block sizes live in a 32-bit tag word; a reservation the tags
        // cannot describe would truncate silently on the first huge block.
        if config.reserve > tag::SIZE_MASK as usize {
            return Err(AllocError::BadRequest);
        }

        let mut segment = Segment::new(config.reserve)?;
        let start = segment.extend(BOOTSTRAP)?;

        segment.write_word(start, 0);
        segment.write_word(start + WORD, Tag::used(OVERHEAD).pack());
        segment.write_word(start + 2 * WORD, Tag::used(OVERHEAD).pack());
        segment.write_word(start + 3 * WORD, Tag::epilogue().pack());

        let mut heap = Heap {
            segment,
            base: start + DWORD,
            chunk: config.chunk,
        };

        heap.extend_heap(heap.chunk / WORD)?;

        debug!(
            "heap bootstrapped: {} bytes, chunk {}",
            heap.segment.len(),
            heap.chunk
        );

        heap.debug_check();

        Ok(heap)
    }

    /// Allocates `size` payload bytes and returns a handle to them, or
    /// `None` when `size` is zero or the segment is exhausted. Returned
    /// payloads are always 8-byte aligned.
    pub fn alloc(&mut self, size: usize) -> Option<Ptr> {
        if size == 0 {
            return None;
        }

        // A reservation-sized request can never fit once overhead is added;
        // bailing here also keeps the rounding below overflow-free.
        if size > self.segment.reserve() {
            trace!("alloc({size}) failed: larger than the reservation");
            return None;
        }

        let adjusted = if size <= DWORD {
            MIN_BLOCK
        } else {
            align_up(size + OVERHEAD)
        };

        let bp = match self.first_fit(adjusted) {
            Some(bp) => bp,
            None => {
                let grow = adjusted.max(self.chunk);

                match self.extend_heap(grow / WORD) {
                    Ok(bp) => bp,
                    Err(err) => {
                        trace!("alloc({size}) failed: {err}");
                        return None;
                    }
                }
            }
        };

        self.place(bp, adjusted);
        trace!("alloc({size}) -> {adjusted} byte block at {bp:#x}");
        self.debug_check();

        Some(Ptr(bp))
    }

    /// Returns `ptr`'s block to the free list and merges it with any free
    /// neighbor.
    ///
    /// # Panics
    /// Panics when `ptr` does not name a currently allocated block, which
    /// covers double frees and pointers this heap never handed out.
    pub fn free(&mut self, ptr: Ptr) {
        let bp = ptr.0;
        let tag = self.expect_allocated(bp);

        self.set_tags(bp, Tag::free(tag.size));
        self.coalesce(bp);
        trace!("freed {} byte block at {bp:#x}", tag.size);
        self.debug_check();
    }

    /// Moves `ptr`'s payload into a freshly allocated block of `size`
    /// bytes, copying as many bytes as both blocks can hold.
    ///
    /// `None` for `ptr` behaves as [`alloc`](Self::alloc); a zero `size`
    /// behaves as [`free`](Self::free) and returns `None`. On exhaustion
    /// the old block is left untouched and `None` is returned.
    pub fn realloc(&mut self, ptr: Option<Ptr>, size: usize) -> Option<Ptr> {
        let Some(ptr) = ptr else {
            return self.alloc(size);
        };

        if size == 0 {
            self.free(ptr);
            return None;
        }

        let old_payload = self.expect_allocated(ptr.0).size - OVERHEAD;
        let new = self.alloc(size)?;

        self.segment.copy(ptr.0, new.0, old_payload.min(size));
        self.free(ptr);

        Some(new)
    }

    /// Shared view of an allocated payload.
    pub fn payload(&self, ptr: Ptr) -> &[u8] {
        let tag = self.expect_allocated(ptr.0);

        self.segment.bytes(ptr.0, tag.size - OVERHEAD)
    }

    /// Mutable view of an allocated payload. The tags around it are not
    /// reachable through the slice, so callers cannot clobber them.
    pub fn payload_mut(&mut self, ptr: Ptr) -> &mut [u8] {
        let tag = self.expect_allocated(ptr.0);

        self.segment.bytes_mut(ptr.0, tag.size - OVERHEAD)
    }

    /// Total bytes the heap currently owns, sentinels included.
    pub fn size(&self) -> usize {
        self.segment.len()
    }

    /// Bytes held by free blocks, overhead included.
    pub fn free_bytes(&self) -> usize {
        self.blocks()
            .filter(|block| !block.allocated)
            .map(|block| block.size)
            .sum()
    }

    /// First-fit scan from the heap start: the first free block of at
    /// least `size` bytes wins. Returns `None` once the epilogue is hit.
    fn first_fit(&self, size: usize) -> Option<usize> {
        let mut bp = self.base;

        loop {
            let tag = self.head_tag(bp);

            if tag.is_epilogue() {
                return None;
            }

            if !tag.allocated && tag.size >= size {
                return Some(bp);
            }

            bp += tag.size;
        }
    }

    /// Marks `size` bytes of the free block at `bp` allocated. When the
    /// leftover cannot hold its own tags it is absorbed into the
    /// allocation; otherwise it becomes a new free block right after.
    fn place(&mut self, bp: usize, size: usize) {
        let total = self.head_tag(bp).size;
        let remainder = total - size;

        if remainder < MIN_BLOCK {
            self.set_tags(bp, Tag::used(total));
        } else {
            self.set_tags(bp, Tag::used(size));
            self.set_tags(bp + size, Tag::free(remainder));
        }
    }

    /// Grows the heap by `words` words (rounded up to keep the byte count
    /// 8-aligned), lays a free block over the new bytes, re-terminates
    /// with a fresh epilogue, and merges with a free tail if one was
    /// there. Returns the resulting free block.
    fn extend_heap(&mut self, words: usize) -> Result<usize, AllocError> {
        let words = if words % 2 == 0 { words } else { words + 1 };
        let size = words * WORD;

        // The new block's header lands on the old epilogue word.
        let bp = self.segment.extend(size)?;

        self.set_tags(bp, Tag::free(size));
        self.segment.write_word(bp + size - WORD, Tag::epilogue().pack());

        debug!("heap extended by {size} bytes to {}", self.segment.len());

        Ok(self.coalesce(bp))
    }

    /// Merges the free block at `bp` with free immediate neighbors and
    /// returns the merged block. The prologue and epilogue carry the
    /// allocated flag, so the boundaries need no special cases.
    fn coalesce(&mut self, bp: usize) -> usize {
        let size = self.head_tag(bp).size;
        let prev = self.tag_at(bp - OVERHEAD);
        let next = self.head_tag(bp + size);

        match (prev.allocated, next.allocated) {
            (true, true) => bp,
            (false, true) => {
                let merged = prev.size + size;
                let prev_bp = bp - prev.size;

                self.segment.write_word(prev_bp - WORD, Tag::free(merged).pack());
                self.segment
                    .write_word(bp + size - OVERHEAD, Tag::free(merged).pack());

                prev_bp
            }
            (true, false) => {
                let merged = size + next.size;

                self.set_tags(bp, Tag::free(merged));

                bp
            }
            (false, false) => {
                let merged = prev.size + size + next.size;
                let prev_bp = bp - prev.size;

                self.segment.write_word(prev_bp - WORD, Tag::free(merged).pack());
                self.segment
                    .write_word(bp + size + next.size - OVERHEAD, Tag::free(merged).pack());

                prev_bp
            }
        }
    }

    /// Writes `tag` to both ends of the block at `bp`, header first so a
    /// torn update never shows an allocated block with a stale footer.
    fn set_tags(&mut self, bp: usize, tag: Tag) {
        self.segment.write_word(bp - WORD, tag.pack());
        self.segment
            .write_word(bp + tag.size - OVERHEAD, tag.pack());
    }

    /// Validates that `bp` names a live allocated block before any
    /// operation trusts its tags. Misuse panics instead of corrupting
    /// the heap.
    fn expect_allocated(&self, bp: usize) -> Tag {
        assert!(
            bp % ALIGNMENT == 0 && bp >= self.first_block() && bp < self.segment.len(),
            "pointer outside the heap: {bp:#x}"
        );

        let head = self.head_tag(bp);

        assert!(
            head.allocated && head.size != 0,
            "double free or foreign pointer at {bp:#x}"
        );
        assert!(
            head.size % ALIGNMENT == 0
                && head.size >= MIN_BLOCK
                && bp + head.size <= self.segment.len(),
            "corrupted header at {bp:#x}"
        );

        let foot = self.tag_at(bp + head.size - OVERHEAD);

        assert!(head == foot, "boundary tags disagree at {bp:#x}");

        head
    }

    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        self.check();
    }

    pub(crate) fn base(&self) -> usize {
        self.base
    }

    pub(crate) fn first_block(&self) -> usize {
        self.base + OVERHEAD
    }

    pub(crate) fn end(&self) -> usize {
        self.segment.len()
    }

    pub(crate) fn tag_at(&self, offset: usize) -> Tag {
        Tag::unpack(self.segment.read_word(offset))
    }

    pub(crate) fn head_tag(&self, bp: usize) -> Tag {
        self.tag_at(bp - WORD)
    }
}
