use crate::constants::{ALIGNMENT, MIN_BLOCK, OVERHEAD};
use crate::heap::Heap;
use crate::tag::Tag;

/// One entry from a heap walk.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Payload offset of the block.
    pub offset: usize,
    /// Whole block size in bytes, tags included.
    pub size: usize,
    pub allocated: bool,
}

/// Address-ordered iterator over every block between the sentinels.
pub struct Blocks<'a> {
    heap: &'a Heap,
    bp: usize,
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let tag = self.heap.head_tag(self.bp);

        if tag.is_epilogue() {
            return None;
        }

        let info = BlockInfo {
            offset: self.bp,
            size: tag.size,
            allocated: tag.allocated,
        };

        self.bp += tag.size;

        Some(info)
    }
}

impl Heap {
    /// Walks the blocks between the sentinels in address order.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            heap: self,
            bp: self.first_block(),
        }
    }

    /// Full structural audit: both sentinels intact, every header agreeing
    /// with its footer, sizes aligned and in bounds, no two adjacent free
    /// blocks, and the walk accounting for every owned byte. Panics on the
    /// first violation. Runs after every mutating operation in debug
    /// builds.
    pub fn check(&self) {
        let prologue = Tag::used(OVERHEAD);

        assert!(
            self.head_tag(self.base()) == prologue && self.tag_at(self.base()) == prologue,
            "prologue clobbered"
        );

        let mut bp = self.first_block();
        let mut prev_free = false;

        loop {
            let head = self.head_tag(bp);

            if head.is_epilogue() {
                assert!(head.allocated, "epilogue lost its allocated flag");
                assert_eq!(bp, self.end(), "blocks do not account for the whole heap");
                return;
            }

            assert!(bp % ALIGNMENT == 0, "misaligned block at {bp:#x}");
            assert!(
                head.size % ALIGNMENT == 0
                    && head.size >= MIN_BLOCK
                    && bp + head.size <= self.end(),
                "bad block size {} at {bp:#x}",
                head.size
            );

            let foot = self.tag_at(bp + head.size - OVERHEAD);

            assert!(head == foot, "header and footer disagree at {bp:#x}");
            assert!(
                !(prev_free && !head.allocated),
                "adjacent free blocks at {bp:#x}"
            );

            prev_free = !head.allocated;
            bp += head.size;
        }
    }
}
