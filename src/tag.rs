use crate::constants::ALIGNMENT;

/// Low three bits of a tag word are flag space; everything above is the
/// block size. Sizes are multiples of 8 so the two never overlap.
pub const SIZE_MASK: u32 = !0x7;
pub const ALLOC_BIT: u32 = 0x1;

/// Decoded view of one boundary tag word.
///
/// Every block stores the same tag twice, in its first word (header) and
/// its last word (footer). `size` counts the whole block, tags included.
/// The heap's terminating epilogue is the one tag with `size == 0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tag {
    pub size: usize,
    pub allocated: bool,
}

impl Tag {
    pub fn free(size: usize) -> Tag {
        debug_assert!(size % ALIGNMENT == 0 && size <= SIZE_MASK as usize);

        Tag {
            size,
            allocated: false,
        }
    }

    pub fn used(size: usize) -> Tag {
        debug_assert!(size % ALIGNMENT == 0 && size <= SIZE_MASK as usize);

        Tag {
            size,
            allocated: true,
        }
    }

    pub fn epilogue() -> Tag {
        Tag {
            size: 0,
            allocated: true,
        }
    }

    pub fn is_epilogue(&self) -> bool {
        self.size == 0
    }

    pub fn pack(self) -> u32 {
        self.size as u32 | self.allocated as u32
    }

    pub fn unpack(word: u32) -> Tag {
        Tag {
            size: (word & SIZE_MASK) as usize,
            allocated: (word & ALLOC_BIT) != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_round_trip() {
        let tags = [Tag::free(16), Tag::used(16), Tag::free(4096), Tag::used(24)];

        for tag in tags {
            assert_eq!(Tag::unpack(tag.pack()), tag);
        }
    }

    #[test]
    fn flag_bits_do_not_leak_into_size() {
        let word = Tag::used(64).pack();

        assert_eq!(word & SIZE_MASK, 64);
        assert_eq!(word & ALLOC_BIT, 1);
    }

    #[test]
    fn epilogue_marker() {
        let epilogue = Tag::epilogue();

        assert!(epilogue.is_epilogue());
        assert!(epilogue.allocated);
        assert_eq!(Tag::unpack(epilogue.pack()), epilogue);
        assert!(!Tag::free(16).is_epilogue());
    }
}
