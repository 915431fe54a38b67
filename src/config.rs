use crate::constants::{DEFAULT_CHUNK, DEFAULT_RESERVE};

/// Tuning knobs for a [`Heap`](crate::Heap).
#[derive(Copy, Clone, Debug)]
pub struct HeapConfig {
    /// Upper bound on the bytes the backing segment may ever hold. Once the
    /// heap has grown to the reserve, further growth reports out of memory.
    pub reserve: usize,
    /// Growth increment requested from the segment when no free block
    /// satisfies an allocation. Must be a multiple of 8 and at least one
    /// minimum block. Larger requests grow by the request instead.
    pub chunk: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        HeapConfig {
            reserve: DEFAULT_RESERVE,
            chunk: DEFAULT_CHUNK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ALIGNMENT, MIN_BLOCK};

    #[test]
    fn default_chunk_is_usable() {
        let config = HeapConfig::default();

        assert!(config.chunk % ALIGNMENT == 0);
        assert!(config.chunk >= MIN_BLOCK);
        assert!(config.reserve > config.chunk);
    }
}
