pub const WORD: usize = 4;
pub const DWORD: usize = 8;

/// Payload alignment; also the granularity of every block size.
pub const ALIGNMENT: usize = DWORD;

/// Per-block bookkeeping: one header word plus one footer word.
pub const OVERHEAD: usize = 2 * WORD;

/// Smallest representable block: header + footer + one aligned payload slot.
/// A free block below this could not hold its own tags.
pub const MIN_BLOCK: usize = 2 * DWORD;

/// Default growth increment requested from the segment when no free block
/// satisfies an allocation.
pub const DEFAULT_CHUNK: usize = 1 << 8;

/// Bootstrap footprint: padding word, prologue header, prologue footer,
/// epilogue word.
pub const BOOTSTRAP: usize = 4 * WORD;

/// Default cap on the backing segment.
pub const DEFAULT_RESERVE: usize = 1 << 20;

/// Rounds `size` up to the nearest multiple of [`ALIGNMENT`].
pub const fn align_up(size: usize) -> usize {
    (size + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}
