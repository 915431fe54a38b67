use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use crate::constants::{ALIGNMENT, WORD};
use crate::error::AllocError;

/// The backing memory region: a single fixed reservation with an
/// append-only break.
///
/// The region never moves and never shrinks, so byte offsets below the
/// break stay valid for the segment's whole lifetime. All access is
/// offset-based and bounds-checked against the break; an out-of-range
/// offset is heap corruption and panics rather than reading past the
/// reservation.
pub struct Segment {
    ptr: NonNull<u8>,
    layout: Layout,
    brk: usize,
}

impl Segment {
    pub fn new(reserve: usize) -> Result<Segment, AllocError> {
        if reserve == 0 {
            return Err(AllocError::BadRequest);
        }

        let layout =
            Layout::from_size_align(reserve, ALIGNMENT).map_err(|_| AllocError::BadRequest)?;
        let ptr = unsafe { alloc(layout) };

        match NonNull::new(ptr) {
            Some(ptr) => Ok(Segment {
                ptr,
                layout,
                brk: 0,
            }),
            None => Err(AllocError::OutOfMemory),
        }
    }

    /// Moves the break forward by `delta` bytes and returns the old break,
    /// i.e. the offset where the new bytes begin. The admitted bytes are
    /// zeroed; the reservation behind the break is uninitialized and must
    /// never be read.
    pub fn extend(&mut self, delta: usize) -> Result<usize, AllocError> {
        let new_brk = self
            .brk
            .checked_add(delta)
            .ok_or(AllocError::OutOfMemory)?;

        if new_brk > self.layout.size() {
            return Err(AllocError::OutOfMemory);
        }

        let old_brk = self.brk;

        unsafe {
            std::ptr::write_bytes(self.ptr.as_ptr().add(old_brk), 0, delta);
        }

        self.brk = new_brk;

        Ok(old_brk)
    }

    pub fn len(&self) -> usize {
        self.brk
    }

    pub fn reserve(&self) -> usize {
        self.layout.size()
    }

    pub fn read_word(&self, offset: usize) -> u32 {
        self.check_range(offset, WORD);
        debug_assert!(offset % WORD == 0);

        unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read() }
    }

    pub fn write_word(&mut self, offset: usize, word: u32) {
        self.check_range(offset, WORD);
        debug_assert!(offset % WORD == 0);

        unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().write(word) }
    }

    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        self.check_range(offset, len);

        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(offset), len) }
    }

    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        self.check_range(offset, len);

        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr().add(offset), len) }
    }

    /// Copies `len` bytes from one offset to another within the segment.
    pub fn copy(&mut self, src: usize, dst: usize, len: usize) {
        self.check_range(src, len);
        self.check_range(dst, len);

        unsafe {
            let base = self.ptr.as_ptr();
            std::ptr::copy(base.add(src), base.add(dst), len);
        }
    }

    fn check_range(&self, offset: usize, len: usize) {
        let end = offset.checked_add(len);

        assert!(
            end.is_some_and(|end| end <= self.brk),
            "segment access out of range: {offset:#x}+{len} with break at {:#x}",
            self.brk
        );
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}
