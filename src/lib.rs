//! A boundary-tag, implicit free list allocator that manages a single
//! contiguous, monotonically growing heap with no help from a host
//! allocator beyond one up-front reservation.
//!
//! Every block embeds its own metadata: a size-and-flag word at each end.
//! The matching header and footer let any operation step to the previous
//! or next block in constant time, so the heap needs no free list
//! pointers at all. Allocation is a first-fit scan, freeing eagerly
//! merges with free neighbors, and the heap grows by fixed chunks when a
//! request finds no fit.
//!
//! A [`Heap`] is an ordinary value. Payloads are named by [`Ptr`] byte
//! offsets and reached through the heap handle, which bounds-checks every
//! access, so a stale or fabricated pointer fails loudly instead of
//! corrupting the heap.
//!
//! ```rust
//! use mortar::Heap;
//!
//! let mut heap = Heap::new().unwrap();
//! let ptr = heap.alloc(64).unwrap();
//!
//! heap.payload_mut(ptr)[..5].copy_from_slice(b"hello");
//! assert_eq!(&heap.payload(ptr)[..5], b"hello");
//!
//! let ptr = heap.realloc(Some(ptr), 128).unwrap();
//! assert_eq!(&heap.payload(ptr)[..5], b"hello");
//!
//! heap.free(ptr);
//! ```
//!
//! The allocator is single threaded. Wrap a `Heap` in a lock if it must
//! be shared, or give each thread its own.

mod config;
mod constants;
mod error;
mod heap;
mod segment;
mod tag;
mod walk;


pub use config::HeapConfig;
pub use error::AllocError;
pub use heap::{Heap, Ptr};
pub use walk::{BlockInfo, Blocks};
