#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The backing segment cannot supply more bytes.
    #[error("out of memory")]
    OutOfMemory,

    /// A configuration or request the allocator cannot represent.
    #[error("bad request")]
    BadRequest,
}
