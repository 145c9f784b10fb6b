/// Errors reported by the heap allocators.
///
/// Null or foreign pointers passed to `free`/`detach` are not errors; those
/// calls are silent no-ops.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum HeapError {
    /// Requested size is zero or larger than the heap region.
    #[error("invalid allocation size {0}")]
    InvalidSize(usize),
    /// The address is not the head of a live block in this heap.
    #[error("address {0:#x} is not a live block")]
    InvalidAddress(u64),
    /// Frame acquisition or page mapping failed.
    #[error("out of memory")]
    OutOfMemory,
    /// No free run is large enough, or the block table is exhausted.
    #[error("out of heap space")]
    OutOfSpace,
    /// Shared object lookup missed.
    #[error("shared object not found")]
    NotFound,
    /// The active placement strategy is not implemented by this heap.
    #[error("unsupported placement strategy")]
    UnsupportedStrategy,
    /// The kernel rejected a boundary call.
    #[error("kernel boundary call failed: {0}")]
    Boundary(#[from] BoundaryError),
}

/// Failures reported across the process/kernel boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BoundaryError {
    #[error("shared object already exists")]
    AlreadyExists,
    #[error("shared object not found")]
    NotFound,
    #[error("kernel is out of memory")]
    NoMemory,
    #[error("rejected with code {0}")]
    Rejected(i64),
}

impl BoundaryError {
    /// Decode a negative system call return value.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            -1 => Self::AlreadyExists,
            -2 => Self::NotFound,
            -3 => Self::NoMemory,
            other => Self::Rejected(other),
        }
    }

    /// Encode as a negative system call return value.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::AlreadyExists => -1,
            Self::NotFound => -2,
            Self::NoMemory => -3,
            Self::Rejected(code) => code,
        }
    }
}
