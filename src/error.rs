//! Error types for `UnorderedBuffer`

/// Errors surfaced by the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The key's bucket is empty or held by a different key
    #[error("key not found")]
    NotFound,

    /// A direct-mapped table needs at least one bucket
    #[error("capacity must be at least 1")]
    ZeroCapacity,

    /// Traversal-list nodes are addressed by `u32`
    #[error("capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge { capacity: usize, max: usize },

    /// An occupied slot always has priority >= 1, so a cap of 0 is meaningless
    #[error("priority cap must be at least 1 (got {cap})")]
    InvalidPriorityCap { cap: u32 },
}

impl BufferError {
    /// Returns `true` for errors raised while building a buffer
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ZeroCapacity | Self::CapacityTooLarge { .. } | Self::InvalidPriorityCap { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BufferError>;
