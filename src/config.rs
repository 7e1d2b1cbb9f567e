//! Construction-time configuration for `UnorderedBuffer`

use rand::{rngs::StdRng, SeedableRng};

use crate::error::{BufferError, Result};

/// Largest supported bucket count
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Buffer configuration
///
/// Only `capacity` is required. Everything else has a default matching the
/// plain `UnorderedBuffer::new` constructor: unbounded priority growth and an
/// entropy-seeded replacement RNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Number of buckets, fixed for the lifetime of the buffer
    pub capacity: usize,

    /// Upper bound for a slot's priority, `None` for unbounded
    pub max_priority: Option<u32>,

    /// Seed for the replacement RNG, `None` to seed from OS entropy
    pub seed: Option<u64>,
}

impl BufferConfig {
    #[inline]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max_priority: None,
            seed: None,
        }
    }

    /// Cap priority growth at `cap`
    #[inline]
    pub const fn max_priority(mut self, cap: u32) -> Self {
        self.max_priority = Some(cap);
        self
    }

    /// Seed the replacement RNG for reproducible runs
    #[inline]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration can build a buffer
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(BufferError::CapacityTooLarge {
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        if let Some(cap) = self.max_priority {
            if cap == 0 {
                return Err(BufferError::InvalidPriorityCap { cap });
            }
        }
        Ok(())
    }

    /// Largest priority a slot may reach
    #[inline]
    pub(crate) fn priority_limit(&self) -> u32 {
        self.max_priority.unwrap_or(u32::MAX)
    }

    /// Build the replacement RNG described by this configuration
    pub(crate) fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
