//! A fixed-capacity, direct-mapped hash buffer with probabilistic replacement.
//!
//! Each bucket holds at most one entry. A key that collides with a different
//! resident key displaces it with probability `2^-priority`, where the
//! resident's priority counts how often its own key was inserted. Frequently
//! seen keys therefore stick, rare ones churn, and every operation is a single
//! hash plus one slot probe.
//!
//! ```
//! use unordered_buffer::{ReplacementMode, UnorderedBuffer};
//!
//! let mut buffer = UnorderedBuffer::new(1024);
//! buffer.insert("alpha", 1);
//! buffer.insert("alpha", 2); // bumps priority, keeps value 1
//!
//! assert_eq!(buffer.at(&"alpha"), Ok(&1));
//! assert_eq!(buffer.count(&"beta"), 0);
//!
//! let outcome = buffer.emplace("beta", 3, ReplacementMode::Deterministic);
//! assert!(outcome.inserted());
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod iter;
pub mod policy;
pub mod table;

mod bucket;
mod list;

#[cfg(test)]
mod proptests;

pub use crate::{
    config::{BufferConfig, MAX_CAPACITY},
    cursor::{Cursor, Position, Range},
    error::{BufferError, Result},
    iter::{Iter, IterMut, Keys, Values, ValuesMut},
    policy::{displacement_probability, should_displace, ReplacementMode},
    table::{InsertOutcome, Insertion, UnorderedBuffer},
};
