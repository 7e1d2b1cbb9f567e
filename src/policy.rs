//! Replacement policy for colliding keys.
//!
//! A resident with priority `p` survives one challenge with probability
//! `1 - 2^-p`. Priority only grows on exact-key hits and resets to 1 when the
//! slot changes hands, so frequently seen keys become hard to evict.

use rand::Rng;

/// How a colliding insert treats the resident key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReplacementMode {
    /// Displace with probability `2^-priority`
    #[default]
    Probabilistic,

    /// Always displace
    Deterministic,
}

/// Probability that a resident with `priority` loses a collision
#[inline]
pub fn displacement_probability(priority: u32) -> f64 {
    // underflows to 0.0 past ~1074, which pins the resident
    (-f64::from(priority)).exp2()
}

/// Decide a probabilistic collision given a uniform draw from `[0, 1)`
#[inline]
pub fn should_displace(priority: u32, draw: f64) -> bool {
    draw < displacement_probability(priority)
}

/// Resolve a collision against a resident with `priority`
///
/// Draws from `rng` only in probabilistic mode.
#[inline]
pub(crate) fn resolve<R: Rng>(mode: ReplacementMode, priority: u32, rng: &mut R) -> bool {
    match mode {
        ReplacementMode::Deterministic => true,
        ReplacementMode::Probabilistic => should_displace(priority, rng.gen::<f64>()),
    }
}
