//! Direct-mapped bucket table.
//!
//! - One slot per bucket, fixed at construction
//! - Priority 0 marks an empty slot, >= 1 an occupied one
//! - Each occupied slot carries the id of its traversal-list node
//! - Version counter bumped whenever the occupant changes

use std::borrow::Borrow;

use crate::list::NodeId;

/// Single bucket slot
pub(crate) struct Slot<K, V> {
    /// Retention priority, 0 when empty
    priority: u32,

    /// Resident key-value pair
    entry: Option<(K, V)>,

    /// Traversal-list node, kept across displacements
    node: Option<NodeId>,

    /// Occupant stamp, strictly increasing so a stamp is never reissued
    version: u64,
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            priority: 0,
            entry: None,
            node: None,
            version: 0,
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        debug_assert_eq!(self.priority > 0, self.entry.is_some());
        self.priority > 0
    }

    #[inline]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(k, _)| k)
    }

    #[inline]
    pub fn entry(&self) -> Option<(&K, &V)> {
        self.entry.as_ref().map(|(k, v)| (k, v))
    }

    #[inline]
    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        self.entry.as_mut().map(|(k, v)| (&*k, v))
    }

    /// Check the slot holds exactly `key`
    #[inline]
    pub fn holds<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.key().is_some_and(|k| k.borrow() == key)
    }
}

/// Fixed-size array of slots
pub(crate) struct BucketTable<K, V> {
    slots: Box<[Slot<K, V>]>,
}

impl<K, V> BucketTable<K, V> {
    /// Allocate `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Slot::empty()).collect(),
        }
    }

    /// Number of buckets
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Bucket index for a hash
    #[inline]
    pub fn index_of(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    pub fn slot(&self, idx: usize) -> &Slot<K, V> {
        &self.slots[idx]
    }

    #[inline]
    pub fn slot_mut(&mut self, idx: usize) -> &mut Slot<K, V> {
        &mut self.slots[idx]
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut Slot<K, V> {
        self.slots.as_mut_ptr()
    }

    /// Fill an empty slot and bind it to its traversal-list node
    ///
    /// # Panics
    /// Debug panics if slot is occupied
    pub fn occupy(&mut self, idx: usize, key: K, value: V, node: NodeId) {
        let slot = &mut self.slots[idx];
        debug_assert!(!slot.is_occupied(), "slot already occupied");

        slot.priority = 1;
        slot.entry = Some((key, value));
        slot.node = Some(node);
        slot.version += 1;
    }

    /// Register a repeated insert of the resident key, returning the new priority
    ///
    /// Priority never exceeds `limit`.
    pub fn bump(&mut self, idx: usize, limit: u32) -> u32 {
        let slot = &mut self.slots[idx];
        debug_assert!(slot.is_occupied(), "slot not occupied");

        if slot.priority < limit {
            slot.priority += 1;
        }
        slot.priority
    }

    /// Hand an occupied slot to a different key, returning the evicted pair
    ///
    /// The node binding is left as is.
    pub fn displace(&mut self, idx: usize, key: K, value: V) -> Option<(K, V)> {
        let slot = &mut self.slots[idx];
        debug_assert!(slot.is_occupied(), "slot not occupied");

        slot.priority = 1;
        slot.version += 1;
        slot.entry.replace((key, value))
    }

    /// Return a slot to empty
    pub fn reset(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        slot.priority = 0;
        slot.entry = None;
        slot.node = None;
        slot.version += 1;
    }

    /// Number of occupied slots, by scanning
    #[cfg(test)]
    pub fn count_occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }
}
