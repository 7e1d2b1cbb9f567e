use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash, RandomState},
};

use log::{debug, trace};
use rand::{rngs::StdRng, Rng};

use crate::{
    bucket::BucketTable,
    config::BufferConfig,
    cursor::{Cursor, Position, Range},
    error::{BufferError, Result},
    iter::{Iter, IterMut, Keys, Values, ValuesMut},
    list::TraversalList,
    policy::{self, ReplacementMode},
};

/// What an insert did to its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Insertion {
    /// The bucket was empty and now holds the key
    Occupied,

    /// The key was already resident; its priority went up, the value was kept
    Matched,

    /// A different resident key was evicted in favour of the new one
    Displaced,

    /// A different resident key won the collision and stays
    Retained,
}

/// Result of an insert: where the bucket's entry lives and what happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsertOutcome {
    pub position: Position,
    pub kind: Insertion,
}

impl InsertOutcome {
    /// `true` if the supplied key now owns the bucket with the supplied value
    #[inline]
    pub fn inserted(&self) -> bool {
        matches!(self.kind, Insertion::Occupied | Insertion::Displaced)
    }

    /// Split into `(position, inserted)`
    #[inline]
    pub fn into_pair(self) -> (Position, bool) {
        (self.position, self.inserted())
    }
}

/// A fixed-capacity, direct-mapped hash buffer
///
/// Every bucket holds at most one entry. When two distinct keys map to the same
/// bucket they compete for it: a resident with priority `p` is displaced with
/// probability `2^-p`, and its priority grows each time its own key is inserted
/// again. Iteration follows a separate linked order in which buckets appear the
/// first time they are occupied, newest first.
pub struct UnorderedBuffer<K, V, S = RandomState, R = StdRng> {
    table: BucketTable<K, V>,
    list: TraversalList,
    hash_builder: S,
    rng: R,
    config: BufferConfig,
}

impl<K, V> UnorderedBuffer<K, V, RandomState, StdRng> {
    /// Create an empty buffer with `capacity` buckets
    ///
    /// # Panics
    /// Panics if `capacity` is 0 or above [`MAX_CAPACITY`](crate::MAX_CAPACITY)
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, RandomState::new())
    }

    /// Create an empty buffer from a configuration
    #[inline]
    pub fn with_config(config: BufferConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, S> UnorderedBuffer<K, V, S, StdRng> {
    /// Create an empty buffer with `capacity` buckets and provided hasher
    ///
    /// # Panics
    /// Panics if `capacity` is 0 or above [`MAX_CAPACITY`](crate::MAX_CAPACITY)
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        match Self::with_config_and_hasher(BufferConfig::new(capacity), hash_builder) {
            Ok(buffer) => buffer,
            Err(err) => panic!("invalid buffer capacity: {err}"),
        }
    }

    /// Create an empty buffer from a configuration and provided hasher
    pub fn with_config_and_hasher(config: BufferConfig, hash_builder: S) -> Result<Self> {
        config.validate()?;
        let rng = config.make_rng();
        Self::from_parts(config, hash_builder, rng)
    }
}

impl<K, V, S, R> UnorderedBuffer<K, V, S, R> {
    /// Create an empty buffer with caller-supplied hasher and replacement RNG
    ///
    /// `config.seed` is ignored, `rng` is used as is.
    pub fn from_parts(config: BufferConfig, hash_builder: S, rng: R) -> Result<Self> {
        config.validate()?;
        debug!(
            "creating buffer: capacity={}, max_priority={:?}",
            config.capacity, config.max_priority
        );

        Ok(Self {
            table: BucketTable::new(config.capacity),
            list: TraversalList::with_capacity(config.capacity),
            hash_builder,
            rng,
            config,
        })
    }

    /// Returns the number of entries in the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Alias of [`len`](Self::len)
    #[inline]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the buffer holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the number of buckets, which bounds the number of entries
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the largest number of entries the buffer can hold
    #[inline]
    pub fn max_size(&self) -> usize {
        self.capacity()
    }

    /// Returns the number of buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.capacity()
    }

    /// Returns a reference to the hasher
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the configuration the buffer was built with
    #[inline]
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Iterate entries in traversal order
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.list, &self.table)
    }

    /// Iterate entries in traversal order with mutable values
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&self.list, &mut self.table)
    }

    /// Iterate keys in traversal order
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Iterate values in traversal order
    #[inline]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Iterate mutable values in traversal order
    #[inline]
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Cursor on the first entry, or the end if empty
    #[inline]
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.list, &self.table, self.list.head())
    }

    /// Cursor on the last entry, or the end if empty
    #[inline]
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.list, &self.table, self.list.tail())
    }

    /// Cursor on the end position
    #[inline]
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.list, &self.table, None)
    }

    /// Cursor on `position`, `None` if its occupant has since changed
    pub fn cursor_at(&self, position: Position) -> Option<Cursor<'_, K, V>> {
        position
            .is_live(&self.list, &self.table)
            .then(|| Cursor::new(&self.list, &self.table, Some(position.node)))
    }

    /// Entry at `position`, `None` if its occupant has since changed
    pub fn get_position(&self, position: Position) -> Option<(&K, &V)> {
        if position.is_live(&self.list, &self.table) {
            self.table.slot(position.slot).entry()
        } else {
            None
        }
    }

    /// Clears the buffer, emptying every bucket
    ///
    /// Runs in time proportional to the number of entries, not the capacity.
    pub fn clear(&mut self) {
        debug!("clearing buffer: {} entries", self.list.len());
        for idx in self.list.slots() {
            self.table.reset(idx);
        }
        self.list.clear();
    }

    /// Assert the bucket table and traversal list agree
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.list.len(), self.table.count_occupied());
        assert_eq!(self.iter().count(), self.list.len());
        assert_eq!(self.iter().rev().count(), self.list.len());

        let mut seen = vec![false; self.capacity()];
        let mut node = self.list.head();
        while let Some(id) = node {
            let idx = self.list.slot(id);
            assert!(!seen[idx], "bucket {idx} linked twice");
            seen[idx] = true;

            let slot = self.table.slot(idx);
            assert!(slot.priority() >= 1, "linked bucket {idx} is empty");
            assert_eq!(slot.node(), Some(id), "bucket {idx} bound to wrong node");
            node = self.list.next(id);
        }
        for (idx, linked) in seen.into_iter().enumerate() {
            assert_eq!(linked, self.table.slot(idx).is_occupied());
        }
    }
}

impl<K, V, S, R> UnorderedBuffer<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Raw hash of `key`, before reduction to a bucket index
    #[inline]
    pub fn bucket<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.hash_builder.hash_one(key)
    }

    /// Bucket index `key` maps to
    #[inline]
    pub fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.index_of(self.bucket(key))
    }

    /// Bucket index holding `key`, if resident
    #[inline]
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.bucket_index(key);
        self.table.slot(idx).holds(key).then_some(idx)
    }

    /// Returns a reference to the value associated with the given key
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for the given key
    #[inline]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.find(key)?;
        self.table.slot(idx).entry()
    }

    /// Returns a mutable reference to the value associated with the given key
    ///
    /// Does not touch the entry's priority.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.find(key)?;
        self.table.slot_mut(idx).entry_mut().map(|(_, v)| v)
    }

    /// Returns the value for `key`
    ///
    /// Fails with [`BufferError::NotFound`] whether the bucket is empty or
    /// held by another key.
    #[inline]
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(BufferError::NotFound)
    }

    /// Mutable counterpart of [`at`](Self::at)
    #[inline]
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).ok_or(BufferError::NotFound)
    }

    /// Return `true` if the buffer contains a value for the given key
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Number of entries for `key`: 1 if resident, else 0
    #[inline]
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.contains_key(key))
    }

    /// Current retention priority of `key`, `None` if not resident
    #[inline]
    pub fn priority<Q>(&self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|idx| self.table.slot(idx).priority())
    }

    /// Range of entries matching `key`
    ///
    /// Holds the single entry when `key` is resident, otherwise `[end, end)`.
    pub fn equal_range<Q>(&self, key: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find(key).and_then(|idx| self.table.slot(idx).node()) {
            Some(node) => {
                let start = Cursor::new(&self.list, &self.table, Some(node));
                let mut end = start;
                end.move_next();
                Range::new(start, end)
            }
            None => Range::new(self.cursor_end(), self.cursor_end()),
        }
    }
}

impl<K, V, S, R> UnorderedBuffer<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
    R: Rng,
{
    /// Inserts a key-value pair, resolving collisions probabilistically
    ///
    /// See [`emplace`](Self::emplace).
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> InsertOutcome {
        self.emplace(key, value, ReplacementMode::Probabilistic)
    }

    /// Inserts a key-value pair into the key's bucket
    ///
    /// - empty bucket: the pair moves in with priority 1 and is linked at the
    ///   front of the traversal order
    /// - same key resident: priority goes up by one, `value` is dropped and the
    ///   stored value is kept
    /// - different key resident: `mode` decides whether the resident is
    ///   displaced; a displaced bucket keeps its place in the traversal order
    pub fn emplace(&mut self, key: K, value: V, mode: ReplacementMode) -> InsertOutcome {
        let idx = self.bucket_index(&key);
        let slot = self.table.slot(idx);
        // a slot is bound to a node exactly while it is occupied
        debug_assert_eq!(slot.node().is_some(), slot.is_occupied());

        let (node, kind) = match slot.node() {
            None => {
                let node = self.list.push_front(idx);
                self.table.occupy(idx, key, value, node);
                (node, Insertion::Occupied)
            }
            Some(node) if slot.holds(&key) => {
                let priority = self.table.bump(idx, self.config.priority_limit());
                trace!("bucket {idx}: hit, priority now {priority}");
                (node, Insertion::Matched)
            }
            Some(node) => {
                let priority = slot.priority();
                if policy::resolve(mode, priority, &mut self.rng) {
                    self.table.displace(idx, key, value);
                    trace!("bucket {idx}: displaced resident with priority {priority} ({mode:?})");
                    (node, Insertion::Displaced)
                } else {
                    trace!("bucket {idx}: resident with priority {priority} retained");
                    (node, Insertion::Retained)
                }
            }
        };

        InsertOutcome {
            position: Position::of(node, &self.list, &self.table),
            kind,
        }
    }
}

impl<K, V, S, R> Extend<(K, V)> for UnorderedBuffer<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
    R: Rng,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S, R> fmt::Debug for UnorderedBuffer<K, V, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
