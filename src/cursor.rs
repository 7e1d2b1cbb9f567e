//! Positions and cursors over the traversal order.
//!
//! A [`Position`] is a detached handle returned by inserts. It stays valid
//! until the slot it names is handed to a different key (or the buffer is
//! cleared); priority bumps and inserts elsewhere leave it intact.
//!
//! A [`Cursor`] borrows the buffer and walks the traversal list in both
//! directions. Past the last element it sits on a "ghost" end position, from
//! which `move_next` wraps to the front and `move_prev` to the back.

use std::fmt;

use crate::{
    bucket::BucketTable,
    list::{NodeId, TraversalList},
};

/// Detached handle to an entry in the traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) node: NodeId,
    pub(crate) slot: usize,
    pub(crate) version: u64,
}

impl Position {
    /// Bucket index this position refers to
    #[inline]
    pub fn bucket_index(&self) -> usize {
        self.slot
    }

    /// Check the position still names the same occupant
    pub(crate) fn is_live<K, V>(&self, list: &TraversalList, table: &BucketTable<K, V>) -> bool {
        if !list.contains(self.node) || list.slot(self.node) != self.slot {
            return false;
        }
        let slot = table.slot(self.slot);
        slot.is_occupied() && slot.node() == Some(self.node) && slot.version() == self.version
    }

    pub(crate) fn of<K, V>(node: NodeId, list: &TraversalList, table: &BucketTable<K, V>) -> Self {
        let slot = list.slot(node);
        Self {
            node,
            slot,
            version: table.slot(slot).version(),
        }
    }
}

/// Bidirectional cursor over the traversal order
pub struct Cursor<'a, K, V> {
    list: &'a TraversalList,
    table: &'a BucketTable<K, V>,
    current: Option<NodeId>,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(
        list: &'a TraversalList,
        table: &'a BucketTable<K, V>,
        current: Option<NodeId>,
    ) -> Self {
        Self {
            list,
            table,
            current,
        }
    }

    /// `true` when the cursor sits on the end position
    #[inline]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Detached handle for the current entry, `None` at the end
    pub fn position(&self) -> Option<Position> {
        self.current
            .map(|node| Position::of(node, self.list, self.table))
    }

    /// Key-value pair under the cursor, `None` at the end
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        let node = self.current?;
        self.table.slot(self.list.slot(node)).entry()
    }

    #[inline]
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(k, _)| k)
    }

    #[inline]
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, v)| v)
    }

    /// Advance towards the back; from the end this wraps to the front
    pub fn move_next(&mut self) {
        self.current = match self.current {
            Some(node) => self.list.next(node),
            None => self.list.head(),
        };
    }

    /// Step towards the front; from the end this wraps to the back
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            Some(node) => self.list.prev(node),
            None => self.list.tail(),
        };
    }

    /// Entry after the cursor without moving it
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        let mut next = *self;
        next.move_next();
        next.key_value()
    }

    /// Entry before the cursor without moving it
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        let mut prev = *self;
        prev.move_prev();
        prev.key_value()
    }
}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list) && self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

/// Half-open range of cursors `[start, end)`
///
/// Yields the entries between the two cursors in traversal order.
pub struct Range<'a, K, V> {
    start: Cursor<'a, K, V>,
    end: Cursor<'a, K, V>,
}

impl<'a, K, V> Range<'a, K, V> {
    pub(crate) fn new(start: Cursor<'a, K, V>, end: Cursor<'a, K, V>) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> Cursor<'a, K, V> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Cursor<'a, K, V> {
        self.end
    }

    /// `true` when `start == end`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }
        let item = self.start.key_value()?;
        self.start.move_next();
        Some(item)
    }
}
