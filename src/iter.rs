//! Iterators for `UnorderedBuffer`
//!
//! All iterators follow the traversal order, front to back, which is the
//! reverse of the order in which buckets were first occupied.

use std::{iter::FusedIterator, marker::PhantomData};

use crate::{
    bucket::{BucketTable, Slot},
    list::{NodeId, TraversalList},
    table::UnorderedBuffer,
};

/// An iterator over the entries of an `UnorderedBuffer`
pub struct Iter<'a, K, V> {
    list: &'a TraversalList,
    table: &'a BucketTable<K, V>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(list: &'a TraversalList, table: &'a BucketTable<K, V>) -> Self {
        Self {
            list,
            table,
            front: list.head(),
            back: list.tail(),
            remaining: list.len(),
        }
    }

    #[inline]
    fn entry(&self, node: NodeId) -> Option<(&'a K, &'a V)> {
        self.table.slot(self.list.slot(node)).entry()
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.front = self.list.next(node);
        self.remaining -= 1;
        self.entry(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.back = self.list.prev(node);
        self.remaining -= 1;
        self.entry(node)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of an `UnorderedBuffer`
pub struct IterMut<'a, K, V> {
    list: &'a TraversalList,
    slots: *mut Slot<K, V>,
    front: Option<NodeId>,
    remaining: usize,
    _marker: PhantomData<&'a mut Slot<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(list: &'a TraversalList, table: &'a mut BucketTable<K, V>) -> Self {
        Self {
            list,
            slots: table.as_mut_ptr(),
            front: list.head(),
            remaining: list.len(),
            _marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.front = self.list.next(node);
        self.remaining -= 1;

        // Safety: every node is bound to a distinct in-bounds slot, so each
        // slot is handed out at most once while the table is borrowed mutably
        let slot = unsafe { &mut *self.slots.add(self.list.slot(node)) };
        slot.entry_mut()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of an `UnorderedBuffer`
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(iter: Iter<'a, K, V>) -> Self {
        Self { inner: iter }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of an `UnorderedBuffer`
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(iter: Iter<'a, K, V>) -> Self {
        Self { inner: iter }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of an `UnorderedBuffer`
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(iter: IterMut<'a, K, V>) -> Self {
        Self { inner: iter }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<'a, K, V, S, R> IntoIterator for &'a UnorderedBuffer<K, V, S, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, R> IntoIterator for &'a mut UnorderedBuffer<K, V, S, R> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(keys: &[u32]) -> (TraversalList, BucketTable<u32, u32>) {
        let mut list = TraversalList::with_capacity(keys.len());
        let mut table = BucketTable::new(keys.len());
        for (idx, &key) in keys.iter().enumerate() {
            let node = list.push_front(idx);
            table.occupy(idx, key, key * 2, node);
        }
        (list, table)
    }

    #[test]
    fn test_iter_front_to_back() {
        let (list, table) = fixture(&[1, 2, 3]);
        let items: Vec<_> = Iter::new(&list, &table).collect();
        assert_eq!(items, vec![(&3, &6), (&2, &4), (&1, &2)]);
    }

    #[test]
    fn test_iter_double_ended() {
        let (list, table) = fixture(&[1, 2, 3, 4]);
        let mut iter = Iter::new(&list, &table);
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next().map(|(k, _)| *k), Some(4));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(1));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(2));
        assert_eq!(iter.next().map(|(k, _)| *k), Some(3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_iter_empty() {
        let (list, table) = fixture(&[]);
        assert_eq!(Iter::new(&list, &table).count(), 0);
    }

    #[test]
    fn test_iter_mut() {
        let (list, mut table) = fixture(&[1, 2, 3]);
        for (_, v) in IterMut::new(&list, &mut table) {
            *v += 100;
        }
        let values: Vec<_> = Values::new(Iter::new(&list, &table)).copied().collect();
        assert_eq!(values, vec![106, 104, 102]);
    }

    #[test]
    fn test_keys_and_values() {
        let (list, mut table) = fixture(&[5, 7]);
        let keys: Vec<_> = Keys::new(Iter::new(&list, &table)).collect();
        assert_eq!(keys, vec![&7, &5]);

        let rev: Vec<_> = Values::new(Iter::new(&list, &table)).rev().collect();
        assert_eq!(rev, vec![&10, &14]);

        for v in ValuesMut::new(IterMut::new(&list, &mut table)) {
            *v = 0;
        }
        assert!(Values::new(Iter::new(&list, &table)).all(|v| *v == 0));
    }

    #[test]
    fn test_adapters_report_exact_len() {
        fn fused<I: FusedIterator + ExactSizeIterator>(iter: I) -> I {
            iter
        }

        let (list, mut table) = fixture(&[1, 2, 3]);
        let mut keys = fused(Keys::new(Iter::new(&list, &table)));
        assert_eq!(keys.len(), 3);
        keys.by_ref().for_each(drop);
        assert_eq!(keys.next(), None);
        assert_eq!(keys.next(), None);

        let mut values = fused(Values::new(Iter::new(&list, &table)));
        values.next_back();
        assert_eq!(values.len(), 2);

        let mut values_mut = fused(ValuesMut::new(IterMut::new(&list, &mut table)));
        assert_eq!(values_mut.len(), 3);
        values_mut.next();
        assert_eq!(values_mut.len(), 2);
        values_mut.by_ref().for_each(drop);
        assert_eq!(values_mut.len(), 0);
        assert!(values_mut.next().is_none());
    }
}
