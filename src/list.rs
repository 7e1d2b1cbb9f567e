//! Traversal list threading through occupied slots.
//!
//! - Index-linked doubly linked list, nodes live in a `Vec` arena
//! - Nodes are only ever pushed at the front, on first occupation of a slot
//! - Nodes are never unlinked individually; `clear` drops them all at once
//! - Each node stores the slot index it represents, the slot stores the node id

/// Handle to a node in the traversal list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// # Panics
    /// Debug panics past `u32::MAX`; `BufferConfig::validate` keeps capacities below it
    #[inline]
    fn new(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize);
        Self(idx as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Slot this node represents
    slot: usize,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

#[derive(Debug)]
pub(crate) struct TraversalList {
    nodes: Vec<Node>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl TraversalList {
    /// Create an empty list able to hold `capacity` nodes without reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Link a node for `slot` at the front and return its id
    pub fn push_front(&mut self, slot: usize) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            slot,
            prev: None,
            next: self.head,
        });

        match self.head {
            Some(old) => self.nodes[old.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);

        id
    }

    #[inline]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].next
    }

    #[inline]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].prev
    }

    /// Slot index bound to `id`
    #[inline]
    pub fn slot(&self, id: NodeId) -> usize {
        self.nodes[id.index()].slot
    }

    /// Check `id` refers to a live node
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Walk slot indices from head to tail
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&id| self.next(id)).map(move |id| self.slot(id))
    }

    /// Drop every node, keeping the arena allocation
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }
}
