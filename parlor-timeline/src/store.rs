//! Ordered node store: a mutable ordered sequence with stable node
//! handles.
//!
//! The store is an arena of slots threaded into a doubly-linked list.
//! Slots are never freed, since the timeline never removes nodes, so
//! a handle is a plain arena index and stays valid across any number
//! of insertions elsewhere in the sequence. All operations are O(1)
//! except [`OrderedNodeStore::locate`], which walks from the nearer
//! end.

/// Stable identifier for a node in an [`OrderedNodeStore`].
///
/// Handles are only meaningful for the store that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

#[derive(Debug)]
struct Slot<T> {
    data: T,
    prev: Option<usize>,
    next: Option<usize>,
    dirty: bool,
}

/// A mutable ordered sequence of nodes addressed by stable handles.
#[derive(Debug)]
pub struct OrderedNodeStore<T> {
    slots: Vec<Slot<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> Default for OrderedNodeStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedNodeStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Number of nodes in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the store holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handle of the first node, or `None` when the store is empty.
    #[must_use]
    pub fn first(&self) -> Option<NodeHandle> {
        self.head.map(NodeHandle)
    }

    /// Handle of the last node, or `None` when the store is empty.
    #[must_use]
    pub fn last(&self) -> Option<NodeHandle> {
        self.tail.map(NodeHandle)
    }

    /// Handle of the node after `handle`, or `None` at the end.
    #[must_use]
    pub fn next(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.slots[handle.0].next.map(NodeHandle)
    }

    /// Handle of the node before `handle`, or `None` at the front.
    #[must_use]
    pub fn prev(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.slots[handle.0].prev.map(NodeHandle)
    }

    /// Handle of the node at `offset` from the front, walking from
    /// whichever end is nearer. O(distance).
    #[must_use]
    pub fn locate(&self, offset: usize) -> Option<NodeHandle> {
        let len = self.len();
        if offset >= len {
            return None;
        }
        if offset <= len - offset - 1 {
            let mut handle = self.first()?;
            for _ in 0..offset {
                handle = self.next(handle)?;
            }
            Some(handle)
        } else {
            let mut handle = self.last()?;
            for _ in 0..(len - offset - 1) {
                handle = self.prev(handle)?;
            }
            Some(handle)
        }
    }

    /// Borrows the data of a node.
    #[must_use]
    pub fn data(&self, handle: NodeHandle) -> &T {
        &self.slots[handle.0].data
    }

    /// Mutably borrows the data of a node. Mutation does not reorder
    /// the node; pair with [`Self::invalidate`] to request a
    /// re-render.
    pub fn data_mut(&mut self, handle: NodeHandle) -> &mut T {
        &mut self.slots[handle.0].data
    }

    /// Marks a node as needing re-render without moving it.
    pub fn invalidate(&mut self, handle: NodeHandle) {
        self.slots[handle.0].dirty = true;
    }

    /// Returns `true` if the node has been invalidated since the last
    /// [`Self::take_dirty`] drain.
    #[must_use]
    pub fn is_dirty(&self, handle: NodeHandle) -> bool {
        self.slots[handle.0].dirty
    }

    /// Handles of nodes allocated since the store last held
    /// `watermark` nodes, in store order. Slots are never freed, so
    /// pairing this with an earlier [`Self::len`] reports exactly the
    /// nodes added in between, wherever they were linked in.
    #[must_use]
    pub fn added_since(&self, watermark: usize) -> Vec<NodeHandle> {
        self.iter()
            .map(|(handle, _)| handle)
            .filter(|handle| handle.0 >= watermark)
            .collect()
    }

    /// Drains and returns the handles of all invalidated nodes, in
    /// store order.
    pub fn take_dirty(&mut self) -> Vec<NodeHandle> {
        let mut dirty = Vec::new();
        let mut cursor = self.head;
        while let Some(index) = cursor {
            if self.slots[index].dirty {
                self.slots[index].dirty = false;
                dirty.push(NodeHandle(index));
            }
            cursor = self.slots[index].next;
        }
        dirty
    }

    fn alloc(&mut self, data: T, prev: Option<usize>, next: Option<usize>) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot {
            data,
            prev,
            next,
            dirty: false,
        });
        index
    }

    /// Inserts a node at the front of the store.
    pub fn insert_first(&mut self, data: T) -> NodeHandle {
        let index = self.alloc(data, None, self.head);
        if let Some(old_head) = self.head {
            self.slots[old_head].prev = Some(index);
        } else {
            self.tail = Some(index);
        }
        self.head = Some(index);
        NodeHandle(index)
    }

    /// Inserts a node at the back of the store.
    pub fn insert_last(&mut self, data: T) -> NodeHandle {
        let index = self.alloc(data, self.tail, None);
        if let Some(old_tail) = self.tail {
            self.slots[old_tail].next = Some(index);
        } else {
            self.head = Some(index);
        }
        self.tail = Some(index);
        NodeHandle(index)
    }

    /// Inserts a node immediately before `handle`.
    pub fn insert_before(&mut self, handle: NodeHandle, data: T) -> NodeHandle {
        let prev = self.slots[handle.0].prev;
        let index = self.alloc(data, prev, Some(handle.0));
        self.slots[handle.0].prev = Some(index);
        if let Some(prev_index) = prev {
            self.slots[prev_index].next = Some(index);
        } else {
            self.head = Some(index);
        }
        NodeHandle(index)
    }

    /// Inserts a node immediately after `handle`.
    pub fn insert_after(&mut self, handle: NodeHandle, data: T) -> NodeHandle {
        let next = self.slots[handle.0].next;
        let index = self.alloc(data, Some(handle.0), next);
        self.slots[handle.0].next = Some(index);
        if let Some(next_index) = next {
            self.slots[next_index].prev = Some(index);
        } else {
            self.tail = Some(index);
        }
        NodeHandle(index)
    }

    /// Iterates the nodes in store order, yielding each handle with a
    /// borrow of its data.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            store: self,
            cursor: self.head,
        }
    }
}

/// Store-order iterator returned by [`OrderedNodeStore::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    store: &'a OrderedNodeStore<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        self.cursor = self.store.slots[index].next;
        Some((NodeHandle(index), &self.store.slots[index].data))
    }
}

impl<'a, T> IntoIterator for &'a OrderedNodeStore<T> {
    type Item = (NodeHandle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
