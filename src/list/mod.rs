use std::fmt;
use std::mem;

use slab::Slab;

use crate::alloc::{Allocator, Block, Global};
use crate::error::Error;
use crate::list::cursor::{Cursor, Position};
use crate::list::iterator::Iter;

pub mod cursor;
pub mod iterator;

mod algorithms;

/// A handle to a list inside a [`ListStore`].
///
/// A handle is valid from [`ListStore::obtain`] until [`ListStore::release`].
/// Every operation accepts invalid handles: mutators do nothing and accessors
/// return a default value. [`ListId::NULL`] is never valid.
///
/// A handle carries the generation its list was stamped with, so a handle to
/// a released list stays invalid after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId {
    key: usize,
    generation: u64,
}

impl ListId {
    /// The handle returned when a list cannot be obtained. Generations start
    /// at 1, so it never matches a live list.
    pub const NULL: ListId = ListId {
        key: usize::MAX,
        generation: 0,
    };
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.key, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

pub(crate) struct Node {
    pub(crate) value: i32,
    pub(crate) next: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    block: Block,
}

/// The header of one list: `head` and `tail` are both `None` iff `len == 0`.
pub(crate) struct ListData {
    pub(crate) head: Option<NodeId>,
    pub(crate) tail: Option<NodeId>,
    pub(crate) len: usize,
    generation: u64,
    block: Block,
}

/// Nodes detached from a list, used in splicing.
///
/// Reading `front.prev` and `back.next` of detached nodes is meaningless.
pub(crate) struct DetachedNodes {
    front: NodeId,
    back: NodeId,
    len: usize,
}

/// The owner of every list and every node.
///
/// All nodes of all lists live in one [`Slab`] and are addressed by their
/// keys. Lists are referred to by generation-checked [`ListId`] handles.
/// Because every list draws its nodes from the same slab,
/// [`append`](ListStore::append) moves nodes between lists by relinking only.
///
/// Storage for list headers and nodes is requested from an [`Allocator`]
/// (one block each); a refused request leaves the lists untouched.
///
/// # Examples
///
/// ```
/// use int_dlist::ListStore;
///
/// let mut store = ListStore::new();
/// let list = store.obtain();
///
/// store.insert(list, 5);
/// store.insert_at(list, 0, 3);
/// assert_eq!(store.to_vec(list), vec![3, 5]);
/// assert_eq!(store.get_at(list, 1), 5);
///
/// store.remove(list, 3);
/// assert_eq!(store.remove_at(list, 0), 5);
/// assert!(store.is_empty(list));
///
/// store.release(list);
/// assert!(!store.is_valid(list));
/// ```
pub struct ListStore<A: Allocator = Global> {
    nodes: Slab<Node>,
    lists: Slab<ListData>,
    generation: u64,
    alloc: A,
}

/// Mutable access to one list header together with the node slab and the
/// allocator, borrowed from disjoint fields of a [`ListStore`].
pub(crate) struct ListParts<'a, A: Allocator> {
    pub(crate) nodes: &'a mut Slab<Node>,
    pub(crate) data: &'a mut ListData,
    alloc: &'a mut A,
}

// private methods
impl<A: Allocator> ListStore<A> {
    pub(crate) fn data(&self, list: ListId) -> Option<&ListData> {
        self.lists
            .get(list.key)
            .filter(|data| data.generation == list.generation)
    }

    pub(crate) fn parts_mut(&mut self, list: ListId) -> Option<ListParts<'_, A>> {
        let data = self
            .lists
            .get_mut(list.key)
            .filter(|data| data.generation == list.generation)?;
        Some(ListParts {
            nodes: &mut self.nodes,
            data,
            alloc: &mut self.alloc,
        })
    }

    pub(crate) fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node.0]
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> &mut Node {
        &mut self.nodes[node.0]
    }
}

impl<'a, A: Allocator> ListParts<'a, A> {
    fn obtain_node(&mut self, value: i32) -> Result<NodeId, Error> {
        let block = self.alloc.allocate(mem::size_of::<Node>())?;
        Ok(NodeId(self.nodes.insert(Node {
            value,
            next: None,
            prev: None,
            block,
        })))
    }

    fn release_node(&mut self, node: NodeId) -> Option<i32> {
        let node = self.nodes.try_remove(node.0)?;
        self.alloc.release(node.block);
        Some(node.value)
    }

    /// Links `prev` and `next` to each other, where `None` stands for the list
    /// boundary (so `head` or `tail` is updated instead).
    fn connect(&mut self, prev: Option<NodeId>, next: Option<NodeId>) {
        match prev {
            Some(prev) => self.nodes[prev.0].next = next,
            None => self.data.head = next,
        }
        match next {
            Some(next) => self.nodes[next.0].prev = prev,
            None => self.data.tail = prev,
        }
    }

    pub(crate) fn node_at(&self, index: usize) -> Option<NodeId> {
        node_at(self.nodes, self.data, index)
    }

    /// Attach a single detached `node` between the adjacent `prev` and `next`.
    ///
    /// If `prev` and `next` are not adjacent in this list, the list becomes
    /// ill-formed (checked only in `#[cfg(debug_assertions)]`).
    fn attach_node(&mut self, prev: Option<NodeId>, next: Option<NodeId>, node: NodeId) {
        #[cfg(debug_assertions)]
        assert_adjacent(self.nodes, self.data, prev, next);
        self.connect(prev, Some(node));
        self.connect(Some(node), next);
        self.data.len += 1;
        #[cfg(debug_assertions)]
        {
            assert_adjacent(self.nodes, self.data, prev, Some(node));
            assert_adjacent(self.nodes, self.data, Some(node), next);
        }
    }

    /// Unlink `node` from the list, release its storage, and return its value.
    ///
    /// `node` must belong to this list.
    pub(crate) fn detach_node(&mut self, node: NodeId) -> i32 {
        let (prev, next) = {
            let node = &self.nodes[node.0];
            (node.prev, node.next)
        };
        self.connect(prev, next);
        self.data.len -= 1;
        self.release_node(node).unwrap_or_default()
    }

    /// Attach a range of detached nodes between the adjacent `prev` and `next`.
    fn attach_nodes(
        &mut self,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        detached: DetachedNodes,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(self.nodes, self.data, prev, next);
        self.connect(prev, Some(detached.front));
        self.connect(Some(detached.back), next);
        self.data.len += detached.len;
    }

    /// Detach all nodes from the list, or return `None` if it is empty.
    fn detach_all_nodes(&mut self) -> Option<DetachedNodes> {
        let front = self.data.head.take()?;
        let back = self.data.tail.take()?;
        let len = mem::take(&mut self.data.len);
        Some(DetachedNodes { front, back, len })
    }

    /// Release every node in one forward walk.
    fn clear(&mut self) -> usize {
        let released = self.data.len;
        let mut current = self.data.head.take();
        while let Some(node) = current {
            current = self.nodes[node.0].next;
            self.release_node(node);
        }
        self.data.tail = None;
        self.data.len = 0;
        released
    }
}

/// Find the node at `index`, clamped to the last node. Walks from whichever
/// end of the list is nearer.
pub(crate) fn node_at(nodes: &Slab<Node>, data: &ListData, index: usize) -> Option<NodeId> {
    let last = data.len.checked_sub(1)?;
    let index = index.min(last);
    if index <= last - index {
        let mut node = data.head?;
        for _ in 0..index {
            node = nodes[node.0].next?;
        }
        Some(node)
    } else {
        let mut node = data.tail?;
        for _ in index..last {
            node = nodes[node.0].prev?;
        }
        Some(node)
    }
}

#[cfg(debug_assertions)]
fn assert_adjacent(
    nodes: &Slab<Node>,
    data: &ListData,
    prev: Option<NodeId>,
    next: Option<NodeId>,
) {
    let after_prev = prev.map_or(data.head, |prev| nodes[prev.0].next);
    let before_next = next.map_or(data.tail, |next| nodes[next.0].prev);
    assert_eq!(after_prev, next);
    assert_eq!(before_next, prev);
}

impl ListStore<Global> {
    /// Create an empty store backed by the [`Global`] allocator.
    pub fn new() -> Self {
        Self::with_allocator(Global)
    }

    /// Create an empty store with room for `lists` list headers and `nodes`
    /// nodes before the slabs grow.
    pub fn with_capacity(lists: usize, nodes: usize) -> Self {
        Self::with_capacity_in(lists, nodes, Global)
    }
}

impl<A: Allocator> ListStore<A> {
    pub fn with_allocator(alloc: A) -> Self {
        Self::with_capacity_in(0, 0, alloc)
    }

    pub fn with_capacity_in(lists: usize, nodes: usize, alloc: A) -> Self {
        Self {
            nodes: Slab::with_capacity(nodes),
            lists: Slab::with_capacity(lists),
            generation: 0,
            alloc,
        }
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.alloc
    }

    /// Number of live lists in the store.
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Number of live nodes in the store, across all lists.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a new empty list, or return the allocator's refusal.
    pub fn try_obtain(&mut self) -> Result<ListId, Error> {
        let block = self.alloc.allocate(mem::size_of::<ListData>())?;
        self.generation += 1;
        let generation = self.generation;
        let key = self.lists.insert(ListData {
            head: None,
            tail: None,
            len: 0,
            generation,
            block,
        });
        let list = ListId { key, generation };
        tracing::debug!(%list, "obtained list");
        Ok(list)
    }

    /// Create a new empty list.
    ///
    /// Returns [`ListId::NULL`] if the allocator refuses to provide storage;
    /// check [`ListStore::is_valid`] before relying on the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::alloc::Budget;
    /// use int_dlist::{ListId, ListStore};
    ///
    /// let mut store = ListStore::with_allocator(Budget::new(0));
    /// let list = store.obtain();
    /// assert_eq!(list, ListId::NULL);
    /// assert!(!store.is_valid(list));
    /// ```
    pub fn obtain(&mut self) -> ListId {
        self.try_obtain().unwrap_or_else(|err| {
            tracing::warn!(%err, "cannot obtain list");
            ListId::NULL
        })
    }

    /// Release every node of `list` and then the list itself. Afterwards the
    /// handle is invalid. Does nothing on an invalid handle.
    pub fn release(&mut self, list: ListId) {
        if !self.is_valid(list) {
            return;
        }
        self.clear(list);
        let data = self.lists.remove(list.key);
        self.alloc.release(data.block);
        tracing::debug!(%list, "released list");
    }

    /// Returns `true` if `list` refers to a live list.
    #[inline]
    pub fn is_valid(&self, list: ListId) -> bool {
        self.data(list).is_some()
    }

    /// Returns `true` if `list` is invalid or has no elements.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self, list: ListId) -> bool {
        self.len(list) == 0
    }

    /// Returns the number of elements of `list`, or 0 if it is invalid.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn len(&self, list: ListId) -> usize {
        self.data(list).map_or(0, |data| data.len)
    }

    /// Removes all elements from `list`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time, in a single pass.
    pub fn clear(&mut self, list: ListId) {
        if let Some(mut parts) = self.parts_mut(list) {
            let released = parts.clear();
            tracing::trace!(%list, released, "cleared list");
        }
    }

    /// Appends `value` to the back of `list`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn insert(&mut self, list: ListId, value: i32) {
        self.insert_at(list, usize::MAX, value);
    }

    /// Inserts `value` so that it becomes the element at `index`.
    ///
    /// An `index` at or past the length appends to the back. If the allocator
    /// refuses storage, or `list` is invalid, nothing changes.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(min(*index*, *n* - *index*)) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// store.extend(list, [1, 2, 3]).unwrap();
    ///
    /// store.insert_at(list, 2, 4);
    /// store.insert_at(list, 99, 5);
    /// store.insert_at(list, 0, 0);
    ///
    /// assert_eq!(store.to_vec(list), vec![0, 1, 2, 4, 3, 5]);
    /// ```
    pub fn insert_at(&mut self, list: ListId, index: usize, value: i32) {
        if let Err(err) = self.try_insert_at(list, index, value) {
            tracing::warn!(%list, index, value, %err, "insert dropped");
        }
    }

    /// Like [`ListStore::insert_at`], but reports why nothing was inserted.
    pub fn try_insert_at(&mut self, list: ListId, index: usize, value: i32) -> Result<(), Error> {
        let mut parts = self.parts_mut(list).ok_or(Error::InvalidList(list))?;
        let node = parts.obtain_node(value)?;
        let (prev, next) = if index >= parts.data.len {
            (parts.data.tail, None)
        } else if index == 0 {
            (None, parts.data.head)
        } else {
            let next = parts.node_at(index);
            (next.and_then(|next| parts.nodes[next.0].prev), next)
        };
        parts.attach_node(prev, next, node);
        Ok(())
    }

    /// Returns the value at `index`, clamped to the last element, or 0 if
    /// `list` is empty or invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// assert_eq!(store.get_at(list, 0), 0);
    ///
    /// store.extend(list, [7, 8, 9]).unwrap();
    /// assert_eq!(store.get_at(list, 1), 8);
    /// assert_eq!(store.get_at(list, 10), 9);
    /// ```
    pub fn get_at(&self, list: ListId, index: usize) -> i32 {
        self.data(list)
            .and_then(|data| node_at(&self.nodes, data, index))
            .map_or(0, |node| self.node(node).value)
    }

    /// Removes the element at `index`, clamped to the last element, and
    /// returns it. Returns 0 and changes nothing if `list` is empty or invalid.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(min(*index*, *n* - *index*)) time.
    pub fn remove_at(&mut self, list: ListId, index: usize) -> i32 {
        self.parts_mut(list)
            .and_then(|mut parts| {
                let node = parts.node_at(index)?;
                Some(parts.detach_node(node))
            })
            .unwrap_or_default()
    }

    /// Adds `value` first in `list`.
    pub fn push_front(&mut self, list: ListId, value: i32) {
        self.insert_at(list, 0, value);
    }

    /// Adds `value` last in `list`.
    pub fn push_back(&mut self, list: ListId, value: i32) {
        self.insert(list, value);
    }

    /// Removes the first element and returns it, or `None` if `list` is
    /// empty or invalid.
    pub fn pop_front(&mut self, list: ListId) -> Option<i32> {
        let mut parts = self.parts_mut(list)?;
        let head = parts.data.head?;
        Some(parts.detach_node(head))
    }

    /// Removes the last element and returns it, or `None` if `list` is
    /// empty or invalid.
    pub fn pop_back(&mut self, list: ListId) -> Option<i32> {
        let mut parts = self.parts_mut(list)?;
        let tail = parts.data.tail?;
        Some(parts.detach_node(tail))
    }

    pub fn front(&self, list: ListId) -> Option<i32> {
        let head = self.data(list)?.head?;
        Some(self.node(head).value)
    }

    pub fn back(&self, list: ListId) -> Option<i32> {
        let tail = self.data(list)?.tail?;
        Some(self.node(tail).value)
    }

    /// Moves all elements from `other` to the end of `list`.
    ///
    /// This reuses all the nodes from `other` and moves them into `list`.
    /// After this operation, `other` is empty but still valid. Nothing happens
    /// if either handle is invalid or both name the same list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list1 = store.obtain();
    /// let list2 = store.obtain();
    /// store.push_back(list1, 1);
    /// store.push_back(list2, 2);
    /// store.push_back(list2, 3);
    ///
    /// store.append(list1, list2);
    ///
    /// assert_eq!(store.to_vec(list1), vec![1, 2, 3]);
    /// assert!(store.is_empty(list2));
    /// ```
    pub fn append(&mut self, list: ListId, other: ListId) {
        self.splice(list, other, |data| (data.tail, None));
    }

    /// Moves all elements from `other` to the front of `list`. See
    /// [`ListStore::append`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    pub fn prepend(&mut self, list: ListId, other: ListId) {
        self.splice(list, other, |data| (None, data.head));
    }

    fn splice<F>(&mut self, list: ListId, other: ListId, between: F)
    where
        F: FnOnce(&ListData) -> (Option<NodeId>, Option<NodeId>),
    {
        if list == other || !self.is_valid(list) {
            return;
        }
        let detached = match self.parts_mut(other).and_then(|mut parts| parts.detach_all_nodes()) {
            Some(detached) => detached,
            None => return,
        };
        let moved = detached.len;
        if let Some(mut parts) = self.parts_mut(list) {
            let (prev, next) = between(parts.data);
            parts.attach_nodes(prev, next, detached);
        }
        tracing::trace!(%list, %other, moved, "spliced lists");
    }

    /// Provides a forward iterator over the values of `list`. The iterator
    /// is empty if `list` is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// store.extend(list, 0..3).unwrap();
    ///
    /// let mut iter = store.iter(list);
    /// assert_eq!(iter.next(), Some(0));
    /// assert_eq!(iter.next_back(), Some(2));
    /// assert_eq!(iter.next(), Some(1));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self, list: ListId) -> Iter<'_> {
        Iter::new(&self.nodes, self.data(list))
    }

    /// Collects the values of `list` into a `Vec`, head first.
    pub fn to_vec(&self, list: ListId) -> Vec<i32> {
        self.iter(list).collect()
    }

    /// Appends every value of `values` to `list`, stopping at the first
    /// refused allocation. Fails on an invalid `list` even if `values` is
    /// empty.
    pub fn extend<I>(&mut self, list: ListId, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = i32>,
    {
        if !self.is_valid(list) {
            return Err(Error::InvalidList(list));
        }
        values
            .into_iter()
            .try_for_each(|value| self.try_insert_at(list, usize::MAX, value))
    }

    /// Provides a cursor over `list`, positioned before the first element.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// store.extend(list, [1, 2, 3]).unwrap();
    ///
    /// let mut cursor = store.cursor(list);
    /// assert!(!cursor.is_valid());
    /// assert!(cursor.move_next());
    /// assert_eq!(cursor.get(), 1);
    /// ```
    pub fn cursor(&mut self, list: ListId) -> Cursor<'_, A> {
        Cursor::new(self, list, Position::BeforeStart)
    }

    /// Provides a cursor over `list`, positioned after the last element.
    pub fn cursor_end(&mut self, list: ListId) -> Cursor<'_, A> {
        Cursor::new(self, list, Position::AfterEnd)
    }
}

impl Default for ListStore<Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> fmt::Debug for ListStore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListStore")
            .field("lists", &self.lists.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl<A: Allocator> Drop for ListStore<A> {
    fn drop(&mut self) {
        for node in self.nodes.drain() {
            self.alloc.release(node.block);
        }
        for data in self.lists.drain() {
            self.alloc.release(data.block);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem;

    use proptest::prelude::*;

    use crate::alloc::Budget;
    use crate::error::Error;
    use crate::list::{ListId, ListStore};

    fn list_from<I: IntoIterator<Item = i32>>(store: &mut ListStore, values: I) -> ListId {
        let list = store.obtain();
        store.extend(list, values).unwrap();
        list
    }

    /// Walk the links in both directions and compare against `len`.
    fn assert_well_formed(store: &ListStore<impl crate::alloc::Allocator>, list: ListId) {
        let data = store.data(list).unwrap();
        let mut forward = Vec::new();
        let mut node = data.head;
        while let Some(id) = node {
            forward.push(store.node(id).value);
            node = store.node(id).next;
        }
        let mut backward = Vec::new();
        let mut node = data.tail;
        while let Some(id) = node {
            backward.push(store.node(id).value);
            node = store.node(id).prev;
        }
        backward.reverse();
        assert_eq!(forward.len(), data.len);
        assert_eq!(forward, backward);
        assert_eq!(data.head.is_none(), data.len == 0);
        assert_eq!(data.tail.is_none(), data.len == 0);
    }

    #[test]
    fn list_create() {
        let mut store = ListStore::new();
        let list = store.obtain();
        assert!(store.is_valid(list));
        assert!(store.is_empty(list));
        store.insert(list, 1);
        assert!(!store.is_empty(list));
        assert_eq!(store.pop_back(list), Some(1));
        assert!(store.is_empty(list));
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_scenario() {
        let mut store = ListStore::new();
        let list = store.obtain();
        store.insert(list, 5);
        assert_eq!(store.to_vec(list), vec![5]);
        store.insert_at(list, 0, 3);
        assert_eq!(store.to_vec(list), vec![3, 5]);
        assert_eq!(store.get_at(list, 1), 5);
        store.remove(list, 3);
        assert_eq!(store.to_vec(list), vec![5]);
        assert_eq!(store.remove_at(list, 0), 5);
        assert!(store.is_empty(list));
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_push_and_pop() {
        let mut store = ListStore::new();
        let list = store.obtain();
        assert_eq!(store.len(list), 0);
        assert_eq!(store.front(list), None);
        assert_eq!(store.back(list), None);
        assert_eq!(store.pop_front(list), None);
        assert_eq!(store.pop_back(list), None);

        store.push_back(list, 1);
        assert_eq!(store.back(list), Some(1));
        assert_eq!(store.pop_front(list), Some(1));
        assert_eq!(store.pop_back(list), None);
        assert!(store.is_empty(list));

        store.push_front(list, 1);
        store.push_front(list, 2);
        store.push_back(list, 3);
        assert_eq!(store.back(list), Some(3));
        assert_eq!(store.front(list), Some(2));
        assert_eq!(store.pop_front(list), Some(2));
        assert_eq!(store.pop_back(list), Some(3));
        assert_eq!(store.front(list), Some(1));
        assert_eq!(store.pop_front(list), Some(1));
        assert!(store.is_empty(list));
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_insert_at_front_reverses() {
        let mut store = ListStore::new();
        let list = store.obtain();
        for value in 0..5 {
            store.insert_at(list, 0, value);
        }
        assert_eq!(store.to_vec(list), vec![4, 3, 2, 1, 0]);
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_insert_and_remove() {
        let mut store = ListStore::new();
        let list = list_from(&mut store, 0..10);
        store.insert_at(list, 5, 10);
        assert_eq!(store.get_at(list, 5), 10);
        assert_eq!(store.len(list), 11);

        // near the back, found by walking from the tail
        store.insert_at(list, 9, 20);
        assert_eq!(store.get_at(list, 9), 20);
        assert_eq!(store.get_at(list, 10), 8);
        assert_well_formed(&store, list);

        assert_eq!(store.remove_at(list, 11), 9);
        assert_eq!(store.back(list), Some(8));
        assert_eq!(store.remove_at(list, 0), 0);
        assert_eq!(store.front(list), Some(1));
        assert_eq!(store.remove_at(list, 4), 10);
        assert_eq!(store.to_vec(list), vec![1, 2, 3, 4, 5, 6, 7, 20, 8]);
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_out_of_range_is_clamped() {
        let mut store = ListStore::new();
        let list = list_from(&mut store, [1, 2, 3]);
        assert_eq!(store.get_at(list, 3), 3);
        assert_eq!(store.get_at(list, usize::MAX), 3);
        assert_eq!(store.remove_at(list, 100), 3);
        assert_eq!(store.to_vec(list), vec![1, 2]);
        store.insert_at(list, 100, 4);
        assert_eq!(store.to_vec(list), vec![1, 2, 4]);
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_empty_defaults() {
        let mut store = ListStore::new();
        let list = store.obtain();
        assert_eq!(store.get_at(list, 0), 0);
        assert_eq!(store.remove_at(list, 0), 0);
        assert_eq!(store.len(list), 0);
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_invalid_handle_degrades() {
        let mut store = ListStore::new();
        let list = list_from(&mut store, [1, 2]);
        store.release(list);

        for invalid in [list, ListId::NULL] {
            assert!(!store.is_valid(invalid));
            assert!(store.is_empty(invalid));
            assert_eq!(store.len(invalid), 0);
            store.insert(invalid, 1);
            store.insert_at(invalid, 0, 1);
            store.clear(invalid);
            assert_eq!(store.get_at(invalid, 0), 0);
            assert_eq!(store.remove_at(invalid, 0), 0);
            assert_eq!(store.pop_front(invalid), None);
            assert_eq!(store.iter(invalid).next(), None);
            store.release(invalid);
        }
        assert_eq!(
            store.try_insert_at(ListId::NULL, 0, 1),
            Err(Error::InvalidList(ListId::NULL))
        );
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.list_count(), 0);
    }

    #[test]
    fn list_release_invalidates_only_that_list() {
        let mut store = ListStore::new();
        let a = list_from(&mut store, [1]);
        let b = list_from(&mut store, [2]);
        store.release(a);
        let c = store.obtain();
        assert_ne!(a, c);
        assert!(!store.is_valid(a));
        assert!(store.is_valid(c));
        assert_eq!(store.to_vec(b), vec![2]);
    }

    #[test]
    fn list_clear() {
        let mut store = ListStore::new();
        let list = list_from(&mut store, 0..100);
        assert_eq!(store.node_count(), 100);
        store.clear(list);
        assert!(store.is_empty(list));
        assert!(store.is_valid(list));
        assert_eq!(store.node_count(), 0);
        store.insert(list, 1);
        assert_eq!(store.to_vec(list), vec![1]);
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_append_and_prepend() {
        fn check(list: &[i32], other: &[i32]) {
            let mut store = ListStore::new();
            let a = list_from(&mut store, list.iter().copied());
            let b = list_from(&mut store, other.iter().copied());
            store.append(a, b);
            let expected: Vec<_> = list.iter().chain(other).copied().collect();
            assert_eq!(store.to_vec(a), expected);
            assert_eq!(store.len(a), list.len() + other.len());
            assert!(store.is_empty(b));
            assert!(store.is_valid(b));
            assert_well_formed(&store, a);
            assert_well_formed(&store, b);

            let c = list_from(&mut store, other.iter().copied());
            let d = list_from(&mut store, list.iter().copied());
            store.prepend(c, d);
            assert_eq!(store.to_vec(c), expected);
            assert!(store.is_empty(d));
            assert_well_formed(&store, c);
        }
        check(&[0, 1, 2], &[3, 4]);
        check(&[0], &[1]);
        check(&[], &[0, 1]);
        check(&[0, 1], &[]);
        check(&[], &[]);
    }

    #[test]
    fn list_append_degenerate() {
        let mut store = ListStore::new();
        let a = list_from(&mut store, [1, 2]);
        store.append(a, a);
        assert_eq!(store.to_vec(a), vec![1, 2]);
        store.append(a, ListId::NULL);
        store.append(ListId::NULL, a);
        assert_eq!(store.to_vec(a), vec![1, 2]);
        assert_well_formed(&store, a);
    }

    #[test]
    fn list_refused_allocation_changes_nothing() {
        let mut store = ListStore::with_allocator(Budget::new(3));
        let list = store.obtain();
        store.insert(list, 1);
        store.insert(list, 2);
        store.insert_at(list, 0, 3);
        assert_eq!(store.to_vec(list), vec![1, 2]);
        assert!(matches!(
            store.try_insert_at(list, 0, 3),
            Err(Error::Alloc(_))
        ));
        assert!(store.extend(list, [4, 5]).is_err());
        assert_eq!(store.to_vec(list), vec![1, 2]);
        assert_eq!(store.obtain(), ListId::NULL);

        store.remove_at(list, 0);
        store.insert(list, 6);
        assert_eq!(store.to_vec(list), vec![2, 6]);
        assert_well_formed(&store, list);
    }

    #[test]
    fn list_allocator_balance() {
        let mut budget = Budget::unlimited();
        {
            let mut store = ListStore::with_allocator(&mut budget);
            let a = store.obtain();
            let b = store.obtain();
            store.extend(a, 0..10).unwrap();
            store.extend(b, 0..10).unwrap();
            store.remove_all(a, 3);
            store.append(a, b);
            store.release(a);
            assert_eq!(store.allocator().live(), 1);
            // `b` is still live, and released by dropping the store
        }
        assert_eq!(budget.live(), 0);
        assert_eq!(budget.allocations(), 22);
        assert!(budget.is_balanced());
    }

    #[test]
    fn list_debug() {
        let mut store = ListStore::with_capacity(1, 4);
        let list = store.obtain();
        store.extend(list, [1, 2]).unwrap();
        assert_eq!(format!("{:?}", store), "ListStore { lists: 1, nodes: 2 }");
        assert!(list.to_string().starts_with('#'));
    }

    #[test]
    fn list_reused_slot_rejects_old_handle() {
        let mut store = ListStore::new();
        let old = list_from(&mut store, [1, 2]);
        store.release(old);
        let new = list_from(&mut store, [3]);
        assert_eq!(old.key, new.key);
        assert_ne!(old, new);

        assert!(!store.is_valid(old));
        assert_eq!(store.len(old), 0);
        store.insert(old, 9);
        store.release(old);
        assert!(store.is_valid(new));
        assert_eq!(store.to_vec(new), vec![3]);
        assert_well_formed(&store, new);
    }

    #[test]
    fn list_extend_invalid_handle() {
        let mut store = ListStore::new();
        let list = store.obtain();
        store.release(list);
        assert_eq!(store.extend(list, 0..0), Err(Error::InvalidList(list)));
        assert_eq!(store.extend(list, [1]), Err(Error::InvalidList(list)));
        assert_eq!(store.extend(ListId::NULL, 0..0), Err(Error::InvalidList(ListId::NULL)));

        let list = store.obtain();
        assert_eq!(store.extend(list, 0..0), Ok(()));
        assert!(store.is_empty(list));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(bool, i32),
        InsertAt(bool, usize, i32),
        RemoveAt(bool, usize),
        RemoveAll(bool, i32),
        RemoveOdd(bool),
        PopFront(bool),
        PopBack(bool),
        Append(bool),
        Prepend(bool),
        Clear(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        let value = -3..3i32;
        let index = 0..10usize;
        prop_oneof![
            4 => (any::<bool>(), value.clone()).prop_map(|(b, v)| Op::Insert(b, v)),
            4 => (any::<bool>(), index.clone(), value.clone())
                .prop_map(|(b, i, v)| Op::InsertAt(b, i, v)),
            2 => (any::<bool>(), index).prop_map(|(b, i)| Op::RemoveAt(b, i)),
            1 => (any::<bool>(), value).prop_map(|(b, v)| Op::RemoveAll(b, v)),
            1 => any::<bool>().prop_map(Op::RemoveOdd),
            1 => any::<bool>().prop_map(Op::PopFront),
            1 => any::<bool>().prop_map(Op::PopBack),
            1 => any::<bool>().prop_map(Op::Append),
            1 => any::<bool>().prop_map(Op::Prepend),
            1 => any::<bool>().prop_map(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn list_links_stay_consistent(ops in proptest::collection::vec(op(), 0..64)) {
            let mut store = ListStore::new();
            let lists = [store.obtain(), store.obtain()];
            let mut models = [Vec::new(), Vec::new()];
            for op in &ops {
                match *op {
                    Op::Insert(b, v) => {
                        store.insert(lists[b as usize], v);
                        models[b as usize].push(v);
                    }
                    Op::InsertAt(b, i, v) => {
                        let model = &mut models[b as usize];
                        store.insert_at(lists[b as usize], i, v);
                        model.insert(i.min(model.len()), v);
                    }
                    Op::RemoveAt(b, i) => {
                        let model = &mut models[b as usize];
                        let expected = match model.len() {
                            0 => 0,
                            len => model.remove(i.min(len - 1)),
                        };
                        prop_assert_eq!(store.remove_at(lists[b as usize], i), expected);
                    }
                    Op::RemoveAll(b, v) => {
                        store.remove_all(lists[b as usize], v);
                        models[b as usize].retain(|&x| x != v);
                    }
                    Op::RemoveOdd(b) => {
                        store.remove_if(lists[b as usize], |x| x % 2 != 0);
                        models[b as usize].retain(|&x| x % 2 == 0);
                    }
                    Op::PopFront(b) => {
                        let model = &mut models[b as usize];
                        let expected = if model.is_empty() {
                            None
                        } else {
                            Some(model.remove(0))
                        };
                        prop_assert_eq!(store.pop_front(lists[b as usize]), expected);
                    }
                    Op::PopBack(b) => {
                        let expected = models[b as usize].pop();
                        prop_assert_eq!(store.pop_back(lists[b as usize]), expected);
                    }
                    Op::Append(b) => {
                        let (to, from) = (b as usize, !b as usize);
                        store.append(lists[to], lists[from]);
                        let moved = mem::take(&mut models[from]);
                        models[to].extend(moved);
                    }
                    Op::Prepend(b) => {
                        let (to, from) = (b as usize, !b as usize);
                        store.prepend(lists[to], lists[from]);
                        let mut moved = mem::take(&mut models[from]);
                        moved.append(&mut models[to]);
                        models[to] = moved;
                    }
                    Op::Clear(b) => {
                        store.clear(lists[b as usize]);
                        models[b as usize].clear();
                    }
                }
                for (list, model) in lists.iter().zip(&models) {
                    assert_well_formed(&store, *list);
                    prop_assert_eq!(&store.to_vec(*list), model);
                }
                prop_assert_eq!(store.node_count(), models[0].len() + models[1].len());
            }
        }
    }
}
