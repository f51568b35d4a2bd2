use crate::list::{ListData, Node, NodeId};
use slab::Slab;
use std::fmt;
use std::iter::FusedIterator;

/// An iterator over the values of one list in a [`ListStore`].
///
/// It uses a pair of nodes `front..=back` and the number of values between
/// them, so it can be consumed from both ends.
///
/// The iterator borrows the store immutably, so the list cannot change while
/// it is alive.
///
/// ```compile_fail
/// use int_dlist::ListStore;
///
/// let mut store = ListStore::new();
/// let list = store.obtain();
/// let mut iter = store.iter(list);
///
/// // Won't compile, because the store is already borrowed immutably.
/// store.insert(list, 4);
/// println!("{:?}", iter.next());
/// ```
///
/// [`ListStore`]: crate::ListStore
#[derive(Clone)]
pub struct Iter<'a> {
    nodes: &'a Slab<Node>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    len: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(nodes: &'a Slab<Node>, data: Option<&ListData>) -> Self {
        let (front, back, len) =
            data.map_or((None, None, 0), |data| (data.head, data.tail, data.len));
        Self {
            nodes,
            front,
            back,
            len,
        }
    }
}

impl<'a> fmt::Debug for Iter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("Iter");
        for value in self.clone() {
            f.field(&value);
        }
        f.finish()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = i32;

    /// Return the value at `front` and move `front` to its successor, or
    /// return `None` if the range is already empty.
    fn next(&mut self) -> Option<i32> {
        if self.len == 0 {
            return None;
        }
        let node = &self.nodes[self.front?.0];
        self.front = node.next;
        self.len -= 1;
        Some(node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<i32> {
        self.next_back()
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    /// Return the value at `back` and move `back` to its predecessor, or
    /// return `None` if the range is already empty.
    fn next_back(&mut self) -> Option<i32> {
        if self.len == 0 {
            return None;
        }
        let node = &self.nodes[self.back?.0];
        self.back = node.prev;
        self.len -= 1;
        Some(node.value)
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> FusedIterator for Iter<'a> {}
