use crate::alloc::{Allocator, Global};
use crate::list::{ListId, ListStore, NodeId};
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    BeforeStart,
    At { node: NodeId, index: usize },
    AfterEnd,
}

/// A cursor over one list of a [`ListStore`].
///
/// A `Cursor` is like an iterator, except that it can move back and forth one
/// element at a time and overwrite the element it is on. It never changes
/// the links or the length of the list.
///
/// Besides the *n* elements of a list, a cursor can be at two sentinel
/// positions: before the first element (where a new cursor starts) and after
/// the last one. Moving past either end lands on the matching sentinel, and
/// moving back from a sentinel lands on the nearest end.
///
/// The cursor borrows the store mutably, so the list cannot be changed by
/// anything else while the cursor is alive:
///
/// ```compile_fail
/// use int_dlist::ListStore;
///
/// let mut store = ListStore::new();
/// let list = store.obtain();
/// let mut cursor = store.cursor(list);
/// store.insert(list, 1);
/// cursor.move_next();
/// ```
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
/// // [|1 2 3 ] before the start
/// let mut cursor = store.cursor(list);
/// assert!(!cursor.is_valid());
///
/// // [ 1|2 3 ]
/// assert!(cursor.move_next());
/// assert!(cursor.move_next());
/// assert_eq!(cursor.get(), 2);
/// cursor.set(20);
///
/// // [ 1 20 3|] after the end
/// assert!(cursor.move_next());
/// assert!(!cursor.move_next());
/// assert_eq!(cursor.current(), None);
///
/// // [ 1 20|3 ]
/// assert!(cursor.move_prev());
/// assert_eq!(cursor.index(), Some(2));
///
/// drop(cursor);
/// assert_eq!(store.to_vec(list), vec![1, 20, 3]);
/// ```
pub struct Cursor<'a, A: Allocator = Global> {
    store: &'a mut ListStore<A>,
    list: ListId,
    position: Position,
}

impl<'a, A: Allocator> Cursor<'a, A> {
    pub(crate) fn new(store: &'a mut ListStore<A>, list: ListId, position: Position) -> Self {
        Self {
            store,
            list,
            position,
        }
    }

    fn current_node(&self) -> Option<NodeId> {
        match self.position {
            Position::At { node, .. } => Some(node),
            _ => None,
        }
    }

    /// The list this cursor walks.
    pub fn list(&self) -> ListId {
        self.list
    }

    /// Returns `true` if the cursor is on an element, and not on one of the
    /// two sentinels.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self.position, Position::At { .. })
    }

    /// Return the index of the element under the cursor.
    pub fn index(&self) -> Option<usize> {
        match self.position {
            Position::At { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Returns `true` if the cursor has moved past the last element.
    pub fn is_after_end(&self) -> bool {
        self.position == Position::AfterEnd
    }

    /// Returns `true` if the cursor is in front of the first element.
    pub fn is_before_start(&self) -> bool {
        self.position == Position::BeforeStart
    }

    /// Move the cursor towards the back of the list. Returns `true` if it
    /// lands on an element, or `false` if it falls off the end.
    ///
    /// This operation should compute in *O*(1) time.
    pub fn move_next(&mut self) -> bool {
        let next = match self.position {
            Position::BeforeStart => self
                .store
                .data(self.list)
                .and_then(|data| data.head)
                .map(|node| (node, 0)),
            Position::At { node, index } => {
                self.store.node(node).next.map(|next| (next, index + 1))
            }
            Position::AfterEnd => None,
        };
        self.position = match next {
            Some((node, index)) => Position::At { node, index },
            None => Position::AfterEnd,
        };
        self.is_valid()
    }

    /// Move the cursor towards the front of the list. Returns `true` if it
    /// lands on an element, or `false` if it falls off the start.
    ///
    /// This operation should compute in *O*(1) time.
    pub fn move_prev(&mut self) -> bool {
        let prev = match self.position {
            Position::AfterEnd => self
                .store
                .data(self.list)
                .and_then(|data| Some((data.tail?, data.len - 1))),
            Position::At { node, index } => {
                self.store.node(node).prev.map(|prev| (prev, index - 1))
            }
            Position::BeforeStart => None,
        };
        self.position = match prev {
            Some((node, index)) => Position::At { node, index },
            None => Position::BeforeStart,
        };
        self.is_valid()
    }

    /// Returns the element under the cursor, or `None` on a sentinel.
    pub fn current(&self) -> Option<i32> {
        self.current_node().map(|node| self.store.node(node).value)
    }

    /// Returns the element under the cursor, or 0 on a sentinel.
    ///
    /// Reading from a sentinel is a caller error; it is answered with the
    /// default instead of a panic.
    pub fn get(&self) -> i32 {
        self.current().unwrap_or_default()
    }

    /// Overwrite the element under the cursor. Returns `false`, and changes
    /// nothing, if the cursor is on a sentinel.
    pub fn set(&mut self, value: i32) -> bool {
        match self.current_node() {
            Some(node) => {
                self.store.node_mut(node).value = value;
                true
            }
            None => false,
        }
    }

    /// Temporarily borrow the store while the cursor is alive.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// store.extend(list, [1, 2]).unwrap();
    ///
    /// let mut cursor = store.cursor_end(list);
    /// cursor.move_prev();
    /// cursor.set(5);
    /// assert_eq!(cursor.view().to_vec(cursor.list()), vec![1, 5]);
    /// ```
    pub fn view(&self) -> &ListStore<A> {
        self.store
    }
}

impl<'a, A: Allocator> fmt::Debug for Cursor<'a, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("list", &self.list)
            .field("index", &self.index())
            .field("current", &self.current())
            .finish()
    }
}
