use crate::alloc::Allocator;
use crate::list::{ListId, ListStore, NodeId};

// value-based searching and removal
impl<A: Allocator> ListStore<A> {
    fn find(&self, list: ListId, value: i32) -> Option<(usize, NodeId)> {
        let mut current = self.data(list)?.head;
        let mut index = 0;
        while let Some(node) = current {
            let node_ref = self.node(node);
            if node_ref.value == value {
                return Some((index, node));
            }
            current = node_ref.next;
            index += 1;
        }
        None
    }

    /// Returns `true` if `list` contains an element equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// store.extend(list, [0, 1, 2]).unwrap();
    ///
    /// assert_eq!(store.contains(list, 0), true);
    /// assert_eq!(store.contains(list, 10), false);
    /// ```
    pub fn contains(&self, list: ListId, value: i32) -> bool {
        self.find(list, value).is_some()
    }

    /// Returns the index of the first element equal to `value`.
    pub fn position(&self, list: ListId, value: i32) -> Option<usize> {
        self.find(list, value).map(|(index, _)| index)
    }

    /// Removes the first element equal to `value`, scanning from the front.
    /// Returns `true` if an element was removed.
    pub fn remove(&mut self, list: ListId, value: i32) -> bool {
        let node = match self.find(list, value) {
            Some((_, node)) => node,
            None => return false,
        };
        match self.parts_mut(list) {
            Some(mut parts) => {
                parts.detach_node(node);
                true
            }
            None => false,
        }
    }

    /// Removes every element equal to `value` and returns how many were
    /// removed.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time, in a single pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use int_dlist::ListStore;
    ///
    /// let mut store = ListStore::new();
    /// let list = store.obtain();
    /// store.extend(list, [1, 2, 1, 1, 3]).unwrap();
    ///
    /// assert_eq!(store.remove_all(list, 1), 3);
    /// assert_eq!(store.to_vec(list), vec![2, 3]);
    /// ```
    pub fn remove_all(&mut self, list: ListId, value: i32) -> usize {
        self.remove_if(list, |x| x == value)
    }

    /// Removes every element for which `pred` returns `true`, visiting each
    /// element once from front to back. Returns how many were removed.
    pub fn remove_if<F>(&mut self, list: ListId, mut pred: F) -> usize
    where
        F: FnMut(i32) -> bool,
    {
        let mut parts = match self.parts_mut(list) {
            Some(parts) => parts,
            None => return 0,
        };
        let mut removed = 0;
        let mut current = parts.data.head;
        while let Some(node) = current {
            let (value, next) = {
                let node = &parts.nodes[node.0];
                (node.value, node.next)
            };
            current = next;
            if pred(value) {
                parts.detach_node(node);
                removed += 1;
            }
        }
        removed
    }
}
