//! Storage allocators for list headers and nodes.
//!
//! A [`ListStore`](crate::ListStore) asks its allocator for one [`Block`]
//! before it creates a list header or a node, and hands the block back when
//! that header or node is released. The allocator never sees the values; it
//! only decides whether storage may be granted.

use std::fmt;

/// A grant of `size` bytes from an [`Allocator`].
///
/// Blocks are not `Clone`: each one must be released exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    size: usize,
}

impl Block {
    /// Record a grant of `size` bytes. Only allocators should create blocks.
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of bytes granted.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// The allocator refused to grant storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("allocator refused a request for {size} bytes")]
pub struct AllocError {
    pub size: usize,
}

/// The two-operation allocator contract.
pub trait Allocator {
    /// Requests `size` bytes of storage.
    fn allocate(&mut self, size: usize) -> Result<Block, AllocError>;

    /// Returns a block obtained from [`Allocator::allocate`].
    fn release(&mut self, block: Block);
}

/// An allocator that always grants storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn allocate(&mut self, size: usize) -> Result<Block, AllocError> {
        Ok(Block::new(size))
    }

    #[inline]
    fn release(&mut self, _block: Block) {}
}

/// An allocator that grants at most `limit` live blocks at a time, and keeps
/// statistics about what it handed out.
///
/// # Examples
///
/// ```
/// use int_dlist::alloc::Budget;
/// use int_dlist::ListStore;
///
/// // one list header and one node
/// let mut store = ListStore::with_allocator(Budget::new(2));
/// let list = store.obtain();
/// store.insert(list, 1);
/// store.insert(list, 2); // refused, the list is unchanged
/// assert_eq!(store.to_vec(list), vec![1]);
///
/// store.release(list);
/// assert_eq!(store.allocator().live(), 0);
/// assert!(store.allocator().is_balanced());
/// ```
#[derive(Debug, Clone)]
pub struct Budget {
    limit: usize,
    live: usize,
    bytes_in_use: usize,
    allocations: usize,
    releases: usize,
    refusals: usize,
}

impl Budget {
    /// A budget that grants at most `limit` live blocks.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            live: 0,
            bytes_in_use: 0,
            allocations: 0,
            releases: 0,
            refusals: 0,
        }
    }

    /// A budget that never refuses, kept for its statistics.
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Maximum number of live blocks.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Changes the limit. Blocks already granted stay valid even if the new
    /// limit is below [`Budget::live`].
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Number of blocks granted and not yet released.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Total size of the live blocks.
    ///
    /// ```
    /// use int_dlist::alloc::{Allocator, Budget};
    ///
    /// let mut budget = Budget::new(2);
    /// let block = budget.allocate(16).unwrap();
    /// assert_eq!(budget.bytes_in_use(), 16);
    /// budget.release(block);
    /// assert_eq!(budget.bytes_in_use(), 0);
    /// assert_eq!((budget.allocations(), budget.releases()), (1, 1));
    /// ```
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    /// Number of requests granted so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Number of blocks handed back so far.
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Number of requests refused so far.
    pub fn refusals(&self) -> usize {
        self.refusals
    }

    /// Returns `true` if every granted block has been released.
    pub fn is_balanced(&self) -> bool {
        self.allocations == self.releases
    }
}

impl Allocator for Budget {
    fn allocate(&mut self, size: usize) -> Result<Block, AllocError> {
        if self.live >= self.limit {
            self.refusals += 1;
            return Err(AllocError { size });
        }
        self.live += 1;
        self.bytes_in_use += size;
        self.allocations += 1;
        Ok(Block::new(size))
    }

    fn release(&mut self, block: Block) {
        debug_assert!(self.live > 0, "released more blocks than were granted");
        self.live = self.live.saturating_sub(1);
        self.bytes_in_use = self.bytes_in_use.saturating_sub(block.size);
        self.releases += 1;
    }
}

impl<A: Allocator + ?Sized> Allocator for &mut A {
    fn allocate(&mut self, size: usize) -> Result<Block, AllocError> {
        (**self).allocate(size)
    }

    fn release(&mut self, block: Block) {
        (**self).release(block)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} live blocks ({} bytes), {} allocations, {} releases, {} refusals",
            self.live, self.bytes_in_use, self.allocations, self.releases, self.refusals
        )
    }
}
