//! This crate provides a doubly-linked list of integers with owned nodes, kept
//! in a shared slab, and a bidirectional cursor over it.
//!
//! Lists live inside a [`ListStore`] and are addressed by [`ListId`] handles.
//! Inserting or removing at either end takes constant time; accessing or
//! mutating at an index walks from the nearer end.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use int_dlist::ListStore;
//!
//! let mut store = ListStore::new();
//! let list = store.obtain();
//!
//! store.insert(list, 5); // [5]
//! store.insert_at(list, 0, 3); // [3, 5]
//! assert_eq!(store.get_at(list, 1), 5);
//!
//! store.remove(list, 3); // [5]
//! assert_eq!(store.remove_at(list, 0), 5);
//! assert!(store.is_empty(list));
//! ```
//!
//! # Memory Layout
//!
//! All nodes of all lists are entries of one slab inside the store. A list
//! header records its first node, its last node and its length:
//! ```text
//!      ListStore.lists                      ListStore.nodes
//!    ╔═══════════════╗          ╔══════════╗      ╔══════════╗      ╔══════════╗
//!    ║ head          ║ ───────→ ║  value   ║      ║  value   ║      ║  value   ║
//!    ╟───────────────╢          ╟──────────╢      ╟──────────╢      ╟──────────╢
//!    ║ tail          ║ ──┐      ║  next    ║ ───→ ║  next    ║ ───→ ║  next    ║ ──→ None
//!    ╟───────────────╢   │      ╟──────────╢      ╟──────────╢      ╟──────────╢
//!    ║ len = 3       ║   │ None ←── prev   ║ ←─── ║  prev    ║ ←─── ║  prev    ║
//!    ╚═══════════════╝   │      ╚══════════╝      ╚══════════╝      ╚══════════╝
//!        ListId          │         Node 0            Node 1            Node 2
//!                        └─────────────────────────────────────────────↑
//! ```
//!
//! Every list header is stamped with a fresh generation, which its
//! [`ListId`] carries along with the slab key. A handle to a released list
//! is detected as invalid rather than aliasing whatever reuses the key.
//!
//! Since every list draws its nodes from the same slab,
//! [`append`](ListStore::append) and [`prepend`](ListStore::prepend) move a
//! whole list by relinking its two ends.
//!
//! # Handles and Defaults
//!
//! Every operation accepts any [`ListId`]. On an invalid handle (released,
//! or [`ListId::NULL`] returned by a failed [`obtain`](ListStore::obtain)),
//! mutators do nothing and accessors return `0`, `false` or `None`. Indices
//! past the end are clamped to the last element (or to the end, for
//! insertion).
//!
//! # Storage
//!
//! A [`ListStore`] requests one block from its [`Allocator`](alloc::Allocator)
//! for each list header and each node. The default [`Global`](alloc::Global)
//! allocator always grants; [`Budget`](alloc::Budget) caps the number of live
//! blocks and counts allocations and releases. A refused request leaves the
//! lists unchanged; the `try_*` operations report it as an [`Error`].
//!
//! # Cursors
//!
//! A [`Cursor`] walks one list back and forth and can overwrite the value it
//! is on. It starts before the first element (or after the last one, with
//! [`cursor_end`](ListStore::cursor_end)).
//!
//! ```
//! use int_dlist::ListStore;
//!
//! let mut store = ListStore::new();
//! let list = store.obtain();
//! store.extend(list, [1, 2, 3]).unwrap();
//!
//! let mut cursor = store.cursor(list);
//! while cursor.move_next() {
//!     let doubled = cursor.get() * 2;
//!     cursor.set(doubled);
//! }
//! assert_eq!(store.to_vec(list), vec![2, 4, 6]);
//! ```
//!
//! # Diagnostics
//!
//! [`ListStore::dump`] renders a list as `label: X->[1]->[2]->@`. The crate
//! logs through [`tracing`] and never installs a subscriber.

#[doc(inline)]
pub use dump::Dump;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use list::cursor::Cursor;
#[doc(inline)]
pub use list::iterator::Iter;
#[doc(inline)]
pub use list::{ListId, ListStore};

pub mod alloc;
pub mod dump;
pub mod list;

mod error;
