//! Human-readable dumps of a list, for debugging.
//!
//! ```
//! use int_dlist::{ListId, ListStore};
//!
//! let mut store = ListStore::new();
//! let list = store.obtain();
//! store.extend(list, [1, 2]).unwrap();
//!
//! assert_eq!(store.dump("numbers", list).to_string(), "numbers: X->[1]->[2]->@");
//! assert_eq!(store.dump("none", ListId::NULL).to_string(), "List is invalid!");
//! ```

use crate::alloc::Allocator;
use crate::list::iterator::Iter;
use crate::list::{ListId, ListStore};
use std::fmt;
use std::io;

/// The rendering of one list: `X` marks the start, `@` the end, and each
/// value is shown in brackets.
#[derive(Clone)]
pub struct Dump<'a> {
    label: &'a str,
    values: Option<Iter<'a>>,
}

impl<'a> Dump<'a> {
    /// Send the dump to the `tracing` subscriber at DEBUG level.
    pub fn emit(&self) {
        tracing::debug!(target: "int_dlist::dump", "{}", self);
    }

    /// Write the dump, followed by a newline, to `out`.
    pub fn write_to<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", self)
    }
}

impl<'a> fmt::Display for Dump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = match &self.values {
            Some(values) => values.clone(),
            None => return f.write_str("List is invalid!"),
        };
        write!(f, "{}: X->", self.label)?;
        for value in values {
            write!(f, "[{}]->", value)?;
        }
        f.write_str("@")
    }
}

impl<'a> fmt::Debug for Dump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<A: Allocator> ListStore<A> {
    /// Render `list` for debugging, labelled with `label`.
    pub fn dump<'a>(&'a self, label: &'a str, list: ListId) -> Dump<'a> {
        let values = if self.is_valid(list) {
            Some(self.iter(list))
        } else {
            None
        };
        Dump { label, values }
    }
}
