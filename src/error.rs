use crate::alloc::AllocError;
use crate::list::ListId;

/// Errors reported by the fallible (`try_*`) operations of a
/// [`ListStore`](crate::ListStore).
///
/// The total operations never return these: they log the failure and leave
/// the list untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error("list handle {0} is not valid")]
    InvalidList(ListId),
}
