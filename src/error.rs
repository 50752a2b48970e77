//! Errors reported when an array cannot obtain storage.

use core::alloc::{Layout, LayoutError};
use core::fmt;

/// The reason an array could not reach the requested capacity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The allocator refused a block with this layout.
    AllocError(Layout),
    /// The growth policy could not produce a capacity this large.
    CapacityLimit,
    /// The buffer size in bytes overflows `isize`.
    LayoutError(LayoutError),
}

impl StorageError {
    /// A short, static description.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocError(_) => "Allocation error",
            Self::CapacityLimit => "Exceeded storage capacity limit",
            Self::LayoutError(_) => "Layout error",
        }
    }

    /// Apply the fatal policy used by the non-`try` methods.
    ///
    /// A refused allocation goes to
    /// [`handle_alloc_error`](crate::alloc::handle_alloc_error); anything
    /// else panics with [`as_str`](Self::as_str).
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        match self {
            Self::AllocError(layout) => crate::alloc::handle_alloc_error(layout),
            other => panic!("{}", other.as_str()),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LayoutError> for StorageError {
    fn from(err: LayoutError) -> Self {
        Self::LayoutError(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// A failed `try_append`, handing back the item that was not stored.
#[derive(Clone)]
pub struct UpdateError<T> {
    error: StorageError,
    value: T,
}

impl<T> UpdateError<T> {
    pub(crate) fn new(error: StorageError, value: T) -> Self {
        Self { error, value }
    }

    /// The storage failure.
    pub fn error(&self) -> &StorageError {
        &self.error
    }

    /// Recover the item.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Drop the item and apply [`StorageError::panic`].
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        self.error.panic()
    }
}

impl<T> fmt::Debug for UpdateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for UpdateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Update error: {}", self.error)
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for UpdateError<T> {}
