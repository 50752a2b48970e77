//! Short names for glob import.
//!
//! ```
//! use dyn_array::prelude::*;
//!
//! let mut arr: DynArray<u16> = dyn_array![1, 2];
//! arr.append_many(&[3, 4]);
//! assert_eq!(arr, [1, 2, 3, 4]);
//! ```

pub use crate::array::{ArrayConfig, Custom, DynArray, IntoIter};
pub use crate::capacity::{Grow, GrowDoubling, GrowExact};
pub use crate::dyn_array;
pub use crate::error::{StorageError, UpdateError};

#[cfg(feature = "zeroize")]
pub use crate::array::ZeroizingArray;
