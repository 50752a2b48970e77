//! `DynArray` configuration types and trait definitions.

use core::marker::PhantomData;

use crate::alloc::Allocator;
use crate::capacity::{Grow, GrowDoubling};

/// Define the associated types for `DynArray` instances.
pub trait ArrayConfig {
    /// The allocator instance type.
    type Alloc: Allocator;

    /// The growth strategy.
    type Grow: Grow;
}

impl<A: Allocator> ArrayConfig for A {
    type Alloc = A;
    type Grow = GrowDoubling;
}

/// A configuration pairing an allocator type `A` with a growth strategy `G`.
///
/// ```
/// use dyn_array::alloc::Global;
/// use dyn_array::array::{Custom, DynArray};
/// use dyn_array::capacity::GrowDoubling;
///
/// let mut arr = DynArray::<u8, Custom<Global, GrowDoubling<64>>>::new();
/// arr.append(1);
/// assert_eq!(arr.capacity(), 64);
/// ```
pub struct Custom<A, G = GrowDoubling>(PhantomData<(A, G)>);

impl<A: Allocator, G: Grow> ArrayConfig for Custom<A, G> {
    type Alloc = A;
    type Grow = G;
}
