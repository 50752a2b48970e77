//! Growth policies used when an array exceeds its available storage.

use core::fmt::Debug;

/// The capacity allocated the first time an empty array grows, unless
/// a different value is selected with [`GrowDoubling`].
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Growth behavior for collections which have exceeded their available storage.
pub trait Grow: Debug {
    /// Calculate the next capacity to request from the allocator, given the
    /// current capacity `prev` and the required capacity `minimum`.
    ///
    /// Only called when `minimum > prev`. The result must be at least
    /// `minimum`; `None` indicates that no such capacity can be represented.
    fn next_capacity(prev: usize, minimum: usize) -> Option<usize>;
}

/// Growth behavior which never requests extra capacity.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowExact;

impl Grow for GrowExact {
    #[inline]
    fn next_capacity(_prev: usize, minimum: usize) -> Option<usize> {
        Some(minimum)
    }
}

/// Growth behavior which starts from `INITIAL` slots and doubles the current
/// capacity until the requirement is met.
///
/// Doubling always starts from the current capacity, so a sequence of
/// appends costs amortized constant time. An `INITIAL` of zero is treated
/// as one.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowDoubling<const INITIAL: usize = DEFAULT_INITIAL_CAPACITY>;

impl<const INITIAL: usize> Grow for GrowDoubling<INITIAL> {
    #[inline]
    fn next_capacity(prev: usize, minimum: usize) -> Option<usize> {
        let mut capacity = if prev == 0 { INITIAL.max(1) } else { prev };
        while capacity < minimum {
            capacity = capacity.checked_mul(2)?;
        }
        Some(capacity)
    }
}
