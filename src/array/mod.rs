//! The growable array type and its supporting types.
//!
//! A [`DynArray`] owns a single contiguous buffer. Its capacity only grows,
//! following the [`Grow`](crate::capacity::Grow) policy of its configuration:
//! by default the first allocation holds
//! [`DEFAULT_INITIAL_CAPACITY`](crate::capacity::DEFAULT_INITIAL_CAPACITY)
//! items and each subsequent reallocation doubles the current capacity until
//! the requirement is met.

use core::fmt;
use core::iter::repeat;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use core::ptr;
use core::slice;

use const_default::ConstDefault;

use crate::alloc::{Allocator, AllocatorDefault, Global};
use crate::capacity::Grow;
use crate::error::{StorageError, UpdateError};

use self::buffer::ArrayBuffer;

pub use self::{
    config::{ArrayConfig, Custom},
    into_iter::IntoIter,
};

mod buffer;
mod config;
mod into_iter;

#[macro_use]
mod macros;

#[cfg(feature = "zeroize")]
/// A `DynArray` which zeroizes every buffer it releases.
pub type ZeroizingArray<T> = DynArray<T, crate::alloc::ZeroizingAlloc<Global>>;

#[cold]
#[inline(never)]
fn index_panic() -> ! {
    panic!("Invalid element index");
}

#[cfg(feature = "alloc")]
#[inline]
/// Create a `DynArray<T>` from an array `[T; N]`.
pub fn from_array<T, const N: usize>(data: [T; N]) -> DynArray<T> {
    let mut arr = DynArray::new();
    arr.extend(data);
    arr
}

#[inline]
/// Create a `DynArray<T, A>` from an array `[T; N]` and an allocator instance.
pub fn from_array_in<T, A, const N: usize>(data: [T; N], alloc: A) -> DynArray<T, A>
where
    A: Allocator,
{
    let mut arr = DynArray::new_in(alloc);
    arr.extend(data);
    arr
}

#[cfg(feature = "alloc")]
#[inline]
/// Create a `DynArray<T>` from a cloneable element T and a count of the number of elements.
pub fn from_elem<T: Clone>(elem: T, count: usize) -> DynArray<T> {
    let mut arr = DynArray::with_capacity(count);
    arr.extend(repeat(elem).take(count));
    arr
}

#[inline]
/// Create a `DynArray<T, A>` from a cloneable element T, a count of the number of elements,
/// and an allocator instance.
pub fn from_elem_in<T, A>(elem: T, count: usize, alloc: A) -> DynArray<T, A>
where
    T: Clone,
    A: Allocator,
{
    let mut arr = DynArray::with_capacity_in(count, alloc);
    arr.extend(repeat(elem).take(count));
    arr
}

/// A contiguous growable array.
///
/// The array starts out empty and unallocated. Appending reserves storage
/// through the configured allocator and growth policy; the contents are
/// preserved in order across every reallocation.
///
/// ```
/// use dyn_array::DynArray;
///
/// let mut arr = DynArray::<i32>::new();
/// arr.append(1);
/// arr.append(2);
/// arr.append_many(&[3, 4, 5]);
/// assert_eq!(arr.len(), 5);
/// assert_eq!(arr.capacity(), 10);
///
/// for (idx, item) in arr.iter().enumerate() {
///     assert_eq!(*item, idx as i32 + 1);
/// }
///
/// arr.reset();
/// assert!(arr.is_empty());
/// assert_eq!(arr.capacity(), 10);
/// arr.free();
/// ```
#[repr(transparent)]
pub struct DynArray<T, C: ArrayConfig = Global> {
    buffer: ArrayBuffer<T, C::Alloc>,
}

impl<T, C: ArrayConfig> DynArray<T, C>
where
    C::Alloc: AllocatorDefault,
{
    /// Constructs a new, empty `DynArray<T, C>`.
    ///
    /// The array will not allocate until elements are appended to it.
    pub const fn new() -> Self {
        Self {
            buffer: ArrayBuffer::DEFAULT,
        }
    }

    /// Constructs a new `DynArray<T, C>` with room for at least `capacity` items.
    /// The capacity is selected by the growth policy, exactly as if
    /// [`reserve`](Self::reserve) were called on an empty array.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a new `DynArray<T, C>` with room for at least `capacity` items.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        let mut arr = Self::new();
        arr.try_reserve(capacity)?;
        Ok(arr)
    }

    /// Constructs a new `DynArray<T, C>` containing clones of the items in `data`.
    pub fn from_slice(data: &[T]) -> Self
    where
        T: Clone,
    {
        let mut arr = Self::new();
        arr.append_many(data);
        arr
    }
}

impl<T, C: ArrayConfig> DynArray<T, C> {
    /// Constructs a new, empty `DynArray<T, C>` which allocates from `alloc`.
    pub const fn new_in(alloc: C::Alloc) -> Self {
        Self {
            buffer: ArrayBuffer::dangling(alloc),
        }
    }

    /// Constructs a new `DynArray<T, C>` which allocates from `alloc`, with room
    /// for at least `capacity` items.
    pub fn with_capacity_in(capacity: usize, alloc: C::Alloc) -> Self {
        match Self::try_with_capacity_in(capacity, alloc) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a new `DynArray<T, C>` which allocates from `alloc`, with room
    /// for at least `capacity` items.
    pub fn try_with_capacity_in(capacity: usize, alloc: C::Alloc) -> Result<Self, StorageError> {
        let mut arr = Self::new_in(alloc);
        arr.try_reserve(capacity)?;
        Ok(arr)
    }

    #[inline]
    fn into_inner(self) -> ArrayBuffer<T, C::Alloc> {
        let me = ManuallyDrop::new(self);
        unsafe { ptr::read(&me.buffer) }
    }

    /// Get a reference to the allocator instance.
    #[inline]
    pub fn allocator(&self) -> &C::Alloc {
        &self.buffer.alloc
    }

    /// Get a pointer to the first item. The pointer is dangling while the
    /// array is unallocated, and is invalidated by any reallocation.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.data_ptr()
    }

    /// Access the items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    /// Access the items as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buffer.as_mut_slice()
    }

    /// The number of allocated slots. Zero when nothing has been allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// The number of items present in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.length()
    }

    /// Check whether the array contains no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ensure the capacity is at least `expected_count` items, panicking if
    /// storage cannot be obtained. Allocation failures are reported through
    /// [`handle_alloc_error`](crate::alloc::handle_alloc_error).
    ///
    /// Note that `expected_count` is the total number of items, not the
    /// number of additional items.
    #[inline]
    pub fn reserve(&mut self, expected_count: usize) {
        match self.try_reserve(expected_count) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to ensure the capacity is at least `expected_count` items.
    ///
    /// When the current capacity is insufficient, the growth policy selects
    /// the new capacity and the buffer is reallocated, keeping the existing
    /// items at their indices. On failure the array is left unchanged.
    pub fn try_reserve(&mut self, expected_count: usize) -> Result<(), StorageError> {
        let capacity = self.buffer.capacity();
        if expected_count <= capacity {
            return Ok(());
        }
        if ArrayBuffer::<T, C::Alloc>::IS_ZST {
            // any count fits without allocating
            return self.buffer.grow_to(usize::MAX);
        }
        let Some(new_capacity) = <C::Grow as Grow>::next_capacity(capacity, expected_count) else {
            return Err(StorageError::CapacityLimit);
        };
        debug_assert!(new_capacity >= expected_count);
        self.buffer.grow_to(new_capacity)
    }

    #[inline]
    fn try_reserve_additional(&mut self, additional: usize) -> Result<(), StorageError> {
        let Some(expected_count) = self.buffer.length().checked_add(additional) else {
            return Err(StorageError::CapacityLimit);
        };
        self.try_reserve(expected_count)
    }

    /// Append an item to the end of the array, growing the buffer if necessary.
    pub fn append(&mut self, item: T) {
        if let Err(error) = self.try_reserve_additional(1) {
            error.panic();
        }
        unsafe {
            self.append_unchecked(item);
        }
    }

    /// Try to append an item to the end of the array. If storage cannot be
    /// reserved then the item is returned within the error.
    pub fn try_append(&mut self, item: T) -> Result<(), UpdateError<T>> {
        if let Err(error) = self.try_reserve_additional(1) {
            return Err(UpdateError::new(error, item));
        }
        unsafe {
            self.append_unchecked(item);
        }
        Ok(())
    }

    /// Append an item without checking the available capacity.
    ///
    /// # Safety
    /// The length of the array must be less than its capacity.
    #[inline]
    pub unsafe fn append_unchecked(&mut self, item: T) {
        let length = self.buffer.length();
        self.buffer.uninit_index(length).write(item);
        self.buffer.set_length(length + 1);
    }

    /// Append clones of all the items in `items`, in order, growing the buffer
    /// at most once.
    pub fn append_many(&mut self, items: &[T])
    where
        T: Clone,
    {
        if let Err(error) = self.try_append_many(items) {
            error.panic();
        }
    }

    /// Try to append clones of all the items in `items`, in order. If storage
    /// cannot be reserved then no items are appended.
    pub fn try_append_many(&mut self, items: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.try_reserve_additional(items.len())?;
        for item in items {
            // the length is updated per item in case `clone` panics
            unsafe { self.append_unchecked(item.clone()) };
        }
        Ok(())
    }

    fn try_extend(&mut self, iter: &mut impl Iterator<Item = T>) -> Result<(), UpdateError<T>> {
        while let Some(item) = iter.next() {
            let length = self.buffer.length();
            if length == self.buffer.capacity() {
                let (lower, _) = iter.size_hint();
                if let Err(error) = self.try_reserve(length.saturating_add(lower).saturating_add(1)) {
                    return Err(UpdateError::new(error, item));
                }
            }
            unsafe { self.append_unchecked(item) };
        }
        Ok(())
    }

    /// Iterate over references to the items, in index order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate over mutable references to the items, in index order.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Get a reference to the last item, if any.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Get a mutable reference to the last item, if any.
    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Remove and return the last item, if any.
    pub fn pop(&mut self) -> Option<T> {
        let mut tail = self.buffer.length();
        if tail > 0 {
            tail -= 1;
            unsafe { self.buffer.set_length(tail) };
            Some(unsafe { self.buffer.uninit_index(tail).assume_init_read() })
        } else {
            None
        }
    }

    /// Remove the item at `index` by moving the last item into its place.
    /// This does not preserve ordering, but is O(1).
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove_unordered(&mut self, index: usize) -> T {
        let length = self.buffer.length();
        if index >= length {
            index_panic();
        }
        let last = length - 1;
        unsafe { self.buffer.set_length(last) };
        let result = unsafe { self.buffer.uninit_index(index).assume_init_read() };
        if index != last {
            unsafe {
                let moved = self.buffer.uninit_index(last).assume_init_read();
                self.buffer.uninit_index(index).write(moved);
            }
        }
        result
    }

    /// Remove all the items, keeping the current allocation for reuse.
    pub fn reset(&mut self) {
        let length = self.buffer.length();
        if length > 0 {
            let to_drop: *mut [T] = self.as_mut_slice();
            unsafe { self.buffer.set_length(0) };
            unsafe {
                ptr::drop_in_place(to_drop);
            }
        }
    }

    /// Drop the items and release the buffer back to the allocator.
    ///
    /// The array is consumed, so it cannot be used after its storage is
    /// released. Dropping the array has the same effect.
    #[inline]
    pub fn free(self) {
        drop(self)
    }
}

impl<T, C: ArrayConfig> AsRef<[T]> for DynArray<T, C> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, C: ArrayConfig> AsMut<[T]> for DynArray<T, C> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, C: ArrayConfig> Clone for DynArray<T, C>
where
    C::Alloc: Clone,
{
    fn clone(&self) -> Self {
        let mut inst = Self::with_capacity_in(self.len(), self.allocator().clone());
        inst.append_many(self);
        inst
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();
        self.append_many(source);
    }
}

impl<T, C> ConstDefault for DynArray<T, C>
where
    C: ArrayConfig,
    C::Alloc: AllocatorDefault,
{
    const DEFAULT: Self = Self::new();
}

impl<T: fmt::Debug, C: ArrayConfig> fmt::Debug for DynArray<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<T, C: ArrayConfig> Default for DynArray<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: ArrayConfig> Deref for DynArray<T, C> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, C: ArrayConfig> DerefMut for DynArray<T, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, C: ArrayConfig> Drop for DynArray<T, C> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T, C: ArrayConfig> Extend<T> for DynArray<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(error) = self.try_extend(&mut iter.into_iter()) {
            error.panic();
        }
    }
}

impl<'a, T: Clone + 'a, C: ArrayConfig> Extend<&'a T> for DynArray<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        if let Err(error) = self.try_extend(&mut iter.into_iter().cloned()) {
            error.panic();
        }
    }
}

impl<T, C: ArrayConfig> FromIterator<T> for DynArray<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T: Clone, C: ArrayConfig> From<&[T]> for DynArray<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from(data: &[T]) -> Self {
        Self::from_slice(data)
    }
}

impl<T, C: ArrayConfig, const N: usize> From<[T; N]> for DynArray<T, C>
where
    C::Alloc: AllocatorDefault,
{
    #[inline]
    fn from(data: [T; N]) -> Self {
        Self::from_iter(data)
    }
}

impl<T, C: ArrayConfig> IntoIterator for DynArray<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T, C::Alloc>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.into_inner())
    }
}

impl<'a, T, C: ArrayConfig> IntoIterator for &'a DynArray<T, C> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, C: ArrayConfig> IntoIterator for &'a mut DynArray<T, C> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T1, C1, T2, C2> PartialEq<DynArray<T2, C2>> for DynArray<T1, C1>
where
    C1: ArrayConfig,
    C2: ArrayConfig,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &DynArray<T2, C2>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl<T: Eq, C: ArrayConfig> Eq for DynArray<T, C> {}

impl<T1, C1, T2> PartialEq<[T2]> for DynArray<T1, C1>
where
    T1: PartialEq<T2>,
    C1: ArrayConfig,
{
    #[inline]
    fn eq(&self, other: &[T2]) -> bool {
        self.as_slice().eq(other)
    }
}

impl<T1, C1, T2> PartialEq<&[T2]> for DynArray<T1, C1>
where
    T1: PartialEq<T2>,
    C1: ArrayConfig,
{
    #[inline]
    fn eq(&self, other: &&[T2]) -> bool {
        self.as_slice().eq(*other)
    }
}

impl<T1, C1, T2, const N: usize> PartialEq<[T2; N]> for DynArray<T1, C1>
where
    T1: PartialEq<T2>,
    C1: ArrayConfig,
{
    #[inline]
    fn eq(&self, other: &[T2; N]) -> bool {
        self.as_slice().eq(&other[..])
    }
}

impl<T1, C1, T2, const N: usize> PartialEq<&[T2; N]> for DynArray<T1, C1>
where
    T1: PartialEq<T2>,
    C1: ArrayConfig,
{
    #[inline]
    fn eq(&self, other: &&[T2; N]) -> bool {
        self.as_slice().eq(&other[..])
    }
}

#[cfg(feature = "zeroize")]
impl<T, A: Allocator> zeroize::ZeroizeOnDrop for DynArray<T, crate::alloc::ZeroizingAlloc<A>> {}

/// ```compile_fail,E0502
/// use dyn_array::DynArray;
///
/// let mut arr = DynArray::<u32>::from([1, 2, 3]);
/// for item in arr.iter() {
///     arr.append(*item);
/// }
/// ```
///
/// ```compile_fail,E0382
/// use dyn_array::DynArray;
///
/// let arr = DynArray::<u32>::from([1, 2, 3]);
/// arr.free();
/// assert_eq!(arr.len(), 3);
/// ```
#[cfg(doctest)]
fn _ownership_check() {}
