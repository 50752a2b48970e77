//! The owned storage behind a `DynArray`.

use core::alloc::Layout;
use core::mem::{align_of, size_of, MaybeUninit};
use core::ptr::NonNull;
use core::slice;

use const_default::ConstDefault;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::alloc::{Allocator, AllocatorDefault};
use crate::error::StorageError;

/// A contiguous allocation of `capacity` slots, of which the first `length`
/// are initialized.
///
/// The buffer releases its allocation when dropped but never drops the
/// contained items; that is the responsibility of the owner.
pub(crate) struct ArrayBuffer<T, A: Allocator> {
    data: NonNull<T>,
    capacity: usize,
    length: usize,
    pub(crate) alloc: A,
}

impl<T, A: Allocator> ArrayBuffer<T, A> {
    pub(crate) const IS_ZST: bool = size_of::<T>() == 0;

    #[inline]
    pub(crate) const fn dangling(alloc: A) -> Self {
        Self {
            data: NonNull::dangling(),
            capacity: 0,
            length: 0,
            alloc,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn length(&self) -> usize {
        self.length
    }

    /// # Safety
    /// The new length must not exceed the capacity, and all items in
    /// `[0, len)` must be initialized.
    #[inline]
    pub(crate) unsafe fn set_length(&mut self, len: usize) {
        debug_assert!(len <= self.capacity);
        self.length = len;
    }

    #[inline]
    pub(crate) fn data_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline]
    pub(crate) fn data_ptr_mut(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.length) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.length) }
    }

    /// # Safety
    /// The index must be within the bounds of the buffer's capacity, otherwise a
    /// memory access error may occur.
    #[inline]
    pub(crate) unsafe fn uninit_index(&mut self, index: usize) -> &mut MaybeUninit<T> {
        debug_assert!(index < self.capacity);
        &mut *self.data.as_ptr().add(index).cast()
    }

    /// The layout of the current allocation, if any.
    #[inline]
    fn current_layout(&self) -> Option<Layout> {
        if Self::IS_ZST || self.capacity == 0 {
            None
        } else {
            // SAFETY: this layout was validated when the buffer was allocated.
            Some(unsafe {
                Layout::from_size_align_unchecked(size_of::<T>() * self.capacity, align_of::<T>())
            })
        }
    }

    /// Reallocate the buffer to hold exactly `capacity` slots, carrying over
    /// the initialized items. On failure the buffer is left untouched.
    pub(crate) fn grow_to(&mut self, capacity: usize) -> Result<(), StorageError> {
        debug_assert!(capacity > self.capacity);
        if Self::IS_ZST {
            self.capacity = usize::MAX;
            return Ok(());
        }
        let new_layout = Layout::array::<T>(capacity)?;
        let result = match self.current_layout() {
            None => self.alloc.allocate(new_layout),
            Some(old_layout) => unsafe {
                self.alloc.grow(self.data.cast(), old_layout, new_layout)
            },
        };
        let Ok(ptr) = result else {
            #[cfg(feature = "tracing")]
            debug!(
                capacity = self.capacity,
                requested = capacity,
                bytes = new_layout.size(),
                "array buffer allocation failed"
            );
            return Err(StorageError::AllocError(new_layout));
        };
        #[cfg(feature = "tracing")]
        trace!(
            old_capacity = self.capacity,
            new_capacity = capacity,
            length = self.length,
            "reallocated array buffer"
        );
        self.data = ptr.cast();
        self.capacity = capacity;
        Ok(())
    }
}

impl<T, A: AllocatorDefault> ConstDefault for ArrayBuffer<T, A> {
    const DEFAULT: Self = Self::dangling(A::DEFAULT);
}

impl<T, A: Allocator> Drop for ArrayBuffer<T, A> {
    fn drop(&mut self) {
        if let Some(layout) = self.current_layout() {
            #[cfg(feature = "tracing")]
            trace!(capacity = self.capacity, "released array buffer");
            unsafe {
                self.alloc.deallocate(self.data.cast(), layout);
            }
        }
    }
}

// The buffer uniquely owns its allocation.
unsafe impl<T: Send, A: Allocator + Send> Send for ArrayBuffer<T, A> {}

unsafe impl<T: Sync, A: Allocator + Sync> Sync for ArrayBuffer<T, A> {}
