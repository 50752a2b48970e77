//! Allocators backing `DynArray` buffers.
//!
//! An array asks its allocator for exactly three things: a fresh block when
//! it first grows, a larger block holding the same bytes on each later
//! growth, and the release of its block when it is freed. Blocks are always
//! described by `Layout::array::<T>(capacity)`.

use core::alloc::Layout;
#[cfg(not(feature = "allocator-api2"))]
use core::fmt;
#[cfg(not(feature = "allocator-api2"))]
use core::ptr;
use core::ptr::NonNull;
#[cfg(feature = "zeroize")]
use core::slice;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
use alloc_crate::alloc::{alloc as sys_alloc, dealloc as sys_dealloc, realloc as sys_realloc};

#[cfg(all(feature = "alloc", feature = "allocator-api2"))]
pub use allocator_api2::alloc::Global;
#[cfg(feature = "allocator-api2")]
pub use allocator_api2::alloc::{AllocError, Allocator};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

#[cfg(all(not(test), feature = "alloc"))]
pub use alloc_crate::alloc::handle_alloc_error;

/// Report a failed buffer allocation and stop.
///
/// Unit tests and builds without `alloc` panic here instead of aborting.
#[cfg(any(test, not(feature = "alloc")))]
pub fn handle_alloc_error(layout: Layout) -> ! {
    panic!("memory allocation of {} bytes failed", layout.size());
}

/// The allocator could not provide a block for the requested layout.
#[cfg(not(feature = "allocator-api2"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocError;

#[cfg(not(feature = "allocator-api2"))]
impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

#[cfg(all(feature = "std", not(feature = "allocator-api2")))]
impl std::error::Error for AllocError {}

/// A source of memory blocks for array buffers.
///
/// With the `allocator-api2` feature this trait is replaced by the one from
/// that crate, which has the same required methods.
///
/// # Safety
/// A returned block must stay valid until it is passed back to `deallocate`
/// or `grow` on this allocator (or a clone of it). Moving or cloning the
/// allocator must not invalidate outstanding blocks.
#[cfg(not(feature = "allocator-api2"))]
pub unsafe trait Allocator {
    /// Obtain a block fitting `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError>;

    /// Give back a block.
    ///
    /// # Safety
    /// `ptr` must come from this allocator and `layout` must be the layout
    /// it was obtained with.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Exchange a block for one fitting the larger `new_layout`, keeping the
    /// first `old_layout.size()` bytes. The returned block may live at a new
    /// address. On failure the old block is untouched.
    ///
    /// The provided implementation allocates, copies and then releases the
    /// old block.
    ///
    /// # Safety
    /// `ptr` must come from this allocator with `old_layout`, and
    /// `new_layout.size() >= old_layout.size()`.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new_layout.size() >= old_layout.size());
        let block = self.allocate(new_layout)?;
        ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_ptr().cast::<u8>(), old_layout.size());
        self.deallocate(ptr, old_layout);
        Ok(block)
    }
}

#[cfg(not(feature = "allocator-api2"))]
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        A::allocate(self, layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        A::deallocate(self, ptr, layout)
    }

    #[inline]
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        A::grow(self, ptr, old_layout, new_layout)
    }
}

/// Allocators with a constant instance, which lets `DynArray::new` be a
/// `const fn`.
pub trait AllocatorDefault: Allocator + Clone {
    /// The constant instance.
    const DEFAULT: Self;
}

/// The global memory allocator.
///
/// With `alloc` enabled this forwards to the `#[global_allocator]`, growing
/// blocks in place through `realloc` where possible. Without `alloc` it only
/// serves as the default type parameter and panics if used.
#[cfg(any(not(feature = "alloc"), not(feature = "allocator-api2")))]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "alloc", derive(Default, Copy))]
pub struct Global;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            // aligned, never dereferenced
            let dangling = ptr::null_mut::<u8>().wrapping_add(layout.align());
            let dangling = NonNull::new(dangling).ok_or(AllocError)?;
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        let block = NonNull::new(unsafe { sys_alloc(layout) }).ok_or(AllocError)?;
        Ok(NonNull::slice_from_raw_parts(block, layout.size()))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            sys_dealloc(ptr.as_ptr(), layout);
        }
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new_layout.size() >= old_layout.size());
        if old_layout.size() == 0 {
            return self.allocate(new_layout);
        }
        if old_layout.align() != new_layout.align() {
            let block = self.allocate(new_layout)?;
            ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_ptr().cast::<u8>(), old_layout.size());
            self.deallocate(ptr, old_layout);
            return Ok(block);
        }
        let block = NonNull::new(sys_realloc(ptr.as_ptr(), old_layout, new_layout.size()))
            .ok_or(AllocError)?;
        Ok(NonNull::slice_from_raw_parts(block, new_layout.size()))
    }
}

#[cfg(not(feature = "alloc"))]
unsafe impl Allocator for Global {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        unimplemented!("the `alloc` feature is disabled");
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unimplemented!("the `alloc` feature is disabled");
    }
}

#[cfg(feature = "alloc")]
impl AllocatorDefault for Global {
    const DEFAULT: Self = Global;
}

/// Wraps an allocator `A`, overwriting every block with zeroes before it is
/// handed back.
///
/// Growth goes through the provided `grow`, which releases the old block
/// via `deallocate`, so superseded buffers are wiped too.
#[cfg(feature = "zeroize")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroizingAlloc<A>(pub A);

#[cfg(feature = "zeroize")]
unsafe impl<A: Allocator> Allocator for ZeroizingAlloc<A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.0.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        slice::from_raw_parts_mut(ptr.as_ptr(), layout.size()).zeroize();
        self.0.deallocate(ptr, layout)
    }
}

#[cfg(feature = "zeroize")]
impl<A: AllocatorDefault> AllocatorDefault for ZeroizingAlloc<A> {
    const DEFAULT: Self = ZeroizingAlloc(A::DEFAULT);
}
