use core::iter::FusedIterator;
use core::ptr;
use core::slice;

use crate::alloc::Allocator;

use super::buffer::ArrayBuffer;

/// Moves the items out of a [`DynArray`](super::DynArray) in index order.
///
/// Items not yet yielded are dropped with the iterator, followed by the
/// buffer.
pub struct IntoIter<T, A: Allocator> {
    buf: ArrayBuffer<T, A>,
    // items in [head, tail) have not been yielded
    head: usize,
    tail: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(super) fn new(mut buf: ArrayBuffer<T, A>) -> Self {
        let tail = buf.length();
        // the iterator owns the items from here on
        unsafe { buf.set_length(0) };
        Self { buf, head: 0, tail }
    }

    /// The items not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.data_ptr().add(self.head), self.tail - self.head) }
    }

    #[inline]
    unsafe fn take(&self, index: usize) -> T {
        ptr::read(self.buf.data_ptr().add(index))
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let item = unsafe { Self::take(self, self.head) };
        self.head += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remain = self.tail - self.head;
        (remain, Some(remain))
    }

    #[inline]
    fn count(self) -> usize {
        self.tail - self.head
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        Some(unsafe { Self::take(self, self.tail) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remain = ptr::slice_from_raw_parts_mut(
            unsafe { self.buf.data_ptr_mut().add(self.head) },
            self.tail - self.head,
        );
        self.head = self.tail;
        unsafe { ptr::drop_in_place(remain) };
    }
}
