//! Draining iterator for `DynArray`.

use crate::DynArray;
use allocator_api2::alloc::{Allocator, Global};
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};

/// A draining iterator for `DynArray`.
///
/// This struct is created by the [`drain`] method on [`DynArray`].
///
/// While it is alive the array's length covers only the elements before the
/// drained range. Dropping it destroys the elements it did not yield and
/// moves the tail down. If it is leaked instead, the array keeps only the
/// elements before the range.
///
/// [`drain`]: DynArray::drain
pub struct Drain<'a, T: 'a, A: Allocator + 'a = Global> {
    /// Pointer to the DynArray we're draining
    pub(crate) arr: NonNull<DynArray<T, A>>,
    /// Next slot yielded from the front
    pub(crate) index: usize,
    /// One past the next slot yielded from the back
    pub(crate) range_end: usize,
    /// Where the elements after the drained range start
    pub(crate) tail_start: usize,
    /// Number of elements after the drained range
    pub(crate) tail_len: usize,
    /// Marker for the lifetime
    pub(crate) _marker: std::marker::PhantomData<&'a mut DynArray<T, A>>,
}

impl<'a, T, A: Allocator> Drain<'a, T, A> {
    pub(crate) fn new(arr: &'a mut DynArray<T, A>, start: usize, end: usize) -> Self {
        let len = arr.len();
        debug_assert!(start <= end && end <= len);
        // Hide the range and the tail while the drain is alive.
        unsafe {
            arr.set_len(start);
        }
        Self {
            arr: NonNull::from(arr),
            index: start,
            range_end: end,
            tail_start: end,
            tail_len: len - end,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the remaining items as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            let base = self.arr.as_ref().buf.ptr();
            std::slice::from_raw_parts(base.add(self.index), self.range_end - self.index)
        }
    }

    /// Returns a reference to the underlying allocator.
    pub fn allocator(&self) -> &A {
        unsafe { self.arr.as_ref().allocator() }
    }

    /// Keep the remaining items in the original array.
    ///
    /// This stops the draining process. Elements that haven't been yielded
    /// stay in the array, followed by the tail.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([1, 2, 3, 4, 5]);
    /// let mut drain = arr.drain(1..4);
    /// assert_eq!(drain.next(), Some(2));
    /// drain.keep_rest();
    /// assert_eq!(arr, [1, 3, 4, 5]);
    /// ```
    pub fn keep_rest(self) {
        let mut this = ManuallyDrop::new(self);
        unsafe {
            let arr = this.arr.as_mut();
            let base = arr.buf.ptr();
            let start = arr.len();

            let unyielded = this.range_end - this.index;
            if this.index != start {
                ptr::copy(base.add(this.index), base.add(start), unyielded);
            }

            let kept = start + unyielded;
            if this.tail_start != kept {
                ptr::copy(base.add(this.tail_start), base.add(kept), this.tail_len);
            }
            arr.set_len(kept + this.tail_len);
        }
    }
}

impl<T, A: Allocator> Iterator for Drain<'_, T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.range_end {
            None
        } else {
            let arr = unsafe { self.arr.as_ref() };
            let value = unsafe { arr.buf.read_at(self.index) };
            self.index += 1;
            Some(value)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.range_end - self.index;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for Drain<'_, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.range_end {
            None
        } else {
            self.range_end -= 1;
            let arr = unsafe { self.arr.as_ref() };
            Some(unsafe { arr.buf.read_at(self.range_end) })
        }
    }
}

impl<T, A: Allocator> ExactSizeIterator for Drain<'_, T, A> {}

impl<T, A: Allocator> std::iter::FusedIterator for Drain<'_, T, A> {}

impl<T, A: Allocator> Drop for Drain<'_, T, A> {
    fn drop(&mut self) {
        /// Moves the tail back into place even if an element's destructor panics.
        struct DropGuard<'r, 'a, T, A: Allocator>(&'r mut Drain<'a, T, A>);

        impl<T, A: Allocator> Drop for DropGuard<'_, '_, T, A> {
            fn drop(&mut self) {
                let drain = &mut *self.0;
                if drain.tail_len == 0 {
                    return;
                }
                unsafe {
                    let arr = drain.arr.as_mut();
                    let start = arr.len();
                    if drain.tail_start != start {
                        let base = arr.buf.ptr();
                        ptr::copy(base.add(drain.tail_start), base.add(start), drain.tail_len);
                    }
                    arr.set_len(start + drain.tail_len);
                }
            }
        }

        let remaining = self.range_end - self.index;
        let first = unsafe { self.arr.as_ref().buf.slot(self.index) };
        self.index = self.range_end;

        let _guard = DropGuard(self);
        // Drop any remaining elements in the range that weren't consumed
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, remaining));
        }
    }
}

// Safety: Drain has exclusive access to the drained portion
unsafe impl<T: Sync, A: Allocator + Sync> Sync for Drain<'_, T, A> {}
unsafe impl<T: Send, A: Allocator + Send> Send for Drain<'_, T, A> {}

impl<T: std::fmt::Debug, A: Allocator> std::fmt::Debug for Drain<'_, T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Drain").field(&self.as_slice()).finish()
    }
}
