//! Positional insertion for `DynArray`.
//!
//! Every insert funnels into [`DynArray::try_insert_with`], which makes one
//! growth decision for the whole batch:
//!
//! - If `len + count` fits in the capacity, the tail is shifted up in place
//!   and the gap is filled from a producer closure.
//! - Otherwise a block of `max(2 * capacity, len + count)` slots is
//!   allocated, the new elements are written into it first, and only then
//!   are the old elements moved across and the old block released.
//!
//! Both paths hold a guard while the producer runs. If the producer panics
//! the guard destroys what was written and puts the array back the way it
//! was, so an insertion either completes or leaves no trace.

use std::mem::ManuallyDrop;
use std::ops::RangeBounds;
use std::ptr::{self, NonNull};

use allocator_api2::alloc::Allocator;
use log::trace;

use crate::raw_vec::RawDynArray;
use crate::{handle_reserve_error, resolve_range, spec_extend, DynArray, TryReserveError};

/// Gap opened by shifting the tail up inside the current block.
///
/// Slots `index..index + filled` hold new elements, slots
/// `index + filled..index + count` are uninitialized and the `tail` old
/// elements sit at `index + count`.
struct Gap<T> {
    base: *mut T,
    index: usize,
    count: usize,
    filled: usize,
    tail: usize,
}

impl<T> Gap<T> {
    /// Closes whatever part of the gap was not filled and returns how many
    /// elements were inserted.
    fn commit(self) -> usize {
        let this = ManuallyDrop::new(self);
        if this.filled < this.count {
            unsafe {
                ptr::copy(
                    this.base.add(this.index + this.count),
                    this.base.add(this.index + this.filled),
                    this.tail,
                );
            }
        }
        this.filled
    }
}

impl<T> Drop for Gap<T> {
    fn drop(&mut self) {
        // Only reached when the producer panicked.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.base.add(self.index),
                self.filled,
            ));
            ptr::copy(
                self.base.add(self.index + self.count),
                self.base.add(self.index),
                self.tail,
            );
        }
    }
}

/// Fresh block being filled before it replaces the current one.
struct Block<'a, T, A: Allocator> {
    buf: &'a RawDynArray<T, A>,
    ptr: NonNull<T>,
    capacity: usize,
    start: usize,
    filled: usize,
}

impl<T, A: Allocator> Drop for Block<'_, T, A> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(self.start),
                self.filled,
            ));
            self.buf.release_block(self.ptr, self.capacity);
        }
    }
}

/// Producer yielding `count` copies of `value`, cloning for all but the last.
pub(crate) fn repeat_n<T: Clone>(value: T, count: usize) -> impl FnMut() -> Option<T> {
    let mut value = Some(value);
    let mut remaining = count;
    move || {
        if remaining == 0 {
            return None;
        }
        remaining -= 1;
        if remaining == 0 {
            value.take()
        } else {
            value.clone()
        }
    }
}

impl<T, A: Allocator> DynArray<T, A> {
    /// Inserts `value` before position `index`, shifting later elements up.
    ///
    /// Returns `index`, where the new element now lives. `index == len`
    /// appends.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([10, 20, 30]);
    /// let pos = arr.insert(1, 15);
    /// assert_eq!(pos, 1);
    /// assert_eq!(arr, [10, 15, 20, 30]);
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        self.try_insert(index, value)
            .unwrap_or_else(|err| handle_reserve_error(err))
    }

    /// Fallible form of [`insert`](Self::insert).
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<usize, TryReserveError> {
        let mut value = Some(value);
        self.try_insert_with(index, 1, || value.take())?;
        Ok(index)
    }

    /// Constructs the value returned by `make` directly before `index`.
    ///
    /// Room is made before `make` runs. If `make` panics the array is left
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace<F>(&mut self, index: usize, make: F) -> usize
    where
        F: FnOnce() -> T,
    {
        let mut make = Some(make);
        if let Err(err) = self.try_insert_with(index, 1, || make.take().map(|f| f())) {
            handle_reserve_error(err);
        }
        index
    }

    /// Inserts `count` clones of `value` before `index`.
    ///
    /// Returns `index`. Inserting zero copies changes nothing.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([1, 5]);
    /// arr.insert_n(1, 3, 0);
    /// assert_eq!(arr, [1, 0, 0, 0, 5]);
    /// ```
    pub fn insert_n(&mut self, index: usize, count: usize, value: T) -> usize
    where
        T: Clone,
    {
        self.try_insert_n(index, count, value)
            .unwrap_or_else(|err| handle_reserve_error(err))
    }

    /// Fallible form of [`insert_n`](Self::insert_n).
    pub fn try_insert_n(
        &mut self,
        index: usize,
        count: usize,
        value: T,
    ) -> Result<usize, TryReserveError>
    where
        T: Clone,
    {
        self.try_insert_with(index, count, repeat_n(value, count))?;
        Ok(index)
    }

    /// Inserts clones of every element of `items` before `index`, in order.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_from_slice(&mut self, index: usize, items: &[T]) -> usize
    where
        T: Clone,
    {
        let mut items = items.iter();
        if let Err(err) = self.try_insert_with(index, items.len(), || items.next().cloned()) {
            handle_reserve_error(err);
        }
        index
    }

    /// Inserts the items of `iter` before `index`, in order, and returns `index`.
    ///
    /// Iterators reporting an exact size are inserted as one batch with a
    /// single growth decision. Anything else is inserted one element at a
    /// time; if such an iterator panics the elements already inserted stay.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        spec_extend::insert_with_size_hint_check(self, index, iter.into_iter());
        index
    }

    /// Inserts clones of the elements in `range` of this array before `index`.
    ///
    /// The source is copied out before anything moves, so ranges that
    /// overlap the insertion point are handled.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([1, 2, 3]);
    /// arr.insert_from_within(1, ..);
    /// assert_eq!(arr, [1, 1, 2, 3, 2, 3]);
    /// ```
    pub fn insert_from_within<R>(&mut self, index: usize, range: R) -> usize
    where
        R: RangeBounds<usize>,
        T: Clone,
    {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        let range = resolve_range(range, len);
        let copies: DynArray<T> = self[range].iter().cloned().collect();
        self.insert_iter(index, copies)
    }

    /// Inserts up to `count` elements pulled from `next` before `index`.
    ///
    /// Stops early if `next` returns `None`; the gap left by missing
    /// elements is closed. Returns the number of elements inserted.
    pub(crate) fn try_insert_with<F>(
        &mut self,
        index: usize,
        count: usize,
        next: F,
    ) -> Result<usize, TryReserveError>
    where
        F: FnMut() -> Option<T>,
    {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        if count == 0 {
            return Ok(0);
        }

        let required = len
            .checked_add(count)
            .ok_or_else(TryReserveError::capacity_overflow)?;
        if required <= self.buf.capacity() {
            let filled = unsafe { self.shift_and_fill(index, count, next) };
            self.len += filled;
            Ok(filled)
        } else {
            let new_capacity = self.buf.amortized_capacity(required);
            self.relocate_and_fill(index, count, new_capacity, next)
        }
    }

    /// # Safety
    ///
    /// `len + count` must not exceed the capacity.
    unsafe fn shift_and_fill<F>(&mut self, index: usize, count: usize, mut next: F) -> usize
    where
        F: FnMut() -> Option<T>,
    {
        let base = self.buf.ptr();
        let tail = self.len - index;
        ptr::copy(base.add(index), base.add(index + count), tail);

        let mut gap = Gap {
            base,
            index,
            count,
            filled: 0,
            tail,
        };
        while gap.filled < count {
            match next() {
                Some(value) => {
                    ptr::write(base.add(index + gap.filled), value);
                    gap.filled += 1;
                }
                None => break,
            }
        }
        gap.commit()
    }

    fn relocate_and_fill<F>(
        &mut self,
        index: usize,
        count: usize,
        new_capacity: usize,
        mut next: F,
    ) -> Result<usize, TryReserveError>
    where
        F: FnMut() -> Option<T>,
    {
        let new_ptr = self.buf.allocate_block(new_capacity)?;
        let mut block = Block {
            buf: &self.buf,
            ptr: new_ptr,
            capacity: new_capacity,
            start: index,
            filled: 0,
        };
        while block.filled < count {
            match next() {
                Some(value) => unsafe {
                    ptr::write(new_ptr.as_ptr().add(index + block.filled), value);
                    block.filled += 1;
                },
                None => break,
            }
        }

        let filled = block.filled;
        if filled == 0 {
            // Nothing to insert; the guard hands the block back.
            drop(block);
            return Ok(0);
        }
        std::mem::forget(block);

        trace!(
            "inserting {} elements at {}: {} -> {} slots",
            filled,
            index,
            self.buf.capacity(),
            new_capacity
        );
        unsafe {
            let old = self.buf.ptr();
            ptr::copy_nonoverlapping(old, new_ptr.as_ptr(), index);
            ptr::copy_nonoverlapping(
                old.add(index),
                new_ptr.as_ptr().add(index + filled),
                self.len - index,
            );
            self.buf.replace_block(new_ptr, new_capacity);
        }
        self.len += filled;
        Ok(filled)
    }
}
