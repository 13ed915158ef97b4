//! Raw buffer management for `DynArray`.
//!
//! This module handles low-level memory allocation for the array, similar to
//! how `RawVec` works for `Vec` in the standard library. It owns the block,
//! its capacity and the allocator, and provides the raw-slot construct and
//! destroy primitives. It never knows how many slots are initialized.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use allocator_api2::alloc::{Allocator, Global};
use log::{debug, trace};

use crate::TryReserveError;

/// Capacity of the first block allocated by demand-driven growth.
pub(crate) const MIN_NON_ZERO_CAP: usize = 1;

/// Factor applied to the current capacity when the array runs out of room.
pub(crate) const GROWTH_FACTOR: usize = 2;

/// Raw contiguous buffer that handles allocation without element management.
///
/// This is the low-level allocation primitive used by `DynArray`.
/// It manages the block pointer and capacity but does not track element
/// count or handle element initialization/destruction on its own.
pub(crate) struct RawDynArray<T, A: Allocator = Global> {
    /// Start of the block, dangling while `cap == 0` or for ZSTs
    ptr: NonNull<T>,
    /// Number of slots in the block
    cap: usize,
    alloc: A,
    /// Marker for type ownership
    _marker: PhantomData<T>,
}

impl<T, A: Allocator> RawDynArray<T, A> {
    /// Whether T is a zero-sized type
    const IS_ZST: bool = std::mem::size_of::<T>() == 0;

    /// Creates a new `RawDynArray` without allocating.
    #[inline]
    pub(crate) const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Creates a buffer with exactly `capacity` slots.
    pub(crate) fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        let mut raw = Self::new_in(alloc);
        raw.try_reserve_exact(0, capacity)?;
        Ok(raw)
    }

    /// Returns the number of slots, `usize::MAX` for zero-sized types.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.cap
        }
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Computes the capacity to grow to when `required` slots are needed.
    ///
    /// Doubles the current capacity (starting from `MIN_NON_ZERO_CAP`) and
    /// takes the larger of that and `required`.
    #[inline]
    pub(crate) fn amortized_capacity(&self, required: usize) -> usize {
        let doubled = if self.cap == 0 {
            MIN_NON_ZERO_CAP
        } else {
            self.cap.saturating_mul(GROWTH_FACTOR)
        };
        doubled.max(required)
    }

    /// Ensures room for `additional` slots past `len` using the doubling policy.
    ///
    /// The first `len` slots must be initialized; they are moved if the block
    /// is replaced. On error the buffer is untouched.
    pub(crate) fn try_grow_amortized(
        &mut self,
        len: usize,
        additional: usize,
    ) -> Result<(), TryReserveError> {
        let required = len
            .checked_add(additional)
            .ok_or_else(TryReserveError::capacity_overflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let new_capacity = self.amortized_capacity(required);
        self.try_reallocate(len, new_capacity)
    }

    /// Ensures the block has at least `capacity` slots, allocating exactly
    /// that many if it has to grow.
    pub(crate) fn try_reserve_exact(
        &mut self,
        len: usize,
        capacity: usize,
    ) -> Result<(), TryReserveError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.try_reallocate(len, capacity)
    }

    /// Shrinks the block to `capacity` slots, releasing it entirely at zero.
    ///
    /// Does not drop elements - `len` must not exceed `capacity`.
    pub(crate) fn try_shrink_to(&mut self, len: usize, capacity: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= capacity);
        if Self::IS_ZST || capacity >= self.cap {
            return Ok(());
        }
        self.try_reallocate(len, capacity)
    }

    /// Moves the first `len` elements into a fresh block of `new_capacity`
    /// slots and releases the old one.
    ///
    /// The new block is obtained before anything is touched, so a failed
    /// allocation leaves the buffer exactly as it was.
    fn try_reallocate(&mut self, len: usize, new_capacity: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= new_capacity);
        if Self::IS_ZST {
            return Ok(());
        }

        let new_ptr = self.allocate_block(new_capacity)?;
        trace!(
            "reallocating buffer: {} -> {} slots ({} live)",
            self.cap,
            new_capacity,
            len
        );

        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len);
            self.replace_block(new_ptr, new_capacity);
        }
        Ok(())
    }

    /// Obtains an uninitialized block of `capacity` slots from the allocator.
    ///
    /// Zero-sized requests are served with a dangling pointer.
    pub(crate) fn allocate_block(&self, capacity: usize) -> Result<NonNull<T>, TryReserveError> {
        if Self::IS_ZST || capacity == 0 {
            return Ok(NonNull::dangling());
        }

        let layout =
            Layout::array::<T>(capacity).map_err(|_| TryReserveError::capacity_overflow())?;
        match self.alloc.allocate(layout) {
            Ok(block) => Ok(block.cast()),
            Err(_) => {
                debug!("allocation of {} bytes failed", layout.size());
                Err(TryReserveError::alloc_error(layout))
            }
        }
    }

    /// Returns a block to the allocator without touching its contents.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`allocate_block`](Self::allocate_block) on this
    /// buffer with the same `capacity`, and must not be used afterwards.
    pub(crate) unsafe fn release_block(&self, ptr: NonNull<T>, capacity: usize) {
        if Self::IS_ZST || capacity == 0 {
            return;
        }
        // The same layout was valid when the block was allocated.
        let layout = Layout::from_size_align_unchecked(
            std::mem::size_of::<T>() * capacity,
            std::mem::align_of::<T>(),
        );
        self.alloc.deallocate(ptr.cast(), layout);
    }

    /// Adopts `ptr` as the new block and releases the old block.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`allocate_block`](Self::allocate_block) with
    /// `capacity`, and every live element of the old block must already
    /// have been moved out of it.
    pub(crate) unsafe fn replace_block(&mut self, ptr: NonNull<T>, capacity: usize) {
        let old_ptr = std::mem::replace(&mut self.ptr, ptr);
        let old_cap = std::mem::replace(&mut self.cap, capacity);
        self.release_block(old_ptr, old_cap);
    }

    /// Returns a raw pointer to the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be at most the capacity.
    #[inline]
    pub(crate) unsafe fn slot(&self, index: usize) -> *mut T {
        self.ptr.as_ptr().add(index)
    }

    /// Constructs `value` in the uninitialized slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be below the capacity and the slot must not hold a live
    /// element (it would be leaked).
    #[inline]
    pub(crate) unsafe fn construct_at(&mut self, index: usize, value: T) {
        ptr::write(self.slot(index), value);
    }

    /// Moves the element out of the slot at `index`, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// The slot must hold a live element, which the caller now owns.
    #[inline]
    pub(crate) unsafe fn read_at(&self, index: usize) -> T {
        ptr::read(self.slot(index))
    }

    /// Runs the destructors of `count` live elements starting at `start`.
    ///
    /// # Safety
    ///
    /// Every slot in `start..start + count` must hold a live element; they
    /// are uninitialized afterwards.
    #[inline]
    pub(crate) unsafe fn destroy_range(&mut self, start: usize, count: usize) {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.slot(start), count));
    }
}

impl<T, A: Allocator> Drop for RawDynArray<T, A> {
    fn drop(&mut self) {
        // Note: This only frees memory, it doesn't drop elements.
        // DynArray must drop elements before RawDynArray is dropped.
        unsafe {
            self.release_block(self.ptr, self.cap);
        }
    }
}

// Safety: RawDynArray owns its allocation and T/A determine thread safety
unsafe impl<T: Send, A: Allocator + Send> Send for RawDynArray<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawDynArray<T, A> {}
