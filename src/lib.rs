//! A contiguous growable array with hand-managed storage.
//!
//! `DynArray` keeps its elements in one block obtained from an
//! [`Allocator`](allocator_api2::alloc::Allocator). The block is split into
//! the live range `[0, len)` and the reserved range `[len, capacity)`; every
//! operation moves that boundary by constructing or destroying elements,
//! growing the block by doubling when it runs out of room.
//!
//! # Example
//!
//! ```
//! use dynarray::DynArray;
//!
//! let mut arr: DynArray<i32> = DynArray::new();
//! for i in 1..=5 {
//!     arr.push_back(i);
//! }
//! assert_eq!(arr, [1, 2, 3, 4, 5]);
//! assert_eq!(arr.capacity(), 8);
//!
//! let at = arr.insert(1, 99);
//! assert_eq!(arr[at], 99);
//!
//! arr.erase_range(2..4);
//! assert_eq!(arr, [1, 99, 4, 5]);
//! assert!(arr.at(10).is_err());
//! ```

mod drain;
mod insert;
mod into_iter;
mod raw_vec;
mod spec_extend;
mod spec_from_iter;

use allocator_api2::alloc::{Allocator, Global};
pub use drain::Drain;
pub use into_iter::IntoIter;

use raw_vec::RawDynArray;
use spec_from_iter::SpecFromIter;
use std::alloc::Layout;
use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::ops::{Bound, Deref, DerefMut, Index, IndexMut, Range, RangeBounds};
use std::slice::SliceIndex;

/// The error returned when an array cannot get the storage it needs.
///
/// Produced by [`DynArray::try_reserve`], [`DynArray::try_push_back`],
/// [`DynArray::try_insert_n`], [`DynArray::try_resize`],
/// [`DynArray::try_clone`] and the other `try_*` operations. Use
/// [`kind`](Self::kind) to tell a capacity overflow from a refused
/// allocation; in both cases the array is left as it was.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TryReserveError {
    kind: TryReserveErrorKind,
}

/// Details of the allocation error that occurred.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveErrorKind {
    /// The capacity computation overflowed.
    CapacityOverflow,
    /// Memory allocation failed.
    AllocError { layout: Layout },
}

impl std::fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TryReserveErrorKind::CapacityOverflow => {
                write!(f, "memory allocation failed due to capacity overflow")
            }
            TryReserveErrorKind::AllocError { layout } => {
                write!(f, "memory allocation of {} bytes failed", layout.size())
            }
        }
    }
}

impl std::error::Error for TryReserveError {}

impl TryReserveError {
    pub(crate) fn capacity_overflow() -> Self {
        Self {
            kind: TryReserveErrorKind::CapacityOverflow,
        }
    }

    pub(crate) fn alloc_error(layout: Layout) -> Self {
        Self {
            kind: TryReserveErrorKind::AllocError { layout },
        }
    }

    /// Returns what went wrong.
    pub fn kind(&self) -> TryReserveErrorKind {
        self.kind.clone()
    }
}

/// Turns an allocation error into the panic or abort of an infallible call.
#[cold]
#[inline(never)]
pub(crate) fn handle_reserve_error(err: TryReserveError) -> ! {
    match err.kind {
        TryReserveErrorKind::CapacityOverflow => panic!("capacity overflow"),
        TryReserveErrorKind::AllocError { layout } => std::alloc::handle_alloc_error(layout),
    }
}

/// The error returned by [`DynArray::at`] for an index past the end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutOfRange {
    /// The index that was requested.
    pub index: usize,
    /// The length of the array at the time.
    pub len: usize,
}

impl std::fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} out of range for array of length {}",
            self.index, self.len
        )
    }
}

impl std::error::Error for OutOfRange {}

/// Resolves `range` against `len`, panicking like slice indexing does.
pub(crate) fn resolve_range<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start
            .checked_add(1)
            .expect("range start overflows usize"),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.checked_add(1).expect("range end overflows usize"),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    assert!(start <= end, "range start {start} is greater than end {end}");
    assert!(end <= len, "range end {end} out of bounds for length {len}");
    start..end
}

/// A contiguous growable array.
///
/// Elements live in a single block owned by the array. `len` slots at the
/// front hold constructed elements, the rest of the block is reserved but
/// uninitialized.
///
/// # Growth
///
/// When an operation needs more slots than are free, the block is replaced
/// by one of `max(1, 2 * capacity)` slots, or exactly as many as the
/// operation needs if that is larger. Pushing N elements from empty thus
/// costs O(N) moves in total. [`reserve`](Self::reserve) asks for an exact
/// capacity instead. Zero-sized types never allocate and report a capacity
/// of `usize::MAX`.
///
/// # Invalidation
///
/// The borrow checker keeps references from outliving a mutation. Raw
/// pointers from [`as_ptr`](Self::as_ptr) follow these rules:
/// - growing past the capacity, `reserve`, `shrink_to_fit` and `shrink_to`
///   move the block; every pointer is invalidated.
/// - `insert*`, `erase*`, `remove`, `drain` and `retain` keep the block but
///   shift elements at and after the first affected index.
/// - `push_back`/`emplace_back` within capacity, `pop_back`, `truncate` and
///   `clear` keep every element before the new end in place.
///
/// # Failure
///
/// Every operation that can allocate has a `try_*` form returning
/// [`TryReserveError`]; on error the array is left exactly as it was. The
/// plain forms panic on capacity overflow and call
/// [`handle_alloc_error`](std::alloc::handle_alloc_error) when the allocator
/// refuses. A panicking `Clone` or producer closure never leaks or
/// double-drops an element; insertions roll back completely.
pub struct DynArray<T, A: Allocator = Global> {
    /// Block, capacity and allocator
    pub(crate) buf: RawDynArray<T, A>,
    /// Number of initialized elements at the front of the block
    len: usize,
}

// Constructors using the global allocator
impl<T> DynArray<T> {
    /// Creates a new empty `DynArray`.
    ///
    /// Does not allocate until elements are pushed.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let arr: DynArray<i32> = DynArray::new();
    /// assert!(arr.is_empty());
    /// assert_eq!(arr.capacity(), 0);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a new `DynArray` with exactly the specified capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let arr: DynArray<i32> = DynArray::with_capacity(100);
    /// assert_eq!(arr.capacity(), 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_in(capacity, Global)
    }

    /// Creates an array of `n` clones of `value`, with capacity exactly `n`.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let arr = DynArray::from_elem("x".to_string(), 3);
    /// assert_eq!(arr, ["x", "x", "x"]);
    /// ```
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut arr = Self::with_capacity(n);
        arr.insert_n(0, n, value);
        arr
    }

    /// Creates an array of `n` default values, with capacity exactly `n`.
    pub fn with_len(n: usize) -> Self
    where
        T: Default,
    {
        let mut arr = Self::with_capacity(n);
        arr.resize_default(n);
        arr
    }
}

// Core implementation
impl<T, A: Allocator> DynArray<T, A> {
    /// Creates a new empty `DynArray` that will allocate from `alloc`.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buf: RawDynArray::new_in(alloc),
            len: 0,
        }
    }

    /// Creates a new `DynArray` with exactly `capacity` slots from `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::try_with_capacity_in(capacity, alloc).unwrap_or_else(|err| handle_reserve_error(err))
    }

    /// Fallible form of [`with_capacity_in`](Self::with_capacity_in).
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        Ok(Self {
            buf: RawDynArray::try_with_capacity_in(capacity, alloc)?,
            len: 0,
        })
    }

    /// Returns the number of elements in the array.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the largest length the array could ever reach.
    ///
    /// Allocations are limited to `isize::MAX` bytes; zero-sized types are
    /// counted as one byte each.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let arr: DynArray<u32> = DynArray::new();
    /// assert_eq!(arr.max_size(), isize::MAX as usize / 4);
    /// ```
    #[inline]
    pub const fn max_size(&self) -> usize {
        let size = std::mem::size_of::<T>();
        isize::MAX as usize / if size == 0 { 1 } else { size }
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns a raw pointer to the start of the block.
    ///
    /// The pointer is dangling while nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    /// Returns a raw mutable pointer to the start of the block.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    /// Extracts a slice containing the live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    /// Extracts a mutable slice containing the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Sets the length without any checks.
    ///
    /// # Safety
    ///
    /// `new_len` must not exceed the capacity and exactly the slots below it
    /// must hold live elements.
    #[inline]
    pub(crate) unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Ensures the capacity is at least `capacity`.
    ///
    /// This is a total, not an additional, amount. If the array has to grow
    /// it allocates exactly `capacity` slots; otherwise it does nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr: DynArray<i32> = DynArray::new();
    /// arr.reserve(100);
    /// let block = arr.as_ptr();
    /// arr.push_back(1);
    /// assert_eq!(arr.as_ptr(), block);
    /// ```
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            handle_reserve_error(err);
        }
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        self.buf.try_reserve_exact(self.len, capacity)
    }

    /// Ensures room for at least `additional` more elements, growing by the
    /// doubling policy.
    pub fn reserve_additional(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve_additional(additional) {
            handle_reserve_error(err);
        }
    }

    /// Fallible form of [`reserve_additional`](Self::reserve_additional).
    pub fn try_reserve_additional(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.buf.try_grow_amortized(self.len, additional)
    }

    /// Shrinks the capacity to match the current length.
    ///
    /// An empty array releases its block entirely.
    pub fn shrink_to_fit(&mut self) {
        self.shrink_to(0);
    }

    /// Shrinks the capacity to `max(len, min_capacity)`.
    pub fn shrink_to(&mut self, min_capacity: usize) {
        if let Err(err) = self.buf.try_shrink_to(self.len, min_capacity.max(self.len)) {
            handle_reserve_error(err);
        }
    }

    /// Returns a reference to the element at `index`, or [`OutOfRange`].
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::{DynArray, OutOfRange};
    /// let arr = DynArray::from([1, 2, 3]);
    /// assert_eq!(arr.at(1), Ok(&2));
    /// assert_eq!(arr.at(10), Err(OutOfRange { index: 10, len: 3 }));
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len;
        self.as_slice().get(index).ok_or(OutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`, or [`OutOfRange`].
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(OutOfRange { index, len })
    }

    /// Returns the first element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty. Use [`first`](slice::first) for a
    /// checked lookup.
    #[inline]
    pub fn front(&self) -> &T {
        self.as_slice().first().expect("front() called on an empty DynArray")
    }

    /// Returns the first element mutably.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        self.as_mut_slice()
            .first_mut()
            .expect("front_mut() called on an empty DynArray")
    }

    /// Returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty. Use [`last`](slice::last) for a
    /// checked lookup.
    #[inline]
    pub fn back(&self) -> &T {
        self.as_slice().last().expect("back() called on an empty DynArray")
    }

    /// Returns the last element mutably.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        self.as_mut_slice()
            .last_mut()
            .expect("back_mut() called on an empty DynArray")
    }

    /// Appends an element to the back of the array.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr: DynArray<i32> = DynArray::new();
    /// arr.push_back(1);
    /// arr.push_back(2);
    /// assert_eq!(arr.len(), 2);
    /// ```
    #[inline]
    pub fn push_back(&mut self, value: T) {
        if self.len == self.buf.capacity() {
            self.grow_one();
        }
        unsafe {
            self.buf.construct_at(self.len, value);
        }
        self.len += 1;
    }

    /// Fallible form of [`push_back`](Self::push_back).
    ///
    /// On error `value` is dropped and the array is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<(), TryReserveError> {
        self.buf.try_grow_amortized(self.len, 1)?;
        unsafe {
            self.buf.construct_at(self.len, value);
        }
        self.len += 1;
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn grow_one(&mut self) {
        if let Err(err) = self.buf.try_grow_amortized(self.len, 1) {
            handle_reserve_error(err);
        }
    }

    /// Constructs the value returned by `make` directly in the slot past the
    /// end and returns a reference to it.
    ///
    /// Room is made before `make` runs, so a panic in `make` leaves the
    /// elements untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr: DynArray<String> = DynArray::new();
    /// arr.emplace_back(|| "hello".to_string()).push_str(" world");
    /// assert_eq!(arr[0], "hello world");
    /// ```
    pub fn emplace_back<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.len == self.buf.capacity() {
            self.grow_one();
        }
        let index = self.len;
        unsafe {
            self.buf.construct_at(index, make());
            self.len += 1;
            &mut *self.buf.slot(index)
        }
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([1, 2]);
    /// assert_eq!(arr.pop_back(), Some(2));
    /// assert_eq!(arr.pop_back(), Some(1));
    /// assert_eq!(arr.pop_back(), None);
    /// ```
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.buf.read_at(self.len) })
    }

    /// Shortens the array, keeping the first `len` elements and dropping the rest.
    ///
    /// Has no effect if `len` is not below the current length. The capacity
    /// is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let dropped = self.len - len;

        // Update len BEFORE dropping to prevent double-free if drop panics
        self.len = len;
        unsafe {
            self.buf.destroy_range(len, dropped);
        }
    }

    /// Clears the array, removing all elements.
    ///
    /// This drops all elements but keeps the allocated memory.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes and returns the element at position `index`, shifting all
    /// elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );

        unsafe {
            let removed = self.buf.read_at(index);
            let hole = self.buf.slot(index);
            std::ptr::copy(hole.add(1), hole, len - index - 1);
            self.len = len - 1;
            removed
        }
    }

    /// Destroys the element at `index`, shifts the tail down by one and
    /// returns `index`, which now holds the element that followed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Destroys the elements in `range`, shifts the tail down to close the
    /// hole and returns the start of the range.
    ///
    /// An empty range is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends past the end.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([1, 2, 3, 4]);
    /// assert_eq!(arr.erase_range(1..3), 1);
    /// assert_eq!(arr, [1, 4]);
    /// ```
    pub fn erase_range<R>(&mut self, range: R) -> usize
    where
        R: RangeBounds<usize>,
    {
        let range = resolve_range(range, self.len);
        let start = range.start;
        self.drain(range);
        start
    }

    /// Removes an element from the array and returns it.
    ///
    /// The removed element is replaced by the last element of the array.
    /// This does not preserve ordering, but is O(1).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "swap_remove index (is {index}) should be < len (is {len})"
        );
        unsafe {
            let value = self.buf.read_at(index);
            let last = self.buf.slot(len - 1);
            std::ptr::copy(last, self.buf.slot(index), 1);
            self.len = len - 1;
            value
        }
    }

    /// Creates a draining iterator that removes the specified range and
    /// yields the removed elements.
    ///
    /// When the iterator is dropped, any elements it did not yield are
    /// destroyed and the tail is shifted down.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends past the end.
    pub fn drain<R>(&mut self, range: R) -> Drain<'_, T, A>
    where
        R: RangeBounds<usize>,
    {
        let Range { start, end } = resolve_range(range, self.len);
        Drain::new(self, start, end)
    }

    /// Retains only the elements specified by the predicate.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.retain_mut(|elem| f(elem));
    }

    /// Retains only the elements specified by the predicate, with mutable access.
    ///
    /// Uses a read cursor and a write cursor that traverse linearly; kept
    /// elements are moved down over the holes left by removed ones.
    pub fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        struct BackshiftOnDrop<'a, T, A: Allocator> {
            arr: &'a mut DynArray<T, A>,
            processed: usize,
            deleted: usize,
            original_len: usize,
        }

        impl<T, A: Allocator> Drop for BackshiftOnDrop<'_, T, A> {
            fn drop(&mut self) {
                // Runs on panic too: close the hole over the unprocessed elements.
                if self.deleted > 0 {
                    unsafe {
                        std::ptr::copy(
                            self.arr.buf.slot(self.processed),
                            self.arr.buf.slot(self.processed - self.deleted),
                            self.original_len - self.processed,
                        );
                    }
                }
                self.arr.len = self.original_len - self.deleted;
            }
        }

        let original_len = self.len;
        // Hide every element until the guard restores the length.
        self.len = 0;
        let mut guard = BackshiftOnDrop {
            arr: self,
            processed: 0,
            deleted: 0,
            original_len,
        };

        while guard.processed != original_len {
            let cur = unsafe { &mut *guard.arr.buf.slot(guard.processed) };
            if !f(cur) {
                guard.processed += 1;
                guard.deleted += 1;
                unsafe {
                    std::ptr::drop_in_place(cur);
                }
                continue;
            }
            if guard.deleted > 0 {
                unsafe {
                    let hole = guard.arr.buf.slot(guard.processed - guard.deleted);
                    std::ptr::copy_nonoverlapping(cur, hole, 1);
                }
            }
            guard.processed += 1;
        }
    }

    /// Resizes the array to `new_len` elements using `f` to produce new ones.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        let additional = new_len - self.len;
        if let Err(err) = self.try_insert_with(self.len, additional, || Some(f())) {
            handle_reserve_error(err);
        }
    }

    /// Resizes the array to `new_len`, filling new slots with clones of `value`.
    ///
    /// Shrinking drops the trailing elements; resizing to the current
    /// length does nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut arr = DynArray::from([1, 2, 3]);
    /// arr.resize(5, 0);
    /// assert_eq!(arr, [1, 2, 3, 0, 0]);
    /// arr.resize(1, 0);
    /// assert_eq!(arr, [1]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        if let Err(err) = self.try_resize(new_len, value) {
            handle_reserve_error(err);
        }
    }

    /// Fallible form of [`resize`](Self::resize).
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), TryReserveError>
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        let additional = new_len - self.len;
        self.try_insert_with(self.len, additional, insert::repeat_n(value, additional))?;
        Ok(())
    }

    /// Resizes the array to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Clones the array, reporting allocation failure instead of aborting.
    ///
    /// The copy has capacity exactly `len`.
    pub fn try_clone(&self) -> Result<Self, TryReserveError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::try_with_capacity_in(self.len, self.buf.allocator().clone())?;
        let mut items = self.iter();
        copy.try_insert_with(0, self.len, || items.next().cloned())?;
        Ok(copy)
    }

    /// Moves the contents out, leaving this array empty with no allocation.
    ///
    /// # Example
    ///
    /// ```
    /// use dynarray::DynArray;
    /// let mut a = DynArray::from([1, 2, 3]);
    /// let b = a.take();
    /// assert_eq!(b, [1, 2, 3]);
    /// assert_eq!((a.len(), a.capacity()), (0, 0));
    /// ```
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.buf.allocator().clone());
        std::mem::replace(self, empty)
    }

    /// Replaces the contents with `n` clones of `value`.
    pub fn assign(&mut self, n: usize, value: T)
    where
        T: Clone,
    {
        self.clear();
        self.reserve(n);
        self.insert_n(0, n, value);
    }

    /// Replaces the contents with clones of the elements of `items`.
    pub fn assign_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.clear();
        self.reserve(items.len());
        self.insert_from_slice(0, items);
    }

    /// Replaces the contents with the items of `iter`.
    pub fn assign_iter<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.extend(iter);
    }

    /// Appends clones of all elements of `other`.
    pub fn extend_from_slice(&mut self, other: &[T])
    where
        T: Clone,
    {
        self.insert_from_slice(self.len, other);
    }
}

// Trait implementations
impl<T, A: Allocator> Drop for DynArray<T, A> {
    fn drop(&mut self) {
        unsafe {
            self.buf.destroy_range(0, self.len);
        }
        // RawDynArray will be dropped automatically and free the memory
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for DynArray<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| handle_reserve_error(err))
    }

    /// Builds the copy first, so the old contents are released only once
    /// cloning has succeeded.
    fn clone_from(&mut self, source: &Self) {
        let copy = source.clone();
        *self = copy;
    }
}

impl<T, A: Allocator> Deref for DynArray<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> DerefMut for DynArray<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator> AsRef<[T]> for DynArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator> AsMut<[T]> for DynArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: Allocator> Borrow<[T]> for DynArray<T, A> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator> BorrowMut<[T]> for DynArray<T, A> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, U, A1: Allocator, A2: Allocator> PartialEq<DynArray<U, A2>> for DynArray<T, A1>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynArray<U, A2>) -> bool {
        self[..] == other[..]
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<[U]> for DynArray<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self[..] == other[..]
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<&[U]> for DynArray<T, A> {
    fn eq(&self, other: &&[U]) -> bool {
        self[..] == other[..]
    }
}

impl<T: PartialEq<U>, U, A: Allocator, const N: usize> PartialEq<[U; N]> for DynArray<T, A> {
    fn eq(&self, other: &[U; N]) -> bool {
        self[..] == other[..]
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<Vec<U>> for DynArray<T, A> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self[..] == other[..]
    }
}

impl<T: Eq, A: Allocator> Eq for DynArray<T, A> {}

impl<T: PartialOrd, A: Allocator> PartialOrd for DynArray<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Ord, A: Allocator> Ord for DynArray<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T: std::hash::Hash, A: Allocator> std::hash::Hash for DynArray<T, A> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&**self, state);
    }
}

impl<T: std::fmt::Debug, A: Allocator> std::fmt::Debug for DynArray<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&**self, f)
    }
}

impl<T, A: Allocator + Default> Default for DynArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator> Index<I> for DynArray<T, A> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator> IndexMut<I> for DynArray<T, A> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, A: Allocator> Extend<T> for DynArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        spec_extend::extend_with_size_hint_check(self, iter.into_iter());
    }
}

impl<'a, T: Clone + 'a, A: Allocator> Extend<&'a T> for DynArray<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        spec_extend::extend_with_size_hint_check(self, iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        <Self as SpecFromIter<T, I::IntoIter>>::from_iter(iter.into_iter())
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(items: &[T]) -> Self {
        let mut arr = Self::with_capacity(items.len());
        arr.insert_from_slice(0, items);
        arr
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T, A: Allocator> IntoIterator for DynArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a DynArray<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut DynArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Creates a [`DynArray`] containing the arguments.
///
/// ```
/// use dynarray::dynarray;
/// let a = dynarray![1, 2, 3];
/// let b = dynarray![0; 4];
/// assert_eq!(a, [1, 2, 3]);
/// assert_eq!(b, [0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! dynarray {
    () => {
        $crate::DynArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynArray::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynArray::from([$($x),+])
    };
}
