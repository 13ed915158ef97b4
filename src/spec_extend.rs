//! Range insertion driven by runtime size_hint checking.
//!
//! Uses size_hint() to detect when exact size is known (lower == upper).
//! Such iterators get one growth decision for the whole batch; anything
//! else is inserted element by element.

use crate::{handle_reserve_error, DynArray};
use allocator_api2::alloc::Allocator;

/// Insert `iter` before `index` using a runtime size_hint check.
/// Returns the number of elements inserted.
#[inline]
pub(crate) fn insert_with_size_hint_check<T, A: Allocator, I: Iterator<Item = T>>(
    arr: &mut DynArray<T, A>,
    index: usize,
    iter: I,
) -> usize {
    let (lower, upper) = iter.size_hint();

    // If we have an exact size, use the batch path
    if let Some(upper) = upper {
        if lower == upper && lower > 0 {
            return insert_exact(arr, index, iter, lower);
        }
    }

    insert_desugared(arr, index, iter)
}

/// Extend using runtime size_hint check.
#[inline]
pub(crate) fn extend_with_size_hint_check<T, A: Allocator, I: Iterator<Item = T>>(
    arr: &mut DynArray<T, A>,
    iter: I,
) {
    let (lower, upper) = iter.size_hint();

    if let Some(upper) = upper {
        if lower == upper && lower > 0 {
            let len = arr.len();
            insert_exact(arr, len, iter, lower);
            return;
        }
    }

    extend_desugared(arr, iter);
}

/// Inserts `count` elements in one batch, then whatever the iterator still
/// holds if its hint was too low.
///
/// The first `None` ends the insert, even for iterators that are not fused.
fn insert_exact<T, A: Allocator, I: Iterator<Item = T>>(
    arr: &mut DynArray<T, A>,
    index: usize,
    iter: I,
    count: usize,
) -> usize {
    let mut iter = iter.fuse();
    let filled = arr
        .try_insert_with(index, count, || iter.next())
        .unwrap_or_else(|err| handle_reserve_error(err));
    filled + insert_desugared(arr, index + filled, iter)
}

/// One insert per element, for iterators that cannot say how long they are.
fn insert_desugared<T, A: Allocator, I: Iterator<Item = T>>(
    arr: &mut DynArray<T, A>,
    index: usize,
    iter: I,
) -> usize {
    let mut at = index;
    for item in iter {
        arr.insert(at, item);
        at += 1;
    }
    at - index
}

#[inline(never)]
#[cold]
fn extend_desugared<T, A: Allocator, I: Iterator<Item = T>>(arr: &mut DynArray<T, A>, iter: I) {
    let (lower, _) = iter.size_hint();
    arr.reserve_additional(lower);
    for item in iter {
        arr.push_back(item);
    }
}
