use crate::{handle_reserve_error, DynArray};

/// Helper trait for FromIterator implementation
/// Uses size_hint to size the block exactly when the length is known
pub(crate) trait SpecFromIter<T, I> {
    fn from_iter(iter: I) -> DynArray<T>;
}

impl<T, I> SpecFromIter<T, I> for DynArray<T>
where
    I: Iterator<Item = T>,
{
    #[inline]
    fn from_iter(iter: I) -> DynArray<T> {
        let (lower, upper) = iter.size_hint();

        // Check if we have an exact size (lower == upper)
        // This is true for ExactSizeIterator and many common iterators
        if let Some(upper) = upper {
            if lower == upper {
                return from_iter_exact_size(iter, lower);
            }
        }

        from_iter_fallback(iter, lower)
    }
}

/// Fast path for iterators with known exact size.
/// The first growth from empty allocates exactly `length` slots.
#[inline]
fn from_iter_exact_size<T, I: Iterator<Item = T>>(iter: I, length: usize) -> DynArray<T> {
    let mut iter = iter.fuse();
    let mut arr = DynArray::new();
    if let Err(err) = arr.try_insert_with(0, length, || iter.next()) {
        handle_reserve_error(err);
    }
    // Picks up anything an under-reporting hint left behind
    arr.extend(iter);
    arr
}

/// Fallback path for iterators without known exact size
#[inline(never)]
#[cold]
fn from_iter_fallback<T, I: Iterator<Item = T>>(iter: I, lower: usize) -> DynArray<T> {
    let mut arr = DynArray::with_capacity(lower);
    arr.extend(iter);
    arr
}
