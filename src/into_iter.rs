//! Owning iterator for `DynArray`.

use crate::DynArray;
use allocator_api2::alloc::{Allocator, Global};

/// An owning iterator over elements of a `DynArray`.
///
/// This struct is created by the `into_iter` method on `DynArray`
/// (provided by the [`IntoIterator`] trait). It keeps the array's block and
/// releases it once the iterator is dropped.
pub struct IntoIter<T, A: Allocator = Global> {
    /// Elements `index..arr.len()` are still owned by the iterator
    pub(crate) arr: DynArray<T, A>,
    pub(crate) index: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// Creates a new owning iterator from a `DynArray`.
    #[inline]
    pub fn new(arr: DynArray<T, A>) -> Self {
        Self { arr, index: 0 }
    }

    /// Returns the remaining items as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.arr[self.index..]
    }

    /// Returns the remaining items as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let index = self.index;
        &mut self.arr[index..]
    }

    /// Returns a reference to the underlying allocator.
    pub fn allocator(&self) -> &A {
        self.arr.allocator()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.arr.len() {
            return None;
        }
        // Safety: index < len, so the element exists and is initialized
        let value = unsafe { self.arr.buf.read_at(self.index) };
        self.index += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.arr.len() - self.index;
        (remaining, Some(remaining))
    }

    #[inline]
    fn count(self) -> usize {
        self.arr.len() - self.index
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.arr.len() {
            return None;
        }
        let new_len = self.arr.len() - 1;
        // Safety: new_len < old len, and the element is read out before the
        // length shrinks past it
        unsafe {
            let value = self.arr.buf.read_at(new_len);
            self.arr.set_len(new_len);
            Some(value)
        }
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> std::iter::FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let len = self.arr.len();
        // Safety: the first `index` elements were moved out already; hide
        // them all before dropping the rest so a panicking destructor
        // cannot cause a double drop
        unsafe {
            self.arr.set_len(0);
            self.arr.buf.destroy_range(self.index, len - self.index);
        }
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for IntoIter<T, A> {
    fn clone(&self) -> Self {
        let remaining = self.as_slice();
        let mut arr = DynArray::with_capacity_in(remaining.len(), self.allocator().clone());
        arr.extend_from_slice(remaining);
        IntoIter { arr, index: 0 }
    }
}

impl<T: std::fmt::Debug, A: Allocator> std::fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::DynArray;

    #[test]
    fn test_into_iter() {
        let arr: DynArray<i32> = (0..10).collect();
        let collected: Vec<i32> = arr.into_iter().collect();
        let expected: Vec<i32> = (0..10).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_into_iter_both_ends() {
        let arr = DynArray::from(["a", "b", "c", "d"].map(String::from));
        let mut iter = arr.into_iter();
        assert_eq!(iter.next().as_deref(), Some("a"));
        assert_eq!(iter.next_back().as_deref(), Some("d"));
        assert_eq!(iter.as_slice(), ["b", "c"]);
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn test_into_iter_partial_drop() {
        use std::rc::Rc;

        let shared = Rc::new(());
        let arr: DynArray<Rc<()>> = (0..5).map(|_| shared.clone()).collect();
        let mut iter = arr.into_iter();
        let first = iter.next();
        drop(iter);
        assert_eq!(Rc::strong_count(&shared), 2);
        drop(first);
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn test_into_iter_clone() {
        let mut iter = DynArray::from([1, 2, 3]).into_iter();
        iter.next();
        let copy = iter.clone();
        assert_eq!(copy.collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(iter.collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_into_iter_mut_slice() {
        let mut iter = DynArray::from([1, 2, 3]).into_iter();
        iter.next();
        iter.as_mut_slice()[0] = 20;
        assert_eq!(iter.next(), Some(20));
    }
}
