//! Comparison tests between DynArray and std::Vec
//!
//! This module provides property-based testing that compares the behavior of
//! DynArray with std::Vec to automatically catch behavioral discrepancies,
//! and checks the capacity rules std::Vec leaves unspecified.

use dynarray::DynArray;
use proptest::prelude::*;

// ============================================================================
// COMPARISON TESTING INFRASTRUCTURE
// ============================================================================

/// A trait that abstracts the array operations for comparison testing.
/// Both Vec<T> and DynArray<T> implement these operations.
trait ArrayLike<T> {
    fn push_back_val(&mut self, value: T);
    fn pop_back_val(&mut self) -> Option<T>;
    fn insert_val(&mut self, index: usize, value: T) -> usize;
    fn insert_n_val(&mut self, index: usize, count: usize, value: T) -> usize
    where
        T: Clone;
    fn insert_iter_val<I: IntoIterator<Item = T>>(&mut self, index: usize, iter: I) -> usize;
    fn erase_val(&mut self, index: usize) -> usize;
    fn erase_range_val(&mut self, start: usize, end: usize) -> usize;
    fn resize_val(&mut self, len: usize, value: T)
    where
        T: Clone;
    fn truncate_val(&mut self, len: usize);
    fn clear_val(&mut self);
    fn extend_val<I: IntoIterator<Item = T>>(&mut self, iter: I);
}

impl<T> ArrayLike<T> for Vec<T> {
    fn push_back_val(&mut self, value: T) {
        self.push(value);
    }
    fn pop_back_val(&mut self) -> Option<T> {
        self.pop()
    }
    fn insert_val(&mut self, index: usize, value: T) -> usize {
        self.insert(index, value);
        index
    }
    fn insert_n_val(&mut self, index: usize, count: usize, value: T) -> usize
    where
        T: Clone,
    {
        self.splice(index..index, std::iter::repeat(value).take(count));
        index
    }
    fn insert_iter_val<I: IntoIterator<Item = T>>(&mut self, index: usize, iter: I) -> usize {
        self.splice(index..index, iter);
        index
    }
    fn erase_val(&mut self, index: usize) -> usize {
        self.remove(index);
        index
    }
    fn erase_range_val(&mut self, start: usize, end: usize) -> usize {
        self.drain(start..end);
        start
    }
    fn resize_val(&mut self, len: usize, value: T)
    where
        T: Clone,
    {
        self.resize(len, value);
    }
    fn truncate_val(&mut self, len: usize) {
        self.truncate(len);
    }
    fn clear_val(&mut self) {
        self.clear();
    }
    fn extend_val<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend(iter);
    }
}

impl<T> ArrayLike<T> for DynArray<T> {
    fn push_back_val(&mut self, value: T) {
        self.push_back(value);
    }
    fn pop_back_val(&mut self) -> Option<T> {
        self.pop_back()
    }
    fn insert_val(&mut self, index: usize, value: T) -> usize {
        self.insert(index, value)
    }
    fn insert_n_val(&mut self, index: usize, count: usize, value: T) -> usize
    where
        T: Clone,
    {
        self.insert_n(index, count, value)
    }
    fn insert_iter_val<I: IntoIterator<Item = T>>(&mut self, index: usize, iter: I) -> usize {
        self.insert_iter(index, iter)
    }
    fn erase_val(&mut self, index: usize) -> usize {
        self.erase(index)
    }
    fn erase_range_val(&mut self, start: usize, end: usize) -> usize {
        self.erase_range(start..end)
    }
    fn resize_val(&mut self, len: usize, value: T)
    where
        T: Clone,
    {
        self.resize(len, value);
    }
    fn truncate_val(&mut self, len: usize) {
        self.truncate(len);
    }
    fn clear_val(&mut self) {
        self.clear();
    }
    fn extend_val<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend(iter);
    }
}

/// Operations that can be applied to an array for comparison testing.
#[derive(Debug, Clone)]
enum ArrayOp<T> {
    PushBack(T),
    PopBack,
    Insert(usize, T),
    InsertN(usize, usize, T),
    InsertIter(usize, Vec<T>),
    /// Inserts only the even values, so the iterator has no exact size
    InsertFiltered(usize, Vec<T>),
    Erase(usize),
    EraseRange(usize, usize),
    Resize(usize, T),
    Truncate(usize),
    Clear,
    Extend(Vec<T>),
    ShrinkToFit,
    Reserve(usize),
}

/// Apply an operation to both arrays and compare results.
fn apply_op(std_vec: &mut Vec<i32>, arr: &mut DynArray<i32>, op: &ArrayOp<i32>) {
    let len = std_vec.len();
    match op {
        ArrayOp::PushBack(v) => {
            std_vec.push_back_val(*v);
            arr.push_back_val(*v);
        }
        ArrayOp::PopBack => {
            assert_eq!(std_vec.pop_back_val(), arr.pop_back_val(), "pop_back() mismatch");
        }
        ArrayOp::Insert(idx, v) => {
            if *idx <= len {
                assert_eq!(
                    std_vec.insert_val(*idx, *v),
                    arr.insert_val(*idx, *v),
                    "insert() position mismatch"
                );
            }
        }
        ArrayOp::InsertN(idx, count, v) => {
            if *idx <= len {
                assert_eq!(
                    std_vec.insert_n_val(*idx, *count, *v),
                    arr.insert_n_val(*idx, *count, *v),
                    "insert_n() position mismatch"
                );
            }
        }
        ArrayOp::InsertIter(idx, vals) => {
            if *idx <= len {
                std_vec.insert_iter_val(*idx, vals.clone());
                arr.insert_iter_val(*idx, vals.clone());
            }
        }
        ArrayOp::InsertFiltered(idx, vals) => {
            if *idx <= len {
                std_vec.insert_iter_val(*idx, vals.iter().copied().filter(|v| v % 2 == 0));
                arr.insert_iter_val(*idx, vals.iter().copied().filter(|v| v % 2 == 0));
            }
        }
        ArrayOp::Erase(idx) => {
            if *idx < len {
                assert_eq!(std_vec.erase_val(*idx), arr.erase_val(*idx));
            }
        }
        ArrayOp::EraseRange(a, b) => {
            let start = (*a).min(*b).min(len);
            let end = (*a).max(*b).min(len);
            assert_eq!(
                std_vec.erase_range_val(start, end),
                arr.erase_range_val(start, end)
            );
        }
        ArrayOp::Resize(new_len, v) => {
            std_vec.resize_val(*new_len, *v);
            arr.resize_val(*new_len, *v);
        }
        ArrayOp::Truncate(new_len) => {
            std_vec.truncate_val(*new_len);
            arr.truncate_val(*new_len);
        }
        ArrayOp::Clear => {
            std_vec.clear_val();
            arr.clear_val();
        }
        ArrayOp::Extend(vals) => {
            std_vec.extend_val(vals.clone());
            arr.extend_val(vals.clone());
        }
        ArrayOp::ShrinkToFit => {
            std_vec.shrink_to_fit();
            arr.shrink_to_fit();
            assert_eq!(arr.capacity(), arr.len(), "shrink_to_fit() left slack");
        }
        ArrayOp::Reserve(n) => {
            let before = arr.capacity();
            arr.reserve(*n);
            let expected = if *n > before { *n } else { before };
            assert_eq!(arr.capacity(), expected, "reserve() capacity mismatch");
        }
    }
}

/// Verify that both arrays have the same content and the array's own
/// bookkeeping is consistent.
fn assert_arrays_equal(std_vec: &[i32], arr: &DynArray<i32>) {
    assert_eq!(std_vec.len(), arr.len(), "length mismatch");
    assert_eq!(std_vec.is_empty(), arr.is_empty(), "is_empty mismatch");
    assert!(arr.len() <= arr.capacity(), "len exceeds capacity");

    assert_eq!(std_vec, arr.as_slice(), "contents mismatch");

    for i in 0..std_vec.len() {
        assert_eq!(Ok(&std_vec[i]), arr.at(i), "at({}) mismatch", i);
    }
    assert!(arr.at(std_vec.len()).is_err());
    if !std_vec.is_empty() {
        assert_eq!(std_vec.first(), Some(arr.front()), "front() mismatch");
        assert_eq!(std_vec.last(), Some(arr.back()), "back() mismatch");
    }
}

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for generating a single array operation.
fn array_op_strategy() -> impl Strategy<Value = ArrayOp<i32>> {
    prop_oneof![
        any::<i32>().prop_map(ArrayOp::PushBack),
        Just(ArrayOp::PopBack),
        (0usize..100, any::<i32>()).prop_map(|(idx, v)| ArrayOp::Insert(idx, v)),
        (0usize..100, 0usize..40, any::<i32>()).prop_map(|(idx, n, v)| ArrayOp::InsertN(idx, n, v)),
        (0usize..100, prop::collection::vec(any::<i32>(), 0..30))
            .prop_map(|(idx, vals)| ArrayOp::InsertIter(idx, vals)),
        (0usize..100, prop::collection::vec(any::<i32>(), 0..30))
            .prop_map(|(idx, vals)| ArrayOp::InsertFiltered(idx, vals)),
        (0usize..100).prop_map(ArrayOp::Erase),
        (0usize..100, 0usize..100).prop_map(|(a, b)| ArrayOp::EraseRange(a, b)),
        (0usize..200, any::<i32>()).prop_map(|(n, v)| ArrayOp::Resize(n, v)),
        (0usize..200).prop_map(ArrayOp::Truncate),
        Just(ArrayOp::Clear),
        prop::collection::vec(any::<i32>(), 0..50).prop_map(ArrayOp::Extend),
        Just(ArrayOp::ShrinkToFit),
        (0usize..300).prop_map(ArrayOp::Reserve),
    ]
}

/// Strategy for generating a sequence of operations.
fn ops_sequence_strategy() -> impl Strategy<Value = Vec<ArrayOp<i32>>> {
    prop::collection::vec(array_op_strategy(), 0..200)
}

// ============================================================================
// PROPTEST TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Test that a random sequence of operations produces identical results.
    #[test]
    fn proptest_operations_match(ops in ops_sequence_strategy()) {
        let mut std_vec: Vec<i32> = Vec::new();
        let mut arr: DynArray<i32> = DynArray::new();

        for op in &ops {
            apply_op(&mut std_vec, &mut arr, op);
            assert_arrays_equal(&std_vec, &arr);
        }
    }

    /// Test push_back followed by iteration.
    #[test]
    fn proptest_push_and_iter(values in prop::collection::vec(any::<i32>(), 0..500)) {
        let mut std_vec: Vec<i32> = Vec::new();
        let mut arr: DynArray<i32> = DynArray::new();

        for v in &values {
            std_vec.push(*v);
            arr.push_back(*v);
        }

        let std_collected: Vec<_> = std_vec.to_vec();
        let arr_collected: Vec<_> = arr.iter().copied().collect();
        prop_assert_eq!(std_collected, arr_collected);

        let std_into: Vec<_> = std_vec.clone().into_iter().collect();
        let arr_into: Vec<_> = arr.clone().into_iter().collect();
        prop_assert_eq!(std_into, arr_into);
    }

    /// Capacity after pushing N elements one at a time from empty is the
    /// smallest power of two that holds them.
    #[test]
    fn proptest_push_capacity_doubles(n in 1usize..2000) {
        let mut arr: DynArray<u32> = DynArray::new();
        for i in 0..n {
            arr.push_back(i as u32);
        }
        prop_assert_eq!(arr.capacity(), n.next_power_of_two());
    }

    /// A batch insert that overflows the block grows to max(2 * cap, len + count).
    #[test]
    fn proptest_insert_n_capacity(
        initial in prop::collection::vec(any::<i32>(), 0..50),
        index in 0usize..50,
        count in 0usize..200
    ) {
        let mut arr: DynArray<i32> = initial.iter().copied().collect();
        let before = arr.capacity();
        let index = index.min(arr.len());
        let required = arr.len() + count;

        arr.insert_n(index, count, 7);

        let expected = if required <= before {
            before
        } else {
            (before * 2).max(required).max(1)
        };
        prop_assert_eq!(arr.capacity(), expected);
    }

    /// Test drain consistency.
    #[test]
    fn proptest_drain(
        values in prop::collection::vec(any::<i32>(), 1..100),
        start in 0usize..50,
        len in 0usize..50
    ) {
        let mut std_vec: Vec<i32> = values.clone();
        let mut arr: DynArray<i32> = values.into_iter().collect();

        let actual_start = start.min(std_vec.len() - 1);
        let actual_end = (actual_start + len).min(std_vec.len());

        let std_drained: Vec<_> = std_vec.drain(actual_start..actual_end).collect();
        let arr_drained: Vec<_> = arr.drain(actual_start..actual_end).collect();

        prop_assert_eq!(std_drained, arr_drained, "drained elements mismatch");
        assert_arrays_equal(&std_vec, &arr);
    }

    /// Test insert_from_within against a Vec built by hand.
    #[test]
    fn proptest_insert_from_within(
        values in prop::collection::vec(any::<i32>(), 0..60),
        index in 0usize..60,
        a in 0usize..60,
        b in 0usize..60
    ) {
        let mut arr: DynArray<i32> = values.iter().copied().collect();
        let len = values.len();
        let index = index.min(len);
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));

        let mut expected = values.clone();
        let copies = values[start..end].to_vec();
        expected.splice(index..index, copies);

        arr.insert_from_within(index, start..end);
        assert_arrays_equal(&expected, &arr);
    }

    /// Erasing the range an insert produced restores the original array.
    #[test]
    fn proptest_erase_range_undoes_insert(
        values in prop::collection::vec(any::<i32>(), 0..40),
        index in 0usize..40,
        inserted in prop::collection::vec(any::<i32>(), 0..20)
    ) {
        let original: DynArray<i32> = values.iter().copied().collect();
        let mut arr = original.clone();
        let index = index.min(arr.len());

        let pos = arr.insert_iter(index, inserted.iter().copied());
        prop_assert_eq!(pos, index);
        prop_assert_eq!(&arr[pos..pos + inserted.len()], inserted.as_slice());

        let after = arr.erase_range(pos..pos + inserted.len());
        prop_assert_eq!(after, pos);
        prop_assert_eq!(&arr, &original);
    }

    /// Test retain consistency.
    #[test]
    fn proptest_retain(
        values in prop::collection::vec(any::<i32>(), 0..100),
        threshold in any::<i32>()
    ) {
        let mut std_vec: Vec<i32> = values.clone();
        let mut arr: DynArray<i32> = values.into_iter().collect();

        std_vec.retain(|x| *x > threshold);
        arr.retain(|x| *x > threshold);

        assert_arrays_equal(&std_vec, &arr);
    }

    /// Test that a clone is equal and independent.
    #[test]
    fn proptest_clone_independent(
        values in prop::collection::vec(any::<i32>(), 0..100),
        extra in any::<i32>()
    ) {
        let original: DynArray<i32> = values.iter().copied().collect();
        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);
        prop_assert_eq!(copy.capacity(), original.len());

        copy.push_back(extra);
        assert_arrays_equal(&values, &original);
    }

    /// Test that take() moves everything and leaves an empty array behind.
    #[test]
    fn proptest_take(values in prop::collection::vec(any::<i32>(), 0..100)) {
        let mut source: DynArray<i32> = values.iter().copied().collect();
        let block = source.as_ptr();
        let taken = source.take();

        prop_assert_eq!(taken.as_ptr(), block);
        assert_arrays_equal(&values, &taken);
        prop_assert_eq!(source.len(), 0);
        prop_assert_eq!(source.capacity(), 0);
    }

    /// Test extend_from_slice consistency.
    #[test]
    fn proptest_extend_from_slice(
        initial in prop::collection::vec(any::<i32>(), 0..50),
        extension in prop::collection::vec(any::<i32>(), 0..50)
    ) {
        let mut std_vec: Vec<i32> = initial.clone();
        let mut arr: DynArray<i32> = initial.into_iter().collect();

        std_vec.extend_from_slice(&extension);
        arr.extend_from_slice(&extension);

        assert_arrays_equal(&std_vec, &arr);
    }

    /// Test ordering agrees with slices.
    #[test]
    fn proptest_ordering(
        a in prop::collection::vec(0i32..4, 0..8),
        b in prop::collection::vec(0i32..4, 0..8)
    ) {
        let arr_a: DynArray<i32> = a.iter().copied().collect();
        let arr_b: DynArray<i32> = b.iter().copied().collect();
        prop_assert_eq!(arr_a.cmp(&arr_b), a.cmp(&b));
        prop_assert_eq!(arr_a == arr_b, a == b);
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn scenario_push_five() {
    let mut arr: DynArray<i32> = DynArray::new();
    for i in 1..=5 {
        arr.push_back(i);
    }
    assert_eq!(arr.len(), 5);
    assert_eq!(arr, [1, 2, 3, 4, 5]);
    assert_eq!(arr.capacity(), 8);
}

#[test]
fn scenario_insert_middle() {
    let mut arr = DynArray::from([10, 20, 30]);
    let pos = arr.insert(1, 15);
    assert_eq!(arr, [10, 15, 20, 30]);
    assert_eq!(pos, 1);
    assert_eq!(arr[pos], 15);
}

#[test]
fn scenario_erase_range() {
    let mut arr = DynArray::from([1, 2, 3, 4]);
    let pos = arr.erase_range(1..3);
    assert_eq!(arr, [1, 4]);
    assert_eq!(pos, 1);
}

#[test]
fn scenario_at_out_of_range() {
    let arr = DynArray::from([1, 2, 3]);
    let err = arr.at(10).unwrap_err();
    assert_eq!(err.index, 10);
    assert_eq!(err.len, 3);
}

#[test]
fn scenario_resize_up_and_down() {
    let mut arr = DynArray::from([1, 2]);
    arr.resize(5, 0);
    assert_eq!(arr, [1, 2, 0, 0, 0]);
    arr.resize(1, 0);
    assert_eq!(arr, [1]);
}
