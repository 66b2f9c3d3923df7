//! Assertion functions for split outputs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections hold the same elements with the same multiplicity.
///
/// Order is ignored, duplicates are not.
///
/// # Panics
///
/// Panics if any element occurs a different number of times in each.
///
/// # Example
///
/// ```
/// use splitcsv::testing::assert_same_multiset;
///
/// assert_same_multiset(&[3, 1, 1, 2], &[1, 2, 3, 1]);
/// ```
pub fn assert_same_multiset<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    fn tally<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
        let mut m = HashMap::new();
        for item in items {
            *m.entry(item).or_insert(0) += 1;
        }
        m
    }

    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}",
        expected.len(),
        actual.len()
    );

    let (a, e) = (tally(actual), tally(expected));
    if a != e {
        let missing: Vec<&T> = e
            .iter()
            .filter(|&(k, n)| a.get(k) != Some(n))
            .map(|(k, _)| *k)
            .collect();
        let extra: Vec<&T> = a.keys().filter(|k| !e.contains_key(*k)).copied().collect();
        panic!("Multiset mismatch:\n  Missing or miscounted: {missing:?}\n  Extra: {extra:?}");
    }
}

/// Assert that per-output row counts differ by at most one.
///
/// # Panics
///
/// Panics if `counts` is empty or unbalanced.
pub fn assert_balanced(counts: &[usize]) {
    let (Some(min), Some(max)) = (counts.iter().min(), counts.iter().max()) else {
        panic!("no outputs to compare");
    };
    assert!(max - min <= 1, "Outputs are unbalanced: {counts:?}");
}
