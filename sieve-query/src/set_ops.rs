//! Set algebra over value slices.
//!
//! Inputs are treated as sets: duplicates collapse and order carries no
//! meaning. Outputs keep first-seen order (`a` before `b`) so merged
//! predicates render identically across runs.

use std::hash::Hash;

use indexmap::IndexSet;

/// Values present in both `a` and `b`.
pub fn intersect<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let rhs: IndexSet<&T> = b.iter().collect();
    a.iter()
        .filter(|v| rhs.contains(v))
        .collect::<IndexSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Values present in `a` or `b`.
pub fn union<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter()
        .chain(b.iter())
        .collect::<IndexSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Values present in `a` but not in `b`.
pub fn complement<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let rhs: IndexSet<&T> = b.iter().collect();
    a.iter()
        .filter(|v| !rhs.contains(v))
        .collect::<IndexSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ScalarValue;

    #[test]
    fn test_intersect() {
        assert_eq!(intersect(&[1, 2, 3], &[2, 3, 4]), vec![2, 3]);
        assert_eq!(intersect(&[3, 2, 2, 1], &[1, 2]), vec![2, 1]);
        assert!(intersect(&[1, 2], &[3]).is_empty());
        assert!(intersect::<i32>(&[], &[1]).is_empty());
    }

    #[test]
    fn test_union() {
        assert_eq!(union(&[1, 2], &[2, 3]), vec![1, 2, 3]);
        assert_eq!(union(&[1, 1], &[]), vec![1]);
        assert_eq!(union(&[], &[4, 4, 5]), vec![4, 5]);
    }

    #[test]
    fn test_complement() {
        assert_eq!(complement(&[1, 2, 3], &[2]), vec![1, 3]);
        assert!(complement(&[1], &[1, 2]).is_empty());
        assert_eq!(complement(&[1, 1, 2], &[]), vec![1, 2]);
    }

    #[test]
    fn test_scalar_values() {
        let a: Vec<ScalarValue> = vec!["a".into(), "b".into()];
        let b: Vec<ScalarValue> = vec!["b".into(), "c".into()];
        assert_eq!(intersect(&a, &b), vec![ScalarValue::from("b")]);
        assert_eq!(union(&a, &b).len(), 3);
    }
}
