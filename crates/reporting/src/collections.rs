//! Collection helpers used to roll per-campaign rows up into summary views.
//! None of them mutate their input; each returns a fresh collection.

use std::collections::HashSet;
use std::hash::Hash;
use std::num::NonZeroUsize;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Partition `items` by the string form of `key`. Groups appear in order
/// of first occurrence.
pub fn group_by<T, K, F>(items: &[T], key: F) -> IndexMap<String, Vec<T>>
where
    T: Clone,
    K: ToString,
    F: Fn(&T) -> K,
{
    let mut groups: IndexMap<String, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key(item).to_string()).or_default().push(item.clone());
    }
    groups
}

/// Stable ascending sort by `key`. Incomparable keys (e.g. `NaN`) keep
/// their relative order.
pub fn sort_by<T, K, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        key(a)
            .partial_cmp(&key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// Consecutive groups of at most `size`; only the last may be shorter.
pub fn chunk<T: Clone>(items: &[T], size: NonZeroUsize) -> Vec<Vec<T>> {
    items.chunks(size.get()).map(<[T]>::to_vec).collect()
}

/// Single-level concatenation.
pub fn flatten<T: Clone>(arrays: &[Vec<T>]) -> Vec<T> {
    arrays.iter().flatten().cloned().collect()
}

/// De-duplicate, keeping the first occurrence of each value.
pub fn unique<T>(items: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Shallow merge of two JSON objects; keys from `overrides` win.
/// Non-object arguments count as empty objects.
pub fn merge_objects(base: &Value, overrides: &Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    if let Some(extra) = overrides.as_object() {
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// `true` for a missing value, `null`, or `{}`.
pub fn is_empty_object(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Convenience for building JSON objects in callers and tests.
pub fn object<I, K>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        kind: &'static str,
        name: &'static str,
        value: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { kind: "A", name: "Charlie", value: 1 },
            Row { kind: "B", name: "Alice", value: 2 },
            Row { kind: "A", name: "Bob", value: 3 },
        ]
    }

    #[test]
    fn test_group_by_preserves_first_occurrence() {
        let grouped = group_by(&rows(), |r| r.kind);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(grouped["A"].len(), 2);
        assert_eq!(grouped["B"].len(), 1);
        assert_eq!(grouped["A"][1].value, 3);
    }

    #[test]
    fn test_group_by_numeric_key() {
        let grouped = group_by(&[1, 2, 3, 4, 5], |n| n % 2);
        assert_eq!(grouped["1"], vec![1, 3, 5]);
        assert_eq!(grouped["0"], vec![2, 4]);
    }

    #[test]
    fn test_sort_by_name() {
        let input = rows();
        let sorted = sort_by(&input, |r| r.name);
        assert_eq!(sorted[0].name, "Alice");
        assert_eq!(sorted[2].name, "Charlie");
        assert_eq!(input[0].name, "Charlie");
    }

    #[test]
    fn test_sort_by_is_stable() {
        let sorted = sort_by(&rows(), |r| r.kind);
        let names: Vec<_> = sorted.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Charlie", "Bob", "Alice"]);
    }

    #[test]
    fn test_sort_by_float_key_with_nan() {
        let values = [3.0, f64::NAN, 1.0];
        let sorted = sort_by(&values, |v| *v);
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_chunk() {
        let items = [1, 2, 3, 4, 5, 6, 7];
        let chunks = chunk(&items, NonZeroUsize::new(3).unwrap());
        assert_eq!(chunks, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
        assert!(chunk::<u8>(&[], NonZeroUsize::new(2).unwrap()).is_empty());
    }

    #[test]
    fn test_chunk_concatenation_restores_input() {
        let items: Vec<u32> = (0..23).collect();
        for n in 1..=25 {
            let size = NonZeroUsize::new(n).unwrap();
            let chunks = chunk(&items, size);
            assert_eq!(flatten(&chunks), items);
            let (last, rest) = chunks.split_last().unwrap();
            assert!(rest.iter().all(|c| c.len() == n));
            assert!(!last.is_empty() && last.len() <= n);
        }
    }

    #[test]
    fn test_flatten() {
        let nested = vec![vec![1, 2], vec![3, 4], vec![5]];
        assert_eq!(flatten(&nested), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unique() {
        assert_eq!(unique(&[1, 2, 2, 3, 3, 3, 4]), vec![1, 2, 3, 4]);
        assert_eq!(unique(&["a", "b", "a", "c"]), vec!["a", "b", "c"]);
        let once = unique(&[5, 1, 5, 2, 1]);
        assert_eq!(unique(&once), once);
    }

    #[test]
    fn test_merge_objects() {
        let merged = merge_objects(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4}));
        assert_eq!(merged, json!({"a": 1, "b": 3, "c": 4}));
        assert_eq!(merge_objects(&Value::Null, &json!({"x": true})), json!({"x": true}));
    }

    #[test]
    fn test_is_empty_object() {
        assert!(is_empty_object(Some(&json!({}))));
        assert!(!is_empty_object(Some(&json!({"a": 1}))));
        assert!(is_empty_object(None));
        assert!(is_empty_object(Some(&Value::Null)));
        assert!(!is_empty_object(Some(&json!([]))));
    }

    #[test]
    fn test_object_builder() {
        let value = object([("page", json!(1)), ("active", json!(true))]);
        assert_eq!(value, json!({"page": 1, "active": true}));
    }
}
