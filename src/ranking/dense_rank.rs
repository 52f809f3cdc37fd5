//! Dense ranking within groups
//!
//! Equal values share a rank and the next distinct value follows immediately
//! (1, 1, 2, ...). Groups are visited in first-occurrence order and the ranking
//! itself never reorders rows.

use std::collections::HashMap;

/// Dense rank of `values`, highest value = 1
pub fn dense_rank_desc(values: &[f64]) -> Vec<u32> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup_by(|a, b| a.total_cmp(b).is_eq());

    values
        .iter()
        .map(|v| {
            let pos = distinct
                .binary_search_by(|x| v.total_cmp(x))
                .unwrap_or_else(|p| p);
            pos as u32 + 1
        })
        .collect()
}

/// Dense rank of `value(item)` descending, computed separately per `group(item)`
///
/// Returns one rank per item, aligned with `items`.
pub fn dense_rank_by_group<T>(
    items: &[T],
    group: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> f64,
) -> Vec<u32> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        groups.entry(group(item)).or_default().push(i);
    }

    let mut ranks = vec![0u32; items.len()];
    for indices in groups.values() {
        let values: Vec<f64> = indices.iter().map(|&i| value(&items[i])).collect();
        for (&i, rank) in indices.iter().zip(dense_rank_desc(&values)) {
            ranks[i] = rank;
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_share_rank_without_gaps() {
        let ranks = dense_rank_desc(&[0.5, 0.9, 0.5, 0.1, 0.9]);
        assert_eq!(ranks, vec![2, 1, 2, 3, 1]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(dense_rank_desc(&[]).is_empty());
        assert_eq!(dense_rank_desc(&[42.0]), vec![1]);
    }

    #[test]
    fn test_negative_and_huge_values() {
        let ranks = dense_rank_desc(&[-1.0, 1e12, 0.0, -1.0]);
        assert_eq!(ranks, vec![3, 1, 2, 3]);
    }

    #[test]
    fn test_rank_by_group() {
        let rows = vec![("a", 0.2), ("b", 0.9), ("a", 0.8), ("a", 0.2), ("b", 0.1)];
        let ranks = dense_rank_by_group(&rows, |r| r.0, |r| r.1);
        assert_eq!(ranks, vec![2, 1, 1, 2, 2]);
    }

    #[test]
    fn test_rank_monotonic_in_score() {
        let values = vec![0.3, 0.7, 0.7, 0.05, 0.99, 0.3, 0.5];
        let ranks = dense_rank_desc(&values);

        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] > values[j] {
                    assert!(ranks[i] < ranks[j]);
                }
                if values[i] == values[j] {
                    assert_eq!(ranks[i], ranks[j]);
                }
            }
        }
    }
}
