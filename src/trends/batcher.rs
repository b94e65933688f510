//! Splits keyword groups into upstream-sized batches.

/// Most keywords the interest endpoint accepts in one comparison.
pub const MAX_BATCH_SIZE: usize = 5;

/// Partitions `keywords` into consecutive batches of at most [`MAX_BATCH_SIZE`].
///
/// A trailing singleton batch is folded into the batch before it, so the
/// last batch may hold `MAX_BATCH_SIZE + 1` keywords. A single term always
/// normalizes to 100 upstream, which makes a one-keyword request useless.
pub fn split(keywords: &[String]) -> Vec<Vec<String>> {
    let mut batches: Vec<Vec<String>> = keywords
        .chunks(MAX_BATCH_SIZE)
        .map(<[String]>::to_vec)
        .collect();

    if batches.len() > 1 && batches.last().is_some_and(|b| b.len() == 1) {
        if let Some(tail) = batches.pop() {
            if let Some(prev) = batches.last_mut() {
                prev.extend(tail);
            }
        }
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("k{i}")).collect()
    }

    fn sizes(n: usize) -> Vec<usize> {
        split(&keywords(n)).iter().map(Vec::len).collect()
    }

    #[test]
    fn test_split_sizes() {
        assert_eq!(sizes(0), Vec::<usize>::new());
        assert_eq!(sizes(1), vec![1]);
        assert_eq!(sizes(5), vec![5]);
        assert_eq!(sizes(6), vec![6]);
        assert_eq!(sizes(7), vec![5, 2]);
        assert_eq!(sizes(10), vec![5, 5]);
        assert_eq!(sizes(11), vec![5, 6]);
        assert_eq!(sizes(12), vec![5, 5, 2]);
    }

    #[test]
    fn test_split_preserves_order() {
        let input = keywords(11);
        let flattened: Vec<String> = split(&input).into_iter().flatten().collect();
        assert_eq!(flattened, input);
    }

    #[test]
    fn test_split_invariants_hold_for_many_sizes() {
        for n in 1..=40 {
            let batches = split(&keywords(n));
            assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), n);
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= MAX_BATCH_SIZE + 1));
            assert!(batches.iter().filter(|b| b.len() == MAX_BATCH_SIZE + 1).count() <= 1);
            if n > 1 {
                assert!(batches.iter().all(|b| b.len() > 1));
            }
        }
    }
}
