//! Cross-group union and ranking.

use std::collections::HashSet;

use crate::trends::types::{
    AggregateResult, GroupResult, RankedKeyword, merge_related, merge_scores,
};

/// Unions the keyword sets and metric mappings of `groups`.
///
/// Keywords keep their first-discovery position; metric values from later
/// groups overwrite earlier ones.
pub fn combine(groups: &[GroupResult]) -> AggregateResult {
    let mut combined = AggregateResult::default();
    let mut seen = HashSet::new();

    for group in groups {
        for keyword in group.keywords.keywords() {
            if seen.insert(keyword.as_str()) {
                combined.keywords.push(keyword.clone());
            }
        }
        merge_scores(&mut combined.averages, group.averages.clone());
        merge_related(&mut combined.related_queries, group.related_queries.clone());
        merge_related(&mut combined.related_topics, group.related_topics.clone());
    }

    combined
}

impl AggregateResult {
    /// All keywords by average score, highest first. Ties keep discovery order.
    pub fn ranking(&self) -> Vec<RankedKeyword> {
        let mut ranked: Vec<RankedKeyword> = self
            .keywords
            .iter()
            .map(|keyword| RankedKeyword {
                keyword: keyword.clone(),
                average: self.averages.get(keyword).copied().unwrap_or(0),
            })
            .collect();
        ranked.sort_by(|a, b| b.average.cmp(&a.average));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::testing::{kw, params};
    use crate::trends::types::{KeywordGroup, RelatedItems, Scores};

    fn group_result(scores: &[(&str, u32)]) -> GroupResult {
        let p = params();
        let keywords: Vec<&str> = scores.iter().map(|(k, _)| *k).collect();
        GroupResult {
            keywords: KeywordGroup::new(kw(&keywords)).unwrap(),
            averages: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            related_queries: keywords.iter().map(|k| (k.to_string(), vec![])).collect(),
            related_topics: RelatedItems::new(),
            window: p.window,
            region: p.region,
            locale: p.locale,
        }
    }

    fn names(ranking: &[RankedKeyword]) -> Vec<&str> {
        ranking.iter().map(|r| r.keyword.as_str()).collect()
    }

    #[test]
    fn test_ranking_across_groups() {
        let groups = vec![
            group_result(&[("A", 10), ("B", 90)]),
            group_result(&[("C", 50)]),
        ];
        let ranking = combine(&groups).ranking();

        assert_eq!(names(&ranking), vec!["B", "C", "A"]);
        assert_eq!(ranking[0].average, 90);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let groups = vec![
            group_result(&[("x", 20), ("y", 40)]),
            group_result(&[("z", 40), ("w", 20)]),
        ];
        let ranking = combine(&groups).ranking();
        assert_eq!(names(&ranking), vec!["y", "z", "x", "w"]);
    }

    #[test]
    fn test_duplicate_keyword_last_group_wins() {
        let groups = vec![
            group_result(&[("dup", 10), ("a", 30)]),
            group_result(&[("b", 5), ("dup", 70)]),
        ];
        let combined = combine(&groups);

        assert_eq!(combined.keywords, kw(&["dup", "a", "b"]));
        assert_eq!(combined.averages, Scores::from([
            ("dup".into(), 70),
            ("a".into(), 30),
            ("b".into(), 5)
        ]));
    }

    #[test]
    fn test_combine_is_idempotent() {
        let groups = vec![
            group_result(&[("A", 10), ("B", 90)]),
            group_result(&[("C", 50), ("A", 60)]),
        ];
        let first = combine(&groups);
        let second = combine(&groups);
        assert_eq!(first, second);
        assert_eq!(first.ranking(), second.ranking());
    }

    #[test]
    fn test_combine_empty() {
        let combined = combine(&[]);
        assert!(combined.keywords.is_empty());
        assert!(combined.ranking().is_empty());
    }
}
