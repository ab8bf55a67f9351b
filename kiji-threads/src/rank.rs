use std::cmp::Reverse;

use crate::api::{Comment, RankingPolicy};

/// Orders root comments in place. Both policies end on the id tie-break so
/// that repeated calls over the same snapshot paginate identically.
///
/// A missing `created_at` sorts as oldest: last under either policy, since
/// both want recency descending.
pub fn rank_roots(roots: &mut [&Comment], policy: RankingPolicy) {
    match policy {
        RankingPolicy::Latest => roots.sort_unstable_by_key(|c| (Reverse(c.created_at), c.id)),
        RankingPolicy::Top => {
            roots.sort_unstable_by_key(|c| (Reverse(c.like_count), Reverse(c.created_at), c.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{cid, comment};

    #[test]
    fn top_ranks_by_likes_then_recency() {
        let comments = vec![
            comment(1, None, 5, Some(100)),
            comment(2, None, 10, Some(90)),
            comment(3, None, 5, Some(200)),
        ];
        let mut roots = comments.iter().collect::<Vec<_>>();
        rank_roots(&mut roots, RankingPolicy::Top);
        assert_eq!(
            roots.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![cid(2), cid(3), cid(1)]
        );
    }

    #[test]
    fn latest_ranks_by_recency_with_missing_times_last() {
        let comments = vec![
            comment(1, None, 0, Some(100)),
            comment(2, None, 0, None),
            comment(3, None, 0, Some(200)),
        ];
        let mut roots = comments.iter().collect::<Vec<_>>();
        rank_roots(&mut roots, RankingPolicy::Latest);
        assert_eq!(
            roots.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![cid(3), cid(1), cid(2)]
        );
    }

    #[test]
    fn full_ties_break_by_id_ascending() {
        let comments = vec![
            comment(7, None, 3, Some(100)),
            comment(2, None, 3, Some(100)),
            comment(5, None, 3, Some(100)),
        ];
        let mut roots = comments.iter().collect::<Vec<_>>();
        rank_roots(&mut roots, RankingPolicy::Top);
        let first = roots.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(first, vec![cid(2), cid(5), cid(7)]);
        // ranking again must not shuffle anything
        rank_roots(&mut roots, RankingPolicy::Top);
        assert_eq!(roots.iter().map(|c| c.id).collect::<Vec<_>>(), first);
    }
}
