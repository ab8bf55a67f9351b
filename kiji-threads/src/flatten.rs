use crate::api::Comment;

/// Display order for one thread: the root first, then every other comment of
/// the thread by creation time ascending, missing timestamps first, ties by
/// id. Reply nesting is not reconstructed here; a thread renders as one flat
/// chronological run under its root.
pub fn flatten_thread<'a>(root: &'a Comment, members: &[&'a Comment]) -> Vec<&'a Comment> {
    let mut replies = members.to_vec();
    replies.sort_unstable_by_key(|c| (c.created_at, c.id));
    let mut ordered = Vec::with_capacity(replies.len() + 1);
    ordered.push(root);
    ordered.extend(replies);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{cid, comment};

    #[test]
    fn root_comes_first_then_replies_chronologically() {
        let root = comment(1, None, 0, Some(100));
        let replies = vec![
            comment(2, Some(1), 0, Some(300)),
            comment(3, Some(2), 0, Some(200)),
            comment(4, Some(1), 0, None),
        ];
        let members = replies.iter().collect::<Vec<_>>();
        let ordered = flatten_thread(&root, &members);
        assert_eq!(
            ordered.iter().map(|c| c.id).collect::<Vec<_>>(),
            // missing timestamp first, then by time regardless of nesting depth
            vec![cid(1), cid(4), cid(3), cid(2)]
        );
    }

    #[test]
    fn timestamp_ties_break_by_id() {
        let root = comment(1, None, 0, Some(100));
        let replies = vec![
            comment(9, Some(1), 0, Some(200)),
            comment(4, Some(1), 0, Some(200)),
        ];
        let members = replies.iter().collect::<Vec<_>>();
        let ordered = flatten_thread(&root, &members);
        assert_eq!(
            ordered.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![cid(1), cid(4), cid(9)]
        );
    }
}
