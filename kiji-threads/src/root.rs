use std::collections::{HashMap, HashSet};

use crate::api::{Comment, CommentId};

/// Walks the parent chain upward until reaching a comment without a parent, a
/// parent that is not in the snapshot, or an id already visited. The last
/// comment that did resolve is returned, so a broken chain still yields a
/// displayable thread instead of failing the whole page.
///
/// Terminates in at most `by_id.len()` steps whatever the input looks like.
pub fn root_of<'a>(comment: &'a Comment, by_id: &HashMap<CommentId, &'a Comment>) -> &'a Comment {
    let mut current = comment;
    let mut seen = HashSet::new();
    seen.insert(current.id);
    while let Some(parent_id) = current.parent_id {
        if !seen.insert(parent_id) {
            break;
        }
        match by_id.get(&parent_id) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

/// The snapshot partitioned into threads: every comment lands in exactly one
/// thread, keyed by the root that starts it.
pub struct Threads<'a> {
    roots: Vec<&'a Comment>,
    members: HashMap<CommentId, Vec<&'a Comment>>,
}

impl<'a> Threads<'a> {
    pub fn build(comments: &'a [Comment]) -> Threads<'a> {
        let by_id = comments
            .iter()
            .map(|c| (c.id, c))
            .collect::<HashMap<_, _>>();
        let resolved = comments
            .iter()
            .map(|c| (c, root_of(c, &by_id).id))
            .collect::<Vec<_>>();
        let root_ids = resolved
            .iter()
            .filter(|(c, root)| c.id == *root)
            .map(|(c, _)| c.id)
            .collect::<HashSet<_>>();
        let mut roots = Vec::new();
        let mut members: HashMap<CommentId, Vec<&Comment>> = HashMap::new();
        for (c, root) in resolved {
            if c.id == root {
                roots.push(c);
            } else if root_ids.contains(&root) {
                members.entry(root).or_insert_with(Vec::new).push(c);
            } else {
                // The walk ended inside a cycle. Keep the comment visible as a
                // thread of its own rather than dropping it from the page.
                tracing::warn!(
                    comment = %c.id.0,
                    "parent chain does not terminate, treating comment as a root"
                );
                roots.push(c);
            }
        }
        Threads { roots, members }
    }

    /// All roots of the snapshot, in no particular order
    pub fn roots(&self) -> &[&'a Comment] {
        &self.roots
    }

    /// The non-root comments of one thread, in no particular order
    pub fn members_of(&self, root: CommentId) -> &[&'a Comment] {
        self.members.get(&root).map(|m| &m[..]).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{cid, comment};

    #[test]
    fn resolves_nested_replies_to_the_top() {
        let comments = vec![
            comment(1, None, 0, Some(100)),
            comment(2, Some(1), 0, Some(110)),
            comment(3, Some(2), 0, Some(120)),
        ];
        let by_id = comments.iter().map(|c| (c.id, c)).collect();
        for c in &comments {
            assert_eq!(root_of(c, &by_id).id, cid(1));
        }
    }

    #[test]
    fn dangling_parent_makes_a_singleton_root() {
        let comments = vec![comment(1, Some(999), 0, Some(100))];
        let threads = Threads::build(&comments);
        assert_eq!(threads.roots().len(), 1);
        assert_eq!(threads.roots()[0].id, cid(1));
        assert!(threads.members_of(cid(1)).is_empty());
    }

    #[test]
    fn chain_into_dangling_parent_stays_one_thread() {
        // 2 replies to 1, whose own parent is missing: 1 is the degenerate
        // root and 2 still belongs to it
        let comments = vec![
            comment(1, Some(999), 0, Some(100)),
            comment(2, Some(1), 0, Some(110)),
        ];
        let threads = Threads::build(&comments);
        assert_eq!(threads.roots().len(), 1);
        assert_eq!(threads.roots()[0].id, cid(1));
        assert_eq!(
            threads.members_of(cid(1)).iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![cid(2)]
        );
    }

    #[test]
    fn mutual_cycle_terminates_and_loses_no_comment() {
        let comments = vec![
            comment(1, Some(2), 0, Some(100)),
            comment(2, Some(1), 0, Some(110)),
        ];
        let by_id = comments.iter().map(|c| (c.id, c)).collect();
        // the walk must terminate and land on some comment of the snapshot
        for c in &comments {
            let root = root_of(c, &by_id);
            assert!(comments.iter().any(|o| o.id == root.id));
        }
        // and the partition keeps both displayable
        let threads = Threads::build(&comments);
        let mut all = threads
            .roots()
            .iter()
            .map(|c| c.id)
            .chain(
                threads
                    .roots()
                    .iter()
                    .flat_map(|r| threads.members_of(r.id).iter().map(|c| c.id)),
            )
            .collect::<Vec<_>>();
        all.sort();
        assert_eq!(all, vec![cid(1), cid(2)]);
    }

    #[test]
    fn self_parent_is_its_own_root() {
        let comments = vec![comment(1, Some(1), 0, Some(100))];
        let threads = Threads::build(&comments);
        assert_eq!(threads.roots().len(), 1);
        assert_eq!(threads.roots()[0].id, cid(1));
    }
}
