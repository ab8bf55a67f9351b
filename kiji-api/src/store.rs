use std::collections::HashSet;

use async_trait::async_trait;

use crate::{ArticleId, Comment, CommentId, UserId};

/// Read side of comment persistence, as seen by the thread pipeline. The
/// pipeline needs the full set for an article in one call; it never asks the
/// store to pre-filter or pre-order.
#[async_trait]
pub trait CommentStore {
    async fn fetch_comments(&mut self, article: ArticleId) -> anyhow::Result<Vec<Comment>>;
}

/// The viewer/comment like relation. Queried at most once per page, with the
/// full id set of that page.
#[async_trait]
pub trait LikeStore {
    async fn find_liked_comment_ids(
        &mut self,
        viewer: UserId,
        comments: &HashSet<CommentId>,
    ) -> anyhow::Result<HashSet<CommentId>>;
}
