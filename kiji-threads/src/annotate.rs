use std::collections::HashSet;

use anyhow::Context;

use crate::api::{Comment, CommentView, LikeStore, UserId};

/// Converts the page's comments into their viewer-facing form. For a
/// logged-in viewer the like states come from a single batched lookup over
/// the whole page; an anonymous viewer gets all-false without the store
/// being asked at all.
pub async fn annotate<S: LikeStore>(
    comments: &[&Comment],
    viewer: Option<UserId>,
    likes: &mut S,
) -> anyhow::Result<Vec<CommentView>> {
    let liked = match viewer {
        None => HashSet::new(),
        Some(viewer) => {
            let ids = comments.iter().map(|c| c.id).collect::<HashSet<_>>();
            match ids.is_empty() {
                true => HashSet::new(),
                false => likes
                    .find_liked_comment_ids(viewer, &ids)
                    .await
                    .context("batch-fetching liked comment ids")?,
            }
        }
    };
    Ok(comments
        .iter()
        .map(|c| CommentView::redacted(c, liked.contains(&c.id)))
        .collect())
}
