//! The comment-thread core: given a full snapshot of an article's comments,
//! reconstruct threads from parent references, rank them, select a page of
//! threads, flatten each into display order and annotate the result with the
//! viewer's like state.
//!
//! Everything here is a pure computation over the snapshot it is handed; the
//! only I/O boundary is the single batched like lookup at the very end.

mod root;
pub use root::{root_of, Threads};

mod rank;
pub use rank::rank_roots;

mod page;
pub use page::window;

mod flatten;
pub use flatten::flatten_thread;

mod annotate;
pub use annotate::annotate;

pub mod api {
    pub use kiji_api::*;
}

use api::{Comment, CommentPage, Error, LikeStore, RankingPolicy, UserId};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Api(#[from] Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Assembles one page of comment threads.
///
/// Pages are counted in threads (roots), not comments: a selected thread is
/// always returned whole, so a page can hold more comments than `page_size`.
/// `page_size` below 1 is rejected with [`Error::InvalidPageSize`]; an index
/// past the last page yields an empty page with `has_more = false`. Once
/// validation has passed the only thing that can still fail is the like
/// lookup itself.
pub async fn build_page<S: LikeStore>(
    comments: &[Comment],
    policy: RankingPolicy,
    page_index: usize,
    page_size: usize,
    viewer: Option<UserId>,
    likes: &mut S,
) -> Result<CommentPage, BuildError> {
    if page_size < 1 {
        return Err(BuildError::Api(Error::InvalidPageSize(page_size as i64)));
    }
    let threads = Threads::build(comments);
    let mut roots = threads.roots().to_vec();
    rank_roots(&mut roots, policy);
    let (selected, has_more) = window(&roots, page_index, page_size);
    let mut ordered = Vec::new();
    for root in selected {
        ordered.extend(flatten_thread(root, threads.members_of(root.id)));
    }
    let comments = annotate(&ordered, viewer, likes).await?;
    Ok(CommentPage { comments, has_more })
}
