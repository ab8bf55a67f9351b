use uuid::Uuid;

use crate::{ArticleId, Error, Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

pub const MAX_COMMENT_LENGTH: usize = 1000;

/// One comment as read from the store. This is the immutable input snapshot
/// the thread pipeline works on; it is never written back.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub author_id: Option<UserId>,
    /// Denormalized at fetch time so display needs no per-comment lookup
    pub author_name: Option<String>,
    pub anonymous: bool,
    /// None means top-level; a dangling reference is tolerated, see kiji-threads
    pub parent_id: Option<CommentId>,
    /// Missing on malformed rows; treated as oldest wherever it is compared
    pub created_at: Option<Time>,
    #[serde(default)]
    pub like_count: i64,
    pub content: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub id: CommentId,
    pub content: String,
    pub anonymous: bool,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)?;
        if self.content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        let len = self.content.chars().count();
        if len > MAX_COMMENT_LENGTH {
            return Err(Error::ContentTooLong(len));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    Top,
    Latest,
}

impl RankingPolicy {
    /// Anything that is not a known policy falls back to `Top`
    pub fn from_param(s: &str) -> RankingPolicy {
        match s.eq_ignore_ascii_case("latest") {
            true => RankingPolicy::Latest,
            false => RankingPolicy::Top,
        }
    }
}

/// A comment as returned to the viewer: author redacted when anonymous, and
/// annotated with the viewer's own like state (never persisted).
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub content: String,
    pub author_name: Option<String>,
    pub created_at: Option<Time>,
    pub parent_id: Option<CommentId>,
    pub like_count: i64,
    pub liked_by_viewer: bool,
    pub anonymous: bool,
}

impl CommentView {
    pub fn redacted(comment: &Comment, liked_by_viewer: bool) -> CommentView {
        CommentView {
            id: comment.id,
            content: comment.content.clone(),
            author_name: match comment.anonymous {
                true => None,
                false => comment.author_name.clone(),
            },
            created_at: comment.created_at,
            parent_id: comment.parent_id,
            like_count: comment.like_count,
            liked_by_viewer,
            anonymous: comment.anonymous,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub has_more: bool,
}
