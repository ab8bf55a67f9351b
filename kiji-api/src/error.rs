use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Uuid already used {0}")]
    UuidAlreadyUsed(Uuid),

    #[error("Name already used {0}")]
    NameAlreadyUsed(String),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Invalid character in name {0:?}")]
    InvalidName(String),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Title is too long ({0} chars)")]
    TitleTooLong(usize),

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Content is too long ({0} chars)")]
    ContentTooLong(usize),

    #[error("Page size {0} is not allowed, pages must hold at least one thread")]
    InvalidPageSize(i64),

    #[error("Article {0} not found")]
    ArticleNotFound(Uuid),

    #[error("Comment {0} not found")]
    CommentNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Article {0} does not accept comments")]
    ArticleNotCommentable(Uuid),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::UuidAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::NameAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidName(_) => StatusCode::BAD_REQUEST,
            Error::EmptyTitle => StatusCode::BAD_REQUEST,
            Error::TitleTooLong(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::ContentTooLong(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPageSize(_) => StatusCode::BAD_REQUEST,
            Error::ArticleNotFound(_) => StatusCode::NOT_FOUND,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::UserNotFound(_) => StatusCode::NOT_FOUND,
            Error::ArticleNotCommentable(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::UuidAlreadyUsed(u) => json!({
                "message": "uuid conflict",
                "type": "conflict-uuid",
                "uuid": u,
            }),
            Error::NameAlreadyUsed(n) => json!({
                "message": "name already used",
                "type": "conflict-name",
                "name": n,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidName(n) => json!({
                "message": "there was an invalid character in a user name",
                "type": "invalid-name",
                "name": n,
            }),
            Error::EmptyTitle => json!({
                "message": "title must not be empty",
                "type": "empty-title",
            }),
            Error::TitleTooLong(len) => json!({
                "message": "title is too long",
                "type": "title-too-long",
                "length": len,
            }),
            Error::EmptyContent => json!({
                "message": "content must not be empty",
                "type": "empty-content",
            }),
            Error::ContentTooLong(len) => json!({
                "message": "content is too long",
                "type": "content-too-long",
                "length": len,
            }),
            Error::InvalidPageSize(size) => json!({
                "message": "pages must hold at least one thread",
                "type": "invalid-page-size",
                "size": size,
            }),
            Error::ArticleNotFound(id) => json!({
                "message": "article not found",
                "type": "article-not-found",
                "article": id,
            }),
            Error::CommentNotFound(id) => json!({
                "message": "comment not found",
                "type": "comment-not-found",
                "comment": id,
            }),
            Error::UserNotFound(id) => json!({
                "message": "user not found",
                "type": "user-not-found",
                "user": id,
            }),
            Error::ArticleNotCommentable(id) => json!({
                "message": "article does not accept comments",
                "type": "article-not-commentable",
                "article": id,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let get_uuid = |field: &str| {
            data.get(field)
                .and_then(|u| u.as_str())
                .and_then(|u| Uuid::from_str(u).ok())
                .ok_or_else(|| anyhow!("error is missing uuid field {field:?}"))
        };
        let get_str = |field: &str| {
            data.get(field)
                .and_then(|s| s.as_str())
                .map(String::from)
                .ok_or_else(|| anyhow!("error is missing string field {field:?}"))
        };
        let get_len = |field: &str| {
            data.get(field)
                .and_then(|l| l.as_u64())
                .map(|l| l as usize)
                .ok_or_else(|| anyhow!("error is missing length field {field:?}"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or("")
                        .to_string(),
                ),
                "permission-denied" => Error::PermissionDenied,
                "conflict-uuid" => Error::UuidAlreadyUsed(get_uuid("uuid")?),
                "conflict-name" => Error::NameAlreadyUsed(get_str("name")?),
                "null-byte" => Error::NullByteInString(get_str("string")?),
                "invalid-name" => Error::InvalidName(get_str("name")?),
                "empty-title" => Error::EmptyTitle,
                "title-too-long" => Error::TitleTooLong(get_len("length")?),
                "empty-content" => Error::EmptyContent,
                "content-too-long" => Error::ContentTooLong(get_len("length")?),
                "invalid-page-size" => Error::InvalidPageSize(
                    data.get("size")
                        .and_then(|s| s.as_i64())
                        .ok_or_else(|| anyhow!("error is missing size field"))?,
                ),
                "article-not-found" => Error::ArticleNotFound(get_uuid("article")?),
                "comment-not-found" => Error::CommentNotFound(get_uuid("comment")?),
                "user-not-found" => Error::UserNotFound(get_uuid("user")?),
                "article-not-commentable" => Error::ArticleNotCommentable(get_uuid("article")?),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
