use std::str::FromStr;

use anyhow::anyhow;
use uuid::Uuid;

use crate::{Error, Time, UserId, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    pub fn stub() -> ArticleId {
        ArticleId(STUB_UUID)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Pending,
    Approved,
    Rejected,
    Hidden,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Approved => "approved",
            ArticleStatus::Rejected => "rejected",
            ArticleStatus::Hidden => "hidden",
        }
    }
}

impl FromStr for ArticleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<ArticleStatus> {
        match s {
            "pending" => Ok(ArticleStatus::Pending),
            "approved" => Ok(ArticleStatus::Approved),
            "rejected" => Ok(ArticleStatus::Rejected),
            "hidden" => Ok(ArticleStatus::Hidden),
            _ => Err(anyhow!("unknown article status {s:?}")),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub author_id: UserId,
    pub title: String,
    pub body: String,
    pub status: ArticleStatus,
    pub created_at: Time,
    pub like_count: i64,
    pub comment_count: i64,
}

pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewArticle {
    pub id: ArticleId,
    pub title: String,
    pub body: String,
}

impl NewArticle {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.title)?;
        crate::validate_string(&self.body)?;
        if self.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::TitleTooLong(self.title.chars().count()));
        }
        if self.body.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        Ok(())
    }
}
