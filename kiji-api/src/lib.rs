use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod article;
pub use article::{Article, ArticleId, ArticleStatus, NewArticle};

mod auth;
pub use auth::{admin_action_allowed, AdminAction, AuthToken, NewSession, RoleSet, TargetUser};

mod comment;
pub use comment::{
    Comment, CommentId, CommentPage, CommentView, NewComment, RankingPolicy, MAX_COMMENT_LENGTH,
};

mod error;
pub use error::Error;

mod store;
pub use store::{CommentStore, LikeStore};

mod user;
pub use user::{NewUser, User, UserId};

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
