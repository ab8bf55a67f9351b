use kiji_api::{ArticleId, CommentId, Error as ApiError, UserId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn permission_denied() -> Error {
        Error::Api(ApiError::PermissionDenied)
    }

    pub fn uuid_already_used(uuid: kiji_api::Uuid) -> Error {
        Error::Api(ApiError::UuidAlreadyUsed(uuid))
    }

    pub fn name_already_used(name: String) -> Error {
        Error::Api(ApiError::NameAlreadyUsed(name))
    }

    pub fn invalid_page_size(size: usize) -> Error {
        Error::Api(ApiError::InvalidPageSize(size as i64))
    }

    pub fn article_not_found(article: ArticleId) -> Error {
        Error::Api(ApiError::ArticleNotFound(article.0))
    }

    pub fn article_not_commentable(article: ArticleId) -> Error {
        Error::Api(ApiError::ArticleNotCommentable(article.0))
    }

    pub fn comment_not_found(comment: CommentId) -> Error {
        Error::Api(ApiError::CommentNotFound(comment.0))
    }

    pub fn user_not_found(user: UserId) -> Error {
        Error::Api(ApiError::UserNotFound(user.0))
    }
}

impl From<kiji_threads::BuildError> for Error {
    fn from(err: kiji_threads::BuildError) -> Error {
        match err {
            kiji_threads::BuildError::Api(err) => Error::Api(err),
            kiji_threads::BuildError::Store(err) => Error::Anyhow(err),
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            Error::Anyhow(err) => {
                tracing::error!(?err, "internal server error");
                #[cfg(not(test))]
                let err =
                    ApiError::Unknown(String::from("Internal server error, see logs for details"));
                #[cfg(test)]
                let err = ApiError::Unknown(format!("Internal server error: {err:?}"));
                err
            }
            Error::Api(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        };
        (err.status_code(), err.contents()).into_response()
    }
}
