use std::collections::HashSet;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use kiji_api::{
    Article, ArticleId, ArticleStatus, AuthToken, Comment, CommentId, CommentStore, LikeStore,
    NewArticle, NewComment, NewSession, NewUser, RoleSet, User, UserId, Uuid,
};
use sqlx::Row;

use crate::Error;

pub async fn create_user(conn: &mut sqlx::PgConnection, user: NewUser) -> Result<(), Error> {
    let id_taken = sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(user.id.0)
        .fetch_optional(&mut *conn)
        .await
        .context("checking whether user id is taken")?;
    if id_taken.is_some() {
        return Err(Error::uuid_already_used(user.id.0));
    }
    let name_taken = sqlx::query("SELECT id FROM users WHERE name = $1")
        .bind(&user.name)
        .fetch_optional(&mut *conn)
        .await
        .context("checking whether user name is taken")?;
    if name_taken.is_some() {
        return Err(Error::name_already_used(user.name));
    }
    let hash = bcrypt::hash(&user.initial_password_hash, bcrypt::DEFAULT_COST)
        .context("hashing initial password")?;
    sqlx::query(
        "
            INSERT INTO users (id, name, password_hash, is_admin, is_manager, is_system_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(user.id.0)
    .bind(&user.name)
    .bind(hash)
    .bind(user.roles.admin)
    .bind(user.roles.manager)
    .bind(user.roles.system_admin)
    .execute(conn)
    .await
    .with_context(|| format!("inserting user {:?}", user.id))?;
    Ok(())
}

pub async fn login_user(
    conn: &mut sqlx::PgConnection,
    session: &NewSession,
) -> anyhow::Result<Option<AuthToken>> {
    let user = sqlx::query("SELECT id, password_hash FROM users WHERE name = $1")
        .bind(&session.user)
        .fetch_optional(&mut *conn)
        .await
        .context("fetching user for login")?;
    let user = match user {
        Some(user) => user,
        None => return Ok(None),
    };
    let hash: String = user
        .try_get("password_hash")
        .context("retrieving the password_hash field")?;
    if !bcrypt::verify(&session.password, &hash).context("verifying password")? {
        return Ok(None);
    }
    let token = AuthToken(Uuid::new_v4());
    sqlx::query("INSERT INTO sessions (token, user_id, device, login_time) VALUES ($1, $2, $3, $4)")
        .bind(token.0)
        .bind(user.try_get::<Uuid, _>("id").context("retrieving the id field")?)
        .bind(&session.device)
        .bind(Utc::now().naive_utc())
        .execute(conn)
        .await
        .context("inserting session")?;
    Ok(Some(token))
}

pub async fn logout_user(conn: &mut sqlx::PgConnection, token: &AuthToken) -> anyhow::Result<bool> {
    Ok(sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token.0)
        .execute(conn)
        .await
        .context("deleting session")?
        .rows_affected()
        > 0)
}

pub async fn recover_session(
    conn: &mut sqlx::PgConnection,
    token: AuthToken,
) -> Result<UserId, Error> {
    match sqlx::query("SELECT user_id FROM sessions WHERE token = $1")
        .bind(token.0)
        .fetch_optional(conn)
        .await
        .context("fetching session")?
    {
        Some(row) => Ok(UserId(
            row.try_get("user_id")
                .context("retrieving the user_id field")?,
        )),
        None => Err(Error::permission_denied()),
    }
}

pub async fn fetch_user(
    conn: &mut sqlx::PgConnection,
    user: UserId,
) -> anyhow::Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, name, is_admin, is_manager, is_system_admin FROM users WHERE id = $1",
    )
    .bind(user.0)
    .fetch_optional(conn)
    .await
    .with_context(|| format!("fetching user {:?}", user))?;
    match row {
        None => Ok(None),
        Some(row) => Ok(Some(User {
            id: user,
            name: row.try_get("name").context("retrieving the name field")?,
            roles: RoleSet {
                user: true,
                admin: row
                    .try_get("is_admin")
                    .context("retrieving the is_admin field")?,
                manager: row
                    .try_get("is_manager")
                    .context("retrieving the is_manager field")?,
                system_admin: row
                    .try_get("is_system_admin")
                    .context("retrieving the is_system_admin field")?,
            },
        })),
    }
}

pub async fn update_user_roles(
    conn: &mut sqlx::PgConnection,
    user: UserId,
    roles: RoleSet,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET is_admin = $2, is_manager = $3, is_system_admin = $4 WHERE id = $1")
        .bind(user.0)
        .bind(roles.admin)
        .bind(roles.manager)
        .bind(roles.system_admin)
        .execute(conn)
        .await
        .with_context(|| format!("updating roles of user {:?}", user))?;
    Ok(())
}

fn article_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Article> {
    Ok(Article {
        id: ArticleId(row.try_get("id").context("retrieving the id field")?),
        author_id: UserId(
            row.try_get("author_id")
                .context("retrieving the author_id field")?,
        ),
        title: row.try_get("title").context("retrieving the title field")?,
        body: row.try_get("body").context("retrieving the body field")?,
        status: row
            .try_get::<String, _>("status")
            .context("retrieving the status field")?
            .parse()?,
        created_at: row
            .try_get::<chrono::NaiveDateTime, _>("created_at")
            .context("retrieving the created_at field")?
            .and_local_timezone(Utc)
            .unwrap(),
        like_count: row
            .try_get("like_count")
            .context("retrieving the like_count field")?,
        comment_count: row
            .try_get("comment_count")
            .context("retrieving the comment_count field")?,
    })
}

pub async fn create_article(
    conn: &mut sqlx::PgConnection,
    author: UserId,
    article: NewArticle,
) -> Result<Article, Error> {
    let id_taken = sqlx::query("SELECT id FROM articles WHERE id = $1")
        .bind(article.id.0)
        .fetch_optional(&mut *conn)
        .await
        .context("checking whether article id is taken")?;
    if id_taken.is_some() {
        return Err(Error::uuid_already_used(article.id.0));
    }
    let created_at = Utc::now();
    sqlx::query(
        "
            INSERT INTO articles (id, author_id, title, body, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(article.id.0)
    .bind(author.0)
    .bind(&article.title)
    .bind(&article.body)
    .bind(ArticleStatus::Pending.as_str())
    .bind(created_at.naive_utc())
    .execute(conn)
    .await
    .with_context(|| format!("inserting article {:?}", article.id))?;
    Ok(Article {
        id: article.id,
        author_id: author,
        title: article.title,
        body: article.body,
        status: ArticleStatus::Pending,
        created_at,
        like_count: 0,
        comment_count: 0,
    })
}

pub async fn fetch_article(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
) -> anyhow::Result<Option<Article>> {
    match sqlx::query(
        "
            SELECT id, author_id, title, body, status, created_at, like_count, comment_count
                FROM articles
            WHERE id = $1
        ",
    )
    .bind(article.0)
    .fetch_optional(conn)
    .await
    .with_context(|| format!("fetching article {:?}", article))?
    {
        Some(row) => Ok(Some(article_from_row(&row)?)),
        None => Ok(None),
    }
}

pub async fn fetch_article_feed(
    conn: &mut sqlx::PgConnection,
    page: usize,
    size: usize,
) -> anyhow::Result<Vec<Article>> {
    let mut articles = Vec::new();
    let mut query = sqlx::query(
        "
            SELECT id, author_id, title, body, status, created_at, like_count, comment_count
                FROM articles
            WHERE status = $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
        ",
    )
    .bind(ArticleStatus::Approved.as_str())
    .bind(size as i64)
    .bind(page.saturating_mul(size) as i64)
    .fetch(conn);
    while let Some(row) = query.try_next().await.context("querying articles table")? {
        articles.push(article_from_row(&row)?);
    }
    Ok(articles)
}

pub async fn set_article_status(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
    status: ArticleStatus,
) -> anyhow::Result<bool> {
    Ok(sqlx::query("UPDATE articles SET status = $2 WHERE id = $1")
        .bind(article.0)
        .bind(status.as_str())
        .execute(conn)
        .await
        .with_context(|| format!("setting status of article {:?}", article))?
        .rows_affected()
        > 0)
}

pub async fn fetch_comments(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
) -> anyhow::Result<Vec<Comment>> {
    let mut comments = Vec::new();
    let mut query = sqlx::query(
        "
            SELECT c.id, c.article_id, c.author_id, u.name AS author_name,
                   c.anonymous, c.parent_id, c.created_at, c.like_count, c.content
                FROM comments c
            LEFT JOIN users u
                ON u.id = c.author_id
            WHERE c.article_id = $1
        ",
    )
    .bind(article.0)
    .fetch(conn);
    while let Some(row) = query.try_next().await.context("querying comments table")? {
        comments.push(Comment {
            id: CommentId(row.try_get("id").context("retrieving the id field")?),
            article_id: ArticleId(
                row.try_get("article_id")
                    .context("retrieving the article_id field")?,
            ),
            author_id: row
                .try_get::<Option<Uuid>, _>("author_id")
                .context("retrieving the author_id field")?
                .map(UserId),
            author_name: row
                .try_get("author_name")
                .context("retrieving the author_name field")?,
            anonymous: row
                .try_get("anonymous")
                .context("retrieving the anonymous field")?,
            parent_id: row
                .try_get::<Option<Uuid>, _>("parent_id")
                .context("retrieving the parent_id field")?
                .map(CommentId),
            created_at: row
                .try_get::<Option<chrono::NaiveDateTime>, _>("created_at")
                .context("retrieving the created_at field")?
                .map(|d| d.and_local_timezone(Utc).unwrap()),
            like_count: row
                .try_get("like_count")
                .context("retrieving the like_count field")?,
            content: row
                .try_get("content")
                .context("retrieving the content field")?,
        });
    }
    Ok(comments)
}

pub async fn insert_comment(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
    author: Option<UserId>,
    comment: NewComment,
) -> Result<(), Error> {
    let id_taken = sqlx::query("SELECT id FROM comments WHERE id = $1")
        .bind(comment.id.0)
        .fetch_optional(&mut *conn)
        .await
        .context("checking whether comment id is taken")?;
    if id_taken.is_some() {
        return Err(Error::uuid_already_used(comment.id.0));
    }
    if let Some(parent) = comment.parent_id {
        let parent_row = sqlx::query("SELECT article_id FROM comments WHERE id = $1")
            .bind(parent.0)
            .fetch_optional(&mut *conn)
            .await
            .context("fetching parent comment")?;
        let parent_article: Uuid = match parent_row {
            None => return Err(Error::comment_not_found(parent)),
            Some(row) => row
                .try_get("article_id")
                .context("retrieving the article_id field")?,
        };
        if parent_article != article.0 {
            // a parent from another article is as good as no parent at all
            return Err(Error::comment_not_found(parent));
        }
    }
    sqlx::query(
        "
            INSERT INTO comments (id, article_id, author_id, parent_id, content, anonymous, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(comment.id.0)
    .bind(article.0)
    .bind(author.map(|u| u.0))
    .bind(comment.parent_id.map(|p| p.0))
    .bind(&comment.content)
    .bind(comment.anonymous)
    .bind(Utc::now().naive_utc())
    .execute(&mut *conn)
    .await
    .with_context(|| format!("inserting comment {:?}", comment.id))?;
    sqlx::query("UPDATE articles SET comment_count = comment_count + 1 WHERE id = $1")
        .bind(article.0)
        .execute(conn)
        .await
        .context("bumping article comment count")?;
    Ok(())
}

pub async fn fetch_comment(
    conn: &mut sqlx::PgConnection,
    comment: CommentId,
) -> anyhow::Result<Option<(ArticleId, Option<UserId>)>> {
    match sqlx::query("SELECT article_id, author_id FROM comments WHERE id = $1")
        .bind(comment.0)
        .fetch_optional(conn)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?
    {
        None => Ok(None),
        Some(row) => Ok(Some((
            ArticleId(
                row.try_get("article_id")
                    .context("retrieving the article_id field")?,
            ),
            row.try_get::<Option<Uuid>, _>("author_id")
                .context("retrieving the author_id field")?
                .map(UserId),
        ))),
    }
}

pub async fn delete_comment(
    conn: &mut sqlx::PgConnection,
    comment: CommentId,
    article: ArticleId,
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment.0)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("deleting comment {:?}", comment))?;
    sqlx::query("UPDATE articles SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1")
        .bind(article.0)
        .execute(conn)
        .await
        .context("lowering article comment count")?;
    Ok(())
}

pub async fn like_comment(
    conn: &mut sqlx::PgConnection,
    comment: CommentId,
    user: UserId,
) -> Result<(), Error> {
    let known = sqlx::query("SELECT id FROM comments WHERE id = $1")
        .bind(comment.0)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?;
    if known.is_none() {
        return Err(Error::comment_not_found(comment));
    }
    let already = sqlx::query("SELECT comment_id FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
        .bind(comment.0)
        .bind(user.0)
        .fetch_optional(&mut *conn)
        .await
        .context("checking for existing like")?;
    if already.is_some() {
        return Ok(());
    }
    sqlx::query("INSERT INTO comment_likes (comment_id, user_id, created_at) VALUES ($1, $2, $3)")
        .bind(comment.0)
        .bind(user.0)
        .bind(Utc::now().naive_utc())
        .execute(&mut *conn)
        .await
        .context("inserting comment like")?;
    sqlx::query("UPDATE comments SET like_count = like_count + 1 WHERE id = $1")
        .bind(comment.0)
        .execute(conn)
        .await
        .context("bumping comment like count")?;
    Ok(())
}

pub async fn unlike_comment(
    conn: &mut sqlx::PgConnection,
    comment: CommentId,
    user: UserId,
) -> Result<(), Error> {
    let known = sqlx::query("SELECT id FROM comments WHERE id = $1")
        .bind(comment.0)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?;
    if known.is_none() {
        return Err(Error::comment_not_found(comment));
    }
    let removed =
        sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment.0)
            .bind(user.0)
            .execute(&mut *conn)
            .await
            .context("deleting comment like")?;
    if removed.rows_affected() == 0 {
        return Ok(());
    }
    sqlx::query("UPDATE comments SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1")
        .bind(comment.0)
        .execute(conn)
        .await
        .context("lowering comment like count")?;
    Ok(())
}

pub async fn like_article(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
    user: UserId,
) -> Result<(), Error> {
    let known = sqlx::query("SELECT id FROM articles WHERE id = $1 AND status = $2")
        .bind(article.0)
        .bind(ArticleStatus::Approved.as_str())
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("fetching article {:?}", article))?;
    if known.is_none() {
        return Err(Error::article_not_found(article));
    }
    let already = sqlx::query("SELECT article_id FROM article_likes WHERE article_id = $1 AND user_id = $2")
        .bind(article.0)
        .bind(user.0)
        .fetch_optional(&mut *conn)
        .await
        .context("checking for existing like")?;
    if already.is_some() {
        return Ok(());
    }
    sqlx::query("INSERT INTO article_likes (article_id, user_id, created_at) VALUES ($1, $2, $3)")
        .bind(article.0)
        .bind(user.0)
        .bind(Utc::now().naive_utc())
        .execute(&mut *conn)
        .await
        .context("inserting article like")?;
    sqlx::query("UPDATE articles SET like_count = like_count + 1 WHERE id = $1")
        .bind(article.0)
        .execute(conn)
        .await
        .context("bumping article like count")?;
    Ok(())
}

pub async fn unlike_article(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
    user: UserId,
) -> Result<(), Error> {
    let known = sqlx::query("SELECT id FROM articles WHERE id = $1 AND status = $2")
        .bind(article.0)
        .bind(ArticleStatus::Approved.as_str())
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("fetching article {:?}", article))?;
    if known.is_none() {
        return Err(Error::article_not_found(article));
    }
    let removed = sqlx::query("DELETE FROM article_likes WHERE article_id = $1 AND user_id = $2")
        .bind(article.0)
        .bind(user.0)
        .execute(&mut *conn)
        .await
        .context("deleting article like")?;
    if removed.rows_affected() == 0 {
        return Ok(());
    }
    sqlx::query("UPDATE articles SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1")
        .bind(article.0)
        .execute(conn)
        .await
        .context("lowering article like count")?;
    Ok(())
}

/// Adapter giving the thread pipeline its two store boundaries over one
/// borrowed connection.
pub struct PostgresDb<'a> {
    pub conn: &'a mut sqlx::PgConnection,
}

#[async_trait]
impl CommentStore for PostgresDb<'_> {
    async fn fetch_comments(&mut self, article: ArticleId) -> anyhow::Result<Vec<Comment>> {
        fetch_comments(self.conn, article).await
    }
}

#[async_trait]
impl LikeStore for PostgresDb<'_> {
    async fn find_liked_comment_ids(
        &mut self,
        viewer: UserId,
        comments: &HashSet<CommentId>,
    ) -> anyhow::Result<HashSet<CommentId>> {
        let ids = comments.iter().map(|c| c.0).collect::<Vec<_>>();
        let mut liked = HashSet::new();
        let mut query =
            sqlx::query("SELECT comment_id FROM comment_likes WHERE user_id = $1 AND comment_id = ANY($2)")
                .bind(viewer.0)
                .bind(ids)
                .fetch(&mut *self.conn);
        while let Some(row) = query
            .try_next()
            .await
            .context("querying comment_likes table")?
        {
            liked.insert(CommentId(
                row.try_get("comment_id")
                    .context("retrieving the comment_id field")?,
            ));
        }
        Ok(liked)
    }
}
