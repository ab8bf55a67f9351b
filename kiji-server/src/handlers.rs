use anyhow::Context;
use axum::{
    extract::{Path, Query},
    Json,
};
use kiji_api::{
    admin_action_allowed, AdminAction, Article, ArticleId, ArticleStatus, AuthToken, CommentId,
    CommentPage, CommentStore, NewArticle, NewComment, NewSession, NewUser, RankingPolicy,
    RoleSet, TargetUser, UserId, Uuid,
};

use crate::{db, extractors::*, Error};

pub async fn admin_create_user(
    AdminAuth: AdminAuth,
    mut conn: PgConn,
    Json(data): Json<NewUser>,
) -> Result<(), Error> {
    data.validate()?;
    db::create_user(&mut *conn, data).await?;
    Ok(())
}

pub async fn auth(
    mut conn: PgConn,
    Json(data): Json<NewSession>,
) -> Result<Json<AuthToken>, Error> {
    data.validate()?;
    Ok(Json(
        db::login_user(&mut *conn, &data)
            .await
            .context("logging user in")?
            .ok_or(Error::permission_denied())?,
    ))
}

pub async fn unauth(user: PreAuth, mut conn: PgConn) -> Result<(), Error> {
    match db::logout_user(&mut *conn, &user.0).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::permission_denied()),
        Err(e) => Err(Error::Anyhow(e)),
    }
}

pub async fn whoami(Auth(user): Auth) -> Json<UserId> {
    Json(user)
}

fn default_page_size() -> usize {
    10
}

#[derive(serde::Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

pub async fn article_feed(
    Query(params): Query<FeedParams>,
    mut conn: PgConn,
) -> Result<Json<Vec<Article>>, Error> {
    if params.size < 1 {
        return Err(Error::invalid_page_size(params.size));
    }
    Ok(Json(
        db::fetch_article_feed(&mut *conn, params.page, params.size)
            .await
            .context("fetching article feed")?,
    ))
}

pub async fn create_article(
    Auth(user): Auth,
    mut conn: PgConn,
    Json(data): Json<NewArticle>,
) -> Result<Json<Article>, Error> {
    data.validate()?;
    Ok(Json(db::create_article(&mut *conn, user, data).await?))
}

pub async fn fetch_article(
    MaybeAuth(viewer): MaybeAuth,
    Path(article): Path<Uuid>,
    mut conn: PgConn,
) -> Result<Json<Article>, Error> {
    let article = ArticleId(article);
    let found = db::fetch_article(&mut *conn, article)
        .await
        .with_context(|| format!("fetching article {:?}", article))?
        .ok_or(Error::article_not_found(article))?;
    // unapproved articles are only visible to their author
    if found.status != ArticleStatus::Approved && viewer != Some(found.author_id) {
        return Err(Error::article_not_found(article));
    }
    Ok(Json(found))
}

#[derive(serde::Deserialize)]
pub struct ModerateArticle {
    pub approve: bool,
}

pub async fn moderate_article(
    Auth(user): Auth,
    Path(article): Path<Uuid>,
    mut conn: PgConn,
    Json(data): Json<ModerateArticle>,
) -> Result<(), Error> {
    let article = ArticleId(article);
    let actor = db::fetch_user(&mut *conn, user)
        .await
        .with_context(|| format!("fetching user {:?}", user))?
        .ok_or(Error::permission_denied())?;
    if !actor.roles.is_staff() {
        return Err(Error::permission_denied());
    }
    let status = match data.approve {
        true => ArticleStatus::Approved,
        false => ArticleStatus::Rejected,
    };
    match db::set_article_status(&mut *conn, article, status)
        .await
        .context("setting article status")?
    {
        true => Ok(()),
        false => Err(Error::article_not_found(article)),
    }
}

#[derive(serde::Deserialize)]
pub struct CommentPageParams {
    pub policy: Option<String>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

pub async fn comment_page(
    MaybeAuth(viewer): MaybeAuth,
    Path(article): Path<Uuid>,
    Query(params): Query<CommentPageParams>,
    mut conn: PgConn,
) -> Result<Json<CommentPage>, Error> {
    let article = ArticleId(article);
    let found = db::fetch_article(&mut *conn, article)
        .await
        .with_context(|| format!("fetching article {:?}", article))?
        .ok_or(Error::article_not_found(article))?;
    if found.status != ArticleStatus::Approved && viewer != Some(found.author_id) {
        return Err(Error::article_not_commentable(article));
    }
    let policy = params
        .policy
        .as_deref()
        .map(RankingPolicy::from_param)
        .unwrap_or(RankingPolicy::Top);
    let mut store = db::PostgresDb { conn: &mut *conn };
    let comments = store
        .fetch_comments(article)
        .await
        .with_context(|| format!("fetching comments of article {:?}", article))?;
    let page = kiji_threads::build_page(
        &comments,
        policy,
        params.page,
        params.size,
        viewer,
        &mut store,
    )
    .await?;
    Ok(Json(page))
}

pub async fn post_comment(
    MaybeAuth(author): MaybeAuth,
    Path(article): Path<Uuid>,
    mut conn: PgConn,
    Json(data): Json<NewComment>,
) -> Result<(), Error> {
    data.validate()?;
    let article = ArticleId(article);
    let found = db::fetch_article(&mut *conn, article)
        .await
        .with_context(|| format!("fetching article {:?}", article))?
        .ok_or(Error::article_not_found(article))?;
    if found.status != ArticleStatus::Approved {
        return Err(Error::article_not_commentable(article));
    }
    db::insert_comment(&mut *conn, article, author, data).await?;
    Ok(())
}

pub async fn delete_comment(
    Auth(user): Auth,
    Path(comment): Path<Uuid>,
    mut conn: PgConn,
) -> Result<(), Error> {
    let comment = CommentId(comment);
    let (article, author) = db::fetch_comment(&mut *conn, comment)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?
        .ok_or(Error::comment_not_found(comment))?;
    if author != Some(user) {
        let actor = db::fetch_user(&mut *conn, user)
            .await
            .with_context(|| format!("fetching user {:?}", user))?
            .ok_or(Error::permission_denied())?;
        if !actor.roles.is_staff() {
            return Err(Error::permission_denied());
        }
    }
    db::delete_comment(&mut *conn, comment, article)
        .await
        .context("deleting comment")?;
    Ok(())
}

pub async fn like_comment(
    Auth(user): Auth,
    Path(comment): Path<Uuid>,
    mut conn: PgConn,
) -> Result<(), Error> {
    db::like_comment(&mut *conn, CommentId(comment), user).await
}

pub async fn unlike_comment(
    Auth(user): Auth,
    Path(comment): Path<Uuid>,
    mut conn: PgConn,
) -> Result<(), Error> {
    db::unlike_comment(&mut *conn, CommentId(comment), user).await
}

pub async fn like_article(
    Auth(user): Auth,
    Path(article): Path<Uuid>,
    mut conn: PgConn,
) -> Result<(), Error> {
    db::like_article(&mut *conn, ArticleId(article), user).await
}

pub async fn unlike_article(
    Auth(user): Auth,
    Path(article): Path<Uuid>,
    mut conn: PgConn,
) -> Result<(), Error> {
    db::unlike_article(&mut *conn, ArticleId(article), user).await
}

#[derive(serde::Deserialize)]
pub struct UpdateRoles {
    pub roles: RoleSet,
}

pub async fn update_user_roles(
    Auth(actor): Auth,
    Path(target): Path<Uuid>,
    mut conn: PgConn,
    Json(data): Json<UpdateRoles>,
) -> Result<(), Error> {
    let target = UserId(target);
    let actor_user = db::fetch_user(&mut *conn, actor)
        .await
        .with_context(|| format!("fetching user {:?}", actor))?
        .ok_or(Error::permission_denied())?;
    let target_user = db::fetch_user(&mut *conn, target)
        .await
        .with_context(|| format!("fetching user {:?}", target))?
        .ok_or(Error::user_not_found(target))?;
    // every account keeps the base user role whatever was requested
    let requested = data.roles | RoleSet::plain_user();
    let target_info = TargetUser {
        is_self: actor == target,
        roles: target_user.roles,
    };
    if !admin_action_allowed(
        actor_user.roles,
        AdminAction::Update,
        Some(target_info),
        requested,
    ) {
        return Err(Error::permission_denied());
    }
    db::update_user_roles(&mut *conn, target, requested)
        .await
        .context("updating user roles")?;
    Ok(())
}
