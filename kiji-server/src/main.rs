use anyhow::Context;
use axum::routing::{delete, get, post};
use std::net::SocketAddr;
use structopt::StructOpt;

mod db;
mod error;
mod extractors;
mod handlers;
mod tests;

pub use error::Error;
use extractors::{AppState, PgPool};
use kiji_api::AuthToken;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, StructOpt)]
#[structopt(
    name = "kiji-server",
    about = "Backend server for the kiji content platform"
)]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    tracing_subscriber::fmt::init();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = create_sqlx_pool(&db_url).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("running database migrations")?;

    let admin_token = match std::env::var("ADMIN_TOKEN") {
        Ok(token) => Some(AuthToken(
            token.parse().context("ADMIN_TOKEN must be a uuid")?,
        )),
        Err(_) => None,
    };
    if admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set, user creation is disabled");
    }

    let app = app(PgPool::new(pool), admin_token).await;
    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}

pub async fn create_sqlx_pool(url: &str) -> anyhow::Result<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .connect(url)
        .await
        .with_context(|| format!("opening database {url:?}"))
}

pub async fn app(db: PgPool, admin_token: Option<AuthToken>) -> axum::Router {
    axum::Router::new()
        .route("/api/admin/create-user", post(handlers::admin_create_user))
        .route(
            "/api/admin/user/:id/roles",
            post(handlers::update_user_roles),
        )
        .route("/api/auth", post(handlers::auth))
        .route("/api/unauth", post(handlers::unauth))
        .route("/api/whoami", get(handlers::whoami))
        .route(
            "/api/articles",
            get(handlers::article_feed).post(handlers::create_article),
        )
        .route("/api/article/:id", get(handlers::fetch_article))
        .route("/api/article/:id/moderate", post(handlers::moderate_article))
        .route("/api/article/:id/like", post(handlers::like_article))
        .route("/api/article/:id/unlike", post(handlers::unlike_article))
        .route(
            "/api/article/:id/comments",
            get(handlers::comment_page).post(handlers::post_comment),
        )
        .route("/api/comment/:id", delete(handlers::delete_comment))
        .route("/api/comment/:id/like", post(handlers::like_comment))
        .route("/api/comment/:id/unlike", post(handlers::unlike_comment))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(AppState { db, admin_token })
}
