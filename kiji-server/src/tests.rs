#![cfg(test)]

use axum::{
    extract::FromRequestParts,
    http::{self, request, StatusCode},
    Router,
};
use kiji_api::{AuthToken, Error as ApiError, NewUser, RoleSet, UserId, Uuid};
use tower::{Service, ServiceExt};

use crate::{extractors::*, *};

/// A pool that never actually connects: these tests only exercise paths that
/// fail before any query is issued.
fn test_pool() -> PgPool {
    PgPool::new(
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://127.0.0.1:1/kiji_test")
            .expect("building lazy test pool"),
    )
}

async fn preauth_for(header: &str) -> Result<PreAuth, Error> {
    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri("/")
        .header(http::header::AUTHORIZATION, header)
        .body(())
        .expect("building request");
    let mut parts = req.into_parts().0;
    PreAuth::from_request_parts(&mut parts, &()).await
}

#[tokio::test]
async fn preauth_accepts_bearer_tokens_only() {
    let token = Uuid::new_v4();
    match preauth_for(&format!("bearer {token}")).await {
        Ok(PreAuth(t)) => assert_eq!(t, AuthToken(token)),
        Err(e) => panic!("valid bearer token rejected: {e}"),
    }
    // scheme matching is case-insensitive
    assert!(preauth_for(&format!("Bearer {token}")).await.is_ok());
    for bad in [
        String::from("bearer"),
        format!("basic {token}"),
        format!("bearer {token} extra"),
        String::from("bearer not-a-uuid"),
    ] {
        match preauth_for(&bad).await {
            Err(Error::Api(ApiError::PermissionDenied)) => (),
            Ok(_) => panic!("header {bad:?} was accepted"),
            Err(e) => panic!("header {bad:?} gave unexpected error: {e}"),
        }
    }
}

#[tokio::test]
async fn preauth_requires_a_header() {
    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri("/")
        .body(())
        .expect("building request");
    let mut parts = req.into_parts().0;
    match PreAuth::from_request_parts(&mut parts, &()).await {
        Err(Error::Api(ApiError::PermissionDenied)) => (),
        Ok(_) => panic!("missing header was accepted"),
        Err(e) => panic!("unexpected error: {e}"),
    }
}

async fn run(
    app: &mut Router,
    method: &str,
    uri: &str,
    token: Option<Uuid>,
    body: Option<Vec<u8>>,
) -> (StatusCode, Vec<u8>) {
    let req = request::Builder::new()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    let req = match token {
        Some(token) => req.header(http::header::AUTHORIZATION, format!("bearer {token}")),
        None => req,
    };
    let req = req
        .body(axum::body::Body::from(body.unwrap_or_default()))
        .expect("building request");
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes")
        .to_vec();
    (status, body)
}

#[tokio::test]
async fn unauthenticated_whoami_is_denied() {
    let mut app = app(test_pool(), None).await;
    let (status, body) = run(&mut app, "GET", "/api/whoami", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        ApiError::parse(&body).expect("parsing error body"),
        ApiError::PermissionDenied,
    );
}

#[tokio::test]
async fn user_creation_is_disabled_without_a_configured_admin_token() {
    let mut app = app(test_pool(), None).await;
    let new_user = NewUser {
        id: UserId::stub(),
        name: String::from("alice"),
        initial_password_hash: String::from("password"),
        roles: RoleSet::plain_user(),
    };
    let (status, body) = run(
        &mut app,
        "POST",
        "/api/admin/create-user",
        Some(Uuid::new_v4()),
        Some(serde_json::to_vec(&new_user).expect("serializing request body")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        ApiError::parse(&body).expect("parsing error body"),
        ApiError::PermissionDenied,
    );
}

#[tokio::test]
async fn mismatched_admin_tokens_are_denied() {
    let mut app = app(test_pool(), Some(AuthToken(Uuid::new_v4()))).await;
    let new_user = NewUser {
        id: UserId::stub(),
        name: String::from("alice"),
        initial_password_hash: String::from("password"),
        roles: RoleSet::plain_user(),
    };
    let (status, _) = run(
        &mut app,
        "POST",
        "/api/admin/create-user",
        Some(Uuid::new_v4()),
        Some(serde_json::to_vec(&new_user).expect("serializing request body")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let mut app = app(test_pool(), None).await;
    let (status, _) = run(&mut app, "GET", "/api/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
