// crates/server/src/routes/users.rs
//! User directory endpoints.
//!
//! - GET    /users          paginated listing (`offset`, `limit`)
//! - GET    /users/search   lookup by `username` or `email`
//! - POST   /users          create
//! - GET    /users/{id}     fetch one
//! - PATCH  /users/{id}     partial update
//! - PUT    /users/{id}     full replace
//! - DELETE /users/{id}     delete

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use parcelwise_db::{NewUser, User, UserPatch};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "User not found";

// ============================================================================
// Query types
// ============================================================================

/// Query parameters for GET /users. Negative values fail to parse (422).
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

/// Query parameters for GET /users/search. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserSearch {
    pub username: Option<String>,
    pub email: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_users(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<Vec<User>>> {
    let Query(page) = query?;
    let users = state
        .db
        .list_users(i64::from(page.offset), i64::from(page.limit))
        .await?;
    Ok(Json(users))
}

async fn search_user(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UserSearch>, QueryRejection>,
) -> ApiResult<Json<User>> {
    let Query(search) = query?;
    let username = search.username.as_deref().filter(|s| !s.is_empty());
    let email = search.email.as_deref().filter(|s| !s.is_empty());
    if username.is_none() && email.is_none() {
        return Err(ApiError::BadRequest(
            "Provide either 'username' or 'email' as a query parameter".to_string(),
        ));
    }

    state
        .db
        .find_user(username, email)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(new_user) = body?;
    let user = state.db.create_user(&new_user).await?;
    tracing::info!(user_id = user.id, "Created user");
    Ok(Json(user))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    state.db.get_user(id).await?.map(Json).ok_or_else(not_found)
}

async fn patch_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    state
        .db
        .update_user(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

async fn replace_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(user) = body?;
    state
        .db
        .replace_user(id, &user)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    if !state.db.delete_user(id).await? {
        return Err(not_found());
    }
    tracing::info!(user_id = id, "Deleted user");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

fn not_found() -> ApiError {
    ApiError::NotFound(USER_NOT_FOUND.to_string())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/search", get(search_user))
        .route(
            "/users/{id}",
            get(get_user)
                .patch(patch_user)
                .put(replace_user)
                .delete(delete_user),
        )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::test_support::test_state;

    async fn app() -> Router {
        crate::create_app(test_state().await)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(app: &Router, username: &str, email: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/users",
            Some(json!({ "username": username, "email": email })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let app = app().await;
        let created = create(&app, "ada", "ada@example.com").await;
        assert_eq!(created["username"], "ada");
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn test_duplicate_user_is_bad_request() {
        let app = app().await;
        create(&app, "ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({ "username": "ada", "email": "other@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Username/Email already exists");
    }

    #[tokio::test]
    async fn test_create_missing_field_is_422() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/users", Some(json!({ "username": "ada" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_list_users_paginates() {
        let app = app().await;
        for i in 0..3 {
            create(&app, &format!("u{i}"), &format!("u{i}@example.com")).await;
        }

        let (status, body) = send(&app, Method::GET, "/users?offset=1&limit=1", None).await;
        assert_eq!(status, StatusCode::OK);
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "u1");

        let (_, body) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, _) = send(&app, Method::GET, "/users?limit=-1", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_search_user() {
        let app = app().await;
        create(&app, "ada", "ada@example.com").await;

        let (status, body) = send(&app, Method::GET, "/users/search?email=ada@example.com", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada");

        let (status, body) = send(&app, Method::GET, "/users/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Provide either 'username' or 'email' as a query parameter"
        );

        let (status, body) = send(&app, Method::GET, "/users/search?username=nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn test_patch_put_delete() {
        let app = app().await;
        let id = create(&app, "ada", "ada@example.com").await["id"]
            .as_i64()
            .unwrap();
        let uri = format!("/users/{id}");

        let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "email": "new@example.com" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada");
        assert_eq!(body["email"], "new@example.com");

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "username": "lovelace", "email": "l@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "lovelace");

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted successfully");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_422() {
        let app = app().await;
        let (status, _) = send(&app, Method::GET, "/users/abc", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
