//! User endpoints

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::infrastructure::user::{CreateUserRequest, PatchUserRequest, UserResponse};

/// Query string of `GET /api/users`
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

type UserResult = Result<Json<ApiResponse<UserResponse>>, ApiError>;

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route(
            "/user/{id}",
            get(get_user).patch(patch_user).delete(delete_user),
        )
        .route("/users", get(list_users))
}

/// POST /api/user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    debug!("Creating user");

    let user = state.user_service.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("CreateUser", user)),
    ))
}

/// GET /api/user/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> UserResult {
    debug!(user_id = %id, "Getting user");

    let user = state.user_service.get_by_id(&id).await?;

    Ok(Json(ApiResponse::new("GetUserByID", user)))
}

/// GET /api/users?page=N
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request(rejection.body_text())
            .with_param("page")
            .with_code("invalid_page_number")
    })?;

    debug!(page = query.page, "Listing users");

    let users = state.user_service.list(query.page).await?;

    Ok(Json(ApiResponse::new("GetUsers", users)))
}

/// PATCH /api/user/{id}
pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PatchUserRequest>,
) -> UserResult {
    debug!(user_id = %id, "Patching user");

    let user = state.user_service.patch(&id, request).await?;

    Ok(Json(ApiResponse::new("PatchUser", user)))
}

/// DELETE /api/user/{id}
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> UserResult {
    debug!(user_id = %id, "Deleting user");

    let user = state.user_service.delete(&id).await?;

    Ok(Json(ApiResponse::new("DeleteUser", user)))
}
