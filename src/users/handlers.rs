use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{UpdateUserRequest, UserResponse},
    services,
};
use crate::{
    auth::{AdminUser, AuthUser},
    error::{ApiResult, AppJson},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/user", put(update_me))
        .route("/users", get(list_users))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

#[instrument(skip(state, user, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = services::update_profile(&state, user, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = services::list_users(&state).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
