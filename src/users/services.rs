use tracing::{info, instrument, warn};

use super::{
    dto::UpdateUserRequest,
    repo_types::{ProfileUpdate, User},
};
use crate::{
    auth::services::normalize_email,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Overwrites the caller's profile. Tokens issued for the old email stop
/// resolving once the email changes.
#[instrument(skip(state, current, payload), fields(user_id = %current.id))]
pub async fn update_profile(state: &AppState, current: User, payload: UpdateUserRequest) -> ApiResult<User> {
    let email = normalize_email(&payload.email)?;
    let update = ProfileUpdate {
        name: payload.name,
        email,
        date_of_birth: payload.date_of_birth,
        mobile_number: payload.mobile_number,
    };

    let Some(user) = state.users.update_profile(current.id, update).await? else {
        warn!("user vanished during update");
        return Err(ApiError::NotFound("User not found".into()));
    };

    if user.email != current.email {
        info!("user changed email");
    }
    Ok(user)
}

pub async fn list_users(state: &AppState) -> ApiResult<Vec<User>> {
    Ok(state.users.list_by_name().await?)
}
