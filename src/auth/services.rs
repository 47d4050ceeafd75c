use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginRequest, SignupRequest},
    jwt::TokenService,
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Trims and validates an email. Case is preserved; lookups are exact.
pub(crate) fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim();
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(email.to_string())
}

/// Resolves a bearer token to its user.
///
/// Every token failure is reported as the same `Unauthorized`; the specific
/// cause only reaches the log. A valid token whose subject no longer exists
/// is `NotFound`.
pub async fn authenticate(tokens: &TokenService, users: &dyn UserStore, token: &str) -> ApiResult<User> {
    let claims = tokens.decode(token).map_err(|e| {
        warn!(reason = %e.reason(), "token rejected");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;

    match users.find_by_email(&claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            warn!(sub = %claims.sub, "token subject has no account");
            Err(ApiError::NotFound("User not found".into()))
        }
    }
}

pub fn require_admin(user: &User) -> bool {
    user.is_admin
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signup(state: &AppState, payload: SignupRequest) -> ApiResult<User> {
    let email = normalize_email(&payload.email)?;

    if !is_long_enough(&payload.password) {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!("email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let requested_admin = payload.is_admin.unwrap_or(false);
    if requested_admin && !state.config.allow_admin_signup {
        warn!("ignoring is_admin on signup, admin signup is disabled");
    }
    let is_admin = requested_admin && state.config.allow_admin_signup;

    let hashed_password = state.passwords.hash_async(payload.password).await?;
    let token = state.tokens.issue(&email)?;

    let user = state
        .users
        .insert(NewUser {
            name: payload.name,
            email,
            date_of_birth: payload.date_of_birth,
            mobile_number: payload.mobile_number,
            hashed_password,
            is_admin,
            jwt: Some(token),
        })
        .await?;

    info!(user_id = %user.id, is_admin = user.is_admin, "user registered");
    Ok(user)
}

/// Returns a freshly issued access token on success.
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(state: &AppState, payload: LoginRequest) -> ApiResult<String> {
    let email = payload.email.trim();
    let invalid = || ApiError::Unauthorized("Invalid credentials".into());

    let Some(user) = state.users.find_by_email(email).await? else {
        warn!("login unknown email");
        return Err(invalid());
    };

    let ok = state
        .passwords
        .verify_async(payload.password, user.hashed_password.clone())
        .await?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let token = state.tokens.issue(&user.email)?;
    state.users.record_token(user.id, &token).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
