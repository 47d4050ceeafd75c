use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::services::{authenticate, require_admin};
use crate::{error::ApiError, state::AppState, users::repo_types::User};

/// Pulls the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization header".into()))?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization scheme".into()))
}

/// Authenticated caller.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = authenticate(&state.tokens, state.users.as_ref(), token).await?;
        Ok(AuthUser(user))
    }
}

/// Authenticated caller with the admin flag set.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !require_admin(&user) {
            warn!(user_id = %user.id, "admin access denied");
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(ApiError::Unauthorized(_))));
        assert!(matches!(bearer_token(&headers("Basic dXNlcjpwdw==")), Err(ApiError::Unauthorized(_))));
        assert!(matches!(bearer_token(&headers("Bearer ")), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn non_ascii_header_is_reported_as_invalid_not_missing() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());
        match bearer_token(&h) {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Invalid authorization header"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }

        match bearer_token(&HeaderMap::new()) {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Missing Authorization header"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }
}
