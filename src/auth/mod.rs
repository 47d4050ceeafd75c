use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;

pub use claims::Claims;
pub use extractors::{AdminUser, AuthUser};
pub use jwt::{InvalidToken, TokenFault, TokenService};
pub use password::PasswordService;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
