//! API endpoints.

mod auth;
mod categories;
mod comments;
mod genres;
mod reviews;
mod titles;
mod users;

use axum::Router;
use critique_common::{AppError, AppResult};
use critique_db::entities::user;
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
///
/// The server nests this under the versioned prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
        .nest("/titles/{title_id}/reviews", reviews::router())
        .nest(
            "/titles/{title_id}/reviews/{review_id}/comments",
            comments::router(),
        )
        .nest("/users", users::router())
}

/// Turn a predicate verdict into a response-shaping error.
///
/// Anonymous requesters get 401, authenticated-but-insufficient get 403.
pub(crate) fn authorize(allowed: bool, user: Option<&user::Model>) -> AppResult<()> {
    if allowed {
        Ok(())
    } else if user.is_none() {
        Err(AppError::Unauthorized)
    } else {
        Err(AppError::Forbidden("Insufficient permissions".to_string()))
    }
}

/// Common list pagination parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

pub(crate) const fn default_limit() -> u64 {
    10
}
