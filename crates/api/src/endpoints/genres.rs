//! Genre endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
};
use critique_common::AppResult;
use critique_core::{Access, permissions};
use critique_db::entities::genre;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{authorize, default_limit},
    middleware::{AppState, MaybeAuthUser},
    response::{ApiResponse, created, ok},
};

/// Genre response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreResponse {
    pub name: String,
    pub slug: String,
}

impl From<genre::Model> for GenreResponse {
    fn from(c: genre::Model) -> Self {
        Self {
            name: c.name,
            slug: c.slug,
        }
    }
}

/// List genres request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGenresQuery {
    /// Name substring filter.
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Create genre request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGenreRequest {
    pub name: String,
    pub slug: String,
}

/// List genres (public).
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListGenresQuery>,
) -> AppResult<ApiResponse<Vec<GenreResponse>>> {
    let genres = state
        .genre_service
        .list(query.search.as_deref(), query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        genres.into_iter().map(GenreResponse::from).collect(),
    ))
}

/// Create a genre (admin).
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateGenreRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    let input = critique_core::CreateGenreInput {
        name: req.name,
        slug: req.slug,
    };
    let genre = state.genre_service.create(input).await?;

    Ok(created(GenreResponse::from(genre)))
}

/// Delete a genre by slug (admin).
async fn remove(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    state.genre_service.delete(&slug).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{slug}", delete(remove))
}
