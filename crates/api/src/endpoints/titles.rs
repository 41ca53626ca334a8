//! Title endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use critique_common::AppResult;
use critique_core::{Access, TitleRead, permissions};
use critique_db::repositories::TitleFilter;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{authorize, categories::CategoryResponse, default_limit, genres::GenreResponse},
    middleware::{AppState, MaybeAuthUser},
    response::{ApiResponse, created, ok},
};

/// Title response with nested category, genres and the derived rating.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleResponse {
    pub id: String,
    pub name: String,
    pub year: i16,
    pub description: Option<String>,
    pub category: CategoryResponse,
    pub genre: Vec<GenreResponse>,
    /// Mean review score; `null` until the first review lands.
    pub rating: Option<f64>,
}

impl From<TitleRead> for TitleResponse {
    fn from(read: TitleRead) -> Self {
        Self {
            id: read.title.id,
            name: read.title.name,
            year: read.title.year,
            description: read.title.description,
            category: CategoryResponse::from(read.category),
            genre: read.genres.into_iter().map(GenreResponse::from).collect(),
            rating: read.rating,
        }
    }
}

/// List titles request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTitlesQuery {
    /// Category slug substring.
    pub category: Option<String>,
    /// Exact genre slug.
    pub genre: Option<String>,
    /// Name substring.
    pub name: Option<String>,
    /// Exact year.
    pub year: Option<i16>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Create title request; category and genres are slug references.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i16,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Update title request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

/// List titles (public).
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListTitlesQuery>,
) -> AppResult<ApiResponse<Vec<TitleResponse>>> {
    let filter = TitleFilter {
        category: query.category,
        genre: query.genre,
        name: query.name,
        year: query.year,
    };

    let titles = state
        .title_service
        .list(&filter, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        titles.into_iter().map(TitleResponse::from).collect(),
    ))
}

/// Show a title (public).
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TitleResponse>> {
    let title = state.title_service.get(&id).await?;
    Ok(ApiResponse::ok(TitleResponse::from(title)))
}

/// Create a title (admin).
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTitleRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    let input = critique_core::CreateTitleInput {
        name: req.name,
        year: req.year,
        description: req.description,
        category: req.category,
        genre: req.genre,
    };
    let title = state.title_service.create(input).await?;

    Ok(created(TitleResponse::from(title)))
}

/// Update a title (admin).
async fn update(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTitleRequest>,
) -> AppResult<ApiResponse<TitleResponse>> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    let input = critique_core::UpdateTitleInput {
        name: req.name,
        year: req.year,
        description: req.description,
        category: req.category,
        genre: req.genre,
    };
    let title = state.title_service.update(&id, input).await?;

    Ok(ApiResponse::ok(TitleResponse::from(title)))
}

/// Delete a title (admin).
async fn remove(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    state.title_service.delete(&id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{title_id}", get(show).patch(update).delete(remove))
}
