//! Category endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
};
use critique_common::AppResult;
use critique_core::{Access, permissions};
use critique_db::entities::category;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{authorize, default_limit},
    middleware::{AppState, MaybeAuthUser},
    response::{ApiResponse, created, ok},
};

/// Category response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub name: String,
    pub slug: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(c: category::Model) -> Self {
        Self {
            name: c.name,
            slug: c.slug,
        }
    }
}

/// List categories request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    /// Name substring filter.
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Create category request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

/// List categories (public).
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let categories = state
        .category_service
        .list(query.search.as_deref(), query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// Create a category (admin).
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    let input = critique_core::CreateCategoryInput {
        name: req.name,
        slug: req.slug,
    };
    let category = state.category_service.create(input).await?;

    Ok(created(CategoryResponse::from(category)))
}

/// Delete a category by slug (admin).
async fn remove(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::admin_or_read_only(Access::Write, user.as_ref()),
        user.as_ref(),
    )?;

    state.category_service.delete(&slug).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{slug}", delete(remove))
}
