//! Review endpoints, scoped to a title.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use critique_common::AppResult;
use critique_core::{Access, permissions};
use critique_db::entities::review;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{Pagination, authorize},
    middleware::{AppState, MaybeAuthUser},
    response::{ApiResponse, created, ok},
};

/// Review response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub title_id: String,
    pub author_id: String,
    pub text: String,
    pub score: i16,
    pub pub_date: String,
}

impl From<review::Model> for ReviewResponse {
    fn from(r: review::Model) -> Self {
        Self {
            id: r.id,
            title_id: r.title_id,
            author_id: r.author_id,
            text: r.text,
            score: r.score,
            pub_date: r.created_at.to_rfc3339(),
        }
    }
}

/// Create review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: i16,
}

/// Update review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i16>,
}

/// List a title's reviews (public).
async fn list(
    State(state): State<AppState>,
    Path(title_id): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let reviews = state
        .review_service
        .list(&title_id, pagination.limit, pagination.offset)
        .await?;

    Ok(ApiResponse::ok(
        reviews.into_iter().map(ReviewResponse::from).collect(),
    ))
}

/// Show a review (public).
async fn show(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.get(&title_id, &review_id).await?;
    Ok(ApiResponse::ok(ReviewResponse::from(review)))
}

/// Create a review (authenticated, one per user per title).
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<String>,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::author_or_staff_or_read_only(Access::Write, user.as_ref(), None),
        user.as_ref(),
    )?;
    let Some(user) = user else {
        return Err(critique_common::AppError::Unauthorized);
    };

    let input = critique_core::CreateReviewInput {
        text: req.text,
        score: req.score,
    };
    let review = state
        .review_service
        .create(&title_id, &user.id, input)
        .await?;

    Ok(created(ReviewResponse::from(review)))
}

/// Update a review (author or staff).
async fn update(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(String, String)>,
    Json(req): Json<UpdateReviewRequest>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.get(&title_id, &review_id).await?;

    authorize(
        permissions::author_or_staff_or_read_only(
            Access::Write,
            user.as_ref(),
            Some(&review.author_id),
        ),
        user.as_ref(),
    )?;

    let input = critique_core::UpdateReviewInput {
        text: req.text,
        score: req.score,
    };
    let review = state.review_service.update(review, input).await?;

    Ok(ApiResponse::ok(ReviewResponse::from(review)))
}

/// Delete a review (author or staff).
async fn remove(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let review = state.review_service.get(&title_id, &review_id).await?;

    authorize(
        permissions::author_or_staff_or_read_only(
            Access::Write,
            user.as_ref(),
            Some(&review.author_id),
        ),
        user.as_ref(),
    )?;

    state.review_service.delete(&review.id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{review_id}", get(show).patch(update).delete(remove))
}
