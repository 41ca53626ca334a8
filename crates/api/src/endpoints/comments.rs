//! Comment endpoints, scoped to a review under a title.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use critique_common::AppResult;
use critique_core::{Access, permissions};
use critique_db::entities::comment;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{Pagination, authorize},
    middleware::{AppState, MaybeAuthUser},
    response::{ApiResponse, created, ok},
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub pub_date: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            text: c.text,
            pub_date: c.created_at.to_rfc3339(),
        }
    }
}

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub text: String,
}

/// Update comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

/// List a review's comments (public).
async fn list(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(String, String)>,
    Query(pagination): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .comment_service
        .list(&title_id, &review_id, pagination.limit, pagination.offset)
        .await?;

    Ok(ApiResponse::ok(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// Show a comment (public).
async fn show(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(String, String, String)>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .get(&title_id, &review_id, &comment_id)
        .await?;
    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

/// Create a comment (authenticated).
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(String, String)>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(
        permissions::author_or_staff_or_read_only(Access::Write, user.as_ref(), None),
        user.as_ref(),
    )?;
    let Some(user) = user else {
        return Err(critique_common::AppError::Unauthorized);
    };

    let input = critique_core::CreateCommentInput { text: req.text };
    let comment = state
        .comment_service
        .create(&title_id, &review_id, &user.id, input)
        .await?;

    Ok(created(CommentResponse::from(comment)))
}

/// Update a comment (author or staff).
async fn update(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(String, String, String)>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .get(&title_id, &review_id, &comment_id)
        .await?;

    authorize(
        permissions::author_or_staff_or_read_only(
            Access::Write,
            user.as_ref(),
            Some(&comment.author_id),
        ),
        user.as_ref(),
    )?;

    let input = critique_core::UpdateCommentInput { text: req.text };
    let comment = state.comment_service.update(comment, input).await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

/// Delete a comment (author or staff).
async fn remove(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(String, String, String)>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .comment_service
        .get(&title_id, &review_id, &comment_id)
        .await?;

    authorize(
        permissions::author_or_staff_or_read_only(
            Access::Write,
            user.as_ref(),
            Some(&comment.author_id),
        ),
        user.as_ref(),
    )?;

    state.comment_service.delete(&comment.id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{comment_id}", get(show).patch(update).delete(remove))
}
