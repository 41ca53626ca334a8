//! User endpoints: the self profile and admin administration.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use critique_common::AppResult;
use critique_core::permissions;
use critique_db::entities::user::{self, UserRole};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{authorize, default_limit},
    middleware::{AppState, MaybeAuthUser},
    response::{ApiResponse, created, ok},
};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: UserRole,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            bio: u.bio,
            role: u.role,
        }
    }
}

/// List users request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// Username substring filter.
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Create user request (admin).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// Update user request (admin).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// Self-profile update request.
///
/// Role is writable here, but a plain user asking for moderator or admin is
/// silently kept at their current role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

/// Read the requester's own profile.
async fn me(MaybeAuthUser(user): MaybeAuthUser) -> AppResult<ApiResponse<UserResponse>> {
    authorize(
        permissions::owner_only(user.as_ref(), user.as_ref()),
        user.as_ref(),
    )?;
    let Some(user) = user else {
        return Err(critique_common::AppError::Unauthorized);
    };

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

/// Update the requester's own profile.
async fn update_me(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    authorize(
        permissions::owner_only(user.as_ref(), user.as_ref()),
        user.as_ref(),
    )?;
    let Some(user) = user else {
        return Err(critique_common::AppError::Unauthorized);
    };

    let input = critique_core::UpdateProfileInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        role: req.role,
    };
    let updated = state.account_service.update_profile(user, input).await?;

    Ok(ApiResponse::ok(UserResponse::from(updated)))
}

/// List users (admin).
async fn list(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    authorize(permissions::admin_only(user.as_ref()), user.as_ref())?;

    let users = state
        .user_service
        .list(query.search.as_deref(), query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// Create a user (admin).
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(permissions::admin_only(user.as_ref()), user.as_ref())?;

    let input = critique_core::CreateUserInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        role: req.role,
    };
    let created_user = state.user_service.create(input).await?;

    Ok(created(UserResponse::from(created_user)))
}

/// Show a user by username (admin).
async fn show(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    authorize(permissions::admin_only(user.as_ref()), user.as_ref())?;

    let found = state.user_service.get(&username).await?;
    Ok(ApiResponse::ok(UserResponse::from(found)))
}

/// Update a user by username (admin).
async fn update(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    authorize(permissions::admin_only(user.as_ref()), user.as_ref())?;

    let input = critique_core::UpdateUserInput {
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        role: req.role,
    };
    let updated = state.user_service.update(&username, input).await?;

    Ok(ApiResponse::ok(UserResponse::from(updated)))
}

/// Delete a user by username (admin).
async fn remove(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(permissions::admin_only(user.as_ref()), user.as_ref())?;

    state.user_service.delete(&username).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/me", get(me).patch(update_me))
        .route("/{username}", get(show).patch(update).delete(remove))
}
