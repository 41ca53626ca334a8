//! Authentication endpoints: signup and token exchange.

use axum::{Json, Router, extract::State, routing::post};
use critique_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Signup request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

/// Signup response: echoes the registered identity.
///
/// The confirmation code itself only ever travels by email.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Register a new account and email its confirmation code.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<ApiResponse<SignupResponse>> {
    let input = critique_core::SignupInput {
        username: req.username,
        email: req.email,
    };

    let user = state.account_service.signup(input).await?;

    Ok(ApiResponse::ok(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// Token request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// Token response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
}

/// Exchange a username and confirmation code for a bearer token.
async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let input = critique_core::TokenInput {
        username: req.username,
        confirmation_code: req.confirmation_code,
    };

    let token = state.account_service.obtain_token(input).await?;

    Ok(ApiResponse::ok(TokenResponse { token }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/token", post(token))
}
