//! API integration tests.
//!
//! These tests drive the router end to end over a mock database, checking
//! the authorization and validation surface of each endpoint family.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use chrono::Utc;
use critique_api::{AppState, auth_middleware, router as api_router};
use critique_core::{
    AccountService, CategoryService, CommentService, EmailService, GenreService, ReviewService,
    TitleService, TokenService, UserService,
};
use critique_db::entities::user::{self, UserRole};
use critique_db::repositories::{
    CategoryRepository, CommentRepository, GenreRepository, ReviewRepository, TitleRepository,
    UserRepository,
};
use sea_orm::{DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret";

/// Build an app over the given mock connection.
fn create_test_app(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let genre_repo = GenreRepository::new(Arc::clone(&db));
    let title_repo = TitleRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));

    let token_service = TokenService::new(TEST_SECRET, 24);
    let email_service = EmailService::new(None).expect("email service");

    let state = AppState {
        account_service: AccountService::new(
            user_repo.clone(),
            email_service,
            token_service.clone(),
        ),
        user_service: UserService::new(user_repo),
        category_service: CategoryService::new(category_repo.clone()),
        genre_service: GenreService::new(genre_repo.clone()),
        title_service: TitleService::new(
            title_repo.clone(),
            category_repo,
            genre_repo,
            review_repo.clone(),
        ),
        review_service: ReviewService::new(review_repo.clone(), title_repo.clone()),
        comment_service: CommentService::new(comment_repo, review_repo, title_repo),
    };

    Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn make_user(id: &str, role: UserRole) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: None,
        last_name: None,
        bio: None,
        role,
        is_superuser: false,
        confirmation_code: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn bearer_token(user_id: &str) -> String {
    let token = TokenService::new(TEST_SECRET, 24)
        .issue(user_id)
        .expect("token");
    format!("Bearer {token}")
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn anonymous_can_list_categories() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<critique_db::entities::category::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_cannot_create_category() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/categories",
            r#"{"name": "Films", "slug": "films"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn plain_user_cannot_create_category() {
    // First query resolves the bearer token to a plain user.
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[make_user("user1", UserRole::User)]])
        .into_connection();
    let app = create_test_app(db);

    let mut request = json_request(
        "POST",
        "/categories",
        r#"{"name": "Films", "slug": "films"}"#,
    );
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer_token("user1").parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn signup_with_reserved_username_is_rejected() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            r#"{"username": "me", "email": "me@example.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_exchange_with_bad_credentials_is_generic_400() {
    // The user exists but has no stored confirmation code.
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[make_user("user1", UserRole::User)]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/token",
            r#"{"username": "user1", "confirmationCode": "wrong"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn anonymous_can_list_titles() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<critique_db::entities::title::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/titles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_cannot_create_review() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/titles/t1/reviews",
            r#"{"text": "fine", "score": 7}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_requires_authentication() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_returns_the_requester() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[make_user("user1", UserRole::User)]])
        .into_connection();
    let app = create_test_app(db);

    let mut request = Request::builder()
        .uri("/users/me")
        .body(Body::empty())
        .unwrap();
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer_token("user1").parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn plain_user_cannot_list_users() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[make_user("user1", UserRole::User)]])
        .into_connection();
    let app = create_test_app(db);

    let mut request = Request::builder().uri("/users").body(Body::empty()).unwrap();
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer_token("user1").parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_list_users() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[make_user("admin1", UserRole::Admin)]])
        .append_query_results([[
            make_user("admin1", UserRole::Admin),
            make_user("user1", UserRole::User),
        ]])
        .into_connection();
    let app = create_test_app(db);

    let mut request = Request::builder().uri("/users").body(Body::empty()).unwrap();
    request.headers_mut().insert(
        header::AUTHORIZATION,
        bearer_token("admin1").parse().unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn moderator_may_delete_someone_elses_review() {
    let title = critique_db::entities::title::Model {
        id: "t1".to_string(),
        name: "Solaris".to_string(),
        year: 1972,
        description: None,
        category_id: "cat-films".to_string(),
        created_at: Utc::now().into(),
    };
    let review = critique_db::entities::review::Model {
        id: "r1".to_string(),
        title_id: "t1".to_string(),
        author_id: "someone-else".to_string(),
        text: "fine".to_string(),
        score: 7,
        created_at: Utc::now().into(),
        updated_at: None,
    };

    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        // auth middleware: resolve token to the moderator
        .append_query_results([[make_user("mod1", UserRole::Moderator)]])
        // review lookup: title, then review
        .append_query_results([[title]])
        .append_query_results([[review]])
        // delete
        .append_exec_results([sea_orm::MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = create_test_app(db);

    let mut request = Request::builder()
        .method("DELETE")
        .uri("/titles/t1/reviews/r1")
        .body(Body::empty())
        .unwrap();
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer_token("mod1").parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
