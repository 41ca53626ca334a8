//! Critique-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use critique_api::{AppState, auth_middleware, router as api_router};
use critique_common::Config;
use critique_core::{
    AccountService, CategoryService, CommentService, EmailService, GenreService, ReviewService,
    TitleService, TokenService, UserService,
};
use critique_db::repositories::{
    CategoryRepository, CommentRepository, GenreRepository, ReviewRepository, TitleRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "critique=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting critique server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = critique_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    critique_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let genre_repo = GenreRepository::new(Arc::clone(&db));
    let title_repo = TitleRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));

    // Initialize collaborators
    let token_service = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);
    let email_service = EmailService::new(config.email.clone())?;
    if !email_service.is_enabled() {
        info!("Email delivery not configured; confirmation codes will not be sent");
    }

    // Initialize services
    let account_service =
        AccountService::new(user_repo.clone(), email_service, token_service.clone());
    let user_service = UserService::new(user_repo.clone());
    let category_service = CategoryService::new(category_repo.clone());
    let genre_service = GenreService::new(genre_repo.clone());
    let title_service = TitleService::new(
        title_repo.clone(),
        category_repo,
        genre_repo,
        review_repo.clone(),
    );
    let review_service = ReviewService::new(review_repo.clone(), title_repo.clone());
    let comment_service = CommentService::new(comment_repo, review_repo, title_repo);

    let state = AppState {
        account_service,
        user_service,
        category_service,
        genre_service,
        title_service,
        review_service,
        comment_service,
    };

    // Build the router
    let app = Router::new()
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Serve
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
