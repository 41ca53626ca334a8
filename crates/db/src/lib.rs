//! Database layer for critique-rs.

pub mod entities;
pub mod migrations;
pub mod repositories;

use critique_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Map a database error to an [`AppError`].
///
/// Unique-constraint violations are the authoritative rejection signal for
/// duplicate usernames, emails, slugs and (author, title) review pairs, so
/// they surface as 400-class validation failures rather than server errors.
pub fn map_db_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            AppError::BadRequest(format!("Already exists: {msg}"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            AppError::BadRequest(format!("Invalid reference: {msg}"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
