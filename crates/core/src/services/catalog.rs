//! Catalog services: categories and genres.
//!
//! Both are classification tags identified externally by slug. Reads are
//! public; creation and deletion are admin operations gated at the HTTP layer.

use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use critique_common::{AppError, AppResult, IdGenerator};
use critique_db::entities::{category, genre};
use critique_db::repositories::{CategoryRepository, GenreRepository};

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1, max = 50), custom(function = validate_slug))]
    pub slug: String,
}

/// Input for creating a genre.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGenreInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1, max = 50), custom(function = validate_slug))]
    pub slug: String,
}

/// Category service.
#[derive(Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub fn new(repo: CategoryRepository) -> Self {
        Self {
            repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List categories, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<category::Model>> {
        self.repo.list(search, limit, offset).await
    }

    /// Create a category.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        if self.repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::BadRequest("Slug already in use".to_string()));
        }

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(input.slug),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.repo.create(model).await
    }

    /// Delete a category by slug.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        self.repo.delete_by_slug(slug).await
    }
}

/// Genre service.
#[derive(Clone)]
pub struct GenreService {
    repo: GenreRepository,
    id_gen: IdGenerator,
}

impl GenreService {
    /// Create a new genre service.
    #[must_use]
    pub fn new(repo: GenreRepository) -> Self {
        Self {
            repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List genres, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<genre::Model>> {
        self.repo.list(search, limit, offset).await
    }

    /// Create a genre.
    pub async fn create(&self, input: CreateGenreInput) -> AppResult<genre::Model> {
        input.validate()?;

        if self.repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::BadRequest("Slug already in use".to_string()));
        }

        let model = genre::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(input.slug),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.repo.create(model).await
    }

    /// Delete a genre by slug.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        self.repo.delete_by_slug(slug).await
    }
}

/// Slugs are lowercase letters, digits, hyphens and underscores.
fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'))
    {
        let mut error = ValidationError::new("invalid_slug");
        error.message = Some(std::borrow::Cow::from(
            "Slug may only contain lowercase letters, digits, hyphens and underscores",
        ));
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn make_category(slug: &str) -> category::Model {
        category::Model {
            id: format!("cat-{slug}"),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn create_rejects_bad_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = CategoryService::new(CategoryRepository::new(Arc::new(db)));

        let result = service
            .create(CreateCategoryInput {
                name: "Films".to_string(),
                slug: "Films!".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_taken_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[make_category("films")]])
            .into_connection();
        let service = CategoryService::new(CategoryRepository::new(Arc::new(db)));

        let result = service
            .create(CreateCategoryInput {
                name: "Films".to_string(),
                slug: "films".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn create_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()])
            .append_query_results([[make_category("books")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = CategoryService::new(CategoryRepository::new(Arc::new(db)));

        let created = service
            .create(CreateCategoryInput {
                name: "BOOKS".to_string(),
                slug: "books".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.slug, "books");
    }
}
