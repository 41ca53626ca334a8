//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category};
use crate::map_db_err;
use critique_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<category::Model> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("category {id}")))
    }

    /// Find a category by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// List categories, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<category::Model>> {
        let mut query = Category::find();
        if let Some(needle) = search {
            query = query.filter(category::Column::Name.contains(needle));
        }

        query
            .order_by_desc(category::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Delete a category by slug.
    pub async fn delete_by_slug(&self, slug: &str) -> AppResult<()> {
        let result = Category::delete_many()
            .filter(category::Column::Slug.eq(slug))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("category {slug}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_category(slug: &str) -> category::Model {
        category::Model {
            id: format!("cat-{slug}"),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let category = create_test_category("films");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[category.clone()]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.find_by_slug("films").await.unwrap();

        assert_eq!(result.unwrap().slug, "films");
    }

    #[tokio::test]
    async fn test_delete_missing_slug_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.delete_by_slug("ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_category() {
        let category = create_test_category("books");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[category.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let active = category::ActiveModel {
            id: Set("cat-books".to_string()),
            name: Set("BOOKS".to_string()),
            slug: Set("books".to_string()),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.slug, "books");
    }
}
