//! Genre repository.

use std::sync::Arc;

use crate::entities::{Genre, genre};
use crate::map_db_err;
use critique_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Genre repository for database operations.
#[derive(Clone)]
pub struct GenreRepository {
    db: Arc<DatabaseConnection>,
}

impl GenreRepository {
    /// Create a new genre repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a genre by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<genre::Model>> {
        Genre::find()
            .filter(genre::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find genres by slugs.
    pub async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<genre::Model>> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }

        Genre::find()
            .filter(genre::Column::Slug.is_in(slugs.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// List genres, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<genre::Model>> {
        let mut query = Genre::find();
        if let Some(needle) = search {
            query = query.filter(genre::Column::Name.contains(needle));
        }

        query
            .order_by_desc(genre::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a new genre.
    pub async fn create(&self, model: genre::ActiveModel) -> AppResult<genre::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Delete a genre by slug.
    pub async fn delete_by_slug(&self, slug: &str) -> AppResult<()> {
        let result = Genre::delete_many()
            .filter(genre::Column::Slug.eq(slug))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("genre {slug}")));
        }
        Ok(())
    }
}
