//! Title repository.

use std::sync::Arc;

use crate::entities::{Title, TitleGenre, category, genre, title, title_genre};
use crate::map_db_err;
use critique_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

/// List filters for titles.
///
/// Category matches on a slug substring, genre on an exact slug,
/// name on a substring, year exactly.
#[derive(Debug, Default, Clone)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i16>,
}

/// Title repository for database operations.
#[derive(Clone)]
pub struct TitleRepository {
    db: Arc<DatabaseConnection>,
}

impl TitleRepository {
    /// Create a new title repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a title by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<title::Model>> {
        Title::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find a title by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<title::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TitleNotFound(id.to_string()))
    }

    /// List titles matching the filter.
    pub async fn list(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<title::Model>> {
        let mut query = Title::find();

        if let Some(needle) = &filter.name {
            query = query.filter(title::Column::Name.contains(needle));
        }
        if let Some(year) = filter.year {
            query = query.filter(title::Column::Year.eq(year));
        }
        if let Some(category_slug) = &filter.category {
            query = query
                .join(JoinType::InnerJoin, title::Relation::Category.def())
                .filter(category::Column::Slug.contains(category_slug));
        }
        if let Some(genre_slug) = &filter.genre {
            query = query
                .join(JoinType::InnerJoin, title::Relation::TitleGenres.def())
                .join(JoinType::InnerJoin, title_genre::Relation::Genre.def())
                .filter(genre::Column::Slug.eq(genre_slug));
        }

        query
            .order_by_desc(title::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a new title.
    pub async fn create(&self, model: title::ActiveModel) -> AppResult<title::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Update a title.
    pub async fn update(&self, model: title::ActiveModel) -> AppResult<title::Model> {
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Delete a title by ID.
    pub async fn delete_by_id(&self, id: &str) -> AppResult<()> {
        let result = Title::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::TitleNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Genres attached to a title.
    pub async fn genres_for(&self, title: &title::Model) -> AppResult<Vec<genre::Model>> {
        title
            .find_related(crate::entities::Genre)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Replace a title's genre associations.
    pub async fn set_genres(&self, title_id: &str, genre_ids: &[String]) -> AppResult<()> {
        TitleGenre::delete_many()
            .filter(title_genre::Column::TitleId.eq(title_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if genre_ids.is_empty() {
            return Ok(());
        }

        let rows = genre_ids.iter().map(|genre_id| title_genre::ActiveModel {
            title_id: Set(title_id.to_string()),
            genre_id: Set(genre_id.clone()),
        });

        TitleGenre::insert_many(rows)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}
