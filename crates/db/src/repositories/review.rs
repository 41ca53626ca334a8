//! Review repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Review, review};
use crate::map_db_err;
use critique_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Row shape for the derived rating aggregate.
#[derive(Debug, FromQueryResult)]
struct RatingRow {
    title_id: String,
    rating: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct SingleRatingRow {
    rating: Option<f64>,
}

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find a review by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<review::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(id.to_string()))
    }

    /// Find the review a user wrote for a title, if any.
    pub async fn find_by_author_and_title(
        &self,
        author_id: &str,
        title_id: &str,
    ) -> AppResult<Option<review::Model>> {
        Review::find()
            .filter(review::Column::AuthorId.eq(author_id))
            .filter(review::Column::TitleId.eq(title_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// List reviews for a title, newest first.
    pub async fn list_for_title(
        &self,
        title_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::TitleId.eq(title_id))
            .order_by_desc(review::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Update a review.
    pub async fn update(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Delete a review by ID.
    pub async fn delete_by_id(&self, id: &str) -> AppResult<()> {
        let result = Review::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::ReviewNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Mean score of a title's reviews; `None` when the title has none.
    ///
    /// Computed at read time, never stored.
    pub async fn average_score(&self, title_id: &str) -> AppResult<Option<f64>> {
        let row = Review::find()
            .select_only()
            .column_as(Expr::cust("CAST(AVG(score) AS DOUBLE PRECISION)"), "rating")
            .filter(review::Column::TitleId.eq(title_id))
            .into_model::<SingleRatingRow>()
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(row.and_then(|r| r.rating))
    }

    /// Mean scores for a batch of titles; titles without reviews are absent.
    pub async fn average_scores(&self, title_ids: &[String]) -> AppResult<HashMap<String, f64>> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Review::find()
            .select_only()
            .column(review::Column::TitleId)
            .column_as(Expr::cust("CAST(AVG(score) AS DOUBLE PRECISION)"), "rating")
            .filter(review::Column::TitleId.is_in(title_ids.to_vec()))
            .group_by(review::Column::TitleId)
            .into_model::<RatingRow>()
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.rating.map(|rating| (row.title_id, rating)))
            .collect())
    }
}
