//! Review service.
//!
//! Reviews are scoped to the title named in the URL path. A user writes at
//! most one review per title; the unique (author, title) index is the
//! authoritative duplicate rejection.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use critique_common::{AppError, AppResult, IdGenerator};
use critique_db::entities::review;
use critique_db::repositories::{ReviewRepository, TitleRepository};

/// Input for creating a review.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewInput {
    #[validate(length(min = 1))]
    pub text: String,

    /// Integer score, inclusive bounds.
    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: i16,
}

/// Input for updating a review.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReviewInput {
    #[validate(length(min = 1))]
    pub text: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: Option<i16>,
}

/// Review service.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    title_repo: TitleRepository,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub fn new(review_repo: ReviewRepository, title_repo: TitleRepository) -> Self {
        Self {
            review_repo,
            title_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List reviews for a title, newest first.
    pub async fn list(
        &self,
        title_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        self.title_repo.get_by_id(title_id).await?;
        self.review_repo.list_for_title(title_id, limit, offset).await
    }

    /// Get a review scoped to a title.
    ///
    /// A review that exists under some other title is a 404 here, never a
    /// leak across the path scope.
    pub async fn get(&self, title_id: &str, review_id: &str) -> AppResult<review::Model> {
        self.title_repo.get_by_id(title_id).await?;
        let review = self.review_repo.get_by_id(review_id).await?;
        if review.title_id != title_id {
            return Err(AppError::ReviewNotFound(review_id.to_string()));
        }
        Ok(review)
    }

    /// Create a review; the author is always the requester.
    pub async fn create(
        &self,
        title_id: &str,
        author_id: &str,
        input: CreateReviewInput,
    ) -> AppResult<review::Model> {
        input.validate()?;

        self.title_repo.get_by_id(title_id).await?;

        if self
            .review_repo
            .find_by_author_and_title(author_id, title_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You have already reviewed this title".to_string(),
            ));
        }

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            title_id: Set(title_id.to_string()),
            author_id: Set(author_id.to_string()),
            text: Set(input.text),
            score: Set(input.score),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        self.review_repo.create(model).await
    }

    /// Update a review fetched through [`Self::get`].
    pub async fn update(
        &self,
        review: review::Model,
        input: UpdateReviewInput,
    ) -> AppResult<review::Model> {
        input.validate()?;

        let mut active: review::ActiveModel = review.into();
        if let Some(text) = input.text {
            active.text = Set(text);
        }
        if let Some(score) = input.score {
            active.score = Set(score);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.review_repo.update(active).await
    }

    /// Delete a review.
    pub async fn delete(&self, review_id: &str) -> AppResult<()> {
        self.review_repo.delete_by_id(review_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use critique_db::entities::title;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn make_service(db: sea_orm::DatabaseConnection) -> ReviewService {
        let db = Arc::new(db);
        ReviewService::new(
            ReviewRepository::new(Arc::clone(&db)),
            TitleRepository::new(db),
        )
    }

    fn make_title(id: &str) -> title::Model {
        title::Model {
            id: id.to_string(),
            name: "Solaris".to_string(),
            year: 1972,
            description: None,
            category_id: "cat-films".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn make_review(id: &str, author_id: &str, title_id: &str, score: i16) -> review::Model {
        review::Model {
            id: id.to_string(),
            title_id: title_id.to_string(),
            author_id: author_id.to_string(),
            text: "worth a look".to_string(),
            score,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_score_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = make_service(db);

        let result = service
            .create(
                "t1",
                "user1",
                CreateReviewInput {
                    text: "bad".to_string(),
                    score: 0,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_score_eleven() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = make_service(db);

        let result = service
            .create(
                "t1",
                "user1",
                CreateReviewInput {
                    text: "too good".to_string(),
                    score: 11,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_accepts_boundary_scores() {
        for score in [1_i16, 10] {
            let created = make_review("r1", "user1", "t1", score);
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[make_title("t1")]])
                .append_query_results([Vec::<review::Model>::new()])
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection();
            let service = make_service(db);

            let result = service
                .create(
                    "t1",
                    "user1",
                    CreateReviewInput {
                        text: "fine".to_string(),
                        score,
                    },
                )
                .await
                .unwrap();

            assert_eq!(result.score, score);
        }
    }

    #[tokio::test]
    async fn second_review_for_same_title_is_rejected() {
        let existing = make_review("r1", "user1", "t1", 7);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[make_title("t1")]])
            .append_query_results([[existing]])
            .into_connection();
        let service = make_service(db);

        let result = service
            .create(
                "t1",
                "user1",
                CreateReviewInput {
                    text: "again".to_string(),
                    score: 9,
                },
            )
            .await;

        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "You have already reviewed this title");
            }
            _ => panic!("Expected BadRequest"),
        }
    }

    #[tokio::test]
    async fn get_scopes_reviews_to_the_path_title() {
        // Review r7 exists but belongs to title t9, not t5.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[make_title("t5")]])
            .append_query_results([[make_review("r7", "user1", "t9", 6)]])
            .into_connection();
        let service = make_service(db);

        let result = service.get("t5", "r7").await;

        assert!(matches!(result, Err(AppError::ReviewNotFound(_))));
    }
}
