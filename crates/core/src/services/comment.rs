//! Comment service.
//!
//! Comments hang off a review, which in turn must belong to the title named
//! in the URL path. A mismatched (title, review) pair is a 404, never a
//! silent listing of unrelated comments.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use critique_common::{AppError, AppResult, IdGenerator};
use critique_db::entities::{comment, review};
use critique_db::repositories::{CommentRepository, ReviewRepository, TitleRepository};

/// Input for creating a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1))]
    pub text: String,
}

/// Input for updating a comment.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCommentInput {
    #[validate(length(min = 1))]
    pub text: Option<String>,
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    review_repo: ReviewRepository,
    title_repo: TitleRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        review_repo: ReviewRepository,
        title_repo: TitleRepository,
    ) -> Self {
        Self {
            comment_repo,
            review_repo,
            title_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve the review named in the path, checking it belongs to the title.
    async fn resolve_review(&self, title_id: &str, review_id: &str) -> AppResult<review::Model> {
        self.title_repo.get_by_id(title_id).await?;
        let review = self.review_repo.get_by_id(review_id).await?;
        if review.title_id != title_id {
            return Err(AppError::ReviewNotFound(review_id.to_string()));
        }
        Ok(review)
    }

    /// List comments under a review, newest first.
    pub async fn list(
        &self,
        title_id: &str,
        review_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        let review = self.resolve_review(title_id, review_id).await?;
        self.comment_repo.list_for_review(&review.id, limit, offset).await
    }

    /// Get a comment scoped to its review and title.
    pub async fn get(
        &self,
        title_id: &str,
        review_id: &str,
        comment_id: &str,
    ) -> AppResult<comment::Model> {
        let review = self.resolve_review(title_id, review_id).await?;
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.review_id != review.id {
            return Err(AppError::NotFound(format!("comment {comment_id}")));
        }
        Ok(comment)
    }

    /// Create a comment; author and review come from the request context,
    /// never from the payload.
    pub async fn create(
        &self,
        title_id: &str,
        review_id: &str,
        author_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let review = self.resolve_review(title_id, review_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            review_id: Set(review.id),
            author_id: Set(author_id.to_string()),
            text: Set(input.text),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        self.comment_repo.create(model).await
    }

    /// Update a comment fetched through [`Self::get`].
    pub async fn update(
        &self,
        comment: comment::Model,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let mut active: comment::ActiveModel = comment.into();
        if let Some(text) = input.text {
            active.text = Set(text);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete a comment.
    pub async fn delete(&self, comment_id: &str) -> AppResult<()> {
        self.comment_repo.delete_by_id(comment_id).await
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

    fn make_service(db: sea_orm::DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(
            CommentRepository::new(Arc::clone(&db)),
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

    fn make_review(id: &str, title_id: &str) -> review::Model {
        review::Model {
            id: id.to_string(),
            title_id: title_id.to_string(),
            author_id: "author1".to_string(),
            text: "worth a look".to_string(),
            score: 8,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_under_mismatched_review_is_not_found() {
        // Review r7 belongs to title t9; the path claims t5.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[make_title("t5")]])
            .append_query_results([[make_review("r7", "t9")]])
            .into_connection();
        let service = make_service(db);

        let result = service
            .create(
                "t5",
                "r7",
                "user1",
                CreateCommentInput {
                    text: "hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ReviewNotFound(_))));
    }

    #[tokio::test]
    async fn create_sets_author_and_review_from_context() {
        let created = comment::Model {
            id: "c1".to_string(),
            review_id: "r1".to_string(),
            author_id: "user1".to_string(),
            text: "agreed".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[make_title("t1")]])
            .append_query_results([[make_review("r1", "t1")]])
            .append_query_results([[created]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = make_service(db);

        let comment = service
            .create(
                "t1",
                "r1",
                "user1",
                CreateCommentInput {
                    text: "agreed".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(comment.author_id, "user1");
        assert_eq!(comment.review_id, "r1");
    }

    #[tokio::test]
    async fn list_checks_the_review_belongs_to_the_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[make_title("t5")]])
            .append_query_results([[make_review("r7", "t9")]])
            .into_connection();
        let service = make_service(db);

        let result = service.list("t5", "r7", 10, 0).await;

        assert!(matches!(result, Err(AppError::ReviewNotFound(_))));
    }
}
