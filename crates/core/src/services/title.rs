//! Title service.
//!
//! Titles are written with slug references to their category and genres and
//! read back with the nested objects plus the derived rating.

use std::collections::HashMap;

use chrono::Datelike;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use critique_common::{AppError, AppResult, IdGenerator};
use critique_db::entities::{category, genre, title};
use critique_db::repositories::{
    CategoryRepository, GenreRepository, ReviewRepository, TitleFilter, TitleRepository,
};

/// Read representation of a title: the row plus its nested category, genres
/// and derived rating.
#[derive(Debug, Clone)]
pub struct TitleRead {
    pub title: title::Model,
    pub category: category::Model,
    pub genres: Vec<genre::Model>,
    /// Mean review score, `None` when the title has no reviews.
    pub rating: Option<f64>,
}

/// Input for creating a title.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTitleInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(custom(function = validate_year))]
    pub year: i16,

    pub description: Option<String>,

    /// Category slug.
    #[validate(length(min = 1, max = 50))]
    pub category: String,

    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Input for updating a title.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTitleInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(custom(function = validate_year))]
    pub year: Option<i16>,

    pub description: Option<String>,

    /// Category slug.
    pub category: Option<String>,

    /// Genre slugs; replaces the whole set when present.
    pub genre: Option<Vec<String>>,
}

/// Title service.
#[derive(Clone)]
pub struct TitleService {
    title_repo: TitleRepository,
    category_repo: CategoryRepository,
    genre_repo: GenreRepository,
    review_repo: ReviewRepository,
    id_gen: IdGenerator,
}

impl TitleService {
    /// Create a new title service.
    #[must_use]
    pub fn new(
        title_repo: TitleRepository,
        category_repo: CategoryRepository,
        genre_repo: GenreRepository,
        review_repo: ReviewRepository,
    ) -> Self {
        Self {
            title_repo,
            category_repo,
            genre_repo,
            review_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List titles matching the filter, with nested objects and ratings.
    pub async fn list(
        &self,
        filter: &TitleFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<TitleRead>> {
        let titles = self.title_repo.list(filter, limit, offset).await?;

        let title_ids: Vec<String> = titles.iter().map(|t| t.id.clone()).collect();
        let ratings = self.review_repo.average_scores(&title_ids).await?;

        let mut categories: HashMap<String, category::Model> = HashMap::new();
        let mut reads = Vec::with_capacity(titles.len());
        for title in titles {
            let category = match categories.get(&title.category_id).cloned() {
                Some(cached) => cached,
                None => {
                    let fetched = self.category_repo.get_by_id(&title.category_id).await?;
                    categories.insert(title.category_id.clone(), fetched.clone());
                    fetched
                }
            };
            let genres = self.title_repo.genres_for(&title).await?;
            let rating = ratings.get(&title.id).copied();
            reads.push(TitleRead {
                title,
                category,
                genres,
                rating,
            });
        }

        Ok(reads)
    }

    /// Get a title with nested objects and rating.
    pub async fn get(&self, id: &str) -> AppResult<TitleRead> {
        let title = self.title_repo.get_by_id(id).await?;
        self.read(title).await
    }

    /// Create a title from slug references.
    pub async fn create(&self, input: CreateTitleInput) -> AppResult<TitleRead> {
        input.validate()?;

        let category = self.resolve_category(&input.category).await?;
        let genres = self.resolve_genres(&input.genre).await?;

        let model = title::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            year: Set(input.year),
            description: Set(input.description),
            category_id: Set(category.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.title_repo.create(model).await?;
        let genre_ids: Vec<String> = genres.iter().map(|g| g.id.clone()).collect();
        self.title_repo.set_genres(&created.id, &genre_ids).await?;

        Ok(TitleRead {
            title: created,
            category,
            genres,
            rating: None,
        })
    }

    /// Update a title from slug references.
    pub async fn update(&self, id: &str, input: UpdateTitleInput) -> AppResult<TitleRead> {
        input.validate()?;

        let title = self.title_repo.get_by_id(id).await?;

        let category = match &input.category {
            Some(slug) => Some(self.resolve_category(slug).await?),
            None => None,
        };

        let mut active: title::ActiveModel = title.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(year) = input.year {
            active.year = Set(year);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = &category {
            active.category_id = Set(category.id.clone());
        }

        let updated = self.title_repo.update(active).await?;

        if let Some(slugs) = &input.genre {
            let genres = self.resolve_genres(slugs).await?;
            let genre_ids: Vec<String> = genres.iter().map(|g| g.id.clone()).collect();
            self.title_repo.set_genres(&updated.id, &genre_ids).await?;
        }

        self.read(updated).await
    }

    /// Delete a title.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.title_repo.delete_by_id(id).await
    }

    async fn read(&self, title: title::Model) -> AppResult<TitleRead> {
        let category = self.category_repo.get_by_id(&title.category_id).await?;
        let genres = self.title_repo.genres_for(&title).await?;
        let rating = self.review_repo.average_score(&title.id).await?;
        Ok(TitleRead {
            title,
            category,
            genres,
            rating,
        })
    }

    async fn resolve_category(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown category slug: {slug}")))
    }

    async fn resolve_genres(&self, slugs: &[String]) -> AppResult<Vec<genre::Model>> {
        let genres = self.genre_repo.find_by_slugs(slugs).await?;
        if genres.len() != slugs.len() {
            let found: Vec<&str> = genres.iter().map(|g| g.slug.as_str()).collect();
            let missing: Vec<&str> = slugs
                .iter()
                .map(String::as_str)
                .filter(|slug| !found.contains(slug))
                .collect();
            return Err(AppError::BadRequest(format!(
                "Unknown genre slugs: {}",
                missing.join(", ")
            )));
        }
        Ok(genres)
    }
}

/// Titles cannot be released in the future.
fn validate_year(value: i16) -> Result<(), ValidationError> {
    let current_year = chrono::Utc::now().year();
    if i32::from(value) > current_year {
        let mut error = ValidationError::new("future_year");
        error.message = Some(std::borrow::Cow::from(
            "Year must not be later than the current year",
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
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn make_service(db: sea_orm::DatabaseConnection) -> TitleService {
        let db = Arc::new(db);
        TitleService::new(
            TitleRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            GenreRepository::new(Arc::clone(&db)),
            ReviewRepository::new(db),
        )
    }

    #[test]
    fn current_year_is_accepted() {
        let year = i16::try_from(Utc::now().year()).unwrap();
        assert!(validate_year(year).is_ok());
    }

    #[test]
    fn future_year_is_rejected() {
        let year = i16::try_from(Utc::now().year() + 1).unwrap();
        assert!(validate_year(year).is_err());
    }

    #[tokio::test]
    async fn create_rejects_future_year() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = make_service(db);

        let result = service
            .create(CreateTitleInput {
                name: "From The Future".to_string(),
                year: i16::try_from(Utc::now().year() + 1).unwrap(),
                description: None,
                category: "films".to_string(),
                genre: vec![],
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();
        let service = make_service(db);

        let result = service
            .create(CreateTitleInput {
                name: "Solaris".to_string(),
                year: 1972,
                description: None,
                category: "nope".to_string(),
                genre: vec![],
            })
            .await;

        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "Unknown category slug: nope");
            }
            _ => panic!("Expected BadRequest"),
        }
    }

    #[tokio::test]
    async fn create_rejects_unknown_genre_slug() {
        let category = category::Model {
            id: "cat-films".to_string(),
            name: "Films".to_string(),
            slug: "films".to_string(),
            created_at: Utc::now().into(),
        };
        let drama = genre::Model {
            id: "genre-drama".to_string(),
            name: "Drama".to_string(),
            slug: "drama".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[category]])
            .append_query_results([[drama]])
            .into_connection();
        let service = make_service(db);

        let result = service
            .create(CreateTitleInput {
                name: "Solaris".to_string(),
                year: 1972,
                description: None,
                category: "films".to_string(),
                genre: vec!["drama".to_string(), "nope".to_string()],
            })
            .await;

        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "Unknown genre slugs: nope");
            }
            _ => panic!("Expected BadRequest"),
        }
    }
}
