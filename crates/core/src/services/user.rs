//! User administration service.
//!
//! Admin-facing user management, keyed by username. Self-service profile
//! access lives in the account service.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use critique_common::{AppError, AppResult, IdGenerator};
use critique_db::entities::user::{self, UserRole};
use critique_db::repositories::UserRepository;

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    pub bio: Option<String>,

    pub role: Option<UserRole>,
}

/// Input for updating a user.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    pub bio: Option<String>,

    pub role: Option<UserRole>,
}

/// User administration service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List users, optionally filtered by a username substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(search, limit, offset).await
    }

    /// Get a user by username.
    pub async fn get(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }

    /// Create a user.
    ///
    /// The created account has no confirmation code; the owner obtains one
    /// through signup.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if input.username == "me" {
            return Err(AppError::BadRequest(
                "Username \"me\" is reserved".to_string(),
            ));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already in use".to_string()));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already in use".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            bio: Set(input.bio),
            role: Set(input.role.unwrap_or_default()),
            is_superuser: Set(false),
            confirmation_code: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        self.user_repo.create(model).await
    }

    /// Update a user by username. Role changes land here and nowhere else.
    pub async fn update(&self, username: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_username(username).await?;

        if let Some(email) = &input.email
            && *email != user.email
        {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(AppError::BadRequest("Email already in use".to_string()));
            }
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Delete a user by username.
    pub async fn delete(&self, username: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_username(username).await?;
        self.user_repo.delete_by_id(&user.id).await
    }
}
