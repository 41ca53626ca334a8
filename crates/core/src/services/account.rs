//! Account service: signup, token exchange and the self profile.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use critique_common::{AppError, AppResult, IdGenerator};
use critique_db::entities::user::{self, UserRole};
use critique_db::repositories::UserRepository;

use super::email::EmailService;
use super::token::TokenService;

/// Input for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 150), custom(function = validate_username))]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,
}

/// Input for exchanging a confirmation code for a bearer token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenInput {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub confirmation_code: String,
}

/// Input for updating the requester's own profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 150), custom(function = validate_username))]
    pub username: Option<String>,

    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    pub bio: Option<String>,

    /// Writable, but self-promotion by plain users is coerced back.
    pub role: Option<UserRole>,
}

/// Account service for signup, token exchange and self-profile access.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    email_service: EmailService,
    token_service: TokenService,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        email_service: EmailService,
        token_service: TokenService,
    ) -> Self {
        Self {
            user_repo,
            email_service,
            token_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and email its one-time confirmation code.
    ///
    /// The unique indexes on username and email are the authoritative
    /// duplicate rejection; the lookups here only buy a clearer message.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        input.validate()?;

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

        let code = self.id_gen.generate_confirmation_code();
        let code_hash = hash_code(&code)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            email: Set(input.email.clone()),
            role: Set(UserRole::User),
            is_superuser: Set(false),
            confirmation_code: Set(Some(code_hash)),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let created = self.user_repo.create(model).await?;

        // Fire-and-forget: delivery failures are logged, never surfaced.
        let email_service = self.email_service.clone();
        let to = created.email.clone();
        let username = created.username.clone();
        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_confirmation_code(&to, &username, &code)
                .await
            {
                tracing::warn!(error = %e, to = %to, "Failed to deliver confirmation code");
            }
        });

        Ok(created)
    }

    /// Exchange a username and confirmation code for a bearer token.
    ///
    /// Every failure is the same generic 400 so the response does not reveal
    /// whether the username or the code was wrong.
    pub async fn obtain_token(&self, input: TokenInput) -> AppResult<String> {
        input.validate()?;

        let invalid =
            || AppError::BadRequest("Invalid username or confirmation code".to_string());

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or_else(invalid)?;

        let stored_hash = user.confirmation_code.as_deref().ok_or_else(invalid)?;
        if !verify_code(&input.confirmation_code, stored_hash)? {
            return Err(invalid());
        }

        self.token_service.issue(&user.id)
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.token_service.verify(token)?;
        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Update the requester's own profile.
    ///
    /// A plain user asking for a moderator or admin role keeps the role they
    /// already have; the rest of the patch still applies.
    pub async fn update_profile(
        &self,
        user: user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let mut role = input.role;
        if user.role == UserRole::User
            && matches!(role, Some(UserRole::Moderator | UserRole::Admin))
        {
            role = Some(UserRole::User);
        }

        if let Some(username) = &input.username
            && *username != user.username
        {
            if self.user_repo.find_by_username(username).await?.is_some() {
                return Err(AppError::BadRequest("Username already in use".to_string()));
            }
        }
        if let Some(email) = &input.email
            && *email != user.email
        {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(AppError::BadRequest("Email already in use".to_string()));
            }
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(username) = input.username {
            active.username = Set(username);
        }
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
        if let Some(role) = role {
            active.role = Set(role);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }
}

/// Reject the reserved username and anything outside the allowed alphabet.
fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value == "me" {
        let mut error = ValidationError::new("reserved");
        error.message = Some(std::borrow::Cow::from("Username \"me\" is reserved"));
        return Err(error);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '_' | '-'))
    {
        let mut error = ValidationError::new("invalid_characters");
        error.message = Some(std::borrow::Cow::from(
            "Username may only contain letters, digits and @.+-_",
        ));
        return Err(error);
    }
    Ok(())
}

/// Hash a confirmation code for storage.
fn hash_code(code: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash confirmation code: {e}")))
}

/// Verify a confirmation code against its stored hash.
fn verify_code(code: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Corrupt confirmation code hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(code.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn make_service(db: sea_orm::DatabaseConnection) -> AccountService {
        AccountService::new(
            UserRepository::new(Arc::new(db)),
            EmailService::new(None).unwrap(),
            TokenService::new("test-secret", 24),
        )
    }

    fn make_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role,
            is_superuser: false,
            confirmation_code: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn signup_rejects_reserved_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = make_service(db);

        let result = service
            .signup(SignupInput {
                username: "me".to_string(),
                email: "me@example.com".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn signup_rejects_taken_username() {
        let existing = make_user("user1", UserRole::User);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();
        let service = make_service(db);

        let result = service
            .signup(SignupInput {
                username: "user1".to_string(),
                email: "fresh@example.com".to_string(),
            })
            .await;

        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "Username already in use");
            }
            _ => panic!("Expected BadRequest"),
        }
    }

    #[tokio::test]
    async fn obtain_token_hides_which_credential_failed() {
        // Unknown user and bad code must be indistinguishable.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = make_service(db);

        let result = service
            .obtain_token(TokenInput {
                username: "ghost".to_string(),
                confirmation_code: "whatever".to_string(),
            })
            .await;

        match result {
            Err(AppError::BadRequest(message)) => {
                assert_eq!(message, "Invalid username or confirmation code");
            }
            _ => panic!("Expected BadRequest"),
        }
    }

    #[tokio::test]
    async fn obtain_token_accepts_the_right_code() {
        let mut user = make_user("user1", UserRole::User);
        user.confirmation_code = Some(hash_code("secret1234").unwrap());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();
        let service = make_service(db);

        let token = service
            .obtain_token(TokenInput {
                username: "user1".to_string(),
                confirmation_code: "secret1234".to_string(),
            })
            .await
            .unwrap();

        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn self_promotion_is_coerced_back_to_user() {
        let updated = make_user("user1", UserRole::User);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[updated]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = make_service(db);

        let result = service
            .update_profile(
                make_user("user1", UserRole::User),
                UpdateProfileInput {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.role, UserRole::User);
    }

    #[tokio::test]
    async fn moderators_may_change_their_own_role() {
        let updated = make_user("mod1", UserRole::Admin);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[updated]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = make_service(db);

        let result = service
            .update_profile(
                make_user("mod1", UserRole::Moderator),
                UpdateProfileInput {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.role, UserRole::Admin);
    }
}
