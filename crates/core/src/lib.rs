//! Business logic for critique-rs.
//!
//! This crate holds everything between the HTTP layer and the database:
//!
//! - **Services**: per-resource business rules over the repositories
//! - **Permissions**: pure authorization predicates evaluated per request
//! - **Collaborators**: bearer-token issuance and outbound email

pub mod permissions;
pub mod services;

pub use permissions::Access;
pub use services::account::{AccountService, SignupInput, TokenInput, UpdateProfileInput};
pub use services::catalog::{CategoryService, CreateCategoryInput, CreateGenreInput, GenreService};
pub use services::comment::{CommentService, CreateCommentInput, UpdateCommentInput};
pub use services::email::EmailService;
pub use services::review::{CreateReviewInput, ReviewService, UpdateReviewInput};
pub use services::title::{CreateTitleInput, TitleRead, TitleService, UpdateTitleInput};
pub use services::token::{Claims, TokenService};
pub use services::user::{CreateUserInput, UpdateUserInput, UserService};
