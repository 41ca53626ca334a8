//! Authorization predicates.
//!
//! Pure functions of (access kind, authenticated user, optional target),
//! evaluated per request. No state; deny is strictly binary. The HTTP layer
//! turns a deny into 401 for anonymous requesters and 403 otherwise.

use critique_db::entities::user;

/// What a request is trying to do, from the verb's point of view.
///
/// Safe verbs (GET, HEAD) read; everything else writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Self-profile access: the requester must be authenticated and, when a
/// target user is in play, must *be* that target.
#[must_use]
pub fn owner_only(user: Option<&user::Model>, target: Option<&user::Model>) -> bool {
    let Some(user) = user else {
        return false;
    };
    target.is_none_or(|t| t.id == user.id)
}

/// Catalog access: reads are public, writes require admin.
#[must_use]
pub fn admin_or_read_only(access: Access, user: Option<&user::Model>) -> bool {
    access == Access::Read || user.is_some_and(user::Model::is_admin)
}

/// Administration access: every verb requires admin, collection and object
/// level alike.
#[must_use]
pub fn admin_only(user: Option<&user::Model>) -> bool {
    user.is_some_and(user::Model::is_admin)
}

/// Review/comment access: reads are public; writes require the requester to
/// be the object's author or hold the moderator or admin role.
///
/// `author_id` is `None` for collection-level checks (creation), where
/// authentication alone suffices.
#[must_use]
pub fn author_or_staff_or_read_only(
    access: Access,
    user: Option<&user::Model>,
    author_id: Option<&str>,
) -> bool {
    if access == Access::Read {
        return true;
    }
    let Some(user) = user else {
        return false;
    };
    author_id.is_none_or(|author_id| {
        user.id == author_id || user.is_moderator() || user.is_admin()
    })
}
