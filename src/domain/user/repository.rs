//! User repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{User, UserChanges};
use super::id::UserId;
use crate::domain::DomainError;

/// Number of users returned per page by [`UserRepository::list`]
pub const USERS_PAGE_SIZE: u32 = 10;

/// Row offset of a 1-based page
pub fn page_offset(page: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(USERS_PAGE_SIZE)
}

/// Repository trait for user storage
///
/// Soft-deleted users are invisible to every read. `Ok(None)` means the user
/// does not exist (or was deleted); `Err` always means the store failed.
/// Implementations never interpret business rules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    async fn create(&self, user: &User) -> Result<(), DomainError>;

    /// Get a live user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a live user by email (uniqueness checks only)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// List live users, [`USERS_PAGE_SIZE`] per 1-based page, in insertion order
    async fn list(&self, page: u32) -> Result<Vec<User>, DomainError>;

    /// Update only the given fields of a live user, always refreshing `updated_at`.
    /// Returns `false` when no live user has this ID.
    async fn patch(
        &self,
        id: &UserId,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Soft-delete a user. Unknown or already deleted IDs are not an error.
    async fn delete(&self, id: &UserId, deleted_at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 10);
        assert_eq!(page_offset(7), 60);
        assert_eq!(page_offset(0), 0);
    }
}
