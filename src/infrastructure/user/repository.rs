//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{
    page_offset, User, UserChanges, UserId, UserRepository, USERS_PAGE_SIZE,
};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Users are kept in insertion order, which is also creation order. Soft
/// deleted users stay in the store and are filtered out of every read.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user by ID, including soft-deleted ones
    pub async fn find_any_by_id(&self, id: &UserId) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.id() == id).cloned()
    }

    /// Number of stored users, including soft-deleted ones
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &[User], email: &str, except: &UserId) -> bool {
    users
        .iter()
        .any(|u| !u.is_deleted() && u.email() == email && u.id() != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.id() == user.id()) {
            return Err(DomainError::constraint_violation(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if !user.is_deleted() && email_taken(&users, user.email(), user.id()) {
            return Err(DomainError::constraint_violation(format!(
                "Email '{}' is already used by a live user",
                user.email()
            )));
        }

        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;

        Ok(users
            .iter()
            .find(|u| !u.is_deleted() && u.id() == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;

        Ok(users
            .iter()
            .find(|u| !u.is_deleted() && u.email() == email)
            .cloned())
    }

    async fn list(&self, page: u32) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        let offset = usize::try_from(page_offset(page)).unwrap_or(usize::MAX);

        Ok(users
            .iter()
            .filter(|u| !u.is_deleted())
            .skip(offset)
            .take(USERS_PAGE_SIZE as usize)
            .cloned()
            .collect())
    }

    async fn patch(
        &self,
        id: &UserId,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;

        if let Some(email) = changes.email.as_deref() {
            if email_taken(&users, email, id) {
                return Err(DomainError::constraint_violation(format!(
                    "Email '{}' is already used by a live user",
                    email
                )));
            }
        }

        match users.iter_mut().find(|u| !u.is_deleted() && u.id() == id) {
            Some(user) => {
                user.apply_changes(changes, updated_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId, deleted_at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        if let Some(user) = users.iter_mut().find(|u| u.id() == id) {
            user.mark_deleted(deleted_at);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::{Clock, FixedClock};
    use crate::domain::user::{NewUser, UlidGenerator};
    use chrono::{Duration, TimeZone};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
    }

    fn create_test_user(clock: &FixedClock, ids: &UlidGenerator, email: &str) -> User {
        User::new(
            NewUser {
                first_name: "George".to_string(),
                last_name: "Harrison".to_string(),
                email: email.to_string(),
                password: "something1969".to_string(),
                role: None,
            },
            clock,
            ids,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        let user = create_test_user(&clock, &ids, "george@example.com");

        repo.create(&user).await.unwrap();

        let by_id = repo.find_by_id(user.id()).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&user));

        let by_email = repo.find_by_email("george@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id().clone()), Some(user.id().clone()));

        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        let user = create_test_user(&clock, &ids, "george@example.com");

        repo.create(&user).await.unwrap();

        let result = repo.create(&user).await;
        assert!(matches!(result, Err(DomainError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_live_email_is_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());

        repo.create(&create_test_user(&clock, &ids, "george@example.com"))
            .await
            .unwrap();

        let result = repo
            .create(&create_test_user(&clock, &ids, "george@example.com"))
            .await;
        assert!(matches!(result, Err(DomainError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_email_of_deleted_user_can_be_reused() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        let first = create_test_user(&clock, &ids, "george@example.com");

        repo.create(&first).await.unwrap();
        repo.delete(first.id(), clock.now()).await.unwrap();

        let second = create_test_user(&clock, &ids, "george@example.com");
        repo.create(&second).await.unwrap();

        let found = repo.find_by_email("george@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id().clone()), Some(second.id().clone()));
    }

    #[tokio::test]
    async fn test_delete_hides_user_but_keeps_record() {
        let repo = InMemoryUserRepository::new();
        let clock = clock();
        let ids = UlidGenerator::new();
        let user = create_test_user(&clock, &ids, "george@example.com");

        repo.create(&user).await.unwrap();
        clock.advance(Duration::minutes(5));
        repo.delete(user.id(), clock.now()).await.unwrap();

        assert!(repo.find_by_id(user.id()).await.unwrap().is_none());
        assert!(repo.find_by_email(user.email()).await.unwrap().is_none());
        assert!(repo.list(1).await.unwrap().is_empty());

        let stored = repo.find_any_by_id(user.id()).await.unwrap();
        assert_eq!(stored.deleted_at(), Some(clock.now()));
        assert_eq!(stored.updated_at(), clock.now());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_ok() {
        let repo = InMemoryUserRepository::new();
        let result = repo.delete(&UserId::from("missing"), Utc::now()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_list_pages_in_insertion_order() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        let mut created = Vec::new();

        for i in 0..12 {
            let user = create_test_user(&clock, &ids, &format!("user{i}@example.com"));
            repo.create(&user).await.unwrap();
            created.push(user.id().clone());
        }

        let first: Vec<UserId> = repo
            .list(1)
            .await
            .unwrap()
            .iter()
            .map(|u| u.id().clone())
            .collect();
        let second: Vec<UserId> = repo
            .list(2)
            .await
            .unwrap()
            .iter()
            .map(|u| u.id().clone())
            .collect();

        assert_eq!(first, created[..10]);
        assert_eq!(second, created[10..]);
        assert!(repo.list(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patch_updates_only_given_fields() {
        let repo = InMemoryUserRepository::new();
        let clock = clock();
        let ids = UlidGenerator::new();
        let user = create_test_user(&clock, &ids, "george@example.com");

        repo.create(&user).await.unwrap();
        clock.advance(Duration::seconds(30));

        let changes = UserChanges {
            last_name: Some("Martin".to_string()),
            ..Default::default()
        };
        assert!(repo.patch(user.id(), &changes, clock.now()).await.unwrap());

        let stored = repo.find_by_id(user.id()).await.unwrap().unwrap();
        assert_eq!(stored.first_name(), "George");
        assert_eq!(stored.last_name(), "Martin");
        assert_eq!(stored.email(), "george@example.com");
        assert_eq!(stored.updated_at(), clock.now());
        assert_eq!(stored.created_at(), user.created_at());
    }

    #[tokio::test]
    async fn test_patch_of_deleted_user_matches_nothing() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        let user = create_test_user(&clock, &ids, "george@example.com");

        repo.create(&user).await.unwrap();
        repo.delete(user.id(), clock.now()).await.unwrap();

        let changes = UserChanges {
            first_name: Some("Georgie".to_string()),
            ..Default::default()
        };
        assert!(!repo.patch(user.id(), &changes, clock.now()).await.unwrap());
        assert!(!repo
            .patch(&UserId::from("missing"), &changes, clock.now())
            .await
            .unwrap());

        let stored = repo.find_any_by_id(user.id()).await.unwrap();
        assert_eq!(stored.first_name(), "George");
    }

    #[tokio::test]
    async fn test_patch_to_taken_email_is_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        let george = create_test_user(&clock, &ids, "george@example.com");
        let ringo = create_test_user(&clock, &ids, "ringo@example.com");

        repo.create(&george).await.unwrap();
        repo.create(&ringo).await.unwrap();

        let changes = UserChanges {
            email: Some("george@example.com".to_string()),
            ..Default::default()
        };
        let result = repo.patch(ringo.id(), &changes, clock.now()).await;

        assert!(matches!(result, Err(DomainError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_len_counts_deleted_users() {
        let repo = InMemoryUserRepository::new();
        let (clock, ids) = (clock(), UlidGenerator::new());
        assert!(repo.is_empty().await);

        let user = create_test_user(&clock, &ids, "a@example.com");
        repo.create(&user).await.unwrap();
        repo.create(&create_test_user(&clock, &ids, "b@example.com"))
            .await
            .unwrap();
        repo.delete(user.id(), clock.now()).await.unwrap();

        assert_eq!(repo.len().await, 2);
        assert!(repo.ping().await.is_ok());
    }
}
