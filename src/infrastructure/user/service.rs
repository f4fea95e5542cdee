//! User service - create, look up, list, patch and soft-delete users

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::user::{
    IdGenerator, NewUser, UlidGenerator, User, UserId, UserPatch, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_user_operation;

/// Request for creating a new user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request for partially updating a user. Absent and empty fields are left as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
            role: user.role().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// User use cases over a [`UserRepository`]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<R: UserRepository> std::fmt::Debug for UserService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service using the wall clock and ULID identifiers
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Create a new user
    ///
    /// The email is checked against live users before validation runs, so a
    /// taken email reports a conflict even when other fields are invalid.
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        let result = self.create_user(request).await;
        observe("create", result)
    }

    /// Get a live user by ID
    pub async fn get_by_id(&self, id: &str) -> Result<UserResponse, DomainError> {
        let result = self.find_live(&UserId::from(id)).await;
        observe("get", result.map(|user| UserResponse::from(&user)))
    }

    /// List one page of live users
    pub async fn list(&self, page: i64) -> Result<Vec<UserResponse>, DomainError> {
        let result = self.list_users(page).await;
        observe("list", result)
    }

    /// Apply a partial update to a live user
    pub async fn patch(
        &self,
        id: &str,
        request: PatchUserRequest,
    ) -> Result<UserResponse, DomainError> {
        let result = self.patch_user(&UserId::from(id), request).await;
        observe("patch", result)
    }

    /// Soft-delete a live user, returning its state from before the delete
    pub async fn delete(&self, id: &str) -> Result<UserResponse, DomainError> {
        let result = self.delete_user(&UserId::from(id)).await;
        observe("delete", result)
    }

    /// Check that the backing store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        if self
            .repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            warn!(email = %request.email, "Email already in use");
            return Err(DomainError::email_already_exists(request.email));
        }

        let user = User::new(
            NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                password: request.password,
                role: None,
            },
            self.clock.as_ref(),
            self.ids.as_ref(),
        )?;

        self.repository
            .create(&user)
            .await
            .map_err(|e| conflict_on_constraint(e, user.email()))?;

        info!(user_id = %user.id(), "User created");
        Ok(UserResponse::from(&user))
    }

    async fn find_live(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id.as_str()))
    }

    async fn list_users(&self, page: i64) -> Result<Vec<UserResponse>, DomainError> {
        if page < 1 {
            return Err(DomainError::InvalidPageNumber { page });
        }

        let page = u32::try_from(page).unwrap_or(u32::MAX);
        let users = self.repository.list(page).await?;

        if users.is_empty() {
            return Err(DomainError::UsersNotFound);
        }

        Ok(users.iter().map(UserResponse::from).collect())
    }

    async fn patch_user(
        &self,
        id: &UserId,
        request: PatchUserRequest,
    ) -> Result<UserResponse, DomainError> {
        let existing = self.find_live(id).await?;

        if let Some(email) = request
            .email
            .as_deref()
            .filter(|email| !email.is_empty() && *email != existing.email())
        {
            if let Some(owner) = self.repository.find_by_email(email).await? {
                if owner.id() != existing.id() {
                    warn!(user_id = %id, email = %email, "Email already in use");
                    return Err(DomainError::email_already_exists(email));
                }
            }
        }

        let merged = existing.merge_patch(
            UserPatch {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
            },
            self.clock.as_ref(),
        )?;

        let changes = merged.changes_from(&existing);

        let updated = self
            .repository
            .patch(id, &changes, merged.updated_at())
            .await
            .map_err(|e| conflict_on_constraint(e, merged.email()))?;

        // deleted between the lookup and the update
        if !updated {
            return Err(DomainError::user_not_found(id.as_str()));
        }

        info!(user_id = %id, "User patched");
        Ok(UserResponse::from(&merged))
    }

    async fn delete_user(&self, id: &UserId) -> Result<UserResponse, DomainError> {
        let existing = self.find_live(id).await?;

        self.repository.delete(id, self.clock.now()).await?;

        info!(user_id = %id, "User deleted");
        Ok(UserResponse::from(&existing))
    }
}

/// A write rejected by the unique email index lost a race with another writer
fn conflict_on_constraint(error: DomainError, email: &str) -> DomainError {
    match error {
        DomainError::ConstraintViolation { .. } => DomainError::email_already_exists(email),
        other => other,
    }
}

fn observe<T>(operation: &'static str, result: Result<T, DomainError>) -> Result<T, DomainError> {
    match &result {
        Ok(_) => record_user_operation(operation, "success"),
        Err(e) => {
            debug!(operation, error = %e, "User operation failed");
            record_user_operation(operation, e.code());
        }
    }

    result
}
