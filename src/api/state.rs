//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::user::{
    CreateUserRequest, PatchUserRequest, UserResponse, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError>;
    async fn get_by_id(&self, id: &str) -> Result<UserResponse, DomainError>;
    async fn list(&self, page: i64) -> Result<Vec<UserResponse>, DomainError>;
    async fn patch(&self, id: &str, request: PatchUserRequest)
        -> Result<UserResponse, DomainError>;
    async fn delete(&self, id: &str) -> Result<UserResponse, DomainError>;
    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        UserService::create(self, request).await
    }

    async fn get_by_id(&self, id: &str) -> Result<UserResponse, DomainError> {
        UserService::get_by_id(self, id).await
    }

    async fn list(&self, page: i64) -> Result<Vec<UserResponse>, DomainError> {
        UserService::list(self, page).await
    }

    async fn patch(
        &self,
        id: &str,
        request: PatchUserRequest,
    ) -> Result<UserResponse, DomainError> {
        UserService::patch(self, id, request).await
    }

    async fn delete(&self, id: &str) -> Result<UserResponse, DomainError> {
        UserService::delete(self, id).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        UserService::ping(self).await
    }
}
