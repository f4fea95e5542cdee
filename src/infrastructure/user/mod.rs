//! User infrastructure module
//!
//! Storage backends for users (PostgreSQL and in-memory), the partial update
//! statement builder, and the user service that runs the use cases.

mod postgres_repository;
mod repository;
mod service;
mod update_statement;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, PatchUserRequest, UserResponse, UserService};
pub use update_statement::{user_patch_statement, BuiltStatement, SqlValue, UpdateStatement};
