//! User domain
//!
//! This module provides the user entity, its validation and patch rules,
//! identifier generation, and the repository trait.

mod entity;
mod id;
mod repository;
mod validation;

pub use entity::{NewUser, Role, User, UserChanges, UserParts, UserPatch};
pub use id::{IdGenerator, UlidGenerator, UserId};
pub use repository::{page_offset, UserRepository, USERS_PAGE_SIZE};
pub use validation::{
    is_valid_email, validate_email, validate_first_name, validate_last_name, validate_password,
    UserValidationError, MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
