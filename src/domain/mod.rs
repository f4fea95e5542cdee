//! Domain layer - Core business logic and entities

pub mod clock;
pub mod error;
pub mod user;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DomainError;
pub use user::{
    IdGenerator, NewUser, Role, UlidGenerator, User, UserChanges, UserId, UserParts, UserPatch,
    UserRepository, UserValidationError,
};
