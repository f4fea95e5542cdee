//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{IdGenerator, UserId};
use super::validation::{
    is_valid_email, validate_email, validate_first_name, validate_last_name, validate_password,
    UserValidationError, MIN_NAME_LENGTH,
};
use crate::domain::clock::Clock;

/// Role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Super,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Super => "super",
            Self::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "super" => Ok(Self::Super),
            "user" => Ok(Self::User),
            other => Err(UserValidationError::InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Defaults to [`Role::User`] when absent or empty
    pub role: Option<String>,
}

/// Partial update of a user. `None` and empty strings both mean "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Scalar fields that differ between two versions of a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

/// Persisted state of a user, used to rebuild the entity from storage
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    first_name: String,
    last_name: String,
    email: String,
    /// Opaque credential - never exposed in serialization
    #[serde(skip_serializing, default)]
    password: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new, validated user
    ///
    /// The first failing rule wins, in this order: all fields empty, first
    /// name, last name, password, email, role.
    pub fn new(
        input: NewUser,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) -> Result<Self, UserValidationError> {
        if input.first_name.is_empty()
            && input.last_name.is_empty()
            && input.email.is_empty()
            && input.password.is_empty()
        {
            return Err(UserValidationError::AllParamsRequired);
        }

        validate_first_name(&input.first_name)?;
        validate_last_name(&input.last_name)?;
        validate_password(&input.password)?;
        validate_email(&input.email)?;

        let role = match input.role.as_deref() {
            None | Some("") => Role::default(),
            Some(role) => role.parse()?,
        };

        let now = clock.now();

        Ok(Self {
            id: ids.generate(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password: input.password,
            role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Rebuild a user from stored state without re-validating it
    pub fn from_parts(parts: UserParts) -> Self {
        Self {
            id: parts.id,
            first_name: parts.first_name,
            last_name: parts.last_name,
            email: parts.email,
            password: parts.password,
            role: parts.role,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            deleted_at: parts.deleted_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    // Mutations

    /// Merge a partial update onto a copy of this user.
    ///
    /// Only first name, last name and email can change here. Absent or empty
    /// patch fields keep their current value.
    pub fn merge_patch(
        &self,
        patch: UserPatch,
        clock: &dyn Clock,
    ) -> Result<Self, UserValidationError> {
        let first_name = non_empty(patch.first_name);
        let last_name = non_empty(patch.last_name);
        let email = non_empty(patch.email);

        if first_name.is_none() && last_name.is_none() && email.is_none() {
            return Err(UserValidationError::AtLeastOneParamRequired);
        }

        if let Some(name) = &first_name {
            if name.len() < MIN_NAME_LENGTH {
                return Err(UserValidationError::FirstNameTooShort(MIN_NAME_LENGTH));
            }
        }

        if let Some(name) = &last_name {
            if name.len() < MIN_NAME_LENGTH {
                return Err(UserValidationError::LastNameTooShort(MIN_NAME_LENGTH));
            }
        }

        if let Some(address) = &email {
            if !is_valid_email(address) {
                return Err(UserValidationError::InvalidEmail(address.clone()));
            }
        }

        let mut merged = self.clone();

        if let Some(name) = first_name {
            merged.first_name = name;
        }

        if let Some(name) = last_name {
            merged.last_name = name;
        }

        if let Some(address) = email {
            merged.email = address;
        }

        merged.touch(clock);
        Ok(merged)
    }

    /// Scalar fields of `self` that differ from `previous`
    pub fn changes_from(&self, previous: &User) -> UserChanges {
        UserChanges {
            first_name: (self.first_name != previous.first_name).then(|| self.first_name.clone()),
            last_name: (self.last_name != previous.last_name).then(|| self.last_name.clone()),
            email: (self.email != previous.email).then(|| self.email.clone()),
        }
    }

    /// Apply already-validated changes, as storage does for a patch
    pub fn apply_changes(&mut self, changes: &UserChanges, updated_at: DateTime<Utc>) {
        if let Some(name) = &changes.first_name {
            self.first_name = name.clone();
        }

        if let Some(name) = &changes.last_name {
            self.last_name = name.clone();
        }

        if let Some(address) = &changes.email {
            self.email = address.clone();
        }

        self.updated_at = updated_at.max(self.created_at);
    }

    /// Mark the user as soft-deleted
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = at.max(self.created_at);
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now().max(self.created_at);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
