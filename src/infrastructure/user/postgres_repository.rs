//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::update_statement::user_patch_statement;
use crate::domain::user::{
    page_offset, User, UserChanges, UserId, UserParts, UserRepository, USERS_PAGE_SIZE,
};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, role, \
                            created_at, updated_at, deleted_at";

/// PostgreSQL implementation of UserRepository
///
/// Writes go to the writer pool, reads to the reader pool. Both may be the
/// same pool.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    writer: PgPool,
    reader: PgPool,
}

impl PostgresUserRepository {
    /// Create a repository with separate writer and reader pools
    pub fn new(writer: PgPool, reader: PgPool) -> Self {
        Self { writer, reader }
    }

    /// Create a repository that reads and writes through one pool
    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            reader: pool.clone(),
            writer: pool,
        }
    }

    async fn fetch_one_live(
        &self,
        column: &str,
        value: &str,
        context: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} = $1 AND deleted_at IS NULL",
            USER_COLUMNS, column
        );

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.reader)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to {}: {}", context, e)))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password, role,
                               created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.email())
        .bind(user.password())
        .bind(user.role().as_str())
        .bind(user.created_at())
        .bind(user.updated_at())
        .bind(user.deleted_at())
        .execute(&self.writer)
        .await
        .map_err(|e| map_write_error("create user", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.fetch_one_live("id", id.as_str(), "get user").await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_live("email", email, "get user by email")
            .await
    }

    async fn list(&self, page: u32) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE deleted_at IS NULL \
             ORDER BY created_at, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(USERS_PAGE_SIZE))
            .bind(page_offset(page))
            .fetch_all(&self.reader)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn patch(
        &self,
        id: &UserId,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let statement = user_patch_statement(id, changes, updated_at).build()?;

        let result = statement
            .query()
            .execute(&self.writer)
            .await
            .map_err(|e| map_write_error("patch user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &UserId, deleted_at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = $2, updated_at = GREATEST(created_at, $2)
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(deleted_at)
        .execute(&self.writer)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        for (name, pool) in [("writer", &self.writer), ("reader", &self.reader)] {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map_err(|e| DomainError::storage(format!("{} pool unreachable: {}", name, e)))?;
        }

        Ok(())
    }
}

/// Integrity violations become `ConstraintViolation`, everything else `Storage`
fn map_write_error(context: &str, error: sqlx::Error) -> DomainError {
    if let Some(db_error) = error.as_database_error() {
        if !matches!(db_error.kind(), ErrorKind::Other) {
            return DomainError::constraint_violation(format!(
                "Failed to {}: {}",
                context, db_error
            ));
        }
    }

    DomainError::storage(format!("Failed to {}: {}", context, error))
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let column = |e: sqlx::Error| DomainError::storage(format!("Failed to read user row: {}", e));

    let id: String = row.try_get("id").map_err(column)?;
    let role: String = row.try_get("role").map_err(column)?;

    let role = role
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;

    Ok(User::from_parts(UserParts {
        id: UserId::from(id),
        first_name: row.try_get("first_name").map_err(column)?,
        last_name: row.try_get("last_name").map_err(column)?,
        email: row.try_get("email").map_err(column)?,
        password: row.try_get("password").map_err(column)?,
        role,
        created_at: row.try_get("created_at").map_err(column)?,
        updated_at: row.try_get("updated_at").map_err(column)?,
        deleted_at: row.try_get("deleted_at").map_err(column)?,
    }))
}
