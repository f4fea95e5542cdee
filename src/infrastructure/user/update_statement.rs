//! Structured builder for partial UPDATE statements
//!
//! Assignments and conditions are kept as ordered `(column, value)` pairs and
//! only turned into `$n` placeholders when the statement is rendered, so the
//! SQL text and the bind list are produced by the same walk and cannot drift.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use crate::domain::user::{UserChanges, UserId};
use crate::domain::DomainError;

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(&'static str, SqlValue),
    IsNull(&'static str),
}

/// Rendered statement: SQL text plus arguments in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl BuiltStatement {
    /// Bind the arguments, in order, onto a query over this statement's SQL
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        self.values
            .iter()
            .fold(sqlx::query(&self.sql), |query, value| match value {
                SqlValue::Text(text) => query.bind(text.clone()),
                SqlValue::Timestamp(at) => query.bind(*at),
            })
    }
}

/// `UPDATE <table> SET ... WHERE ...` builder
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
    conditions: Vec<Condition>,
}

impl UpdateStatement {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Assign a column
    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Assign a column only when a non-empty value is given
    pub fn set_if_present(self, column: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.set(column, value),
            _ => self,
        }
    }

    /// Add a `column = value` condition
    pub fn where_eq(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition::Eq(column, value.into()));
        self
    }

    /// Add a `column IS NULL` condition
    pub fn where_null(mut self, column: &'static str) -> Self {
        self.conditions.push(Condition::IsNull(column));
        self
    }

    /// Render SQL text and arguments
    pub fn build(&self) -> Result<BuiltStatement, DomainError> {
        if self.assignments.is_empty() {
            return Err(DomainError::storage(format!(
                "UPDATE on '{}' has no assignments",
                self.table
            )));
        }

        let mut values = Vec::with_capacity(self.assignments.len() + self.conditions.len());

        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| {
                values.push(value.clone());
                format!("{} = ${}", column, values.len())
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));

        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self
                .conditions
                .iter()
                .map(|condition| match condition {
                    Condition::Eq(column, value) => {
                        values.push(value.clone());
                        format!("{} = ${}", column, values.len())
                    }
                    Condition::IsNull(column) => format!("{} IS NULL", column),
                })
                .collect();

            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        Ok(BuiltStatement { sql, values })
    }
}

/// Patch statement for a live user: changed scalar fields, then `updated_at`
pub fn user_patch_statement(
    id: &UserId,
    changes: &UserChanges,
    updated_at: DateTime<Utc>,
) -> UpdateStatement {
    UpdateStatement::new("users")
        .set_if_present("first_name", changes.first_name.as_deref())
        .set_if_present("last_name", changes.last_name.as_deref())
        .set_if_present("email", changes.email.as_deref())
        .set("updated_at", updated_at)
        .where_eq("id", id.as_str())
        .where_null("deleted_at")
}
