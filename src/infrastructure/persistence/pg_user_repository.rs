//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::domain::entities::{NewUser, TokenScope, User, UserCredentials};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// PostgreSQL repository for user accounts.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    email: String,
    activated: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            name: row.name,
            email: row.email,
            activated: row.activated,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    password_hash: String,
    #[sqlx(flatten)]
    user: UserRow,
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let result = with_timeout(
            self.timeout,
            sqlx::query_as::<_, UserRow>(
                r#"
                INSERT INTO users (name, email, password_hash, activated)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, name, email, activated
                "#,
            )
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.activated)
            .fetch_one(self.pool.as_ref()),
        )
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(AppError::Conflict { .. }) => Err(AppError::conflict(
                "a user with this email address already exists",
                serde_json::json!({ "email": new_user.email }),
            )),
            Err(e) => Err(e),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, CredentialsRow>(
                r#"
                SELECT id, created_at, name, email, activated, password_hash
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.map(|r| UserCredentials {
            user: r.user.into(),
            password_hash: r.password_hash,
        }))
    }

    async fn find_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT u.id, u.created_at, u.name, u.email, u.activated
                FROM users u
                INNER JOIN tokens t ON t.user_id = u.id
                WHERE t.hash = $1
                  AND t.scope = $2
                  AND t.expiry > $3
                "#,
            )
            .bind(token_hash)
            .bind(scope.as_str())
            .bind(now)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.map(User::from))
    }

    async fn activate(&self, user_id: i64) -> Result<bool, AppError> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                UPDATE users
                SET activated = TRUE, version = version + 1
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = with_timeout(
            self.timeout,
            sqlx::query_as::<_, UserRow>(
                "SELECT id, created_at, name, email, activated FROM users ORDER BY id",
            )
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
