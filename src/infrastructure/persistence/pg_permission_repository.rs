//! PostgreSQL implementation of permission repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::domain::entities::Permissions;
use crate::domain::repositories::PermissionRepository;
use crate::error::AppError;

/// PostgreSQL repository for the `users_permissions` relation.
pub struct PgPermissionRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgPermissionRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn get_all_for_user(&self, user_id: i64) -> Result<Permissions, AppError> {
        let codes = with_timeout(
            self.timeout,
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT p.code
                FROM permissions p
                INNER JOIN users_permissions up ON up.permission_id = p.id
                WHERE up.user_id = $1
                ORDER BY p.code
                "#,
            )
            .bind(user_id)
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(Permissions::from(codes))
    }

    async fn add_for_user(&self, user_id: i64, codes: &[String]) -> Result<(), AppError> {
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO users_permissions (user_id, permission_id)
                SELECT $1, p.id FROM permissions p WHERE p.code = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(codes)
            .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(())
    }
}
