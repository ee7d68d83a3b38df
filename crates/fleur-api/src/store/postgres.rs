//! Postgres 기반 자격 증명 저장소.
//!
//! 논리 스키마: `users(id, username, password_hash, is_active, created_at)`,
//! `roles(name)`, `user_roles(user_id, role_name)`.
//! 스키마 생성/마이그레이션은 외부 운영 절차 소관입니다.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError, User};
use crate::auth::roles;

/// Postgres 구현.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_active, created_at \
             FROM users WHERE username = $1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, is_active, created_at) \
             VALUES ($1, $2, $3, TRUE, NOW()) \
             RETURNING id, username, password_hash, is_active, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(username.trim())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateUsername(username.trim().to_string())
            }
            _ => StoreError::from(e),
        })?;

        Ok(user)
    }

    async fn ensure_role(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(roles::normalize(name))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError> {
        let role = roles::normalize(role);

        // 역할 행이 먼저 있어야 멤버십 FK가 성립한다
        self.ensure_role(&role).await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2) \
             ON CONFLICT (user_id, role_name) DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role_name = $2)",
        )
        .bind(user_id)
        .bind(roles::normalize(role))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT role_name FROM user_roles WHERE user_id = $1 ORDER BY role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_active, created_at \
             FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
