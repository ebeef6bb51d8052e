//! # User Repository
//!
//! Database operations for login accounts. Password hashes are stored as
//! argon2id PHC strings; hashing and verification happen in the server's
//! auth layer, this repository only moves the opaque string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use almacen_core::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, display_name, password_hash,
                role, is_active, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by username (the login key).
    ///
    /// Returns inactive users too; the login handler decides what a
    /// disabled account may do (nothing).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, display_name, password_hash,
                role, is_active, created_at, updated_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists users sorted by username.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, display_name, password_hash,
                role, is_active, created_at, updated_at
            FROM users
            ORDER BY username
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - username taken
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, display_name, password_hash,
                role, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces a user's password hash.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> DbResult<()> {
        debug!(id = %id, "Updating user password");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }

        Ok(())
    }

    /// Disables a user account. Their past sales stay attributed to them.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Disabling user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }

        Ok(())
    }

    /// Counts active users (used by the bootstrap check).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use almacen_core::UserRole;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_user(username: &str, role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            display_name: format!("Usuario {username}"),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_username() {
        let db = test_db().await;
        let repo = db.users();

        let user = sample_user("pedro", UserRole::Admin);
        repo.insert(&user).await.unwrap();

        let stored = repo.get_by_username("pedro").await.unwrap().unwrap();
        assert_eq!(stored.id, user.id);
        assert_eq!(stored.role, UserRole::Admin);
        assert!(stored.password_hash.starts_with("$argon2id$"));

        assert!(repo.get_by_username("nadie").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;
        let repo = db.users();

        repo.insert(&sample_user("marta", UserRole::Vendor))
            .await
            .unwrap();

        let err = repo
            .insert(&sample_user("marta", UserRole::Vendor))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { field, .. } => assert_eq!(field, "username"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = test_db().await;
        let repo = db.users();

        let user = sample_user("pedro", UserRole::Admin);
        repo.insert(&user).await.unwrap();

        repo.update_password(&user.id, "$argon2id$new-hash")
            .await
            .unwrap();

        let stored = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "$argon2id$new-hash");
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let db = test_db().await;
        let repo = db.users();

        let user = sample_user("temporal", UserRole::Vendor);
        repo.insert(&user).await.unwrap();
        assert_eq!(repo.count_active().await.unwrap(), 1);

        repo.soft_delete(&user.id).await.unwrap();

        let stored = repo.get_by_username("temporal").await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(repo.count_active().await.unwrap(), 0);
    }
}
