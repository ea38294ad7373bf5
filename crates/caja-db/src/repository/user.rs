//! # User Repository
//!
//! Database operations for user accounts. Password hashing happens at the
//! API layer; this repository only ever sees the finished hash.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, is_active, created_at";

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

    /// Creates a user and returns it.
    pub async fn create(
        &self,
        username: String,
        password_hash: String,
        role: Role,
    ) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            role,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %user.id, username = %user.username, role = %user.role.as_str(), "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", &user.username),
            other => other,
        })?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Looks a user up by username (login path).
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists all users.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    /// Updates a user's role and active flag; optionally replaces the
    /// password hash.
    pub async fn update(
        &self,
        id: &str,
        role: Role,
        is_active: bool,
        password_hash: Option<String>,
    ) -> DbResult<User> {
        let result = match &password_hash {
            Some(hash) => {
                sqlx::query(
                    "UPDATE users SET role = ?2, is_active = ?3, password_hash = ?4 WHERE id = ?1",
                )
                .bind(id)
                .bind(role)
                .bind(is_active)
                .bind(hash)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query("UPDATE users SET role = ?2, is_active = ?3 WHERE id = ?1")
                    .bind(id)
                    .bind(role)
                    .bind(is_active)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes a user.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        debug!(id = %id, "User deleted");
        Ok(())
    }

    /// Counts all users. Used at startup to decide whether to seed an
    /// initial admin account.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
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
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use caja_core::Role;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_username() {
        let db = db().await;
        let repo = db.users();

        let created = repo
            .create("maria".to_string(), "hash".to_string(), Role::Seller)
            .await
            .unwrap();

        let found = repo.find_by_username("maria").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, Role::Seller);
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = db().await;
        let repo = db.users();

        repo.create("maria".to_string(), "hash".to_string(), Role::Seller)
            .await
            .unwrap();

        let err = repo
            .create("maria".to_string(), "hash2".to_string(), Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_role_and_deactivate() {
        let db = db().await;
        let repo = db.users();

        let u = repo
            .create("pedro".to_string(), "hash".to_string(), Role::Seller)
            .await
            .unwrap();

        let updated = repo.update(&u.id, Role::Admin, false, None).await.unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert!(!updated.is_active);
        // Hash untouched when not provided
        assert_eq!(updated.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_count_tracks_inserts() {
        let db = db().await;
        let repo = db.users();

        assert_eq!(repo.count().await.unwrap(), 0);
        repo.create("a".to_string(), "h".to_string(), Role::Admin)
            .await
            .unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
