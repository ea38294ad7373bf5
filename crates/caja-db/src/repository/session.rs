//! # Session Repository
//!
//! The register session gate: a single row that is either OPEN or CLOSED.
//!
//! SQLite has no `SELECT ... FOR UPDATE`, so the transition runs as one
//! guarded UPDATE:
//!
//! ```sql
//! UPDATE session_state SET is_open = 1, updated_at = ?
//! WHERE id = 1 AND is_open = 0
//! RETURNING is_open, updated_at
//! ```
//!
//! The statement is atomic under SQLite's write lock. When two callers
//! race on the same transition, exactly one gets the RETURNING row (the
//! state changed, and the row IS the post-transition snapshot) and the
//! other gets none (already there). A writer that cannot get the lock
//! within the busy timeout fails with the transient `DbError::Busy`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use caja_core::SessionState;

/// Repository for the register session singleton.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Ensures the singleton row exists, in the CLOSED state.
    ///
    /// Idempotent: a no-op once the row is there.
    async fn ensure_singleton(&self) -> DbResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO session_state (id, is_open, updated_at) VALUES (1, 0, ?1)",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Opens the register session.
    ///
    /// Returns `(changed, state)`: `changed` is true only for the caller
    /// that actually performed the CLOSED → OPEN transition; an open on an
    /// already-open session leaves `updated_at` untouched.
    pub async fn open(&self) -> DbResult<(bool, SessionState)> {
        self.transition(true).await
    }

    /// Closes the register session.
    ///
    /// Mirror of [`open`](Self::open): `changed` is true only when the
    /// session was open.
    pub async fn close(&self) -> DbResult<(bool, SessionState)> {
        self.transition(false).await
    }

    async fn transition(&self, target_open: bool) -> DbResult<(bool, SessionState)> {
        self.ensure_singleton().await?;

        // RETURNING makes the mutation and the reported snapshot one
        // statement, so a winning transition can never report a state a
        // concurrent toggle wrote afterwards.
        let updated = sqlx::query_as::<_, SessionState>(
            "UPDATE session_state SET is_open = ?1, updated_at = ?2 \
             WHERE id = 1 AND is_open = ?3 \
             RETURNING is_open, updated_at",
        )
        .bind(target_open)
        .bind(Utc::now())
        .bind(!target_open)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(state) => {
                info!(open = state.is_open, "Session state changed");
                Ok((true, state))
            }
            None => {
                let state = self.fetch_state().await?;
                debug!(open = state.is_open, "Session already in requested state");
                Ok((false, state))
            }
        }
    }

    /// Reads the current session state without taking any lock.
    pub async fn current(&self) -> DbResult<SessionState> {
        self.ensure_singleton().await?;
        self.fetch_state().await
    }

    async fn fetch_state(&self) -> DbResult<SessionState> {
        let state = sqlx::query_as::<_, SessionState>(
            "SELECT is_open, updated_at FROM session_state WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(state)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_system_is_closed() {
        let db = db().await;
        let state = db.session().current().await.unwrap();
        assert!(!state.is_open);
    }

    #[tokio::test]
    async fn test_open_then_reopen() {
        let db = db().await;
        let session = db.session();

        let (changed, state) = session.open().await.unwrap();
        assert!(changed);
        assert!(state.is_open);

        // Second open is a no-op and keeps the earlier timestamp.
        let first_opened_at = state.updated_at;
        let (changed, state) = session.open().await.unwrap();
        assert!(!changed);
        assert!(state.is_open);
        assert_eq!(state.updated_at, first_opened_at);
    }

    #[tokio::test]
    async fn test_close_on_fresh_system_is_noop() {
        let db = db().await;

        let (changed, state) = db.session().close().await.unwrap();
        assert!(!changed);
        assert!(!state.is_open);
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let db = db().await;
        let session = db.session();

        assert!(session.open().await.unwrap().0);
        assert!(session.close().await.unwrap().0);
        assert!(session.open().await.unwrap().0);

        let state = session.current().await.unwrap();
        assert!(state.is_open);
    }

    #[tokio::test]
    async fn test_transition_reports_its_own_snapshot() {
        let db = db().await;
        let session = db.session();

        // A winning transition returns the row it wrote, never a
        // re-read: the snapshot must already show the target state and
        // match what the store holds.
        let (changed, state) = session.open().await.unwrap();
        assert!(changed);
        assert!(state.is_open);

        let stored = session.current().await.unwrap();
        assert_eq!(stored.updated_at, state.updated_at);

        let (changed, state) = session.close().await.unwrap();
        assert!(changed);
        assert!(!state.is_open);
        assert_eq!(session.current().await.unwrap().updated_at, state.updated_at);
    }

    #[tokio::test]
    async fn test_concurrent_opens_exactly_one_wins() {
        let db = db().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = db.session();
            handles.push(tokio::spawn(async move { session.open().await }));
        }

        let mut winners = 0;
        for handle in handles {
            let (changed, state) = handle.await.unwrap().unwrap();
            assert!(state.is_open);
            if changed {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
