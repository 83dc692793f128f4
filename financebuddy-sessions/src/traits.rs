//! The session store capability contract (spec §4.10 / C10).

use async_trait::async_trait;
use financebuddy_core::{Session, SessionId};

use crate::error::{Result, SessionError};

/// A caller-supplied mutation applied atomically inside `update`.
///
/// Boxed (rather than generic) so [`SessionStore`] stays object-safe —
/// callers inject either an in-memory or a persistent implementation
/// behind `Arc<dyn SessionStore>`.
pub type Mutator = Box<dyn FnOnce(&mut Session) -> std::result::Result<(), SessionError> + Send>;

/// CRUD, TTL, and cleanup operations over tutoring sessions (spec §4.10).
///
/// `update` is a compare-and-swap: a concurrent conflicting update fails
/// with [`SessionError::Conflict`] rather than blocking or silently
/// clobbering the other writer's change, so the caller can retry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a new session at the `input` step.
    async fn create(&self, topic: &str, question_count: usize, user_id: Option<String>) -> Result<Session>;

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if no session exists for `id`,
    /// or if it exists but has expired (spec §3 invariant: `now <=
    /// expires_at` for any operation to succeed).
    async fn get(&self, id: &SessionId) -> Result<Session>;

    /// Atomically apply `mutator` to the session, returning the mutated
    /// session on success.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session does not exist
    /// or has expired; [`SessionError::Conflict`] if another `update` on
    /// the same id is in flight; or whatever error `mutator` itself
    /// returns (wrapped as [`SessionError::Rejected`] if it wasn't
    /// already a `SessionError`).
    async fn update(&self, id: &SessionId, mutator: Mutator) -> Result<Session>;

    /// Delete a session. Not an error if it does not exist.
    async fn delete(&self, id: &SessionId) -> Result<()>;

    /// Push back a session's expiry by `minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] under the same conditions as
    /// [`Self::get`].
    async fn extend(&self, id: &SessionId, minutes: i64) -> Result<Session>;

    /// Remove every expired session. Idempotent: calling it again with no
    /// newly expired sessions removes nothing and returns `0`.
    async fn cleanup_expired(&self) -> Result<usize>;
}
