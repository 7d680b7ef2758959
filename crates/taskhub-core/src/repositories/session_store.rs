//! Session store trait (port)
//!
//! A keyed store with per-key atomic operations and store-enforced expiry.
//! TTL is refreshed only by an explicit `put`; reads never extend it.
//! Store unavailability is a fail-closed condition for callers.

use async_trait::async_trait;

use crate::domain::SessionRecord;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(
        &self,
        session_id: &str,
        record: &SessionRecord,
        ttl_seconds: i64,
    ) -> Result<(), DomainError>;

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, DomainError>;

    /// Idempotent; deleting an absent key is not an error.
    async fn delete(&self, session_id: &str) -> Result<(), DomainError>;

    /// Conditional write for refresh rotation: persists `record` only if
    /// the currently stored record's `refresh_token` still equals
    /// `expected_refresh_token`, in one atomic per-key operation. Returns
    /// whether the write happened.
    async fn put_if_refresh_matches(
        &self,
        session_id: &str,
        expected_refresh_token: &str,
        record: &SessionRecord,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError>;
}
