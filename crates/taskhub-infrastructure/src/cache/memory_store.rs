//! In-memory session store
//!
//! Backs tests and single-process development runs. Entries carry an
//! absolute expiry in milliseconds and are evicted lazily at read time;
//! the conditional rotation write relies on the map's entry-level lock
//! for per-key atomicity.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;

use taskhub_core::domain::SessionRecord;
use taskhub_core::error::DomainError;
use taskhub_core::repositories::SessionStore;

struct Entry {
    record: SessionRecord,
    expires_at_ms: u64,
}

impl Entry {
    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    map: DashMap<String, Entry>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn deadline(ttl_seconds: i64) -> u64 {
        Self::now_ms().saturating_add((ttl_seconds.max(0) as u64) * 1000)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(
        &self,
        session_id: &str,
        record: &SessionRecord,
        ttl_seconds: i64,
    ) -> Result<(), DomainError> {
        self.map.insert(
            session_id.to_string(),
            Entry {
                record: record.clone(),
                expires_at_ms: Self::deadline(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, DomainError> {
        let now_ms = Self::now_ms();
        if let Some(entry) = self.map.get(session_id) {
            if entry.is_expired(now_ms) {
                drop(entry);
                self.map.remove(session_id);
                return Ok(None);
            }
            return Ok(Some(entry.record.clone()));
        }
        Ok(None)
    }

    async fn delete(&self, session_id: &str) -> Result<(), DomainError> {
        self.map.remove(session_id);
        Ok(())
    }

    async fn put_if_refresh_matches(
        &self,
        session_id: &str,
        expected_refresh_token: &str,
        record: &SessionRecord,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError> {
        let now_ms = Self::now_ms();
        match self.map.entry(session_id.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now_ms) {
                    occupied.remove();
                    return Ok(false);
                }
                if occupied.get().record.refresh_token != expected_refresh_token {
                    return Ok(false);
                }
                occupied.insert(Entry {
                    record: record.clone(),
                    expires_at_ms: Self::deadline(ttl_seconds),
                });
                Ok(true)
            }
            MapEntry::Vacant(_) => Ok(false),
        }
    }
}
