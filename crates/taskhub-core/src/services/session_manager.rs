//! Session lifecycle management
//!
//! The manager owns the session record's shape and mutation rules:
//! creation, refresh-token rotation, activity stamping, destruction.
//! Rotation is the only mutator besides the activity stamp, and it goes
//! through the store's conditional write so two racing renewals cannot
//! both succeed.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use taskhub_security::{csrf, token};

use crate::domain::{SessionRecord, User};
use crate::error::DomainError;
use crate::repositories::SessionStore;

/// TTL classes in seconds. `remember_me` selects `long`.
#[derive(Debug, Clone, Copy)]
pub struct SessionTtl {
    pub short: i64,
    pub long: i64,
}

/// Secrets handed back to the transport after session creation.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub refresh_token: String,
    pub csrf_token: String,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: SessionTtl,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: SessionTtl) -> Self {
        Self { store, ttl }
    }

    pub fn ttl_for(&self, remember_me: bool) -> i64 {
        if remember_me {
            self.ttl.long
        } else {
            self.ttl.short
        }
    }

    /// Generates three independent random values, assembles the record,
    /// and persists it under the TTL class selected by `remember_me`.
    pub async fn create_session(
        &self,
        user: &User,
        remember_me: bool,
        device: Option<String>,
    ) -> Result<NewSession, DomainError> {
        let session_id = Uuid::new_v4().to_string();
        let refresh_token = token::generate_refresh_token();
        let csrf_token = csrf::generate_csrf_token();
        let now = Utc::now();

        let record = SessionRecord {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            refresh_token: refresh_token.clone(),
            csrf_token: csrf_token.clone(),
            remember_me,
            login_time: now,
            last_activity: now,
            last_refresh: None,
            device,
        };

        self.store
            .put(&session_id, &record, self.ttl_for(remember_me))
            .await?;

        debug!(user_id = %user.id, remember_me, "session created");

        Ok(NewSession {
            session_id,
            refresh_token,
            csrf_token,
        })
    }

    pub async fn validate(&self, session_id: &str) -> Result<Option<SessionRecord>, DomainError> {
        self.store.get(session_id).await
    }

    /// Rotates the refresh token through the store's conditional write.
    /// Returns the new token, or `None` when the stored token no longer
    /// matches `record.refresh_token` (a lost race or a replayed stale
    /// token; callers treat both as a mismatch).
    pub async fn rotate_refresh_token(
        &self,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<Option<String>, DomainError> {
        let new_token = token::generate_refresh_token();

        let mut updated = record.clone();
        updated.refresh_token = new_token.clone();
        updated.last_refresh = Some(Utc::now());

        let swapped = self
            .store
            .put_if_refresh_matches(
                session_id,
                &record.refresh_token,
                &updated,
                self.ttl_for(record.remember_me),
            )
            .await?;

        if swapped {
            debug!(user_id = %record.user_id, "refresh token rotated");
            Ok(Some(new_token))
        } else {
            Ok(None)
        }
    }

    /// Stamps `last_activity` and re-puts under the record's TTL class.
    /// This is the deliberate re-put on activity; plain reads never extend
    /// the session.
    pub async fn touch(
        &self,
        session_id: &str,
        record: &SessionRecord,
    ) -> Result<(), DomainError> {
        let mut updated = record.clone();
        updated.last_activity = Utc::now();
        self.store
            .put(session_id, &updated, self.ttl_for(record.remember_me))
            .await
    }

    pub async fn destroy_session(&self, session_id: &str) -> Result<(), DomainError> {
        self.store.delete(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Store fake that also records the TTL of every put.
    #[derive(Default)]
    struct FakeStore {
        entries: Mutex<HashMap<String, (SessionRecord, i64)>>,
    }

    #[async_trait]
    impl SessionStore for FakeStore {
        async fn put(
            &self,
            session_id: &str,
            record: &SessionRecord,
            ttl_seconds: i64,
        ) -> Result<(), DomainError> {
            self.entries
                .lock()
                .unwrap()
                .insert(session_id.to_string(), (record.clone(), ttl_seconds));
            Ok(())
        }

        async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, DomainError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(session_id)
                .map(|(r, _)| r.clone()))
        }

        async fn delete(&self, session_id: &str) -> Result<(), DomainError> {
            self.entries.lock().unwrap().remove(session_id);
            Ok(())
        }

        async fn put_if_refresh_matches(
            &self,
            session_id: &str,
            expected_refresh_token: &str,
            record: &SessionRecord,
            ttl_seconds: i64,
        ) -> Result<bool, DomainError> {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(session_id) {
                Some((current, _)) if current.refresh_token == expected_refresh_token => {
                    entries.insert(session_id.to_string(), (record.clone(), ttl_seconds));
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    fn test_user() -> User {
        User::new(
            "marcel".to_string(),
            "marcel@example.com".to_string(),
            "$argon2id$fake".to_string(),
        )
    }

    fn manager(store: Arc<FakeStore>) -> SessionManager {
        SessionManager::new(store, SessionTtl { short: 14_400, long: 2_592_000 })
    }

    #[tokio::test]
    async fn created_session_is_retrievable_with_distinct_secrets() {
        let store = Arc::new(FakeStore::default());
        let manager = manager(store.clone());
        let user = test_user();

        let first = manager.create_session(&user, false, None).await.unwrap();
        let second = manager.create_session(&user, false, None).await.unwrap();

        let record = manager.validate(&first.session_id).await.unwrap().unwrap();
        assert!(!record.refresh_token.is_empty());
        assert!(!record.csrf_token.is_empty());
        assert_eq!(record.user_id, user.id);
        assert!(record.last_refresh.is_none());

        // uniqueness across sessions
        assert_ne!(first.session_id, second.session_id);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.csrf_token, second.csrf_token);
    }

    #[tokio::test]
    async fn remember_me_selects_strictly_longer_ttl() {
        let store = Arc::new(FakeStore::default());
        let manager = manager(store.clone());
        let user = test_user();

        let short = manager.create_session(&user, false, None).await.unwrap();
        let long = manager.create_session(&user, true, None).await.unwrap();

        let entries = store.entries.lock().unwrap();
        let (_, short_ttl) = &entries[&short.session_id];
        let (_, long_ttl) = &entries[&long.session_id];
        assert!(long_ttl > short_ttl);
    }

    #[tokio::test]
    async fn rotation_is_one_shot() {
        let store = Arc::new(FakeStore::default());
        let manager = manager(store.clone());
        let user = test_user();

        let session = manager.create_session(&user, false, None).await.unwrap();
        let record = manager.validate(&session.session_id).await.unwrap().unwrap();

        let rotated = manager
            .rotate_refresh_token(&session.session_id, &record)
            .await
            .unwrap();
        let new_token = rotated.expect("first rotation succeeds");
        assert_ne!(new_token, session.refresh_token);

        // Second rotation from the same (now stale) record must fail.
        let replayed = manager
            .rotate_refresh_token(&session.session_id, &record)
            .await
            .unwrap();
        assert!(replayed.is_none());

        let stored = manager.validate(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token, new_token);
        assert!(stored.last_refresh.is_some());
        // CSRF token does not rotate
        assert_eq!(stored.csrf_token, session.csrf_token);
    }

    #[tokio::test]
    async fn rotation_preserves_ttl_class() {
        let store = Arc::new(FakeStore::default());
        let manager = manager(store.clone());
        let user = test_user();

        let session = manager.create_session(&user, true, None).await.unwrap();
        let record = manager.validate(&session.session_id).await.unwrap().unwrap();
        manager
            .rotate_refresh_token(&session.session_id, &record)
            .await
            .unwrap()
            .unwrap();

        let entries = store.entries.lock().unwrap();
        let (_, ttl) = &entries[&session.session_id];
        assert_eq!(*ttl, 2_592_000);
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let store = Arc::new(FakeStore::default());
        let manager = manager(store.clone());
        let user = test_user();

        let session = manager.create_session(&user, false, None).await.unwrap();
        manager.destroy_session(&session.session_id).await.unwrap();
        manager.destroy_session(&session.session_id).await.unwrap();
        assert!(manager.validate(&session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn touch_updates_last_activity() {
        let store = Arc::new(FakeStore::default());
        let manager = manager(store.clone());
        let user = test_user();

        let session = manager.create_session(&user, false, None).await.unwrap();
        let record = manager.validate(&session.session_id).await.unwrap().unwrap();
        manager.touch(&session.session_id, &record).await.unwrap();

        let stored = manager.validate(&session.session_id).await.unwrap().unwrap();
        assert!(stored.last_activity >= record.last_activity);
        assert_eq!(stored.refresh_token, record.refresh_token);
    }
}
