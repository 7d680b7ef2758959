//! Two renewals racing from the same stale refresh token: exactly one may
//! rotate, the other must observe a mismatch.

use std::sync::Arc;

use taskhub_core::domain::User;
use taskhub_core::services::{SessionManager, SessionTtl};
use taskhub_infrastructure::MemorySessionStore;

#[tokio::test]
async fn concurrent_rotations_from_same_token_yield_one_winner() {
    let store = Arc::new(MemorySessionStore::new());
    let manager = Arc::new(SessionManager::new(
        store,
        SessionTtl { short: 14_400, long: 2_592_000 },
    ));

    let user = User::new(
        "marcel".to_string(),
        "marcel@example.com".to_string(),
        "$argon2id$fake".to_string(),
    );
    let session = manager.create_session(&user, false, None).await.unwrap();
    let record = manager.validate(&session.session_id).await.unwrap().unwrap();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let manager = manager.clone();
            let session_id = session.session_id.clone();
            let record = record.clone();
            tokio::spawn(async move {
                manager.rotate_refresh_token(&session_id, &record).await.unwrap()
            })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    // The stored token is the winner's, and the pre-rotation value is dead.
    let stored = manager.validate(&session.session_id).await.unwrap().unwrap();
    assert_ne!(stored.refresh_token, session.refresh_token);
}
