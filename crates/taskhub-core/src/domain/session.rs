//! Server-side session record
//!
//! Owned exclusively by the `SessionManager` and persisted in the session
//! store as JSON. The record existing in the store is what makes a session
//! cookie valid; there is no client-side trust.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Identity snapshot, set once at login. A stale copy is tolerated
    /// until the next login if the user record changes out-of-band.
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    /// Exactly one value is valid at any instant; rotation atomically
    /// replaces it. A stale value presented after rotation is a theft
    /// signal.
    pub refresh_token: String,
    /// Constant for the session's lifetime; never rotated, never a cookie.
    pub csrf_token: String,
    /// Selects the TTL class. Immutable for the session's life.
    pub remember_me: bool,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub last_refresh: Option<DateTime<Utc>>,
    /// Advisory client descriptor, informational only.
    pub device: Option<String>,
}
