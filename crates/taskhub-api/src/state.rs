use std::sync::Arc;

use taskhub_core::services::{AuthService, SessionManager};
use taskhub_security::JwtService;

use crate::cookies::CookieConfig;

/// Application state shared across handlers and the gate. Constructed once
/// at process start; the session store behind the manager is the only
/// state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub session_manager: Arc<SessionManager>,
    pub jwt: Arc<JwtService>,
    pub cookies: CookieConfig,
}
