pub mod auth_service;
pub mod session_manager;

pub use auth_service::{AuthService, AuthenticatedSession, UserInfo};
pub use session_manager::{NewSession, SessionManager, SessionTtl};
