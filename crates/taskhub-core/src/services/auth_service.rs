//! Authentication service: login, register, logout
//!
//! Credential verification happens here, against the identity store port.
//! Unknown email and wrong password are deliberately indistinguishable to
//! the caller.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use taskhub_security::{JwtService, PasswordService};
use taskhub_shared::utils::mask_email;

use crate::domain::User;
use crate::error::DomainError;
use crate::repositories::UserRepository;
use crate::services::session_manager::SessionManager;

/// Identity snapshot returned in auth responses.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Everything the transport needs after a successful login: the three
/// client-held credentials plus the CSRF token for the response body.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: UserInfo,
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
    pub remember_me: bool,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionManager>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionManager>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self { users, sessions, jwt }
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
        device: Option<String>,
    ) -> Result<AuthenticatedSession, DomainError> {
        info!("login attempt for {}", mask_email(email));

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !user.can_login() {
            warn!("login refused for inactive user {}", mask_email(email));
            return Err(DomainError::UserNotActive);
        }

        let password_valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        if !password_valid {
            warn!("login failed for {}", mask_email(email));
            return Err(DomainError::InvalidCredentials);
        }

        let session = self.sessions.create_session(&user, remember_me, device).await?;
        let access_token = self
            .jwt
            .issue_access_token(&user.id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        info!("login successful for {}", mask_email(email));

        Ok(AuthenticatedSession {
            user: UserInfo::from(&user),
            session_id: session.session_id,
            access_token,
            refresh_token: session.refresh_token,
            csrf_token: session.csrf_token,
            remember_me,
        })
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, DomainError> {
        info!("registration attempt for {}", mask_email(email));

        if self.users.find_by_email(email).await?.is_some() {
            warn!("registration rejected, email already exists: {}", mask_email(email));
            return Err(DomainError::EmailAlreadyExists(email.to_string()));
        }

        let password_hash = PasswordService::hash(password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        let user = User::new(username.to_string(), email.to_string(), password_hash);
        let created = self.users.create(&user).await?;

        info!("registration successful for {}", mask_email(email));
        Ok(UserInfo::from(&created))
    }

    /// Idempotent: destroying an absent session is not an error.
    pub async fn logout(&self, session_id: &str) -> Result<(), DomainError> {
        self.sessions.destroy_session(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::session_store::MockSessionStore;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::services::session_manager::SessionTtl;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("test-secret-with-plenty-of-entropy", 300))
    }

    fn sessions(store: MockSessionStore) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(
            Arc::new(store),
            SessionTtl { short: 14_400, long: 2_592_000 },
        ))
    }

    fn stored_user(password: &str) -> User {
        let hash = PasswordService::hash(password).unwrap();
        User::new("marcel".to_string(), "marcel@example.com".to_string(), hash)
    }

    #[tokio::test]
    async fn login_with_valid_credentials_creates_session() {
        let user = stored_user("Sup3rSecret");
        let expected_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let mut store = MockSessionStore::new();
        store.expect_put().times(1).returning(|_, _, _| Ok(()));

        let service = AuthService::new(Arc::new(users), sessions(store), jwt());
        let result = service
            .login("marcel@example.com", "Sup3rSecret", false, None)
            .await
            .unwrap();

        assert_eq!(result.user.id, expected_id);
        assert!(!result.access_token.is_empty());
        assert!(!result.refresh_token.is_empty());
        assert!(!result.csrf_token.is_empty());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_uniform() {
        let user = stored_user("Sup3rSecret");

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |email| {
                if email == "marcel@example.com" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let store = MockSessionStore::new();
        let service = AuthService::new(Arc::new(users), sessions(store), jwt());

        let unknown = service.login("nobody@example.com", "whatever", false, None).await;
        assert!(matches!(unknown, Err(DomainError::InvalidCredentials)));

        let wrong = service.login("marcel@example.com", "wrong", false, None).await;
        assert!(matches!(wrong, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let existing = stored_user("Sup3rSecret");

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));

        let store = MockSessionStore::new();
        let service = AuthService::new(Arc::new(users), sessions(store), jwt());

        let result = service
            .register("marcel", "marcel@example.com", "Sup3rSecret")
            .await;
        assert!(matches!(result, Err(DomainError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn register_hashes_password_before_persisting() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().times(1).returning(|user| {
            assert_ne!(user.password_hash, "Sup3rSecret");
            assert!(user.password_hash.starts_with("$argon2"));
            Ok(user.clone())
        });

        let store = MockSessionStore::new();
        let service = AuthService::new(Arc::new(users), sessions(store), jwt());

        let info = service
            .register("marcel", "marcel@example.com", "Sup3rSecret")
            .await
            .unwrap();
        assert_eq!(info.username, "marcel");
    }
}
