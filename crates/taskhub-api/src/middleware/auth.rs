//! Request gate
//!
//! Per-request authentication state machine. Outcomes, in order:
//! no session id -> 401; record absent in store (or store error) -> 401;
//! CSRF mismatch on a state-changing method -> destroy session, 403;
//! valid access token -> pass identity downstream; matching refresh token
//! -> rotate, re-issue all three cookies, pass downstream; anything else
//! -> destroy session, 401. Every rejection clears the client's cookies.

use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use taskhub_core::domain::SessionRecord;
use taskhub_security::csrf;
use taskhub_security::jwt::JwtError;

use crate::cookies::{
    apply_cookies, read_cookie, COOKIE_ACCESS, COOKIE_REFRESH, COOKIE_SESSION_ID, CSRF_HEADER,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Request-scoped identity injected by the gate; the merge of the verified
/// credential and the session record.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub csrf_token: String,
    pub session_id: String,
}

impl AuthenticatedUser {
    fn from_record(session_id: &str, record: &SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            username: record.username.clone(),
            email: record.email.clone(),
            csrf_token: record.csrf_token.clone(),
            session_id: session_id.to_string(),
        }
    }
}

fn reject(state: &AppState, status: StatusCode, message: &str) -> Response {
    let error = match status {
        StatusCode::FORBIDDEN => ApiError::Forbidden(message.to_string()),
        _ => ApiError::Unauthorized(message.to_string()),
    };
    let mut response = error.into_response();
    apply_cookies(response.headers_mut(), state.cookies.clear_all());
    response
}

pub async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    // 1. Session id is required for any authentication; a partial cookie
    //    set is cleared outright.
    let Some(session_id) = read_cookie(request.headers(), COOKIE_SESSION_ID) else {
        return reject(&state, StatusCode::UNAUTHORIZED, "Authentication required");
    };

    // 2. The store is the single source of truth; absence invalidates the
    //    cookie immediately, and store errors fail closed.
    let record = match state.session_manager.validate(&session_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("session absent from store");
            return reject(&state, StatusCode::UNAUTHORIZED, "Session expired");
        }
        Err(e) => {
            error!("session lookup failed: {}", e);
            return reject(&state, StatusCode::UNAUTHORIZED, "Authentication required");
        }
    };

    // 3. CSRF check for state-changing methods. A mismatch is a compromise
    //    signal, not a soft error: the session dies with it.
    if matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    ) {
        let presented = request
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !csrf::validate_csrf_token(presented, &record.csrf_token) {
            warn!(user_id = %record.user_id, "csrf token mismatch, destroying session");
            if let Err(e) = state.session_manager.destroy_session(&session_id).await {
                error!("session destroy failed: {}", e);
            }
            return reject(&state, StatusCode::FORBIDDEN, "Invalid request token");
        }
    }

    // 4. Valid access token: authenticate and stamp activity. Expired or
    //    invalid tokens fall through to renewal without noise.
    if let Some(access_token) = read_cookie(request.headers(), COOKIE_ACCESS) {
        match state.jwt.verify_access_token(&access_token) {
            Ok(claims) if claims.user_id() == Some(record.user_id) => {
                if let Err(e) = state.session_manager.touch(&session_id, &record).await {
                    warn!("activity stamp failed: {}", e);
                }
                request
                    .extensions_mut()
                    .insert(AuthenticatedUser::from_record(&session_id, &record));
                return next.run(request).await;
            }
            Ok(_) => debug!("access token subject does not match session"),
            Err(JwtError::TokenExpired) => debug!("access token expired"),
            Err(e) => debug!("access token rejected: {}", e),
        }
    }

    // 5. Renewal: a matching refresh token buys a new access token and a
    //    rotated refresh token; anything else ends the session.
    let presented_refresh = read_cookie(request.headers(), COOKIE_REFRESH).unwrap_or_default();
    if !presented_refresh.is_empty() && record.refresh_token == presented_refresh {
        let access_token = match state.jwt.issue_access_token(&record.user_id) {
            Ok(token) => token,
            Err(e) => {
                error!("access token issuance failed: {}", e);
                return reject(&state, StatusCode::UNAUTHORIZED, "Authentication required");
            }
        };

        match state
            .session_manager
            .rotate_refresh_token(&session_id, &record)
            .await
        {
            Ok(Some(new_refresh)) => {
                debug!(user_id = %record.user_id, "access token renewed");
                request
                    .extensions_mut()
                    .insert(AuthenticatedUser::from_record(&session_id, &record));
                let mut response = next.run(request).await;
                // A handler that already set cookies (logout clearing them)
                // takes precedence over re-issuance.
                if !response.headers().contains_key(SET_COOKIE) {
                    apply_cookies(
                        response.headers_mut(),
                        state.cookies.issue_all(
                            &access_token,
                            &new_refresh,
                            &session_id,
                            record.remember_me,
                        ),
                    );
                }
                return response;
            }
            Ok(None) => {
                // The conditional write lost: the stored token changed
                // between read and write. Indistinguishable from replay.
                warn!(user_id = %record.user_id, "refresh rotation lost to a concurrent write");
            }
            Err(e) => {
                error!("refresh rotation failed: {}", e);
                return reject(&state, StatusCode::UNAUTHORIZED, "Authentication required");
            }
        }
    }

    warn!(user_id = %record.user_id, "refresh token mismatch, destroying session");
    if let Err(e) = state.session_manager.destroy_session(&session_id).await {
        error!("session destroy failed: {}", e);
    }
    reject(&state, StatusCode::UNAUTHORIZED, "Authentication required")
}
