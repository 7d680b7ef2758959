//! Authentication HTTP handlers (register, login, logout, status)

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use validator::Validate;

use crate::cookies::{apply_cookies, read_cookie, COOKIE_SESSION_ID};
use crate::dto::{
    check_password_complexity, LoginRequest, LoginResponse, LogoutResponse, RegisterRequest,
    StatusResponse, UserDto,
};
use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

fn device_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    payload.validate()?;
    check_password_complexity(&payload.password).map_err(ApiError::BadRequest)?;

    let user = state
        .auth_service
        .register(payload.username.trim(), &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// POST /auth/login
///
/// On success the three credential cookies are set and the CSRF token is
/// returned in the body only. Failures are uniform 401s with cookies
/// cleared, so a stale credential set cannot be retried against.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if let Err(e) = payload.validate() {
        return ApiError::from(e).into_response();
    }

    let device = device_from(&headers);
    match state
        .auth_service
        .login(&payload.email, &payload.password, payload.remember_me, device)
        .await
    {
        Ok(auth) => {
            let body = LoginResponse {
                user: UserDto::from(auth.user),
                remember_me: auth.remember_me,
                is_authenticated: true,
                csrf_token: auth.csrf_token,
            };
            let mut response = (StatusCode::OK, Json(body)).into_response();
            apply_cookies(
                response.headers_mut(),
                state.cookies.issue_all(
                    &auth.access_token,
                    &auth.refresh_token,
                    &auth.session_id,
                    auth.remember_me,
                ),
            );
            response
        }
        Err(e) => {
            let mut response = ApiError::from(e).into_response();
            apply_cookies(response.headers_mut(), state.cookies.clear_all());
            response
        }
    }
}

/// POST /auth/logout
///
/// Idempotent: always 200, whether or not a session existed.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = read_cookie(&headers, COOKIE_SESSION_ID) {
        if let Err(e) = state.auth_service.logout(&session_id).await {
            tracing::error!("logout session destroy failed: {}", e);
        }
    }

    let mut response =
        (StatusCode::OK, Json(LogoutResponse { success: true })).into_response();
    apply_cookies(response.headers_mut(), state.cookies.clear_all());
    response
}

/// GET /auth/status
///
/// The gate already authenticated (and possibly renewed) this request;
/// this handler only reflects the identity back.
pub async fn status(Extension(user): Extension<AuthenticatedUser>) -> Json<StatusResponse> {
    Json(StatusResponse {
        authenticated: true,
        user: UserDto {
            id: user.user_id,
            username: user.username,
            email: user.email,
        },
        csrf_token: user.csrf_token,
    })
}
