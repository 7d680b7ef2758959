//! Cookie transport
//!
//! Single source of truth for the three credential cookies, so issuance
//! and clearing can never drift apart:
//! - `auth_session`: JWT access token, short-lived (minutes)
//! - `usr_token`: refresh token, TTL class selected by "remember me"
//! - `app_id`: session identifier for the store lookup, same TTL class
//!
//! All three are HttpOnly + SameSite=Strict, and Secure in production.
//! The CSRF token is deliberately NOT a cookie; it travels in response
//! bodies and comes back in the `x-csrf-token` header.

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};
use time::Duration;

pub const COOKIE_ACCESS: &str = "auth_session";
pub const COOKIE_REFRESH: &str = "usr_token";
pub const COOKIE_SESSION_ID: &str = "app_id";

pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// HTTPS-only cookies; enabled in production.
    pub secure: bool,
    /// Access cookie lifetime in seconds; matches the JWT expiry.
    pub access_max_age: i64,
    /// Refresh/session-id cookie lifetime without "remember me".
    pub ttl_short: i64,
    /// Refresh/session-id cookie lifetime with "remember me".
    pub ttl_long: i64,
}

impl CookieConfig {
    fn build(&self, name: &'static str, value: String, max_age: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .max_age(Duration::seconds(max_age))
            .build()
    }

    fn class_ttl(&self, remember_me: bool) -> i64 {
        if remember_me {
            self.ttl_long
        } else {
            self.ttl_short
        }
    }

    pub fn access_cookie(&self, token: &str) -> Cookie<'static> {
        self.build(COOKIE_ACCESS, token.to_string(), self.access_max_age)
    }

    pub fn refresh_cookie(&self, token: &str, remember_me: bool) -> Cookie<'static> {
        self.build(COOKIE_REFRESH, token.to_string(), self.class_ttl(remember_me))
    }

    pub fn session_cookie(&self, session_id: &str, remember_me: bool) -> Cookie<'static> {
        self.build(COOKIE_SESSION_ID, session_id.to_string(), self.class_ttl(remember_me))
    }

    pub fn issue_all(
        &self,
        access_token: &str,
        refresh_token: &str,
        session_id: &str,
        remember_me: bool,
    ) -> [Cookie<'static>; 3] {
        [
            self.access_cookie(access_token),
            self.refresh_cookie(refresh_token, remember_me),
            self.session_cookie(session_id, remember_me),
        ]
    }

    /// Expires all three unconditionally. Called on every authentication
    /// failure path and on logout, so a half-valid credential set can
    /// never linger on the client.
    pub fn clear_all(&self) -> [Cookie<'static>; 3] {
        [
            self.build(COOKIE_ACCESS, String::new(), 0),
            self.build(COOKIE_REFRESH, String::new(), 0),
            self.build(COOKIE_SESSION_ID, String::new(), 0),
        ]
    }
}

/// Read a single cookie value from the request headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header_value in headers.get_all(header::COOKIE) {
        let Ok(raw) = header_value.to_str() else {
            continue;
        };
        for parsed in Cookie::split_parse(raw.to_string()).flatten() {
            if parsed.name() == name {
                return Some(parsed.value().to_string());
            }
        }
    }
    None
}

/// Append `Set-Cookie` headers to a response.
pub fn apply_cookies(
    headers: &mut HeaderMap,
    cookies: impl IntoIterator<Item = Cookie<'static>>,
) {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CookieConfig {
        CookieConfig {
            secure: true,
            access_max_age: 300,
            ttl_short: 14_400,
            ttl_long: 2_592_000,
        }
    }

    #[test]
    fn issued_cookies_carry_security_attributes() {
        let set = config().issue_all("jwt", "refresh", "sid", false);
        for cookie in &set {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Strict));
            assert_eq!(cookie.path(), Some("/"));
        }
        assert_eq!(set[0].max_age(), Some(Duration::seconds(300)));
        assert_eq!(set[1].max_age(), Some(Duration::seconds(14_400)));
    }

    #[test]
    fn remember_me_extends_refresh_and_session_cookies_only() {
        let config = config();
        let set = config.issue_all("jwt", "refresh", "sid", true);
        assert_eq!(set[0].max_age(), Some(Duration::seconds(300)));
        assert_eq!(set[1].max_age(), Some(Duration::seconds(2_592_000)));
        assert_eq!(set[2].max_age(), Some(Duration::seconds(2_592_000)));
    }

    #[test]
    fn clear_all_expires_every_credential() {
        for cookie in config().clear_all() {
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert!(cookie.value().is_empty());
        }
    }

    #[test]
    fn read_cookie_finds_value_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("app_id=sid-123; auth_session=jwt; usr_token=ref"),
        );
        assert_eq!(read_cookie(&headers, COOKIE_SESSION_ID).as_deref(), Some("sid-123"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
