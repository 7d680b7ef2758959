//! CSRF protection
//!
//! The token is bound to the session at creation and never rotated. It is
//! returned only in response bodies (never a cookie) and echoed back in a
//! request header for every state-changing request.

use rand::Rng;

pub fn generate_csrf_token() -> String {
    let token: [u8; 16] = rand::rng().random();
    hex::encode(token)
}

pub fn validate_csrf_token(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && presented == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_csrf_token(), generate_csrf_token());
    }

    #[test]
    fn validation_requires_exact_match() {
        let token = generate_csrf_token();
        assert!(validate_csrf_token(&token, &token));
        assert!(!validate_csrf_token("", &token));
        assert!(!validate_csrf_token(&token, ""));
        assert!(!validate_csrf_token("deadbeef", &token));
    }
}
