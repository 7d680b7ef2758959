//! Request/response DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use taskhub_core::services::UserInfo;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 5, max = 255, message = "Username must be 5-255 characters"))]
    pub username: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, max = 255, message = "Password must be 8-255 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default, rename = "rememberMe")]
    pub remember_me: bool,
}

/// Character-class rule from the registration policy: at least one
/// lowercase, one uppercase, and one digit.
pub fn check_password_complexity(password: &str) -> Result<(), String> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err("Password must contain at least one lowercase letter, one uppercase letter and one digit".to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<UserInfo> for UserDto {
    fn from(info: UserInfo) -> Self {
        Self {
            id: info.id,
            username: info.username,
            email: info.email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserDto,
    pub remember_me: bool,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub authenticated: bool,
    pub user: UserDto,
    pub csrf_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
