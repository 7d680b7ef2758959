//! Application-wide constants

/// Access token lifetime: 5 minutes.
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 300;
/// Session/refresh TTL without "remember me": 4 hours.
pub const DEFAULT_SESSION_TTL_SHORT: i64 = 14_400;
/// Session/refresh TTL with "remember me": 30 days.
pub const DEFAULT_SESSION_TTL_LONG: i64 = 2_592_000;
