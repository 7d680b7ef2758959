//! Opaque random session secrets

use rand::Rng;

/// 32 random bytes, hex-encoded. Exactly one value is valid per session at
/// any instant; rotation replaces it on every renewal.
pub fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}
