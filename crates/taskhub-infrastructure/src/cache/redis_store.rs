//! Redis session store
//!
//! Records live under `session:{id}` as JSON with a server-enforced TTL.
//! Rotation uses a Lua script so the compare-and-put on `refresh_token`
//! is a single atomic store operation.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tracing::error;

use taskhub_core::domain::SessionRecord;
use taskhub_core::error::DomainError;
use taskhub_core::repositories::SessionStore;

const KEY_PREFIX: &str = "session:";

// Overwrites the record only while the stored refresh_token still equals
// ARGV[1]; returns 1 on swap, 0 otherwise.
const ROTATE_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
    return 0
end
local ok, decoded = pcall(cjson.decode, current)
if not ok then
    return 0
end
if decoded['refresh_token'] ~= ARGV[1] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', tonumber(ARGV[3]))
return 1
"#;

pub struct RedisSessionStore {
    conn: ConnectionManager,
    rotate: Script,
}

impl RedisSessionStore {
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let client = redis::Client::open(url)
            .map_err(|e| DomainError::StoreUnavailable(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::StoreUnavailable(e.to_string()))?;
        Ok(Self {
            conn,
            rotate: Script::new(ROTATE_SCRIPT),
        })
    }

    fn key(session_id: &str) -> String {
        format!("{KEY_PREFIX}{session_id}")
    }

    fn encode(record: &SessionRecord) -> Result<String, DomainError> {
        serde_json::to_string(record).map_err(|e| DomainError::InternalError(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(
        &self,
        session_id: &str,
        record: &SessionRecord,
        ttl_seconds: i64,
    ) -> Result<(), DomainError> {
        let payload = Self::encode(record)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(session_id), payload, ttl_seconds.max(1) as u64)
            .await
            .map_err(|e| {
                error!("redis put failed: {}", e);
                DomainError::StoreUnavailable(e.to_string())
            })
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, DomainError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(Self::key(session_id)).await.map_err(|e| {
            error!("redis get failed: {}", e);
            DomainError::StoreUnavailable(e.to_string())
        })?;

        match payload {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| DomainError::InternalError(e.to_string())),
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(session_id)).await.map_err(|e| {
            error!("redis delete failed: {}", e);
            DomainError::StoreUnavailable(e.to_string())
        })
    }

    async fn put_if_refresh_matches(
        &self,
        session_id: &str,
        expected_refresh_token: &str,
        record: &SessionRecord,
        ttl_seconds: i64,
    ) -> Result<bool, DomainError> {
        let payload = Self::encode(record)?;
        let mut conn = self.conn.clone();
        let swapped: i64 = self
            .rotate
            .key(Self::key(session_id))
            .arg(expected_refresh_token)
            .arg(payload)
            .arg(ttl_seconds.max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                error!("redis conditional put failed: {}", e);
                DomainError::StoreUnavailable(e.to_string())
            })?;

        Ok(swapped == 1)
    }
}
