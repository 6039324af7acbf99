//! Key-value store receiving one entry per single-record prediction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Url scheme selecting [`MemoryResultLog`].
pub const MEMORY_URL: &str = "memory://";

/// Upper bound on one Redis write, connection included.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ResultLogError {
    #[error("Invalid result log url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Result log connection failed: {0}")]
    Connection(String),
    #[error("Result log write failed: {0}")]
    Write(String),
    #[error("Result log write timed out after {0}ms")]
    Timeout(u64),
}

#[async_trait]
pub trait ResultLog: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), ResultLogError>;

    fn name(&self) -> &str;
}

/// Builds the result log selected by `url`: [`MEMORY_URL`] or a `redis://` url.
pub fn open(url: &str) -> Result<Arc<dyn ResultLog>, ResultLogError> {
    if url == MEMORY_URL {
        return Ok(Arc::new(MemoryResultLog::default()));
    }
    Ok(Arc::new(RedisResultLog::new(url)?))
}

/// Redis backed log. Every write opens a fresh connection and drops it afterwards.
///
/// Connecting and writing together are bounded by the timeout.
pub struct RedisResultLog {
    client: redis::Client,
    timeout: Duration,
}

impl RedisResultLog {
    pub fn new(url: &str) -> Result<Self, ResultLogError> {
        let client = redis::Client::open(url).map_err(|e| ResultLogError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), ResultLogError> {
        use redis::AsyncCommands;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ResultLogError::Connection(e.to_string()))?;

        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| ResultLogError::Write(e.to_string()))
    }
}

#[async_trait]
impl ResultLog for RedisResultLog {
    async fn set(&self, key: &str, value: &str) -> Result<(), ResultLogError> {
        tokio::time::timeout(self.timeout, self.write(key, value))
            .await
            .map_err(|_| ResultLogError::Timeout(self.timeout.as_millis() as u64))?
    }

    fn name(&self) -> &str {
        "redis"
    }
}

#[derive(Default)]
pub struct MemoryResultLog {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryResultLog {
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn entries(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // Entries stay valid even if a writer panicked.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ResultLog for MemoryResultLog {
    async fn set(&self, key: &str, value: &str) -> Result<(), ResultLogError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
