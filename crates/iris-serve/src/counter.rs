use tokio::sync::Mutex;

use crate::result_log::{ResultLog, ResultLogError};

/// Sequence number keying result log entries, starting at 0.
///
/// The lock is held across the log write, so concurrent requests get distinct
/// keys and a failed write leaves the counter where it was.
#[derive(Debug, Default)]
pub struct PredictionCounter {
    next: Mutex<u64>,
}

impl PredictionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> u64 {
        *self.next.lock().await
    }

    /// Writes `value` under the current counter value, then advances the
    /// counter. Returns the key used.
    pub async fn record(&self, log: &dyn ResultLog, value: &str) -> Result<u64, ResultLogError> {
        let mut next = self.next.lock().await;
        let key = *next;
        log.set(&key.to_string(), value).await?;
        *next += 1;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_log::MemoryResultLog;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnreachableLog;

    #[async_trait]
    impl ResultLog for UnreachableLog {
        async fn set(&self, _key: &str, _value: &str) -> Result<(), ResultLogError> {
            Err(ResultLogError::Connection("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn sequential_records_use_gapless_keys() {
        let counter = PredictionCounter::new();
        let log = MemoryResultLog::default();

        for expected in 0..3u64 {
            let key = counter.record(&log, "[0]").await.unwrap();
            assert_eq!(key, expected);
        }

        let keys = log.entries().into_keys().collect::<Vec<_>>();
        assert_eq!(keys, vec!["0", "1", "2"]);
        assert_eq!(counter.current().await, 3);
    }

    #[tokio::test]
    async fn failed_write_does_not_advance() {
        let counter = PredictionCounter::new();

        assert!(counter.record(&UnreachableLog, "[0]").await.is_err());
        assert_eq!(counter.current().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_never_share_a_key() {
        let counter = Arc::new(PredictionCounter::new());
        let log = Arc::new(MemoryResultLog::default());

        let tasks = (0..32)
            .map(|i| {
                let counter = counter.clone();
                let log = log.clone();
                tokio::spawn(async move { counter.record(log.as_ref(), &format!("[{i}]")).await })
            })
            .collect::<Vec<_>>();

        let mut keys = Vec::new();
        for task in tasks {
            keys.push(task.await.unwrap().unwrap());
        }
        keys.sort();

        assert_eq!(keys, (0..32).collect::<Vec<u64>>());
        assert_eq!(log.len(), 32);
    }
}
