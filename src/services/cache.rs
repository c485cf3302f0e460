use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::MatchResult;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-level cache of ranked suggestions, keyed by requester
///
/// L1 is a per-process moka cache holding decoded results; L2 is Redis,
/// shared by every instance and holding the JSON form. Both expire after
/// the same TTL, and writes to the friend-request ledger invalidate the
/// entries of both parties.
pub struct MatchCache {
    redis: ConnectionManager,
    local: moka::future::Cache<String, Arc<MatchResult>>,
    ttl_secs: u64,
}

impl MatchCache {
    pub async fn connect(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let local = moka::future::Cache::builder()
            .max_capacity(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis,
            local,
            ttl_secs,
        })
    }

    /// Cached suggestions for `user_id`, `None` on a miss in both levels
    pub async fn get_matches(&self, user_id: &str) -> Result<Option<MatchResult>, CacheError> {
        let key = matches_key(user_id);

        if let Some(hit) = self.local.get(&key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(hit.as_ref().clone()));
        }

        let mut conn = self.redis.clone();
        let Some(json) = conn.get::<_, Option<String>>(&key).await? else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        tracing::trace!("L2 cache hit: {}", key);
        let result: MatchResult = serde_json::from_str(&json)?;
        self.local.insert(key, Arc::new(result.clone())).await;

        Ok(Some(result))
    }

    pub async fn put_matches(&self, user_id: &str, result: &MatchResult) -> Result<(), CacheError> {
        let key = matches_key(user_id);
        let json = serde_json::to_string(result)?;

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, json, self.ttl_secs).await?;

        self.local.insert(key, Arc::new(result.clone())).await;
        Ok(())
    }

    /// Drop the cached suggestions of every listed user
    pub async fn invalidate(&self, user_ids: &[&str]) -> Result<(), CacheError> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = user_ids.iter().map(|id| matches_key(id)).collect();
        for key in &keys {
            self.local.invalidate(key).await;
        }

        let mut conn = self.redis.clone();
        conn.del::<_, ()>(&keys).await?;

        tracing::debug!("Invalidated cached matches for {:?}", user_ids);
        Ok(())
    }
}

fn matches_key(user_id: &str) -> String {
    format!("matches:{}", user_id)
}
