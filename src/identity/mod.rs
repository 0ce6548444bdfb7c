//! Identity mapping between engine user ids and chat user ids.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::Result;

/// Two-way mapping between the engine's and the chat platform's user ids.
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn chat_user_id(&self, engine_user_id: &str) -> Result<String>;

    async fn engine_user_id(&self, chat_user_id: &str) -> Result<String>;
}

pub type SharedUserResolver = Arc<dyn UserResolver>;

/// Size and age limits of the identity cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            ttl: Duration::from_secs(60 * 60),
        }
    }
}

struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

/// Read-through cache around a slower resolver.
///
/// Each direction has its own map. Only successful lookups are stored;
/// entries expire after the configured TTL, and once a map is full the
/// oldest entry leaves first.
pub struct CachingResolver<R> {
    inner: R,
    config: CacheConfig,
    by_engine_id: RwLock<HashMap<String, CacheEntry>>,
    by_chat_id: RwLock<HashMap<String, CacheEntry>>,
}

impl<R: UserResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    pub fn with_config(inner: R, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            by_engine_id: RwLock::new(HashMap::new()),
            by_chat_id: RwLock::new(HashMap::new()),
        }
    }

    async fn cached(
        &self,
        cache: &RwLock<HashMap<String, CacheEntry>>,
        key: &str,
    ) -> Option<String> {
        let now = Instant::now();
        {
            let entries = cache.read().await;
            match entries.get(key) {
                Some(entry) if now.duration_since(entry.inserted_at) < self.config.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // The entry was stale; re-check under the write lock in case a
        // concurrent lookup refreshed it meanwhile.
        let mut entries = cache.write().await;
        if let Some(entry) = entries.get(key) {
            if now.duration_since(entry.inserted_at) >= self.config.ttl {
                entries.remove(key);
            }
        }
        None
    }

    async fn store(&self, cache: &RwLock<HashMap<String, CacheEntry>>, key: &str, value: &str) {
        let now = Instant::now();
        let mut entries = cache.write().await;
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.config.ttl);
        if entries.len() >= self.config.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                inserted_at: now,
            },
        );
    }
}

#[async_trait]
impl<R: UserResolver> UserResolver for CachingResolver<R> {
    async fn chat_user_id(&self, engine_user_id: &str) -> Result<String> {
        if let Some(hit) = self.cached(&self.by_engine_id, engine_user_id).await {
            return Ok(hit);
        }
        let value = self.inner.chat_user_id(engine_user_id).await?;
        self.store(&self.by_engine_id, engine_user_id, &value).await;
        Ok(value)
    }

    async fn engine_user_id(&self, chat_user_id: &str) -> Result<String> {
        if let Some(hit) = self.cached(&self.by_chat_id, chat_user_id).await {
            return Ok(hit);
        }
        let value = self.inner.engine_user_id(chat_user_id).await?;
        self.store(&self.by_chat_id, chat_user_id, &value).await;
        Ok(value)
    }
}
