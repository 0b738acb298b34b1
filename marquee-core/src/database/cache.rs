use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use marquee_model::{GetAllMoviesOptions, MovieId, UserId};

/// Output-cache port for catalog reads.
///
/// Values are JSON because both implementations need a stable wire shape;
/// the facade owns (de)serializing the domain types. Eviction is eager,
/// synchronous and whole-group: every cacheable read lives under one
/// logical group and any movie or rating mutation clears all of it.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
    async fn evict_group(&self) -> Result<()>;
}

/// Key construction for the single `movies` cache group.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeys;

impl CacheKeys {
    fn user_scope(user_id: Option<UserId>) -> String {
        user_id
            .map(|u| u.to_string())
            .unwrap_or_else(|| "anon".to_string())
    }

    pub fn movie_by_id(id: MovieId, user_id: Option<UserId>) -> String {
        format!("movies:id:{}:{}", id, Self::user_scope(user_id))
    }

    pub fn movie_by_slug(slug: &str, user_id: Option<UserId>) -> String {
        format!("movies:slug:{}:{}", slug, Self::user_scope(user_id))
    }

    /// Listing key: a hash over every option field that affects results,
    /// including the user scope so one caller's `user_rating` can never
    /// surface in another caller's cached listing.
    pub fn movie_list(options: &GetAllMoviesOptions) -> String {
        let mut hasher = DefaultHasher::new();
        options.hash(&mut hasher);
        format!("movies:list:{:x}", hasher.finish())
    }

    /// Pattern matching every key in the group, for bulk eviction.
    pub fn group_pattern() -> &'static str {
        "movies:*"
    }
}

/// In-process cache used by tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(value) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(value.clone()))
            }
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        debug!("Cache SET: {}", key);
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn evict_group(&self) -> Result<()> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let evicted = entries.len();
        entries.clear();
        debug!("Cache evicted {} entries from movies group", evicted);
        Ok(())
    }
}

/// Redis-backed cache for multi-process deployments.
#[derive(Clone)]
pub struct RedisResponseCache {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisResponseCache")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisResponseCache {
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis cache at {}", redis_url);

        let client = redis::Client::open(redis_url)
            .map_err(|e| CatalogError::Cache(format!("failed to create Redis client: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CatalogError::Cache(format!("failed to connect to Redis: {e}")))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CatalogError::Cache(format!("Redis GET failed: {e}")))?;

        match data {
            Some(json) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        debug!("Cache SET: {}", key);
        let json = serde_json::to_string(&value)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, json)
            .await
            .map_err(|e| CatalogError::Cache(format!("Redis SET failed: {e}")))?;
        Ok(())
    }

    async fn evict_group(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(CacheKeys::group_pattern())
            .await
            .map_err(|e| CatalogError::Cache(format!("Redis KEYS failed: {e}")))?;

        if !keys.is_empty() {
            debug!("Evicting {} keys from movies group", keys.len());
            conn.del::<_, ()>(keys)
                .await
                .map_err(|e| CatalogError::Cache(format!("Redis DEL failed: {e}")))?;
        }

        Ok(())
    }
}
