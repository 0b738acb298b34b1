use serde::Deserialize;

/// Which backing store the catalog runs against. Chosen once at process
/// start; there is no runtime switching.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    Postgres(PostgresConfig),
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub min_connections: Option<u32>,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: None,
            min_connections: None,
        }
    }

    /// Effective pool ceiling: explicit config, then `DB_MAX_CONNECTIONS`,
    /// then one connection per core.
    pub fn effective_max_connections(&self) -> u32 {
        self.max_connections
            .or_else(|| {
                std::env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or(num_cpus::get() as u32)
    }

    pub fn effective_min_connections(&self) -> u32 {
        self.min_connections
            .or_else(|| {
                std::env::var("DB_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or(1)
    }
}

/// Response-cache wiring. `Disabled` skips the read-through layer
/// entirely; reads always hit the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CacheConfig {
    #[default]
    Disabled,
    Memory,
    Redis {
        url: String,
    },
}

/// Top-level configuration for [`crate::database::MovieDatabase`].
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            cache: CacheConfig::Disabled,
        }
    }

    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            storage: StorageConfig::Postgres(PostgresConfig::new(url)),
            cache: CacheConfig::Disabled,
        }
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}
