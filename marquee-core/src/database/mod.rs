pub mod cache;
pub mod infrastructure;
pub mod postgres;
pub mod repository_ports;

pub use cache::{CacheKeys, InMemoryCache, RedisResponseCache, ResponseCache};
pub use postgres::PostgresDatabase;
pub use repository_ports::{MovieRepository, RatingRepository};

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::{CacheConfig, DatabaseConfig, StorageConfig};
use crate::error::Result;
use infrastructure::memory::{InMemoryMovieRepository, InMemoryRatingRepository, MemoryStore};
use infrastructure::postgres::repositories::{PostgresMovieRepository, PostgresRatingRepository};
use marquee_model::{GetAllMoviesOptions, Movie, MovieId, MovieRating, UserId};

/// Catalog database facade.
///
/// Owns the backend repositories (selected once from configuration) and
/// the optional response cache. Reads go through the cache; every
/// successful mutation evicts the whole `movies` group before the call
/// returns, so no cached read can outlive a committed write.
#[derive(Clone)]
pub struct MovieDatabase {
    movies: Arc<dyn MovieRepository>,
    ratings: Arc<dyn RatingRepository>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl std::fmt::Debug for MovieDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieDatabase")
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl MovieDatabase {
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let (movies, ratings): (Arc<dyn MovieRepository>, Arc<dyn RatingRepository>) =
            match &config.storage {
                StorageConfig::Postgres(postgres) => {
                    let database = PostgresDatabase::connect(postgres).await?;
                    database.ensure_schema().await?;
                    let pool = database.pool().clone();
                    (
                        Arc::new(PostgresMovieRepository::new(pool.clone())),
                        Arc::new(PostgresRatingRepository::new(pool)),
                    )
                }
                StorageConfig::Memory => {
                    let store = MemoryStore::new();
                    (
                        Arc::new(InMemoryMovieRepository::new(store.clone())),
                        Arc::new(InMemoryRatingRepository::new(store)),
                    )
                }
            };

        let cache: Option<Arc<dyn ResponseCache>> = match &config.cache {
            CacheConfig::Disabled => None,
            CacheConfig::Memory => Some(Arc::new(InMemoryCache::new())),
            CacheConfig::Redis { url } => Some(Arc::new(RedisResponseCache::new(url).await?)),
        };

        Ok(Self {
            movies,
            ratings,
            cache,
        })
    }

    /// Backend-free constructor for tests and embedded use.
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            movies: Arc::new(InMemoryMovieRepository::new(store.clone())),
            ratings: Arc::new(InMemoryRatingRepository::new(store)),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Direct port access, bypassing the cache. Intended for callers that
    /// layer their own caching policy.
    pub fn movies(&self) -> &dyn MovieRepository {
        self.movies.as_ref()
    }

    pub fn ratings(&self) -> &dyn RatingRepository {
        self.ratings.as_ref()
    }

    async fn cached(&self, key: &str) -> Option<Value> {
        match self.cache.as_ref()?.get(key).await {
            Ok(value) => value,
            Err(e) => {
                // A broken cache degrades to a store read; it must never
                // fail the request.
                debug!("cache read failed for {key}: {e}");
                None
            }
        }
    }

    async fn store(&self, key: &str, value: Value) {
        if let Some(cache) = self.cache.as_ref()
            && let Err(e) = cache.set(key, value).await
        {
            debug!("cache write failed for {key}: {e}");
        }
    }

    /// Whole-group eviction, run after every successful mutation and
    /// before its result is returned to the caller.
    async fn evict(&self) -> Result<()> {
        if let Some(cache) = self.cache.as_ref() {
            cache.evict_group().await?;
        }
        Ok(())
    }

    pub async fn create_movie(&self, movie: &Movie) -> Result<bool> {
        let created = self.movies.create(movie).await?;
        if created {
            self.evict().await?;
        }
        Ok(created)
    }

    pub async fn get_movie_by_id(
        &self,
        id: MovieId,
        user_id: Option<UserId>,
    ) -> Result<Option<Movie>> {
        let key = CacheKeys::movie_by_id(id, user_id);
        if let Some(value) = self.cached(&key).await {
            return Ok(serde_json::from_value(value)?);
        }

        let movie = self.movies.get_by_id(id, user_id).await?;
        if movie.is_some() {
            self.store(&key, serde_json::to_value(&movie)?).await;
        }
        Ok(movie)
    }

    pub async fn get_movie_by_slug(
        &self,
        slug: &str,
        user_id: Option<UserId>,
    ) -> Result<Option<Movie>> {
        let key = CacheKeys::movie_by_slug(slug, user_id);
        if let Some(value) = self.cached(&key).await {
            return Ok(serde_json::from_value(value)?);
        }

        let movie = self.movies.get_by_slug(slug, user_id).await?;
        if movie.is_some() {
            self.store(&key, serde_json::to_value(&movie)?).await;
        }
        Ok(movie)
    }

    pub async fn get_all_movies(&self, options: &GetAllMoviesOptions) -> Result<Vec<Movie>> {
        let key = CacheKeys::movie_list(options);
        if let Some(value) = self.cached(&key).await {
            return Ok(serde_json::from_value(value)?);
        }

        let movies = self.movies.get_all(options).await?;
        self.store(&key, serde_json::to_value(&movies)?).await;
        Ok(movies)
    }

    pub async fn count_movies(
        &self,
        title: Option<&str>,
        year_of_release: Option<i32>,
    ) -> Result<i64> {
        self.movies.count(title, year_of_release).await
    }

    pub async fn update_movie(&self, movie: &Movie) -> Result<bool> {
        let updated = self.movies.update(movie).await?;
        if updated {
            self.evict().await?;
        }
        Ok(updated)
    }

    pub async fn delete_movie(&self, id: MovieId) -> Result<bool> {
        let deleted = self.movies.delete_by_id(id).await?;
        if deleted {
            self.evict().await?;
        }
        Ok(deleted)
    }

    pub async fn movie_exists(&self, id: MovieId) -> Result<bool> {
        self.movies.exists_by_id(id).await
    }

    /// Rating mutations change a movie's aggregate, so they evict the
    /// movies group exactly like movie mutations do.
    pub async fn rate_movie(&self, movie_id: MovieId, rating: i32, user_id: UserId) -> Result<bool> {
        let rated = self.ratings.rate_movie(movie_id, rating, user_id).await?;
        if rated {
            self.evict().await?;
        }
        Ok(rated)
    }

    pub async fn delete_rating(&self, movie_id: MovieId, user_id: UserId) -> Result<bool> {
        let deleted = self.ratings.delete_rating(movie_id, user_id).await?;
        if deleted {
            self.evict().await?;
        }
        Ok(deleted)
    }

    pub async fn ratings_for_user(&self, user_id: UserId) -> Result<Vec<MovieRating>> {
        self.ratings.get_ratings_for_user(user_id).await
    }
}
