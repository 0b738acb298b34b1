use sqlx::{PgPool, postgres::PgPoolOptions};
use std::fmt;
use tracing::info;

use crate::config::PostgresConfig;
use crate::error::{CatalogError, Result};

/// Connection provisioner for the Postgres backend.
///
/// Owns nothing but the pool; every repository operation checks a
/// connection out for exactly one logical unit of work and returns it
/// before the call completes.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let max_connections = config.effective_max_connections();
        let min_connections = config.effective_min_connections();

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .test_before_acquire(true)
            .connect(&config.url)
            .await
            .map_err(|e| CatalogError::Database(format!("database connection failed: {e}")))?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            max_connections, min_connections
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the catalog tables and uniqueness constraints if missing.
    ///
    /// The schema the repositories assume: movies keyed by id with a
    /// unique slug, genre rows owned by their movie and unique per
    /// `(movie, name)`, at most one bounded rating per `(movie, user)`
    /// pair.
    pub async fn ensure_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS movies (
                id UUID PRIMARY KEY,
                slug TEXT NOT NULL,
                title TEXT NOT NULL,
                yearofrelease INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE UNIQUE INDEX CONCURRENTLY IF NOT EXISTS movies_slug_idx
            ON movies USING btree(slug)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS genres (
                movieid UUID REFERENCES movies (id),
                name TEXT NOT NULL
            )
            "#,
            r#"
            CREATE UNIQUE INDEX CONCURRENTLY IF NOT EXISTS genres_movieid_name_idx
            ON genres USING btree(movieid, name)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS ratings (
                userid UUID,
                movieid UUID REFERENCES movies (id),
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                PRIMARY KEY (userid, movieid)
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| CatalogError::Database(format!("schema bootstrap failed: {e}")))?;
        }

        info!("Catalog schema verified");
        Ok(())
    }
}
