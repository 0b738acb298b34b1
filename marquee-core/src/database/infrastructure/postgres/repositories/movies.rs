use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use async_trait::async_trait;
use marquee_model::{GetAllMoviesOptions, Movie, MovieId, SortOrder, UserId};

use crate::database::repository_ports::MovieRepository;
use crate::error::{CatalogError, Result};

/// Alternate lookup keys for a single movie.
enum MovieKey<'a> {
    Id(Uuid),
    Slug(&'a str),
}

#[derive(Clone, Debug)]
pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Field-by-field mapping for the enriched single-movie projection.
    /// Genres are hydrated separately; unexpected nulls fail the read
    /// instead of turning into defaults.
    fn row_to_movie(row: &PgRow) -> std::result::Result<Movie, sqlx::Error> {
        Ok(Movie {
            id: MovieId(row.try_get::<Uuid, _>("id")?),
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            year_of_release: row.try_get("yearofrelease")?,
            genres: Vec::new(),
            rating: row.try_get::<Option<f32>, _>("rating")?,
            user_rating: row.try_get::<Option<i32>, _>("userrating")?,
        })
    }

    async fn insert_genres(
        tx: &mut Transaction<'_, Postgres>,
        id: MovieId,
        genres: &[String],
    ) -> Result<()> {
        for genre in genres {
            sqlx::query("INSERT INTO genres (movieid, name) VALUES ($1, $2)")
                .bind(id.to_uuid())
                .bind(genre)
                .execute(&mut **tx)
                .await
                .map_err(|e| CatalogError::Database(format!("failed to insert genre: {e}")))?;
        }
        Ok(())
    }

    async fn fetch_genres(&self, id: MovieId) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT name FROM genres WHERE movieid = $1")
            .bind(id.to_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(|e| CatalogError::Database(format!("failed to fetch genres: {e}")))
    }

    async fn get_one(&self, key: MovieKey<'_>, user_id: Option<UserId>) -> Result<Option<Movie>> {
        let where_clause = match key {
            MovieKey::Id(_) => "m.id = $2",
            MovieKey::Slug(_) => "m.slug = $2",
        };
        let sql = format!(
            r#"
            SELECT m.id, m.slug, m.title, m.yearofrelease,
                   round(avg(r.rating), 1)::real AS rating,
                   (SELECT rating FROM ratings
                    WHERE movieid = m.id AND userid = $1
                    LIMIT 1) AS userrating
            FROM movies m
            LEFT JOIN ratings r ON m.id = r.movieid
            WHERE {where_clause}
            GROUP BY m.id
            "#
        );

        let query = sqlx::query(&sql).bind(user_id.map(|u| u.to_uuid()));
        let query = match key {
            MovieKey::Id(id) => query.bind(id),
            MovieKey::Slug(slug) => query.bind(slug),
        };

        let row = query
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CatalogError::Database(format!("failed to fetch movie: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut movie = Self::row_to_movie(&row)
            .map_err(|e| CatalogError::Database(format!("failed to map movie row: {e}")))?;
        movie.genres = self.fetch_genres(movie.id).await?;

        Ok(Some(movie))
    }
}

#[async_trait]
impl MovieRepository for PostgresMovieRepository {
    async fn create(&self, movie: &Movie) -> Result<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| CatalogError::Database(format!("failed to begin transaction: {e}")))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO movies (id, slug, title, yearofrelease)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(movie.id.to_uuid())
        .bind(&movie.slug)
        .bind(&movie.title)
        .bind(movie.year_of_release)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // Duplicate slug is the one conflict create reports as a plain
            // failed result; dropping the transaction rolls the insert back.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => return Ok(false),
            Err(e) => {
                return Err(CatalogError::Database(format!(
                    "failed to insert movie: {e}"
                )));
            }
        }

        Self::insert_genres(&mut tx, movie.id, &movie.genres).await?;

        tx.commit()
            .await
            .map_err(|e| CatalogError::Database(format!("failed to commit transaction: {e}")))?;

        Ok(true)
    }

    async fn get_by_id(&self, id: MovieId, user_id: Option<UserId>) -> Result<Option<Movie>> {
        self.get_one(MovieKey::Id(id.to_uuid()), user_id).await
    }

    async fn get_by_slug(&self, slug: &str, user_id: Option<UserId>) -> Result<Option<Movie>> {
        self.get_one(MovieKey::Slug(slug), user_id).await
    }

    async fn get_all(&self, options: &GetAllMoviesOptions) -> Result<Vec<Movie>> {
        let mut sql = String::from(
            r#"
            SELECT m.id, m.slug, m.title, m.yearofrelease,
                   array_agg(DISTINCT g.name) FILTER (WHERE g.name IS NOT NULL) AS genres,
                   round(avg(r.rating), 1)::real AS rating,
                   (SELECT rating FROM ratings ur
                    WHERE ur.movieid = m.id AND ur.userid = $1
                    LIMIT 1) AS userrating
            FROM movies m
            LEFT JOIN genres g ON m.id = g.movieid
            LEFT JOIN ratings r ON m.id = r.movieid
            WHERE ($2::text IS NULL OR m.title LIKE ('%' || $2 || '%'))
              AND ($3::integer IS NULL OR m.yearofrelease = $3)
            GROUP BY m.id
            "#,
        );

        // Sort columns come from the SortField allow-list, never from the
        // caller's raw input, so interpolation here is safe.
        if let Some(field) = options.sort_field {
            let direction = match options.sort_order {
                SortOrder::Descending => "DESC",
                _ => "ASC",
            };
            sql.push_str(&format!(" ORDER BY m.{} {}", field.as_column(), direction));
        }

        sql.push_str(" LIMIT $4 OFFSET $5");

        let rows = sqlx::query(&sql)
            .bind(options.user_id.map(|u| u.to_uuid()))
            .bind(options.title.as_deref())
            .bind(options.year_of_release)
            .bind(options.limit())
            .bind(options.offset())
            .fetch_all(self.pool())
            .await
            .map_err(|e| CatalogError::Database(format!("failed to list movies: {e}")))?;

        let mut movies = Vec::with_capacity(rows.len());
        for row in rows {
            let mut movie = Self::row_to_movie(&row)
                .map_err(|e| CatalogError::Database(format!("failed to map movie row: {e}")))?;
            movie.genres = row
                .try_get::<Option<Vec<String>>, _>("genres")
                .map_err(|e| CatalogError::Database(format!("failed to map genres: {e}")))?
                .unwrap_or_default();
            movies.push(movie);
        }

        Ok(movies)
    }

    async fn count(&self, title: Option<&str>, year_of_release: Option<i32>) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            SELECT count(id)
            FROM movies
            WHERE ($1::text IS NULL OR title LIKE ('%' || $1 || '%'))
              AND ($2::integer IS NULL OR yearofrelease = $2)
            "#,
        )
        .bind(title)
        .bind(year_of_release)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CatalogError::Database(format!("failed to count movies: {e}")))
    }

    async fn update(&self, movie: &Movie) -> Result<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| CatalogError::Database(format!("failed to begin transaction: {e}")))?;

        let updated = sqlx::query(
            r#"
            UPDATE movies
            SET slug = $1, title = $2, yearofrelease = $3
            WHERE id = $4
            "#,
        )
        .bind(&movie.slug)
        .bind(&movie.title)
        .bind(movie.year_of_release)
        .bind(movie.id.to_uuid())
        .execute(&mut *tx)
        .await;

        let result = match updated {
            Ok(done) => done,
            // Renaming onto a taken slug reports the same plain failure
            // as create.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => return Ok(false),
            Err(e) => {
                return Err(CatalogError::Database(format!(
                    "failed to update movie: {e}"
                )));
            }
        };

        if result.rows_affected() == 0 {
            // No such movie; dropping the transaction leaves no trace.
            return Ok(false);
        }

        sqlx::query("DELETE FROM genres WHERE movieid = $1")
            .bind(movie.id.to_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| CatalogError::Database(format!("failed to clear genres: {e}")))?;

        Self::insert_genres(&mut tx, movie.id, &movie.genres).await?;

        tx.commit()
            .await
            .map_err(|e| CatalogError::Database(format!("failed to commit transaction: {e}")))?;

        Ok(true)
    }

    async fn delete_by_id(&self, id: MovieId) -> Result<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| CatalogError::Database(format!("failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM ratings WHERE movieid = $1")
            .bind(id.to_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| CatalogError::Database(format!("failed to delete ratings: {e}")))?;

        sqlx::query("DELETE FROM genres WHERE movieid = $1")
            .bind(id.to_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| CatalogError::Database(format!("failed to delete genres: {e}")))?;

        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| CatalogError::Database(format!("failed to delete movie: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| CatalogError::Database(format!("failed to commit transaction: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_id(&self, id: MovieId) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
            .bind(id.to_uuid())
            .fetch_one(self.pool())
            .await
            .map_err(|e| CatalogError::Database(format!("failed to check movie existence: {e}")))
    }
}
