use sqlx::{PgPool, Row};
use uuid::Uuid;

use async_trait::async_trait;
use marquee_model::{MovieId, MovieRating, UserId};

use crate::database::repository_ports::RatingRepository;
use crate::error::{CatalogError, Result};

#[derive(Clone, Debug)]
pub struct PostgresRatingRepository {
    pool: PgPool,
}

impl PostgresRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RatingRepository for PostgresRatingRepository {
    async fn rate_movie(&self, movie_id: MovieId, rating: i32, user_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO ratings (userid, movieid, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (userid, movieid) DO UPDATE
                SET rating = EXCLUDED.rating
            "#,
        )
        .bind(user_id.to_uuid())
        .bind(movie_id.to_uuid())
        .bind(rating)
        .execute(self.pool())
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            // Rating a movie that is not in the catalog is a miss, not an
            // infrastructure failure.
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Ok(false),
            Err(e) => Err(CatalogError::Database(format!(
                "failed to upsert rating: {e}"
            ))),
        }
    }

    async fn delete_rating(&self, movie_id: MovieId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ratings WHERE movieid = $1 AND userid = $2")
            .bind(movie_id.to_uuid())
            .bind(user_id.to_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| CatalogError::Database(format!("failed to delete rating: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_aggregate_rating(&self, movie_id: MovieId) -> Result<Option<f32>> {
        sqlx::query_scalar(
            r#"
            SELECT round(avg(rating), 1)::real
            FROM ratings
            WHERE movieid = $1
            "#,
        )
        .bind(movie_id.to_uuid())
        .fetch_one(self.pool())
        .await
        .map_err(|e| CatalogError::Database(format!("failed to fetch aggregate rating: {e}")))
    }

    async fn get_rating_for_user(
        &self,
        movie_id: MovieId,
        user_id: UserId,
    ) -> Result<(Option<f32>, Option<i32>)> {
        let row = sqlx::query(
            r#"
            SELECT round(avg(rating), 1)::real AS rating,
                   (SELECT rating FROM ratings
                    WHERE movieid = $1 AND userid = $2
                    LIMIT 1) AS userrating
            FROM ratings
            WHERE movieid = $1
            "#,
        )
        .bind(movie_id.to_uuid())
        .bind(user_id.to_uuid())
        .fetch_one(self.pool())
        .await
        .map_err(|e| CatalogError::Database(format!("failed to fetch rating: {e}")))?;

        let aggregate = row
            .try_get::<Option<f32>, _>("rating")
            .map_err(|e| CatalogError::Database(format!("failed to map rating: {e}")))?;
        let user_rating = row
            .try_get::<Option<i32>, _>("userrating")
            .map_err(|e| CatalogError::Database(format!("failed to map user rating: {e}")))?;

        Ok((aggregate, user_rating))
    }

    async fn get_ratings_for_user(&self, user_id: UserId) -> Result<Vec<MovieRating>> {
        let rows = sqlx::query(
            r#"
            SELECT r.movieid, m.slug, r.rating
            FROM ratings r
            INNER JOIN movies m ON m.id = r.movieid
            WHERE r.userid = $1
            "#,
        )
        .bind(user_id.to_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CatalogError::Database(format!("failed to fetch user ratings: {e}")))?;

        let mut ratings = Vec::with_capacity(rows.len());
        for row in rows {
            ratings.push(MovieRating {
                movie_id: MovieId(
                    row.try_get::<Uuid, _>("movieid").map_err(|e| {
                        CatalogError::Database(format!("failed to map movie id: {e}"))
                    })?,
                ),
                slug: row
                    .try_get("slug")
                    .map_err(|e| CatalogError::Database(format!("failed to map slug: {e}")))?,
                rating: row
                    .try_get("rating")
                    .map_err(|e| CatalogError::Database(format!("failed to map rating: {e}")))?,
            });
        }

        Ok(ratings)
    }
}
