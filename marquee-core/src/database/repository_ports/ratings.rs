use async_trait::async_trait;
use marquee_model::{MovieId, MovieRating, UserId};

use crate::error::Result;

/// Repository port for per-user ratings and their aggregates.
///
/// The 1..=5 range is enforced upstream; this port trusts the caller.
/// Concurrent submissions for the same `(movie, user)` pair resolve
/// through the store's upsert, last writer wins.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert or overwrite the rating for `(movie_id, user_id)`. Never
    /// duplicates a row. `Ok(false)` when the movie does not exist.
    async fn rate_movie(&self, movie_id: MovieId, rating: i32, user_id: UserId) -> Result<bool>;

    /// Remove the rating if present; `Ok(false)` when there was none.
    async fn delete_rating(&self, movie_id: MovieId, user_id: UserId) -> Result<bool>;

    /// Mean of all ratings for the movie, one decimal place. `None` when
    /// the movie has no ratings at all.
    async fn get_aggregate_rating(&self, movie_id: MovieId) -> Result<Option<f32>>;

    /// Aggregate and the given user's own rating in one round trip, for
    /// single-movie views that need both.
    async fn get_rating_for_user(
        &self,
        movie_id: MovieId,
        user_id: UserId,
    ) -> Result<(Option<f32>, Option<i32>)>;

    /// Everything the user has rated, joined with movie identity so the
    /// caller can render rows without a per-row lookup.
    async fn get_ratings_for_user(&self, user_id: UserId) -> Result<Vec<MovieRating>>;
}
