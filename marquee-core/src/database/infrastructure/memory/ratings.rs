use std::sync::Arc;

use async_trait::async_trait;
use marquee_model::{MovieId, MovieRating, UserId};

use super::MemoryStore;
use crate::database::repository_ports::RatingRepository;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct InMemoryRatingRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryRatingRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn rate_movie(&self, movie_id: MovieId, rating: i32, user_id: UserId) -> Result<bool> {
        let mut state = self.store.state.write().await;

        if !state.movies.iter().any(|m| m.id == movie_id) {
            return Ok(false);
        }

        state.ratings.insert((movie_id, user_id), rating);
        Ok(true)
    }

    async fn delete_rating(&self, movie_id: MovieId, user_id: UserId) -> Result<bool> {
        let mut state = self.store.state.write().await;
        Ok(state.ratings.remove(&(movie_id, user_id)).is_some())
    }

    async fn get_aggregate_rating(&self, movie_id: MovieId) -> Result<Option<f32>> {
        let state = self.store.state.read().await;
        Ok(state.aggregate_rating(movie_id))
    }

    async fn get_rating_for_user(
        &self,
        movie_id: MovieId,
        user_id: UserId,
    ) -> Result<(Option<f32>, Option<i32>)> {
        let state = self.store.state.read().await;
        Ok((
            state.aggregate_rating(movie_id),
            state.user_rating(movie_id, user_id),
        ))
    }

    async fn get_ratings_for_user(&self, user_id: UserId) -> Result<Vec<MovieRating>> {
        let state = self.store.state.read().await;

        let mut ratings = Vec::new();
        for ((movie_id, rated_by), &rating) in &state.ratings {
            if *rated_by != user_id {
                continue;
            }
            let Some(movie) = state.movies.iter().find(|m| m.id == *movie_id) else {
                continue;
            };
            ratings.push(MovieRating {
                movie_id: *movie_id,
                slug: movie.slug.clone(),
                rating,
            });
        }

        Ok(ratings)
    }
}
