//! In-memory backing store.
//!
//! Selected by configuration for tests and ephemeral deployments. Both
//! repositories share one [`MemoryStore`] behind a single lock, so a
//! cascade delete and the rating joins always observe one consistent
//! world, mirroring what the Postgres adapters guarantee with
//! transactions.

pub mod movies;
pub mod ratings;

pub use movies::InMemoryMovieRepository;
pub use ratings::InMemoryRatingRepository;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use marquee_model::{MovieId, UserId};

#[derive(Debug, Clone)]
pub(crate) struct StoredMovie {
    pub id: MovieId,
    pub slug: String,
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    /// Insertion order is preserved; an unsorted listing pages over it.
    pub movies: Vec<StoredMovie>,
    pub ratings: HashMap<(MovieId, UserId), i32>,
}

impl MemoryState {
    /// Mean of all ratings for a movie, rounded to one decimal place the
    /// way the Postgres backend rounds in SQL.
    pub fn aggregate_rating(&self, movie_id: MovieId) -> Option<f32> {
        let values: Vec<i32> = self
            .ratings
            .iter()
            .filter(|((m, _), _)| *m == movie_id)
            .map(|(_, &rating)| rating)
            .collect();

        if values.is_empty() {
            return None;
        }

        let mean = values.iter().sum::<i32>() as f32 / values.len() as f32;
        Some((mean * 10.0).round() / 10.0)
    }

    pub fn user_rating(&self, movie_id: MovieId, user_id: UserId) -> Option<i32> {
        self.ratings.get(&(movie_id, user_id)).copied()
    }
}

/// Shared state behind both in-memory repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}
