use std::sync::Arc;

use async_trait::async_trait;
use marquee_model::{GetAllMoviesOptions, Movie, MovieId, SortField, SortOrder, UserId};

use super::{MemoryState, MemoryStore, StoredMovie};
use crate::database::repository_ports::MovieRepository;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct InMemoryMovieRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryMovieRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn hydrate(state: &MemoryState, stored: &StoredMovie, user_id: Option<UserId>) -> Movie {
        Movie {
            id: stored.id,
            title: stored.title.clone(),
            year_of_release: stored.year_of_release,
            slug: stored.slug.clone(),
            genres: stored.genres.clone(),
            rating: state.aggregate_rating(stored.id),
            user_rating: user_id.and_then(|u| state.user_rating(stored.id, u)),
        }
    }

    fn matches(stored: &StoredMovie, title: Option<&str>, year: Option<i32>) -> bool {
        if let Some(title) = title
            && !stored.title.contains(title)
        {
            return false;
        }
        if let Some(year) = year
            && stored.year_of_release != year
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn create(&self, movie: &Movie) -> Result<bool> {
        let mut state = self.store.state.write().await;

        if state.movies.iter().any(|m| m.slug == movie.slug) {
            return Ok(false);
        }

        state.movies.push(StoredMovie {
            id: movie.id,
            slug: movie.slug.clone(),
            title: movie.title.clone(),
            year_of_release: movie.year_of_release,
            genres: movie.genres.clone(),
        });

        Ok(true)
    }

    async fn get_by_id(&self, id: MovieId, user_id: Option<UserId>) -> Result<Option<Movie>> {
        let state = self.store.state.read().await;
        Ok(state
            .movies
            .iter()
            .find(|m| m.id == id)
            .map(|m| Self::hydrate(&state, m, user_id)))
    }

    async fn get_by_slug(&self, slug: &str, user_id: Option<UserId>) -> Result<Option<Movie>> {
        let state = self.store.state.read().await;
        Ok(state
            .movies
            .iter()
            .find(|m| m.slug == slug)
            .map(|m| Self::hydrate(&state, m, user_id)))
    }

    async fn get_all(&self, options: &GetAllMoviesOptions) -> Result<Vec<Movie>> {
        let state = self.store.state.read().await;

        let mut filtered: Vec<&StoredMovie> = state
            .movies
            .iter()
            .filter(|m| Self::matches(m, options.title.as_deref(), options.year_of_release))
            .collect();

        if let Some(field) = options.sort_field {
            filtered.sort_by(|a, b| {
                let ordering = match field {
                    SortField::Title => a.title.cmp(&b.title),
                    SortField::YearOfRelease => a.year_of_release.cmp(&b.year_of_release),
                };
                match options.sort_order {
                    SortOrder::Descending => ordering.reverse(),
                    _ => ordering,
                }
            });
        }

        let page = filtered
            .into_iter()
            .skip(options.offset() as usize)
            .take(options.page_size as usize)
            .map(|m| Self::hydrate(&state, m, options.user_id))
            .collect();

        Ok(page)
    }

    async fn count(&self, title: Option<&str>, year_of_release: Option<i32>) -> Result<i64> {
        let state = self.store.state.read().await;
        Ok(state
            .movies
            .iter()
            .filter(|m| Self::matches(m, title, year_of_release))
            .count() as i64)
    }

    async fn update(&self, movie: &Movie) -> Result<bool> {
        let mut state = self.store.state.write().await;

        let Some(index) = state.movies.iter().position(|m| m.id == movie.id) else {
            return Ok(false);
        };

        // Renaming onto another movie's slug is the same conflict create
        // reports.
        if state
            .movies
            .iter()
            .any(|m| m.slug == movie.slug && m.id != movie.id)
        {
            return Ok(false);
        }

        state.movies[index] = StoredMovie {
            id: movie.id,
            slug: movie.slug.clone(),
            title: movie.title.clone(),
            year_of_release: movie.year_of_release,
            genres: movie.genres.clone(),
        };

        Ok(true)
    }

    async fn delete_by_id(&self, id: MovieId) -> Result<bool> {
        let mut state = self.store.state.write().await;

        let before = state.movies.len();
        state.movies.retain(|m| m.id != id);
        let removed = state.movies.len() < before;

        if removed {
            state.ratings.retain(|(movie_id, _), _| *movie_id != id);
        }

        Ok(removed)
    }

    async fn exists_by_id(&self, id: MovieId) -> Result<bool> {
        let state = self.store.state.read().await;
        Ok(state.movies.iter().any(|m| m.id == id))
    }
}
