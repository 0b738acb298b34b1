use async_trait::async_trait;
use marquee_model::{GetAllMoviesOptions, Movie, MovieId, UserId};

use crate::error::Result;

/// Repository port for movies and their denormalized children.
///
/// Every multi-statement write (`create`, `update`, `delete_by_id`) is a
/// single all-or-nothing unit: if any statement fails, everything done so
/// far in that call is undone and no partial state is observable. Absence
/// is a normal outcome, reported as `None`/`false`, never as an error.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Insert the movie row and all of its genre rows atomically.
    ///
    /// Returns `Ok(false)` when the slug already exists (the only
    /// conflict the store reports); infrastructure failures are `Err`.
    async fn create(&self, movie: &Movie) -> Result<bool>;

    /// Fetch one movie by id, hydrated with genres, the aggregate rating
    /// and, when `user_id` is given, that caller's own rating.
    async fn get_by_id(&self, id: MovieId, user_id: Option<UserId>) -> Result<Option<Movie>>;

    /// Same hydration as [`MovieRepository::get_by_id`], keyed by slug.
    async fn get_by_slug(&self, slug: &str, user_id: Option<UserId>) -> Result<Option<Movie>>;

    /// Filtered, sorted, paginated listing. The options must have passed
    /// the validation gate; the repository does not re-validate them.
    async fn get_all(&self, options: &GetAllMoviesOptions) -> Result<Vec<Movie>>;

    /// Count over the same filter predicate as [`MovieRepository::get_all`].
    ///
    /// Callers pass the identical title/year filters to both calls to
    /// keep pagination metadata consistent; the core does not bundle
    /// them into one round trip.
    async fn count(&self, title: Option<&str>, year_of_release: Option<i32>) -> Result<i64>;

    /// Replace the genre set (delete-then-insert) and rewrite the mutable
    /// movie fields. `Ok(false)` when no row matched the id, or when the
    /// new slug already belongs to another movie.
    async fn update(&self, movie: &Movie) -> Result<bool>;

    /// Remove ratings, genres, then the movie row in one unit.
    /// `Ok(false)` when the movie did not exist.
    async fn delete_by_id(&self, id: MovieId) -> Result<bool>;

    /// Cheap existence check, no hydration.
    async fn exists_by_id(&self, id: MovieId) -> Result<bool>;
}
