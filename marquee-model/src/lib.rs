//! Domain types for the Marquee movie catalog.
//!
//! This crate is intentionally free of storage concerns: it defines the
//! entities the repositories in `marquee-core` persist and hydrate, plus
//! the query-option types callers build to page through the catalog.

pub mod ids;
pub mod movie;
pub mod options;

pub use ids::{MovieId, UserId};
pub use movie::{Movie, MovieRating, slugify};
pub use options::{GetAllMoviesOptions, SortField, SortOrder};
