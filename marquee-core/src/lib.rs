//! # Marquee Core
//!
//! Data-access and consistency core for the Marquee movie catalog:
//! transactional repositories over movies, genres and ratings, an
//! options-driven query engine, and a read-through response cache with
//! whole-group invalidation.
//!
//! ## Architecture
//!
//! - [`query`]: options engine + validation gate for listing queries
//! - [`database::repository_ports`]: the movie/rating repository traits
//! - [`database::infrastructure`]: Postgres and in-memory adapters
//! - [`database::cache`]: output-cache port and implementations
//! - [`database::MovieDatabase`]: the facade wiring backend and cache
//!
//! The backend is chosen once, from [`config::DatabaseConfig`], at
//! process start. HTTP, authentication and authorization live outside
//! this crate; repository calls trust the caller-supplied user id.
//!
//! ## Example
//!
//! ```no_run
//! use marquee_core::{config::DatabaseConfig, database::MovieDatabase};
//! use marquee_model::{Movie, MovieId};
//!
//! async fn bootstrap() -> marquee_core::Result<()> {
//!     let config = DatabaseConfig::postgres("postgresql://localhost/marquee");
//!     let db = MovieDatabase::from_config(&config).await?;
//!
//!     let movie = Movie::new(MovieId::new(), "Alien", 1979, vec!["Horror".into()]);
//!     db.create_movie(&movie).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod query;

pub use error::{CatalogError, Result, ValidationFailure};

pub use marquee_model as model;
