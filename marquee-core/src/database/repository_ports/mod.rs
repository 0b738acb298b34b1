//! Repository ports (interfaces) for the catalog's bounded context.
//!
//! Implementations live in the adapters under
//! `database::infrastructure` (Postgres and in-memory). Ports never leak
//! infra types into callers.

pub mod movies;
pub mod ratings;

pub use movies::MovieRepository;
pub use ratings::RatingRepository;
