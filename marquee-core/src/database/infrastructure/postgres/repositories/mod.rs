pub mod movies;
pub mod ratings;

pub use movies::PostgresMovieRepository;
pub use ratings::PostgresRatingRepository;
