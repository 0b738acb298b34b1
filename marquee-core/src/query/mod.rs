//! Query options engine and validation gate.
//!
//! Raw listing input (straight off the wire, outside this crate's
//! concern) is normalized into [`marquee_model::GetAllMoviesOptions`]
//! here and checked against the catalog's rules before any repository
//! call happens.

pub mod options;
pub mod validation;

pub use options::{RawMovieQuery, SortToken};
pub use validation::validate_options;
