use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ids::MovieId;

static SLUG_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9a-z _-]").expect("slug pattern is valid"));

/// Derive the URL-safe slug for a title/year pair.
///
/// Lowercases the title, strips everything outside `[0-9a-z _-]`,
/// collapses spaces to dashes and appends the release year. The slug is
/// the alternate lookup key for a movie and is unique in the store.
pub fn slugify(title: &str, year_of_release: i32) -> String {
    let lowered = title.to_lowercase();
    let cleaned = SLUG_DISALLOWED.replace_all(&lowered, "");
    let dashed = cleaned.trim().replace(' ', "-");
    format!("{dashed}-{year_of_release}")
}

/// A catalog entry.
///
/// Only `id`, `title`, `year_of_release` and `genres` are persisted on the
/// movie itself; `rating` and `user_rating` are computed from the ratings
/// table at read time and are never stored on the movie row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year_of_release: i32,
    pub slug: String,
    pub genres: Vec<String>,
    /// Mean of all user ratings, one decimal place. `None` when unrated.
    pub rating: Option<f32>,
    /// The requesting user's own rating, when a user scope was supplied.
    pub user_rating: Option<i32>,
}

impl Movie {
    /// Build a new movie with its slug derived from title and year.
    pub fn new(id: MovieId, title: impl Into<String>, year_of_release: i32, genres: Vec<String>) -> Self {
        let title = title.into();
        let slug = slugify(&title, year_of_release);
        Self {
            id,
            title,
            year_of_release,
            slug,
            genres,
            rating: None,
            user_rating: None,
        }
    }

    /// Recompute the slug after a title or year change.
    ///
    /// Mutation paths call this before handing the movie to the
    /// repository so the persisted slug always matches title + year.
    pub fn regenerate_slug(&mut self) {
        self.slug = slugify(&self.title, self.year_of_release);
    }
}

/// One row of a user's rating history: enough movie identity to render a
/// listing without a second lookup per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRating {
    pub movie_id: MovieId,
    pub slug: String,
    pub rating: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_dashes() {
        assert_eq!(slugify("Nick The Greek", 2022), "nick-the-greek-2022");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(slugify("Spider-Man: No Way Home", 2021), "spider-man-no-way-home-2021");
    }

    #[test]
    fn regenerate_tracks_title_change() {
        let mut movie = Movie::new(MovieId::new(), "Alien", 1979, vec!["Horror".into()]);
        assert_eq!(movie.slug, "alien-1979");
        movie.title = "Aliens".into();
        movie.year_of_release = 1986;
        movie.regenerate_slug();
        assert_eq!(movie.slug, "aliens-1986");
    }
}
