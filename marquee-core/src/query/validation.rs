use chrono::{Datelike, Utc};
use marquee_model::{
    GetAllMoviesOptions, SortField, SortOrder,
    options::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
};

use crate::error::{CatalogError, Result, ValidationFailure};
use crate::query::options::{RawMovieQuery, SortToken};

/// Validation gate for listing queries.
///
/// Runs every rule in one pass and returns the full failure list, so a
/// caller fixing its request sees all problems at once. Nothing touches
/// the store before this succeeds. Out-of-range values are rejected,
/// never clamped.
pub fn validate_options(raw: &RawMovieQuery) -> Result<GetAllMoviesOptions> {
    let mut failures = Vec::new();

    let (sort_field, sort_order) = match raw.sort_by.as_deref() {
        None => (None, SortOrder::Unsorted),
        Some(token) => {
            let token = SortToken::parse(token);
            match token.resolve() {
                Some(field) => (Some(field), token.order),
                None => {
                    failures.push(ValidationFailure::new(
                        "sortBy",
                        format!(
                            "sort field must be one of the following: {}",
                            SortField::ALLOWED.join(", ")
                        ),
                    ));
                    (None, SortOrder::Unsorted)
                }
            }
        }
    };

    if let Some(year) = raw.year_of_release {
        let current_year = Utc::now().year();
        if year > current_year {
            failures.push(ValidationFailure::new(
                "yearOfRelease",
                format!("year of release cannot be later than {current_year}"),
            ));
        }
    }

    let page = raw.page.unwrap_or(DEFAULT_PAGE);
    if page < 1 {
        failures.push(ValidationFailure::new("page", "page must be at least 1"));
    }

    let page_size = raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        failures.push(ValidationFailure::new(
            "pageSize",
            format!("you can only request between 1 and {MAX_PAGE_SIZE} movies at a time"),
        ));
    }

    if !failures.is_empty() {
        return Err(CatalogError::Validation(failures));
    }

    Ok(GetAllMoviesOptions {
        title: raw.title.clone(),
        year_of_release: raw.year_of_release,
        user_id: raw.user_id,
        sort_field,
        sort_order,
        page,
        page_size,
    })
}
