use marquee_model::{SortField, SortOrder, UserId};

/// Unvalidated listing input as the caller supplied it.
///
/// `sort_by` carries the raw sort token (`title`, `+title`, `-yearofrelease`,
/// ...); nothing here has been checked yet. The validation gate turns this
/// into a canonical [`marquee_model::GetAllMoviesOptions`] or rejects it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovieQuery {
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub user_id: Option<UserId>,
}

/// A parsed sort token: direction prefix plus the bare field name.
///
/// Grammar: an optional leading `+` or `-` selects ascending/descending;
/// a bare token sorts ascending. The field itself is *not* resolved here,
/// so unknown fields survive to the gate and fail loudly instead of being
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortToken {
    pub field: String,
    pub order: SortOrder,
}

impl SortToken {
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                order: SortOrder::Descending,
            },
            None => Self {
                field: token.strip_prefix('+').unwrap_or(token).to_string(),
                order: SortOrder::Ascending,
            },
        }
    }

    /// Resolve the field against the allow-list.
    pub fn resolve(&self) -> Option<SortField> {
        SortField::parse(&self.field)
    }
}
