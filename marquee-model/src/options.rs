use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Fields the catalog can sort on. Anything outside this allow-list is a
/// validation failure, never a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    YearOfRelease,
}

impl SortField {
    pub const ALLOWED: [&'static str; 2] = ["title", "yearofrelease"];

    /// Case-insensitive match against the allow-list.
    pub fn parse(field: &str) -> Option<Self> {
        match field.to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "yearofrelease" => Some(Self::YearOfRelease),
            _ => None,
        }
    }

    /// Column name as it appears in the backing store.
    pub fn as_column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::YearOfRelease => "yearofrelease",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_column())
    }
}

/// Sort direction. `Unsorted` means storage order, not a default column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

/// Canonical query shape for catalog listings.
///
/// Transient: built per request by the query options engine, checked by
/// the validation gate, discarded after the repository call. `user_id`
/// scopes the `user_rating` projection only; it never filters rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GetAllMoviesOptions {
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
    pub user_id: Option<UserId>,
    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 25;

impl Default for GetAllMoviesOptions {
    fn default() -> Self {
        Self {
            title: None,
            year_of_release: None,
            user_id: None,
            sort_field: None,
            sort_order: SortOrder::Unsorted,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GetAllMoviesOptions {
    /// Row offset for the current page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}
