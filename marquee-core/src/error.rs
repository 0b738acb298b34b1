use thiserror::Error;

/// A single violated validation rule, named by the offending field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error taxonomy of the catalog core.
///
/// Not-found stays absence (`Option`/`false`) and a duplicate slug on
/// create stays `Ok(false)`; neither is an error variant. Everything that
/// reaches `Database` is infrastructure trouble and is not retried here.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("validation failed ({} rule(s) violated)", .0.len())]
    Validation(Vec<ValidationFailure>),
}

impl CatalogError {
    /// The enumerable failure list, when this is a validation error.
    pub fn validation_failures(&self) -> Option<&[ValidationFailure]> {
        match self {
            Self::Validation(failures) => Some(failures),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
