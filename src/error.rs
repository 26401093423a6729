// ⚠️ Error types for catalog lookups and predictions
//
// A missing name is always an error. A fuzzy no-match is not: Matcher
// returns None and only the predict() convenience flow turns it into
// PredictionError::NoMatch.

use rust_decimal::Decimal;

/// Errors raised while building or reading the catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// Name is not a key of the catalog.
    #[error("'{name}' not found in catalog")]
    NotFound { name: String },

    /// The same name appears twice in the reference table.
    #[error("duplicate catalog entry: '{name}'")]
    DuplicateEntry { name: String },

    /// Entry failed validation (empty name, negative price).
    #[error("invalid catalog entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },

    /// A CSV row could not be read or parsed.
    #[error("failed to read catalog CSV: {0}")]
    Csv(String),
}

impl CatalogError {
    pub fn not_found(name: impl Into<String>) -> Self {
        CatalogError::NotFound { name: name.into() }
    }

    pub(crate) fn negative_price(name: &str, value: Decimal) -> Self {
        CatalogError::InvalidEntry {
            name: name.to_string(),
            reason: format!("base value {} is negative", value),
        }
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        CatalogError::Csv(err.to_string())
    }
}

/// Errors from the match-then-estimate flow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// No catalog name scored at or above the match threshold.
    #[error("no catalog entry matches '{query}'")]
    NoMatch { query: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors from configuring the fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// Scores run 0-100, so a higher threshold could never match.
    #[error("match threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(u8),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
