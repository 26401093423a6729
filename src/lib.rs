// Veggie Price Predictor - Core Library
// Catalog lookup, fuzzy name matching and mock price estimation for the UI and CLI

pub mod error;
pub mod catalog;
pub mod matcher;
pub mod estimator;

// Re-export commonly used types
pub use error::{CatalogError, MatcherError, PredictionError};
pub use catalog::{Catalog, CatalogEntry};
pub use matcher::{fuzzy_match, similarity, Matcher, ScoredCandidate, DEFAULT_THRESHOLD, MAX_SCORE};
pub use estimator::{EstimationResult, Estimator, Method, Trend, TrendPoint, CURRENCY_SYMBOL};
