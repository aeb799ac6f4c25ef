use thiserror::Error;

/// Deployment configuration mistakes, reported once at start-up
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("relevance keyword list is empty")]
    NoRelevanceKeywords,

    #[error("no categories configured")]
    NoCategories,

    #[error("category '{0}' has no keywords")]
    EmptyCategory(String),

    #[error("category '{0}' is declared more than once")]
    DuplicateCategory(String),

    #[error("capacity '{0}' must be greater than zero")]
    ZeroCapacity(&'static str),

    #[error("threshold '{name}' must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("reserved category '{0}' is not a declared category")]
    UnknownReservedCategory(String),

    #[error("summary limit '{0}' must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("unavailable-content placeholder is empty")]
    EmptyPlaceholder,
}
