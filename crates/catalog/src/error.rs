use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("unknown {field} value '{value}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("price range minimum {min} is greater than maximum {max}")]
    InvertedPriceRange { min: f64, max: f64 },

    #[error("{field} must be a non-negative number")]
    NegativeBound { field: &'static str },

    #[error("page must be at least 1")]
    InvalidPage,

    #[error("a tokio runtime is required to debounce filter input")]
    NoRuntime,
}
