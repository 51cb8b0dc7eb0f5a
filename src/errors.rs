// src/errors.rs
// DOCUMENTATION: Custom error types for the scraper
// PURPOSE: Centralized error handling for ingestion, persistence and exports

use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Upstream and store variants are recovered locally; only configuration and
/// input errors are fatal to a run
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ScraperError {
    /// Short machine-readable code for log lines and sink reports
    pub fn code(&self) -> &'static str {
        match self {
            ScraperError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            ScraperError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ScraperError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            ScraperError::DatabaseError(_) => "DATABASE_ERROR",
            ScraperError::ExportError(_) => "EXPORT_ERROR",
            ScraperError::ConfigError(_) => "CONFIG_ERROR",
            ScraperError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

impl From<std::io::Error> for ScraperError {
    fn from(e: std::io::Error) -> Self {
        ScraperError::ExportError(format!("I/O failure: {}", e))
    }
}

impl From<csv::Error> for ScraperError {
    fn from(e: csv::Error) -> Self {
        ScraperError::ExportError(format!("CSV failure: {}", e))
    }
}

impl From<serde_json::Error> for ScraperError {
    fn from(e: serde_json::Error) -> Self {
        ScraperError::ExportError(format!("JSON failure: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ScraperError::RateLimitExceeded.code(), "RATE_LIMIT_EXCEEDED");
        assert_eq!(
            ScraperError::StoreUnavailable("down".into()).code(),
            "STORE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_io_conversion_is_export_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: ScraperError = io.into();
        assert!(matches!(err, ScraperError::ExportError(_)));
        assert!(err.to_string().contains("nope"));
    }
}
