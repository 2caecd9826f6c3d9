//! Error types for E2E testing

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright error: {0}")]
    Driver(#[from] playwright_rs::Error),

    #[error("Application not reachable at {url} after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Expected route {expected}, browser is at {actual}")]
    RouteMismatch { expected: String, actual: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Fixture not found: {}", .0.display())]
    FixtureMissing(PathBuf),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Whether this error means the scenario could not run rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, E2eError::FixtureMissing(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail with [`E2eError::AssertionFailed`] unless `cond` holds.
pub fn ensure(cond: bool, message: impl Into<String>) -> E2eResult<()> {
    if cond {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message.into()))
    }
}
