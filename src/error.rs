//! Grepable error codes shared by every service error type.
//!
//! DESIGN
//! ======
//! Services define their own `thiserror` enums. Each one implements
//! `ErrorCode` so the HTTP layer can render a uniform error body without
//! knowing which service produced it.

use serde::Serialize;

/// Machine-readable code attached to a service error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}
