//! Unified error taxonomy
//!
//! | Variant | Recovery |
//! |---------|----------|
//! | `Validation` | surfaced to the caller for user correction |
//! | `DuplicateEmail` | surfaced, pick another email |
//! | `NotFound` | surfaced |
//! | `InvalidState` | surfaced, transition not eligible |
//! | `Store` | fatal for the current operation, never retried here |

use crate::store::StoreError;
use thiserror::Error;

/// Core service errors
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;
