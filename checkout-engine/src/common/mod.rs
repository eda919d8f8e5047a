//! Shared infrastructure: error taxonomy and logging

pub mod error;
pub mod logger;

pub use error::{CoreError, CoreResult};
