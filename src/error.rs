//! Engine error types.
//!
//! A learner or cohort without data is not an error; engine operations
//! return `Ok(None)` for that case.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The score store could not complete the read.
    #[error("score store read failed: {0:#}")]
    Store(anyhow::Error),
}
