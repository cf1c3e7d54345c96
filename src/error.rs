//! Error taxonomy for a single pipeline pass.

use std::time::Duration;

/// Ways a pipeline pass can abort. An aborted pass leaves the previously
/// published artifact untouched; the next scheduled tick is the retry.
///
/// A zone token that matches no block is deliberately not represented here:
/// that is a normal outcome the renderer answers with a placeholder document.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("publish failed: {0}")]
    Publish(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
