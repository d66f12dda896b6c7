use mosaic_feed::FeedError;
use thiserror::Error;

use crate::backend::SourceError;

/// Errors surfaced by [`crate::FeedController::refresh`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] SourceError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// The shared runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
