//! Error types for the layout engine.
use thiserror::Error;

/// Errors reported by feed sessions and configuration checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid feed config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    /// The planner was asked to run before a content pool was fetched.
    #[error("content pool has not been loaded yet")]
    PoolNotLoaded,
    /// An extension was requested while another one is still running.
    #[error("an extension is already in flight")]
    ExtensionInFlight,
    /// Viewport dimensions must be finite and positive.
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    /// The viewport and config ask for more cells than one pass may plan.
    #[error("cell budget of {cells} exceeds the limit of {limit}")]
    BudgetTooLarge { cells: usize, limit: usize },
}

impl FeedError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = FeedError> = std::result::Result<T, E>;
