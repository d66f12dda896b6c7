//! Async plumbing around [`mosaic_feed`] sessions.
//!
//! [`ContentLoader`] fetches the content listing, resolves media paths through
//! an [`ObjectStore`] and discards fetches overtaken by newer ones.
//! [`FeedController`] owns the session, reports a [`FeedStatus`] for the
//! renderer and wires near-end and resize notifications into it.
pub mod backend;
pub mod controller;
mod error;
pub mod loader;
pub mod runtime;

pub use crate::{
    backend::{
        ContentSource, ObjectStore, PublicUrlStore, SourceError, StaticContentSource, StoredPost,
    },
    controller::{Attachment, FeedController, FeedSnapshot, FeedStatus, RefreshOutcome},
    error::LoadError,
    loader::{ContentLoader, FetchOutcome},
};
