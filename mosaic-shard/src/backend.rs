//! Collaborators the loader talks to: the content listing and object storage.
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::{BoxFuture, FutureExt};
use mosaic_feed::ContentId;
use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a [`ContentSource`] or an [`ObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The content listing could not be fetched.
    #[error("content source unavailable: {0}")]
    Unavailable(String),
    /// A stored path could not be turned into a URL.
    #[error("cannot resolve `{path}`: {reason}")]
    Storage { path: String, reason: String },
}

/// One row of the content listing, before its media path is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoredPost {
    pub id: ContentId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content_path: Option<String>,
}

impl StoredPost {
    pub fn new(id: impl Into<ContentId>, content_path: Option<&str>) -> Self {
        Self {
            id: id.into(),
            content_path: content_path.map(str::to_owned),
        }
    }

    /// Stored path with surrounding whitespace removed; blank paths count as
    /// missing.
    pub fn trimmed_path(&self) -> Option<&str> {
        self.content_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

/// Lists every content item, newest first.
pub trait ContentSource: Send + Sync {
    fn list_content_items(&self) -> BoxFuture<'_, Result<Vec<StoredPost>, SourceError>>;
}

/// Turns stored paths into displayable URLs.
pub trait ObjectStore: Send + Sync {
    fn resolve_url<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, SourceError>>;
}

/// Object store whose objects are served from a public base URL.
#[derive(Clone, Debug)]
pub struct PublicUrlStore {
    base_url: String,
}

impl PublicUrlStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn join(&self, path: &str) -> Result<String, SourceError> {
        let path = path.trim().trim_start_matches('/');
        if path.is_empty() {
            return Err(SourceError::Storage {
                path: path.to_owned(),
                reason: "empty object path".to_owned(),
            });
        }
        if self.base_url.is_empty() {
            return Ok(path.to_owned());
        }
        Ok(format!("{}/{}", self.base_url, path))
    }
}

impl ObjectStore for PublicUrlStore {
    fn resolve_url<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, SourceError>> {
        let url = self.join(path);
        async move { url }.boxed()
    }
}

/// In-memory content listing, used by the CLI and tests.
#[derive(Debug, Default)]
pub struct StaticContentSource {
    rows: RwLock<Vec<StoredPost>>,
    failure: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl StaticContentSource {
    pub fn new(rows: Vec<StoredPost>) -> Self {
        Self {
            rows: RwLock::new(rows),
            ..Default::default()
        }
    }

    /// A source whose every listing fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let source = Self::default();
        source.fail_with(message);
        source
    }

    pub fn set_rows(&self, rows: Vec<StoredPost>) {
        *self.rows.write() = rows;
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    /// Number of listings requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ContentSource for StaticContentSource {
    fn list_content_items(&self) -> BoxFuture<'_, Result<Vec<StoredPost>, SourceError>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let result = match self.failure.read().clone() {
            Some(message) => Err(SourceError::Unavailable(message)),
            None => Ok(self.rows.read().clone()),
        };
        async move { result }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_paths_count_as_missing() {
        assert_eq!(StoredPost::new("1", Some("  a/b.png ")).trimmed_path(), Some("a/b.png"));
        assert_eq!(StoredPost::new("2", Some("   ")).trimmed_path(), None);
        assert_eq!(StoredPost::new("3", None).trimmed_path(), None);
    }

    #[test]
    fn public_store_joins_base_and_path() {
        let store = PublicUrlStore::new("https://cdn.example/public/");
        assert_eq!(store.base_url(), "https://cdn.example/public");
        assert_eq!(
            store.join("/posts/1.png"),
            Ok("https://cdn.example/public/posts/1.png".to_owned())
        );
        assert!(matches!(store.join(" / "), Err(SourceError::Storage { .. })));
    }

    #[test]
    fn empty_base_passes_paths_through() {
        let store = PublicUrlStore::new("");
        assert_eq!(store.join("https://x/y.jpg"), Ok("https://x/y.jpg".to_owned()));
    }

    #[test]
    fn static_source_can_fail_and_recover() {
        let source = StaticContentSource::failing("offline");
        let listing = futures_util::FutureExt::now_or_never(source.list_content_items());
        assert_eq!(
            listing,
            Some(Err(SourceError::Unavailable("offline".to_owned())))
        );

        source.recover();
        source.set_rows(vec![StoredPost::new("a", None)]);
        let listing = futures_util::FutureExt::now_or_never(source.list_content_items());
        assert_eq!(listing, Some(Ok(vec![StoredPost::new("a", None)])));
        assert_eq!(source.calls(), 2);
    }
}
