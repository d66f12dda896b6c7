//! Generation-stamped content fetching.
//!
//! Every fetch takes the next generation number when it starts. When it
//! finishes, its rows are only handed out if no newer fetch has started in the
//! meantime; otherwise the result is reported as superseded and dropped.
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use futures_util::future::join_all;
use mosaic_feed::ContentItem;
use tracing::{debug, instrument, warn};

use crate::backend::{ContentSource, ObjectStore, SourceError, StoredPost};

/// Result of a fetch that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The newest fetch finished; these items form the new pool unless
    /// `generation` is overtaken before they are installed.
    Fresh {
        generation: u64,
        items: Vec<ContentItem>,
    },
    /// A newer fetch started while this one ran.
    Superseded { generation: u64 },
}

/// Fetches the content listing and resolves media paths into URLs.
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
    store: Arc<dyn ObjectStore>,
    generation: AtomicU64,
}

impl ContentLoader {
    pub fn new(source: Arc<dyn ContentSource>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            source,
            store,
            generation: AtomicU64::new(0),
        }
    }

    /// Generation of the most recently started fetch, `0` before the first.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Starts a fetch generation, invalidating every fetch still running.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Lists content and resolves every stored path concurrently.
    ///
    /// Storage failures only clear the affected item's media reference. A
    /// listing failure is returned as an error unless a newer fetch has
    /// started, in which case it is superseded like a successful one.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self) -> Result<FetchOutcome, SourceError> {
        let generation = self.begin();
        let listing = self.source.list_content_items().await;
        let items = match listing {
            Ok(rows) => Some(join_all(rows.iter().map(|row| self.resolve(row))).await),
            Err(err) if self.is_current(generation) => return Err(err),
            Err(_) => None,
        };

        match items {
            Some(items) if self.is_current(generation) => {
                debug!(generation, items = items.len(), "fetch complete");
                Ok(FetchOutcome::Fresh { generation, items })
            }
            _ => {
                debug!(
                    generation,
                    current = self.generation(),
                    "discarding stale fetch"
                );
                Ok(FetchOutcome::Superseded { generation })
            }
        }
    }

    async fn resolve(&self, row: &StoredPost) -> ContentItem {
        let Some(path) = row.trimmed_path() else {
            return ContentItem::new(row.id.clone(), None);
        };
        let media_ref = match self.store.resolve_url(path).await {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(id = %row.id, %err, "media reference unavailable");
                None
            }
        };
        ContentItem::new(row.id.clone(), media_ref)
    }
}

impl std::fmt::Debug for ContentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentLoader")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
