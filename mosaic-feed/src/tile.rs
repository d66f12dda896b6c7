//! Content items, placed tiles, and the identifiers attached to them.
use std::{borrow::Cow, fmt, str::FromStr};

use rustc_hash::FxHashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::TileFootprint;

/// Identifier of a content item as issued by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the content pool.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentItem {
    pub id: ContentId,
    /// Displayable URL; `None` when storage could not resolve it.
    pub media_ref: Option<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<ContentId>, media_ref: Option<String>) -> Self {
        Self {
            id: id.into(),
            media_ref,
        }
    }
}

/// Content ids already placed in the current layout session.
pub type ConsumedIds = FxHashSet<ContentId>;

/// A 24-bit RGB fill color, displayed as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub struct Color(u32);

impl Color {
    /// Builds a color from the low 24 bits of `rgb`.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0xFF_FF_FF)
    }

    pub const fn rgb(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Error returned when parsing a `#RRGGBB` string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{0}`, expected #RRGGBB")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6)
            .ok_or_else(|| ParseColorError(s.to_owned()))?;
        u32::from_str_radix(hex, 16)
            .map(Self::from_rgb)
            .map_err(|_| ParseColorError(s.to_owned()))
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Render key of a placed tile, unique within one session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TileKey(String);

impl TileKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a filler tile was placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillerOrigin {
    /// The content pool was empty.
    EmptyPool,
    /// Remaining budget after content placement.
    Padding,
}

/// Per-session key counter.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    next: u64,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&mut self, id: &ContentId) -> TileKey {
        let n = self.bump();
        TileKey(format!("post-{id}-{n}"))
    }

    pub fn filler(&mut self, origin: FillerOrigin) -> TileKey {
        let n = self.bump();
        let prefix = match origin {
            FillerOrigin::EmptyPool => "empty",
            FillerOrigin::Padding => "color",
        };
        TileKey(format!("{prefix}-{n}"))
    }

    /// Number of keys handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }

    fn bump(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }
}

/// What a placed tile shows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum TileKind {
    Content {
        source_id: ContentId,
        media_ref: Option<String>,
    },
    Filler {
        fill: Color,
    },
}

/// A tile in the mosaic, in grid fill order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedTile {
    pub key: TileKey,
    pub footprint: TileFootprint,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: TileKind,
}

impl PlacedTile {
    pub(crate) fn content(key: TileKey, footprint: TileFootprint, item: &ContentItem) -> Self {
        Self {
            key,
            footprint,
            kind: TileKind::Content {
                source_id: item.id.clone(),
                media_ref: item.media_ref.clone(),
            },
        }
    }

    pub(crate) fn filler(key: TileKey, footprint: TileFootprint, fill: Color) -> Self {
        Self {
            key,
            footprint,
            kind: TileKind::Filler { fill },
        }
    }

    /// Source content id, or `""` for filler tiles.
    pub fn source_id(&self) -> &str {
        match &self.kind {
            TileKind::Content { source_id, .. } => source_id.as_str(),
            TileKind::Filler { .. } => "",
        }
    }

    pub fn media_ref(&self) -> Option<&str> {
        match &self.kind {
            TileKind::Content { media_ref, .. } => media_ref.as_deref(),
            TileKind::Filler { .. } => None,
        }
    }

    pub fn fill_color(&self) -> Option<Color> {
        match self.kind {
            TileKind::Filler { fill } => Some(fill),
            TileKind::Content { .. } => None,
        }
    }

    pub fn is_filler(&self) -> bool {
        matches!(self.kind, TileKind::Filler { .. })
    }

    pub fn cells(&self) -> usize {
        self.footprint.cells()
    }

    /// Navigation target: the comment thread for content with media, `#`
    /// otherwise.
    pub fn link_target(&self) -> Cow<'static, str> {
        match &self.kind {
            TileKind::Content {
                source_id,
                media_ref: Some(_),
            } if !source_id.as_str().is_empty() => Cow::Owned(format!("/comments/{source_id}")),
            _ => Cow::Borrowed("#"),
        }
    }
}
