//! Near-end detection for infinite scrolling.
//!
//! ## Usage
//!
//! Feed scroll metrics to [`ScrollTrigger::observe`]. When the end sentinel is
//! within the proximity margin and no load is running, it hands out a
//! [`LoadTicket`]; the load is considered in flight until the ticket drops.
//!
//! ```
//! use mosaic_feed::trigger::{ScrollTrigger, ViewportMetrics};
//!
//! let trigger = ScrollTrigger::new(200.0);
//! let metrics = ViewportMetrics::new(1000.0, 800.0, 1900.0);
//!
//! let ticket = trigger.observe(metrics).expect("sentinel is near");
//! assert!(trigger.observe(metrics).is_none());
//! drop(ticket);
//! assert!(trigger.observe(metrics).is_some());
//! ```
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::trace;

use crate::signal::{Signal, Subscription};

/// Scroll position of the host relative to the end-of-tiles sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    /// Distance scrolled from the top of the content.
    pub scroll_offset: f32,
    /// Height of the visible area.
    pub viewport_height: f32,
    /// Offset of the sentinel from the top of the content.
    pub sentinel_offset: f32,
}

impl ViewportMetrics {
    pub const fn new(scroll_offset: f32, viewport_height: f32, sentinel_offset: f32) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            sentinel_offset,
        }
    }

    /// Pixels between the bottom of the viewport and the sentinel; negative
    /// once the sentinel is visible.
    pub fn distance_to_sentinel(&self) -> f32 {
        self.sentinel_offset - (self.scroll_offset + self.viewport_height)
    }
}

/// Fires at most one load at a time when the sentinel comes near.
#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    proximity: f32,
    in_flight: Arc<AtomicBool>,
}

impl ScrollTrigger {
    pub fn new(proximity_px: f32) -> Self {
        Self {
            proximity: proximity_px.max(0.0),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn proximity(&self) -> f32 {
        self.proximity
    }

    /// Whether the sentinel is within the proximity margin.
    pub fn is_near_end(&self, metrics: ViewportMetrics) -> bool {
        metrics.distance_to_sentinel() <= self.proximity
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the in-flight slot; `None` while another ticket is alive.
    pub fn try_begin(&self) -> Option<LoadTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadTicket {
                in_flight: self.in_flight.clone(),
            })
    }

    /// [`Self::try_begin`] gated on [`Self::is_near_end`].
    pub fn observe(&self, metrics: ViewportMetrics) -> Option<LoadTicket> {
        if !self.is_near_end(metrics) {
            return None;
        }
        let ticket = self.try_begin();
        if ticket.is_none() {
            trace!("near end while a load is in flight, ignoring");
        }
        ticket
    }
}

/// Marks a load as in flight until dropped.
#[derive(Debug)]
#[must_use = "the load stops being in flight when the ticket is dropped"]
pub struct LoadTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for LoadTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Host capability that reports when the end of the tiles comes near.
pub trait NearEndSource {
    /// Calls `callback` on every near-end notification until the returned
    /// subscription is dropped.
    fn on_near_end(&self, callback: Box<dyn Fn() + Send + Sync>) -> Subscription;
}

impl NearEndSource for Signal<()> {
    fn on_near_end(&self, callback: Box<dyn Fn() + Send + Sync>) -> Subscription {
        self.subscribe(move |_| callback())
    }
}
