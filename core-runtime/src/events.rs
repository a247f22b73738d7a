//! # Event Bus
//!
//! Broadcast channel carrying progress and completion events from the sync
//! and enrichment engines to whatever surface is listening (a UI, a host
//! shell, a test). Emission is fire-and-forget: an event with no subscribers
//! is dropped, and lagging subscribers lose the oldest events first.

use tokio::sync::broadcast;

/// Top-level event type emitted by the core
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Album synchronization events
    Sync(SyncEvent),
    /// Play-count enrichment events
    Enrich(EnrichEvent),
}

/// Events emitted during a sync pass
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A sync pass started
    Started {
        /// Whether existing records are being preserved
        incremental: bool,
    },

    /// Paging progress. `total_announced` is the count the server announced
    /// on its first page; it is captured once so the denominator cannot
    /// fluctuate between pages.
    Progress {
        fetched: u64,
        total_announced: Option<u64>,
    },

    /// A sync pass completed and the cache was persisted
    Completed {
        total: usize,
        added: usize,
        kept: usize,
    },

    /// A sync pass failed; the previous cache stands
    Failed { message: String },
}

/// Events emitted during an enrichment pass
#[derive(Debug, Clone)]
pub enum EnrichEvent {
    /// An enrichment pass started over this many albums
    Started { albums: usize },

    /// One album was skipped (fetch failure, unmatched listing, unresolved
    /// catalog id); the pass continues
    AlbumSkipped { library_id: String, reason: String },

    /// The pass completed and the play-count cache was persisted
    Completed {
        updated: usize,
        removed: usize,
        unchanged: usize,
    },
}

/// Broadcast event bus
///
/// Cheap to clone; all clones share the same channel.
///
/// # Example
///
/// ```
/// use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
///
/// let bus = EventBus::new(64);
/// let mut rx = bus.subscribe();
/// bus.emit(CoreEvent::Sync(SyncEvent::Started { incremental: true })).ok();
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a new bus holding up to `capacity` undelivered events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all current subscribers
    ///
    /// Returns `Err` when there are no subscribers; callers treat this as
    /// non-fatal (`.ok()`).
    pub fn emit(
        &self,
        event: CoreEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(128)
    }
}
