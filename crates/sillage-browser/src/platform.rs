//! Capabilities the projector needs from its host.
//!
//! Everything the host may or may not support is expressed as an explicit
//! `Option`, so absent capabilities are handled where they are consumed
//! instead of being inferred from missing fields.

use facet::Facet;
use sillage_types::TimelineEntry;

use crate::vitals::{VitalCallback, VitalKind};

/// Host environment handle, injected into [`crate::BrowserTracing`] at construction.
pub trait Platform: Send + Sync {
    /// The performance timeline, or `None` when the host has none at all.
    fn performance(&self) -> Option<&dyn PerformanceTimeline>;

    /// Origin of the current document (`https://example.com`), stripped from
    /// resource URLs to produce relative paths.
    fn location_origin(&self) -> Option<String>;

    /// `src` of the first script flagged as the page's entry point.
    fn entry_script_src(&self) -> Option<String>;

    /// Snapshot of client network and hardware capabilities.
    fn probe_client(&self) -> ClientProbe;

    /// Registers `callback` for `kind`. Returns `None` when the host cannot
    /// observe that vital.
    fn observe_vital(&self, kind: VitalKind, callback: VitalCallback) -> Option<Subscription>;
}

/// Append-only, time-ordered log of performance entries.
pub trait PerformanceTimeline {
    /// Absolute reference instant, in milliseconds since the Unix epoch.
    fn time_origin(&self) -> f64;

    /// Number of entries currently on the timeline.
    fn entry_count(&self) -> usize;

    /// Entries from index `start` on, oldest first. Empty when `start` is at
    /// or past the end.
    fn entries_from(&self, start: usize) -> Vec<TimelineEntry>;

    /// Records a named instant on the timeline.
    fn mark(&self, name: &str);
}

/// What the client exposes about its network and hardware.
#[derive(Facet, Debug, Clone, Default, PartialEq)]
pub struct ClientProbe {
    /// `None` when the network information capability is missing.
    #[facet(default)]
    pub connection: Option<NetworkInformation>,
    /// `None` when the device memory capability is missing.
    #[facet(default)]
    pub device_memory: Option<f64>,
    #[facet(default)]
    pub hardware_concurrency: Option<u32>,
}

#[derive(Facet, Debug, Clone, Default, PartialEq)]
pub struct NetworkInformation {
    #[facet(default)]
    pub effective_type: Option<String>,
    /// Estimated round-trip time in milliseconds.
    #[facet(default)]
    pub rtt: Option<f64>,
    /// Estimated bandwidth in megabits per second.
    #[facet(default)]
    pub downlink: Option<f64>,
}

/// Handle to an active observer.
///
/// Dropping a subscription leaves the observer attached; call
/// [`Subscription::unsubscribe`] to detach it.
pub struct Subscription {
    teardown: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Box::new(teardown),
        }
    }

    pub fn unsubscribe(self) {
        (self.teardown)();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
