//! Performance timeline entries as reported by the host platform.
//!
//! All times are milliseconds relative to the platform's time origin. Each
//! entry kind only carries the fields that are meaningful for it.

use facet::Facet;

/// One record of the platform's append-only performance timeline.
#[derive(Facet, Debug, Clone, PartialEq)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum TimelineEntry {
    Navigation(NavigationEntry),
    Mark(TimedEntry),
    Paint(TimedEntry),
    Measure(TimedEntry),
    Resource(ResourceEntry),
    /// An entry kind this crate does not project.
    Other(OtherEntry),
}

impl TimelineEntry {
    /// The platform's entry type tag (`"navigation"`, `"mark"`, ...).
    pub fn entry_type(&self) -> &str {
        match self {
            Self::Navigation(_) => "navigation",
            Self::Mark(_) => "mark",
            Self::Paint(_) => "paint",
            Self::Measure(_) => "measure",
            Self::Resource(_) => "resource",
            Self::Other(entry) => &entry.entry_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Navigation(entry) => &entry.name,
            Self::Mark(entry) | Self::Paint(entry) | Self::Measure(entry) => &entry.name,
            Self::Resource(entry) => &entry.name,
            Self::Other(entry) => &entry.name,
        }
    }

    pub fn start_time(&self) -> f64 {
        match self {
            Self::Navigation(entry) => entry.start_time,
            Self::Mark(entry) | Self::Paint(entry) | Self::Measure(entry) => entry.start_time,
            Self::Resource(entry) => entry.start_time,
            Self::Other(entry) => entry.start_time,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Self::Navigation(entry) => entry.duration,
            Self::Mark(entry) | Self::Paint(entry) | Self::Measure(entry) => entry.duration,
            Self::Resource(entry) => entry.duration,
            Self::Other(entry) => entry.duration,
        }
    }
}

/// Shape shared by mark, paint and measure entries.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct TimedEntry {
    pub name: String,
    pub start_time: f64,
    #[facet(default)]
    pub duration: f64,
}

impl TimedEntry {
    pub fn new(name: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            start_time,
            duration,
        }
    }
}

/// Sub-events of a navigation entry that each carry a `*Start`/`*End` pair.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum NavigationEvent {
    UnloadEvent,
    DomContentLoadedEvent,
    LoadEvent,
    Connect,
    DomainLookup,
}

impl NavigationEvent {
    pub const ALL: [NavigationEvent; 5] = [
        NavigationEvent::UnloadEvent,
        NavigationEvent::DomContentLoadedEvent,
        NavigationEvent::LoadEvent,
        NavigationEvent::Connect,
        NavigationEvent::DomainLookup,
    ];

    /// The platform's name for this event, without the `Start`/`End` suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnloadEvent => "unloadEvent",
            Self::DomContentLoadedEvent => "domContentLoadedEvent",
            Self::LoadEvent => "loadEvent",
            Self::Connect => "connect",
            Self::DomainLookup => "domainLookup",
        }
    }
}

#[derive(Facet, Debug, Clone, Default, PartialEq)]
pub struct NavigationEntry {
    pub name: String,
    #[facet(default)]
    pub start_time: f64,
    #[facet(default)]
    pub duration: f64,
    #[facet(default)]
    pub unload_event_start: Option<f64>,
    #[facet(default)]
    pub unload_event_end: Option<f64>,
    #[facet(default)]
    pub dom_content_loaded_event_start: Option<f64>,
    #[facet(default)]
    pub dom_content_loaded_event_end: Option<f64>,
    #[facet(default)]
    pub load_event_start: Option<f64>,
    #[facet(default)]
    pub load_event_end: Option<f64>,
    #[facet(default)]
    pub connect_start: Option<f64>,
    #[facet(default)]
    pub connect_end: Option<f64>,
    #[facet(default)]
    pub domain_lookup_start: Option<f64>,
    #[facet(default)]
    pub domain_lookup_end: Option<f64>,
    #[facet(default)]
    pub request_start: Option<f64>,
    #[facet(default)]
    pub response_start: Option<f64>,
    #[facet(default)]
    pub response_end: Option<f64>,
}

impl NavigationEntry {
    /// Returns the `(start, end)` pair for `event` when both sides are
    /// populated and non-zero. Platforms report `0` for phases that did not
    /// happen, so zero counts as absent.
    pub fn event_bounds(&self, event: NavigationEvent) -> Option<(f64, f64)> {
        let (start, end) = match event {
            NavigationEvent::UnloadEvent => (self.unload_event_start, self.unload_event_end),
            NavigationEvent::DomContentLoadedEvent => (
                self.dom_content_loaded_event_start,
                self.dom_content_loaded_event_end,
            ),
            NavigationEvent::LoadEvent => (self.load_event_start, self.load_event_end),
            NavigationEvent::Connect => (self.connect_start, self.connect_end),
            NavigationEvent::DomainLookup => (self.domain_lookup_start, self.domain_lookup_end),
        };
        Some((truthy(start)?, truthy(end)?))
    }
}

fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

#[derive(Facet, Debug, Clone, Default, PartialEq)]
pub struct ResourceEntry {
    /// Absolute URL of the fetched resource.
    pub name: String,
    pub start_time: f64,
    #[facet(default)]
    pub duration: f64,
    /// What kind of element or API started the fetch (`script`, `img`, `fetch`, ...).
    #[facet(default)]
    pub initiator_type: Option<String>,
    #[facet(default)]
    pub transfer_size: Option<u64>,
    #[facet(default)]
    pub encoded_body_size: Option<u64>,
    #[facet(default)]
    pub decoded_body_size: Option<u64>,
}

#[derive(Facet, Debug, Clone, PartialEq)]
pub struct OtherEntry {
    pub entry_type: String,
    pub name: String,
    #[facet(default)]
    pub start_time: f64,
    #[facet(default)]
    pub duration: f64,
}
