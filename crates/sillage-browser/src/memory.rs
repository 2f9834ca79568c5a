//! In-memory [`Platform`] with a hand-driven clock and manually fired vitals.
//!
//! Used to replay recorded timelines and to exercise the projector without a
//! real host.

use parking_lot::{Mutex, RwLock};
use sillage_types::{TimedEntry, TimelineEntry};
use std::sync::Arc;

use crate::platform::{ClientProbe, PerformanceTimeline, Platform, Subscription};
use crate::vitals::{VitalCallback, VitalKind, VitalMetric};

pub struct MemoryTimeline {
    time_origin: f64,
    now: Mutex<f64>,
    entries: RwLock<Vec<TimelineEntry>>,
}

impl MemoryTimeline {
    fn new(time_origin: f64) -> Self {
        Self {
            time_origin,
            now: Mutex::new(0.0),
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl PerformanceTimeline for MemoryTimeline {
    fn time_origin(&self) -> f64 {
        self.time_origin
    }

    fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    fn entries_from(&self, start: usize) -> Vec<TimelineEntry> {
        self.entries
            .read()
            .get(start..)
            .map(<[TimelineEntry]>::to_vec)
            .unwrap_or_default()
    }

    fn mark(&self, name: &str) {
        let now = *self.now.lock();
        self.entries
            .write()
            .push(TimelineEntry::Mark(TimedEntry::new(name, now, 0.0)));
    }
}

struct Observer {
    id: u64,
    kind: VitalKind,
    callback: VitalCallback,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    active: Vec<Observer>,
    /// Observers unsubscribed while `fire_vital` had them checked out.
    detached_while_firing: Vec<u64>,
}

pub struct MemoryPlatform {
    timeline: Option<MemoryTimeline>,
    location_origin: Option<String>,
    entry_script_src: Option<String>,
    client: RwLock<ClientProbe>,
    supported_vitals: Vec<VitalKind>,
    observers: Arc<Mutex<Observers>>,
}

impl MemoryPlatform {
    /// A platform whose timeline starts at `time_origin` milliseconds since the Unix epoch.
    pub fn new(time_origin: f64) -> Self {
        Self {
            timeline: Some(MemoryTimeline::new(time_origin)),
            location_origin: None,
            entry_script_src: None,
            client: RwLock::new(ClientProbe::default()),
            supported_vitals: VitalKind::ALL.to_vec(),
            observers: Arc::new(Mutex::new(Observers::default())),
        }
    }

    /// A platform with no performance timeline at all.
    pub fn without_performance() -> Self {
        Self {
            timeline: None,
            ..Self::new(0.0)
        }
    }

    pub fn with_location_origin(mut self, origin: impl Into<String>) -> Self {
        self.location_origin = Some(origin.into());
        self
    }

    pub fn with_entry_script_src(mut self, src: impl Into<String>) -> Self {
        self.entry_script_src = Some(src.into());
        self
    }

    pub fn with_client(self, probe: ClientProbe) -> Self {
        *self.client.write() = probe;
        self
    }

    /// Restricts which vitals `observe_vital` accepts.
    pub fn with_supported_vitals(mut self, kinds: &[VitalKind]) -> Self {
        self.supported_vitals = kinds.to_vec();
        self
    }

    pub fn set_client(&self, probe: ClientProbe) {
        *self.client.write() = probe;
    }

    /// Moves the timeline clock to `now` milliseconds after the time origin.
    /// Marks are stamped with the clock's current value.
    pub fn advance_to(&self, now: f64) {
        if let Some(timeline) = &self.timeline {
            *timeline.now.lock() = now;
        }
    }

    /// Appends `entry` to the timeline. Ignored when there is no timeline.
    pub fn push_entry(&self, entry: TimelineEntry) {
        if let Some(timeline) = &self.timeline {
            timeline.entries.write().push(entry);
        }
    }

    /// Drops every entry, as a host clearing its performance buffer would.
    pub fn clear_entries(&self) {
        if let Some(timeline) = &self.timeline {
            timeline.entries.write().clear();
        }
    }

    /// Names of every mark on the timeline, oldest first.
    pub fn marks(&self) -> Vec<String> {
        let Some(timeline) = &self.timeline else {
            return Vec::new();
        };
        timeline
            .entries
            .read()
            .iter()
            .filter_map(|entry| match entry {
                TimelineEntry::Mark(mark) => Some(mark.name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn observer_count(&self, kind: VitalKind) -> usize {
        self.observers
            .lock()
            .active
            .iter()
            .filter(|observer| observer.kind == kind)
            .count()
    }

    /// Delivers `metric` to every observer of `kind`. Returns how many observers ran.
    ///
    /// Callbacks run without the observer lock held, so they may subscribe or
    /// unsubscribe, including themselves. Observers being fired are checked
    /// out until every callback has returned; a concurrent firing of the same
    /// kind does not reach them.
    pub fn fire_vital(&self, kind: VitalKind, metric: VitalMetric) -> usize {
        let mut firing: Vec<Observer> = {
            let mut observers = self.observers.lock();
            let (firing, rest) = std::mem::take(&mut observers.active)
                .into_iter()
                .partition(|observer| observer.kind == kind);
            observers.active = rest;
            firing
        };

        for observer in &mut firing {
            (observer.callback)(metric.clone());
        }
        let delivered = firing.len();

        let mut observers = self.observers.lock();
        for observer in firing {
            let detached = observers
                .detached_while_firing
                .iter()
                .position(|id| *id == observer.id);
            match detached {
                Some(index) => {
                    observers.detached_while_firing.swap_remove(index);
                }
                None => observers.active.push(observer),
            }
        }
        delivered
    }
}

impl Platform for MemoryPlatform {
    fn performance(&self) -> Option<&dyn PerformanceTimeline> {
        self.timeline
            .as_ref()
            .map(|timeline| timeline as &dyn PerformanceTimeline)
    }

    fn location_origin(&self) -> Option<String> {
        self.location_origin.clone()
    }

    fn entry_script_src(&self) -> Option<String> {
        self.entry_script_src.clone()
    }

    fn probe_client(&self) -> ClientProbe {
        self.client.read().clone()
    }

    fn observe_vital(&self, kind: VitalKind, callback: VitalCallback) -> Option<Subscription> {
        if !self.supported_vitals.contains(&kind) {
            return None;
        }
        let id = {
            let mut observers = self.observers.lock();
            observers.next_id += 1;
            let id = observers.next_id;
            observers.active.push(Observer { id, kind, callback });
            id
        };
        let observers = Arc::downgrade(&self.observers);
        Some(Subscription::new(move || {
            if let Some(shared) = observers.upgrade() {
                let mut observers = shared.lock();
                let before = observers.active.len();
                observers.active.retain(|observer| observer.id != id);
                if observers.active.len() == before {
                    observers.detached_while_firing.push(id);
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_stamped_with_the_clock() {
        let platform = MemoryPlatform::new(1_000_000.0);
        platform.advance_to(42.0);
        let timeline = platform.performance().expect("timeline should exist");
        timeline.mark("ready");
        assert_eq!(timeline.entry_count(), 1);
        let entries = timeline.entries_from(0);
        assert_eq!(entries[0].name(), "ready");
        assert_eq!(entries[0].start_time(), 42.0);
        assert_eq!(platform.marks(), ["ready"]);
    }

    #[test]
    fn without_performance_has_no_timeline() {
        let platform = MemoryPlatform::without_performance();
        assert!(platform.performance().is_none());
        platform.push_entry(TimelineEntry::Mark(TimedEntry::new("lost", 1.0, 0.0)));
        assert!(platform.marks().is_empty());
    }

    #[test]
    fn entries_from_returns_only_the_suffix() {
        let platform = MemoryPlatform::new(0.0);
        for name in ["a", "b", "c"] {
            platform.push_entry(TimelineEntry::Mark(TimedEntry::new(name, 1.0, 0.0)));
        }
        let timeline = platform.performance().expect("timeline should exist");
        let suffix = timeline.entries_from(1);
        assert_eq!(suffix.len(), 2);
        assert_eq!(suffix[0].name(), "b");
        assert!(timeline.entries_from(3).is_empty());
        assert!(timeline.entries_from(10).is_empty());
    }

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let platform = MemoryPlatform::new(0.0);
        let subscription = platform
            .observe_vital(VitalKind::FirstInputDelay, Box::new(|_| {}))
            .expect("fid should be supported");
        assert_eq!(platform.observer_count(VitalKind::FirstInputDelay), 1);
        subscription.unsubscribe();
        assert_eq!(platform.observer_count(VitalKind::FirstInputDelay), 0);
        let metric = VitalMetric {
            value: 3.0,
            entries: Vec::new(),
        };
        assert_eq!(platform.fire_vital(VitalKind::FirstInputDelay, metric), 0);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let platform = Arc::new(MemoryPlatform::new(0.0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let own = Arc::clone(&slot);
        let subscription = platform
            .observe_vital(
                VitalKind::FirstInputDelay,
                Box::new(move |_| {
                    if let Some(subscription) = own.lock().take() {
                        subscription.unsubscribe();
                    }
                }),
            )
            .expect("fid should be supported");
        *slot.lock() = Some(subscription);

        let (done, finished) = std::sync::mpsc::channel();
        let firing = Arc::clone(&platform);
        std::thread::spawn(move || {
            let metric = VitalMetric {
                value: 8.0,
                entries: Vec::new(),
            };
            let _ = done.send(firing.fire_vital(VitalKind::FirstInputDelay, metric));
        });
        let delivered = finished
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("fire_vital should return");

        assert_eq!(delivered, 1);
        assert_eq!(platform.observer_count(VitalKind::FirstInputDelay), 0);
        let metric = VitalMetric {
            value: 9.0,
            entries: Vec::new(),
        };
        assert_eq!(platform.fire_vital(VitalKind::FirstInputDelay, metric), 0);
    }

    #[test]
    fn callback_may_subscribe_another_observer() {
        let platform = Arc::new(MemoryPlatform::new(0.0));
        let host = Arc::downgrade(&platform);
        platform
            .observe_vital(
                VitalKind::LargestContentfulPaint,
                Box::new(move |_| {
                    if let Some(host) = host.upgrade() {
                        let _ = host.observe_vital(VitalKind::FirstInputDelay, Box::new(|_| {}));
                    }
                }),
            )
            .expect("lcp should be supported");

        let metric = VitalMetric {
            value: 1.0,
            entries: Vec::new(),
        };
        assert_eq!(platform.fire_vital(VitalKind::LargestContentfulPaint, metric), 1);
        assert_eq!(platform.observer_count(VitalKind::LargestContentfulPaint), 1);
        assert_eq!(platform.observer_count(VitalKind::FirstInputDelay), 1);
    }

    #[test]
    fn unsupported_vitals_are_refused() {
        let platform =
            MemoryPlatform::new(0.0).with_supported_vitals(&[VitalKind::LargestContentfulPaint]);
        assert!(
            platform
                .observe_vital(VitalKind::FirstInputDelay, Box::new(|_| {}))
                .is_none()
        );
    }
}
