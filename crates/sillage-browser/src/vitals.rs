//! Web vital observers.
//!
//! Vitals arrive out of band: the host calls back whenever it has settled on
//! a value, which may be before, between, or after timeline scans, or never.
//! Firings only ever write measurements; they create no spans.

use facet::Facet;
use sillage_types::{TimelineEntry, ms_to_sec};
use tracing::{debug, trace};

use crate::accumulator::{
    FIRST_INPUT_DELAY, FIRST_INPUT_DELAY_MARK, LARGEST_CONTENTFUL_PAINT,
    LARGEST_CONTENTFUL_PAINT_MARK, MeasurementAccumulator,
};
use crate::platform::{Platform, Subscription};

#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum VitalKind {
    /// Render time of the largest content element in the viewport.
    LargestContentfulPaint,
    /// Delay between the first user input and the host starting to handle it.
    FirstInputDelay,
}

impl VitalKind {
    pub const ALL: [VitalKind; 2] = [VitalKind::LargestContentfulPaint, VitalKind::FirstInputDelay];

    /// Measurement name for the raw metric value.
    pub fn measurement_name(self) -> &'static str {
        match self {
            Self::LargestContentfulPaint => LARGEST_CONTENTFUL_PAINT,
            Self::FirstInputDelay => FIRST_INPUT_DELAY,
        }
    }

    /// Measurement name for the absolute time of the contributing entry.
    pub fn mark_name(self) -> &'static str {
        match self {
            Self::LargestContentfulPaint => LARGEST_CONTENTFUL_PAINT_MARK,
            Self::FirstInputDelay => FIRST_INPUT_DELAY_MARK,
        }
    }
}

/// One firing of a vital observer.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct VitalMetric {
    pub value: f64,
    /// Timeline entries that contributed to `value`, oldest first.
    #[facet(default)]
    pub entries: Vec<TimelineEntry>,
}

pub type VitalCallback = Box<dyn FnMut(VitalMetric) + Send + 'static>;

/// Records one firing into `measurements`.
///
/// Only the last contributing entry is used; a firing without entries is
/// ignored. `time_origin` is in seconds.
pub fn record_vital(
    kind: VitalKind,
    metric: &VitalMetric,
    time_origin: f64,
    measurements: &MeasurementAccumulator,
) {
    let Some(entry) = metric.entries.last() else {
        trace!(?kind, "vital fired without contributing entries; ignoring");
        return;
    };
    let mark = time_origin + ms_to_sec(entry.start_time());
    debug!(?kind, value = metric.value, mark, "recording web vital");
    measurements.record(kind.measurement_name(), metric.value);
    measurements.record(kind.mark_name(), mark);
}

/// The active vital subscriptions of one tracer.
#[derive(Debug, Default)]
pub struct WebVitalObservers {
    subscriptions: Vec<(VitalKind, Subscription)>,
}

impl WebVitalObservers {
    /// Subscribes to every vital the platform supports. `time_origin` is in seconds.
    pub fn start(
        platform: &dyn Platform,
        time_origin: f64,
        measurements: &MeasurementAccumulator,
    ) -> Self {
        let mut subscriptions = Vec::new();
        for kind in VitalKind::ALL {
            let measurements = measurements.clone();
            let callback: VitalCallback = Box::new(move |metric: VitalMetric| {
                record_vital(kind, &metric, time_origin, &measurements);
            });
            match platform.observe_vital(kind, callback) {
                Some(subscription) => {
                    debug!(?kind, "observing web vital");
                    subscriptions.push((kind, subscription));
                }
                None => debug!(?kind, "platform cannot observe web vital"),
            }
        }
        Self { subscriptions }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Detaches every observer.
    pub fn unsubscribe_all(&mut self) {
        for (kind, subscription) in self.subscriptions.drain(..) {
            debug!(?kind, "no longer observing web vital");
            subscription.unsubscribe();
        }
    }
}
