use parking_lot::Mutex;
use sillage_types::Measurements;
use std::sync::Arc;

pub const FIRST_PAINT: &str = "fp";
pub const FIRST_PAINT_MARK: &str = "mark.fp";
pub const FIRST_CONTENTFUL_PAINT: &str = "fcp";
pub const FIRST_CONTENTFUL_PAINT_MARK: &str = "mark.fcp";
pub const LARGEST_CONTENTFUL_PAINT: &str = "lcp";
pub const LARGEST_CONTENTFUL_PAINT_MARK: &str = "mark.lcp";
pub const FIRST_INPUT_DELAY: &str = "fid";
pub const FIRST_INPUT_DELAY_MARK: &str = "mark.fid";
pub const CONNECTION_RTT: &str = "connection.rtt";
pub const CONNECTION_DOWNLINK: &str = "connection.downlink";

/// Measurement set shared by every producer: the timeline scan, the vital
/// observers, and the navigator collector.
///
/// Each measurement name has exactly one producer, so writers never contend
/// on the same key. The lock only keeps the map itself consistent when a
/// vital fires from another thread.
#[derive(Clone, Default)]
pub struct MeasurementAccumulator {
    inner: Arc<Mutex<Measurements>>,
}

impl MeasurementAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, value: f64) {
        self.inner.lock().insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.inner.lock().get(name)
    }

    /// Copy of everything recorded so far. Values recorded afterwards are not
    /// part of the copy.
    pub fn snapshot(&self) -> Measurements {
        self.inner.lock().clone()
    }
}

impl std::fmt::Debug for MeasurementAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MeasurementAccumulator")
            .field(&*self.inner.lock())
            .finish()
    }
}
