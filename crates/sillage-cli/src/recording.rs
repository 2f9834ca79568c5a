//! Recorded timelines and their replay through the projector.

use facet::Facet;
use sillage::types::{TimelineEntry, Transaction, TransactionOp, ms_to_sec};
use sillage::{
    BrowserTracing, BrowserTracingOptions, ClientProbe, MemoryPlatform, Platform, VitalKind,
    VitalMetric,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything captured from one page load.
#[derive(Facet, Debug)]
pub struct Recording {
    /// Milliseconds since the Unix epoch.
    pub time_origin: f64,
    #[facet(default)]
    pub location_origin: Option<String>,
    #[facet(default)]
    pub entry_script_src: Option<String>,
    #[facet(default)]
    pub client: Option<ClientProbe>,
    /// Platform-relative time, in milliseconds, at which tracing started.
    #[facet(default)]
    pub tracing_started_at: Option<f64>,
    pub entries: Vec<TimelineEntry>,
    #[facet(default)]
    pub vitals: Vec<RecordedVital>,
}

#[derive(Facet, Debug)]
pub struct RecordedVital {
    pub kind: VitalKind,
    pub metric: VitalMetric,
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub name: String,
    pub op: TransactionOp,
    /// Seconds since the Unix epoch; defaults to the recording's time origin.
    pub start: Option<f64>,
    pub tracing: BrowserTracingOptions,
}

pub fn parse_recording(json: &str) -> Result<Recording, String> {
    facet_json::from_str(json).map_err(|e| format!("decode recording: {e}"))
}

/// Replays `recording` into a fresh transaction, finished at its latest child.
pub fn replay(recording: Recording, options: ReplayOptions) -> Transaction {
    let mut platform = MemoryPlatform::new(recording.time_origin);
    if let Some(origin) = recording.location_origin {
        platform = platform.with_location_origin(origin);
    }
    if let Some(src) = recording.entry_script_src {
        platform = platform.with_entry_script_src(src);
    }
    if let Some(client) = recording.client {
        platform = platform.with_client(client);
    }
    let platform = Arc::new(platform);

    for entry in recording.entries {
        platform.push_entry(entry);
    }
    if let Some(started_at) = recording.tracing_started_at {
        platform.advance_to(started_at);
    }

    let host: Arc<dyn Platform> = platform.clone();
    let mut tracing = BrowserTracing::new(host, options.tracing);

    for vital in recording.vitals {
        let delivered = platform.fire_vital(vital.kind, vital.metric);
        debug!(kind = ?vital.kind, delivered, "replayed web vital");
    }

    let start = options
        .start
        .unwrap_or_else(|| ms_to_sec(recording.time_origin));
    let mut transaction = Transaction::new(options.name, options.op, start);
    tracing.add_performance_entries(&mut transaction);

    let end = transaction
        .latest_child_end()
        .unwrap_or(transaction.start_timestamp());
    transaction.finish(end);

    info!(
        spans = transaction.spans().len(),
        measurements = transaction.measurements().len(),
        "replayed recording"
    );
    transaction
}
