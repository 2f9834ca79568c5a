//! Turns timeline entries into spans on a transaction.

use sillage_types::{
    NavigationEntry, NavigationEvent, ResourceEntry, SpanContext, TimedEntry, TimelineEntry,
    Transaction, TransactionOp, ms_to_sec,
};
use tracing::trace;

use crate::accumulator::{
    FIRST_CONTENTFUL_PAINT, FIRST_CONTENTFUL_PAINT_MARK, FIRST_PAINT, FIRST_PAINT_MARK,
    MeasurementAccumulator,
};
use crate::span_factory::start_child;

pub const FIRST_PAINT_ENTRY: &str = "first-paint";
pub const FIRST_CONTENTFUL_PAINT_ENTRY: &str = "first-contentful-paint";

/// Span data keys for resource sizes.
pub const TRANSFER_SIZE: &str = "Transfer Size";
pub const ENCODED_BODY_SIZE: &str = "Encoded Body Size";
pub const DECODED_BODY_SIZE: &str = "Decoded Body Size";

/// Resources fetched by these initiators already get spans from request instrumentation.
const REQUEST_INITIATORS: [&str; 2] = ["xmlhttprequest", "fetch"];

/// Per-scan dispatch state.
///
/// Build one per scan, feed it each unscanned entry with [`dispatch`], then
/// call [`finish`] to emit spans that depend on the whole scan.
///
/// [`dispatch`]: EntryDispatcher::dispatch
/// [`finish`]: EntryDispatcher::finish
pub struct EntryDispatcher<'a> {
    /// Seconds since the Unix epoch.
    time_origin: f64,
    location_origin: Option<&'a str>,
    entry_script_src: Option<&'a str>,
    tracing_init_mark: &'a str,
    measurements: &'a MeasurementAccumulator,
    entry_script_end: Option<f64>,
    tracing_init_start: Option<f64>,
}

impl<'a> EntryDispatcher<'a> {
    pub fn new(
        time_origin: f64,
        location_origin: Option<&'a str>,
        entry_script_src: Option<&'a str>,
        tracing_init_mark: &'a str,
        measurements: &'a MeasurementAccumulator,
    ) -> Self {
        Self {
            time_origin,
            location_origin,
            entry_script_src,
            tracing_init_mark,
            measurements,
            entry_script_end: None,
            tracing_init_start: None,
        }
    }

    pub fn dispatch(&mut self, transaction: &mut Transaction, entry: &TimelineEntry) {
        let start_time = ms_to_sec(entry.start_time());
        let duration = ms_to_sec(entry.duration());

        if *transaction.op() == TransactionOp::Navigation
            && self.time_origin + start_time < transaction.start_timestamp()
        {
            trace!(
                entry_type = entry.entry_type(),
                name = entry.name(),
                "skipping entry recorded before navigation started"
            );
            return;
        }

        match entry {
            TimelineEntry::Navigation(navigation) => self.add_navigation(transaction, navigation),
            TimelineEntry::Mark(timed)
            | TimelineEntry::Paint(timed)
            | TimelineEntry::Measure(timed) => {
                self.add_timed(transaction, entry.entry_type(), timed, start_time, duration)
            }
            TimelineEntry::Resource(resource) => {
                self.add_resource(transaction, resource, start_time, duration)
            }
            TimelineEntry::Other(other) => {
                trace!(entry_type = %other.entry_type, "ignoring unsupported entry type");
            }
        }
    }

    /// Emits the `evaluation` span between the entry script finishing and the
    /// tracing-init mark, when the scan saw both.
    pub fn finish(self, transaction: &mut Transaction) {
        if let (Some(script_end), Some(init_start)) =
            (self.entry_script_end, self.tracing_init_start)
        {
            start_child(
                transaction,
                SpanContext::new("evaluation", "script", script_end, init_start),
            );
        }
    }

    fn absolute(&self, ms: f64) -> f64 {
        self.time_origin + ms_to_sec(ms)
    }

    fn add_navigation(&self, transaction: &mut Transaction, entry: &NavigationEntry) {
        for event in NavigationEvent::ALL {
            if let Some((start, end)) = entry.event_bounds(event) {
                start_child(
                    transaction,
                    SpanContext::new(
                        event.as_str(),
                        "browser",
                        self.absolute(start),
                        self.absolute(end),
                    ),
                );
            }
        }

        let Some(response_end) = entry.response_end else {
            return;
        };
        if let Some(request_start) = entry.request_start {
            start_child(
                transaction,
                SpanContext::new(
                    "request",
                    "browser",
                    self.absolute(request_start),
                    self.absolute(response_end),
                ),
            );
        }
        if let Some(response_start) = entry.response_start {
            start_child(
                transaction,
                SpanContext::new(
                    "response",
                    "browser",
                    self.absolute(response_start),
                    self.absolute(response_end),
                ),
            );
        }
    }

    fn add_timed(
        &mut self,
        transaction: &mut Transaction,
        entry_type: &str,
        entry: &TimedEntry,
        start_time: f64,
        duration: f64,
    ) {
        let start_timestamp = self.time_origin + start_time;
        start_child(
            transaction,
            SpanContext::new(
                entry.name.as_str(),
                entry_type,
                start_timestamp,
                start_timestamp + duration,
            ),
        );

        if self.tracing_init_start.is_none() && entry.name == self.tracing_init_mark {
            self.tracing_init_start = Some(start_timestamp);
        }

        let (value_name, mark_name) = match entry.name.as_str() {
            FIRST_PAINT_ENTRY => (FIRST_PAINT, FIRST_PAINT_MARK),
            FIRST_CONTENTFUL_PAINT_ENTRY => (FIRST_CONTENTFUL_PAINT, FIRST_CONTENTFUL_PAINT_MARK),
            _ => return,
        };
        self.measurements.record(value_name, entry.start_time);
        self.measurements.record(mark_name, start_timestamp);
    }

    fn add_resource(
        &mut self,
        transaction: &mut Transaction,
        entry: &ResourceEntry,
        start_time: f64,
        duration: f64,
    ) {
        let initiator = entry.initiator_type.as_deref();
        if initiator.is_some_and(|initiator| REQUEST_INITIATORS.contains(&initiator)) {
            return;
        }

        let resource_name = match self.location_origin {
            Some(origin) if !origin.is_empty() => entry.name.replacen(origin, "", 1),
            _ => entry.name.clone(),
        };
        let op = match initiator {
            Some(initiator) if !initiator.is_empty() => format!("resource.{initiator}"),
            _ => String::from("resource"),
        };

        let start_timestamp = self.time_origin + start_time;
        let end_timestamp = start_timestamp + duration;
        let mut context =
            SpanContext::new(resource_name.as_str(), op, start_timestamp, end_timestamp);
        for (key, value) in [
            (TRANSFER_SIZE, entry.transfer_size),
            (ENCODED_BODY_SIZE, entry.encoded_body_size),
            (DECODED_BODY_SIZE, entry.decoded_body_size),
        ] {
            if let Some(value) = value {
                context = context.with_data(key, value);
            }
        }
        start_child(transaction, context);

        let is_entry_script = !resource_name.is_empty()
            && self
                .entry_script_src
                .is_some_and(|src| src.contains(resource_name.as_str()));
        if self.entry_script_end.is_none() && is_entry_script {
            self.entry_script_end = Some(end_timestamp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sillage_types::{OtherEntry, Span};

    const ORIGIN: f64 = 1000.0;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn project(
        transaction: &mut Transaction,
        entries: &[TimelineEntry],
        measurements: &MeasurementAccumulator,
    ) {
        let mut dispatcher = EntryDispatcher::new(
            ORIGIN,
            Some("https://example.com"),
            Some("https://example.com/static/app.js"),
            "sillage-tracing-init",
            measurements,
        );
        for entry in entries {
            dispatcher.dispatch(transaction, entry);
        }
        dispatcher.finish(transaction);
    }

    fn span<'t>(transaction: &'t Transaction, description: &str) -> &'t Span {
        transaction
            .spans()
            .iter()
            .find(|span| span.description == description)
            .unwrap_or_else(|| panic!("no span described {description:?}"))
    }

    fn resource(name: &str, initiator: Option<&str>) -> TimelineEntry {
        TimelineEntry::Resource(ResourceEntry {
            name: name.into(),
            start_time: 200.0,
            duration: 50.0,
            initiator_type: initiator.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn dom_content_loaded_becomes_browser_span() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Navigation(NavigationEntry {
            name: "https://example.com/".into(),
            dom_content_loaded_event_start: Some(100.0),
            dom_content_loaded_event_end: Some(150.0),
            ..Default::default()
        });
        project(&mut transaction, &[entry], &measurements);

        assert_eq!(transaction.spans().len(), 1);
        let dcl = span(&transaction, "domContentLoadedEvent");
        assert_eq!(dcl.op, "browser");
        assert!(close(dcl.start_timestamp, 1000.1));
        assert!(close(dcl.end_timestamp, 1000.15));
    }

    #[test]
    fn navigation_emits_all_phases_and_request_response() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Navigation(NavigationEntry {
            name: "https://example.com/".into(),
            unload_event_start: Some(1.0),
            unload_event_end: Some(2.0),
            dom_content_loaded_event_start: Some(100.0),
            dom_content_loaded_event_end: Some(150.0),
            load_event_start: Some(300.0),
            load_event_end: Some(310.0),
            connect_start: Some(10.0),
            connect_end: Some(20.0),
            domain_lookup_start: Some(5.0),
            domain_lookup_end: Some(9.0),
            request_start: Some(21.0),
            response_start: Some(60.0),
            response_end: Some(80.0),
            ..Default::default()
        });
        project(&mut transaction, &[entry], &measurements);

        let descriptions: Vec<_> = transaction
            .spans()
            .iter()
            .map(|span| span.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            [
                "unloadEvent",
                "domContentLoadedEvent",
                "loadEvent",
                "connect",
                "domainLookup",
                "request",
                "response",
            ]
        );
        let request = span(&transaction, "request");
        assert!(close(request.start_timestamp, 1000.021));
        assert!(close(request.end_timestamp, 1000.08));
        let response = span(&transaction, "response");
        assert!(close(response.start_timestamp, 1000.06));
    }

    #[test]
    fn missing_phase_fields_skip_only_that_span() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Navigation(NavigationEntry {
            name: "https://example.com/".into(),
            load_event_start: Some(300.0),
            connect_start: Some(10.0),
            response_start: Some(60.0),
            ..Default::default()
        });
        project(&mut transaction, &[entry], &measurements);
        assert!(transaction.spans().is_empty());
    }

    #[test]
    fn first_paint_records_value_and_mark() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Paint(TimedEntry::new("first-paint", 234.0, 0.0));
        project(&mut transaction, &[entry], &measurements);

        assert_eq!(measurements.get("fp"), Some(234.0));
        let mark = measurements.get("mark.fp").expect("mark.fp should be recorded");
        assert!(close(mark, 1000.234));
        let paint = span(&transaction, "first-paint");
        assert_eq!(paint.op, "paint");
        assert!(close(paint.start_timestamp, mark));
    }

    #[test]
    fn first_contentful_paint_records_value_and_mark() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Paint(TimedEntry::new("first-contentful-paint", 400.0, 0.0));
        project(&mut transaction, &[entry], &measurements);
        assert_eq!(measurements.get("fcp"), Some(400.0));
        assert!(close(measurements.get("mark.fcp").unwrap_or_default(), 1000.4));
    }

    #[test]
    fn measure_span_covers_its_duration() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Measure(TimedEntry::new("hydrate", 500.0, 250.0));
        project(&mut transaction, &[entry], &measurements);
        let measure = span(&transaction, "hydrate");
        assert_eq!(measure.op, "measure");
        assert!(close(measure.duration(), 0.25));
        assert!(measurements.snapshot().is_empty());
    }

    #[test]
    fn request_initiated_resources_are_skipped() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[
                resource("https://example.com/api/a", Some("xmlhttprequest")),
                resource("https://example.com/api/b", Some("fetch")),
            ],
            &measurements,
        );
        assert!(transaction.spans().is_empty());
    }

    #[test]
    fn resource_span_strips_origin_and_carries_sizes() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Resource(ResourceEntry {
            name: "https://example.com/static/logo.png".into(),
            start_time: 200.0,
            duration: 50.0,
            initiator_type: Some("img".into()),
            transfer_size: Some(1200),
            encoded_body_size: Some(1000),
            decoded_body_size: None,
        });
        project(&mut transaction, &[entry], &measurements);

        let logo = span(&transaction, "/static/logo.png");
        assert_eq!(logo.op, "resource.img");
        assert!(close(logo.start_timestamp, 1000.2));
        assert!(close(logo.end_timestamp, 1000.25));
        assert_eq!(logo.data.get(TRANSFER_SIZE), Some(&1200));
        assert_eq!(logo.data.get(ENCODED_BODY_SIZE), Some(&1000));
        assert!(!logo.data.contains_key(DECODED_BODY_SIZE));
    }

    #[test]
    fn resource_without_initiator_uses_plain_op() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[resource("https://cdn.example.net/font.woff2", None)],
            &measurements,
        );
        let font = span(&transaction, "https://cdn.example.net/font.woff2");
        assert_eq!(font.op, "resource");
    }

    #[test]
    fn evaluation_spans_script_end_to_init_mark() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[
                resource("https://example.com/static/app.js", Some("script")),
                TimelineEntry::Mark(TimedEntry::new("sillage-tracing-init", 400.0, 0.0)),
            ],
            &measurements,
        );
        let evaluation = span(&transaction, "evaluation");
        assert_eq!(evaluation.op, "script");
        assert!(close(evaluation.start_timestamp, 1000.25));
        assert!(close(evaluation.end_timestamp, 1000.4));
    }

    #[test]
    fn evaluation_needs_both_sentinels() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[resource("https://example.com/static/app.js", Some("script"))],
            &measurements,
        );
        assert!(
            transaction
                .spans()
                .iter()
                .all(|span| span.description != "evaluation")
        );
    }

    #[test]
    fn first_script_and_first_init_mark_win() {
        let script = |start_time: f64, duration: f64| {
            TimelineEntry::Resource(ResourceEntry {
                name: "https://example.com/static/app.js".into(),
                start_time,
                duration,
                initiator_type: Some("script".into()),
                ..Default::default()
            })
        };
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[
                script(200.0, 50.0),
                TimelineEntry::Mark(TimedEntry::new("sillage-tracing-init", 400.0, 0.0)),
                script(600.0, 100.0),
                TimelineEntry::Mark(TimedEntry::new("sillage-tracing-init", 800.0, 0.0)),
            ],
            &measurements,
        );

        let evaluations: Vec<_> = transaction
            .spans()
            .iter()
            .filter(|span| span.description == "evaluation")
            .collect();
        assert_eq!(evaluations.len(), 1);
        assert!(close(evaluations[0].start_timestamp, 1000.25));
        assert!(close(evaluations[0].end_timestamp, 1000.4));
    }

    #[test]
    fn bare_origin_resource_is_not_the_entry_script() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[
                resource("https://example.com", Some("other")),
                TimelineEntry::Mark(TimedEntry::new("sillage-tracing-init", 400.0, 0.0)),
            ],
            &measurements,
        );
        assert!(
            transaction
                .spans()
                .iter()
                .all(|span| span.description != "evaluation")
        );
        assert_eq!(transaction.spans().len(), 2);
    }

    #[test]
    fn navigation_transaction_skips_earlier_entries() {
        let mut transaction = Transaction::new("/next", TransactionOp::Navigation, 1005.0);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[
                TimelineEntry::Mark(TimedEntry::new("before", 1000.0, 0.0)),
                TimelineEntry::Mark(TimedEntry::new("after", 6000.0, 0.0)),
            ],
            &measurements,
        );
        assert_eq!(transaction.spans().len(), 1);
        assert_eq!(transaction.spans()[0].description, "after");
        assert_eq!(transaction.start_timestamp(), 1005.0);
    }

    #[test]
    fn pageload_pulls_start_back_for_early_entries() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, 1005.0);
        let measurements = MeasurementAccumulator::new();
        project(
            &mut transaction,
            &[TimelineEntry::Mark(TimedEntry::new("early", 1000.0, 0.0))],
            &measurements,
        );
        assert!(close(transaction.start_timestamp(), 1001.0));
    }

    #[test]
    fn unknown_entry_types_are_ignored() {
        let mut transaction = Transaction::new("/", TransactionOp::Pageload, ORIGIN);
        let measurements = MeasurementAccumulator::new();
        let entry = TimelineEntry::Other(OtherEntry {
            entry_type: "longtask".into(),
            name: "self".into(),
            start_time: 10.0,
            duration: 70.0,
        });
        project(&mut transaction, &[entry], &measurements);
        assert!(transaction.spans().is_empty());
    }
}
