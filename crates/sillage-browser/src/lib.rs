//! Projects a host's performance timeline onto a sillage [`Transaction`].
//!
//! [`BrowserTracing`] is created once per page. Construction marks the
//! timeline, subscribes to the largest-contentful-paint and first-input-delay
//! vitals, and takes a first snapshot of the client's network and hardware.
//! After that, [`BrowserTracing::add_performance_entries`] is called for each
//! transaction:
//!
//! 1. The entry cursor picks the part of the timeline not scanned yet.
//! 2. Each entry is classified and turned into zero or more child spans; the
//!    transaction's start is pulled back whenever a child begins earlier.
//! 3. For page loads, the client snapshot is refreshed and the browser
//!    context and accumulated measurements are attached.
//!
//! Vitals are recorded whenever the host reports them. A vital that fires
//! after a page load's measurements were attached is not part of that
//! transaction.
//!
//! Hosts without a performance timeline get no spans and no measurements;
//! nothing in this crate fails loudly.

mod accumulator;
mod cursor;
mod dispatch;
mod memory;
mod navigator;
mod options;
mod platform;
mod span_factory;
mod vitals;


pub use accumulator::*;
pub use cursor::*;
pub use dispatch::*;
pub use memory::*;
pub use navigator::*;
pub use options::*;
pub use platform::*;
pub use span_factory::*;
pub use vitals::*;

use sillage_types::{BrowserContext, Context, Transaction, TransactionOp, ms_to_sec};
use std::sync::Arc;
use tracing::debug;

/// Context name under which the browser context is attached.
pub const BROWSER_CONTEXT: &str = "browser";

pub struct BrowserTracing {
    platform: Arc<dyn Platform>,
    options: BrowserTracingOptions,
    cursor: EntryCursor,
    measurements: MeasurementAccumulator,
    browser_context: BrowserContext,
    vitals: WebVitalObservers,
}

impl BrowserTracing {
    pub fn new(platform: Arc<dyn Platform>, options: BrowserTracingOptions) -> Self {
        let measurements = MeasurementAccumulator::new();

        let vitals = match platform.performance() {
            Some(performance) => {
                performance.mark(&options.tracing_init_mark);
                if options.track_vitals {
                    let time_origin = ms_to_sec(performance.time_origin());
                    WebVitalObservers::start(platform.as_ref(), time_origin, &measurements)
                } else {
                    WebVitalObservers::default()
                }
            }
            None => {
                debug!("no performance timeline; vitals and marks are unavailable");
                WebVitalObservers::default()
            }
        };

        let mut browser_context = BrowserContext::default();
        collect_navigator_context(&platform.probe_client(), &mut browser_context, &measurements);

        Self {
            cursor: EntryCursor::new(options.cursor_advance),
            platform,
            options,
            measurements,
            browser_context,
            vitals,
        }
    }

    /// Scans timeline entries added since the previous call and adds the
    /// resulting spans to `transaction`. Page loads also get the browser
    /// context and the measurements gathered so far.
    pub fn add_performance_entries(&mut self, transaction: &mut Transaction) {
        let Some(performance) = self.platform.performance() else {
            return;
        };

        let time_origin = ms_to_sec(performance.time_origin());
        let scan_start = self.cursor.scan_start(performance.entry_count());
        let unscanned = scan_start.map_or_else(Vec::new, |start| performance.entries_from(start));
        let location_origin = self.platform.location_origin();
        let entry_script_src = self.platform.entry_script_src();

        debug!(
            op = transaction.op().as_str(),
            cursor = self.cursor.position(),
            entries = unscanned.len(),
            "adding performance entries"
        );

        let mut dispatcher = EntryDispatcher::new(
            time_origin,
            location_origin.as_deref(),
            entry_script_src.as_deref(),
            &self.options.tracing_init_mark,
            &self.measurements,
        );
        for entry in &unscanned {
            dispatcher.dispatch(transaction, entry);
        }
        dispatcher.finish(transaction);

        if let Some(start) = scan_start {
            self.cursor.advance(start + unscanned.len());
        }

        if *transaction.op() == TransactionOp::Pageload {
            collect_navigator_context(
                &self.platform.probe_client(),
                &mut self.browser_context,
                &self.measurements,
            );
            transaction.set_context(
                BROWSER_CONTEXT,
                Context::Browser(self.browser_context.clone()),
            );
            transaction.set_measurements(self.measurements.snapshot());
        }
    }

    pub fn options(&self) -> &BrowserTracingOptions {
        &self.options
    }

    /// Index of the first timeline entry the next scan will examine.
    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

    pub fn measurements(&self) -> &MeasurementAccumulator {
        &self.measurements
    }

    pub fn browser_context(&self) -> &BrowserContext {
        &self.browser_context
    }

    pub fn vitals(&self) -> &WebVitalObservers {
        &self.vitals
    }

    /// Detaches the vital observers. Later firings are no longer recorded.
    pub fn unsubscribe_vitals(&mut self) {
        self.vitals.unsubscribe_all();
    }
}
