//! Performance timeline instrumentation.
//!
//! Sillage watches a host's performance timeline and turns it into a trace:
//! a root [`Transaction`] with timed child spans for navigation phases,
//! marks, paints, measures and resource fetches, plus a flat set of
//! page-load measurements (first paint, largest contentful paint, first
//! input delay, connection quality).
//!
//! # Using this crate
//!
//! Implement [`Platform`] for your host (or use [`MemoryPlatform`] to replay
//! a recorded timeline), create one [`BrowserTracing`] per page, and hand it
//! each transaction you want populated:
//!
//! ```rust
//! use std::sync::Arc;
//! use sillage::{BrowserTracing, BrowserTracingOptions, MemoryPlatform, Platform};
//! use sillage::types::{TimedEntry, TimelineEntry, Transaction, TransactionOp};
//!
//! let platform = Arc::new(MemoryPlatform::new(1_700_000_000_000.0));
//! platform.push_entry(TimelineEntry::Paint(TimedEntry::new("first-paint", 234.0, 0.0)));
//!
//! let host: Arc<dyn Platform> = platform.clone();
//! let mut tracing = BrowserTracing::new(host, BrowserTracingOptions::default());
//!
//! let mut transaction = Transaction::new("/", TransactionOp::Pageload, 1_700_000_000.0);
//! tracing.add_performance_entries(&mut transaction);
//! assert_eq!(transaction.measurements().get("fp"), Some(234.0));
//! ```
//!
//! # Configuration
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `SILLAGE_CURSOR_ADVANCE` | `past-end` (default) or `reexamine-last` |
//! | `SILLAGE_TRACING_INIT_MARK` | Name of the mark placed when tracing starts |
//! | `SILLAGE_TRACK_VITALS` | `0`/`false` disables the vital observers |
//!
//! These are read by [`BrowserTracingOptions::from_env`]; plain
//! [`BrowserTracingOptions::default`] ignores the environment.

pub use sillage_browser::*;
pub use sillage_types as types;
pub use sillage_types::{Transaction, TransactionOp};
