//! Core trace types for sillage.
//!
//! - `Transaction`: the root of a trace for one logical operation (a page
//!   load, a route change). It has a mutable start boundary, named contexts,
//!   named measurements, and a flat set of child spans.
//! - `Span`: one timed sub-operation owned by a transaction.
//! - `Measurement`: a named numeric quality signal, kept apart from the span tree.
//! - `TimelineEntry`: a record of the host's performance timeline, the raw
//!   material spans are projected from.
//!
//! Timeline entries are in milliseconds relative to the host's time origin;
//! spans and transactions are in seconds since the Unix epoch.

mod ids;
mod objects;
mod time;
mod timeline;

pub use ids::*;
pub use objects::*;
pub use time::*;
pub use timeline::*;
