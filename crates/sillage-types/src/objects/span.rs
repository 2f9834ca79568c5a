use facet::Facet;
use std::collections::BTreeMap;

use crate::{SpanId, TraceId};

/// One timed operation owned by a transaction.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct Span {
    pub span_id: SpanId,

    /// Span id of the owning transaction.
    pub parent_span_id: SpanId,

    pub trace_id: TraceId,

    /// Free-text label, e.g. a resource path or a mark name.
    pub description: String,

    /// Operation kind tag (`browser`, `mark`, `resource.script`, ...).
    pub op: String,

    /// Seconds since the Unix epoch.
    pub start_timestamp: f64,

    /// Seconds since the Unix epoch.
    pub end_timestamp: f64,

    /// Auxiliary numeric data, such as transfer sizes.
    pub data: BTreeMap<String, u64>,
}

impl Span {
    pub fn duration(&self) -> f64 {
        self.end_timestamp - self.start_timestamp
    }
}

/// Caller-supplied fields for a new child span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanContext {
    pub description: String,
    pub op: String,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    pub data: BTreeMap<String, u64>,
}

impl SpanContext {
    pub fn new(
        description: impl Into<String>,
        op: impl Into<String>,
        start_timestamp: f64,
        end_timestamp: f64,
    ) -> Self {
        Self {
            description: description.into(),
            op: op.into(),
            start_timestamp,
            end_timestamp,
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: u64) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}
