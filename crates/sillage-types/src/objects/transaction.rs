use facet::Facet;
use std::collections::BTreeMap;

use crate::{Context, Measurements, Span, SpanContext, SpanId, TraceId};

/// Operation kind of a transaction.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum TransactionOp {
    /// A full document load.
    Pageload,
    /// An in-page route change after the initial load.
    Navigation,
    Other(String),
}

impl TransactionOp {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pageload => "pageload",
            Self::Navigation => "navigation",
            Self::Other(op) => op,
        }
    }
}

impl From<&str> for TransactionOp {
    fn from(value: &str) -> Self {
        match value {
            "pageload" => Self::Pageload,
            "navigation" => Self::Navigation,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Root of a trace for one logical operation.
///
/// Owns a flat set of child spans, a map of named contexts, and a map of
/// measurements. Timestamps are seconds since the Unix epoch.
#[derive(Facet, Debug, Clone)]
pub struct Transaction {
    trace_id: TraceId,
    span_id: SpanId,
    name: String,
    op: TransactionOp,
    start_timestamp: f64,
    end_timestamp: Option<f64>,
    contexts: BTreeMap<String, Context>,
    measurements: Measurements,
    spans: Vec<Span>,
}

impl Transaction {
    pub fn new(name: impl Into<String>, op: TransactionOp, start_timestamp: f64) -> Self {
        Self {
            trace_id: TraceId::next(),
            span_id: SpanId::next(),
            name: name.into(),
            op,
            start_timestamp,
            end_timestamp: None,
            contexts: BTreeMap::new(),
            measurements: Measurements::new(),
            spans: Vec::new(),
        }
    }

    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op(&self) -> &TransactionOp {
        &self.op
    }

    pub fn start_timestamp(&self) -> f64 {
        self.start_timestamp
    }

    pub fn set_start_timestamp(&mut self, start_timestamp: f64) {
        self.start_timestamp = start_timestamp;
    }

    pub fn end_timestamp(&self) -> Option<f64> {
        self.end_timestamp
    }

    /// Closes the transaction at `end_timestamp`. Later calls overwrite earlier ones.
    pub fn finish(&mut self, end_timestamp: f64) {
        self.end_timestamp = Some(end_timestamp);
    }

    /// Records a child span. The transaction's own boundary is left as is.
    pub fn start_child(&mut self, context: SpanContext) -> &Span {
        let SpanContext {
            description,
            op,
            start_timestamp,
            end_timestamp,
            data,
        } = context;
        let index = self.spans.len();
        self.spans.push(Span {
            span_id: SpanId::next(),
            parent_span_id: self.span_id,
            trace_id: self.trace_id,
            description,
            op,
            start_timestamp,
            end_timestamp,
            data,
        });
        &self.spans[index]
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn set_context(&mut self, name: impl Into<String>, context: Context) {
        self.contexts.insert(name.into(), context);
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn contexts(&self) -> &BTreeMap<String, Context> {
        &self.contexts
    }

    /// Replaces the transaction's measurements with `measurements`.
    pub fn set_measurements(&mut self, measurements: Measurements) {
        self.measurements = measurements;
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Latest end timestamp among the children, if any.
    pub fn latest_child_end(&self) -> Option<f64> {
        self.spans
            .iter()
            .map(|span| span.end_timestamp)
            .fold(None, |latest, end| match latest {
                Some(latest) if latest >= end => Some(latest),
                _ => Some(end),
            })
    }
}
