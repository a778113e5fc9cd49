//! Span: one timed operation in a trace.
//!
//! Traces arrive as a flat array of spans in depth-first pre-order, with the
//! call-tree encoded by per-span depth markers. For a span at index `i` with
//! depth `d`, every descendant occupies the contiguous index range after `i`
//! with depth > `d`, ending at the first later index with depth <= `d`.
//! Every scan in this crate leans on that layout.

use serde::{Deserialize, Serialize};

use crate::attrs::{Attrs, PEER_SERVICE};

/// Span kind, as reported by the instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Client,
    Server,
    Producer,
    Consumer,
    Internal,
    #[default]
    Unspecified,
}

/// Timestamped event attached to a span (a log line, an exception, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    pub time_micros: u64,
    #[serde(default)]
    pub attrs: Attrs,
}

/// One timed operation in a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Unique within the trace.
    pub span_id: String,
    /// Depth in the call tree, root is 0.
    pub depth: usize,
    pub start_micros: u64,
    pub duration_micros: u64,
    pub operation_name: String,
    pub service_name: String,
    #[serde(default)]
    pub kind: SpanKind,
    /// Own error status; descendant errors are derived, see `facts`.
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub has_children: bool,
    /// Ids of direct children, pre-computed by the ingestion layer.
    #[serde(default)]
    pub child_span_ids: Vec<String>,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub events: Vec<SpanEvent>,
}

impl Span {
    pub fn end_micros(&self) -> u64 {
        self.start_micros + self.duration_micros
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// `peer.service` attribute, when the instrumentation recorded one.
    pub fn peer_service(&self) -> Option<&str> {
        self.attrs.get_str(PEER_SERVICE)
    }
}
