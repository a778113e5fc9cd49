//! Descendant facts for collapsed rows: bubbled errors, the synthetic RPC
//! sub-bar for a collapsed client span, and the uninstrumented-hop marker.
//!
//! Every scan here relies on the pre-order layout: a span's descendants are
//! the contiguous run of strictly deeper spans right after it.

use crate::color::{Rgb, color_for_key};
use crate::span::{Span, SpanKind};

/// Error status of a span in context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorContext {
    /// This span or any descendant errored. Drives the error indicator.
    pub is_error: bool,
    /// This span itself errored. `is_error && !self_error` renders as a
    /// bubbled pill instead of a solid icon.
    pub self_error: bool,
}

/// True when at least one descendant of `parent_index` has an error.
pub fn span_contains_erred_span(spans: &[Span], parent_index: usize) -> bool {
    let Some(parent) = spans.get(parent_index) else {
        return false;
    };
    spans[parent_index + 1..]
        .iter()
        .take_while(|s| s.depth > parent.depth)
        .any(|s| s.error)
}

/// Ids of every erred descendant of `parent_index`, in trace order.
///
/// A bubbled-error click focuses these, space-joined.
pub fn descendant_errored_span_ids(spans: &[Span], parent_index: usize) -> Vec<String> {
    let Some(parent) = spans.get(parent_index) else {
        return Vec::new();
    };
    spans[parent_index + 1..]
        .iter()
        .take_while(|s| s.depth > parent.depth)
        .filter(|s| s.error)
        .map(|s| s.span_id.clone())
        .collect()
}

/// Own plus descendant error status for the span at `index`.
pub fn error_context(spans: &[Span], index: usize) -> ErrorContext {
    let self_error = spans.get(index).is_some_and(|s| s.error);
    ErrorContext {
        is_error: self_error || span_contains_erred_span(spans, index),
        self_error,
    }
}

/// Find the server-kind child of a client span.
///
/// Expects the first span of the slice to be the client parent; scans the
/// run of direct children (depth exactly one deeper) and returns the first
/// SERVER span. `None` when the precondition fails or the run ends without
/// a match.
pub fn find_server_child_span(spans: &[Span]) -> Option<&Span> {
    let parent = spans.first()?;
    if parent.kind != SpanKind::Client {
        return None;
    }
    let child_depth = parent.depth + 1;
    spans[1..]
        .iter()
        .take_while(|s| s.depth == child_depth)
        .find(|s| s.kind == SpanKind::Server)
}

/// Synthetic sub-bar drawn inside a collapsed client span to keep the
/// remote server call visible.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcMarker {
    pub service_name: String,
    pub operation_name: String,
    pub color: Rgb,
    pub start_micros: u64,
    pub duration_micros: u64,
}

/// Build the RPC marker for the collapsed span at `span_index`, if it is a
/// client span with a server child.
pub fn collapsed_rpc_marker(spans: &[Span], span_index: usize) -> Option<RpcMarker> {
    let server = find_server_child_span(spans.get(span_index..)?)?;
    Some(RpcMarker {
        service_name: server.service_name.clone(),
        operation_name: server.operation_name.clone(),
        color: color_for_key(&server.service_name),
        start_micros: server.start_micros,
        duration_micros: server.duration_micros,
    })
}

/// Marker for a call into an uninstrumented downstream service.
#[derive(Debug, Clone, PartialEq)]
pub struct UninstrumentedHop {
    pub service_name: String,
    pub color: Rgb,
}

/// A leaf CLIENT or PRODUCER span carrying `peer.service` is most likely a
/// request to a service that emits no spans of its own; surface the peer.
pub fn uninstrumented_hop(span: &Span) -> Option<UninstrumentedHop> {
    if span.has_children {
        return None;
    }
    if !matches!(span.kind, SpanKind::Client | SpanKind::Producer) {
        return None;
    }
    let peer = span.peer_service()?;
    Some(UninstrumentedHop {
        service_name: peer.to_string(),
        color: color_for_key(peer),
    })
}
