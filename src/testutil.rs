//! Shared fixtures for unit tests: depth-array span builders.

use crate::span::{Span, SpanKind};
use crate::trace::Trace;

/// Build spans `s0..sN` from a depth array, deriving `has_children` and
/// `child_span_ids` from the pre-order layout.
pub fn spans_from_depths(depths: &[usize]) -> Vec<Span> {
    let mut spans: Vec<Span> = depths
        .iter()
        .enumerate()
        .map(|(i, &depth)| Span {
            span_id: format!("s{}", i),
            depth,
            start_micros: i as u64 * 10,
            duration_micros: 5,
            operation_name: format!("op-{}", i),
            service_name: format!("svc-{}", i),
            kind: SpanKind::Internal,
            ..Span::default()
        })
        .collect();

    for i in 0..spans.len() {
        let depth = spans[i].depth;
        let mut children = Vec::new();
        for j in (i + 1)..spans.len() {
            if spans[j].depth <= depth {
                break;
            }
            if spans[j].depth == depth + 1 {
                children.push(spans[j].span_id.clone());
            }
        }
        spans[i].has_children = !children.is_empty();
        spans[i].child_span_ids = children;
    }
    spans
}

/// Build a trace from `(depth, error)` pairs.
pub fn span_tree(shape: &[(usize, bool)]) -> Trace {
    let depths: Vec<usize> = shape.iter().map(|&(d, _)| d).collect();
    let mut spans = spans_from_depths(&depths);
    for (span, &(_, error)) in spans.iter_mut().zip(shape) {
        span.error = error;
    }
    let end = spans.len() as u64 * 10 + 5;
    Trace::new("test", spans, 0, end).unwrap()
}
