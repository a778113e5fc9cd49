//! Row visibility engine: flattens the span tree plus collapse/detail state
//! into the ordered list of renderable rows.
//!
//! One linear pass over the pre-order span array. A collapsed span still
//! emits its own BAR row; everything strictly deeper is skipped until the
//! walk climbs back above the collapse depth. Row order always matches the
//! trace's pre-order, whatever the collapse state.

use log::debug;
use std::sync::Arc;

use crate::collapse::CollapseState;
use crate::detail::DetailStates;
use crate::span::Span;
use crate::trace::Trace;

/// Height of a span bar row.
pub const BAR_ROW_HEIGHT: f32 = 28.0;
/// Height of a detail row without event entries.
pub const DETAIL_ROW_HEIGHT: f32 = 161.0;
/// Height of a detail row with event entries.
pub const DETAIL_ROW_HEIGHT_WITH_EVENTS: f32 = 197.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Bar,
    Detail,
}

/// One renderable line: a span's bar, or its expanded detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub span_index: usize,
    pub kind: RowKind,
}

/// Ordered row list with the index/key accessors the renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowList {
    rows: Vec<Row>,
}

/// Flatten spans + collapse/detail state into the visible row list.
pub fn compute_rows(
    spans: &[Span],
    collapse: &CollapseState,
    details: &DetailStates,
) -> RowList {
    let mut rows = Vec::with_capacity(spans.len());
    let mut collapse_depth: Option<usize> = None;
    for (i, span) in spans.iter().enumerate() {
        if let Some(depth) = collapse_depth {
            if span.depth >= depth {
                // Inside a collapsed ancestor's subtree.
                continue;
            }
            collapse_depth = None;
        }
        if collapse.is_collapsed(&span.span_id) {
            collapse_depth = Some(span.depth + 1);
        }
        rows.push(Row {
            span_index: i,
            kind: RowKind::Bar,
        });
        if details.has(&span.span_id) {
            rows.push(Row {
                span_index: i,
                kind: RowKind::Detail,
            });
        }
    }
    debug!("{} rows from {} spans", rows.len(), spans.len());
    RowList { rows }
}

impl RowList {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, row_index: usize) -> Option<Row> {
        self.rows.get(row_index).copied()
    }

    pub fn span_index(&self, row_index: usize) -> Option<usize> {
        self.get(row_index).map(|r| r.span_index)
    }

    /// Row of a span's BAR row; `None` when the span is hidden.
    pub fn row_of_span(&self, span_index: usize) -> Option<usize> {
        self.rows.iter().position(|r| r.span_index == span_index)
    }

    /// Stable row key, `"{span_id}--bar"` or `"{span_id}--detail"`.
    pub fn key_of(&self, row_index: usize, spans: &[Span]) -> Option<String> {
        let row = self.get(row_index)?;
        let span = spans.get(row.span_index)?;
        let suffix = match row.kind {
            RowKind::Bar => "bar",
            RowKind::Detail => "detail",
        };
        Some(format!("{}--{}", span.span_id, suffix))
    }

    /// Inverse of [`RowList::key_of`]. A miss is a defined miss, not an
    /// error: unknown ids, hidden rows and malformed keys all map to `None`.
    pub fn index_of_key(&self, key: &str, spans: &[Span]) -> Option<usize> {
        let (span_id, suffix) = key.rsplit_once("--")?;
        let kind = match suffix {
            "bar" => RowKind::Bar,
            "detail" => RowKind::Detail,
            _ => return None,
        };
        self.rows.iter().position(|r| {
            r.kind == kind
                && spans
                    .get(r.span_index)
                    .is_some_and(|s| s.span_id == span_id)
        })
    }

    /// Per-row height: bars are fixed, detail rows grow when the span
    /// carries event entries.
    pub fn row_height(&self, row_index: usize, spans: &[Span]) -> Option<f32> {
        let row = self.get(row_index)?;
        match row.kind {
            RowKind::Bar => Some(BAR_ROW_HEIGHT),
            RowKind::Detail => {
                let span = spans.get(row.span_index)?;
                if span.has_events() {
                    Some(DETAIL_ROW_HEIGHT_WITH_EVENTS)
                } else {
                    Some(DETAIL_ROW_HEIGHT)
                }
            }
        }
    }
}

/// Identity-keyed memo for [`compute_rows`].
///
/// Inputs are compared with `Arc::ptr_eq`, not by value: mutating a held
/// input in place silently serves stale rows, so treat trace, collapse and
/// detail state as immutable values between recomputations.
#[derive(Debug, Default)]
pub struct RowCache {
    cached: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    trace: Arc<Trace>,
    collapse: Arc<CollapseState>,
    details: Arc<DetailStates>,
    rows: Arc<RowList>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(
        &mut self,
        trace: &Arc<Trace>,
        collapse: &Arc<CollapseState>,
        details: &Arc<DetailStates>,
    ) -> Arc<RowList> {
        if let Some(entry) = &self.cached
            && Arc::ptr_eq(&entry.trace, trace)
            && Arc::ptr_eq(&entry.collapse, collapse)
            && Arc::ptr_eq(&entry.details, details)
        {
            return Arc::clone(&entry.rows);
        }
        let rows = Arc::new(compute_rows(trace.spans(), collapse, details));
        self.cached = Some(CacheEntry {
            trace: Arc::clone(trace),
            collapse: Arc::clone(collapse),
            details: Arc::clone(details),
            rows: Arc::clone(&rows),
        });
        rows
    }
}
