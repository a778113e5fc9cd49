//! Trace: an ordered span sequence with derived lookups.
//!
//! `Trace::new` is the ingestion boundary: it validates the depth-first
//! pre-order invariant once and fails loudly, so the scans in `rows`,
//! `collapse`, `facts` and `critical` can assume a well-formed sequence.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::span::Span;

/// Trace construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// First span of a trace must sit at depth 0.
    RootDepth { depth: usize },
    /// Depth may grow by at most one between adjacent spans in pre-order.
    DepthJump { index: usize, prev: usize, depth: usize },
    /// Span ids must be unique within a trace.
    DuplicateSpanId { span_id: String },
    /// `end_micros` must not precede `start_micros`.
    InvertedBounds { start_micros: u64, end_micros: u64 },
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::RootDepth { depth } => {
                write!(f, "first span must have depth 0, got {}", depth)
            }
            TraceError::DepthJump { index, prev, depth } => write!(
                f,
                "span {} jumps from depth {} to {}; not a pre-order sequence",
                index, prev, depth
            ),
            TraceError::DuplicateSpanId { span_id } => {
                write!(f, "duplicate span id: {}", span_id)
            }
            TraceError::InvertedBounds {
                start_micros,
                end_micros,
            } => write!(
                f,
                "trace ends ({}) before it starts ({})",
                end_micros, start_micros
            ),
        }
    }
}

impl std::error::Error for TraceError {}

/// A trace: absolute time bounds plus the pre-order span sequence.
///
/// Read-only once built. The id→index lookup is derived and skipped during
/// serialization; call [`Trace::restore_lookup`] after deserializing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    pub trace_id: String,
    pub start_micros: u64,
    pub end_micros: u64,
    spans: Vec<Span>,
    #[serde(skip)]
    index_by_id: HashMap<String, usize>,
}

impl Trace {
    pub fn new(
        trace_id: impl Into<String>,
        spans: Vec<Span>,
        start_micros: u64,
        end_micros: u64,
    ) -> Result<Self, TraceError> {
        if end_micros < start_micros {
            return Err(TraceError::InvertedBounds {
                start_micros,
                end_micros,
            });
        }
        if let Some(first) = spans.first()
            && first.depth != 0
        {
            return Err(TraceError::RootDepth { depth: first.depth });
        }
        for i in 1..spans.len() {
            let prev = spans[i - 1].depth;
            let depth = spans[i].depth;
            if depth > prev + 1 {
                return Err(TraceError::DepthJump { index: i, prev, depth });
            }
        }

        let mut index_by_id = HashMap::with_capacity(spans.len());
        for (i, span) in spans.iter().enumerate() {
            if index_by_id.insert(span.span_id.clone(), i).is_some() {
                return Err(TraceError::DuplicateSpanId {
                    span_id: span.span_id.clone(),
                });
            }
        }

        let trace_id = trace_id.into();
        debug!("trace {}: {} spans", trace_id, spans.len());

        Ok(Self {
            trace_id,
            start_micros,
            end_micros,
            spans,
            index_by_id,
        })
    }

    /// Rebuild the id→index lookup after deserialization.
    pub fn restore_lookup(&mut self) {
        self.index_by_id = self
            .spans
            .iter()
            .enumerate()
            .map(|(i, s)| (s.span_id.clone(), i))
            .collect();
    }

    pub fn duration_micros(&self) -> u64 {
        self.end_micros - self.start_micros
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<&Span> {
        self.spans.get(index)
    }

    pub fn index_of(&self, span_id: &str) -> Option<usize> {
        self.index_by_id.get(span_id).copied()
    }

    pub fn span_by_id(&self, span_id: &str) -> Option<&Span> {
        self.index_of(span_id).and_then(|i| self.spans.get(i))
    }

    /// Ancestor ids of the span at `index`, nearest first.
    ///
    /// Walks the pre-order array backwards picking up each strictly smaller
    /// depth until a root is reached.
    pub fn ancestor_ids(&self, index: usize) -> Vec<String> {
        let mut ancestors = Vec::new();
        let Some(span) = self.spans.get(index) else {
            return ancestors;
        };
        let mut depth = span.depth;
        for prev in self.spans[..index].iter().rev() {
            if prev.depth < depth {
                ancestors.push(prev.span_id.clone());
                depth = prev.depth;
                if depth == 0 {
                    break;
                }
            }
        }
        ancestors
    }

    /// Ids of the span plus its whole subtree, following child-id links.
    pub fn subtree_span_ids(&self, span_id: &str) -> HashSet<String> {
        let mut ids = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(span_id.to_string());
        while let Some(id) = queue.pop_front() {
            if !ids.insert(id.clone()) {
                continue;
            }
            if let Some(span) = self.span_by_id(&id)
                && span.has_children
            {
                queue.extend(span.child_span_ids.iter().cloned());
            }
        }
        ids
    }
}
