//! Collapse/expand state: which span subtrees are hidden from the row list.
//!
//! Transitions are pure: each takes the current state behind an `Arc` and
//! returns either a new state or a clone of the same `Arc` when nothing
//! changed, so callers can skip recomputation with `Arc::ptr_eq`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::detail::{DetailState, DetailStates};
use crate::span::Span;
use crate::trace::Trace;

/// Set of span ids whose subtree (not the span itself) is hidden.
///
/// Membership only has a visual effect for spans with `has_children`; a
/// collapsed leaf is a legal member that renders identically to an expanded
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState {
    hidden: HashSet<String>,
}

impl CollapseState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn from_ids<I: IntoIterator<Item = String>>(ids: I) -> Arc<Self> {
        Arc::new(Self {
            hidden: ids.into_iter().collect(),
        })
    }

    pub fn is_collapsed(&self, span_id: &str) -> bool {
        self.hidden.contains(span_id)
    }

    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    pub fn hidden_ids(&self) -> &HashSet<String> {
        &self.hidden
    }
}

/// Already fully collapsed?
///
/// This compares the count of hidden ids against the count of spans with
/// children, not set membership. A set of the same size but different
/// membership is treated as fully collapsed; kept as-is because downstream
/// behavior depends on it.
fn collapse_disabled(spans: &[Span], state: &CollapseState) -> bool {
    let parent_count = spans.iter().filter(|s| s.has_children).count();
    parent_count == state.hidden.len()
}

/// Flip the collapsed state of one span's subtree.
pub fn toggle_children(state: &Arc<CollapseState>, span_id: &str) -> Arc<CollapseState> {
    let mut hidden = state.hidden.clone();
    if !hidden.remove(span_id) {
        hidden.insert(span_id.to_string());
    }
    Arc::new(CollapseState { hidden })
}

/// Reveal every subtree.
pub fn expand_all(state: &Arc<CollapseState>) -> Arc<CollapseState> {
    if state.hidden.is_empty() {
        return Arc::clone(state);
    }
    CollapseState::new()
}

/// Hide every subtree. No-op when already fully collapsed (see
/// [`collapse_disabled`] for the guard semantics).
pub fn collapse_all(state: &Arc<CollapseState>, spans: &[Span]) -> Arc<CollapseState> {
    if collapse_disabled(spans, state) {
        return Arc::clone(state);
    }
    let hidden = spans
        .iter()
        .filter(|s| s.has_children)
        .map(|s| s.span_id.clone())
        .collect();
    Arc::new(CollapseState { hidden })
}

/// Hide one more frontier level across every branch.
///
/// Walks the pre-order sequence tracking the nearest candidate ancestor;
/// when the walk leaves a candidate's subtree the candidate is finalized
/// into the hidden set.
pub fn collapse_one(state: &Arc<CollapseState>, spans: &[Span]) -> Arc<CollapseState> {
    if collapse_disabled(spans, state) {
        return Arc::clone(state);
    }
    let mut hidden = state.hidden.clone();
    let mut candidate: Option<&Span> = None;
    for span in spans {
        if let Some(ancestor) = candidate
            && span.depth <= ancestor.depth
        {
            // Left the candidate's subtree: it is part of the frontier.
            hidden.insert(ancestor.span_id.clone());
            if span.has_children {
                candidate = Some(span);
            }
        } else if span.has_children && !hidden.contains(&span.span_id) {
            candidate = Some(span);
        }
    }
    if let Some(ancestor) = candidate {
        hidden.insert(ancestor.span_id.clone());
    }
    Arc::new(CollapseState { hidden })
}

/// Reveal one frontier level per branch, mirroring [`collapse_one`].
pub fn expand_one(state: &Arc<CollapseState>, spans: &[Span]) -> Arc<CollapseState> {
    if state.hidden.is_empty() {
        return Arc::clone(state);
    }
    let mut hidden = state.hidden.clone();
    let mut prev_expanded_depth: Option<usize> = None;
    let mut expand_next_hidden = true;
    for span in spans {
        if let Some(depth) = prev_expanded_depth
            && span.depth <= depth
        {
            expand_next_hidden = true;
        }
        if expand_next_hidden && hidden.remove(&span.span_id) {
            expand_next_hidden = false;
            prev_expanded_depth = Some(span.depth);
        }
    }
    Arc::new(CollapseState { hidden })
}

/// Focus a set of matched spans: collapse everything, then reveal each
/// match's ancestor chain and open a detail row per match.
pub fn focus_matches(
    trace: &Trace,
    matched_ids: &HashSet<String>,
) -> (Arc<CollapseState>, Arc<DetailStates>) {
    let mut hidden: HashSet<String> = trace
        .spans()
        .iter()
        .map(|s| s.span_id.clone())
        .collect();
    let mut details = DetailStates::default();
    for id in matched_ids {
        let Some(index) = trace.index_of(id) else {
            continue;
        };
        details.set(id.clone(), DetailState::new());
        for ancestor in trace.ancestor_ids(index) {
            hidden.remove(&ancestor);
        }
    }
    (
        Arc::new(CollapseState { hidden }),
        Arc::new(details),
    )
}
