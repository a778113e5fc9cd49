//! Critical-path sections and their aggregation onto collapsed rows.
//!
//! The critical path arrives as per-span time sections, unsorted and
//! possibly duplicated. An expanded row shows only its own sections; a
//! collapsed row shows the sections of its whole hidden subtree, merged
//! into minimal contiguous windows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::trace::Trace;

/// One stretch of the trace's end-to-end bottleneck path, attributed to a
/// span. Bounds lie within the span's own time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathSection {
    pub span_id: String,
    pub section_start: u64,
    pub section_end: u64,
}

/// Critical-path sections with a one-time per-span group-by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalPath {
    sections: Vec<CriticalPathSection>,
    by_span: HashMap<String, Vec<usize>>,
}

impl CriticalPath {
    pub fn new(sections: Vec<CriticalPathSection>) -> Self {
        let mut by_span: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, section) in sections.iter().enumerate() {
            by_span.entry(section.span_id.clone()).or_default().push(i);
        }
        Self { sections, by_span }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections to draw on one row.
    ///
    /// Expanded: the span's own sections, in input order. Collapsed: the
    /// sections of the span plus its hidden subtree, filtered in input
    /// order and merged wherever one section ends exactly where the
    /// previously accumulated one starts.
    pub fn sections_for(
        &self,
        trace: &Trace,
        span_id: &str,
        is_collapsed: bool,
    ) -> Vec<CriticalPathSection> {
        if !is_collapsed {
            return match self.by_span.get(span_id) {
                Some(indices) => indices.iter().map(|&i| self.sections[i].clone()).collect(),
                None => Vec::new(),
            };
        }

        let subtree = trace.subtree_span_ids(span_id);
        let mut merged: Vec<CriticalPathSection> = Vec::new();
        for section in &self.sections {
            if !subtree.contains(&section.span_id) {
                continue;
            }
            let contiguous = merged
                .first()
                .is_some_and(|head| section.section_end == head.section_start);
            if contiguous {
                // Extend the accumulated window backward.
                merged[0].section_start = section.section_start;
            } else {
                merged.insert(0, section.clone());
            }
        }
        merged
    }
}
