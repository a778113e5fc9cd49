//! Detail-row state: which spans have their detail panel open, and which
//! sub-sections inside each panel are expanded.
//!
//! The row engine only consumes presence (`DetailStates::has`); the
//! sub-toggles ride along for the detail renderer. Same transition
//! discipline as `collapse`: pure functions over `Arc`-wrapped state,
//! same-`Arc` return on no-op.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Open/closed state of one span's detail panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    pub attrs_open: bool,
    pub process_open: bool,
    pub events_open: bool,
    /// Indices of individually expanded event entries.
    pub open_event_items: HashSet<usize>,
}

impl DetailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_attrs(&self) -> Self {
        Self {
            attrs_open: !self.attrs_open,
            ..self.clone()
        }
    }

    pub fn toggle_process(&self) -> Self {
        Self {
            process_open: !self.process_open,
            ..self.clone()
        }
    }

    pub fn toggle_events(&self) -> Self {
        Self {
            events_open: !self.events_open,
            ..self.clone()
        }
    }

    pub fn toggle_event_item(&self, event_index: usize) -> Self {
        let mut next = self.clone();
        if !next.open_event_items.remove(&event_index) {
            next.open_event_items.insert(event_index);
        }
        next
    }
}

/// Span id → detail state for every open detail row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailStates {
    map: HashMap<String, DetailState>,
}

impl DetailStates {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn has(&self, span_id: &str) -> bool {
        self.map.contains_key(span_id)
    }

    pub fn get(&self, span_id: &str) -> Option<&DetailState> {
        self.map.get(span_id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn set(&mut self, span_id: String, state: DetailState) {
        self.map.insert(span_id, state);
    }
}

/// Open the detail row for a span, or close it if already open.
pub fn toggle_detail(states: &Arc<DetailStates>, span_id: &str) -> Arc<DetailStates> {
    let mut map = states.map.clone();
    if map.remove(span_id).is_none() {
        map.insert(span_id.to_string(), DetailState::new());
    }
    Arc::new(DetailStates { map })
}

fn with_detail(
    states: &Arc<DetailStates>,
    span_id: &str,
    f: impl FnOnce(&DetailState) -> DetailState,
) -> Arc<DetailStates> {
    // Sub-toggles on a closed detail row are no-ops.
    let Some(old) = states.map.get(span_id) else {
        return Arc::clone(states);
    };
    let next = f(old);
    let mut map = states.map.clone();
    map.insert(span_id.to_string(), next);
    Arc::new(DetailStates { map })
}

pub fn toggle_detail_attrs(states: &Arc<DetailStates>, span_id: &str) -> Arc<DetailStates> {
    with_detail(states, span_id, DetailState::toggle_attrs)
}

pub fn toggle_detail_process(states: &Arc<DetailStates>, span_id: &str) -> Arc<DetailStates> {
    with_detail(states, span_id, DetailState::toggle_process)
}

pub fn toggle_detail_events(states: &Arc<DetailStates>, span_id: &str) -> Arc<DetailStates> {
    with_detail(states, span_id, DetailState::toggle_events)
}

pub fn toggle_detail_event_item(
    states: &Arc<DetailStates>,
    span_id: &str,
    event_index: usize,
) -> Arc<DetailStates> {
    with_detail(states, span_id, |d| d.toggle_event_item(event_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: detail toggle opens with a fresh state and closes again
    #[test]
    fn test_toggle_detail() {
        let states = DetailStates::new();
        let open = toggle_detail(&states, "a");
        assert!(open.has("a"));
        assert_eq!(open.get("a"), Some(&DetailState::new()));

        let closed = toggle_detail(&open, "a");
        assert!(!closed.has("a"));
    }

    /// Test: sub-toggles flip their flag and are no-ops on closed rows
    #[test]
    fn test_sub_toggles() {
        let states = DetailStates::new();

        // Closed row: same reference back.
        let noop = toggle_detail_events(&states, "a");
        assert!(Arc::ptr_eq(&states, &noop));

        let open = toggle_detail(&states, "a");
        let events = toggle_detail_events(&open, "a");
        assert!(events.get("a").unwrap().events_open);

        let item = toggle_detail_event_item(&events, "a", 2);
        assert!(item.get("a").unwrap().open_event_items.contains(&2));
        let item = toggle_detail_event_item(&item, "a", 2);
        assert!(item.get("a").unwrap().open_event_items.is_empty());
    }
}
