//! trace-timeline - Trace timeline engine
//!
//! Pure, deterministic core of an interactive distributed-trace timeline:
//! flattens a span tree plus collapse/detail state into renderable rows,
//! maps absolute time onto zoomed (optionally gap-compressed) screen
//! fractions, and derives per-row facts for collapsed subtrees (merged
//! critical-path windows, bubbled errors, synthetic RPC bars,
//! uninstrumented-hop markers).
//!
//! The rendering layer, state store, and trace ingestion live outside this
//! crate; everything here is a pure function of (trace, collapse state,
//! detail state, view range, critical path).

pub mod attrs;
pub mod collapse;
pub mod color;
pub mod coords;
pub mod critical;
pub mod detail;
pub mod facts;
pub mod gaps;
pub mod rows;
pub mod span;
pub mod trace;

#[cfg(test)]
mod testutil;

// Re-export the types a renderer touches on every frame
pub use attrs::{AttrValue, Attrs, PEER_SERVICE};
pub use collapse::CollapseState;
pub use coords::{BoundsMapper, ViewBounds, ViewRange};
pub use critical::{CriticalPath, CriticalPathSection};
pub use detail::{DetailState, DetailStates};
pub use facts::{ErrorContext, RpcMarker, UninstrumentedHop};
pub use gaps::{GapConfig, SparseBoundsMapper, TimelineGap};
pub use rows::{Row, RowCache, RowKind, RowList, compute_rows};
pub use span::{Span, SpanEvent, SpanKind};
pub use trace::{Trace, TraceError};
