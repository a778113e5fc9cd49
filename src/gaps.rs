//! Sparse-trace gap compression.
//!
//! Traces with long idle periods (queued work, cross-region hops) render as
//! hairline spans on a mostly empty timeline. This module detects abnormal
//! idle gaps between spans and builds a mapper over a compressed time
//! domain where each such gap shrinks to a small fixed width.
//!
//! Gaps are ephemeral: recomputed per layout pass from the span list, never
//! persisted.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::coords::{BoundsMapper, ViewBounds, ViewRange};
use crate::span::Span;

/// Tuning for gap detection and compression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapConfig {
    pub enabled: bool,
    /// A gap collapses when it exceeds the larger neighboring span's
    /// duration times this multiplier.
    pub gap_threshold_multiplier: f64,
    /// Gaps shorter than this are ignored outright, in microseconds.
    pub min_gap_duration: u64,
    /// Upper bound on a collapsed gap's on-screen width, as a fraction of
    /// the full timeline.
    pub max_collapsed_gap_width: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gap_threshold_multiplier: 3.0,
            min_gap_duration: 1_000_000,
            max_collapsed_gap_width: 0.02,
        }
    }
}

/// One idle gap between two adjacent spans on the sorted timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineGap {
    pub start_time: u64,
    pub end_time: u64,
    pub duration: u64,
    pub preceding_span_end_time: u64,
    pub following_span_start_time: u64,
    pub should_collapse: bool,
    /// Visual width as a fraction of the trace duration: capped when
    /// collapsing, the natural width otherwise.
    pub collapsed_width_fraction: f64,
}

/// Detect idle gaps between spans sorted by start time.
///
/// Non-positive gaps (overlapping or back-to-back spans) and gaps shorter
/// than `min_gap_duration` are discarded.
pub fn analyze_gaps(spans: &[Span], trace_duration: u64, config: &GapConfig) -> Vec<TimelineGap> {
    if !config.enabled || trace_duration == 0 || spans.len() < 2 {
        return Vec::new();
    }

    let mut sorted: Vec<&Span> = spans.iter().collect();
    sorted.sort_by_key(|s| s.start_micros);

    let mut gaps = Vec::new();
    for pair in sorted.windows(2) {
        let (preceding, following) = (pair[0], pair[1]);
        let preceding_end = preceding.end_micros();
        let following_start = following.start_micros;
        if following_start <= preceding_end {
            continue;
        }
        let duration = following_start - preceding_end;
        if duration < config.min_gap_duration {
            continue;
        }
        let surrounding = preceding.duration_micros.max(following.duration_micros);
        let should_collapse =
            duration as f64 > surrounding as f64 * config.gap_threshold_multiplier;
        let original_fraction = duration as f64 / trace_duration as f64;
        let collapsed_width_fraction = if should_collapse {
            config.max_collapsed_gap_width.min(original_fraction * 0.1)
        } else {
            original_fraction
        };
        gaps.push(TimelineGap {
            start_time: preceding_end,
            end_time: following_start,
            duration,
            preceding_span_end_time: preceding_end,
            following_span_start_time: following_start,
            should_collapse,
            collapsed_width_fraction,
        });
    }

    let collapsible = gaps.iter().filter(|g| g.should_collapse).count();
    debug!("{} gaps, {} collapsible", gaps.len(), collapsible);
    gaps
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CollapsedGap {
    start: f64,
    end: f64,
    duration: f64,
    /// Time removed from the domain when this gap collapses.
    removed: f64,
    /// On-screen width of the collapsed gap, in domain time units.
    compressed_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct CompressedMapper {
    view_min: f64,
    view_window: f64,
    gaps: Vec<CollapsedGap>,
}

/// Mapper over the (possibly) gap-compressed timeline.
///
/// With no collapsible gaps this is exactly the plain [`BoundsMapper`].
#[derive(Debug, Clone, PartialEq)]
pub struct SparseBoundsMapper {
    inner: SparseInner,
}

#[derive(Debug, Clone, PartialEq)]
enum SparseInner {
    Plain(BoundsMapper),
    Compressed(CompressedMapper),
}

impl SparseBoundsMapper {
    pub fn new(range: &ViewRange, gaps: &[TimelineGap]) -> Self {
        let trace_duration = range.max - range.min;
        let collapsible: Vec<&TimelineGap> =
            gaps.iter().filter(|g| g.should_collapse).collect();
        if collapsible.is_empty() || trace_duration <= 0.0 {
            return Self {
                inner: SparseInner::Plain(BoundsMapper::new(range)),
            };
        }

        let mut compressed: Vec<CollapsedGap> = collapsible
            .iter()
            .map(|g| {
                let width = g.collapsed_width_fraction * trace_duration;
                CollapsedGap {
                    start: g.start_time as f64,
                    end: g.end_time as f64,
                    duration: g.duration as f64,
                    removed: g.duration as f64 - width,
                    compressed_width: width,
                }
            })
            .collect();
        compressed.sort_by(|a, b| a.start.total_cmp(&b.start));

        let total_removed: f64 = compressed.iter().map(|g| g.removed).sum();
        let compressed_duration = trace_duration - total_removed;
        let view_min = range.min + range.view_start * compressed_duration;
        let view_max =
            (range.min + compressed_duration) - (1.0 - range.view_end) * compressed_duration;

        Self {
            inner: SparseInner::Compressed(CompressedMapper {
                view_min,
                view_window: view_max - view_min,
                gaps: compressed,
            }),
        }
    }

    pub fn map(&self, start: f64, end: f64) -> ViewBounds {
        match &self.inner {
            SparseInner::Plain(mapper) => mapper.map(start, end),
            SparseInner::Compressed(mapper) => mapper.map(start, end),
        }
    }
}

impl CompressedMapper {
    /// Shift an absolute timestamp onto the compressed timeline.
    ///
    /// Timestamps past a collapsed gap lose that gap's removed time; a
    /// timestamp inside a collapsed gap is interpolated across the gap's
    /// compressed width, minus the removed time of earlier gaps. The
    /// earlier-gap subtraction is deliberately recomputed per interior
    /// point to match the reference arithmetic; see the monotonicity test
    /// below before changing it.
    fn compress(&self, t: f64) -> f64 {
        let mut adjusted = t;
        for (i, gap) in self.gaps.iter().enumerate() {
            if t > gap.end {
                adjusted -= gap.removed;
            } else if t >= gap.start {
                let frac = if gap.duration > 0.0 {
                    (t - gap.start) / gap.duration
                } else {
                    0.0
                };
                adjusted = gap.start + frac * gap.compressed_width;
                for earlier in &self.gaps[..i] {
                    if earlier.end < gap.start {
                        adjusted -= earlier.removed;
                    }
                }
                break;
            }
        }
        adjusted
    }

    fn map(&self, start: f64, end: f64) -> ViewBounds {
        if self.view_window == 0.0 {
            return ViewBounds {
                start: 0.0,
                end: 0.0,
            };
        }
        ViewBounds {
            start: (self.compress(start) - self.view_min) / self.view_window,
            end: (self.compress(end) - self.view_min) / self.view_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn timed_span(id: &str, start: u64, duration: u64) -> Span {
        Span {
            span_id: id.into(),
            start_micros: start,
            duration_micros: duration,
            ..Span::default()
        }
    }

    fn lenient() -> GapConfig {
        GapConfig {
            min_gap_duration: 1_000,
            ..GapConfig::default()
        }
    }

    /// Test: a large idle gap between spans is found and marked collapsible
    #[test]
    fn test_identifies_gap() {
        let spans = vec![timed_span("a", 1_000, 100), timed_span("b", 5_000, 200)];
        let gaps = analyze_gaps(&spans, 4_200, &lenient());

        assert_eq!(gaps.len(), 1);
        let gap = &gaps[0];
        assert_eq!(gap.start_time, 1_100);
        assert_eq!(gap.end_time, 5_000);
        assert_eq!(gap.duration, 3_900);
        assert_eq!(gap.preceding_span_end_time, 1_100);
        assert_eq!(gap.following_span_start_time, 5_000);
        // 3900 > 200 * 3
        assert!(gap.should_collapse);
    }

    /// Test: a 1.05s gap next to 50ms/10ms spans collapses and gets the
    /// capped width
    #[test]
    fn test_collapse_threshold_and_width_cap() {
        let spans = vec![
            timed_span("a", 0, 50_000),
            timed_span("b", 1_100_000, 10_000),
        ];
        let gaps = analyze_gaps(&spans, 1_110_000, &GapConfig::default());

        assert_eq!(gaps.len(), 1);
        let gap = &gaps[0];
        assert_eq!(gap.duration, 1_050_000);
        // 1_050_000 > 3 * 50_000
        assert!(gap.should_collapse);
        let original = 1_050_000.0 / 1_110_000.0;
        assert!((gap.collapsed_width_fraction - f64::min(0.02, original * 0.1)).abs() < 1e-12);
        assert_eq!(gap.collapsed_width_fraction, 0.02);
    }

    /// Test: a gap not exceeding the surrounding-duration threshold keeps
    /// its natural width
    #[test]
    fn test_small_gap_not_collapsed() {
        let spans = vec![
            timed_span("a", 0, 1_000_000),
            timed_span("b", 2_500_000, 1_000_000),
        ];
        let gaps = analyze_gaps(&spans, 3_500_000, &GapConfig::default());

        assert_eq!(gaps.len(), 1);
        let gap = &gaps[0];
        // 1_500_000 <= 3 * 1_000_000
        assert!(!gap.should_collapse);
        let original = 1_500_000.0 / 3_500_000.0;
        assert!((gap.collapsed_width_fraction - original).abs() < 1e-12);
    }

    /// Test: overlapping and back-to-back spans produce no gap
    #[test]
    fn test_overlapping_spans() {
        let spans = vec![timed_span("a", 1_000, 2_000), timed_span("b", 1_500, 1_000)];
        assert!(analyze_gaps(&spans, 2_000, &lenient()).is_empty());

        let spans = vec![timed_span("a", 0, 1_000), timed_span("b", 1_000, 1_000)];
        assert!(analyze_gaps(&spans, 2_000, &lenient()).is_empty());
    }

    /// Test: gaps below min_gap_duration are discarded
    #[test]
    fn test_min_gap_duration() {
        let spans = vec![timed_span("a", 1_000, 100), timed_span("b", 1_500, 100)];
        assert!(analyze_gaps(&spans, 600, &GapConfig::default()).is_empty());
    }

    /// Test: span order does not matter, detection sorts by start time
    #[test]
    fn test_unsorted_input() {
        let spans = vec![timed_span("b", 5_000, 200), timed_span("a", 1_000, 100)];
        let gaps = analyze_gaps(&spans, 4_200, &lenient());
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].duration, 3_900);
    }

    /// Test: disabled config yields no gaps
    #[test]
    fn test_disabled() {
        let spans = vec![timed_span("a", 1_000, 100), timed_span("b", 5_000, 200)];
        let config = GapConfig {
            enabled: false,
            ..lenient()
        };
        assert!(analyze_gaps(&spans, 4_200, &config).is_empty());
    }

    /// Test: with no collapsible gaps the sparse mapper matches the plain one
    #[test]
    fn test_delegates_without_collapsible_gaps() {
        let range = ViewRange::full(1_000.0, 5_000.0);
        let mapper = SparseBoundsMapper::new(&range, &[]);
        let bounds = mapper.map(2_000.0, 3_000.0);
        assert!((bounds.start - 0.25).abs() < 1e-12);
        assert!((bounds.end - 0.5).abs() < 1e-12);
    }

    fn collapsible_gap(start: u64, end: u64, width_fraction: f64) -> TimelineGap {
        TimelineGap {
            start_time: start,
            end_time: end,
            duration: end - start,
            preceding_span_end_time: start,
            following_span_start_time: end,
            should_collapse: true,
            collapsed_width_fraction: width_fraction,
        }
    }

    /// Test: collapsing a dominant gap pulls the far span leftward into view
    #[test]
    fn test_compresses_timeline() {
        let range = ViewRange::full(1_000.0, 10_000.0);
        let gaps = vec![collapsible_gap(2_000, 8_000, 0.02)];
        let sparse = SparseBoundsMapper::new(&range, &gaps);
        let plain = BoundsMapper::new(&range);

        let before = sparse.map(1_500.0, 1_800.0);
        assert!(before.start > 0.0 && before.end < 1.0);

        let after = sparse.map(8_500.0, 9_000.0);
        assert!(after.start > 0.0 && after.end < 1.0);
        // Far side of the gap lands much further left than uncompressed.
        assert!(after.end < plain.map(8_500.0, 9_000.0).start);

        // Interior of the gap stays inside its compressed sliver.
        let inside = sparse.map(2_000.0, 8_000.0);
        let width = inside.end - inside.start;
        assert!(width > 0.0 && width < 0.1);
    }

    /// Test: compressed mapping is (weakly) monotone across multiple
    /// collapsible gaps — guards the ported per-gap arithmetic
    #[test]
    fn test_compressed_mapping_monotonic() {
        let _ = env_logger::builder().is_test(true).try_init();
        let range = ViewRange::full(0.0, 100_000_000.0);
        let gaps = vec![
            collapsible_gap(5_000_000, 30_000_000, 0.02),
            collapsible_gap(40_000_000, 45_000_000, 0.01),
            collapsible_gap(60_000_000, 95_000_000, 0.02),
        ];
        let mapper = SparseBoundsMapper::new(&range, &gaps);

        let mut prev = f64::NEG_INFINITY;
        let mut t = 0.0;
        while t <= 100_000_000.0 {
            let mapped = mapper.map(t, t).start;
            assert!(
                mapped >= prev - 1e-9,
                "mapping decreased at t={}: {} < {}",
                t,
                mapped,
                prev
            );
            prev = mapped;
            t += 50_000.0;
        }
    }

    /// Test: pinched zoom over the compressed domain hits the zero-window
    /// guard instead of dividing
    #[test]
    fn test_zero_compressed_window() {
        let range = ViewRange {
            min: 0.0,
            max: 10_000_000.0,
            view_start: 0.5,
            view_end: 0.5,
        };
        let gaps = vec![collapsible_gap(1_000_000, 9_000_000, 0.02)];
        let mapper = SparseBoundsMapper::new(&range, &gaps);
        let bounds = mapper.map(500_000.0, 9_500_000.0);
        assert_eq!(bounds.start, 0.0);
        assert_eq!(bounds.end, 0.0);
    }
}
