//! Coordinate mapping: absolute time ranges to `[0, 1]` screen fractions
//! under a zoom window.

use serde::{Deserialize, Serialize};

/// Absolute trace bounds plus a zoom window in `[0, 1]` fractions of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRange {
    pub min: f64,
    pub max: f64,
    pub view_start: f64,
    pub view_end: f64,
}

impl ViewRange {
    /// Full, unzoomed view over `[min, max]`.
    pub fn full(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            view_start: 0.0,
            view_end: 1.0,
        }
    }
}

/// Screen-fraction bounds of a mapped sub-range. Values outside `[0, 1]`
/// mean the sub-range is (partly) outside the zoom window; clipping is the
/// renderer's call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub start: f64,
    pub end: f64,
}

/// Affine mapper from absolute time to view fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsMapper {
    view_min: f64,
    view_window: f64,
}

impl BoundsMapper {
    pub fn new(range: &ViewRange) -> Self {
        let duration = range.max - range.min;
        let view_min = range.min + range.view_start * duration;
        let view_max = range.max - (1.0 - range.view_end) * duration;
        Self {
            view_min,
            view_window: view_max - view_min,
        }
    }

    /// Map an absolute `[start, end]` sub-range to view fractions.
    ///
    /// A degenerate view window (zero-duration trace or fully collapsed
    /// zoom) maps everything to `{0, 0}` instead of dividing.
    pub fn map(&self, start: f64, end: f64) -> ViewBounds {
        if self.view_window == 0.0 {
            return ViewBounds {
                start: 0.0,
                end: 0.0,
            };
        }
        ViewBounds {
            start: (start - self.view_min) / self.view_window,
            end: (end - self.view_min) / self.view_window,
        }
    }
}
