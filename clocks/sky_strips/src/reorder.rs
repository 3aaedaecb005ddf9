//! Reorder module - drag-to-reorder preview and frame coalescing
//!
//! While a row is dragged by its handle, the other rows between its origin
//! and the current target slide one row-height to make room. Nothing in the
//! city list changes until the pointer is released.

use serde::{Deserialize, Serialize};

use crate::cities::CityId;

/// Row density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Comfortable,
    Compact,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Comfortable => DisplayMode::Compact,
            DisplayMode::Compact => DisplayMode::Comfortable,
        }
    }

    pub fn metrics(self) -> RowMetrics {
        match self {
            DisplayMode::Comfortable => RowMetrics {
                strip_height: 64.0,
                gap: 12.0,
            },
            DisplayMode::Compact => RowMetrics {
                strip_height: 40.0,
                gap: 6.0,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Comfortable => "Comfortable",
            DisplayMode::Compact => "Compact",
        }
    }
}

/// Vertical layout of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub strip_height: f64,
    pub gap: f64,
}

impl RowMetrics {
    /// Unit of reorder snapping
    pub fn row_height(&self) -> f64 {
        self.strip_height + self.gap
    }
}

/// A row being dragged by its handle
///
/// `delta_y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReorderDrag {
    pub city_id: CityId,
    pub origin_index: usize,
    pub start_y: f64,
    pub delta_y: f64,
}

impl ReorderDrag {
    pub fn begin(city_id: CityId, origin_index: usize, start_y: f64) -> Self {
        Self {
            city_id,
            origin_index,
            start_y,
            delta_y: 0.0,
        }
    }

    /// Delta for a pointer at `y`
    pub fn delta_for(&self, y: f64) -> f64 {
        y - self.start_y
    }

    /// Snapped drop position for the current delta
    pub fn target_index(&self, row_height: f64, city_count: usize) -> usize {
        if city_count == 0 || row_height <= 0.0 {
            return self.origin_index;
        }
        let rows = (self.delta_y / row_height).round() as i64;
        let max = city_count as i64 - 1;
        (self.origin_index as i64 + rows).clamp(0, max) as usize
    }

    /// Vertical offset of the row at `index` in the live preview
    pub fn row_offset(&self, index: usize, row_height: f64, city_count: usize) -> f64 {
        let origin = self.origin_index;
        if index == origin {
            return self.delta_y;
        }
        let target = self.target_index(row_height, city_count);
        if target > origin && index > origin && index <= target {
            -row_height
        } else if target < origin && index >= target && index < origin {
            row_height
        } else {
            0.0
        }
    }
}

/// Single-slot buffer collapsing bursts of updates into one per frame
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<T>,
    scheduled: bool,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            scheduled: false,
        }
    }
}

impl<T> FrameCoalescer<T> {
    /// Store an update, replacing any not yet applied
    ///
    /// Returns true when this push scheduled a new frame callback.
    pub fn push(&mut self, value: T) -> bool {
        self.pending = Some(value);
        let newly_scheduled = !self.scheduled;
        self.scheduled = true;
        newly_scheduled
    }

    /// Frame tick or flush: hand over the latest update and clear the schedule
    pub fn take(&mut self) -> Option<T> {
        self.scheduled = false;
        self.pending.take()
    }
}
