//! Session module - the one pointer gesture in progress, if any
//!
//! Panning and reordering are mutually exclusive; a handle press starts a
//! reorder and never reaches the pan controller.

use chrono::{DateTime, Utc};

use crate::cities::{CityId, CityList};
use crate::pan::PanDrag;
use crate::reorder::ReorderDrag;
use crate::timeline::{FocusTracker, Resync, TimelineScale};

/// Where a pointer-down landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    /// Drag handle of a row
    Handle { city_id: CityId },
    /// Anywhere on the strips
    Timeline,
    /// Outside the interactive area
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerSession {
    #[default]
    Idle,
    Panning(PanDrag),
    Reordering(ReorderDrag),
}

/// Outcome of a pointer-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    None,
    Panned,
    /// Reorder released; `moved` is false when the row dropped back on its origin
    Reordered { from: usize, to: usize, moved: bool },
}

impl PointerSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, PointerSession::Idle)
    }

    pub fn reorder(&self) -> Option<&ReorderDrag> {
        match self {
            PointerSession::Reordering(drag) => Some(drag),
            _ => None,
        }
    }

    /// Start a gesture; ignored while another one is active
    pub fn begin(
        &mut self,
        target: PointerTarget,
        x: f64,
        y: f64,
        focus: DateTime<Utc>,
        cities: &CityList,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = match target {
            PointerTarget::Handle { city_id } => match cities.index_of(city_id) {
                Some(origin) => PointerSession::Reordering(ReorderDrag::begin(city_id, origin, y)),
                None => return false,
            },
            PointerTarget::Timeline => PointerSession::Panning(PanDrag::begin(x, focus)),
            PointerTarget::Outside => return false,
        };
        true
    }

    /// Apply a pan move immediately; returns the resync it caused
    pub fn pan_to(&self, x: f64, tracker: &mut FocusTracker, scale: &TimelineScale) -> Option<Resync> {
        match self {
            PointerSession::Panning(drag) => Some(tracker.set_focus(drag.focus_at(x, scale))),
            _ => None,
        }
    }

    /// Apply a coalesced reorder delta
    pub fn set_reorder_delta(&mut self, delta_y: f64) {
        if let PointerSession::Reordering(drag) = self {
            drag.delta_y = delta_y;
        }
    }

    /// Finish the gesture, committing a reorder if the target moved
    pub fn end(&mut self, cities: &mut CityList, row_height: f64) -> SessionEnd {
        let finished = std::mem::take(self);
        match finished {
            PointerSession::Idle => SessionEnd::None,
            PointerSession::Panning(_) => SessionEnd::Panned,
            PointerSession::Reordering(drag) => {
                let to = drag.target_index(row_height, cities.len());
                let from = drag.origin_index;
                let moved = from != to && cities.move_city(from, to);
                if moved {
                    tracing::debug!(city = ?drag.city_id, from, to, "reordered city");
                }
                SessionEnd::Reordered { from, to, moved }
            }
        }
    }
}
