//! Pan module - pointer drag, wheel and keyboard input mapped to focus time

use chrono::{DateTime, Duration, Utc};

use crate::timeline::TimelineScale;

/// Arrow-key step without modifiers
pub const NUDGE_STEP_MINUTES: i64 = 15;

/// Arrow-key step with a modifier held
pub const NUDGE_STEP_MODIFIED_MINUTES: i64 = 60;

/// Drag captured at pointer-down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanDrag {
    pub start_x: f64,
    pub start_focus: DateTime<Utc>,
}

impl PanDrag {
    pub fn begin(start_x: f64, start_focus: DateTime<Utc>) -> Self {
        Self {
            start_x,
            start_focus,
        }
    }

    /// Focus time for the pointer at `x`; dragging right moves time backward
    pub fn focus_at(&self, x: f64, scale: &TimelineScale) -> DateTime<Utc> {
        self.start_focus - scale.pixels_to_duration(x - self.start_x)
    }
}

/// Focus delta for one wheel event (both axes pan time)
pub fn wheel_delta(delta_x: f64, delta_y: f64, scale: &TimelineScale) -> Duration {
    scale.pixels_to_duration(delta_x - delta_y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Earlier,
    Later,
}

/// Focus delta for an arrow key
pub fn nudge(direction: NudgeDirection, modified: bool) -> Duration {
    let minutes = if modified {
        NUDGE_STEP_MODIFIED_MINUTES
    } else {
        NUDGE_STEP_MINUTES
    };
    match direction {
        NudgeDirection::Earlier => Duration::minutes(-minutes),
        NudgeDirection::Later => Duration::minutes(minutes),
    }
}
