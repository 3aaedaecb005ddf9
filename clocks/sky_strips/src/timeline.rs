//! Timeline module - strip coordinate system and drift correction
//!
//! Every strip is a fixed-width virtual canvas covering 48 hours around the
//! gradient base. The focus time moves freely; the canvas is re-anchored only
//! when the focus drifts more than two hours away, and is otherwise slid
//! sideways by the residual drift.

use chrono::{DateTime, Duration, Utc};

/// Hours covered by one strip
pub const VISIBLE_HOURS: f64 = 48.0;

/// Milliseconds per hour
pub const HOUR_MS: i64 = 3_600_000;

/// Drift beyond which the gradient base snaps to the focus time
pub const RESYNC_THRESHOLD_MS: i64 = 2 * HOUR_MS;

/// Default horizontal scale
pub const DEFAULT_PIXELS_PER_HOUR: f64 = 80.0;

/// Linear mapping between time offsets and strip pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineScale {
    pub pixels_per_hour: f64,
}

impl Default for TimelineScale {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_HOUR)
    }
}

impl TimelineScale {
    pub fn new(pixels_per_hour: f64) -> Self {
        Self { pixels_per_hour }
    }

    /// Full strip width in pixels
    pub fn strip_width(&self) -> f64 {
        VISIBLE_HOURS * self.pixels_per_hour
    }

    pub fn half_width(&self) -> f64 {
        self.strip_width() / 2.0
    }

    pub fn hours_to_pixels(&self, hours: f64) -> f64 {
        hours * self.pixels_per_hour
    }

    /// Time span covered by a pixel distance (millisecond precision)
    pub fn pixels_to_duration(&self, pixels: f64) -> Duration {
        let ms = pixels / self.pixels_per_hour * HOUR_MS as f64;
        Duration::milliseconds(ms.round() as i64)
    }

    /// Signed hours from `base` to `instant`
    pub fn hour_offset(&self, instant: DateTime<Utc>, base: DateTime<Utc>) -> f64 {
        (instant - base).num_milliseconds() as f64 / HOUR_MS as f64
    }

    /// Position of `instant` on a strip anchored at `base` (0 = left edge)
    pub fn strip_x(&self, instant: DateTime<Utc>, base: DateTime<Utc>) -> f64 {
        self.half_width() + self.hours_to_pixels(self.hour_offset(instant, base))
    }

    /// Whether a strip position falls on the strip, allowing `overscan` pixels either side
    pub fn contains(&self, x: f64, overscan: f64) -> bool {
        x >= -overscan && x <= self.strip_width() + overscan
    }
}

fn half_window() -> Duration {
    Duration::milliseconds((VISIBLE_HOURS / 2.0 * HOUR_MS as f64) as i64)
}

/// Instant at the left edge of a strip anchored at `base`
pub fn window_start(base: DateTime<Utc>) -> DateTime<Utc> {
    base - half_window()
}

/// Instant at the right edge of a strip anchored at `base`
pub fn window_end(base: DateTime<Utc>) -> DateTime<Utc> {
    base + half_window()
}

/// What a focus change costs the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resync {
    /// Base unchanged; strips only slide by the new drift
    Translated,
    /// Base re-anchored; gradients must be regenerated
    Recomputed,
}

/// Focus time plus the gradient base it is rendered against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTracker {
    focus: DateTime<Utc>,
    base: DateTime<Utc>,
}

impl FocusTracker {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            focus: now,
            base: now,
        }
    }

    pub fn focus(&self) -> DateTime<Utc> {
        self.focus
    }

    pub fn base(&self) -> DateTime<Utc> {
        self.base
    }

    /// Move the focus; re-anchors the base when drift exceeds the threshold
    pub fn set_focus(&mut self, focus: DateTime<Utc>) -> Resync {
        self.focus = focus;
        if self.drift_ms().abs() > RESYNC_THRESHOLD_MS {
            self.base = focus;
            Resync::Recomputed
        } else {
            Resync::Translated
        }
    }

    pub fn shift_focus(&mut self, delta: Duration) -> Resync {
        self.set_focus(self.focus + delta)
    }

    /// Move focus and base together regardless of drift
    pub fn jump_to(&mut self, instant: DateTime<Utc>) -> Resync {
        self.focus = instant;
        self.base = instant;
        Resync::Recomputed
    }

    pub fn drift_ms(&self) -> i64 {
        (self.focus - self.base).num_milliseconds()
    }

    pub fn drift_pixels(&self, scale: &TimelineScale) -> f64 {
        self.drift_ms() as f64 / HOUR_MS as f64 * scale.pixels_per_hour
    }

    /// Horizontal offset applied to every strip layer so the focus sits at x = 0
    pub fn translation(&self, scale: &TimelineScale) -> f64 {
        -(scale.half_width() + self.drift_pixels(scale))
    }

    /// Strip position to viewport position (0 = viewport center)
    pub fn to_viewport(&self, strip_x: f64, scale: &TimelineScale) -> f64 {
        strip_x + self.translation(scale)
    }

    /// Strip position currently under the viewport center
    pub fn center_strip_x(&self, scale: &TimelineScale) -> f64 {
        scale.half_width() + self.drift_pixels(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_scale_conversions() {
        let scale = TimelineScale::new(80.0);
        assert_eq!(scale.strip_width(), 3840.0);
        assert_eq!(scale.hours_to_pixels(1.5), 120.0);
        assert_eq!(scale.pixels_to_duration(-160.0), Duration::hours(-2));

        let base = instant("2024-03-14T12:00:00Z");
        assert_eq!(scale.strip_x(base, base), 1920.0);
        assert_eq!(scale.strip_x(window_start(base), base), 0.0);
        assert_eq!(scale.strip_x(window_end(base), base), 3840.0);
        assert_eq!(scale.hour_offset(base + Duration::minutes(90), base), 1.5);
    }

    #[test]
    fn test_small_moves_only_translate() {
        let base = instant("2024-03-14T12:00:00Z");
        let mut tracker = FocusTracker::new(base);
        let scale = TimelineScale::new(80.0);

        assert_eq!(tracker.shift_focus(Duration::minutes(90)), Resync::Translated);
        assert_eq!(tracker.base(), base);
        assert_eq!(tracker.drift_pixels(&scale), 120.0);
        assert_eq!(tracker.translation(&scale), -(1920.0 + 120.0));

        // The focus instant lands on the viewport center
        let focus_x = scale.strip_x(tracker.focus(), tracker.base());
        assert_eq!(tracker.to_viewport(focus_x, &scale), 0.0);
    }

    #[test]
    fn test_exactly_two_hours_does_not_resync() {
        let base = instant("2024-03-14T12:00:00Z");
        let mut tracker = FocusTracker::new(base);
        assert_eq!(tracker.shift_focus(Duration::hours(2)), Resync::Translated);
        assert_eq!(tracker.shift_focus(Duration::milliseconds(1)), Resync::Recomputed);
        assert_eq!(tracker.base(), tracker.focus());
        assert_eq!(tracker.drift_ms(), 0);
    }

    #[test]
    fn test_backward_drift_resyncs() {
        let base = instant("2024-03-14T12:00:00Z");
        let mut tracker = FocusTracker::new(base);
        assert_eq!(tracker.shift_focus(Duration::hours(-3)), Resync::Recomputed);
        assert_eq!(tracker.base(), base - Duration::hours(3));
    }

    #[test]
    fn test_jump_to_forces_recompute() {
        let base = instant("2024-03-14T12:00:00Z");
        let mut tracker = FocusTracker::new(base);
        tracker.shift_focus(Duration::minutes(30));
        let now = instant("2024-03-14T12:45:00Z");
        assert_eq!(tracker.jump_to(now), Resync::Recomputed);
        assert_eq!(tracker.focus(), now);
        assert_eq!(tracker.base(), now);
    }

    proptest! {
        #[test]
        fn drift_stays_bounded(steps in prop::collection::vec(-30_000_000i64..30_000_000, 1..60)) {
            let mut tracker = FocusTracker::new(instant("2024-03-14T12:00:00Z"));
            for step in steps {
                tracker.shift_focus(Duration::milliseconds(step));
                prop_assert!(tracker.drift_ms().abs() <= RESYNC_THRESHOLD_MS);
            }
        }
    }
}
