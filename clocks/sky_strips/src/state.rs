//! State module - headless application state driven by input events
//!
//! The nannou shell translates window events into calls on [`SkyState`] and
//! reads back what to draw. Nothing in here touches the window or the disk.

use std::time::Instant;

use chrono::{DateTime, Utc};
use shared::{search, CatalogEntry, ClockFormat, SpaSun};

use crate::cities::{City, CityId, CityList, CityRecord};
use crate::gradient::{GradientCache, SkyGradient};
use crate::pan::{nudge, wheel_delta, NudgeDirection};
use crate::persistence::{Debouncer, NowTicker, Preferences, Startup, NOW_REFRESH, SAVE_DEBOUNCE};
use crate::reorder::{DisplayMode, FrameCoalescer, RowMetrics};
use crate::session::{PointerSession, PointerTarget, SessionEnd};
use crate::timeline::{FocusTracker, Resync, TimelineScale};
use crate::tokens;

/// City search overlay
#[derive(Debug, Default)]
pub struct SearchState {
    pub is_open: bool,
    pub query: String,
    pub results: Vec<CatalogEntry>,
    pub should_focus: bool,
}

impl SearchState {
    pub fn open(&mut self) {
        self.is_open = true;
        self.query.clear();
        self.results = search("");
        self.should_focus = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.query.clear();
        self.results.clear();
    }

    pub fn update_results(&mut self) {
        self.results = search(&self.query);
    }
}

pub struct SkyState {
    cities: CityList,
    tracker: FocusTracker,
    scale: TimelineScale,
    session: PointerSession,
    frames: FrameCoalescer<f64>,
    gradients: GradientCache,
    sun: SpaSun,
    /// Live instant for the now marker
    now: DateTime<Utc>,
    display_mode: DisplayMode,
    clock_format: ClockFormat,
    pub search: SearchState,
    /// A text field outside the search overlay has keyboard focus
    text_focus: bool,
    ticker: NowTicker,
    save_debounce: Debouncer,
    /// Monotonic time of the last tick
    clock: Instant,
}

impl SkyState {
    pub fn new(startup: Startup, scale: TimelineScale, now: DateTime<Utc>, clock: Instant) -> Self {
        Self {
            cities: startup.cities,
            tracker: FocusTracker::new(now),
            scale,
            session: PointerSession::Idle,
            frames: FrameCoalescer::default(),
            gradients: GradientCache::default(),
            sun: SpaSun,
            now,
            display_mode: startup.display_mode,
            clock_format: startup.clock_format,
            search: SearchState::default(),
            text_focus: false,
            ticker: NowTicker::new(NOW_REFRESH, clock),
            save_debounce: Debouncer::new(SAVE_DEBOUNCE),
            clock,
        }
    }

    pub fn cities(&self) -> &CityList {
        &self.cities
    }

    pub fn tracker(&self) -> &FocusTracker {
        &self.tracker
    }

    pub fn scale(&self) -> &TimelineScale {
        &self.scale
    }

    pub fn sun(&self) -> &SpaSun {
        &self.sun
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn clock_format(&self) -> ClockFormat {
        self.clock_format
    }

    pub fn metrics(&self) -> RowMetrics {
        self.display_mode.metrics()
    }

    pub fn session(&self) -> &PointerSession {
        &self.session
    }

    /// Periodic work: refresh "now" and report preferences due for saving
    pub fn tick(&mut self, clock: Instant, now: DateTime<Utc>) -> Option<Preferences> {
        self.clock = clock;
        if self.ticker.poll(clock) {
            self.now = now;
        }
        self.save_debounce.poll(clock).then(|| self.preferences())
    }

    /// Frame callback: apply the latest coalesced reorder delta
    pub fn animation_frame(&mut self) {
        if let Some(delta_y) = self.frames.take() {
            self.session.set_reorder_delta(delta_y);
        }
    }

    pub fn pointer_down(&mut self, target: PointerTarget, x: f64, y: f64) -> bool {
        self.session
            .begin(target, x, y, self.tracker.focus(), &self.cities)
    }

    /// `y` grows downward
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        match &self.session {
            PointerSession::Idle => {}
            PointerSession::Panning(_) => {
                let resync = self.session.pan_to(x, &mut self.tracker, &self.scale);
                log_resync(resync, &self.tracker);
            }
            PointerSession::Reordering(drag) => {
                let delta_y = drag.delta_for(y);
                self.frames.push(delta_y);
            }
        }
    }

    /// Release: flush the newest delta so the drop sees it and no frame fires later
    pub fn pointer_up(&mut self) {
        if let Some(delta_y) = self.frames.take() {
            self.session.set_reorder_delta(delta_y);
        }
        let row_height = self.metrics().row_height();
        if let SessionEnd::Reordered { moved: true, .. } = self.session.end(&mut self.cities, row_height) {
            self.cities_changed();
        }
    }

    pub fn wheel(&mut self, delta_x: f64, delta_y: f64) {
        let resync = self.tracker.shift_focus(wheel_delta(delta_x, delta_y, &self.scale));
        log_resync(Some(resync), &self.tracker);
    }

    pub fn set_text_focus(&mut self, focused: bool) {
        self.text_focus = focused;
    }

    /// Keystrokes belong to a text field, not to the timeline
    pub fn is_typing(&self) -> bool {
        self.search.is_open || self.text_focus
    }

    /// Arrow key; ignored while typing
    pub fn nudge(&mut self, direction: NudgeDirection, modified: bool) {
        if self.is_typing() {
            return;
        }
        let resync = self.tracker.shift_focus(nudge(direction, modified));
        log_resync(Some(resync), &self.tracker);
    }

    /// Center every strip on the current instant
    pub fn jump_to_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
        self.tracker.jump_to(now);
        tracing::debug!(%now, "jumped to now");
    }

    pub fn escape(&mut self) {
        if self.search.is_open {
            self.search.close();
        }
    }

    pub fn add_city(&mut self, record: &CityRecord) {
        match self.cities.add(record) {
            Ok(_) => {
                tracing::info!(city = %record.name, timezone = %record.timezone, "added city");
                self.cities_changed();
            }
            Err(e) => tracing::warn!("not adding city: {}", e),
        }
    }

    pub fn remove_city(&mut self, id: CityId) {
        if self.cities.remove(id) {
            self.gradients.forget(id);
            self.cities_changed();
        }
    }

    pub fn toggle_display_mode(&mut self) {
        self.display_mode = self.display_mode.toggled();
        self.save_debounce.schedule(self.clock);
    }

    pub fn toggle_clock_format(&mut self) {
        self.clock_format = self.clock_format.toggled();
        self.save_debounce.schedule(self.clock);
    }

    pub fn is_save_pending(&self) -> bool {
        self.save_debounce.is_pending()
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            display_mode: self.display_mode,
            clock_format: self.clock_format,
            cities: self.cities.records(),
        }
    }

    pub fn share_token(&self) -> String {
        tokens::encode(&self.cities.records())
    }

    /// Gradient for the city at `index` against the current base
    pub fn gradient(&mut self, index: usize) -> Option<&SkyGradient> {
        let city = self.cities.get(index)?;
        Some(self.gradients.gradient_for(city, self.tracker.base(), &self.sun))
    }

    /// Make sure every city has a gradient for the current base
    pub fn refresh_gradients(&mut self) {
        for index in 0..self.cities.len() {
            self.gradient(index);
        }
    }

    /// Gradient generated by the last refresh, if the base has not moved since
    pub fn cached_gradient(&self, id: CityId) -> Option<&SkyGradient> {
        self.gradients.get(id, self.tracker.base())
    }

    /// Cities in list order with their live preview offsets
    pub fn rows(&self) -> impl Iterator<Item = (usize, &City, f64)> {
        let row_height = self.metrics().row_height();
        let count = self.cities.len();
        let drag = self.session.reorder().copied();
        self.cities.iter().enumerate().map(move |(index, city)| {
            let offset = drag.map_or(0.0, |d| d.row_offset(index, row_height, count));
            (index, city, offset)
        })
    }

    fn cities_changed(&mut self) {
        tracing::info!(token = %self.share_token(), "city list changed");
        self.save_debounce.schedule(self.clock);
    }
}

fn log_resync(resync: Option<Resync>, tracker: &FocusTracker) {
    if resync == Some(Resync::Recomputed) {
        tracing::debug!(base = %tracker.base(), "focus drifted past threshold; rebasing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::tests::{abcd, record};
    use crate::persistence::StartupSource;
    use chrono::Duration;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn state() -> (SkyState, Instant) {
        let clock = Instant::now();
        let startup = Startup {
            cities: abcd(),
            display_mode: DisplayMode::Comfortable,
            clock_format: ClockFormat::TwelveHour,
            source: StartupSource::Saved,
        };
        let state = SkyState::new(
            startup,
            TimelineScale::new(80.0),
            instant("2024-03-14T12:00:00Z"),
            clock,
        );
        (state, clock)
    }

    fn names(state: &SkyState) -> Vec<String> {
        state.cities().iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_pan_drag_end_to_end() {
        let (mut state, _) = state();
        let start = state.tracker().focus();
        assert!(state.pointer_down(PointerTarget::Timeline, 400.0, 10.0));
        state.pointer_move(240.0, 10.0);
        assert_eq!(state.tracker().focus(), start + Duration::hours(2));
        state.pointer_up();
        assert!(state.session().is_idle());
        assert!(!state.is_save_pending());
    }

    #[test]
    fn test_reorder_waits_for_frame() {
        let (mut state, _) = state();
        let b = state.cities().get(1).unwrap().id();
        state.pointer_down(PointerTarget::Handle { city_id: b }, 0.0, 100.0);
        state.pointer_move(0.0, 120.0);
        state.pointer_move(0.0, 100.0 + 80.0);

        // Nothing applied until the frame fires
        let offsets: Vec<f64> = state.rows().map(|(_, _, o)| o).collect();
        assert_eq!(offsets, vec![0.0; 4]);

        state.animation_frame();
        let offsets: Vec<f64> = state.rows().map(|(_, _, o)| o).collect();
        assert_eq!(offsets, vec![0.0, 80.0, -76.0, 0.0]);
    }

    #[test]
    fn test_reorder_commit_uses_latest_delta() {
        let (mut state, _) = state();
        let b = state.cities().get(1).unwrap().id();
        state.pointer_down(PointerTarget::Handle { city_id: b }, 0.0, 100.0);
        // Released before any frame fired
        state.pointer_move(0.0, 100.0 + 160.0);
        state.pointer_up();

        assert_eq!(names(&state), vec!["A", "C", "D", "B"]);
        assert!(state.is_save_pending());
        state.animation_frame();
        assert!(state.session().is_idle());
    }

    #[test]
    fn test_reorder_moved_back_before_release_keeps_order() {
        let (mut state, _) = state();
        let b = state.cities().get(1).unwrap().id();
        state.pointer_down(PointerTarget::Handle { city_id: b }, 0.0, 100.0);
        state.pointer_move(0.0, 100.0 + 160.0);
        state.animation_frame();
        state.pointer_move(0.0, 100.0);
        state.pointer_up();

        assert_eq!(names(&state), vec!["A", "B", "C", "D"]);
        assert!(!state.is_save_pending());
        // No stale update after the reset
        state.animation_frame();
        assert!(state.session().is_idle());
        let offsets: Vec<f64> = state.rows().map(|(_, _, o)| o).collect();
        assert_eq!(offsets, vec![0.0; 4]);
    }

    #[test]
    fn test_nudge_suppressed_by_search() {
        let (mut state, _) = state();
        let start = state.tracker().focus();
        state.search.open();
        state.nudge(NudgeDirection::Later, false);
        assert_eq!(state.tracker().focus(), start);

        state.escape();
        assert!(!state.search.is_open);
        assert!(state.search.query.is_empty());
        state.nudge(NudgeDirection::Later, true);
        assert_eq!(state.tracker().focus(), start + Duration::hours(1));
    }

    #[test]
    fn test_nudge_suppressed_by_text_focus() {
        let (mut state, _) = state();
        let start = state.tracker().focus();
        state.set_text_focus(true);
        assert!(state.is_typing());
        state.nudge(NudgeDirection::Earlier, false);
        assert_eq!(state.tracker().focus(), start);

        state.set_text_focus(false);
        state.nudge(NudgeDirection::Earlier, false);
        assert_eq!(state.tracker().focus(), start - Duration::minutes(15));
    }

    #[test]
    fn test_wheel_and_jump_to_now() {
        let (mut state, _) = state();
        let start = state.tracker().focus();
        state.wheel(0.0, -400.0);
        assert_eq!(state.tracker().focus(), start + Duration::hours(5));
        assert_eq!(state.tracker().base(), state.tracker().focus());

        state.wheel(80.0, 0.0);
        assert_eq!(state.tracker().drift_ms(), 3_600_000);

        let now = instant("2024-03-20T08:00:00Z");
        state.jump_to_now(now);
        assert_eq!(state.tracker().focus(), now);
        assert_eq!(state.tracker().base(), now);
        assert_eq!(state.now(), now);
    }

    #[test]
    fn test_changes_save_after_debounce() {
        let (mut state, clock) = state();
        state.toggle_clock_format();
        let t1 = clock + std::time::Duration::from_millis(100);
        assert!(state.tick(t1, state.now()).is_none());
        state.add_city(&record("Lagos", "Africa/Lagos"));

        let t2 = t1 + std::time::Duration::from_millis(250);
        assert!(state.tick(t2, state.now()).is_none());

        let t3 = t1 + std::time::Duration::from_millis(400);
        let prefs = state.tick(t3, state.now()).unwrap();
        assert_eq!(prefs.clock_format, ClockFormat::TwentyFourHour);
        assert_eq!(prefs.cities.len(), 5);
        assert!(state.tick(t3, state.now()).is_none());
    }

    #[test]
    fn test_remove_keeps_one_city() {
        let (mut state, _) = state();
        let ids: Vec<CityId> = state.cities().iter().map(City::id).collect();
        for id in ids {
            state.remove_city(id);
        }
        assert_eq!(state.cities().len(), 1);
        assert_eq!(names(&state), vec!["D"]);
    }

    #[test]
    fn test_now_refreshes_on_cadence() {
        let (mut state, clock) = state();
        let later = instant("2024-03-14T12:00:31Z");
        state.tick(clock + std::time::Duration::from_secs(10), later);
        assert_eq!(state.now(), instant("2024-03-14T12:00:00Z"));
        state.tick(clock + std::time::Duration::from_secs(31), later);
        assert_eq!(state.now(), later);
        // The live instant never moves focus
        assert_eq!(state.tracker().focus(), instant("2024-03-14T12:00:00Z"));
    }

    #[test]
    fn test_gradients_follow_base() {
        let (mut state, _) = state();
        let before = state.gradient(0).unwrap().clone();
        state.wheel(-40.0, 0.0);
        assert_eq!(state.gradient(0).unwrap(), &before);
        // -30 min, then three hours forward crosses the threshold
        for _ in 0..3 {
            state.nudge(NudgeDirection::Later, true);
        }
        assert_ne!(state.gradient(0).unwrap(), &before);
        assert!(state.gradient(9).is_none());

        let id = state.cities().get(0).unwrap().id();
        state.wheel(0.0, -400.0);
        assert!(state.cached_gradient(id).is_none());
        state.refresh_gradients();
        assert!(state.cached_gradient(id).is_some());
    }

    #[test]
    fn test_share_token_tracks_order() {
        let (state, _) = state();
        assert_eq!(
            state.share_token(),
            "A@Europe/London,B@Asia/Tokyo,C@America/New_York,D@Asia/Tokyo"
        );
    }
}
