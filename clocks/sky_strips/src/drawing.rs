//! Drawing module - sky strips, markers and per-city readouts
//!
//! Strips are laid out top to bottom; each one is a 48-hour gradient slid
//! sideways so the focus time sits on the window's vertical center line.

use nannou::prelude::*;
use shared::LocalReading;

use crate::cities::City;
use crate::color::Rgb;
use crate::gradient::SkyGradient;
use crate::markers::{date_markers, hour_labels, now_marker, sun_markers, LabelWeight, SunEvent};
use crate::reorder::RowMetrics;
use crate::session::PointerTarget;
use crate::state::SkyState;
use crate::timeline::{FocusTracker, TimelineScale};

/// Night-sky palette for the chrome around the strips
pub mod colors {
    use nannou::prelude::*;

    /// Near-black navy background
    pub const BACKGROUND: Srgb<u8> = Srgb {
        red: 8,
        green: 10,
        blue: 20,
        standard: std::marker::PhantomData,
    };

    /// Placeholder fill while a gradient is not ready
    pub const STRIP_EMPTY: Srgb<u8> = Srgb {
        red: 24,
        green: 28,
        blue: 48,
        standard: std::marker::PhantomData,
    };

    /// Soft white for primary text
    pub const TEXT_PRIMARY: Srgb<u8> = Srgb {
        red: 240,
        green: 242,
        blue: 250,
        standard: std::marker::PhantomData,
    };

    /// Muted blue-grey for secondary text
    pub const TEXT_SECONDARY: Srgb<u8> = Srgb {
        red: 168,
        green: 176,
        blue: 200,
        standard: std::marker::PhantomData,
    };

    /// Focus line through every strip
    pub const FOCUS_LINE: Srgb<u8> = Srgb {
        red: 255,
        green: 255,
        blue: 255,
        standard: std::marker::PhantomData,
    };

    /// Live "now" marker
    pub const NOW_MARKER: Srgb<u8> = Srgb {
        red: 255,
        green: 92,
        blue: 92,
        standard: std::marker::PhantomData,
    };

    /// Sunrise/sunset markers
    pub const SUN_MARKER: Srgb<u8> = Srgb {
        red: 255,
        green: 214,
        blue: 102,
        standard: std::marker::PhantomData,
    };

    /// Outline of the row being dragged
    pub const DRAG_OUTLINE: Srgb<u8> = Srgb {
        red: 140,
        green: 190,
        blue: 255,
        standard: std::marker::PhantomData,
    };
}

/// Width of the readout panel at the left of each strip
const READOUT_WIDTH: f32 = 190.0;

/// Width of the drag handle inside the readout panel
const HANDLE_WIDTH: f32 = 22.0;

/// Horizontal shift of the second stroke used to embolden text
const BOLD_OFFSET: f32 = 0.7;

/// Screen layout of the strip stack
pub struct StripLayout {
    /// Y of the top edge of the first strip
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub strip_height: f32,
    pub row_height: f32,
}

impl StripLayout {
    pub fn calculate(window_rect: Rect, metrics: RowMetrics) -> Self {
        Self {
            top: window_rect.top() - 64.0,
            left: window_rect.left(),
            right: window_rect.right(),
            strip_height: metrics.strip_height as f32,
            row_height: metrics.row_height() as f32,
        }
    }

    /// Center Y of the row at `index`, shifted by a downward preview offset
    pub fn row_center_y(&self, index: usize, offset: f64) -> f32 {
        self.top - index as f32 * self.row_height - self.strip_height / 2.0 - offset as f32
    }

    /// What a press at `pos` would grab
    pub fn hit_test<'a>(&self, pos: Point2, cities: impl Iterator<Item = &'a City>) -> PointerTarget {
        for (index, city) in cities.enumerate() {
            let center_y = self.row_center_y(index, 0.0);
            if (pos.y - center_y).abs() > self.strip_height / 2.0 {
                continue;
            }
            if pos.x >= self.left && pos.x <= self.left + HANDLE_WIDTH {
                return PointerTarget::Handle { city_id: city.id() };
            }
            return PointerTarget::Timeline;
        }
        PointerTarget::Outside
    }
}

fn sky(color: Rgb) -> Srgb<u8> {
    srgb(color.r, color.g, color.b)
}

/// Draw every strip, the dragged one last so it floats above the rest
pub fn draw_strips(draw: &Draw, state: &SkyState, layout: &StripLayout) {
    let dragged = state.session().reorder().map(|d| d.city_id);

    for (index, city, offset) in state.rows() {
        if Some(city.id()) != dragged {
            draw_strip(draw, state, layout, index, city, offset, false);
        }
    }
    for (index, city, offset) in state.rows() {
        if Some(city.id()) == dragged {
            draw_strip(draw, state, layout, index, city, offset, true);
        }
    }

    draw_focus_line(draw, state, layout);
}

fn draw_strip(
    draw: &Draw,
    state: &SkyState,
    layout: &StripLayout,
    index: usize,
    city: &City,
    offset: f64,
    is_dragged: bool,
) {
    let center_y = layout.row_center_y(index, offset);
    let top = center_y + layout.strip_height / 2.0;
    let bottom = center_y - layout.strip_height / 2.0;
    let tracker = state.tracker();
    let scale = state.scale();
    let base = tracker.base();

    match state.cached_gradient(city.id()) {
        Some(gradient) if !gradient.stops.is_empty() => {
            draw_gradient(draw, gradient, tracker, scale, layout, top, bottom);
        }
        _ => {
            draw.rect()
                .x_y(0.0, center_y)
                .w_h(layout.right - layout.left, layout.strip_height)
                .color(colors::STRIP_EMPTY);
        }
    }

    for marker in date_markers(city.timezone, base, scale) {
        let x = tracker.to_viewport(marker.x, scale) as f32;
        draw.line()
            .start(pt2(x, top))
            .end(pt2(x, bottom))
            .color(srgba(255u8, 255u8, 255u8, 90u8))
            .weight(1.0);
        draw.text(&marker.label)
            .x_y(x + 34.0, top - 10.0)
            .color(colors::TEXT_PRIMARY)
            .font_size(11)
            .w(60.0)
            .left_justify();
    }

    let format = state.clock_format();
    for label in hour_labels(city.timezone, tracker, scale, format) {
        let x = tracker.to_viewport(label.x, scale) as f32;
        let alpha = (label.opacity() * 255.0) as u8;
        let color = srgba(240u8, 242u8, 250u8, alpha);
        // The default font has no bold face; overstrike emphasized labels
        let strokes: &[f32] = match label.weight() {
            LabelWeight::Bold => &[0.0, BOLD_OFFSET],
            LabelWeight::Regular => &[0.0],
        };
        for dx in strokes {
            draw.text(&label.text)
                .x_y(x + dx, bottom + 10.0)
                .color(color)
                .font_size(if label.emphasized { 13 } else { 11 })
                .w(60.0);
        }
    }

    for marker in sun_markers(city.timezone, city.coordinates, base, scale, format, state.sun()) {
        let x = tracker.to_viewport(marker.x, scale) as f32;
        let dot_y = match marker.event {
            SunEvent::Sunrise => top - 6.0,
            SunEvent::Sunset => bottom + 6.0,
        };
        draw.ellipse()
            .x_y(x, dot_y)
            .w_h(6.0, 6.0)
            .color(colors::SUN_MARKER);
        if layout.strip_height >= 56.0 {
            draw.text(&marker.time_text)
                .x_y(x, center_y)
                .color(colors::SUN_MARKER)
                .font_size(10)
                .w(70.0);
        }
    }

    if let Some(now_x) = now_marker(state.now(), base, scale) {
        let x = tracker.to_viewport(now_x, scale) as f32;
        draw.line()
            .start(pt2(x, top))
            .end(pt2(x, bottom))
            .color(colors::NOW_MARKER)
            .weight(2.0);
    }

    draw_readout(draw, state, layout, city, center_y);

    if is_dragged {
        draw.rect()
            .x_y(0.0, center_y)
            .w_h(layout.right - layout.left - 2.0, layout.strip_height)
            .no_fill()
            .stroke(colors::DRAG_OUTLINE)
            .stroke_weight(2.0);
    }
}

fn draw_gradient(
    draw: &Draw,
    gradient: &SkyGradient,
    tracker: &FocusTracker,
    scale: &TimelineScale,
    layout: &StripLayout,
    top: f32,
    bottom: f32,
) {
    let width = scale.strip_width();
    let to_x = |percent: f64| tracker.to_viewport(percent / 100.0 * width, scale) as f32;

    for pair in gradient.stops.windows(2) {
        let x0 = to_x(pair[0].percent);
        let x1 = to_x(pair[1].percent);
        if x1 < layout.left || x0 > layout.right {
            continue;
        }
        let c0 = sky(pair[0].color);
        let c1 = sky(pair[1].color);
        draw.polygon().points_colored(vec![
            (pt2(x0, top), c0),
            (pt2(x1, top), c1),
            (pt2(x1, bottom), c1),
            (pt2(x0, bottom), c0),
        ]);
    }
}

fn draw_readout(draw: &Draw, state: &SkyState, layout: &StripLayout, city: &City, center_y: f32) {
    let panel_x = layout.left + READOUT_WIDTH / 2.0;
    draw.rect()
        .x_y(panel_x, center_y)
        .w_h(READOUT_WIDTH, layout.strip_height)
        .color(srgba(8u8, 10u8, 20u8, 170u8));

    // Grip
    let grip_x = layout.left + HANDLE_WIDTH / 2.0;
    for i in -1..=1 {
        let y = center_y + i as f32 * 5.0;
        draw.line()
            .start(pt2(grip_x - 5.0, y))
            .end(pt2(grip_x + 5.0, y))
            .color(colors::TEXT_SECONDARY)
            .weight(1.5);
    }

    let reading = LocalReading::at(city.timezone, state.tracker().focus());
    let text_x = layout.left + HANDLE_WIDTH + (READOUT_WIDTH - HANDLE_WIDTH) / 2.0;
    let text_w = READOUT_WIDTH - HANDLE_WIDTH - 8.0;
    let compact = layout.strip_height < 56.0;

    draw.text(&city.name)
        .x_y(text_x, center_y + if compact { 8.0 } else { 16.0 })
        .color(colors::TEXT_PRIMARY)
        .font_size(13)
        .w(text_w)
        .left_justify();

    draw.text(&reading.format_time(state.clock_format()))
        .x_y(text_x, center_y + if compact { -8.0 } else { 0.0 })
        .color(colors::TEXT_PRIMARY)
        .font_size(if compact { 12 } else { 16 })
        .w(text_w)
        .left_justify();

    if !compact {
        let detail = format!("{} · {}", reading.format_month_day(), reading.format_utc_offset());
        draw.text(&detail)
            .x_y(text_x, center_y - 16.0)
            .color(colors::TEXT_SECONDARY)
            .font_size(10)
            .w(text_w)
            .left_justify();
    }
}

fn draw_focus_line(draw: &Draw, state: &SkyState, layout: &StripLayout) {
    let count = state.cities().len();
    let top = layout.top + 6.0;
    let bottom = layout.top - count as f32 * layout.row_height;
    draw.line()
        .start(pt2(0.0, top))
        .end(pt2(0.0, bottom))
        .color(srgba(255u8, 255u8, 255u8, 160u8))
        .weight(1.5);
    draw.ellipse()
        .x_y(0.0, top)
        .w_h(8.0, 8.0)
        .color(colors::FOCUS_LINE);
}

/// Focus time headline above the strips
pub fn draw_header(draw: &Draw, state: &SkyState, window_rect: Rect) {
    let focus = state.tracker().focus();
    let offset_minutes = (focus - state.now()).num_minutes();
    let relative = if offset_minutes == 0 {
        "now".to_string()
    } else {
        let sign = if offset_minutes > 0 { "+" } else { "-" };
        let abs = offset_minutes.abs();
        format!("{}{}h {:02}m from now", sign, abs / 60, abs % 60)
    };

    draw.text(&format!("{} UTC", focus.format("%a %b %-d, %H:%M")))
        .x_y(0.0, window_rect.top() - 22.0)
        .color(colors::TEXT_PRIMARY)
        .font_size(18)
        .w(400.0);
    draw.text(&relative)
        .x_y(0.0, window_rect.top() - 44.0)
        .color(colors::TEXT_SECONDARY)
        .font_size(12)
        .w(300.0);
}

/// Draw keyboard shortcuts help
pub fn draw_help_text(draw: &Draw, window_rect: Rect) {
    let help_lines = [
        "Drag or scroll: move time  |  ←/→: ±15 min  |  Shift: ±1 hr",
        "N: Now  |  /: Add city  |  Drag ≡: Reorder",
    ];

    let base_y = window_rect.bottom() + 20.0;

    for (i, line) in help_lines.iter().enumerate() {
        draw.text(line)
            .x_y(0.0, base_y + (help_lines.len() - 1 - i) as f32 * 16.0)
            .color(srgba(168u8, 176u8, 200u8, 120u8))
            .font_size(11)
            .w(500.0);
    }
}
