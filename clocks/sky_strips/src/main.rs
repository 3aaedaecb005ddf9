//! Sky Strips
//!
//! One horizontal sky per city, colored by the sun over a 48-hour window.
//! Drag, scroll or use the arrow keys to slide every strip through time
//! together; drag a row's grip to reorder the cities.

mod cities;
mod color;
mod drawing;
mod gradient;
mod markers;
mod pan;
mod persistence;
mod reorder;
mod session;
mod state;
mod timeline;
mod tokens;
mod ui;

use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use nannou::prelude::*;
use nannou_egui::{self, Egui};
use tracing_subscriber::EnvFilter;

use crate::drawing::{colors, draw_header, draw_help_text, draw_strips, StripLayout};
use crate::pan::NudgeDirection;
use crate::persistence::{load_preferences, resolve_startup, save_preferences};
use crate::state::SkyState;
use crate::timeline::{TimelineScale, DEFAULT_PIXELS_PER_HOUR};
use crate::ui::{draw_controls, draw_search_overlay};

/// Pixels per wheel "line" on devices that report discrete steps
const LINE_PIXELS: f64 = 40.0;

#[derive(Parser, Debug)]
#[command(name = "sky_strips", about = "Day/night sky strips for the cities you track")]
struct Args {
    /// Comma-separated `name@Zone/Id` tokens; replaces the saved city list
    #[arg(long)]
    cities: Option<String>,

    /// Horizontal scale of every strip
    #[arg(long, default_value_t = DEFAULT_PIXELS_PER_HOUR)]
    pixels_per_hour: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    nannou::app(model).update(update).exit(exit).run();
}

/// Application state
struct Model {
    /// Headless strip state
    state: SkyState,
    /// Whether egui claimed the pointer during the last frame
    ui_has_pointer: bool,
    /// egui integration
    egui: Egui,
}

fn model(app: &App) -> Model {
    let args = Args::parse();

    let window_id = app
        .new_window()
        .title("Sky Strips")
        .size(1200, 640)
        .min_size(720, 360)
        .view(view)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_moved(mouse_moved)
        .mouse_wheel(mouse_wheel)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to create window");

    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let pixels_per_hour = if args.pixels_per_hour.is_finite() && args.pixels_per_hour > 0.0 {
        args.pixels_per_hour
    } else {
        tracing::warn!(value = args.pixels_per_hour, "ignoring invalid --pixels-per-hour");
        DEFAULT_PIXELS_PER_HOUR
    };

    let local_tz = shared::system_timezone().unwrap_or(shared::FALLBACK_TZ);
    let startup = resolve_startup(args.cities.as_deref(), load_preferences(), local_tz);
    tracing::info!(
        source = ?startup.source,
        cities = startup.cities.len(),
        local_tz = local_tz.name(),
        "loaded city list"
    );

    let state = SkyState::new(
        startup,
        TimelineScale::new(pixels_per_hour),
        Utc::now(),
        Instant::now(),
    );

    Model {
        state,
        ui_has_pointer: false,
        egui,
    }
}

fn update(_app: &App, model: &mut Model, update: Update) {
    if let Some(prefs) = model.state.tick(Instant::now(), Utc::now()) {
        save_preferences(&prefs);
    }

    // Stands in for the display's animation frame
    model.state.animation_frame();
    model.state.refresh_gradients();

    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    let search_result = draw_search_overlay(&ctx, &mut model.state.search);
    let controls = draw_controls(&ctx, &model.state);

    model.ui_has_pointer = ctx.is_pointer_over_area();
    let text_focus = ctx.wants_keyboard_input();

    drop(ctx);
    model.state.set_text_focus(text_focus);

    if let Some(record) = search_result.selected {
        model.state.add_city(&record);
    }
    if search_result.close {
        model.state.search.close();
    }

    if controls.jump_to_now {
        model.state.jump_to_now(Utc::now());
    }
    if controls.toggle_display_mode {
        model.state.toggle_display_mode();
    }
    if controls.toggle_clock_format {
        model.state.toggle_clock_format();
    }
    if controls.open_search {
        model.state.search.open();
    }
    if let Some(id) = controls.remove_city {
        model.state.remove_city(id);
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    draw.background().color(colors::BACKGROUND);

    let layout = StripLayout::calculate(window_rect, model.state.metrics());
    draw_strips(&draw, &model.state, &layout);
    draw_header(&draw, &model.state, window_rect);
    draw_help_text(&draw, window_rect);

    if let Err(e) = draw.to_frame(app, &frame) {
        tracing::warn!("failed to render strips: {:?}", e);
    }
    if let Err(e) = model.egui.draw_to_frame(&frame) {
        tracing::warn!("failed to render controls: {:?}", e);
    }
}

fn exit(_app: &App, model: Model) {
    if model.state.is_save_pending() {
        save_preferences(&model.state.preferences());
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let mods = app.keys.mods;
    let modified = mods.shift() || mods.ctrl() || mods.alt() || mods.logo();
    let typing = model.state.is_typing();

    match key {
        Key::Escape => model.state.escape(),
        Key::Left if !typing => model.state.nudge(NudgeDirection::Earlier, modified),
        Key::Right if !typing => model.state.nudge(NudgeDirection::Later, modified),
        Key::Slash if !typing => model.state.search.open(),
        Key::N if !typing => model.state.jump_to_now(Utc::now()),
        _ => {}
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.ui_has_pointer || model.state.search.is_open {
        return;
    }
    let pos = app.mouse.position();
    let layout = StripLayout::calculate(app.window_rect(), model.state.metrics());
    let target = layout.hit_test(pos, model.state.cities().iter());
    // Window y points up; the controllers expect it to grow downward
    model
        .state
        .pointer_down(target, pos.x as f64, -pos.y as f64);
}

fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.state.pointer_up();
    }
}

fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    model.state.pointer_move(pos.x as f64, -pos.y as f64);
}

fn mouse_wheel(_app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.ui_has_pointer || model.state.search.is_open {
        return;
    }
    // winit reports scroll-up and swipe-right as positive, the reverse of DOM wheel deltas
    let (dx, dy) = match delta {
        MouseScrollDelta::LineDelta(x, y) => (x as f64 * LINE_PIXELS, y as f64 * LINE_PIXELS),
        MouseScrollDelta::PixelDelta(pos) => (pos.x, pos.y),
    };
    model.state.wheel(-dx, -dy);
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
