//! UI module - egui controls panel and the city search overlay

use nannou_egui::egui;
use shared::ClockFormat;

use crate::cities::{CityId, CityRecord};
use crate::state::{SearchState, SkyState};

/// Result of search overlay interactions
#[derive(Default)]
pub struct SearchResult {
    /// City picked from the results
    pub selected: Option<CityRecord>,
    /// If true, close the overlay
    pub close: bool,
}

/// Result of controls panel interactions
#[derive(Default)]
pub struct ControlsResult {
    pub jump_to_now: bool,
    pub toggle_display_mode: bool,
    pub toggle_clock_format: bool,
    pub open_search: bool,
    pub remove_city: Option<CityId>,
}

/// Draw the city search overlay
pub fn draw_search_overlay(ctx: &egui::Context, search: &mut SearchState) -> SearchResult {
    let mut result = SearchResult::default();

    if !search.is_open {
        return result;
    }

    egui::Window::new("Add City")
        .collapsible(false)
        .resizable(true)
        .default_width(380.0)
        .default_height(460.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Search:");
                let response = ui.text_edit_singleline(&mut search.query);
                if search.should_focus {
                    response.request_focus();
                    search.should_focus = false;
                }
                if response.changed() {
                    search.update_results();
                }
            });

            ui.separator();

            ui.label(format!("{} places found", search.results.len()));

            egui::ScrollArea::vertical()
                .max_height(320.0)
                .show(ui, |ui| {
                    for entry in &search.results {
                        let label = if entry.country.is_empty() {
                            format!("{} · {}", entry.city, entry.timezone.name())
                        } else {
                            format!("{}, {} · {}", entry.city, entry.country, entry.timezone.name())
                        };
                        if ui.selectable_label(false, label).clicked() {
                            result.selected = Some(CityRecord::from_catalog(entry));
                            result.close = true;
                        }
                    }
                });

            ui.separator();

            if ui.button("Close").clicked() {
                result.close = true;
            }
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        result.close = true;
    }

    result
}

/// Draw the controls panel
pub fn draw_controls(ctx: &egui::Context, state: &SkyState) -> ControlsResult {
    let mut result = ControlsResult::default();
    let can_remove = state.cities().len() > 1;

    egui::Window::new("Controls")
        .collapsible(true)
        .resizable(false)
        .default_width(240.0)
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .show(ctx, |ui| {
            if ui
                .add(
                    egui::Button::new(
                        egui::RichText::new("⏱ Now").color(egui::Color32::from_rgb(20, 24, 40)),
                    )
                    .fill(egui::Color32::from_rgb(255, 214, 102)),
                )
                .clicked()
            {
                result.jump_to_now = true;
            }

            ui.separator();

            ui.horizontal(|ui| {
                let density = format!("{} rows", state.display_mode().toggled().label());
                if ui.button(density).clicked() {
                    result.toggle_display_mode = true;
                }
                let format = match state.clock_format() {
                    ClockFormat::TwelveHour => "24-hour",
                    ClockFormat::TwentyFourHour => "12-hour",
                };
                if ui.button(format).clicked() {
                    result.toggle_clock_format = true;
                }
            });

            ui.separator();

            ui.label("Cities:");
            for city in state.cities().iter() {
                ui.horizontal(|ui| {
                    ui.label(&city.name);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(can_remove, egui::Button::new("✕").small()).clicked() {
                            result.remove_city = Some(city.id());
                        }
                    });
                });
            }
            if ui.button("+ Add city").clicked() {
                result.open_search = true;
            }

            ui.separator();

            ui.label("Share:");
            // Selectable copy; edits are discarded
            let mut token = state.share_token();
            ui.text_edit_singleline(&mut token);
        });

    result
}
