use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::controls::{FilterControl, MultiSelect, QuantileDropdown, RangeSlider};
use crate::data::filter::Predicate;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter controls
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dashboard.is_none() {
        if state.loading() {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.label("Loading…");
            });
        } else {
            ui.label("No dataset loaded.");
        }
        return;
    }
    let Some(dashboard) = &mut state.dashboard else {
        return;
    };

    // Predicates changed this frame; applied once the controls are released.
    let mut changes: Vec<(String, Predicate)> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for control in &mut dashboard.controls {
                let column = control.column().to_string();
                egui::CollapsingHeader::new(RichText::new(&column).strong())
                    .id_salt(&column)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        let changed = match control {
                            FilterControl::MultiSelect(c) => multi_select(ui, c),
                            FilterControl::QuantileDropdown(c) => dropdown(ui, c),
                            FilterControl::Slider(c) => slider(ui, c),
                        };
                        if let Some(predicate) = changed {
                            changes.push((column.clone(), predicate));
                        }
                    });
            }
        });

    for (column, predicate) in changes {
        state.apply_control_change(&column, predicate);
    }
}

fn multi_select(ui: &mut Ui, control: &mut MultiSelect) -> Option<Predicate> {
    let mut changed = None;

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            changed = Some(control.select_all());
        }
        if ui.small_button("None").clicked() {
            changed = Some(control.select_none());
        }
        ui.label(format!(
            "{}/{}",
            control.selected_count(),
            control.options.len()
        ));
    });

    for i in 0..control.options.len() {
        let mut checked = control.is_selected(i);
        let label = control.options[i].to_string();
        if ui.checkbox(&mut checked, label).changed() {
            changed = Some(control.set_selected(i, checked));
        }
    }
    changed
}

fn dropdown(ui: &mut Ui, control: &mut QuantileDropdown) -> Option<Predicate> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(("quantile", &control.column))
        .selected_text(control.selected_label())
        .show_ui(ui, |ui: &mut Ui| {
            for (i, option) in control.options.iter().enumerate() {
                if ui
                    .selectable_label(control.selected() == i, &option.label)
                    .clicked()
                {
                    picked = Some(i);
                }
            }
        });
    picked.and_then(|i| control.select(i))
}

fn slider(ui: &mut Ui, control: &mut RangeSlider) -> Option<Predicate> {
    let (lower, upper) = control.bounds;
    let mut committed = false;

    for is_min in [true, false] {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(if is_min { "Min" } else { "Max" });
            let mut value = if is_min { control.min() } else { control.max() };
            let response = ui.add(
                egui::Slider::new(&mut value, lower..=upper)
                    .step_by(1.0)
                    .show_value(false),
            );
            if response.changed() {
                if is_min {
                    control.drag_min(value);
                } else {
                    control.drag_max(value);
                }
            }
            let shown = if is_min { control.min() } else { control.max() };
            ui.label(format_num(shown));

            // Keyboard nudges have no drag, so they commit right away.
            if response.drag_stopped() || (response.changed() && !response.dragged()) {
                committed = true;
            }
        });
    }

    committed.then(|| control.commit())
}

/// Format a number with thousands separators, e.g. `1234567` → `1,234,567`.
pub fn format_num(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.start_loading(state.config.clone());
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(d) = &state.dashboard {
            ui.label(format!(
                "{} rows loaded, {} visible",
                d.dataset.len(),
                d.visible_rows
            ));
        } else if state.loading() {
            ui.spinner();
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dashboard configuration")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match DashboardConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded dashboard config from {}", path.display());
                state.start_loading(config);
            }
            Err(e) => {
                log::error!("Failed to load config: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_num(0.0), "0");
        assert_eq!(format_num(999.0), "999");
        assert_eq!(format_num(1000.0), "1,000");
        assert_eq!(format_num(1234567.4), "1,234,567");
        assert_eq!(format_num(-45000.0), "-45,000");
    }
}
