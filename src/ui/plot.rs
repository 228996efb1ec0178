use std::time::Instant;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::charts::plot::empty_chart;
use crate::notice::NO_RESULTS_MESSAGE;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render the notice and every chart in the central panel.
pub fn chart_grid(ui: &mut Ui, state: &mut AppState) {
    if state.dashboard.is_none() {
        if state.status_message.is_some() {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("The dashboard could not be loaded  (File → Reload)");
            });
        } else {
            for slot in &state.config.charts {
                empty_chart(ui, &slot.container);
            }
        }
        return;
    }
    let Some(dashboard) = &mut state.dashboard else {
        return;
    };

    if dashboard.notice.tick(Instant::now()) {
        let mut dismissed = false;
        egui::Frame::group(ui.style())
            .fill(Color32::from_rgb(255, 243, 205))
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new(NO_RESULTS_MESSAGE).color(Color32::from_rgb(102, 77, 3)));
                    if ui.small_button("×").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            dashboard.notice.dismiss();
        }
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for entry in dashboard.charts.entries() {
                ui.group(|ui: &mut Ui| {
                    entry.visual.show(ui, CHART_HEIGHT);
                });
                ui.add_space(8.0);
            }
        });
}
