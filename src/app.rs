use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Create the app and kick off the initial load.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config.clone());
        state.start_loading(config);
        Self { state }
    }
}

impl Default for DashboardApp {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loading();
        if self.state.loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: notice + charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_grid(ui, &mut self.state);
        });

        // Wake up in time to hide the notice.
        if let Some(remaining) = self
            .state
            .dashboard
            .as_ref()
            .and_then(|d| d.notice.remaining(Instant::now()))
        {
            ctx.request_repaint_after(remaining);
        }
    }
}
