use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::charts::plot::PlotVisual;
use crate::charts::{ChartError, ChartRegistry, Visual};
use crate::config::DashboardConfig;
use crate::controls::{FilterControl, build_controls};
use crate::data::filter::{FilterError, FilterState, Predicate, apply_filters};
use crate::data::loader::{LoadError, LoadedData, load_all};
use crate::data::model::Dataset;
use crate::notice::Notice;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// What a re-filter did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Charts now show `rows` rows.
    Updated { rows: usize },
    /// Nothing matched; the notice is up and charts kept their last view.
    Empty,
}

// ---------------------------------------------------------------------------
// Dashboard: everything that exists once loading succeeded
// ---------------------------------------------------------------------------

/// The running dashboard: full dataset, predicate store, controls and charts.
pub struct Dashboard<V> {
    pub dataset: Dataset,
    pub filters: FilterState,
    pub controls: Vec<FilterControl>,
    pub charts: ChartRegistry<V>,
    pub notice: Notice,
    /// Rows currently shown by the charts.
    pub visible_rows: usize,
}

impl<V: Visual> Dashboard<V> {
    /// Build the charts from the full dataset, then one control per managed
    /// column with an accept-all predicate.
    pub fn start(config: &DashboardConfig, loaded: LoadedData) -> Result<Self, ChartError> {
        let LoadedData {
            dataset,
            chart_configs,
        } = loaded;

        let charts = ChartRegistry::build(&config.charts, chart_configs, &config.api_key, &dataset)?;

        for column in config.managed_columns() {
            if !dataset.column_names.iter().any(|c| c == column) {
                log::warn!("Filter column {column:?} is not in the dataset");
            }
        }
        let filters = FilterState::seeded(config.managed_columns());
        let controls = build_controls(&dataset, &config.controls);

        Ok(Self {
            visible_rows: dataset.len(),
            dataset,
            filters,
            controls,
            charts,
            notice: Notice::new(Duration::from_millis(config.notice_delay_ms)),
        })
    }

    /// Store `predicate` for `column`, re-filter the full dataset and push the
    /// result into every chart. An empty result raises the notice instead
    /// and leaves the charts alone.
    pub fn filter_data(
        &mut self,
        column: &str,
        predicate: Predicate,
        now: Instant,
    ) -> Result<FilterOutcome, DashboardError> {
        self.filters.set_predicate(column, predicate)?;

        let rows = apply_filters(&self.dataset.rows, &self.filters);
        log::debug!(
            "Filter on {column:?}: {} of {} rows pass",
            rows.len(),
            self.dataset.len()
        );

        if rows.is_empty() {
            log::warn!("No rows match the current filters");
            self.notice.show(now);
            return Ok(FilterOutcome::Empty);
        }

        self.charts.update(&rows)?;
        self.visible_rows = rows.len();
        Ok(FilterOutcome::Updated { rows: rows.len() })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

type PendingLoad = Receiver<Result<LoadedData, LoadError>>;

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Running dashboard (None until every source has loaded).
    pub dashboard: Option<Dashboard<PlotVisual>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// In-flight initial load.
    pending: Option<PendingLoad>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dashboard: None,
            status_message: None,
            pending: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the current dashboard and fetch every source again on a
    /// background thread.
    pub fn start_loading(&mut self, config: DashboardConfig) {
        let (tx, rx) = mpsc::channel();
        let job_config = config.clone();
        std::thread::spawn(move || {
            // The receiver is gone if another load replaced this one.
            let _ = tx.send(load_all(&job_config));
        });

        self.config = config;
        self.dashboard = None;
        self.status_message = None;
        self.pending = Some(rx);
    }

    /// Pick up a finished load. Returns true when the state changed.
    pub fn poll_loading(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.status_message = Some("Error: loader stopped unexpectedly".to_string());
                return true;
            }
        };
        self.pending = None;

        match result {
            Ok(loaded) => self.set_loaded(loaded),
            Err(e) => {
                log::error!("Failed to load dashboard: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        true
    }

    /// Ingest freshly loaded data: build charts and controls.
    pub fn set_loaded(&mut self, loaded: LoadedData) {
        match Dashboard::start(&self.config, loaded) {
            Ok(dashboard) => {
                log::info!(
                    "Dashboard ready: {} rows, {} charts, {} controls",
                    dashboard.dataset.len(),
                    dashboard.charts.len(),
                    dashboard.controls.len()
                );
                self.dashboard = Some(dashboard);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to build charts: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Forward a changed control predicate to the filter engine.
    pub fn apply_control_change(&mut self, column: &str, predicate: Predicate) {
        let Some(dashboard) = &mut self.dashboard else {
            return;
        };
        if let Err(e) = dashboard.filter_data(column, predicate, Instant::now()) {
            log::error!("Filtering on {column:?} failed: {e}");
            self.status_message = Some(format!("Error: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::charts::tests::RecordingVisual;
    use crate::config::{ChartSlot, ControlKind, ControlSpec};
    use crate::data::model::{CellValue, Row};

    fn loaded() -> LoadedData {
        let dataset = Dataset::new(
            vec!["Region".into(), "GDP".into()],
            vec![
                Row::from_iter([("Region", CellValue::from("EU")), ("GDP", 100.0.into())]),
                Row::from_iter([("Region", CellValue::from("EU")), ("GDP", 200.0.into())]),
                Row::from_iter([("Region", CellValue::from("AS")), ("GDP", 300.0.into())]),
            ],
        );
        let chart = |n: u64| -> Map<String, serde_json::Value> {
            let mut m = Map::new();
            m.insert("n".into(), json!(n));
            m
        };
        LoadedData {
            dataset,
            chart_configs: vec![chart(0), chart(1)],
        }
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            charts: vec![ChartSlot::new("a", "#chart-0"), ChartSlot::new("b", "#chart-1")],
            controls: vec![
                ControlSpec::new("Region", ControlKind::MultiSelect),
                ControlSpec::new("GDP", ControlKind::Slider),
            ],
            ..DashboardConfig::default()
        }
    }

    fn dashboard() -> Dashboard<RecordingVisual> {
        Dashboard::start(&config(), loaded()).unwrap()
    }

    fn region_select(d: &mut Dashboard<RecordingVisual>) -> &mut crate::controls::MultiSelect {
        match &mut d.controls[0] {
            FilterControl::MultiSelect(m) => m,
            other => panic!("unexpected control {other:?}"),
        }
    }

    #[test]
    fn start_builds_charts_and_seeds_filters() {
        let d = dashboard();
        assert_eq!(d.charts.len(), 2);
        assert_eq!(d.controls.len(), 2);
        assert_eq!(d.filters.entries().len(), 2);
        assert_eq!(d.visible_rows, 3);
        assert!(d
            .filters
            .entries()
            .iter()
            .all(|e| e.predicate == Predicate::Unconditional));
    }

    #[test]
    fn deselecting_a_region_pushes_the_remaining_rows_to_every_chart() {
        let mut d = dashboard();
        let as_index = region_select(&mut d)
            .options
            .iter()
            .position(|v| v == &CellValue::from("AS"))
            .unwrap();
        let predicate = region_select(&mut d).set_selected(as_index, false);

        let outcome = d.filter_data("Region", predicate, Instant::now()).unwrap();
        assert_eq!(outcome, FilterOutcome::Updated { rows: 2 });

        let expected = d.dataset.rows[..2].to_vec();
        for entry in d.charts.entries() {
            assert_eq!(entry.visual.updates.len(), 1);
            assert_eq!(entry.visual.updates[0].data.data, expected);
        }
    }

    #[test]
    fn empty_selection_raises_the_notice_and_keeps_chart_data() {
        let mut d = dashboard();
        let start = Instant::now();
        let predicate = region_select(&mut d).select_none();

        let outcome = d.filter_data("Region", predicate, start).unwrap();
        assert_eq!(outcome, FilterOutcome::Empty);
        assert!(d.notice.is_visible());
        assert_eq!(d.visible_rows, 3);
        for entry in d.charts.entries() {
            assert!(entry.visual.updates.is_empty());
            assert_eq!(entry.options.data.data, d.dataset.rows);
        }

        // Dismisses itself and does not come back on its own.
        assert!(!d.notice.tick(start + d.notice.delay()));
        assert!(!d.notice.tick(start + d.notice.delay() * 3));

        // A non-empty filter afterwards does not raise it either.
        let predicate = region_select(&mut d).select_all();
        d.filter_data("Region", predicate, start + d.notice.delay() * 4)
            .unwrap();
        assert!(!d.notice.is_visible());
    }

    #[test]
    fn predicates_on_different_columns_combine() {
        let mut d = dashboard();
        let predicate = region_select(&mut d).set_selected(0, false);
        d.filter_data("Region", predicate, Instant::now()).unwrap();
        let outcome = d
            .filter_data("GDP", Predicate::Range { min: 0.0, max: 250.0 }, Instant::now())
            .unwrap();
        assert_eq!(outcome, FilterOutcome::Empty);

        let outcome = d
            .filter_data("GDP", Predicate::Range { min: 250.0, max: 300.0 }, Instant::now())
            .unwrap();
        assert_eq!(outcome, FilterOutcome::Updated { rows: 1 });
    }

    #[test]
    fn unmanaged_column_is_an_error() {
        let mut d = dashboard();
        let err = d
            .filter_data("Population", Predicate::Unconditional, Instant::now())
            .unwrap_err();
        assert!(matches!(err, DashboardError::Filter(FilterError::UnknownColumn(_))));
        assert!(d.charts.entries().iter().all(|e| e.visual.updates.is_empty()));
    }

    #[test]
    fn shipped_offline_dashboard_starts() {
        let config = DashboardConfig::load(std::path::Path::new("data/offline.json")).unwrap();
        let loaded = load_all(&config).unwrap();
        let mut d: Dashboard<PlotVisual> = Dashboard::start(&config, loaded).unwrap();
        assert_eq!(d.charts.len(), 2);
        assert_eq!(d.controls.len(), 4);

        let predicate = match &mut d.controls[1] {
            FilterControl::QuantileDropdown(c) => c.select(3).unwrap(),
            other => panic!("unexpected control {other:?}"),
        };
        let outcome = d.filter_data("Life expectancy", predicate, Instant::now()).unwrap();
        assert!(matches!(outcome, FilterOutcome::Updated { rows } if rows < d.dataset.len()));
    }

    #[test]
    fn chart_failure_leaves_app_without_dashboard() {
        let mut state = AppState::new(config());
        let mut data = loaded();
        data.chart_configs.truncate(1);
        state.set_loaded(data);
        assert!(state.dashboard.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("no configuration"));
    }
}
