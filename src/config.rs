//! Dashboard configuration: which dataset to load, which charts to build and
//! which columns get a filter control.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key sent along with every chart's options.
pub const API_KEY: &str = "<INSERT YOUR API KEY HERE>";

pub const DEFAULT_DATASET_SOURCE: &str = "data/data.csv";

pub const DEFAULT_CHART_CONFIG_TEMPLATE: &str =
    "https://public.flourish.studio/visualisation/{id}/visualisation-object.json";

/// How long the "no results" notice stays visible.
pub const DEFAULT_NOTICE_DELAY_MS: u64 = 4000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {0}: {1}")]
    Io(String, std::io::Error),
    #[error("parsing config {0}: {1}")]
    Json(String, serde_json::Error),
    #[error("column \"{0}\" has more than one filter control")]
    DuplicateControl(String),
}

/// One chart slot: the upstream visualisation id and where it is mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSlot {
    pub id: String,
    pub container: String,
}

impl ChartSlot {
    pub fn new(id: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            container: container.into(),
        }
    }
}

/// Which control a managed column gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    MultiSelect,
    QuantileDropdown,
    Slider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub column: String,
    pub kind: ControlKind,
}

impl ControlSpec {
    pub fn new(column: impl Into<String>, kind: ControlKind) -> Self {
        Self {
            column: column.into(),
            kind,
        }
    }
}

/// Full dashboard configuration. Missing fields fall back to the built-in
/// dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_key: String,
    /// Path or URL of the dataset.
    pub dataset_source: String,
    /// Path or URL template for chart configurations; `{id}` is replaced by
    /// the chart id.
    pub chart_config_template: String,
    pub charts: Vec<ChartSlot>,
    pub controls: Vec<ControlSpec>,
    pub notice_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_key: API_KEY.to_string(),
            dataset_source: DEFAULT_DATASET_SOURCE.to_string(),
            chart_config_template: DEFAULT_CHART_CONFIG_TEMPLATE.to_string(),
            charts: vec![
                // data typed visual
                ChartSlot::new("18312856", "#chart-0"),
                // non data-typed visual
                ChartSlot::new("11846765", "#chart-1"),
            ],
            controls: vec![
                ControlSpec::new("Region", ControlKind::MultiSelect),
                ControlSpec::new("Life expectancy", ControlKind::QuantileDropdown),
                ControlSpec::new("GDP", ControlKind::Slider),
                ControlSpec::new("Population", ControlKind::Slider),
            ],
            notice_delay_ms: DEFAULT_NOTICE_DELAY_MS,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(display.clone(), e))?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| ConfigError::Json(display, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Every managed column must have exactly one control.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, spec) in self.controls.iter().enumerate() {
            if self.controls[..i].iter().any(|s| s.column == spec.column) {
                return Err(ConfigError::DuplicateControl(spec.column.clone()));
            }
        }
        Ok(())
    }

    /// Resolve the config source of one chart.
    pub fn chart_config_source(&self, id: &str) -> String {
        self.chart_config_template.replace("{id}", id)
    }

    pub fn managed_columns(&self) -> impl Iterator<Item = &str> {
        self.controls.iter().map(|c| c.column.as_str())
    }
}
