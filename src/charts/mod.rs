/// Chart registry and the rendering adapter seam.
///
/// ```text
///  fetched chart config ─┐
///  api key, container ───┼─► ChartOptions ──► Visual::construct
///  dataset rows ─────────┘          │
///                                   ▼
///  filtered rows ──────────► options.data ──► Visual::update (full bag)
/// ```

pub mod plot;

use serde::Serialize;
use thiserror::Error;

use crate::config::ChartSlot;
use crate::data::loader::ChartConfig;
use crate::data::model::{Dataset, Row};

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("no configuration was fetched for chart {0}")]
    MissingConfig(String),
    #[error("chart {id}: {reason}")]
    Render { id: String, reason: String },
}

// ---------------------------------------------------------------------------
// Options bag handed to visuals
// ---------------------------------------------------------------------------

/// The data a visual draws from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    /// Column names in dataset order, for resolving positional bindings.
    pub columns: Vec<String>,
    pub data: Vec<Row>,
}

/// Upstream settings merged with runtime options. Serializes as a single
/// flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    #[serde(flatten)]
    pub settings: ChartConfig,
    pub api_key: String,
    pub container: String,
    pub data: ChartData,
}

impl ChartOptions {
    /// Merge a fetched configuration with the runtime keys. Runtime keys win
    /// over same-named upstream settings.
    pub fn merge(mut settings: ChartConfig, api_key: &str, container: &str, dataset: &Dataset) -> Self {
        for key in ["api_key", "container", "data"] {
            settings.remove(key);
        }
        Self {
            settings,
            api_key: api_key.to_string(),
            container: container.to_string(),
            data: ChartData {
                columns: dataset.column_names.clone(),
                data: dataset.rows.clone(),
            },
        }
    }
}

/// An externally rendered chart.
pub trait Visual: Sized {
    /// Create the visual from its first full options bag.
    fn construct(options: &ChartOptions) -> Result<Self, ChartError>;

    /// Redraw from a complete options bag. Not a diff.
    fn update(&mut self, options: &ChartOptions) -> Result<(), ChartError>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A chart slot together with its live visual and last-applied options.
#[derive(Debug)]
pub struct ChartEntry<V> {
    pub slot: ChartSlot,
    pub visual: V,
    pub options: ChartOptions,
}

#[derive(Debug)]
pub struct ChartRegistry<V> {
    entries: Vec<ChartEntry<V>>,
}

impl<V: Visual> ChartRegistry<V> {
    /// Build every slot's visual, in slot order, from its fetched
    /// configuration and the full dataset. The first failure aborts the
    /// remaining slots.
    pub fn build(
        slots: &[ChartSlot],
        configs: Vec<ChartConfig>,
        api_key: &str,
        dataset: &Dataset,
    ) -> Result<Self, ChartError> {
        let mut configs = configs.into_iter();
        let mut entries = Vec::with_capacity(slots.len());

        for slot in slots {
            let settings = configs
                .next()
                .ok_or_else(|| ChartError::MissingConfig(slot.id.clone()))?;
            let options = ChartOptions::merge(settings, api_key, &slot.container, dataset);
            let visual = V::construct(&options)?;
            log::info!("Built chart {} into {}", slot.id, slot.container);
            entries.push(ChartEntry {
                slot: slot.clone(),
                visual,
                options,
            });
        }

        Ok(Self { entries })
    }

    /// Push `rows` into every chart and resend its whole options bag.
    pub fn update(&mut self, rows: &[Row]) -> Result<(), ChartError> {
        for entry in &mut self.entries {
            entry.options.data.data = rows.to_vec();
            entry.visual.update(&entry.options)?;
        }
        Ok(())
    }
}

impl<V> ChartRegistry<V> {
    pub fn entries(&self) -> &[ChartEntry<V>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
