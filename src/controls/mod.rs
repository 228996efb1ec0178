/// Filter controls: pure models, one per managed column.
///
/// A control owns its own widget state (checked options, chosen bucket,
/// handle positions) and hands back a fresh [`Predicate`] whenever the user
/// commits a change. The UI layer renders the models and forwards those
/// predicates to the dashboard; nothing here touches egui.

pub mod dropdown;
pub mod multi_select;
pub mod slider;

use crate::config::{ControlKind, ControlSpec};
use crate::data::filter::Predicate;
use crate::data::model::Dataset;

pub use dropdown::QuantileDropdown;
pub use multi_select::MultiSelect;
pub use slider::RangeSlider;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    MultiSelect(MultiSelect),
    QuantileDropdown(QuantileDropdown),
    Slider(RangeSlider),
}

impl FilterControl {
    pub fn build(dataset: &Dataset, spec: &ControlSpec) -> Self {
        match spec.kind {
            ControlKind::MultiSelect => {
                FilterControl::MultiSelect(MultiSelect::build(dataset, &spec.column))
            }
            ControlKind::QuantileDropdown => {
                FilterControl::QuantileDropdown(QuantileDropdown::build(dataset, &spec.column))
            }
            ControlKind::Slider => FilterControl::Slider(RangeSlider::build(dataset, &spec.column)),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            FilterControl::MultiSelect(c) => &c.column,
            FilterControl::QuantileDropdown(c) => &c.column,
            FilterControl::Slider(c) => &c.column,
        }
    }

    /// The predicate matching the control's current state.
    pub fn predicate(&self) -> Predicate {
        match self {
            FilterControl::MultiSelect(c) => c.predicate(),
            FilterControl::QuantileDropdown(c) => c.predicate(),
            FilterControl::Slider(c) => c.commit(),
        }
    }
}

/// Build one control per spec, in declaration order.
pub fn build_controls(dataset: &Dataset, specs: &[ControlSpec]) -> Vec<FilterControl> {
    specs
        .iter()
        .map(|spec| FilterControl::build(dataset, spec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::data::model::{CellValue, Row};

    #[test]
    fn fresh_controls_accept_every_row() {
        let ds = Dataset::from_rows(vec![
            Row::from_iter([
                ("Region", CellValue::from("EU")),
                ("Life expectancy", 71.0.into()),
                ("GDP", 1200.5.into()),
                ("Population", 3.0e6.into()),
            ]),
            Row::from_iter([
                ("Region", CellValue::from("AS")),
                ("Life expectancy", 64.0.into()),
                ("GDP", 800.0.into()),
                ("Population", 9.0e7.into()),
            ]),
        ]);
        let controls = build_controls(&ds, &DashboardConfig::default().controls);
        assert_eq!(controls.len(), 4);
        assert!(matches!(controls[2], FilterControl::Slider(_)));
        for control in &controls {
            let predicate = control.predicate();
            assert!(
                ds.rows.iter().all(|r| predicate.matches(r, control.column())),
                "{} rejects a row",
                control.column()
            );
        }
    }
}
