use crate::data::filter::Predicate;
use crate::data::model::{CellValue, Dataset};

/// A multi-select over the distinct values of one column. Every value starts
/// selected.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelect {
    pub column: String,
    /// Distinct values in first-seen order.
    pub options: Vec<CellValue>,
    selected: Vec<bool>,
}

impl MultiSelect {
    pub fn build(dataset: &Dataset, column: &str) -> Self {
        let options = dataset.distinct_values(column);
        let selected = vec![true; options.len()];
        Self {
            column: column.to_string(),
            options,
            selected,
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// Check or uncheck one option and return the resulting predicate.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> Predicate {
        if let Some(slot) = self.selected.get_mut(index) {
            *slot = selected;
        }
        self.predicate()
    }

    pub fn select_all(&mut self) -> Predicate {
        self.selected.iter_mut().for_each(|s| *s = true);
        self.predicate()
    }

    pub fn select_none(&mut self) -> Predicate {
        self.selected.iter_mut().for_each(|s| *s = false);
        self.predicate()
    }

    /// Membership in the currently selected options.
    pub fn predicate(&self) -> Predicate {
        Predicate::Membership {
            values: self
                .options
                .iter()
                .zip(&self.selected)
                .filter(|(_, selected)| **selected)
                .map(|(value, _)| value.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn regions() -> Dataset {
        Dataset::from_rows(vec![
            Row::from_iter([("Region", "EU")]),
            Row::from_iter([("Region", "AS")]),
            Row::from_iter([("Region", "EU")]),
        ])
    }

    #[test]
    fn all_options_start_selected() {
        let ds = regions();
        let select = MultiSelect::build(&ds, "Region");
        assert_eq!(select.options, vec![CellValue::from("EU"), CellValue::from("AS")]);
        assert_eq!(select.selected_count(), 2);
        assert!(ds.rows.iter().all(|r| select.predicate().matches(r, "Region")));
    }

    #[test]
    fn deselecting_narrows_membership() {
        let ds = regions();
        let mut select = MultiSelect::build(&ds, "Region");
        let predicate = select.set_selected(1, false);
        let kept: Vec<_> = ds
            .rows
            .iter()
            .filter(|r| predicate.matches(r, "Region"))
            .collect();
        assert_eq!(kept.len(), 2);
        assert!(!select.is_selected(1));
    }

    #[test]
    fn selecting_nothing_matches_no_row() {
        let ds = regions();
        let mut select = MultiSelect::build(&ds, "Region");
        let predicate = select.select_none();
        assert!(ds.rows.iter().all(|r| !predicate.matches(r, "Region")));
        assert_eq!(select.select_all(), MultiSelect::build(&ds, "Region").predicate());
    }
}
