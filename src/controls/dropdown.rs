use crate::data::filter::Predicate;
use crate::data::model::Dataset;
use crate::data::quantile::{QuantileBucket, quantile_buckets};

pub const ALL_LABEL: &str = "All";

/// A single-choice dropdown over quantile buckets of a numeric column, with
/// an "All" option first.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileDropdown {
    pub column: String,
    pub options: Vec<QuantileBucket>,
    selected: usize,
}

impl QuantileDropdown {
    pub fn build(dataset: &Dataset, column: &str) -> Self {
        let mut options = vec![QuantileBucket {
            label: ALL_LABEL.to_string(),
            predicate: Predicate::Unconditional,
        }];
        options.extend(quantile_buckets(&dataset.numeric_values(column)));
        Self {
            column: column.to_string(),
            options,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_label(&self) -> &str {
        &self.options[self.selected].label
    }

    /// Choose an option. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Option<Predicate> {
        let option = self.options.get(index)?;
        self.selected = index;
        Some(option.predicate.clone())
    }

    pub fn predicate(&self) -> Predicate {
        self.options[self.selected].predicate.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn life_expectancy() -> Dataset {
        Dataset::from_rows(
            (1..=10)
                .map(|i| Row::from_iter([("Life expectancy", i as f64 * 10.0)]))
                .collect(),
        )
    }

    #[test]
    fn all_comes_first_and_is_selected() {
        let dropdown = QuantileDropdown::build(&life_expectancy(), "Life expectancy");
        let labels: Vec<&str> = dropdown.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["All", "10 - 39", "39 - 69", "69 - 100"]);
        assert_eq!(dropdown.selected_label(), "All");
        assert_eq!(dropdown.predicate(), Predicate::Unconditional);
    }

    #[test]
    fn selecting_a_bucket_yields_its_predicate() {
        let ds = life_expectancy();
        let mut dropdown = QuantileDropdown::build(&ds, "Life expectancy");
        let predicate = dropdown.select(3).unwrap();
        let kept: Vec<f64> = ds
            .rows
            .iter()
            .filter(|r| predicate.matches(r, "Life expectancy"))
            .filter_map(|r| r.value("Life expectancy").as_f64())
            .collect();
        assert_eq!(kept, vec![70.0, 80.0, 90.0, 100.0]);
        assert!(dropdown.select(42).is_none());
        assert_eq!(dropdown.selected(), 3);
    }

    #[test]
    fn text_column_only_offers_all() {
        let ds = Dataset::from_rows(vec![Row::from_iter([("Region", "EU")])]);
        let dropdown = QuantileDropdown::build(&ds, "Region");
        assert_eq!(dropdown.options.len(), 1);
    }
}
