use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// Predicate: a serializable test over one column of a row
// ---------------------------------------------------------------------------

/// A row test scoped to a single column.
///
/// Numeric variants reject cells that are missing or not numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Accepts every row.
    Unconditional,
    /// The cell must be one of `values`. An empty set matches nothing.
    Membership { values: BTreeSet<CellValue> },
    /// `lower <= v < upper`, or `lower <= v <= upper` when `inclusive_upper`.
    Bucket {
        lower: f64,
        upper: f64,
        inclusive_upper: bool,
    },
    /// `min <= v <= max`.
    Range { min: f64, max: f64 },
}

impl Predicate {
    /// Evaluate the predicate against the cell stored under `column`.
    pub fn matches(&self, row: &Row, column: &str) -> bool {
        let value = row.value(column);
        match self {
            Predicate::Unconditional => true,
            Predicate::Membership { values } => values.contains(value),
            Predicate::Bucket {
                lower,
                upper,
                inclusive_upper,
            } => match value.as_f64() {
                Some(v) if *inclusive_upper => v >= *lower && v <= *upper,
                Some(v) => v >= *lower && v < *upper,
                None => false,
            },
            Predicate::Range { min, max } => value
                .as_f64()
                .is_some_and(|v| v >= *min && v <= *max),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterState: one predicate per managed column
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("no filter control is registered for column \"{0}\"")]
    UnknownColumn(String),
}

/// One stored predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub column: String,
    pub predicate: Predicate,
}

/// The predicate store. Entries keep declaration order; a row passes when
/// every entry's predicate accepts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    entries: Vec<FilterEntry>,
}

impl FilterState {
    /// Seed the store with an accept-all entry for every managed column.
    /// Duplicate column names collapse into one entry.
    pub fn seeded<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = FilterState::default();
        for column in columns {
            let column = column.into();
            if state.predicate(&column).is_none() {
                state.entries.push(FilterEntry {
                    column,
                    predicate: Predicate::Unconditional,
                });
            }
        }
        state
    }

    /// Replace the predicate stored for `column`.
    pub fn set_predicate(&mut self, column: &str, predicate: Predicate) -> Result<(), FilterError> {
        match self.entries.iter_mut().find(|e| e.column == column) {
            Some(entry) => {
                entry.predicate = predicate;
                Ok(())
            }
            None => {
                log::warn!("Ignoring predicate for unmanaged column {column:?}");
                Err(FilterError::UnknownColumn(column.to_string()))
            }
        }
    }

    pub fn predicate(&self, column: &str) -> Option<&Predicate> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| &e.predicate)
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Whether `row` passes every stored predicate.
    pub fn accepts(&self, row: &Row) -> bool {
        self.entries
            .iter()
            .all(|e| e.predicate.matches(row, &e.column))
    }
}

/// Return the rows of `rows` that pass every predicate in `filters`,
/// preserving order.
pub fn apply_filters(rows: &[Row], filters: &FilterState) -> Vec<Row> {
    rows.iter()
        .filter(|row| filters.accepts(row))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dataset;

    fn sample() -> Dataset {
        Dataset::from_rows(vec![
            Row::from_iter([("Region", CellValue::from("EU")), ("GDP", 100.0.into())]),
            Row::from_iter([("Region", CellValue::from("EU")), ("GDP", 200.0.into())]),
            Row::from_iter([("Region", CellValue::from("AS")), ("GDP", 300.0.into())]),
            Row::from_iter([("Region", CellValue::from("AF")), ("GDP", CellValue::Null)]),
        ])
    }

    fn membership(values: &[&str]) -> Predicate {
        Predicate::Membership {
            values: values.iter().map(|v| CellValue::from(*v)).collect(),
        }
    }

    #[test]
    fn seeded_state_accepts_everything() {
        let ds = sample();
        let state = FilterState::seeded(["Region", "GDP"]);
        assert_eq!(state.entries().len(), 2);
        assert_eq!(apply_filters(&ds.rows, &state), ds.rows);
    }

    #[test]
    fn predicates_combine_conjunctively() {
        let ds = sample();
        let mut state = FilterState::seeded(["Region", "GDP"]);
        state.set_predicate("Region", membership(&["EU", "AS"])).unwrap();
        state
            .set_predicate("GDP", Predicate::Range { min: 150.0, max: 300.0 })
            .unwrap();

        let result = apply_filters(&ds.rows, &state);
        let expected: Vec<Row> = ds
            .rows
            .iter()
            .filter(|r| {
                membership(&["EU", "AS"]).matches(r, "Region")
                    && Predicate::Range { min: 150.0, max: 300.0 }.matches(r, "GDP")
            })
            .cloned()
            .collect();
        assert_eq!(result, expected);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample();
        let mut state = FilterState::seeded(["Region", "GDP"]);
        state.set_predicate("Region", membership(&["EU"])).unwrap();
        let once = apply_filters(&ds.rows, &state);
        let twice = apply_filters(&once, &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn replacing_a_predicate_keeps_one_entry_per_column() {
        let mut state = FilterState::seeded(["Region", "Region"]);
        assert_eq!(state.entries().len(), 1);
        state.set_predicate("Region", membership(&["EU"])).unwrap();
        state.set_predicate("Region", membership(&["AS"])).unwrap();
        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.predicate("Region"), Some(&membership(&["AS"])));
    }

    #[test]
    fn unknown_column_is_rejected_without_mutation() {
        let mut state = FilterState::seeded(["Region"]);
        let before = state.clone();
        let err = state
            .set_predicate("Population", Predicate::Unconditional)
            .unwrap_err();
        assert_eq!(err, FilterError::UnknownColumn("Population".into()));
        assert_eq!(state, before);
    }

    #[test]
    fn empty_membership_matches_nothing() {
        let ds = sample();
        let mut state = FilterState::seeded(["Region"]);
        state.set_predicate("Region", membership(&[])).unwrap();
        assert!(apply_filters(&ds.rows, &state).is_empty());
    }

    #[test]
    fn numeric_predicates_reject_missing_values() {
        let ds = sample();
        let null_row = &ds.rows[3];
        let range = Predicate::Range {
            min: f64::MIN,
            max: f64::MAX,
        };
        let bucket = Predicate::Bucket {
            lower: f64::MIN,
            upper: f64::MAX,
            inclusive_upper: true,
        };
        assert!(!range.matches(null_row, "GDP"));
        assert!(!bucket.matches(null_row, "GDP"));
        assert!(Predicate::Unconditional.matches(null_row, "GDP"));
    }

    #[test]
    fn bucket_upper_bound_inclusivity() {
        let row = Row::from_iter([("v", 10.0)]);
        let open = Predicate::Bucket {
            lower: 0.0,
            upper: 10.0,
            inclusive_upper: false,
        };
        let closed = Predicate::Bucket {
            lower: 0.0,
            upper: 10.0,
            inclusive_upper: true,
        };
        assert!(!open.matches(&row, "v"));
        assert!(closed.matches(&row, "v"));
    }

    #[test]
    fn predicates_serialize_with_a_kind_tag() {
        let json = serde_json::to_value(Predicate::Range { min: 1.0, max: 2.0 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "range", "min": 1.0, "max": 2.0 }));
        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, Predicate::Range { min: 1.0, max: 2.0 });
    }
}
