use crate::data::filter::Predicate;
use crate::data::model::Dataset;

/// Result of a live drag on one handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    /// The value the handle (and its label) now shows.
    pub value: f64,
    /// Whether the requested value had to be corrected.
    pub clamped: bool,
}

/// Dual-handle range slider over a numeric column.
///
/// Handles move in whole steps and never cross: `min <= max - 1` holds at
/// all times, with both handles inside `bounds`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSlider {
    pub column: String,
    /// `(floor(column min), ceil(column max))`.
    pub bounds: (f64, f64),
    min: f64,
    max: f64,
}

impl RangeSlider {
    pub fn build(dataset: &Dataset, column: &str) -> Self {
        let values = dataset.numeric_values(column);
        let lower = values.iter().copied().fold(f64::INFINITY, f64::min);
        let upper = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (lower, upper) = if values.is_empty() {
            (0.0, 1.0)
        } else {
            let lower = lower.floor();
            // A one-value column still needs room for two distinct handles.
            (lower, upper.ceil().max(lower + 1.0))
        };

        Self {
            column: column.to_string(),
            bounds: (lower, upper),
            min: lower,
            max: upper,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Live movement of the min handle. Never changes the filter.
    pub fn drag_min(&mut self, requested: f64) -> Drag {
        let wanted = requested.round().max(self.bounds.0);
        let clamped = wanted >= self.max;
        self.min = if clamped { self.max - 1.0 } else { wanted };
        Drag {
            value: self.min,
            clamped: clamped || wanted != requested,
        }
    }

    /// Live movement of the max handle. Never changes the filter.
    pub fn drag_max(&mut self, requested: f64) -> Drag {
        let wanted = requested.round().min(self.bounds.1);
        let clamped = wanted <= self.min;
        self.max = if clamped { self.min + 1.0 } else { wanted };
        Drag {
            value: self.max,
            clamped: clamped || wanted != requested,
        }
    }

    /// Predicate for the committed handle positions, inclusive on both ends.
    pub fn commit(&self) -> Predicate {
        Predicate::Range {
            min: self.min,
            max: self.max,
        }
    }
}
