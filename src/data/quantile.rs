use super::filter::Predicate;

/// Cut points used by the quantile dropdown.
pub const QUANTILE_THRESHOLDS: [f64; 4] = [0.0, 0.33, 0.66, 1.0];

/// Linear-interpolation quantile estimator over already-sorted values.
///
/// Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let lo = sorted[i0];
    let hi = sorted[i0 + 1];
    Some(lo + (hi - lo) * (i - i0 as f64))
}

/// Quantile of unsorted values. Non-finite values are ignored.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, p)
}

/// One option of the quantile dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileBucket {
    pub label: String,
    pub predicate: Predicate,
}

/// Split `values` into contiguous buckets at [`QUANTILE_THRESHOLDS`].
///
/// Every bucket is half-open `[lower, upper)` except the last, which is
/// closed so the maximum lands in exactly one bucket. Returns no buckets
/// when there are no finite values.
pub fn quantile_buckets(values: &[f64]) -> Vec<QuantileBucket> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let cuts: Vec<f64> = QUANTILE_THRESHOLDS
        .iter()
        .filter_map(|&p| quantile_sorted(&sorted, p))
        .collect();
    let last = cuts.len() - 2;

    cuts.windows(2)
        .enumerate()
        .map(|(i, w)| {
            let (lower, upper) = (w[0], w[1]);
            QuantileBucket {
                label: format!("{} - {}", lower.floor(), upper.floor()),
                predicate: Predicate::Bucket {
                    lower,
                    upper,
                    inclusive_upper: i == last,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn count_matches(buckets: &[QuantileBucket], v: f64) -> usize {
        let row = Row::from_iter([("v", v)]);
        buckets
            .iter()
            .filter(|b| b.predicate.matches(&row, "v"))
            .count()
    }

    #[test]
    fn interpolates_between_neighbours() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&[3.0, 1.0, 2.0], 0.5), Some(2.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.66), Some(7.0));
    }

    #[test]
    fn deciles_produce_three_labelled_buckets() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        let buckets = quantile_buckets(&values);
        assert_eq!(buckets.len(), 3);
        // cut points: 10, 39.7, 69.4, 100
        assert_eq!(buckets[0].label, "10 - 39");
        assert_eq!(buckets[1].label, "39 - 69");
        assert_eq!(buckets[2].label, "69 - 100");
        assert_eq!(
            buckets[2].predicate,
            Predicate::Bucket {
                lower: quantile(&values, 0.66).unwrap(),
                upper: 100.0,
                inclusive_upper: true,
            }
        );
        assert_eq!(count_matches(&buckets, 100.0), 1);
    }

    #[test]
    fn every_value_falls_in_exactly_one_bucket() {
        let datasets: Vec<Vec<f64>> = vec![
            (1..=10).map(|i| i as f64 * 10.0).collect(),
            vec![5.0, 5.0, 5.0],
            vec![1.0, 1.0, 2.0, 2.0, 3.0, 100.0],
            vec![-3.5, 0.0, 0.25, 17.0, 17.0, 42.9, 1e6],
            vec![8.0],
        ];
        for values in datasets {
            let buckets = quantile_buckets(&values);
            assert_eq!(buckets.len(), 3);
            for &v in &values {
                assert_eq!(count_matches(&buckets, v), 1, "value {v} in {values:?}");
            }
        }
    }

    #[test]
    fn no_numeric_values_means_no_buckets() {
        assert!(quantile_buckets(&[]).is_empty());
        assert!(quantile_buckets(&[f64::NAN]).is_empty());
    }
}
