use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::PairsError;
use crate::statistics::descriptive::pct_change;
use crate::types::TimeSeries;
use crate::PairsResult;

/// Two price series restricted to their common dates, with their returns.
///
/// Only [`align`] builds this, so `returns_*` is always exactly one element
/// shorter than `prices_*` (or empty when there are no prices).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    dates: Vec<NaiveDate>,
    prices_a: Vec<f64>,
    prices_b: Vec<f64>,
    returns_a: Vec<f64>,
    returns_b: Vec<f64>,
}

impl AlignedPair {
    /// Number of common observations (aligned price length).
    pub fn observations(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Dates of the returns series (the common index minus its first date).
    pub fn return_dates(&self) -> &[NaiveDate] {
        self.dates.get(1..).unwrap_or(&[])
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn prices_a(&self) -> &[f64] {
        &self.prices_a
    }

    pub fn prices_b(&self) -> &[f64] {
        &self.prices_b
    }

    pub fn returns_a(&self) -> &[f64] {
        &self.returns_a
    }

    pub fn returns_b(&self) -> &[f64] {
        &self.returns_b
    }
}

/// Intersect two series on their dates and compute single-period returns.
///
/// Either input being `None` is a `DataUnavailable` error. Disjoint series
/// give an empty pair; rejecting that is left to the evaluator.
pub fn align(a: Option<&TimeSeries>, b: Option<&TimeSeries>) -> PairsResult<AlignedPair> {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (None, Some(_)) => {
            return Err(PairsError::DataUnavailable("first series is missing".into()))
        }
        (Some(_), None) => {
            return Err(PairsError::DataUnavailable("second series is missing".into()))
        }
        (None, None) => {
            return Err(PairsError::DataUnavailable("both series are missing".into()))
        }
    };

    let closes_a = a.closes_f64();
    let closes_b = b.closes_f64();
    let points_a = a.points();
    let points_b = b.points();

    let capacity = points_a.len().min(points_b.len());
    let mut dates = Vec::with_capacity(capacity);
    let mut prices_a = Vec::with_capacity(capacity);
    let mut prices_b = Vec::with_capacity(capacity);

    // Both indices are strictly increasing, so a merge walk finds the intersection.
    let (mut i, mut j) = (0, 0);
    while i < points_a.len() && j < points_b.len() {
        match points_a[i].date.cmp(&points_b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dates.push(points_a[i].date);
                prices_a.push(closes_a[i]);
                prices_b.push(closes_b[j]);
                i += 1;
                j += 1;
            }
        }
    }

    let returns_a = pct_change(&prices_a);
    let returns_b = pct_change(&prices_b);

    debug!(
        len_a = points_a.len(),
        len_b = points_b.len(),
        common = dates.len(),
        "Aligned price series"
    );

    Ok(AlignedPair {
        dates,
        prices_a,
        prices_b,
        returns_a,
        returns_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> TimeSeries {
        TimeSeries::from_pairs(points.iter().copied()).unwrap()
    }

    #[test]
    fn test_align_intersects_dates() {
        let a = series(&[(d(1, 1), 10.0), (d(1, 2), 11.0), (d(1, 3), 12.0), (d(1, 5), 13.0)]);
        let b = series(&[(d(1, 2), 20.0), (d(1, 3), 22.0), (d(1, 4), 21.0), (d(1, 5), 24.2)]);
        let aligned = align(Some(&a), Some(&b)).unwrap();

        assert_eq!(aligned.dates(), &[d(1, 2), d(1, 3), d(1, 5)]);
        assert_eq!(aligned.prices_a(), &[11.0, 12.0, 13.0]);
        let expected_b = [20.0, 22.0, 24.2];
        for (got, want) in aligned.prices_b().iter().zip(expected_b) {
            assert!((got - want).abs() < 1e-12);
        }
        assert_eq!(aligned.observations(), 3);
        assert_eq!(aligned.return_dates(), &[d(1, 3), d(1, 5)]);
        assert!((aligned.returns_b()[0] - 0.1).abs() < 1e-12);
        assert!((aligned.returns_b()[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_returns_one_shorter_than_prices() {
        let a = series(&[(d(1, 1), 10.0), (d(1, 2), 11.0), (d(1, 3), 12.0)]);
        let aligned = align(Some(&a), Some(&a)).unwrap();
        assert_eq!(aligned.returns_a().len(), aligned.prices_a().len() - 1);
        assert_eq!(aligned.returns_b().len(), aligned.prices_b().len() - 1);
    }

    #[test]
    fn test_missing_series_is_data_unavailable() {
        let a = series(&[(d(1, 1), 10.0)]);
        assert!(matches!(
            align(None, Some(&a)),
            Err(PairsError::DataUnavailable(_))
        ));
        assert!(matches!(
            align(Some(&a), None),
            Err(PairsError::DataUnavailable(_))
        ));
        assert!(matches!(align(None, None), Err(PairsError::DataUnavailable(_))));
    }

    #[test]
    fn test_disjoint_series_align_to_nothing() {
        let a = series(&[(d(1, 1), 10.0), (d(1, 2), 11.0)]);
        let b = series(&[(d(2, 1), 10.0), (d(2, 2), 11.0)]);
        let aligned = align(Some(&a), Some(&b)).unwrap();
        assert!(aligned.is_empty());
        assert!(aligned.returns_a().is_empty());
        assert_eq!(aligned.start_date(), None);
        assert!(aligned.return_dates().is_empty());
    }
}
