use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PairsError;
use crate::PairsResult;

/// All prices. Wraps Decimal so inputs keep the precision they were quoted with.
pub type Money = Decimal;

/// A single closing price at a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Money,
}

/// A date-indexed price series with a strictly increasing index.
///
/// The invariant is checked once at construction (or deserialization), so
/// every downstream step can rely on sorted, duplicate-free, positive prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series, rejecting unsorted or duplicate dates and non-positive closes.
    pub fn new(points: Vec<PricePoint>) -> PairsResult<Self> {
        for (i, point) in points.iter().enumerate() {
            if point.close <= Decimal::ZERO {
                return Err(PairsError::InvalidInput {
                    field: "close".into(),
                    reason: format!(
                        "Close on {} must be positive, got {}",
                        point.date, point.close
                    ),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(PairsError::InvalidInput {
                    field: "date".into(),
                    reason: format!(
                        "Index must be strictly increasing: {} follows {}",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from `(date, close)` pairs given as floats.
    pub fn from_pairs<I>(pairs: I) -> PairsResult<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, close)| {
                let close = Decimal::from_f64(close).ok_or_else(|| PairsError::InvalidInput {
                    field: "close".into(),
                    reason: format!("Close on {date} is not a finite number"),
                })?;
                Ok(PricePoint { date, close })
            })
            .collect::<PairsResult<Vec<_>>>()?;
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Close price at `date`, if present.
    pub fn get(&self, date: NaiveDate) -> Option<Money> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|i| self.points[i].close)
    }

    /// Closing prices as f64 for the statistical routines.
    pub fn closes_f64(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| p.close.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Keep only points inside the inclusive `[start, end]` window.
    /// A missing bound leaves that side open.
    pub fn restrict(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> TimeSeries {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s) && end.map_or(true, |e| p.date <= e))
            .cloned()
            .collect();
        TimeSeries { points }
    }
}

impl TryFrom<Vec<PricePoint>> for TimeSeries {
    type Error = PairsError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        TimeSeries::new(points)
    }
}

impl From<TimeSeries> for Vec<PricePoint> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_accepts_sorted_series() {
        let series = TimeSeries::new(vec![
            PricePoint { date: d(1), close: dec!(10) },
            PricePoint { date: d(2), close: dec!(11) },
        ])
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(d(1)));
        assert_eq!(series.last_date(), Some(d(2)));
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let result = TimeSeries::new(vec![
            PricePoint { date: d(1), close: dec!(10) },
            PricePoint { date: d(1), close: dec!(11) },
        ]);
        assert!(matches!(result, Err(PairsError::InvalidInput { .. })));
    }

    #[test]
    fn test_new_rejects_descending_dates() {
        let result = TimeSeries::new(vec![
            PricePoint { date: d(2), close: dec!(10) },
            PricePoint { date: d(1), close: dec!(11) },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_zero_close() {
        let result = TimeSeries::new(vec![PricePoint { date: d(1), close: Decimal::ZERO }]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_pairs_rejects_nan() {
        let result = TimeSeries::from_pairs(vec![(d(1), f64::NAN)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_restrict_is_inclusive() {
        let series =
            TimeSeries::from_pairs((1..=10).map(|i| (d(i), 100.0 + i as f64))).unwrap();
        let window = series.restrict(Some(d(3)), Some(d(6)));
        assert_eq!(window.len(), 4);
        assert_eq!(window.first_date(), Some(d(3)));
        assert_eq!(window.last_date(), Some(d(6)));

        let open_start = series.restrict(None, Some(d(2)));
        assert_eq!(open_start.len(), 2);
    }

    #[test]
    fn test_get_by_date() {
        let series = TimeSeries::from_pairs(vec![(d(1), 10.5), (d(3), 12.0)]).unwrap();
        assert_eq!(series.get(d(3)), Some(dec!(12)));
        assert_eq!(series.get(d(2)), None);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[{"date":"2024-01-02","close":"10"},{"date":"2024-01-01","close":"11"}]"#;
        let result: Result<TimeSeries, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let json = r#"[{"date":"2024-01-01","close":"10"},{"date":"2024-01-02","close":"11"}]"#;
        let series: TimeSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.closes_f64(), vec![10.0, 11.0]);
    }
}
