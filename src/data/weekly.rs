use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use super::loader::{DataError, RawTable};

/// One aggregated observation, keyed by week-ending Sunday.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyPoint {
    pub week_ending: NaiveDate,
    pub units: f64,
}

/// A date-indexed weekly series, strictly ordered by week. One value per
/// observed week; weeks absent from the source stay absent (no gap fill).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySeries {
    points: Vec<WeeklyPoint>,
}

/// Outcome of temporal preparation: the aggregated series plus how many
/// source rows were dropped because their date or value failed to parse.
/// Dropping (rather than carrying undefined placeholders) is deliberate;
/// the count is surfaced to the user.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub series: WeeklySeries,
    pub dropped_rows: usize,
}

impl WeeklySeries {
    pub fn from_points(points: Vec<WeeklyPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[WeeklyPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.units).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.week_ending).collect()
    }

    /// Positional train/test split. Train gets `floor(ratio * n)` points,
    /// test the remainder; time order preserved, no overlap.
    pub fn split(&self, train_ratio: f64) -> (WeeklySeries, WeeklySeries) {
        let train_len = (train_ratio * self.points.len() as f64).floor() as usize;
        let (train, test) = self.points.split_at(train_len);
        (
            WeeklySeries::from_points(train.to_vec()),
            WeeklySeries::from_points(test.to_vec()),
        )
    }
}

/// Sunday that closes the calendar week containing `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = (7 - date.weekday().num_days_from_sunday() as i64) % 7;
    date + Duration::days(days_to_sunday)
}

/// Parse dates, aggregate `units_sold` to weekly sums, and count dropped
/// rows. `week_idx`/`units_idx` come from `RawTable::validate_columns`.
pub fn prepare(
    table: &RawTable,
    week_idx: usize,
    units_idx: usize,
    date_format: &str,
) -> Result<PreparedData, DataError> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped_rows = 0usize;

    for (row_no, record) in table.records.iter().enumerate() {
        let date = NaiveDate::parse_from_str(&record[week_idx], date_format);
        let units = record[units_idx].parse::<f64>();
        match (date, units) {
            (Ok(date), Ok(units)) if units.is_finite() => {
                *buckets.entry(week_ending(date)).or_insert(0.0) += units;
            }
            _ => {
                tracing::debug!(
                    row = row_no + 1,
                    week = %record[week_idx],
                    units = %record[units_idx],
                    "dropping unparseable row"
                );
                dropped_rows += 1;
            }
        }
    }

    if buckets.is_empty() {
        return Err(DataError::NoUsableRows);
    }

    let points = buckets
        .into_iter()
        .map(|(week_ending, units)| WeeklyPoint { week_ending, units })
        .collect();

    Ok(PreparedData {
        series: WeeklySeries::from_points(points),
        dropped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(body: &str) -> RawTable {
        RawTable::parse(&format!("week,units_sold\n{}", body)).unwrap()
    }

    #[test]
    fn test_week_ending_is_sunday() {
        // 2023-01-02 is a Monday; its week ends Sunday 2023-01-08
        assert_eq!(week_ending(date(2023, 1, 2)), date(2023, 1, 8));
        // A Sunday maps to itself
        assert_eq!(week_ending(date(2023, 1, 8)), date(2023, 1, 8));
        assert_eq!(week_ending(date(2023, 1, 7)), date(2023, 1, 8));
    }

    #[test]
    fn test_same_week_rows_are_summed() {
        // Mon 02/01/23 and Thu 05/01/23 fall in the same week
        let t = table("02/01/23,10\n05/01/23,15\n09/01/23,20\n");
        let prepared = prepare(&t, 0, 1, "%d/%m/%y").unwrap();
        assert_eq!(prepared.dropped_rows, 0);
        let points = prepared.series.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].week_ending, date(2023, 1, 8));
        assert_eq!(points[0].units, 25.0);
        assert_eq!(points[1].units, 20.0);
    }

    #[test]
    fn test_index_is_monotonic_even_from_unsorted_input() {
        let t = table("16/01/23,3\n02/01/23,1\n09/01/23,2\n");
        let prepared = prepare(&t, 0, 1, "%d/%m/%y").unwrap();
        let dates = prepared.series.dates();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(prepared.series.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bad_rows_dropped_and_counted() {
        let t = table("02/01/23,10\nnot-a-date,5\n09/01/23,oops\n16/01/23,30\n");
        let prepared = prepare(&t, 0, 1, "%d/%m/%y").unwrap();
        assert_eq!(prepared.dropped_rows, 2);
        assert_eq!(prepared.series.len(), 2);
    }

    #[test]
    fn test_all_rows_bad_is_an_error() {
        let t = table("nope,1\nstill-nope,2\n");
        assert!(matches!(
            prepare(&t, 0, 1, "%d/%m/%y"),
            Err(DataError::NoUsableRows)
        ));
    }

    #[test]
    fn test_gaps_are_not_filled() {
        // Weeks of Jan 8 and Jan 29; the two weeks between stay absent
        let t = table("02/01/23,10\n23/01/23,20\n");
        let prepared = prepare(&t, 0, 1, "%d/%m/%y").unwrap();
        assert_eq!(prepared.series.len(), 2);
    }

    #[test]
    fn test_split_sizes() {
        let points: Vec<WeeklyPoint> = (0..10)
            .map(|i| WeeklyPoint {
                week_ending: date(2023, 1, 1) + Duration::days(7 * i),
                units: i as f64,
            })
            .collect();
        let series = WeeklySeries::from_points(points);
        let (train, test) = series.split(0.8);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(train.len() + test.len(), series.len());
        // Train ends exactly where test begins
        assert!(train.points().last().unwrap().week_ending < test.points()[0].week_ending);
    }

    #[test]
    fn test_split_floors_train_len() {
        let points: Vec<WeeklyPoint> = (0..7)
            .map(|i| WeeklyPoint {
                week_ending: date(2023, 1, 1) + Duration::days(7 * i),
                units: i as f64,
            })
            .collect();
        let (train, test) = WeeklySeries::from_points(points).split(0.8);
        // floor(0.8 * 7) = 5
        assert_eq!(train.len(), 5);
        assert_eq!(test.len(), 2);
    }
}
