//! Tentative seek ranges from merged periods

use tracing::debug;

use crate::domain::model::{ConsecutivePeriod, SeekRange, TimeCode};
use crate::error::{ArchiverError, ArchiverResult};

/// Turns periods over an index-to-time table into offset-adjusted ranges.
///
/// The upper bound is taken one index past the period's last sample because
/// snapping later rounds it down onto a key frame.
pub struct SeekRangeBuilder<'a> {
    time_table: &'a [TimeCode],
    base_offset: TimeCode,
}

impl<'a> SeekRangeBuilder<'a> {
    pub fn new(time_table: &'a [TimeCode], base_offset: TimeCode) -> Self {
        Self {
            time_table,
            base_offset,
        }
    }

    /// Range for one period. A period ending on the table's last entry stays
    /// open at the top.
    pub fn build(&self, period: &ConsecutivePeriod) -> ArchiverResult<SeekRange> {
        let ss = self
            .time_table
            .get(period.start_index)
            .ok_or(ArchiverError::TimeTableIndexOutOfRange {
                index: period.start_index,
                len: self.time_table.len(),
            })?;
        if period.end_index >= self.time_table.len() {
            return Err(ArchiverError::TimeTableIndexOutOfRange {
                index: period.end_index,
                len: self.time_table.len(),
            });
        }
        let to = self.time_table.get(period.end_index + 1);

        let range = SeekRange::new(
            Some(*ss + self.base_offset),
            to.map(|to| *to + self.base_offset),
        );
        debug!(
            "Period {}..={} -> tentative range {}",
            period.start_index, period.end_index, range
        );
        Ok(range)
    }

    /// Ranges for every period, failing on the first index outside the table
    pub fn build_all<I>(&self, periods: I) -> ArchiverResult<Vec<SeekRange>>
    where
        I: IntoIterator<Item = ConsecutivePeriod>,
    {
        periods.into_iter().map(|period| self.build(&period)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(seconds: &[u64]) -> Vec<TimeCode> {
        seconds.iter().map(|s| TimeCode::from_millis(s * 1_000)).collect()
    }

    #[test]
    fn test_upper_bound_is_one_past_period_end() {
        let times = table(&[0, 10, 20, 30, 40, 50]);
        let builder = SeekRangeBuilder::new(&times, TimeCode::ZERO);

        let range = builder.build(&ConsecutivePeriod::new(1, 2)).unwrap();
        assert_eq!(range.ss(), Some(TimeCode::from_millis(10_000)));
        assert_eq!(range.to(), Some(TimeCode::from_millis(30_000)));
    }

    #[test]
    fn test_base_offset_is_applied() {
        let times = table(&[0, 10, 20]);
        let builder = SeekRangeBuilder::new(&times, TimeCode::from_millis(1_500));

        let range = builder.build(&ConsecutivePeriod::new(0, 0)).unwrap();
        assert_eq!(range.ss(), Some(TimeCode::from_millis(1_500)));
        assert_eq!(range.to(), Some(TimeCode::from_millis(11_500)));
    }

    #[test]
    fn test_period_at_table_end_is_open() {
        let times = table(&[0, 10, 20]);
        let builder = SeekRangeBuilder::new(&times, TimeCode::ZERO);

        let range = builder.build(&ConsecutivePeriod::new(1, 2)).unwrap();
        assert_eq!(range.to(), None);
    }

    #[test]
    fn test_index_outside_table() {
        let times = table(&[0, 10]);
        let builder = SeekRangeBuilder::new(&times, TimeCode::ZERO);

        assert!(matches!(
            builder.build(&ConsecutivePeriod::new(2, 3)),
            Err(ArchiverError::TimeTableIndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            builder.build(&ConsecutivePeriod::new(0, 5)),
            Err(ArchiverError::TimeTableIndexOutOfRange { index: 5, len: 2 })
        ));
    }
}
