//! Run-length merge of selected sample indices

use std::iter::Peekable;

use crate::domain::model::ConsecutivePeriod;

/// Lazy iterator collapsing ascending distinct indices into maximal runs.
///
/// Adjacent values that differ by exactly one share a period; any larger gap
/// starts a new one.
pub struct ConsecutivePeriods<I: Iterator<Item = usize>> {
    indices: Peekable<I>,
}

impl<I: Iterator<Item = usize>> ConsecutivePeriods<I> {
    pub fn new(indices: I) -> Self {
        Self {
            indices: indices.peekable(),
        }
    }
}

impl<I: Iterator<Item = usize>> Iterator for ConsecutivePeriods<I> {
    type Item = ConsecutivePeriod;

    fn next(&mut self) -> Option<ConsecutivePeriod> {
        let start = self.indices.next()?;
        let mut end = start;
        while let Some(&next) = self.indices.peek() {
            if next != end + 1 {
                break;
            }
            end = next;
            self.indices.next();
        }
        Some(ConsecutivePeriod::new(start, end))
    }
}

/// Merge ascending distinct indices into consecutive periods
pub fn merge_periods<I>(indices: I) -> ConsecutivePeriods<I::IntoIter>
where
    I: IntoIterator<Item = usize>,
{
    ConsecutivePeriods::new(indices.into_iter())
}
