use std::collections::VecDeque;

/// Fixed-capacity FIFO of report records, oldest first.
///
/// Pushing onto a full history drops the oldest record; content plays no
/// part in eviction.
#[derive(Debug, Clone)]
pub(crate) struct ReportHistory<T> {
    records: VecDeque<T>,
    capacity: usize,
}

impl<T> ReportHistory<T> {
    /// Capacity is clamped to at least one record.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, returning the evicted one if the history was full.
    pub(crate) fn push(&mut self, record: T) -> Option<T> {
        let evicted = if self.records.len() == self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    /// Iterates from the most recently pushed record to the oldest.
    pub(crate) fn iter_newest_first(&self) -> impl Iterator<Item = &T> {
        self.records.iter().rev()
    }

    pub(crate) fn newest(&self) -> Option<&T> {
        self.records.back()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> ReportHistory<T> {
    /// Copies the records out, oldest first.
    pub(crate) fn to_vec(&self) -> Vec<T> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_evicts_oldest_first() {
        let mut history = ReportHistory::new(3);
        assert_eq!(history.push(1), None);
        assert_eq!(history.push(2), None);
        assert_eq!(history.push(3), None);
        assert_eq!(history.push(4), Some(1));
        assert_eq!(history.push(5), Some(2));

        assert_eq!(history.to_vec(), vec![3, 4, 5]);
        assert_eq!(history.newest(), Some(&5));
        assert_eq!(
            history.iter_newest_first().copied().collect::<Vec<_>>(),
            vec![5, 4, 3]
        );
    }

    #[test]
    fn test_history_zero_capacity_is_clamped() {
        let mut history = ReportHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.push('a');
        assert_eq!(history.push('b'), Some('a'));
        assert_eq!(history.len(), 1);
    }
}
