//! Bounded rolling window of recent values

use std::collections::VecDeque;

/// Number of values kept per chart series
pub const WINDOW_CAPACITY: usize = 20;

/// Ring buffer: once full, every push drops the oldest value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl MetricWindow {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// `(index, value)` pairs, oldest first, as the chart widget wants them.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| (i as f64, *value))
            .collect()
    }

    /// Smallest and largest value held, if any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mut values = self.iter();
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl Default for MetricWindow {
    fn default() -> Self {
        Self::new()
    }
}
