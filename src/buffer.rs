use std::collections::VecDeque;

use crate::model::price_point::PricePoint;

/// Maximum number of points kept for one instrument.
pub const POINT_CAPACITY: usize = 100;

/// Chronologically ordered, capacity-bounded point sequence. Newest last.
#[derive(Debug, Clone)]
pub struct PointBuffer {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl Default for PointBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PointBuffer {
    pub fn new() -> Self {
        Self::with_capacity(POINT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the end, evicting from the front while over capacity.
    pub fn append(&mut self, point: PricePoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Owned copy of the current sequence; later appends do not affect it.
    pub fn snapshot(&self) -> Vec<PricePoint> {
        self.points.iter().cloned().collect()
    }

    /// Replace contents with the last `capacity` entries of `initial`.
    pub fn reset(&mut self, initial: &[PricePoint]) {
        let skip = initial.len().saturating_sub(self.capacity);
        self.points.clear();
        self.points.extend(initial[skip..].iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.back()
    }
}
