use crate::physics::math::{Scalar, Vector3};
use std::collections::VecDeque;

pub const DEFAULT_TRAIL_LENGTH: usize = 20;

/// Bounded history of past positions, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    points: VecDeque<Vector3>,
    max_points: usize,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_LENGTH)
    }
}

impl Trail {
    pub fn new(max_points: usize) -> Self {
        Self {
            points: VecDeque::new(),
            max_points,
        }
    }

    /// Records `position` if it lies farther than `min_spacing` from the
    /// newest point, then evicts the oldest points beyond the limit.
    ///
    /// Returns whether the point was recorded.
    pub fn record(&mut self, position: Vector3, min_spacing: Scalar) -> bool {
        if self.max_points == 0 {
            return false;
        }

        let far_enough = self
            .points
            .back()
            .is_none_or(|last| last.distance(position) > min_spacing);

        if far_enough {
            self.points.push_back(position);
            while self.points.len() > self.max_points {
                self.points.pop_front();
            }
        }

        far_enough
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &Vector3> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<Vector3> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }
}
