//! Lane-group fast path
//!
//! Lanes of one lane-group execute in lockstep, so they can exchange register
//! values directly without a group barrier. `shuffle_xor` models the hardware
//! "exchange with the lane at XOR-distance `d`" instruction: every lane reads
//! its partner's register and its own before any lane writes.

use std::iter;

use simt_core::Element;

use crate::op::ReduceOp;

/// XOR distances of a full butterfly over `width` lanes: `width/2, ..., 2, 1`
pub fn shuffle_distances(width: usize) -> impl Iterator<Item = usize> {
    iter::successors(Some(width / 2), |&d| Some(d / 2)).take_while(|&d| d > 0)
}

/// The registers of one lockstep lane-group
#[derive(Debug)]
pub struct LaneGroup<'a, T> {
    lanes: &'a mut [T],
}

impl<'a, T: Element> LaneGroup<'a, T> {
    /// View `lanes` as one lane-group; the width must be a power of two
    pub fn new(lanes: &'a mut [T]) -> Self {
        debug_assert!(lanes.len().is_power_of_two());
        Self { lanes }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.lanes.len()
    }

    /// Shuffle rounds needed to reduce the whole lane-group
    #[inline]
    pub fn rounds(&self) -> usize {
        self.width().trailing_zeros() as usize
    }

    #[inline]
    pub fn lanes(&self) -> &[T] {
        &*self.lanes
    }

    /// Every lane combines its register with the one of lane `lane ^ distance`
    pub fn shuffle_xor<O: ReduceOp<T>>(&mut self, distance: usize, op: &O) {
        debug_assert!(distance > 0 && distance < self.width());
        for lane in 0..self.width() {
            if lane & distance != 0 {
                continue;
            }
            let peer = lane | distance;
            let (mine, theirs) = (self.lanes[lane], self.lanes[peer]);
            self.lanes[lane] = op.combine(mine, theirs);
            self.lanes[peer] = op.combine(theirs, mine);
        }
    }

    /// Butterfly-reduce the lane-group; lane 0 ends holding the total
    ///
    /// Every other lane holds it too, as on hardware.
    pub fn reduce<O: ReduceOp<T>>(&mut self, op: &O) -> T {
        for distance in shuffle_distances(self.width()) {
            self.shuffle_xor(distance, op);
        }
        self.lanes[0]
    }
}
