//! Greedy lane assignment for overlapping slots.
//!
//! Slots are visited in start order; each goes into the first lane whose last
//! slot has already ended, or opens a new lane. For intervals sorted by start
//! this first-fit pass uses the minimum possible number of lanes (the maximum
//! number of simultaneously running slots).

use crate::poster::Slot;
use crate::time::Minute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedSlot {
    /// Position of the slot in the input sequence; drives its color.
    pub index: usize,
    pub start: Minute,
    pub end: Minute,
    pub lane: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneLayout {
    pub lane_count: usize,
    /// In placement order (ascending start).
    pub placed: Vec<PlacedSlot>,
}

impl LaneLayout {
    pub fn lane(&self, lane: usize) -> impl Iterator<Item = &PlacedSlot> {
        self.placed.iter().filter(move |p| p.lane == lane)
    }
}

pub fn compute_lanes(slots: &[Slot]) -> LaneLayout {
    let mut order: Vec<(usize, &Slot)> = slots.iter().enumerate().collect();
    // stable: equal starts keep input order
    order.sort_by_key(|(_, s)| s.start());

    let mut lane_ends: Vec<Minute> = Vec::new();
    let mut placed = Vec::with_capacity(order.len());

    for (index, slot) in order {
        let lane = match lane_ends.iter().position(|&end| end <= slot.start()) {
            Some(i) => {
                lane_ends[i] = slot.end();
                i
            }
            None => {
                lane_ends.push(slot.end());
                lane_ends.len() - 1
            }
        };
        placed.push(PlacedSlot {
            index,
            start: slot.start(),
            end: slot.end(),
            lane,
        });
    }

    LaneLayout {
        lane_count: lane_ends.len(),
        placed,
    }
}
