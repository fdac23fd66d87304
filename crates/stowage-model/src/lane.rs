// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Lane state.
//!
//! `LaneTotals` is the derived length per lane of a vehicle. `LaneState` pairs
//! the totals with the capacity of a lane and is the running accumulator the
//! assignment passes update as they place pallets. All capacity checks go
//! through `LaneState::fits` so that every pass agrees on what "fits" means.

use crate::{index::LaneIndex, pallet::LENGTH_TOLERANCE};
use smallvec::SmallVec;

/// The total pallet length per lane, in meters.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LaneTotals {
    totals: SmallVec<[f64; 4]>,
}

impl LaneTotals {
    /// Creates totals of zero for `num_lanes` lanes.
    #[inline]
    pub fn zeroed(num_lanes: usize) -> Self {
        Self {
            totals: smallvec::smallvec![0.0; num_lanes],
        }
    }

    /// Creates totals from explicit per-lane values.
    #[inline]
    pub fn from_slice(totals: &[f64]) -> Self {
        Self {
            totals: SmallVec::from_slice(totals),
        }
    }

    #[inline]
    pub fn num_lanes(&self) -> usize {
        self.totals.len()
    }

    /// Returns the total of `lane`.
    ///
    /// # Panics
    ///
    /// Panics if `lane` is not in `0..num_lanes()`.
    #[inline]
    pub fn get(&self, lane: LaneIndex) -> f64 {
        let index = lane.get();
        debug_assert!(
            index < self.num_lanes(),
            "called `LaneTotals::get` with lane index out of bounds: the len is {} but the index is {}",
            self.num_lanes(),
            index
        );

        self.totals[index]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.totals
    }

    /// Sum over all lanes.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.totals.iter().sum()
    }

    /// The largest lane total, `0.0` for a vehicle without lanes.
    #[inline]
    pub fn max(&self) -> f64 {
        self.totals.iter().copied().fold(0.0, f64::max)
    }

    /// Iterates `(lane, total)` pairs in lane order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (LaneIndex, f64)> + '_ {
        self.totals
            .iter()
            .enumerate()
            .map(|(i, &total)| (LaneIndex::new(i), total))
    }

    /// Lanes whose total exceeds `capacity`.
    pub fn over_capacity(&self, capacity: f64) -> SmallVec<[LaneIndex; 4]> {
        self.iter()
            .filter(|&(_, total)| total > capacity + LENGTH_TOLERANCE)
            .map(|(lane, _)| lane)
            .collect()
    }

    #[inline]
    pub fn is_within(&self, capacity: f64) -> bool {
        self.over_capacity(capacity).is_empty()
    }

    #[inline]
    pub(crate) fn add(&mut self, lane: LaneIndex, length: f64) {
        self.totals[lane.get()] += length;
    }

    #[inline]
    pub(crate) fn sub(&mut self, lane: LaneIndex, length: f64) {
        let slot = &mut self.totals[lane.get()];
        *slot -= length;
        // Clamp the residue of float subtraction on an emptied lane.
        if slot.abs() < LENGTH_TOLERANCE {
            *slot = 0.0;
        }
    }
}

impl std::fmt::Display for LaneTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (lane, total)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.2} m", lane, total)?;
        }
        Ok(())
    }
}

/// Running lane totals measured against a fixed per-lane capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneState {
    totals: LaneTotals,
    capacity: f64,
}

impl LaneState {
    /// Creates an empty vehicle with `num_lanes` lanes of `capacity` meters.
    #[inline]
    pub fn new(num_lanes: usize, capacity: f64) -> Self {
        Self {
            totals: LaneTotals::zeroed(num_lanes),
            capacity,
        }
    }

    /// Creates a state from existing totals.
    #[inline]
    pub fn from_totals(totals: LaneTotals, capacity: f64) -> Self {
        Self { totals, capacity }
    }

    #[inline]
    pub fn num_lanes(&self) -> usize {
        self.totals.num_lanes()
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[inline]
    pub fn total(&self, lane: LaneIndex) -> f64 {
        self.totals.get(lane)
    }

    #[inline]
    pub fn totals(&self) -> &LaneTotals {
        &self.totals
    }

    #[inline]
    pub fn into_totals(self) -> LaneTotals {
        self.totals
    }

    /// Iterates every lane in index order.
    #[inline]
    pub fn lanes(&self) -> impl Iterator<Item = LaneIndex> + use<> {
        (0..self.num_lanes()).map(LaneIndex::new)
    }

    /// Whether `length` more meters fit into `lane`.
    #[inline]
    pub fn fits(&self, lane: LaneIndex, length: f64) -> bool {
        self.total(lane) + length <= self.capacity + LENGTH_TOLERANCE
    }

    #[inline]
    pub fn is_over_capacity(&self, lane: LaneIndex) -> bool {
        self.total(lane) > self.capacity + LENGTH_TOLERANCE
    }

    #[inline]
    pub fn add(&mut self, lane: LaneIndex, length: f64) {
        self.totals.add(lane, length);
    }

    #[inline]
    pub fn remove(&mut self, lane: LaneIndex, length: f64) {
        self.totals.sub(lane, length);
    }

    /// Moves `length` meters from `from` to `to`.
    #[inline]
    pub fn transfer(&mut self, from: LaneIndex, to: LaneIndex, length: f64) {
        self.remove(from, length);
        self.add(to, length);
    }

    /// The lane with the smallest total; ties go to the lowest index.
    pub fn least_loaded(&self) -> Option<LaneIndex> {
        self.lanes().reduce(|best, lane| {
            if self.total(lane) < self.total(best) {
                lane
            } else {
                best
            }
        })
    }

    /// The least loaded lane among those that can take `length` more meters.
    pub fn least_loaded_fitting(&self, length: f64) -> Option<LaneIndex> {
        self.lanes()
            .filter(|&lane| self.fits(lane, length))
            .reduce(|best, lane| {
                if self.total(lane) < self.total(best) {
                    lane
                } else {
                    best
                }
            })
    }

    /// The first lane in index order, other than `source`, that can take `length`.
    pub fn first_fitting_except(&self, source: LaneIndex, length: f64) -> Option<LaneIndex> {
        self.lanes()
            .find(|&lane| lane != source && self.fits(lane, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(i: usize) -> LaneIndex {
        LaneIndex::new(i)
    }

    #[test]
    fn test_zeroed_totals() {
        let totals = LaneTotals::zeroed(3);
        assert_eq!(totals.num_lanes(), 3);
        assert_eq!(totals.sum(), 0.0);
        assert_eq!(totals.max(), 0.0);
        assert!(totals.is_within(13.6));
    }

    #[test]
    fn test_over_capacity_lists_lanes_in_order() {
        let totals = LaneTotals::from_slice(&[14.0, 13.6, 15.0]);
        assert_eq!(totals.over_capacity(13.6).as_slice(), &[l(0), l(2)]);
        assert_eq!(totals.max(), 15.0);
    }

    #[test]
    fn test_fits_is_inclusive_of_capacity() {
        let mut state = LaneState::new(3, 13.6);
        state.add(l(0), 12.4);
        assert!(state.fits(l(0), 1.2));
        assert!(!state.fits(l(0), 1.3));
    }

    #[test]
    fn test_fits_tolerates_float_accumulation() {
        let mut state = LaneState::new(1, 13.6);
        // 0.1 summed 136 times is not exactly 13.6 in binary floating point.
        for _ in 0..135 {
            state.add(l(0), 0.1);
        }
        assert!(state.fits(l(0), 0.1));
    }

    #[test]
    fn test_least_loaded_tie_breaks_to_lowest_index() {
        let mut state = LaneState::new(3, 13.6);
        assert_eq!(state.least_loaded(), Some(l(0)));
        state.add(l(0), 2.0);
        state.add(l(2), 1.0);
        assert_eq!(state.least_loaded(), Some(l(1)));
        state.add(l(1), 1.0);
        assert_eq!(state.least_loaded(), Some(l(1)));
    }

    #[test]
    fn test_least_loaded_fitting() {
        let mut state = LaneState::new(3, 10.0);
        state.add(l(0), 1.0);
        state.add(l(1), 6.0);
        state.add(l(2), 8.0);
        assert_eq!(state.least_loaded_fitting(5.0), Some(l(0)));
        assert_eq!(state.least_loaded_fitting(9.5), None);
    }

    #[test]
    fn test_first_fitting_skips_source() {
        let mut state = LaneState::new(3, 10.0);
        state.add(l(0), 1.0);
        state.add(l(1), 9.5);
        assert_eq!(state.first_fitting_except(l(0), 2.0), Some(l(2)));
        assert_eq!(state.first_fitting_except(l(2), 2.0), Some(l(0)));
    }

    #[test]
    fn test_transfer_clamps_residue() {
        let mut state = LaneState::new(2, 10.0);
        state.add(l(0), 0.1);
        state.add(l(0), 0.2);
        state.transfer(l(0), l(1), 0.1);
        state.transfer(l(0), l(1), 0.2);
        assert_eq!(state.total(l(0)), 0.0);
        assert!((state.total(l(1)) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let totals = LaneTotals::from_slice(&[10.0, 5.0, 0.0]);
        assert_eq!(
            format!("{}", totals),
            "Lane 1: 10.00 m, Lane 2: 5.00 m, Lane 3: 0.00 m"
        );
    }
}
