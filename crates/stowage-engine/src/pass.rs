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

//! Shared bookkeeping of the lane assignment passes.
//!
//! A `Pass` bundles the ledger, the journal, the monitor and a `LaneState`
//! that mirrors the ledger's lane totals. All placements go through
//! `Pass::place`, which keeps the mirror, the journal, the statistics and the
//! monitor in step.

use crate::{
    journal::ChangeJournal,
    monitor::engine_monitor::{EngineMonitor, Placement},
    report::{AssignmentReport, Operation},
    stats::EngineStatistics,
};
use std::time::Instant;
use stowage_model::{
    index::{LaneAssignment, LaneIndex, PalletIndex},
    lane::LaneState,
    ledger::PalletLedger,
};

pub(crate) struct Pass<'a, M: ?Sized> {
    pub ledger: &'a mut PalletLedger,
    pub journal: &'a mut ChangeJournal,
    pub monitor: &'a mut M,
    pub state: LaneState,
    pub stats: EngineStatistics,
    operation: Operation,
    start: Instant,
}

impl<'a, M> Pass<'a, M>
where
    M: EngineMonitor + ?Sized,
{
    /// Starts a pass on the ledger's current assignment.
    pub fn begin(
        operation: Operation,
        capacity: f64,
        ledger: &'a mut PalletLedger,
        journal: &'a mut ChangeJournal,
        monitor: &'a mut M,
    ) -> Self {
        monitor.on_enter(operation, ledger);
        let state = LaneState::from_totals(ledger.lane_totals(), capacity);
        Self {
            ledger,
            journal,
            monitor,
            state,
            stats: EngineStatistics::default(),
            operation,
            start: Instant::now(),
        }
    }

    /// Takes every pallet out of its lane.
    pub fn unassign_all(&mut self) {
        for i in 0..self.ledger.len() {
            let index = PalletIndex::new(i);
            let old = self
                .journal
                .set_lane(self.ledger, index, LaneAssignment::Unassigned);
            if let Some(lane) = old.lane() {
                self.state.remove(lane, self.ledger.get(index).length());
            }
        }
    }

    /// Puts the pallet at `index` into `lane`.
    pub fn place(&mut self, index: PalletIndex, lane: LaneIndex, placement: Placement) {
        let length = self.ledger.get(index).length();
        let from = self
            .journal
            .set_lane(self.ledger, index, LaneAssignment::Lane(lane));
        if let Some(old) = from.lane() {
            self.state.remove(old, length);
        }
        self.state.add(lane, length);

        match placement {
            Placement::Rebalance => self.stats.on_rebalance_move(),
            Placement::Overflow => {
                self.stats.on_overflow();
                self.stats.on_pallet_placed();
            }
            _ => self.stats.on_pallet_placed(),
        }
        self.monitor
            .on_placement(self.ledger.get(index), from, placement);
    }

    /// Ends the pass, reporting lanes left over capacity.
    pub fn finish(mut self) -> AssignmentReport {
        debug_assert_eq!(
            self.state.totals().as_slice().len(),
            self.ledger.num_lanes(),
            "called `Pass::finish` with a lane state that does not match the ledger"
        );

        for lane in self.state.lanes() {
            if self.state.is_over_capacity(lane) {
                self.monitor
                    .on_over_capacity(lane, self.state.total(lane), self.state.capacity());
            }
        }

        self.stats.set_total_time(self.start.elapsed());
        let capacity = self.state.capacity();
        let totals = self.state.into_totals();
        self.monitor.on_exit(self.operation, &totals, &self.stats);
        AssignmentReport::new(self.operation, totals, capacity, self.stats)
    }
}
