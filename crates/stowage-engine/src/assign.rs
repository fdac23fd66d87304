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

//! Auto-assigner.
//!
//! Distributes the pallets of an order round-robin over the lanes in arrival
//! order and then runs the rebalance pass. This is the quick first layout an
//! order gets right after ingestion.

use crate::{
    journal::ChangeJournal,
    monitor::engine_monitor::{EngineMonitor, Placement},
    pass::Pass,
    rebalance::relieve_overloaded_lanes,
    report::{AssignmentReport, Operation},
};
use stowage_model::{index::LaneIndex, ledger::PalletLedger};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoAssigner {
    capacity: f64,
}

impl AutoAssigner {
    /// Creates an assigner for lanes of `capacity` meters.
    #[inline]
    pub fn new(capacity: f64) -> Self {
        Self { capacity }
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Reassigns every pallet of `ledger`.
    ///
    /// Pallet `i` in sequence order goes to lane `i mod n`; afterwards
    /// overloaded lanes are relieved. Every change is recorded in `journal`.
    pub fn assign<M>(
        &self,
        ledger: &mut PalletLedger,
        journal: &mut ChangeJournal,
        monitor: &mut M,
    ) -> AssignmentReport
    where
        M: EngineMonitor + ?Sized,
    {
        let order = ledger.ordered();
        let num_lanes = ledger.num_lanes();

        let mut pass = Pass::begin(Operation::AutoAssign, self.capacity, ledger, journal, monitor);
        pass.unassign_all();

        if num_lanes > 0 {
            for (i, index) in order.into_iter().enumerate() {
                pass.place(index, LaneIndex::new(i % num_lanes), Placement::RoundRobin);
            }
            relieve_overloaded_lanes(&mut pass);
        }

        pass.finish()
    }
}
