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

//! Sequence optimizer.
//!
//! Re-derives the whole assignment of an order so that pallets sharing a
//! group code are loaded contiguously. Groups are handled in the order they
//! arrive at the dock (first-seen order):
//!
//! 1. A group that fits whole goes into the least loaded lane that can take
//!    it; ties go to the lowest lane index.
//! 2. A group that fits nowhere whole is split. A cursor starts at the first
//!    lane; every member goes into the first lane from the cursor onwards
//!    (wrapping around) that can take it, and the cursor moves past that lane.
//!    A member that fits nowhere goes into the least loaded lane regardless of
//!    capacity.
//!
//! Finally the rebalance pass relieves lanes that ended up over capacity.

use crate::{
    journal::ChangeJournal,
    monitor::engine_monitor::{EngineMonitor, Placement},
    pass::Pass,
    rebalance::relieve_overloaded_lanes,
    report::{AssignmentReport, Operation},
};
use stowage_model::{
    index::{LaneIndex, PalletIndex},
    ledger::PalletLedger,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceOptimizer {
    capacity: f64,
}

impl SequenceOptimizer {
    #[inline]
    pub fn new(capacity: f64) -> Self {
        Self { capacity }
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn optimize<M>(
        &self,
        ledger: &mut PalletLedger,
        journal: &mut ChangeJournal,
        monitor: &mut M,
    ) -> AssignmentReport
    where
        M: EngineMonitor + ?Sized,
    {
        let groups: Vec<(String, Vec<PalletIndex>)> = ledger
            .groups()
            .into_iter()
            .map(|group| (group.code().to_owned(), group.members().to_vec()))
            .collect();
        let num_lanes = ledger.num_lanes();

        let mut pass = Pass::begin(Operation::Optimize, self.capacity, ledger, journal, monitor);
        pass.unassign_all();

        if num_lanes > 0 {
            for (code, members) in &groups {
                place_group(&mut pass, code, members);
            }
            relieve_overloaded_lanes(&mut pass);
        }

        pass.finish()
    }
}

fn place_group<M>(pass: &mut Pass<'_, M>, code: &str, members: &[PalletIndex])
where
    M: EngineMonitor + ?Sized,
{
    let group_length: f64 = members
        .iter()
        .map(|&index| pass.ledger.get(index).length())
        .sum();

    if let Some(lane) = pass.state.least_loaded_fitting(group_length) {
        for &index in members {
            pass.place(index, lane, Placement::WholeGroup);
        }
        pass.stats.on_group_whole();
        return;
    }

    pass.stats.on_group_split();
    pass.monitor.on_group_split(code, group_length);

    let num_lanes = pass.state.num_lanes();
    let mut cursor = 0;
    for &index in members {
        let length = pass.ledger.get(index).length();
        let fitting = (0..num_lanes)
            .map(|offset| LaneIndex::new((cursor + offset) % num_lanes))
            .find(|&lane| pass.state.fits(lane, length));

        let (lane, placement) = match fitting {
            Some(lane) => (lane, Placement::Split),
            None => match pass.state.least_loaded() {
                Some(lane) => (lane, Placement::Overflow),
                None => return,
            },
        };
        pass.place(index, lane, placement);
        cursor = (lane.get() + 1) % num_lanes;
    }
}
