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

//! Rebalance pass.
//!
//! Relieves overloaded lanes by migrating their shortest pallets. Lanes are
//! visited in index order; inside a lane pallets are tried shortest first (ties
//! in key order), each going to the first other lane in index order that can
//! take it. A lane stops giving pallets away as soon as it is within capacity.
//!
//! A pallet is only ever moved into a lane that can take it, so the pass never
//! pushes a healthy lane over capacity. Lanes that cannot be relieved stay as
//! they are and show up in the report.

use crate::{
    journal::ChangeJournal,
    monitor::engine_monitor::{EngineMonitor, Placement},
    pass::Pass,
    report::{AssignmentReport, Operation},
};
use stowage_model::{
    index::{LaneAssignment, PalletIndex},
    ledger::PalletLedger,
};

/// Runs the rebalance pass on its own, on the ledger's current assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rebalancer {
    capacity: f64,
}

impl Rebalancer {
    #[inline]
    pub fn new(capacity: f64) -> Self {
        Self { capacity }
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn rebalance<M>(
        &self,
        ledger: &mut PalletLedger,
        journal: &mut ChangeJournal,
        monitor: &mut M,
    ) -> AssignmentReport
    where
        M: EngineMonitor + ?Sized,
    {
        let mut pass = Pass::begin(Operation::Rebalance, self.capacity, ledger, journal, monitor);
        relieve_overloaded_lanes(&mut pass);
        pass.finish()
    }
}

pub(crate) fn relieve_overloaded_lanes<M>(pass: &mut Pass<'_, M>)
where
    M: EngineMonitor + ?Sized,
{
    for source in pass.state.lanes() {
        if !pass.state.is_over_capacity(source) {
            continue;
        }

        let mut candidates: Vec<PalletIndex> =
            pass.ledger.lane_members(LaneAssignment::Lane(source));
        // Stable: equal lengths keep key order.
        candidates.sort_by(|&a, &b| {
            pass.ledger
                .get(a)
                .length()
                .total_cmp(&pass.ledger.get(b).length())
        });

        for index in candidates {
            if !pass.state.is_over_capacity(source) {
                break;
            }
            let length = pass.ledger.get(index).length();
            if let Some(target) = pass.state.first_fitting_except(source, length) {
                pass.place(index, target, Placement::Rebalance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;
    use stowage_model::{
        index::{LaneIndex, OrderId, PalletId},
        pallet::Pallet,
    };

    fn ledger(specs: &[(f64, usize)]) -> PalletLedger {
        let pallets = specs.iter().enumerate().map(|(i, &(length, lane))| {
            Pallet::new(
                PalletId::new(i as u64 + 1),
                OrderId::new(1),
                "A",
                length,
                0.0,
                i as i64 + 1,
            )
            .unwrap()
            .with_lane(LaneAssignment::Lane(LaneIndex::new(lane)))
        });
        PalletLedger::from_pallets(OrderId::new(1), 3, pallets).unwrap()
    }

    fn lane_of(ledger: &PalletLedger, id: u64) -> LaneAssignment {
        let index = ledger.index_of(PalletId::new(id)).unwrap();
        ledger.get(index).lane()
    }

    #[test]
    fn test_three_pallets_in_one_lane() {
        let mut l = ledger(&[(5.0, 0), (5.0, 0), (5.0, 0)]);
        let mut journal = ChangeJournal::new();
        let report = Rebalancer::new(13.6).rebalance(&mut l, &mut journal, &mut NoOperationMonitor);

        assert_eq!(report.totals().as_slice(), &[10.0, 5.0, 0.0]);
        assert!(report.is_feasible());
        assert_eq!(report.statistics().rebalance_moves, 1);
        // The first pallet in key order is the one that moves.
        assert_eq!(lane_of(&l, 1), LaneAssignment::Lane(LaneIndex::new(1)));
        assert_eq!(journal.updates(&l).len(), 1);
    }

    #[test]
    fn test_shortest_pallets_move_first() {
        let mut l = ledger(&[(6.0, 0), (1.0, 0), (7.0, 0), (2.0, 0)]);
        let mut journal = ChangeJournal::new();
        let report = Rebalancer::new(13.6).rebalance(&mut l, &mut journal, &mut NoOperationMonitor);

        // 16.0 -> move 1.0 -> 15.0 -> move 2.0 -> 13.0.
        assert_eq!(report.totals().as_slice(), &[13.0, 3.0, 0.0]);
        assert_eq!(lane_of(&l, 2), LaneAssignment::Lane(LaneIndex::new(1)));
        assert_eq!(lane_of(&l, 4), LaneAssignment::Lane(LaneIndex::new(1)));
        assert_eq!(lane_of(&l, 1), LaneAssignment::Lane(LaneIndex::new(0)));
    }

    #[test]
    fn test_never_overloads_target_lane() {
        // Lane 2 can take nothing more, lane 3 only the 1.0.
        let mut l = ledger(&[(7.0, 0), (7.0, 0), (13.6, 1), (12.6, 2), (1.0, 0)]);
        let mut journal = ChangeJournal::new();
        let report = Rebalancer::new(13.6).rebalance(&mut l, &mut journal, &mut NoOperationMonitor);

        assert_eq!(report.totals().as_slice(), &[14.0, 13.6, 13.6]);
        assert_eq!(report.over_capacity(), &[LaneIndex::new(0)]);
        assert!(!report.is_feasible());
    }

    #[test]
    fn test_within_capacity_is_untouched() {
        let mut l = ledger(&[(5.0, 0), (5.0, 1), (13.6, 2)]);
        let mut journal = ChangeJournal::new();
        let report = Rebalancer::new(13.6).rebalance(&mut l, &mut journal, &mut NoOperationMonitor);
        assert!(report.is_feasible());
        assert!(journal.is_empty());
    }
}
