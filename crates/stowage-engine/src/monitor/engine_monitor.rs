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

//! Engine monitoring interface
//!
//! Declares the `EngineMonitor` trait and `Placement` for observing the lane
//! assignment passes and manual moves. Monitors never influence the result of
//! an operation; they only see it happen.
//!
//! Lifecycle
//! - assign / optimize / rebalance: enter → placement* → over-capacity* → exit
//! - move: renumber? → moved
//!
//! Callbacks take `&mut self`; monitors are assumed single-threaded.

use crate::{position::MoveOutcome, report::Operation, stats::EngineStatistics};
use stowage_model::{
    index::{LaneAssignment, LaneIndex, OrderId},
    lane::LaneTotals,
    ledger::PalletLedger,
    pallet::Pallet,
};

/// Why a pallet was put into a lane.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Placement {
    /// Round-robin placement in arrival order.
    RoundRobin,
    /// Part of a group placed whole into one lane.
    WholeGroup,
    /// Member of a split group, placed with the rotating cursor.
    Split,
    /// Fit into no lane; placed into the least loaded lane regardless of capacity.
    Overflow,
    /// Moved out of an overloaded lane.
    Rebalance,
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::RoundRobin => write!(f, "RoundRobin"),
            Placement::WholeGroup => write!(f, "WholeGroup"),
            Placement::Split => write!(f, "Split"),
            Placement::Overflow => write!(f, "Overflow"),
            Placement::Rebalance => write!(f, "Rebalance"),
        }
    }
}

/// Trait for observing engine operations.
pub trait EngineMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;
    /// Called when an assignment pass starts.
    fn on_enter(&mut self, operation: Operation, ledger: &PalletLedger);
    /// Called after `pallet` was put into its new lane. `from` is the lane it left.
    fn on_placement(&mut self, pallet: &Pallet, from: LaneAssignment, placement: Placement);
    /// Called when a group does not fit whole into any lane.
    fn on_group_split(&mut self, _group_code: &str, _group_length: f64) {}
    /// Called for every lane still over capacity when a pass ends.
    fn on_over_capacity(&mut self, lane: LaneIndex, total: f64, capacity: f64);
    /// Called when an assignment pass ends.
    fn on_exit(&mut self, operation: Operation, totals: &LaneTotals, statistics: &EngineStatistics);
    /// Called when the ordering keys of an order were rewritten to make room.
    fn on_renumber(&mut self, _order_id: OrderId, _step: i64, _num_pallets: usize) {}
    /// Called after a pallet was repositioned by hand.
    fn on_moved(&mut self, _pallet: &Pallet, _outcome: &MoveOutcome) {}
}

impl std::fmt::Debug for dyn EngineMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EngineMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn EngineMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EngineMonitor({})", self.name())
    }
}
