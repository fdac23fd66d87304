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

use crate::{
    monitor::engine_monitor::{EngineMonitor, Placement},
    report::Operation,
    stats::EngineStatistics,
};
use stowage_model::{
    index::{LaneAssignment, LaneIndex},
    lane::LaneTotals,
    ledger::PalletLedger,
    pallet::Pallet,
};

/// A monitor that ignores every event.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NoOperationMonitor;

impl NoOperationMonitor {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl EngineMonitor for NoOperationMonitor {
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOperationMonitor"
    }

    #[inline(always)]
    fn on_enter(&mut self, _operation: Operation, _ledger: &PalletLedger) {}

    #[inline(always)]
    fn on_placement(&mut self, _pallet: &Pallet, _from: LaneAssignment, _placement: Placement) {}

    #[inline(always)]
    fn on_over_capacity(&mut self, _lane: LaneIndex, _total: f64, _capacity: f64) {}

    #[inline(always)]
    fn on_exit(
        &mut self,
        _operation: Operation,
        _totals: &LaneTotals,
        _statistics: &EngineStatistics,
    ) {
    }
}
