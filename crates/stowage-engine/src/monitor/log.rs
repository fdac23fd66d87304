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
    position::MoveOutcome,
    report::Operation,
    stats::EngineStatistics,
};
use std::time::Instant;
use stowage_model::{
    index::{LaneAssignment, LaneIndex, OrderId},
    lane::LaneTotals,
    ledger::PalletLedger,
    pallet::Pallet,
};
use tracing::{debug, info, trace, warn};

/// A monitor that emits `tracing` events.
///
/// Individual placements are logged at `trace`, rebalance moves, splits and
/// manual moves at `debug`, finished passes at `info` and lanes left over
/// capacity at `warn`.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    order_id: Option<OrderId>,
    start_time: Instant,
}

impl LogMonitor {
    pub fn new() -> Self {
        Self {
            order_id: None,
            start_time: Instant::now(),
        }
    }

    #[inline]
    fn order(&self) -> u64 {
        self.order_id.map_or(0, |id| id.get())
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LogMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.order_id {
            Some(id) => write!(f, "LogMonitor({})", id),
            None => write!(f, "LogMonitor"),
        }
    }
}

impl EngineMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter(&mut self, operation: Operation, ledger: &PalletLedger) {
        self.order_id = Some(ledger.order_id());
        self.start_time = Instant::now();
        debug!(
            order = self.order(),
            %operation,
            pallets = ledger.len(),
            total_length = ledger.total_length(),
            "lane pass started"
        );
    }

    fn on_placement(&mut self, pallet: &Pallet, from: LaneAssignment, placement: Placement) {
        if placement == Placement::Rebalance {
            debug!(
                order = self.order(),
                pallet = pallet.id().get(),
                %from,
                to = %pallet.lane(),
                length = pallet.length(),
                "pallet moved out of overloaded lane"
            );
        } else {
            trace!(
                order = self.order(),
                pallet = pallet.id().get(),
                lane = %pallet.lane(),
                %placement,
                "pallet placed"
            );
        }
    }

    fn on_group_split(&mut self, group_code: &str, group_length: f64) {
        debug!(
            order = self.order(),
            group = group_code,
            length = group_length,
            "group fits no single lane, splitting"
        );
    }

    fn on_over_capacity(&mut self, lane: LaneIndex, total: f64, capacity: f64) {
        warn!(
            order = self.order(),
            lane = lane.number(),
            total,
            capacity,
            "lane remains over capacity"
        );
    }

    fn on_exit(&mut self, operation: Operation, totals: &LaneTotals, statistics: &EngineStatistics) {
        info!(
            order = self.order(),
            %operation,
            %totals,
            placed = statistics.pallets_placed,
            rebalanced = statistics.rebalance_moves,
            overflow = statistics.overflow_placements,
            elapsed_us = self.start_time.elapsed().as_micros() as u64,
            "lane pass finished"
        );
    }

    fn on_renumber(&mut self, order_id: OrderId, step: i64, num_pallets: usize) {
        info!(
            order = order_id.get(),
            step,
            pallets = num_pallets,
            "ordering keys renumbered"
        );
    }

    fn on_moved(&mut self, pallet: &Pallet, outcome: &MoveOutcome) {
        debug!(
            order = pallet.order_id().get(),
            pallet = pallet.id().get(),
            from = %outcome.old_lane,
            to = %outcome.new_lane,
            sequence = outcome.sequence,
            renumbered = outcome.renumbered,
            "pallet repositioned"
        );
    }
}
