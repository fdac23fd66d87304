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

use crate::stats::EngineStatistics;
use smallvec::SmallVec;
use stowage_model::{index::LaneIndex, lane::LaneTotals};

/// The engine operations that produce an `AssignmentReport`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    AutoAssign,
    Optimize,
    Rebalance,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::AutoAssign => write!(f, "AutoAssign"),
            Operation::Optimize => write!(f, "Optimize"),
            Operation::Rebalance => write!(f, "Rebalance"),
        }
    }
}

/// Outcome of a lane assignment pass.
///
/// Lanes that are still over capacity are part of the outcome, not an error:
/// the demand of the order may simply exceed what the vehicle can take.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentReport {
    operation: Operation,
    totals: LaneTotals,
    capacity: f64,
    over_capacity: SmallVec<[LaneIndex; 4]>,
    statistics: EngineStatistics,
}

impl AssignmentReport {
    #[inline]
    pub fn new(
        operation: Operation,
        totals: LaneTotals,
        capacity: f64,
        statistics: EngineStatistics,
    ) -> Self {
        let over_capacity = totals.over_capacity(capacity);
        Self {
            operation,
            totals,
            capacity,
            over_capacity,
            statistics,
        }
    }

    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The lane totals after the pass.
    #[inline]
    pub fn totals(&self) -> &LaneTotals {
        &self.totals
    }

    #[inline]
    pub fn into_totals(self) -> LaneTotals {
        self.totals
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Lanes left above capacity, in lane order.
    #[inline]
    pub fn over_capacity(&self) -> &[LaneIndex] {
        &self.over_capacity
    }

    /// Whether every lane is within capacity.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.over_capacity.is_empty()
    }

    #[inline]
    pub fn statistics(&self) -> &EngineStatistics {
        &self.statistics
    }
}

impl std::fmt::Display for AssignmentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AssignmentReport({}, capacity: {:.2} m, {}",
            self.operation, self.capacity, self.totals
        )?;
        if !self.is_feasible() {
            write!(f, ", over capacity:")?;
            for lane in &self.over_capacity {
                write!(f, " {}", lane)?;
            }
        }
        write!(f, ")")
    }
}
