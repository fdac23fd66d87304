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

//! # Stowage Engine
//!
//! **Lane allocation algorithms for loading pallets into a vehicle.**
//!
//! The engine works on a `PalletLedger` owned by the caller and records every
//! change in a `ChangeJournal`, so the caller can either commit the journal's
//! net updates or roll the ledger back. It performs no I/O.
//!
//! ## Operations
//!
//! * **`assign`**: `AutoAssigner`, round-robin in arrival order followed by a rebalance pass.
//! * **`optimize`**: `SequenceOptimizer`, keeps groups contiguous where they fit and splits them otherwise.
//! * **`rebalance`**: the shared pass relieving overloaded lanes, also usable on its own.
//! * **`position`**: `PositionManager`, manual repositioning with fractional ordering keys.
//! * **`pricing`**: pallet places and price from final lane totals.
//!
//! ## Observability
//!
//! Passes report to an `EngineMonitor` (`monitor`), collect `EngineStatistics`
//! (`stats`) and end with an `AssignmentReport` (`report`). Lanes left over
//! capacity are part of the report rather than an error.

pub mod assign;
pub mod error;
pub mod journal;
pub mod monitor;
pub mod optimize;
mod pass;
pub mod position;
pub mod pricing;
pub mod rebalance;
pub mod report;
pub mod stats;
