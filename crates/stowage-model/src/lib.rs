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

//! # Stowage Model
//!
//! **The domain model of the Stowage lane allocation engine.**
//!
//! A vehicle has a fixed number of loading lanes (three on a standard
//! trailer), each with a maximum summed pallet length. This crate describes
//! what goes into those lanes and is shared between the engine
//! (`stowage_engine`) and the service layer (`stowage_service`).
//!
//! ## Modules
//!
//! * **`decimal`**: `round_to`, decimal rounding decided on a float's exact value.
//! * **`index`**: Strongly typed ids (`PalletId`, `OrderId`) and indices (`PalletIndex`, `LaneIndex`).
//! * **`pallet`**: The `Pallet` record, the `PalletUpdate` a store commits and the `PalletDraft` it ingests.
//! * **`ledger`**: `PalletLedger`, all pallets of one order with their invariants.
//! * **`lane`**: `LaneTotals` and the capacity-aware `LaneState` accumulator.
//! * **`terms`**: `EngineConfig` (JSON, with defaults) and per-order `OrderTerms`.
//! * **`summary`**: Group summaries and loading progress for assigned pallets.
//!
//! Everything in here is plain data with eager validation; the crate performs
//! no I/O except `EngineConfig::from_path`.

pub mod decimal;
pub mod error;
pub mod index;
pub mod lane;
pub mod ledger;
pub mod pallet;
pub mod summary;
pub mod terms;
