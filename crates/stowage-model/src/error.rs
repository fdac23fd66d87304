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

//! Error types of the loading model.

use crate::index::{OrderId, PalletId};
use thiserror::Error;

/// A pallet record failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PalletError {
    /// The length must be a positive, finite number of meters.
    #[error("pallet length must be positive and finite, got {0}")]
    InvalidLength(f64),
    /// The weight must be a non-negative, finite number.
    #[error("pallet weight must be non-negative and finite, got {0}")]
    InvalidWeight(f64),
}

/// A raw lane value does not name a lane of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LaneError {
    #[error("lane {raw} is out of range: the vehicle has lanes 1..={num_lanes} (0 = unassigned)")]
    OutOfRange { raw: u8, num_lanes: usize },
}

/// A pallet could not be admitted into a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The pallet belongs to another order.
    #[error("{pallet} belongs to {actual}, not to ledger {expected}")]
    ForeignPallet {
        pallet: PalletId,
        expected: OrderId,
        actual: OrderId,
    },
    /// A pallet with the same id is already in the ledger.
    #[error("{0} is already in the ledger")]
    DuplicatePallet(PalletId),
    /// Another pallet of the order already holds this sequence.
    #[error("sequence {sequence} of {pallet} is already taken in this order")]
    DuplicateSequence { pallet: PalletId, sequence: i64 },
    /// The pallet sits in a lane the vehicle does not have.
    #[error("{pallet} is assigned to lane {lane} but the vehicle has {num_lanes} lanes")]
    LaneOutOfRange {
        pallet: PalletId,
        lane: usize,
        num_lanes: usize,
    },
}

/// Engine configuration or order terms are unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
