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

use stowage_model::{error::LaneError, index::PalletId};
use thiserror::Error;

/// Errors raised by engine operations before any pallet is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The pallet is not part of the ledger the operation runs on.
    #[error("{0} not found")]
    PalletNotFound(PalletId),
    #[error(transparent)]
    InvalidLane(#[from] LaneError),
    /// Positions are `0` (first), `-1` (last) or a one-based ordinal.
    #[error("invalid position {0}: expected 0 (first), -1 (last) or a positive ordinal")]
    InvalidPosition(i64),
}

impl EngineError {
    /// Whether the error was caused by an argument rather than a missing record.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidLane(_) | Self::InvalidPosition(_))
    }
}
